//! File-backed booking store.
//!
//! Every record is a YAML document in its own sharded directory under the configured data
//! directory:
//!
//! ```text
//! <data_dir>/
//!   clinics/<s1>/<s2>/<id>/clinic.yaml
//!   doctors/<s1>/<s2>/<id>/doctor.yaml
//!   patients/<s1>/<s2>/<id>/patient.yaml
//!   bookings/<s1>/<s2>/<id>/booking.yaml
//! ```
//!
//! where `s1`/`s2` are the first four hex characters of the record id. Records are written
//! through a temporary file and a rename, so a single record write is atomic. A booking id is
//! taken once its `booking.yaml` exists; a record directory without that file is vacant.
//!
//! Finding a doctor's bookings walks every booking directory. An unreadable or unparseable
//! booking fails the whole lookup; it is never skipped.

use super::helpers::{
    collect_record_files, create_record_dir, write_atomically, write_new_atomically,
};
use crate::config::CoreConfig;
use crate::constants::{
    BOOKINGS_DIR_NAME, BOOKING_FILENAME, CLINICS_DIR_NAME, CLINIC_FILENAME, DOCTORS_DIR_NAME,
    DOCTOR_FILENAME, PATIENTS_DIR_NAME, PATIENT_FILENAME,
};
use crate::ids::{BookingId, ClinicId, DoctorId, PatientId};
use crate::models::{Booking, Clinic, Doctor, Patient};
use crate::store::BookingStore;
use crate::{BookingError, BookingResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct FileBookingStore {
    cfg: Arc<CoreConfig>,
}

impl FileBookingStore {
    /// Opens the store, creating the data directory if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns `BookingError::StorageDirCreation` if the data directory cannot be created.
    pub fn open(cfg: Arc<CoreConfig>) -> BookingResult<Self> {
        fs::create_dir_all(cfg.data_dir()).map_err(BookingError::StorageDirCreation)?;
        Ok(Self { cfg })
    }

    fn kind_dir(&self, dir_name: &str) -> PathBuf {
        self.cfg.data_dir().join(dir_name)
    }

    fn booking_path(&self, id: &BookingId) -> PathBuf {
        id.sharded_dir(&self.kind_dir(BOOKINGS_DIR_NAME))
            .join(BOOKING_FILENAME)
    }

    fn clinic_path(&self, id: &ClinicId) -> PathBuf {
        id.sharded_dir(&self.kind_dir(CLINICS_DIR_NAME))
            .join(CLINIC_FILENAME)
    }

    fn doctor_path(&self, id: &DoctorId) -> PathBuf {
        id.sharded_dir(&self.kind_dir(DOCTORS_DIR_NAME))
            .join(DOCTOR_FILENAME)
    }

    fn patient_path(&self, id: &PatientId) -> PathBuf {
        id.sharded_dir(&self.kind_dir(PATIENTS_DIR_NAME))
            .join(PATIENT_FILENAME)
    }
}

/// Reads and parses one record. `Ok(None)` means the file does not exist.
fn read_record<T: DeserializeOwned>(path: &Path) -> BookingResult<Option<T>> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(BookingError::FileRead(e)),
    };

    serde_yaml::from_str(&contents)
        .map(Some)
        .map_err(|source| {
            tracing::warn!("failed to parse record: {} - {}", path.display(), source);
            BookingError::YamlDeserialization {
                path: path.to_path_buf(),
                source,
            }
        })
}

/// Serializes `record` and writes it to `path`, creating the record directory if needed.
fn write_record<T: Serialize>(path: &Path, record: &T) -> BookingResult<()> {
    let yaml = serde_yaml::to_string(record).map_err(BookingError::YamlSerialization)?;
    if let Some(dir) = path.parent() {
        create_record_dir(dir)?;
    }
    write_atomically(path, &yaml)
}

impl BookingStore for FileBookingStore {
    fn find_bookings_by_doctor(&self, doctor_id: &DoctorId) -> BookingResult<Vec<Booking>> {
        let mut bookings = Vec::new();
        for path in collect_record_files(&self.kind_dir(BOOKINGS_DIR_NAME), BOOKING_FILENAME)? {
            if let Some(booking) = read_record::<Booking>(&path)? {
                if booking.doctor_id == *doctor_id {
                    bookings.push(booking);
                }
            }
        }
        Ok(bookings)
    }

    fn find_booking(&self, id: &BookingId) -> BookingResult<Booking> {
        read_record(&self.booking_path(id))?.ok_or(BookingError::BookingNotFound(*id))
    }

    fn find_patient(&self, id: &PatientId) -> BookingResult<Patient> {
        read_record(&self.patient_path(id))?.ok_or(BookingError::PatientNotFound(*id))
    }

    fn find_clinic(&self, id: &ClinicId) -> BookingResult<Clinic> {
        read_record(&self.clinic_path(id))?.ok_or(BookingError::ClinicNotFound(*id))
    }

    fn find_doctor(&self, id: &DoctorId) -> BookingResult<Doctor> {
        read_record(&self.doctor_path(id))?.ok_or(BookingError::DoctorNotFound(*id))
    }

    fn insert_booking(&self, booking: &Booking) -> BookingResult<()> {
        let path = self.booking_path(&booking.id);
        let yaml = serde_yaml::to_string(booking).map_err(BookingError::YamlSerialization)?;

        create_record_dir(&booking.id.sharded_dir(&self.kind_dir(BOOKINGS_DIR_NAME)))?;
        if !write_new_atomically(&path, &yaml)? {
            return Err(BookingError::DuplicateBooking(booking.id));
        }
        Ok(())
    }

    fn update_booking(&self, booking: &Booking) -> BookingResult<()> {
        let path = self.booking_path(&booking.id);
        if !path.is_file() {
            return Err(BookingError::BookingNotFound(booking.id));
        }
        write_record(&path, booking)
    }

    fn insert_clinic(&self, clinic: &Clinic) -> BookingResult<()> {
        write_record(&self.clinic_path(&clinic.id), clinic)
    }

    fn insert_doctor(&self, doctor: &Doctor) -> BookingResult<()> {
        write_record(&self.doctor_path(&doctor.id), doctor)
    }

    fn insert_patient(&self, patient: &Patient) -> BookingResult<()> {
        write_record(&self.patient_path(&patient.id), patient)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreBackend;
    use crate::models::SurgeryType;
    use crate::NonEmptyText;
    use chrono::{Duration, TimeZone, Utc};
    use tempfile::TempDir;

    fn test_cfg(data_dir: &Path) -> Arc<CoreConfig> {
        Arc::new(
            CoreConfig::new(data_dir.to_path_buf(), StoreBackend::File)
                .expect("CoreConfig::new should succeed"),
        )
    }

    fn test_booking(doctor_id: DoctorId, hour: u32) -> Booking {
        let start = Utc.with_ymd_and_hms(2031, 6, 1, hour, 0, 0).unwrap();
        Booking {
            id: BookingId::new(),
            patient_id: PatientId::new(),
            doctor_id,
            start_time: start,
            end_time: start + Duration::minutes(45),
            cancelled: false,
            surgery_type: SurgeryType::SystemTwo.code(),
            doctor: None,
            patient: None,
        }
    }

    #[test]
    fn test_open_creates_data_dir() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let data_dir = temp_dir.path().join("nested").join("data");

        FileBookingStore::open(test_cfg(&data_dir)).expect("open should succeed");
        assert!(data_dir.is_dir(), "data directory should be created");
    }

    #[test]
    fn test_insert_booking_writes_sharded_yaml() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = FileBookingStore::open(test_cfg(temp_dir.path())).expect("should open");
        let booking = test_booking(DoctorId::new(), 9);

        store.insert_booking(&booking).expect("insert should succeed");

        let expected = booking
            .id
            .sharded_dir(&temp_dir.path().join(BOOKINGS_DIR_NAME))
            .join(BOOKING_FILENAME);
        assert!(expected.is_file(), "booking.yaml should exist");

        let yaml = fs::read_to_string(&expected).expect("should read booking.yaml");
        assert!(yaml.contains(&booking.id.to_string()));
        assert!(yaml.contains("cancelled: false"));
    }

    #[test]
    fn test_insert_booking_rejects_duplicate_id() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = FileBookingStore::open(test_cfg(temp_dir.path())).expect("should open");
        let booking = test_booking(DoctorId::new(), 9);

        store.insert_booking(&booking).expect("first insert should succeed");
        let err = store
            .insert_booking(&booking)
            .expect_err("second insert should fail");
        assert!(matches!(err, BookingError::DuplicateBooking(id) if id == booking.id));
    }

    #[test]
    fn test_insert_booking_reuses_directory_left_without_record() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = FileBookingStore::open(test_cfg(temp_dir.path())).expect("should open");
        let booking = test_booking(DoctorId::new(), 10);

        // An interrupted insert can leave the record directory and a stray temporary file.
        let dir = booking
            .id
            .sharded_dir(&temp_dir.path().join(BOOKINGS_DIR_NAME));
        fs::create_dir_all(&dir).expect("should create directory");
        fs::write(dir.join("booking.yaml.stale.tmp"), "partial").expect("should write");

        store
            .insert_booking(&booking)
            .expect("insert into an empty record directory should succeed");
        assert_eq!(store.find_booking(&booking.id).expect("should find"), booking);

        let err = store
            .insert_booking(&booking)
            .expect_err("the id is taken once the record exists");
        assert!(matches!(err, BookingError::DuplicateBooking(_)));
    }

    #[test]
    fn test_records_survive_reopening_the_store() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let doctor = DoctorId::new();
        let clinic = Clinic {
            id: ClinicId::new(),
            name: NonEmptyText::new("Northgate Practice").unwrap(),
            surgery_type: SurgeryType::SystemTwo,
        };
        let patient = Patient {
            id: PatientId::new(),
            name: NonEmptyText::new("Mina Patel").unwrap(),
            clinic_id: clinic.id,
        };
        let first = test_booking(doctor, 9);
        let second = test_booking(doctor, 11);

        {
            let store = FileBookingStore::open(test_cfg(temp_dir.path())).expect("should open");
            store.insert_clinic(&clinic).expect("insert clinic");
            store.insert_patient(&patient).expect("insert patient");
            store.insert_booking(&first).expect("insert first");
            store.insert_booking(&second).expect("insert second");
            store
                .insert_booking(&test_booking(DoctorId::new(), 9))
                .expect("insert other doctor");
        }

        let store = FileBookingStore::open(test_cfg(temp_dir.path())).expect("should reopen");
        assert_eq!(store.find_clinic(&clinic.id).expect("find clinic"), clinic);
        assert_eq!(store.find_patient(&patient.id).expect("find patient"), patient);

        let mut bookings = store
            .find_bookings_by_doctor(&doctor)
            .expect("should list bookings");
        bookings.sort_by_key(|b| b.start_time);
        assert_eq!(bookings, vec![first, second]);
    }

    #[test]
    fn test_update_booking_persists_cancellation() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = FileBookingStore::open(test_cfg(temp_dir.path())).expect("should open");
        let mut booking = test_booking(DoctorId::new(), 14);

        let err = store
            .update_booking(&booking)
            .expect_err("missing booking should not update");
        assert!(matches!(err, BookingError::BookingNotFound(_)));

        store.insert_booking(&booking).expect("insert should succeed");
        booking.cancelled = true;
        store.update_booking(&booking).expect("update should succeed");

        assert!(store.find_booking(&booking.id).expect("should find").cancelled);
    }

    #[test]
    fn test_missing_records_report_not_found() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = FileBookingStore::open(test_cfg(temp_dir.path())).expect("should open");

        assert!(matches!(
            store.find_booking(&BookingId::new()),
            Err(BookingError::BookingNotFound(_))
        ));
        assert!(matches!(
            store.find_doctor(&DoctorId::new()),
            Err(BookingError::DoctorNotFound(_))
        ));
        assert!(store
            .find_bookings_by_doctor(&DoctorId::new())
            .expect("empty store should list nothing")
            .is_empty());
    }

    #[test]
    fn test_corrupt_booking_fails_schedule_lookup() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = FileBookingStore::open(test_cfg(temp_dir.path())).expect("should open");
        let doctor = DoctorId::new();
        store
            .insert_booking(&test_booking(doctor, 9))
            .expect("insert should succeed");

        let corrupt_dir = BookingId::new().sharded_dir(&temp_dir.path().join(BOOKINGS_DIR_NAME));
        fs::create_dir_all(&corrupt_dir).expect("should create directory");
        fs::write(corrupt_dir.join(BOOKING_FILENAME), "invalid: yaml: [[[")
            .expect("should write corrupt file");

        let err = store
            .find_bookings_by_doctor(&doctor)
            .expect_err("corrupt booking should fail the lookup");
        assert!(matches!(err, BookingError::YamlDeserialization { .. }));
    }
}
