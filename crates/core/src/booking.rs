//! Booking service.
//!
//! [`BookingService`] validates a proposed booking, derives the denormalised fields from the
//! patient's clinic and persists it. It also cancels bookings and registers the clinics,
//! doctors and patients that bookings refer to.
//!
//! ## Concurrency
//!
//! Validation reads the doctor's schedule and the insert happens afterwards. Two overlapping
//! requests for the same doctor could both pass validation if they ran interleaved, so
//! [`BookingService::add_booking`] holds a per-doctor mutex from validation through insert.
//! Requests for different doctors do not contend. A doctor's entry is removed from the lock
//! registry once no request holds or waits on it.
//!
//! The lock is in-process only. Two processes sharing one data directory (for example the
//! REST runner and the `booking` CLI) are not serialised against each other, so overlapping
//! admissions from both can commit. Point at most one writer process at a data directory.

use crate::clock::Clock;
use crate::ids::{BookingId, DoctorId, PatientId};
use crate::models::{Booking, BookingRequest, Clinic, Doctor, Patient, SurgeryType};
use crate::store::BookingStore;
use crate::validation::{AdmissionValidator, BookingRequestValidator};
use crate::{BookingError, BookingResult, ClinicId, NonEmptyText};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// One mutex per doctor with a request in flight.
#[derive(Debug, Default)]
struct DoctorLocks {
    locks: Mutex<HashMap<DoctorId, Arc<Mutex<()>>>>,
}

impl DoctorLocks {
    // Neither mutex guards data a panic can corrupt; poisoning is recovered.
    fn registry(&self) -> MutexGuard<'_, HashMap<DoctorId, Arc<Mutex<()>>>> {
        self.locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn for_doctor(&self, doctor_id: &DoctorId) -> DoctorLock<'_> {
        let lock = self.registry().entry(*doctor_id).or_default().clone();
        DoctorLock {
            registry: self,
            doctor_id: *doctor_id,
            lock,
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.registry().len()
    }
}

/// A claim on one doctor's mutex. Dropping the last claim removes the registry entry.
struct DoctorLock<'a> {
    registry: &'a DoctorLocks,
    doctor_id: DoctorId,
    lock: Arc<Mutex<()>>,
}

impl DoctorLock<'_> {
    fn lock(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for DoctorLock<'_> {
    fn drop(&mut self) {
        let mut locks = self.registry.registry();
        // Claims are only cloned under the registry lock, so the count is stable here:
        // one for the map and one for this claim means nobody else is waiting.
        if Arc::strong_count(&self.lock) == 2 {
            locks.remove(&self.doctor_id);
        }
    }
}

/// Pure booking operations - no API concerns.
#[derive(Clone)]
pub struct BookingService {
    store: Arc<dyn BookingStore>,
    validator: Arc<dyn BookingRequestValidator>,
    doctor_locks: Arc<DoctorLocks>,
}

impl BookingService {
    /// Creates a service that admits bookings with an [`AdmissionValidator`] over the same store.
    ///
    /// # Arguments
    ///
    /// * `store` - Where clinics, doctors, patients and bookings are read and written.
    /// * `clock` - Source of "now" for the past-booking check.
    pub fn new(store: Arc<dyn BookingStore>, clock: Arc<dyn Clock>) -> Self {
        let validator = Arc::new(AdmissionValidator::new(store.clone(), clock));
        Self::with_validator(store, validator)
    }

    /// Creates a service that admits bookings with a caller-supplied validator.
    ///
    /// Used by tests and by callers that add their own admission rules.
    pub fn with_validator(
        store: Arc<dyn BookingStore>,
        validator: Arc<dyn BookingRequestValidator>,
    ) -> Self {
        Self {
            store,
            validator,
            doctor_locks: Arc::new(DoctorLocks::default()),
        }
    }

    /// Admits and persists a booking.
    ///
    /// The persisted booking keeps the request's id (or gets a fresh one), copies the interval
    /// and references verbatim, starts uncancelled, and carries the surgery-type code of the
    /// patient's clinic.
    ///
    /// # Arguments
    ///
    /// * `request` - The proposed booking. Its id is used if present.
    ///
    /// # Returns
    ///
    /// Returns the persisted `Booking`, with `doctor` and `patient` left unpopulated.
    ///
    /// # Errors
    ///
    /// Returns a `BookingError` if:
    /// - `BookingError::InvalidInput` with the validator's message if the request is rejected.
    /// - `BookingError::DoctorNotFound`, `PatientNotFound` or `ClinicNotFound` if a reference
    ///   does not resolve.
    /// - `BookingError::DuplicateBooking` if the caller-supplied id is taken.
    /// - Any storage error from the store, unchanged.
    pub fn add_booking(&self, request: BookingRequest) -> BookingResult<Booking> {
        let claim = self.doctor_locks.for_doctor(&request.doctor_id);
        let _guard = claim.lock();

        let result = self.validator.validate(&request)?;
        if !result.passed {
            let reason = result
                .first_error()
                .unwrap_or("booking request failed validation");
            return Err(BookingError::InvalidInput(reason.to_string()));
        }

        self.store.find_doctor(&request.doctor_id)?;
        let patient = self.store.find_patient(&request.patient_id)?;
        let clinic = self.store.find_clinic(&patient.clinic_id)?;

        let booking = Booking {
            id: request.id.unwrap_or_default(),
            patient_id: request.patient_id,
            doctor_id: request.doctor_id,
            start_time: request.start_time,
            end_time: request.end_time,
            cancelled: false,
            surgery_type: clinic.surgery_type.code(),
            doctor: None,
            patient: None,
        };

        self.store.insert_booking(&booking)?;

        tracing::info!(
            booking_id = %booking.id,
            doctor_id = %booking.doctor_id,
            patient_id = %booking.patient_id,
            "booking created for {} to {}",
            booking.start_time,
            booking.end_time
        );

        Ok(booking)
    }

    /// Marks a booking as cancelled. Cancelling an already-cancelled booking changes nothing.
    ///
    /// # Errors
    ///
    /// `BookingError::BookingNotFound` if the booking does not exist, or a storage error.
    pub fn cancel_booking(&self, id: &BookingId) -> BookingResult<Booking> {
        let mut booking = self.store.find_booking(id)?;
        if booking.cancelled {
            return Ok(booking);
        }

        booking.cancelled = true;
        self.store.update_booking(&booking)?;
        tracing::info!(booking_id = %id, "booking cancelled");

        Ok(booking)
    }

    /// All bookings for a doctor ordered by start time, cancelled ones included.
    ///
    /// # Errors
    ///
    /// `BookingError::DoctorNotFound` if the doctor is unknown, or a storage error.
    pub fn doctor_schedule(&self, doctor_id: &DoctorId) -> BookingResult<Vec<Booking>> {
        self.store.find_doctor(doctor_id)?;
        let mut bookings = self.store.find_bookings_by_doctor(doctor_id)?;
        bookings.sort_by(|a, b| a.start_time.cmp(&b.start_time).then(a.id.cmp(&b.id)));
        Ok(bookings)
    }

    /// Registers a clinic under a fresh id.
    ///
    /// # Arguments
    ///
    /// * `name` - Display name of the clinic.
    /// * `surgery_type` - Classification copied onto every booking for the clinic's patients.
    ///
    /// # Returns
    ///
    /// Returns the stored `Clinic`.
    ///
    /// # Errors
    ///
    /// Returns a storage `BookingError` if the clinic cannot be written.
    pub fn register_clinic(
        &self,
        name: NonEmptyText,
        surgery_type: SurgeryType,
    ) -> BookingResult<Clinic> {
        let clinic = Clinic {
            id: ClinicId::new(),
            name,
            surgery_type,
        };
        self.store.insert_clinic(&clinic)?;
        tracing::info!(clinic_id = %clinic.id, "clinic registered");
        Ok(clinic)
    }

    /// Registers a doctor under a fresh id. The doctor starts with an empty schedule.
    ///
    /// # Errors
    ///
    /// Returns a storage `BookingError` if the doctor cannot be written.
    pub fn register_doctor(&self, name: NonEmptyText) -> BookingResult<Doctor> {
        let doctor = Doctor {
            id: DoctorId::new(),
            name,
        };
        self.store.insert_doctor(&doctor)?;
        tracing::info!(doctor_id = %doctor.id, "doctor registered");
        Ok(doctor)
    }

    /// Registers a patient at an existing clinic.
    ///
    /// # Arguments
    ///
    /// * `name` - Display name of the patient.
    /// * `clinic_id` - The clinic whose surgery type the patient's bookings will carry.
    ///
    /// # Errors
    ///
    /// `BookingError::ClinicNotFound` if `clinic_id` is unknown, or a storage error.
    pub fn register_patient(
        &self,
        name: NonEmptyText,
        clinic_id: ClinicId,
    ) -> BookingResult<Patient> {
        self.store.find_clinic(&clinic_id)?;
        let patient = Patient {
            id: PatientId::new(),
            name,
            clinic_id,
        };
        self.store.insert_patient(&patient)?;
        tracing::info!(patient_id = %patient.id, clinic_id = %clinic_id, "patient registered");
        Ok(patient)
    }
}
