//! Process-local booking store.
//!
//! Each record kind sits in its own `RwLock<HashMap<..>>`. Used by tests and by servers started
//! with the `memory` backend.

use crate::ids::{BookingId, ClinicId, DoctorId, PatientId};
use crate::models::{Booking, Clinic, Doctor, Patient};
use crate::store::BookingStore;
use crate::{BookingError, BookingResult};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Default)]
pub struct InMemoryBookingStore {
    clinics: RwLock<HashMap<ClinicId, Clinic>>,
    doctors: RwLock<HashMap<DoctorId, Doctor>>,
    patients: RwLock<HashMap<PatientId, Patient>>,
    bookings: RwLock<HashMap<BookingId, Booking>>,
}

fn read<'a, K, V>(
    lock: &'a RwLock<HashMap<K, V>>,
    name: &'static str,
) -> BookingResult<RwLockReadGuard<'a, HashMap<K, V>>> {
    lock.read().map_err(|_| BookingError::LockPoisoned(name))
}

fn write<'a, K, V>(
    lock: &'a RwLock<HashMap<K, V>>,
    name: &'static str,
) -> BookingResult<RwLockWriteGuard<'a, HashMap<K, V>>> {
    lock.write().map_err(|_| BookingError::LockPoisoned(name))
}

impl InMemoryBookingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BookingStore for InMemoryBookingStore {
    fn find_bookings_by_doctor(&self, doctor_id: &DoctorId) -> BookingResult<Vec<Booking>> {
        let bookings = read(&self.bookings, "bookings")?;
        Ok(bookings
            .values()
            .filter(|b| b.doctor_id == *doctor_id)
            .cloned()
            .collect())
    }

    fn find_booking(&self, id: &BookingId) -> BookingResult<Booking> {
        read(&self.bookings, "bookings")?
            .get(id)
            .cloned()
            .ok_or(BookingError::BookingNotFound(*id))
    }

    fn find_patient(&self, id: &PatientId) -> BookingResult<Patient> {
        read(&self.patients, "patients")?
            .get(id)
            .cloned()
            .ok_or(BookingError::PatientNotFound(*id))
    }

    fn find_clinic(&self, id: &ClinicId) -> BookingResult<Clinic> {
        read(&self.clinics, "clinics")?
            .get(id)
            .cloned()
            .ok_or(BookingError::ClinicNotFound(*id))
    }

    fn find_doctor(&self, id: &DoctorId) -> BookingResult<Doctor> {
        read(&self.doctors, "doctors")?
            .get(id)
            .cloned()
            .ok_or(BookingError::DoctorNotFound(*id))
    }

    fn insert_booking(&self, booking: &Booking) -> BookingResult<()> {
        let mut bookings = write(&self.bookings, "bookings")?;
        match bookings.entry(booking.id) {
            Entry::Occupied(_) => Err(BookingError::DuplicateBooking(booking.id)),
            Entry::Vacant(slot) => {
                slot.insert(booking.clone());
                Ok(())
            }
        }
    }

    fn update_booking(&self, booking: &Booking) -> BookingResult<()> {
        let mut bookings = write(&self.bookings, "bookings")?;
        match bookings.get_mut(&booking.id) {
            Some(existing) => {
                *existing = booking.clone();
                Ok(())
            }
            None => Err(BookingError::BookingNotFound(booking.id)),
        }
    }

    fn insert_clinic(&self, clinic: &Clinic) -> BookingResult<()> {
        write(&self.clinics, "clinics")?.insert(clinic.id, clinic.clone());
        Ok(())
    }

    fn insert_doctor(&self, doctor: &Doctor) -> BookingResult<()> {
        write(&self.doctors, "doctors")?.insert(doctor.id, doctor.clone());
        Ok(())
    }

    fn insert_patient(&self, patient: &Patient) -> BookingResult<()> {
        write(&self.patients, "patients")?.insert(patient.id, patient.clone());
        Ok(())
    }
}
