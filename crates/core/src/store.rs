//! The storage collaborator.
//!
//! Everything the booking core reads or writes goes through [`BookingStore`]. Relationships
//! (patient to clinic, doctor to bookings) are explicit lookups returning plain data, so the
//! validator and service know nothing about how records are kept.
//!
//! Implementations live in [`crate::repositories`].

use crate::ids::{BookingId, ClinicId, DoctorId, PatientId};
use crate::models::{Booking, Clinic, Doctor, Patient};
use crate::BookingResult;

pub trait BookingStore: Send + Sync {
    /// All bookings for `doctor_id`, cancelled ones included. Order is unspecified.
    fn find_bookings_by_doctor(&self, doctor_id: &DoctorId) -> BookingResult<Vec<Booking>>;

    /// # Errors
    ///
    /// `BookingError::BookingNotFound` if no booking has this id.
    fn find_booking(&self, id: &BookingId) -> BookingResult<Booking>;

    /// # Errors
    ///
    /// `BookingError::PatientNotFound` if no patient has this id.
    fn find_patient(&self, id: &PatientId) -> BookingResult<Patient>;

    /// # Errors
    ///
    /// `BookingError::ClinicNotFound` if no clinic has this id.
    fn find_clinic(&self, id: &ClinicId) -> BookingResult<Clinic>;

    /// # Errors
    ///
    /// `BookingError::DoctorNotFound` if no doctor has this id.
    fn find_doctor(&self, id: &DoctorId) -> BookingResult<Doctor>;

    /// Writes a new booking as a single atomic operation.
    ///
    /// # Errors
    ///
    /// `BookingError::DuplicateBooking` if a booking with the same id already exists.
    fn insert_booking(&self, booking: &Booking) -> BookingResult<()>;

    /// Replaces an existing booking.
    ///
    /// # Errors
    ///
    /// `BookingError::BookingNotFound` if the booking does not exist.
    fn update_booking(&self, booking: &Booking) -> BookingResult<()>;

    fn insert_clinic(&self, clinic: &Clinic) -> BookingResult<()>;

    fn insert_doctor(&self, doctor: &Doctor) -> BookingResult<()>;

    fn insert_patient(&self, patient: &Patient) -> BookingResult<()>;
}
