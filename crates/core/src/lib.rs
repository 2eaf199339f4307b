//! # Booking Core
//!
//! Core business logic for clinic appointment bookings.
//!
//! This crate contains the booking admission rules and pure data operations:
//! - [`validation`]: the ordered admission checks (past booking, interval shape, doctor
//!   availability)
//! - [`booking`]: the [`BookingService`] that validates, derives denormalised fields and persists
//! - [`store`]: the [`BookingStore`] collaborator trait, with in-memory and file-backed
//!   implementations in [`repositories`]
//! - [`clock`]: the injected time source used by admission
//!
//! **No API concerns**: HTTP servers and CLI parsing belong in `api-rest` and `booking-cli`.

pub mod booking;
pub mod clock;
pub mod config;
pub mod constants;
pub mod error;
pub mod ids;
pub mod models;
pub mod repositories;
pub mod store;
pub mod validation;

pub use booking::BookingService;
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{CoreConfig, StoreBackend};
pub use constants::DEFAULT_BOOKING_DATA_DIR;
pub use error::{BookingError, BookingResult, ErrorKind};
pub use ids::{BookingId, ClinicId, DoctorId, PatientId};
pub use models::{Booking, BookingRequest, Clinic, Doctor, Patient, SurgeryType};
pub use repositories::{file::FileBookingStore, memory::InMemoryBookingStore, open_store};
pub use store::BookingStore;
pub use validation::{AdmissionValidator, BookingRequestValidator, ValidationResult};

pub use booking_types::{NonEmptyText, TextError};
pub use booking_uuid::{RecordId, UuidError};
