//! Constants used throughout the booking core crate.
//!
//! Directory and file names for the file-backed store live here so the layout is defined in
//! one place.

/// Default directory for booking data when no explicit directory is configured.
pub const DEFAULT_BOOKING_DATA_DIR: &str = "booking_data";

/// Directory name for clinic records.
pub const CLINICS_DIR_NAME: &str = "clinics";

/// Directory name for doctor records.
pub const DOCTORS_DIR_NAME: &str = "doctors";

/// Directory name for patient records.
pub const PATIENTS_DIR_NAME: &str = "patients";

/// Directory name for booking records.
pub const BOOKINGS_DIR_NAME: &str = "bookings";

/// Filename for a clinic record.
pub const CLINIC_FILENAME: &str = "clinic.yaml";

/// Filename for a doctor record.
pub const DOCTOR_FILENAME: &str = "doctor.yaml";

/// Filename for a patient record.
pub const PATIENT_FILENAME: &str = "patient.yaml";

/// Filename for a booking record.
pub const BOOKING_FILENAME: &str = "booking.yaml";

/// Suffix for the temporary file a record is written to before being renamed into place.
pub const TEMP_FILE_SUFFIX: &str = ".tmp";
