//! Typed record identifiers.
//!
//! Each record kind gets its own wrapper around [`RecordId`] so a doctor id can never be passed
//! where a patient id is expected. All of them share the canonical 32-hex form.

use booking_uuid::{RecordId, UuidResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(RecordId);

        impl $name {
            /// Generates a fresh identifier.
            pub fn new() -> Self {
                Self(RecordId::new())
            }

            /// Parses a canonical identifier supplied from outside the core.
            pub fn parse(input: &str) -> UuidResult<Self> {
                RecordId::parse(input).map(Self)
            }

            pub fn record_id(&self) -> RecordId {
                self.0
            }

            pub(crate) fn sharded_dir(&self, parent_dir: &Path) -> PathBuf {
                self.0.sharded_dir(parent_dir)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<RecordId> for $name {
            fn from(value: RecordId) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl FromStr for $name {
            type Err = booking_uuid::UuidError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }
    };
}

record_id!(
    /// Identifies a booking (an appointment between a patient and a doctor).
    BookingId
);
record_id!(
    /// Identifies a clinic.
    ClinicId
);
record_id!(
    /// Identifies a doctor.
    DoctorId
);
record_id!(
    /// Identifies a patient.
    PatientId
);
