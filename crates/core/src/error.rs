use crate::ids::{BookingId, ClinicId, DoctorId, PatientId};

/// Coarse classification of a [`BookingError`], used by callers that need to pick a response
/// (for example an HTTP status) without matching every variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller supplied something that can never succeed as given.
    InvalidInput,
    /// A referenced record does not exist.
    NotFound,
    /// The store could not be read or written.
    Storage,
}

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    /// Admission rejection or other caller error. The message is shown to users verbatim.
    #[error("{0}")]
    InvalidInput(String),
    #[error("booking {0} already exists")]
    DuplicateBooking(BookingId),
    #[error("invalid identifier: {0}")]
    Uuid(#[from] booking_uuid::UuidError),
    #[error("invalid name: {0}")]
    Text(#[from] booking_types::TextError),

    #[error("patient {0} not found")]
    PatientNotFound(PatientId),
    #[error("clinic {0} not found")]
    ClinicNotFound(ClinicId),
    #[error("doctor {0} not found")]
    DoctorNotFound(DoctorId),
    #[error("booking {0} not found")]
    BookingNotFound(BookingId),

    #[error("failed to create storage directory: {0}")]
    StorageDirCreation(std::io::Error),
    #[error("failed to write record file: {0}")]
    FileWrite(std::io::Error),
    #[error("failed to read record file: {0}")]
    FileRead(std::io::Error),
    #[error("failed to serialize YAML: {0}")]
    YamlSerialization(serde_yaml::Error),
    #[error("failed to deserialize YAML ({path}): {source}", path = path.display())]
    YamlDeserialization {
        path: std::path::PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("{0} lock poisoned")]
    LockPoisoned(&'static str),
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),
}

impl BookingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BookingError::InvalidInput(_)
            | BookingError::DuplicateBooking(_)
            | BookingError::Uuid(_)
            | BookingError::Text(_) => ErrorKind::InvalidInput,
            BookingError::PatientNotFound(_)
            | BookingError::ClinicNotFound(_)
            | BookingError::DoctorNotFound(_)
            | BookingError::BookingNotFound(_) => ErrorKind::NotFound,
            BookingError::StorageDirCreation(_)
            | BookingError::FileWrite(_)
            | BookingError::FileRead(_)
            | BookingError::YamlSerialization(_)
            | BookingError::YamlDeserialization { .. }
            | BookingError::LockPoisoned(_)
            | BookingError::StorageUnavailable(_) => ErrorKind::Storage,
        }
    }
}

pub type BookingResult<T> = std::result::Result<T, BookingError>;
