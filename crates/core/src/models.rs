//! Plain data records held by a [`BookingStore`](crate::store::BookingStore).

use crate::ids::{BookingId, ClinicId, DoctorId, PatientId};
use crate::{BookingError, NonEmptyText};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Surgery-type classification owned by a clinic.
///
/// The integer [`code`](SurgeryType::code) is what gets copied onto each booking.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurgeryType {
    SystemOne,
    SystemTwo,
}

impl SurgeryType {
    pub const fn code(self) -> i32 {
        match self {
            SurgeryType::SystemOne => 0,
            SurgeryType::SystemTwo => 1,
        }
    }

    pub const fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(SurgeryType::SystemOne),
            1 => Some(SurgeryType::SystemTwo),
            _ => None,
        }
    }
}

impl fmt::Display for SurgeryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SurgeryType::SystemOne => f.write_str("system_one"),
            SurgeryType::SystemTwo => f.write_str("system_two"),
        }
    }
}

impl FromStr for SurgeryType {
    type Err = BookingError;

    /// Accepts the snake_case name (`system_one`, `system-one`) or the integer code.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalised = s.trim().to_ascii_lowercase().replace('-', "_");
        match normalised.as_str() {
            "system_one" => Ok(SurgeryType::SystemOne),
            "system_two" => Ok(SurgeryType::SystemTwo),
            other => other
                .parse::<i32>()
                .ok()
                .and_then(SurgeryType::from_code)
                .ok_or_else(|| {
                    BookingError::InvalidInput(format!("unknown surgery type '{}'", s.trim()))
                }),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clinic {
    pub id: ClinicId,
    pub name: NonEmptyText,
    pub surgery_type: SurgeryType,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Doctor {
    pub id: DoctorId,
    pub name: NonEmptyText,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
    pub id: PatientId,
    pub name: NonEmptyText,
    pub clinic_id: ClinicId,
}

/// A proposed booking. Transient: built by the caller and consumed by one
/// [`BookingService::add_booking`](crate::booking::BookingService::add_booking) call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BookingRequest {
    /// Caller-assigned identifier. `None` means the service allocates one.
    pub id: Option<BookingId>,
    pub patient_id: PatientId,
    pub doctor_id: DoctorId,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl BookingRequest {
    pub fn new(
        patient_id: PatientId,
        doctor_id: DoctorId,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Self {
        Self {
            id: None,
            patient_id,
            doctor_id,
            start_time,
            end_time,
        }
    }

    pub fn with_id(mut self, id: BookingId) -> Self {
        self.id = Some(id);
        self
    }
}

/// A persisted booking.
///
/// `surgery_type` is copied from the patient's clinic when the booking is created and never
/// changes afterwards. `doctor` and `patient` are denormalised links that are never stored; they
/// stay `None` on write and are filled in by readers that want them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: BookingId,
    pub patient_id: PatientId,
    pub doctor_id: DoctorId,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(default)]
    pub cancelled: bool,
    pub surgery_type: i32,
    #[serde(skip)]
    pub doctor: Option<Doctor>,
    #[serde(skip)]
    pub patient: Option<Patient>,
}

impl Booking {
    /// True if `[start, end)` intersects this booking's `[start_time, end_time)`.
    ///
    /// Touching endpoints do not count. Cancellation is not considered here.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start_time < end && start < self.end_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn booking_at(start: DateTime<Utc>, minutes: i64) -> Booking {
        Booking {
            id: BookingId::new(),
            patient_id: PatientId::new(),
            doctor_id: DoctorId::new(),
            start_time: start,
            end_time: start + Duration::minutes(minutes),
            cancelled: false,
            surgery_type: SurgeryType::SystemOne.code(),
            doctor: None,
            patient: None,
        }
    }

    #[test]
    fn test_surgery_type_codes_round_trip() {
        for surgery_type in [SurgeryType::SystemOne, SurgeryType::SystemTwo] {
            assert_eq!(SurgeryType::from_code(surgery_type.code()), Some(surgery_type));
        }
        assert_eq!(SurgeryType::from_code(7), None);
    }

    #[test]
    fn test_surgery_type_parses_names_and_codes() {
        assert_eq!(
            "system-two".parse::<SurgeryType>().expect("should parse"),
            SurgeryType::SystemTwo
        );
        assert_eq!(
            "0".parse::<SurgeryType>().expect("should parse"),
            SurgeryType::SystemOne
        );
        assert!("2".parse::<SurgeryType>().is_err());
        assert!("dental".parse::<SurgeryType>().is_err());
    }

    #[test]
    fn test_overlaps_excludes_touching_endpoints() {
        let start = Utc.with_ymd_and_hms(2030, 1, 1, 9, 0, 0).unwrap();
        let booking = booking_at(start, 60);

        assert!(booking.overlaps(start, start + Duration::minutes(60)));
        assert!(booking.overlaps(start + Duration::minutes(59), start + Duration::minutes(70)));
        assert!(!booking.overlaps(start + Duration::minutes(60), start + Duration::minutes(120)));
        assert!(!booking.overlaps(start - Duration::minutes(30), start));
    }

    #[test]
    fn test_booking_links_are_not_serialized() {
        let start = Utc.with_ymd_and_hms(2030, 1, 1, 9, 0, 0).unwrap();
        let mut booking = booking_at(start, 30);
        booking.doctor = Some(Doctor {
            id: booking.doctor_id,
            name: NonEmptyText::new("Dr Adeyemi").unwrap(),
        });

        let yaml = serde_yaml::to_string(&booking).expect("should serialize");
        assert!(!yaml.contains("Dr Adeyemi"));

        let back: Booking = serde_yaml::from_str(&yaml).expect("should deserialize");
        assert_eq!(back.doctor, None);
        assert_eq!(back.id, booking.id);
        assert_eq!(back.start_time, booking.start_time);
    }
}
