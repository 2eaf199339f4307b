//! Booking admission rules.
//!
//! A proposed booking is admitted only if every [`AdmissionCheck`] passes. Checks run in the
//! fixed order of [`AdmissionCheck::ORDERED`] and stop at the first failure, so a rejected
//! [`ValidationResult`] always carries exactly one message.
//!
//! Overlap uses half-open intervals: `[a.start, a.end)` and `[b.start, b.end)` overlap iff
//! `a.start < b.end && b.start < a.end`. Bookings that only touch at an endpoint do not
//! conflict, and cancelled bookings never block a new one.

use crate::clock::Clock;
use crate::models::{Booking, BookingRequest};
use crate::store::BookingStore;
use crate::BookingResult;
use chrono::{DateTime, Utc};
use std::sync::Arc;

pub const BOOKING_IN_PAST_MESSAGE: &str = "Booking is in the past";
pub const BOOKING_ENDS_BEFORE_START_MESSAGE: &str = "Booking must end after it starts";
pub const DOCTOR_ALREADY_BOOKED_MESSAGE: &str =
    "A booking with this doctor already exists during this time";

/// Outcome of validating a [`BookingRequest`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationResult {
    pub passed: bool,
    pub errors: Vec<String>,
}

impl ValidationResult {
    /// A result for a request that passed every check: `passed` is true and `errors` is empty.
    pub fn pass() -> Self {
        Self {
            passed: true,
            errors: Vec::new(),
        }
    }

    /// A rejection carrying exactly one message.
    ///
    /// # Arguments
    ///
    /// * `message` - Human-readable reason, shown to callers verbatim.
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            passed: false,
            errors: vec![message.into()],
        }
    }

    /// The rejection reason, or `None` if the request passed.
    pub fn first_error(&self) -> Option<&str> {
        self.errors.first().map(String::as_str)
    }
}

/// One admission rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdmissionCheck {
    /// The booking starts before now.
    BookingInPast,
    /// The booking's end is not after its start.
    EndsBeforeStart,
    /// A non-cancelled booking for the same doctor overlaps the requested interval.
    DoctorAlreadyBooked,
}

impl AdmissionCheck {
    /// Evaluation order. Checks that do not need the doctor's schedule come first.
    pub const ORDERED: [AdmissionCheck; 3] = [
        AdmissionCheck::BookingInPast,
        AdmissionCheck::EndsBeforeStart,
        AdmissionCheck::DoctorAlreadyBooked,
    ];

    /// The message reported when this check fails.
    ///
    /// # Returns
    ///
    /// One of [`BOOKING_IN_PAST_MESSAGE`], [`BOOKING_ENDS_BEFORE_START_MESSAGE`] or
    /// [`DOCTOR_ALREADY_BOOKED_MESSAGE`].
    pub fn message(self) -> &'static str {
        match self {
            AdmissionCheck::BookingInPast => BOOKING_IN_PAST_MESSAGE,
            AdmissionCheck::EndsBeforeStart => BOOKING_ENDS_BEFORE_START_MESSAGE,
            AdmissionCheck::DoctorAlreadyBooked => DOCTOR_ALREADY_BOOKED_MESSAGE,
        }
    }

    /// True if the check reads the doctor's existing bookings.
    pub fn needs_schedule(self) -> bool {
        matches!(self, AdmissionCheck::DoctorAlreadyBooked)
    }

    /// True if `request` fails this check. `schedule` is only consulted by checks for which
    /// [`needs_schedule`](Self::needs_schedule) is true.
    pub fn fails(
        self,
        request: &BookingRequest,
        now: DateTime<Utc>,
        schedule: &[Booking],
    ) -> bool {
        match self {
            AdmissionCheck::BookingInPast => request.start_time < now,
            AdmissionCheck::EndsBeforeStart => request.end_time <= request.start_time,
            AdmissionCheck::DoctorAlreadyBooked => doctor_already_booked(schedule, request),
        }
    }
}

/// True if a non-cancelled booking in `schedule` for the request's doctor overlaps the
/// requested interval.
pub fn doctor_already_booked(schedule: &[Booking], request: &BookingRequest) -> bool {
    schedule.iter().any(|b| {
        !b.cancelled
            && b.doctor_id == request.doctor_id
            && b.overlaps(request.start_time, request.end_time)
    })
}

/// Runs every check against a schedule that has already been loaded.
///
/// # Arguments
///
/// * `request` - The proposed booking.
/// * `now` - The instant the past-booking check compares against.
/// * `schedule` - Existing bookings for the request's doctor, cancelled ones included.
///
/// # Returns
///
/// The result of the first failing check in [`AdmissionCheck::ORDERED`], or a pass.
pub fn evaluate(
    request: &BookingRequest,
    now: DateTime<Utc>,
    schedule: &[Booking],
) -> ValidationResult {
    AdmissionCheck::ORDERED
        .into_iter()
        .find(|check| check.fails(request, now, schedule))
        .map_or_else(ValidationResult::pass, |check| {
            ValidationResult::fail(check.message())
        })
}

/// Decides whether a booking request may be committed.
pub trait BookingRequestValidator: Send + Sync {
    /// # Errors
    ///
    /// Only store failures are errors. A rejected request is an `Ok` result with
    /// `passed == false`.
    fn validate(&self, request: &BookingRequest) -> BookingResult<ValidationResult>;
}

/// The production validator: reads "now" from the injected clock and the doctor's schedule
/// from the store. Holds no state of its own, so validating the same request twice gives the
/// same answer as long as the store and clock have not changed.
#[derive(Clone)]
pub struct AdmissionValidator {
    store: Arc<dyn BookingStore>,
    clock: Arc<dyn Clock>,
}

impl AdmissionValidator {
    /// # Arguments
    ///
    /// * `store` - Source of the doctor's schedule.
    /// * `clock` - Read once per validation for "now".
    pub fn new(store: Arc<dyn BookingStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }
}

impl BookingRequestValidator for AdmissionValidator {
    fn validate(&self, request: &BookingRequest) -> BookingResult<ValidationResult> {
        let now = self.clock.now();

        // A request that fails a schedule-free check never touches the store.
        let early_failure = AdmissionCheck::ORDERED
            .into_iter()
            .filter(|check| !check.needs_schedule())
            .find(|check| check.fails(request, now, &[]));

        let result = match early_failure {
            Some(check) => ValidationResult::fail(check.message()),
            None => {
                let schedule = self.store.find_bookings_by_doctor(&request.doctor_id)?;
                evaluate(request, now, &schedule)
            }
        };

        if let Some(reason) = result.first_error() {
            tracing::warn!(
                doctor_id = %request.doctor_id,
                patient_id = %request.patient_id,
                "booking rejected: {}",
                reason
            );
        }

        Ok(result)
    }
}
