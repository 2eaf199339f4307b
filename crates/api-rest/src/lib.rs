//! # API REST
//!
//! REST API for clinic bookings.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI documentation
//! - REST-specific concerns (JSON bodies, status codes, CORS)
//!
//! All booking rules live in `booking-core`; handlers only translate between JSON and the
//! [`BookingService`].

#![warn(rust_2018_idioms)]

use axum::{
    extract::{Path as AxumPath, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use booking_core::{
    open_store, Booking, BookingError, BookingId, BookingRequest, BookingResult, BookingService,
    Clinic, ClinicId, CoreConfig, Doctor, DoctorId, ErrorKind, NonEmptyText, Patient, PatientId,
    SurgeryType, SystemClock,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::{OpenApi, ToSchema};

/// Application state shared across REST handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: BookingService,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    pub error: String,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct CreateClinicReq {
    pub name: String,
    /// `system_one`, `system_two`, or the integer code.
    pub surgery_type: String,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct ClinicRes {
    pub id: String,
    pub name: String,
    pub surgery_type: String,
    pub surgery_type_code: i32,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct CreateDoctorReq {
    pub name: String,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct DoctorRes {
    pub id: String,
    pub name: String,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct CreatePatientReq {
    pub name: String,
    pub clinic_id: String,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct PatientRes {
    pub id: String,
    pub name: String,
    pub clinic_id: String,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct CreateBookingReq {
    /// Optional caller-chosen booking id; generated when absent.
    #[serde(default)]
    pub id: Option<String>,
    pub patient_id: String,
    pub doctor_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct BookingRes {
    pub id: String,
    pub patient_id: String,
    pub doctor_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub cancelled: bool,
    pub surgery_type: i32,
}

impl From<Clinic> for ClinicRes {
    fn from(clinic: Clinic) -> Self {
        Self {
            id: clinic.id.to_string(),
            name: clinic.name.into_inner(),
            surgery_type: clinic.surgery_type.to_string(),
            surgery_type_code: clinic.surgery_type.code(),
        }
    }
}

impl From<Doctor> for DoctorRes {
    fn from(doctor: Doctor) -> Self {
        Self {
            id: doctor.id.to_string(),
            name: doctor.name.into_inner(),
        }
    }
}

impl From<Patient> for PatientRes {
    fn from(patient: Patient) -> Self {
        Self {
            id: patient.id.to_string(),
            name: patient.name.into_inner(),
            clinic_id: patient.clinic_id.to_string(),
        }
    }
}

impl From<Booking> for BookingRes {
    fn from(booking: Booking) -> Self {
        Self {
            id: booking.id.to_string(),
            patient_id: booking.patient_id.to_string(),
            doctor_id: booking.doctor_id.to_string(),
            start_time: booking.start_time,
            end_time: booking.end_time,
            cancelled: booking.cancelled,
            surgery_type: booking.surgery_type,
        }
    }
}

/// Handler error. Renders as `{"error": "..."}` with a status picked from [`ErrorKind`].
#[derive(Debug)]
pub enum ApiError {
    Booking(BookingError),
    Task(tokio::task::JoinError),
}

impl From<BookingError> for ApiError {
    fn from(err: BookingError) -> Self {
        ApiError::Booking(err)
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        ApiError::Task(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Booking(err) => match err.kind() {
                ErrorKind::InvalidInput => (StatusCode::BAD_REQUEST, err.to_string()),
                ErrorKind::NotFound => (StatusCode::NOT_FOUND, err.to_string()),
                ErrorKind::Storage => {
                    tracing::error!("Storage error: {:?}", err);
                    (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string())
                }
            },
            ApiError::Task(err) => {
                tracing::error!("Blocking task failed: {:?}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string())
            }
        };

        (status, Json(ErrorRes { error: message })).into_response()
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        create_clinic,
        create_doctor,
        create_patient,
        create_booking,
        cancel_booking,
        doctor_schedule,
    ),
    components(schemas(
        HealthRes,
        ErrorRes,
        CreateClinicReq,
        ClinicRes,
        CreateDoctorReq,
        DoctorRes,
        CreatePatientReq,
        PatientRes,
        CreateBookingReq,
        BookingRes,
    ))
)]
pub struct ApiDoc;

/// Builds the REST router over an existing service.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/clinics", post(create_clinic))
        .route("/doctors", post(create_doctor))
        .route("/patients", post(create_patient))
        .route("/bookings", post(create_booking))
        .route("/bookings/:id/cancel", post(cancel_booking))
        .route("/doctors/:id/bookings", get(doctor_schedule))
        .route("/api-docs/openapi.json", get(openapi_json))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Opens the configured store and serves the REST API on `addr` until the server stops.
///
/// # Errors
///
/// Returns an error if the store cannot be opened, the address cannot be bound, or the HTTP
/// server fails while running.
pub async fn serve(cfg: Arc<CoreConfig>, addr: &str) -> anyhow::Result<()> {
    let store = open_store(cfg.clone())?;
    let service = BookingService::new(store, Arc::new(SystemClock));

    tracing::info!(
        "++ Booking store: {} at {}",
        cfg.store_backend(),
        cfg.data_dir().display()
    );

    let app = router(AppState { service });
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Runs a service call on the blocking pool; the store does synchronous I/O and the per-doctor
/// lock may wait.
async fn run_blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> BookingResult<T> + Send + 'static,
    T: Send + 'static,
{
    Ok(tokio::task::spawn_blocking(f).await??)
}

fn parse_name(name: &str) -> BookingResult<NonEmptyText> {
    Ok(NonEmptyText::new(name)?)
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
async fn health() -> Json<HealthRes> {
    Json(HealthRes {
        ok: true,
        message: "Booking service is alive".into(),
    })
}

#[utoipa::path(
    post,
    path = "/clinics",
    request_body = CreateClinicReq,
    responses(
        (status = 201, description = "Clinic registered", body = ClinicRes),
        (status = 400, description = "Bad request", body = ErrorRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
#[axum::debug_handler]
async fn create_clinic(
    State(state): State<AppState>,
    Json(req): Json<CreateClinicReq>,
) -> Result<(StatusCode, Json<ClinicRes>), ApiError> {
    let service = state.service.clone();
    let clinic = run_blocking(move || {
        let name = parse_name(&req.name)?;
        let surgery_type: SurgeryType = req.surgery_type.parse()?;
        service.register_clinic(name, surgery_type)
    })
    .await?;

    Ok((StatusCode::CREATED, Json(clinic.into())))
}

#[utoipa::path(
    post,
    path = "/doctors",
    request_body = CreateDoctorReq,
    responses(
        (status = 201, description = "Doctor registered", body = DoctorRes),
        (status = 400, description = "Bad request", body = ErrorRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
#[axum::debug_handler]
async fn create_doctor(
    State(state): State<AppState>,
    Json(req): Json<CreateDoctorReq>,
) -> Result<(StatusCode, Json<DoctorRes>), ApiError> {
    let service = state.service.clone();
    let doctor = run_blocking(move || service.register_doctor(parse_name(&req.name)?)).await?;

    Ok((StatusCode::CREATED, Json(doctor.into())))
}

#[utoipa::path(
    post,
    path = "/patients",
    request_body = CreatePatientReq,
    responses(
        (status = 201, description = "Patient registered", body = PatientRes),
        (status = 400, description = "Bad request", body = ErrorRes),
        (status = 404, description = "Clinic not found", body = ErrorRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
#[axum::debug_handler]
async fn create_patient(
    State(state): State<AppState>,
    Json(req): Json<CreatePatientReq>,
) -> Result<(StatusCode, Json<PatientRes>), ApiError> {
    let service = state.service.clone();
    let patient = run_blocking(move || {
        let name = parse_name(&req.name)?;
        let clinic_id = ClinicId::parse(&req.clinic_id)?;
        service.register_patient(name, clinic_id)
    })
    .await?;

    Ok((StatusCode::CREATED, Json(patient.into())))
}

#[utoipa::path(
    post,
    path = "/bookings",
    request_body = CreateBookingReq,
    responses(
        (status = 201, description = "Booking created", body = BookingRes),
        (status = 400, description = "Booking rejected", body = ErrorRes),
        (status = 404, description = "Patient, doctor or clinic not found", body = ErrorRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
#[axum::debug_handler]
async fn create_booking(
    State(state): State<AppState>,
    Json(req): Json<CreateBookingReq>,
) -> Result<(StatusCode, Json<BookingRes>), ApiError> {
    let service = state.service.clone();
    let booking = run_blocking(move || {
        let mut request = BookingRequest::new(
            PatientId::parse(&req.patient_id)?,
            DoctorId::parse(&req.doctor_id)?,
            req.start_time,
            req.end_time,
        );
        if let Some(id) = req.id.as_deref() {
            request = request.with_id(BookingId::parse(id)?);
        }
        service.add_booking(request)
    })
    .await?;

    Ok((StatusCode::CREATED, Json(booking.into())))
}

#[utoipa::path(
    post,
    path = "/bookings/{id}/cancel",
    params(("id" = String, Path, description = "Booking id")),
    responses(
        (status = 200, description = "Booking cancelled", body = BookingRes),
        (status = 400, description = "Invalid booking id", body = ErrorRes),
        (status = 404, description = "Booking not found", body = ErrorRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
#[axum::debug_handler]
async fn cancel_booking(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> Result<Json<BookingRes>, ApiError> {
    let service = state.service.clone();
    let booking = run_blocking(move || service.cancel_booking(&BookingId::parse(&id)?)).await?;

    Ok(Json(booking.into()))
}

#[utoipa::path(
    get,
    path = "/doctors/{id}/bookings",
    params(("id" = String, Path, description = "Doctor id")),
    responses(
        (status = 200, description = "Doctor schedule ordered by start time", body = [BookingRes]),
        (status = 400, description = "Invalid doctor id", body = ErrorRes),
        (status = 404, description = "Doctor not found", body = ErrorRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
#[axum::debug_handler]
async fn doctor_schedule(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> Result<Json<Vec<BookingRes>>, ApiError> {
    let service = state.service.clone();
    let bookings =
        run_blocking(move || service.doctor_schedule(&DoctorId::parse(&id)?)).await?;

    Ok(Json(bookings.into_iter().map(BookingRes::from).collect()))
}
