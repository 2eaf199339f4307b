use booking_core::{
    BookingId, BookingRequest, BookingService, ClinicId, CoreConfig, DoctorId, FileBookingStore,
    NonEmptyText, PatientId, StoreBackend, SurgeryType, SystemClock,
};
use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "booking")]
#[command(about = "Clinic booking CLI")]
struct Cli {
    /// Root directory of the file-backed store
    #[arg(
        long,
        global = true,
        env = "BOOKING_DATA_DIR",
        default_value = booking_core::DEFAULT_BOOKING_DATA_DIR
    )]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a clinic
    AddClinic {
        name: String,
        /// `system_one`, `system_two`, or the integer code
        #[arg(long, default_value = "system_one")]
        surgery_type: SurgeryType,
    },
    /// Register a doctor
    AddDoctor { name: String },
    /// Register a patient at a clinic
    AddPatient { name: String, clinic_id: String },
    /// Book a patient with a doctor
    Book {
        patient_id: String,
        doctor_id: String,
        /// Start time (RFC 3339, e.g. 2030-01-14T09:00:00Z)
        start: DateTime<Utc>,
        /// End time (RFC 3339)
        end: DateTime<Utc>,
        /// Use this booking id instead of generating one
        #[arg(long)]
        id: Option<String>,
    },
    /// Cancel a booking
    Cancel { booking_id: String },
    /// List a doctor's bookings by start time
    Schedule { doctor_id: String },
}

fn main() -> anyhow::Result<()> {
    run(Cli::parse())
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cfg = Arc::new(CoreConfig::new(cli.data_dir, StoreBackend::File)?);
    let store = FileBookingStore::open(cfg)?;
    let service = BookingService::new(Arc::new(store), Arc::new(SystemClock));

    match cli.command {
        Commands::AddClinic { name, surgery_type } => {
            let clinic = service.register_clinic(NonEmptyText::new(&name)?, surgery_type)?;
            println!("Clinic created: {} ({})", clinic.id, clinic.surgery_type);
        }
        Commands::AddDoctor { name } => {
            let doctor = service.register_doctor(NonEmptyText::new(&name)?)?;
            println!("Doctor created: {}", doctor.id);
        }
        Commands::AddPatient { name, clinic_id } => {
            let patient =
                service.register_patient(NonEmptyText::new(&name)?, ClinicId::parse(&clinic_id)?)?;
            println!("Patient created: {}", patient.id);
        }
        Commands::Book {
            patient_id,
            doctor_id,
            start,
            end,
            id,
        } => {
            let mut request = BookingRequest::new(
                PatientId::parse(&patient_id)?,
                DoctorId::parse(&doctor_id)?,
                start,
                end,
            );
            if let Some(id) = id {
                request = request.with_id(BookingId::parse(&id)?);
            }

            let booking = service.add_booking(request).context("Booking rejected")?;
            println!(
                "Booking created: {} (surgery type {})",
                booking.id, booking.surgery_type
            );
        }
        Commands::Cancel { booking_id } => {
            let booking = service.cancel_booking(&BookingId::parse(&booking_id)?)?;
            println!("Booking cancelled: {}", booking.id);
        }
        Commands::Schedule { doctor_id } => {
            let bookings = service.doctor_schedule(&DoctorId::parse(&doctor_id)?)?;
            if bookings.is_empty() {
                println!("No bookings found.");
            } else {
                for booking in bookings {
                    println!(
                        "ID: {}, Patient: {}, {} to {}{}",
                        booking.id,
                        booking.patient_id,
                        booking.start_time.to_rfc3339(),
                        booking.end_time.to_rfc3339(),
                        if booking.cancelled { " (cancelled)" } else { "" }
                    );
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_book_in_past_fails_with_rejection_context() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let data_dir = temp_dir.path().to_string_lossy().to_string();
        let patient_id = PatientId::new().to_string();
        let doctor_id = DoctorId::new().to_string();

        let cli = Cli::try_parse_from([
            "booking",
            "--data-dir",
            data_dir.as_str(),
            "book",
            patient_id.as_str(),
            doctor_id.as_str(),
            "2000-01-01T09:00:00Z",
            "2000-01-01T10:00:00Z",
        ])
        .expect("arguments should parse");

        let err = run(cli).expect_err("past booking should be rejected");
        assert_eq!(err.to_string(), "Booking rejected");
        assert_eq!(format!("{:#}", err), "Booking rejected: Booking is in the past");
    }
}
