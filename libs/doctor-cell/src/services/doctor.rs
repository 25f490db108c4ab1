use chrono::{NaiveDateTime, Utc};
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, error};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{AvailabilityInterval, DoctorError, DoctorRecord, DoctorScheduleForm};
use crate::services::{availability, validation};

const DOCTORS_PATH: &str = "/rest/v1/doctors";

/// Outcome of an upsert, so callers can tell inserts from updates.
#[derive(Debug, Clone)]
pub enum UpsertOutcome {
    Created(DoctorRecord),
    Updated(DoctorRecord),
}

impl UpsertOutcome {
    pub fn into_record(self) -> DoctorRecord {
        match self {
            UpsertOutcome::Created(record) | UpsertOutcome::Updated(record) => record,
        }
    }
}

pub struct DoctorService {
    supabase: SupabaseClient,
}

impl DoctorService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// Validate and store a doctor schedule. A schedule without `id` is
    /// inserted, one with `id` replaces the existing row.
    pub async fn upsert_doctor(
        &self,
        schedule: DoctorScheduleForm,
        clinic_id: Option<Uuid>,
        auth_token: Option<&str>,
    ) -> Result<UpsertOutcome, DoctorError> {
        let schedule = validation::validate_form(schedule)?;
        let now = Utc::now().to_rfc3339();

        let mut doctor_data = json!({
            "name": schedule.name,
            "specialty": schedule.specialty,
            "appointment_price_in_cents": schedule.appointment_price_in_cents,
            "available_from_week_day": schedule.available_from_week_day,
            "available_to_week_day": schedule.available_to_week_day,
            "available_from_time": schedule.available_from_time,
            "available_to_time": schedule.available_to_time,
            "updated_at": now,
        });
        if let Some(clinic_id) = clinic_id {
            doctor_data["clinic_id"] = json!(clinic_id);
        }

        match schedule.id {
            Some(doctor_id) => {
                debug!("Updating doctor: {}", doctor_id);

                let path = format!("{}?id=eq.{}", DOCTORS_PATH, doctor_id);
                let result: Vec<DoctorRecord> = self.supabase.request_with_headers(
                    Method::PATCH,
                    &path,
                    auth_token,
                    Some(doctor_data),
                    Some(SupabaseClient::return_representation()),
                ).await?;

                let doctor = result.into_iter().next().ok_or(DoctorError::NotFound)?;
                Ok(UpsertOutcome::Updated(doctor))
            }
            None => {
                debug!("Creating doctor: {}", schedule.name);

                doctor_data["created_at"] = json!(now);
                let result: Vec<DoctorRecord> = self.supabase.request_with_headers(
                    Method::POST,
                    DOCTORS_PATH,
                    auth_token,
                    Some(doctor_data),
                    Some(SupabaseClient::return_representation()),
                ).await?;

                let doctor = result.into_iter().next().ok_or_else(|| {
                    error!("Doctor insert returned no representation");
                    DoctorError::Store(anyhow::anyhow!("Failed to create doctor"))
                })?;
                debug!("Doctor created with ID: {}", doctor.id);
                Ok(UpsertOutcome::Created(doctor))
            }
        }
    }

    pub async fn get_doctor(
        &self,
        doctor_id: Uuid,
        auth_token: Option<&str>,
    ) -> Result<DoctorRecord, DoctorError> {
        debug!("Fetching doctor: {}", doctor_id);

        let path = format!("{}?id=eq.{}", DOCTORS_PATH, doctor_id);
        let result: Vec<DoctorRecord> = self.supabase.request(
            Method::GET,
            &path,
            auth_token,
            None,
        ).await?;

        result.into_iter().next().ok_or(DoctorError::NotFound)
    }

    pub async fn list_doctors(
        &self,
        clinic_id: Option<Uuid>,
        auth_token: Option<&str>,
    ) -> Result<Vec<DoctorRecord>, DoctorError> {
        debug!("Listing doctors for clinic: {:?}", clinic_id);

        let path = match clinic_id {
            Some(clinic_id) => format!("{}?clinic_id=eq.{}&order=name.asc", DOCTORS_PATH, clinic_id),
            None => format!("{}?order=name.asc", DOCTORS_PATH),
        };

        let doctors: Vec<DoctorRecord> = self.supabase.request(
            Method::GET,
            &path,
            auth_token,
            None,
        ).await?;

        Ok(doctors)
    }

    pub async fn delete_doctor(
        &self,
        doctor_id: Uuid,
        auth_token: Option<&str>,
    ) -> Result<(), DoctorError> {
        debug!("Deleting doctor: {}", doctor_id);

        let path = format!("{}?id=eq.{}", DOCTORS_PATH, doctor_id);
        let deleted: Vec<Value> = self.supabase.request_with_headers(
            Method::DELETE,
            &path,
            auth_token,
            None,
            Some(SupabaseClient::return_representation()),
        ).await?;

        if deleted.is_empty() {
            return Err(DoctorError::NotFound);
        }

        Ok(())
    }

    /// Fetches a doctor and resolves the availability window for the week
    /// around `reference_now`.
    pub async fn doctor_availability(
        &self,
        doctor_id: Uuid,
        reference_now: NaiveDateTime,
        auth_token: Option<&str>,
    ) -> Result<(DoctorRecord, AvailabilityInterval), DoctorError> {
        let doctor = self.get_doctor(doctor_id, auth_token).await?;
        let interval = availability::resolve(&doctor, reference_now).map_err(|fault| {
            error!("Doctor {} has a malformed schedule: {}", doctor_id, fault);
            fault
        })?;

        Ok((doctor, interval))
    }
}
