use std::fmt;

use chrono::{DateTime, Datelike, Duration, NaiveDateTime, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use shared_models::error::{AppError, FieldError};

pub const FIRST_WEEK_DAY: i32 = 0; // Sunday
pub const LAST_WEEK_DAY: i32 = 6; // Saturday

/// Schedule fields as submitted by the doctor form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorSchedule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub name: String,
    pub specialty: String,
    pub appointment_price_in_cents: i64,
    pub available_from_week_day: i32,
    pub available_to_week_day: i32,
    pub available_from_time: String,
    pub available_to_time: String,
}

impl DoctorSchedule {
    pub fn is_update(&self) -> bool {
        self.id.is_some()
    }
}

/// Raw form submission. Missing, null or non-numeric values come through
/// as `None` / empty text so validation can report them per field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorScheduleForm {
    #[serde(default)]
    pub id: Option<Uuid>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub specialty: String,
    #[serde(default, deserialize_with = "lenient_integer")]
    pub appointment_price_in_cents: Option<i64>,
    #[serde(default, deserialize_with = "lenient_integer")]
    pub available_from_week_day: Option<i32>,
    #[serde(default, deserialize_with = "lenient_integer")]
    pub available_to_week_day: Option<i32>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub available_from_time: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub available_to_time: String,
}

impl From<DoctorSchedule> for DoctorScheduleForm {
    fn from(schedule: DoctorSchedule) -> Self {
        Self {
            id: schedule.id,
            name: schedule.name,
            specialty: schedule.specialty,
            appointment_price_in_cents: Some(schedule.appointment_price_in_cents),
            available_from_week_day: Some(schedule.available_from_week_day),
            available_to_week_day: Some(schedule.available_to_week_day),
            available_from_time: schedule.available_from_time,
            available_to_time: schedule.available_to_time,
        }
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(text)) => text,
        _ => String::new(),
    })
}

fn lenient_integer<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<i64>,
{
    let number = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(text)) => text.trim().parse::<i64>().ok(),
        _ => None,
    };
    Ok(number.and_then(|n| T::try_from(n).ok()))
}

/// A doctor row as stored in the `doctors` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoctorRecord {
    pub id: Uuid,
    #[serde(default)]
    pub clinic_id: Option<Uuid>,
    pub name: String,
    pub specialty: String,
    pub appointment_price_in_cents: i64,
    pub available_from_week_day: i32,
    pub available_to_week_day: i32,
    pub available_from_time: String,
    pub available_to_time: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScheduleField {
    Name,
    Specialty,
    AppointmentPriceInCents,
    AvailableFromWeekDay,
    AvailableToWeekDay,
    AvailableFromTime,
    AvailableToTime,
}

impl ScheduleField {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScheduleField::Name => "name",
            ScheduleField::Specialty => "specialty",
            ScheduleField::AppointmentPriceInCents => "appointmentPriceInCents",
            ScheduleField::AvailableFromWeekDay => "availableFromWeekDay",
            ScheduleField::AvailableToWeekDay => "availableToWeekDay",
            ScheduleField::AvailableFromTime => "availableFromTime",
            ScheduleField::AvailableToTime => "availableToTime",
        }
    }
}

impl fmt::Display for ScheduleField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureCode {
    EmptyName,
    EmptySpecialty,
    InvalidPrice,
    WeekdayOutOfRange,
    EmptyTime,
    InvalidTime,
    TimeRangeInverted,
}

impl FailureCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureCode::EmptyName => "EMPTY_NAME",
            FailureCode::EmptySpecialty => "EMPTY_SPECIALTY",
            FailureCode::InvalidPrice => "INVALID_PRICE",
            FailureCode::WeekdayOutOfRange => "WEEKDAY_OUT_OF_RANGE",
            FailureCode::EmptyTime => "EMPTY_TIME",
            FailureCode::InvalidTime => "INVALID_TIME",
            FailureCode::TimeRangeInverted => "TIME_RANGE_INVERTED",
        }
    }

    /// Message shown next to the offending form field.
    pub fn message(&self) -> &'static str {
        match self {
            FailureCode::EmptyName => "Nome é obrigatório",
            FailureCode::EmptySpecialty => "Especialidade é obrigatória",
            FailureCode::InvalidPrice => "Preço é obrigatório",
            FailureCode::WeekdayOutOfRange => "Dia da semana inválido",
            FailureCode::EmptyTime => "Horário é obrigatório",
            FailureCode::InvalidTime => "Horário inválido",
            FailureCode::TimeRangeInverted => "O horário inicial deve ser anterior ao horário final",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationFailure {
    pub field: ScheduleField,
    pub code: FailureCode,
}

impl ValidationFailure {
    pub fn new(field: ScheduleField, code: FailureCode) -> Self {
        Self { field, code }
    }

    pub fn message(&self) -> &'static str {
        self.code.message()
    }
}

impl From<ValidationFailure> for FieldError {
    fn from(failure: ValidationFailure) -> Self {
        FieldError {
            field: failure.field.as_str().to_string(),
            code: failure.code.as_str().to_string(),
            message: failure.message().to_string(),
        }
    }
}

/// Every problem found in a submitted schedule, in check order.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("schedule rejected with {} validation failure(s)", .0.len())]
pub struct ValidationErrors(pub Vec<ValidationFailure>);

impl ValidationErrors {
    pub fn failures(&self) -> &[ValidationFailure] {
        &self.0
    }

    pub fn contains(&self, field: ScheduleField, code: FailureCode) -> bool {
        self.0.iter().any(|f| f.field == field && f.code == code)
    }

    pub fn codes(&self) -> Vec<FailureCode> {
        self.0.iter().map(|f| f.code).collect()
    }
}

/// Stored doctor data the resolver could not interpret.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("malformed schedule: {field} has unusable value {value:?}")]
pub struct MalformedSchedule {
    pub field: ScheduleField,
    pub value: String,
}

impl MalformedSchedule {
    pub const CODE: &'static str = "MALFORMED_SCHEDULE";
}

/// One end of an availability window, in clinic wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AvailabilityBoundary(pub NaiveDateTime);

impl AvailabilityBoundary {
    pub fn at(&self) -> NaiveDateTime {
        self.0
    }

    pub fn weekday(&self) -> Weekday {
        self.0.weekday()
    }

    /// 0 = Sunday .. 6 = Saturday, matching the stored week day fields.
    pub fn week_day(&self) -> i32 {
        self.0.weekday().num_days_from_sunday() as i32
    }

    pub fn weekday_label(&self) -> &'static str {
        weekday_label(self.weekday())
    }

    pub fn time_label(&self) -> String {
        self.0.format("%H:%M").to_string()
    }

    pub fn time_label_with_seconds(&self) -> String {
        self.0.format("%H:%M:%S").to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AvailabilityInterval {
    pub from: AvailabilityBoundary,
    pub to: AvailabilityBoundary,
}

impl AvailabilityInterval {
    pub fn duration(&self) -> Duration {
        self.to.0 - self.from.0
    }

    /// Whether `instant` falls inside the window, both ends inclusive.
    pub fn contains(&self, instant: NaiveDateTime) -> bool {
        self.from.0 <= instant && instant <= self.to.0
    }

    pub fn is_same_day(&self) -> bool {
        self.from.0.date() == self.to.0.date()
    }

    /// e.g. "segunda-feira a sexta-feira"
    pub fn week_days_label(&self) -> String {
        format!("{} a {}", self.from.weekday_label(), self.to.weekday_label())
    }

    /// e.g. "08:00 as 18:00"
    pub fn hours_label(&self) -> String {
        format!("{} as {}", self.from.time_label(), self.to.time_label())
    }
}

pub fn weekday_label(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Sun => "domingo",
        Weekday::Mon => "segunda-feira",
        Weekday::Tue => "terça-feira",
        Weekday::Wed => "quarta-feira",
        Weekday::Thu => "quinta-feira",
        Weekday::Fri => "sexta-feira",
        Weekday::Sat => "sábado",
    }
}

/// Parses `H:MM`, `HH:MM` or `HH:MM:SS` 24-hour clock times.
pub fn parse_clock_time(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .ok()
}

// DTOs for the availability badge response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityBoundaryView {
    pub at: NaiveDateTime,
    pub week_day: i32,
    pub week_day_label: String,
    pub time: String,
    pub time_with_seconds: String,
}

impl From<AvailabilityBoundary> for AvailabilityBoundaryView {
    fn from(boundary: AvailabilityBoundary) -> Self {
        Self {
            at: boundary.at(),
            week_day: boundary.week_day(),
            week_day_label: boundary.weekday_label().to_string(),
            time: boundary.time_label(),
            time_with_seconds: boundary.time_label_with_seconds(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorAvailabilityResponse {
    pub doctor_id: Uuid,
    pub doctor_name: String,
    pub from: AvailabilityBoundaryView,
    pub to: AvailabilityBoundaryView,
    pub week_days_label: String,
    pub hours_label: String,
}

impl DoctorAvailabilityResponse {
    pub fn new(doctor: &DoctorRecord, interval: &AvailabilityInterval) -> Self {
        Self {
            doctor_id: doctor.id,
            doctor_name: doctor.name.clone(),
            from: interval.from.into(),
            to: interval.to.into(),
            week_days_label: interval.week_days_label(),
            hours_label: interval.hours_label(),
        }
    }
}

// Error types specific to doctor operations
#[derive(Error, Debug)]
pub enum DoctorError {
    #[error("Doctor not found")]
    NotFound,

    #[error(transparent)]
    InvalidSchedule(#[from] ValidationErrors),

    #[error(transparent)]
    MalformedSchedule(#[from] MalformedSchedule),

    #[error("Doctor store error: {0}")]
    Store(#[from] anyhow::Error),
}

impl From<DoctorError> for AppError {
    fn from(err: DoctorError) -> Self {
        match err {
            DoctorError::NotFound => AppError::NotFound("Doctor not found".to_string()),
            DoctorError::InvalidSchedule(errors) => {
                AppError::FieldValidation(errors.0.into_iter().map(FieldError::from).collect())
            }
            DoctorError::MalformedSchedule(fault) => AppError::DataIntegrity {
                code: MalformedSchedule::CODE.to_string(),
                message: fault.to_string(),
            },
            DoctorError::Store(e) => AppError::Database(e.to_string()),
        }
    }
}
