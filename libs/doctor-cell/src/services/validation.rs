use chrono::NaiveTime;
use tracing::debug;

use crate::models::{
    parse_clock_time, DoctorSchedule, DoctorScheduleForm, FailureCode, ScheduleField, ValidationErrors,
    ValidationFailure, FIRST_WEEK_DAY, LAST_WEEK_DAY,
};

/// Checks a schedule before it is stored.
///
/// Every field rule runs, then the from/to time comparison, so the caller
/// gets the full list of problems in one pass. Week day order is not
/// checked: `from > to` is a range wrapping over the weekend.
///
/// On success the schedule comes back with its text fields trimmed.
pub fn validate(input: DoctorSchedule) -> Result<DoctorSchedule, ValidationErrors> {
    validate_form(input.into())
}

/// Same rules as [`validate`] for a raw form, where a missing price or
/// week day is reported as a failure on that field.
pub fn validate_form(input: DoctorScheduleForm) -> Result<DoctorSchedule, ValidationErrors> {
    let mut failures = Vec::new();

    let name = input.name.trim().to_string();
    if name.is_empty() {
        failures.push(ValidationFailure::new(ScheduleField::Name, FailureCode::EmptyName));
    }

    let specialty = input.specialty.trim().to_string();
    if specialty.is_empty() {
        failures.push(ValidationFailure::new(ScheduleField::Specialty, FailureCode::EmptySpecialty));
    }

    let price = input.appointment_price_in_cents.filter(|price| *price >= 1);
    if price.is_none() {
        failures.push(ValidationFailure::new(
            ScheduleField::AppointmentPriceInCents,
            FailureCode::InvalidPrice,
        ));
    }

    let from_day = check_week_day(input.available_from_week_day, ScheduleField::AvailableFromWeekDay, &mut failures);
    let to_day = check_week_day(input.available_to_week_day, ScheduleField::AvailableToWeekDay, &mut failures);

    let from_time = check_time(&input.available_from_time, ScheduleField::AvailableFromTime, &mut failures);
    let to_time = check_time(&input.available_to_time, ScheduleField::AvailableToTime, &mut failures);

    if let (Some(from), Some(to)) = (from_time, to_time) {
        if from >= to {
            failures.push(ValidationFailure::new(
                ScheduleField::AvailableToTime,
                FailureCode::TimeRangeInverted,
            ));
        }
    }

    match (price, from_day, to_day) {
        (Some(appointment_price_in_cents), Some(available_from_week_day), Some(available_to_week_day))
            if failures.is_empty() =>
        {
            Ok(DoctorSchedule {
                id: input.id,
                name,
                specialty,
                appointment_price_in_cents,
                available_from_week_day,
                available_to_week_day,
                available_from_time: input.available_from_time.trim().to_string(),
                available_to_time: input.available_to_time.trim().to_string(),
            })
        }
        _ => {
            debug!("Rejected doctor schedule with {} failure(s): {:?}", failures.len(), failures);
            Err(ValidationErrors(failures))
        }
    }
}

fn check_week_day(
    value: Option<i32>,
    field: ScheduleField,
    failures: &mut Vec<ValidationFailure>,
) -> Option<i32> {
    let day = value.filter(|day| (FIRST_WEEK_DAY..=LAST_WEEK_DAY).contains(day));
    if day.is_none() {
        failures.push(ValidationFailure::new(field, FailureCode::WeekdayOutOfRange));
    }
    day
}

fn check_time(
    raw: &str,
    field: ScheduleField,
    failures: &mut Vec<ValidationFailure>,
) -> Option<NaiveTime> {
    if raw.trim().is_empty() {
        failures.push(ValidationFailure::new(field, FailureCode::EmptyTime));
        return None;
    }

    let parsed = parse_clock_time(raw);
    if parsed.is_none() {
        failures.push(ValidationFailure::new(field, FailureCode::InvalidTime));
    }
    parsed
}
