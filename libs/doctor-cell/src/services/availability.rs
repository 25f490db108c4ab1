use chrono::{Datelike, Duration, NaiveDateTime, NaiveTime, Weekday};
use tracing::warn;

use crate::models::{
    parse_clock_time, AvailabilityBoundary, AvailabilityInterval, DoctorRecord, MalformedSchedule,
    ScheduleField,
};

/// Anchors a stored weekly schedule to the week around `reference_now`.
///
/// `from` lands on the latest occurrence of the start week day on or before
/// the reference date. `to` lands on the first occurrence of the end week day
/// that is not before `from`, so a Friday to Monday schedule ends on the
/// following Monday.
pub fn resolve(
    record: &DoctorRecord,
    reference_now: NaiveDateTime,
) -> Result<AvailabilityInterval, MalformedSchedule> {
    let from_time = stored_time(&record.available_from_time, ScheduleField::AvailableFromTime)?;
    let to_time = stored_time(&record.available_to_time, ScheduleField::AvailableToTime)?;
    let from_day = stored_week_day(record.available_from_week_day, ScheduleField::AvailableFromWeekDay)?;
    let to_day = stored_week_day(record.available_to_week_day, ScheduleField::AvailableToWeekDay)?;

    let reference_date = reference_now.date();
    let days_back = days_between(from_day, reference_date.weekday());
    let from_date = reference_date - Duration::days(days_back);
    let from = from_date.and_time(from_time);

    let mut to = (from_date + Duration::days(days_between(from_day, to_day))).and_time(to_time);
    if to < from {
        to += Duration::weeks(1);
    }

    Ok(AvailabilityInterval {
        from: AvailabilityBoundary(from),
        to: AvailabilityBoundary(to),
    })
}

/// Whether the doctor can be booked at `instant`, using the week that
/// contains it as the reference.
pub fn is_available_at(
    record: &DoctorRecord,
    instant: NaiveDateTime,
) -> Result<bool, MalformedSchedule> {
    Ok(resolve(record, instant)?.contains(instant))
}

/// Days to walk forward from `start` to reach `end`, in 0..7.
fn days_between(start: Weekday, end: Weekday) -> i64 {
    let start = start.num_days_from_sunday() as i64;
    let end = end.num_days_from_sunday() as i64;
    (end - start).rem_euclid(7)
}

fn stored_time(raw: &str, field: ScheduleField) -> Result<NaiveTime, MalformedSchedule> {
    parse_clock_time(raw).ok_or_else(|| {
        warn!("Stored doctor schedule has unparseable {}: {:?}", field, raw);
        MalformedSchedule {
            field,
            value: raw.to_string(),
        }
    })
}

fn stored_week_day(value: i32, field: ScheduleField) -> Result<Weekday, MalformedSchedule> {
    let weekday = match value {
        0 => Weekday::Sun,
        1 => Weekday::Mon,
        2 => Weekday::Tue,
        3 => Weekday::Wed,
        4 => Weekday::Thu,
        5 => Weekday::Fri,
        6 => Weekday::Sat,
        _ => {
            warn!("Stored doctor schedule has out of range {}: {}", field, value);
            return Err(MalformedSchedule {
                field,
                value: value.to_string(),
            });
        }
    };
    Ok(weekday)
}
