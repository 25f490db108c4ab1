// libs/doctor-cell/tests/availability_test.rs

use chrono::{Duration, NaiveDate, NaiveDateTime, Weekday};
use uuid::Uuid;

use doctor_cell::models::{DoctorRecord, MalformedSchedule, ScheduleField};
use doctor_cell::services::availability::{is_available_at, resolve};

fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

fn doctor(from_day: i32, to_day: i32, from_time: &str, to_time: &str) -> DoctorRecord {
    DoctorRecord {
        id: Uuid::new_v4(),
        clinic_id: None,
        name: "Dra. Ana".to_string(),
        specialty: "Cardiologia".to_string(),
        appointment_price_in_cents: 20000,
        available_from_week_day: from_day,
        available_to_week_day: to_day,
        available_from_time: from_time.to_string(),
        available_to_time: to_time.to_string(),
        created_at: None,
        updated_at: None,
    }
}

// 2024-05-15 is a Wednesday.
fn wednesday() -> NaiveDateTime {
    at(2024, 5, 15, 10, 30)
}

#[test]
fn test_weekday_range_anchored_to_current_week() {
    let interval = resolve(&doctor(1, 5, "08:00", "18:00"), wednesday()).unwrap();

    assert_eq!(interval.from.at(), at(2024, 5, 13, 8, 0));
    assert_eq!(interval.to.at(), at(2024, 5, 17, 18, 0));
    assert_eq!(interval.from.weekday(), Weekday::Mon);
    assert_eq!(interval.to.weekday(), Weekday::Fri);
    assert_eq!(interval.week_days_label(), "segunda-feira a sexta-feira");
    assert_eq!(interval.hours_label(), "08:00 as 18:00");
}

#[test]
fn test_same_day_schedule_stays_within_one_day() {
    for day in 0..=6 {
        let interval = resolve(&doctor(day, day, "09:00", "17:30"), wednesday()).unwrap();

        assert!(interval.is_same_day(), "week day {}", day);
        assert_eq!(interval.from.week_day(), day);
        assert_eq!(interval.duration(), Duration::minutes(8 * 60 + 30));
    }
}

#[test]
fn test_reference_day_is_its_own_most_recent_occurrence() {
    let interval = resolve(&doctor(3, 3, "08:00", "12:00"), wednesday()).unwrap();

    assert_eq!(interval.from.at(), at(2024, 5, 15, 8, 0));
    assert_eq!(interval.to.at(), at(2024, 5, 15, 12, 0));
}

#[test]
fn test_friday_to_monday_crosses_into_next_week() {
    let interval = resolve(&doctor(5, 1, "08:00", "18:00"), wednesday()).unwrap();

    assert_eq!(interval.from.at(), at(2024, 5, 10, 8, 0));
    assert_eq!(interval.to.at(), at(2024, 5, 13, 18, 0));
    assert!(interval.to > interval.from);
    assert_eq!(interval.week_days_label(), "sexta-feira a segunda-feira");
}

#[test]
fn test_wraparound_never_ends_before_it_starts() {
    let mut reference = at(2024, 5, 12, 0, 0);
    for _ in 0..14 {
        for from_day in 0..=6 {
            for to_day in 0..=6 {
                let interval = resolve(&doctor(from_day, to_day, "08:00", "18:00"), reference).unwrap();

                assert!(interval.to > interval.from, "{} -> {} at {}", from_day, to_day, reference);
                assert!(interval.duration() < Duration::weeks(1));
                assert!(interval.from.at().date() <= reference.date());
            }
        }
        reference += Duration::hours(23);
    }
}

#[test]
fn test_sunday_reference_looks_back_for_monday() {
    // 2024-05-19 is a Sunday; the most recent Monday is the 13th.
    let interval = resolve(&doctor(1, 5, "08:00", "18:00"), at(2024, 5, 19, 9, 0)).unwrap();

    assert_eq!(interval.from.at(), at(2024, 5, 13, 8, 0));
    assert_eq!(interval.to.at(), at(2024, 5, 17, 18, 0));
}

#[test]
fn test_boundaries_keep_seconds() {
    let interval = resolve(&doctor(2, 4, "07:15:30", "19:45:00"), wednesday()).unwrap();

    assert_eq!(interval.from.time_label_with_seconds(), "07:15:30");
    assert_eq!(interval.to.time_label_with_seconds(), "19:45:00");
    assert_eq!(interval.from.time_label(), "07:15");
}

#[test]
fn test_unparseable_stored_time_is_malformed() {
    let result = resolve(&doctor(1, 5, "eight", "18:00"), wednesday());

    assert_eq!(
        result,
        Err(MalformedSchedule {
            field: ScheduleField::AvailableFromTime,
            value: "eight".to_string(),
        })
    );
}

#[test]
fn test_out_of_range_stored_week_day_is_malformed() {
    let err = resolve(&doctor(1, 8, "08:00", "18:00"), wednesday()).unwrap_err();

    assert_eq!(err.field, ScheduleField::AvailableToWeekDay);
    assert_eq!(err.value, "8");
    assert_eq!(MalformedSchedule::CODE, "MALFORMED_SCHEDULE");
}

#[test]
fn test_is_available_at() {
    let weekdays = doctor(1, 5, "08:00", "18:00");
    assert!(is_available_at(&weekdays, wednesday()).unwrap());
    assert!(!is_available_at(&weekdays, at(2024, 5, 18, 10, 0)).unwrap());

    let office_hours = doctor(3, 3, "08:00", "12:00");
    assert!(is_available_at(&office_hours, at(2024, 5, 15, 12, 0)).unwrap());
    assert!(!is_available_at(&office_hours, at(2024, 5, 15, 12, 1)).unwrap());

    let weekend = doctor(5, 1, "08:00", "18:00");
    assert!(is_available_at(&weekend, at(2024, 5, 19, 3, 0)).unwrap());
    assert!(is_available_at(&weekend, at(2024, 5, 20, 17, 0)).unwrap());
    assert!(!is_available_at(&weekend, wednesday()).unwrap());
}
