use chrono::{NaiveDate, Weekday};
use project_scheduler::{WorkCalendar, WorkCalendarConfig};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

#[test]
fn standard_calendar_counts_weekdays_only() {
    let calendar = WorkCalendar::standard();
    // Mon 2025-01-06 through Sun 2025-01-12: five working days.
    assert_eq!(calendar.count_working_days(d(2025, 1, 6), d(2025, 1, 12)), 5);
    assert!(calendar.is_working_day(d(2025, 1, 6)));
    assert!(!calendar.is_working_day(d(2025, 1, 11)));
}

#[test]
fn count_is_inclusive_and_zero_for_reversed_range() {
    let calendar = WorkCalendar::standard();
    assert_eq!(calendar.count_working_days(d(2025, 1, 6), d(2025, 1, 6)), 1);
    assert_eq!(calendar.count_working_days(d(2025, 1, 12), d(2025, 1, 6)), 0);
}

#[test]
fn holidays_count_toward_duration_by_default() {
    let mut calendar = WorkCalendar::standard();
    calendar.add_holiday(d(2025, 1, 6));
    // Holiday is tracked but not subtracted unless exclusion is enabled.
    assert!(calendar.is_holiday(d(2025, 1, 6)));
    assert!(!calendar.is_available(d(2025, 1, 6)));
    assert_eq!(calendar.count_working_days(d(2025, 1, 6), d(2025, 1, 10)), 5);
}

#[test]
fn holiday_exclusion_subtracts_holidays_from_counts() {
    let mut calendar = WorkCalendar::standard();
    calendar.add_holiday(d(2025, 1, 6));
    calendar.set_exclude_holidays(true);
    assert_eq!(calendar.count_working_days(d(2025, 1, 6), d(2025, 1, 10)), 4);
    // A holiday on a weekend changes nothing.
    calendar.add_holiday(d(2025, 1, 11));
    assert_eq!(calendar.count_working_days(d(2025, 1, 6), d(2025, 1, 12)), 4);
}

#[test]
fn custom_working_days_are_respected() {
    let mut calendar = WorkCalendar::standard();
    calendar.set_working_days(vec![
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
    ]);
    assert_eq!(calendar.count_working_days(d(2025, 1, 6), d(2025, 1, 12)), 6);
}

#[test]
fn recurring_holiday_spans_years() {
    let mut calendar = WorkCalendar::standard();
    calendar.add_recurring_holiday(1, 1, 2024, 2026);
    assert!(calendar.is_holiday(d(2024, 1, 1)));
    assert!(calendar.is_holiday(d(2025, 1, 1)));
    assert!(calendar.is_holiday(d(2026, 1, 1)));
    assert!(!calendar.is_holiday(d(2027, 1, 1)));
}

#[test]
fn config_round_trip_preserves_calendar() {
    let mut calendar = WorkCalendar::custom(
        [Weekday::Mon, Weekday::Wed, Weekday::Fri],
        [d(2025, 7, 4)],
    );
    calendar.set_exclude_holidays(true);

    let config = calendar.to_config();
    assert_eq!(config.working_days(), &[Weekday::Mon, Weekday::Wed, Weekday::Fri]);
    assert_eq!(config.holidays(), &[d(2025, 7, 4)]);
    assert!(config.excludes_holidays());

    let rebuilt = WorkCalendar::from_config(&config);
    assert_eq!(rebuilt, calendar);
}

#[test]
fn config_sorts_and_dedupes_inputs() {
    let config = WorkCalendarConfig::new(
        [Weekday::Fri, Weekday::Mon, Weekday::Mon],
        [d(2025, 12, 25), d(2025, 1, 1), d(2025, 1, 1)],
    );
    assert_eq!(config.working_days(), &[Weekday::Mon, Weekday::Fri]);
    assert_eq!(config.holidays(), &[d(2025, 1, 1), d(2025, 12, 25)]);
}

#[test]
fn working_days_in_range_lists_each_countable_day() {
    let mut calendar = WorkCalendar::standard();
    calendar.add_holiday(d(2025, 1, 8));
    calendar.set_exclude_holidays(true);
    let days = calendar.working_days_in_range(d(2025, 1, 6), d(2025, 1, 10));
    assert_eq!(
        days,
        vec![d(2025, 1, 6), d(2025, 1, 7), d(2025, 1, 9), d(2025, 1, 10)]
    );
}
