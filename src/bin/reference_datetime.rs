//! chrono reference: dates, times, durations, zones, formatting.
//!
//! Run with: cargo run --bin reference_datetime

use chrono::{
    DateTime, Datelike, Duration, FixedOffset, Local, NaiveDate, NaiveDateTime, NaiveTime,
    ParseResult, TimeZone, Timelike, Utc,
};
use colored::Colorize;

// =============================================================================
// Milestone 1: Calendar dates
// =============================================================================

/// `(year, month, day, weekday 0=Mon, iso weekday 1=Mon, ISO string)`
pub fn date_attributes(date: NaiveDate) -> (i32, u32, u32, u32, u32, String) {
    (
        date.year(),
        date.month(),
        date.day(),
        date.weekday().num_days_from_monday(),
        date.weekday().number_from_monday(),
        date.format("%Y-%m-%d").to_string(),
    )
}

pub fn date_from_timestamp(secs: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp(secs, 0).map(|dt| dt.date_naive())
}

// =============================================================================
// Milestone 2: Times of day and combined datetimes
// =============================================================================

/// `(hour, minute, second, microsecond, ISO string)`
pub fn time_attributes(time: NaiveTime) -> (u32, u32, u32, u32, String) {
    (
        time.hour(),
        time.minute(),
        time.second(),
        time.nanosecond() / 1_000,
        time.format("%H:%M:%S%.6f").to_string(),
    )
}

pub fn combine(date: NaiveDate, time: NaiveTime) -> NaiveDateTime {
    date.and_time(time)
}

// =============================================================================
// Milestone 3: Durations
// =============================================================================

/// Splits a duration into whole days and the leftover seconds.
pub fn split_duration(delta: Duration) -> (i64, i64) {
    let days = delta.num_days();
    (days, delta.num_seconds() - days * 86_400)
}

pub fn add_days(moment: NaiveDateTime, days: i64) -> NaiveDateTime {
    moment + Duration::days(days)
}

pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

// =============================================================================
// Milestone 4: Zones
// =============================================================================

/// `FixedOffset` from hours and minutes east of UTC (e.g. IST = 5:30).
pub fn fixed_zone(hours: i32, minutes: i32) -> Option<FixedOffset> {
    FixedOffset::east_opt(hours * 3600 + minutes * 60)
}

pub fn to_offset(moment: DateTime<Utc>, zone: FixedOffset) -> DateTime<FixedOffset> {
    moment.with_timezone(&zone)
}

// =============================================================================
// Milestone 5: Formatting and parsing
// =============================================================================

pub fn strftime(moment: &NaiveDateTime, pattern: &str) -> String {
    moment.format(pattern).to_string()
}

pub fn strptime(text: &str, pattern: &str) -> ParseResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text, pattern)
}

pub fn parse_iso(text: &str) -> ParseResult<NaiveDateTime> {
    text.parse::<NaiveDateTime>()
}

// =============================================================================
// Milestone 6: Utilities
// =============================================================================

/// A year is leap when chrono's calendar has a 29 February in it.
pub fn is_leap_year(year: i32) -> bool {
    NaiveDate::from_ymd_opt(year, 2, 29).is_some()
}

fn main() {
    println!("{}", "=== date ===".bold());
    if let Some(date) = NaiveDate::from_ymd_opt(2024, 11, 30) {
        println!("  attributes: {:?}", date_attributes(date));
    }
    println!("  today: {}", Local::now().date_naive());
    println!("  from timestamp 1698854400: {:?}", date_from_timestamp(1_698_854_400));

    println!("\n{}", "=== time ===".bold());
    if let Some(time) = NaiveTime::from_hms_micro_opt(14, 30, 45, 123_456) {
        println!("  attributes: {:?}", time_attributes(time));
    }

    println!("\n{}", "=== datetime ===".bold());
    let moment = NaiveDate::from_ymd_opt(2024, 11, 30)
        .zip(NaiveTime::from_hms_opt(14, 30, 45))
        .map(|(d, t)| combine(d, t));
    if let Some(moment) = moment {
        println!("  combined: {}", moment);
        println!("  +7 days: {}", add_days(moment, 7));
        println!("  {}", strftime(&moment, "%A, %d %B %Y"));
        println!("  {}", strftime(&moment, "%I:%M %p"));
    }

    println!("\n{}", "=== durations ===".bold());
    let delta = Duration::days(5) + Duration::hours(3) + Duration::minutes(30);
    println!("  split: {:?}, total seconds: {}", split_duration(delta), delta.num_seconds());

    println!("\n{}", "=== zones ===".bold());
    if let (Some(aware), Some(ist)) = (
        Utc.with_ymd_and_hms(2024, 11, 30, 14, 30, 45).single(),
        fixed_zone(5, 30),
    ) {
        println!("  {} -> {}", aware, to_offset(aware, ist));
    }

    println!("\n{}", "=== parsing ===".bold());
    println!("  {:?}", strptime("2024-11-30 14:30:45", "%Y-%m-%d %H:%M:%S"));
    println!("  {:?}", parse_iso("2024-11-30T14:30:45.123456"));

    println!("\n{}", "=== utilities ===".bold());
    println!("  2024 leap: {}", is_leap_year(2024));
    if let (Some(d1), Some(d2)) = (
        NaiveDate::from_ymd_opt(2024, 11, 30),
        NaiveDate::from_ymd_opt(2025, 12, 31),
    ) {
        println!("  days between: {}", days_between(d1, d2));
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_date_attributes() {
        // 2024-11-30 was a Saturday.
        let (y, m, d, weekday, iso_weekday, iso) = date_attributes(ymd(2024, 11, 30));
        assert_eq!((y, m, d), (2024, 11, 30));
        assert_eq!(weekday, 5);
        assert_eq!(iso_weekday, 6);
        assert_eq!(iso, "2024-11-30");
    }

    #[test]
    fn test_date_from_timestamp() {
        assert_eq!(date_from_timestamp(1_698_854_400), Some(ymd(2023, 11, 1)));
    }

    #[test]
    fn test_time_attributes() {
        let time = NaiveTime::from_hms_micro_opt(14, 30, 45, 123_456).unwrap();
        let (h, m, s, us, iso) = time_attributes(time);
        assert_eq!((h, m, s, us), (14, 30, 45, 123_456));
        assert_eq!(iso, "14:30:45.123456");
    }

    #[test]
    fn test_split_duration() {
        let delta = Duration::days(5) + Duration::hours(3) + Duration::minutes(30);
        assert_eq!(split_duration(delta), (5, 12_600));
        assert_eq!(delta.num_seconds(), 444_600);
    }

    #[test]
    fn test_add_and_subtract_days() {
        let start = combine(ymd(2024, 12, 28), NaiveTime::MIN);
        assert_eq!(add_days(start, 7).date(), ymd(2025, 1, 4));
        assert_eq!(add_days(start, -30).date(), ymd(2024, 11, 28));
    }

    #[test]
    fn test_days_between() {
        assert_eq!(days_between(ymd(2024, 11, 30), ymd(2025, 12, 31)), 396);
        assert_eq!(days_between(ymd(2025, 12, 31), ymd(2024, 11, 30)), -396);
    }

    #[test]
    fn test_fixed_zone_conversion() {
        let aware = Utc.with_ymd_and_hms(2024, 11, 30, 14, 30, 45).unwrap();
        let shifted = to_offset(aware, fixed_zone(1, 0).unwrap());
        assert_eq!(shifted.hour(), 15);
        assert_eq!(shifted, aware);
        assert!(fixed_zone(30, 0).is_none());
    }

    #[test]
    fn test_strftime_patterns() {
        let moment = combine(ymd(2024, 11, 30), NaiveTime::from_hms_opt(14, 30, 45).unwrap());
        assert_eq!(strftime(&moment, "%Y-%m-%d %H:%M:%S"), "2024-11-30 14:30:45");
        assert_eq!(strftime(&moment, "%A, %d %B %Y"), "Saturday, 30 November 2024");
        assert_eq!(strftime(&moment, "%I:%M %p"), "02:30 PM");
    }

    #[test]
    fn test_strptime_and_iso() {
        let parsed = strptime("2024-11-30 14:30:45", "%Y-%m-%d %H:%M:%S").unwrap();
        assert_eq!(parsed.second(), 45);
        let iso = parse_iso("2024-11-30T14:30:45.123456").unwrap();
        assert_eq!(iso.nanosecond(), 123_456_000);
        assert!(strptime("30/11/2024", "%Y-%m-%d").is_err());
    }

    #[test]
    fn test_leap_years() {
        assert!(is_leap_year(2024));
        assert!(is_leap_year(2000));
        assert!(!is_leap_year(1900));
        assert!(!is_leap_year(2025));
        assert!(is_leap_year(2400));
        assert!(!is_leap_year(i32::MAX));
    }
}
