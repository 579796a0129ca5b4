//! Timezone converter applet.
//!
//! Converts a 24-hour `HH:MM` time of day from one timezone to another.
//! Zones are IANA identifiers (`Europe/London`) or one of a handful of
//! common abbreviations (`PST`, `CET`, `JST`, ...).
//!
//! Run with: cargo run --bin tz_convert -- 12:00 UTC PST

use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use clap::Parser;
use colored::Colorize;
use lazy_static::lazy_static;
use std::collections::HashMap;
use std::process::ExitCode;
use thiserror::Error;
use tracing::debug;
use tracing_subscriber::EnvFilter;

// =============================================================================
// Milestone 1: Error types
// =============================================================================

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConvertError {
    #[error("Invalid time format. Use HH:MM (24-hour format).")]
    InvalidTimeFormat(String),

    #[error("Unknown timezone '{0}'.")]
    UnknownTimezone(String),
}

// =============================================================================
// Milestone 2: Zone resolution
// =============================================================================

lazy_static! {
    static ref TIMEZONE_ABBREVIATIONS: HashMap<&'static str, Tz> = {
        let mut map = HashMap::new();
        map.insert("AEST", chrono_tz::Australia::Sydney);
        map.insert("BJT", chrono_tz::Asia::Shanghai);
        map.insert("CET", chrono_tz::Europe::Berlin);
        map.insert("CST", chrono_tz::America::Chicago);
        map.insert("EST", chrono_tz::America::New_York);
        map.insert("GMT", chrono_tz::Etc::GMT);
        map.insert("ICT", chrono_tz::Asia::Bangkok);
        map.insert("JST", chrono_tz::Asia::Tokyo);
        map.insert("NYT", chrono_tz::America::New_York);
        map.insert("PST", chrono_tz::America::Los_Angeles);
        map.insert("UTC", chrono_tz::UTC);
        map
    };
}

/// Abbreviations are matched case-insensitively; anything else must be a
/// valid IANA identifier.
pub fn resolve_timezone(name: &str) -> Result<Tz, ConvertError> {
    if let Some(tz) = TIMEZONE_ABBREVIATIONS.get(name.to_ascii_uppercase().as_str()) {
        debug!(abbreviation = name, zone = tz.name(), "resolved abbreviation");
        return Ok(*tz);
    }
    name.parse::<Tz>()
        .map_err(|_| ConvertError::UnknownTimezone(name.to_string()))
}

pub fn parse_time(time: &str) -> Result<NaiveTime, ConvertError> {
    NaiveTime::parse_from_str(time.trim(), "%H:%M")
        .map_err(|_| ConvertError::InvalidTimeFormat(time.to_string()))
}

// =============================================================================
// Milestone 3: Localize and convert
// =============================================================================

/// Attaches `tz` to a wall-clock time. A time inside a DST gap is moved
/// forward by one hour; a time inside a DST fold takes the standard-time
/// reading (the later instant).
pub fn localize(tz: &Tz, naive: NaiveDateTime) -> DateTime<Tz> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt,
        LocalResult::Ambiguous(_, standard) => standard,
        LocalResult::None => {
            debug!(%naive, zone = tz.name(), "local time falls in a DST gap");
            tz.from_local_datetime(&(naive + Duration::hours(1)))
                .earliest()
                .unwrap_or_else(|| tz.from_utc_datetime(&naive))
        }
    }
}

/// Converts `time` (as read on `date` in `from`) to the wall-clock time in
/// `to`. Without a date, today's date in the source zone is used.
pub fn convert_time(
    time: &str,
    from: &str,
    to: &str,
    date: Option<NaiveDate>,
) -> Result<NaiveTime, ConvertError> {
    let time = parse_time(time)?;
    let from_tz = resolve_timezone(from)?;
    let to_tz = resolve_timezone(to)?;

    let date = date.unwrap_or_else(|| Utc::now().with_timezone(&from_tz).date_naive());
    let source = localize(&from_tz, date.and_time(time));
    let target = source.with_timezone(&to_tz);

    debug!(
        source = %source.to_rfc3339(),
        target = %target.to_rfc3339(),
        "converted"
    );
    Ok(target.time())
}

pub fn format_hhmm(time: &NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

// =============================================================================
// Milestone 4: Command line
// =============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "tz_convert",
    about = "Convert a time of day between timezones",
    override_usage = "tz_convert <HH:MM> <FROM_TZ> <TO_TZ> [--date YYYY-MM-DD]"
)]
struct Cli {
    /// Time of day, 24-hour HH:MM
    #[arg(value_name = "HH:MM", allow_hyphen_values = true)]
    time: String,

    /// Source zone: IANA identifier or abbreviation (UTC, PST, EST, CET, JST, ...)
    #[arg(value_name = "FROM_TZ")]
    from_tz: String,

    /// Target zone: IANA identifier or abbreviation
    #[arg(value_name = "TO_TZ")]
    to_tz: String,

    /// Date the time is read on; defaults to today in FROM_TZ
    #[arg(long, value_name = "YYYY-MM-DD")]
    date: Option<NaiveDate>,
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match convert_time(&cli.time, &cli.from_tz, &cli.to_tz, cli.date) {
        Ok(converted) => {
            println!(
                "{} {} is {} {}",
                cli.time,
                cli.from_tz,
                format_hhmm(&converted),
                cli.to_tz
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{} {}", "Error:".red().bold(), err);
            ExitCode::FAILURE
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
