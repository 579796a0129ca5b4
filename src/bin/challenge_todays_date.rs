//! Challenge: print today's date and time as `YYYY-MM-DD HH:MM:SS`.
//!
//! Run with: cargo run --bin challenge_todays_date

use chrono::{Local, NaiveDateTime};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn format_timestamp(moment: &NaiveDateTime) -> String {
    moment.format(TIMESTAMP_FORMAT).to_string()
}

fn main() {
    let now = Local::now().naive_local();
    println!("{}", format_timestamp(&now));
}
