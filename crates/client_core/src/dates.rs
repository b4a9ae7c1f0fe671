//! `createdAt` formatting. The store keeps a sortable local timestamp string;
//! the UI shows a shorter human form.

use chrono::{Local, NaiveDateTime};

pub const STORE_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const DISPLAY_DATE_FORMAT: &str = "%d %b %Y, %H:%M";

pub fn current_time_as_string() -> String {
    Local::now().format(STORE_DATE_FORMAT).to_string()
}

/// Converts a stored timestamp into display form. Input that does not parse
/// is returned unchanged, so an empty `createdAt` stays empty.
pub fn convert_date_format(raw: &str) -> String {
    match NaiveDateTime::parse_from_str(raw.trim(), STORE_DATE_FORMAT) {
        Ok(parsed) => parsed.format(DISPLAY_DATE_FORMAT).to_string(),
        Err(_) => raw.to_string(),
    }
}
