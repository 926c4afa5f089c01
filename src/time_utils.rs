// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting.

use chrono::NaiveDateTime;

/// Format Strava uses for `start_date_local`. The trailing `Z` is literal:
/// the value is wall-clock time at the activity location, not UTC.
const STRAVA_LOCAL_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Parse a Strava `start_date_local` value as a naive local timestamp.
pub fn parse_strava_local(value: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(value, STRAVA_LOCAL_FORMAT)
}

/// Format a local start time as `MM/DD/YYYY`.
pub fn format_display_date(date: NaiveDateTime) -> String {
    date.format("%m/%d/%Y").to_string()
}

/// Format a number of seconds as `H:MM:SS`. Hours are not wrapped into days.
pub fn format_hms(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{}:{:02}:{:02}", hours, minutes, seconds)
}
