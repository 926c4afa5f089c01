// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Distance conversions.

/// Miles per meter.
pub const MILES_PER_METER: f64 = 0.000621371;

/// Round to two decimal places, halves away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Convert meters to miles, rounded to two decimals.
pub fn meters_to_miles(meters: f64) -> f64 {
    round2(meters * MILES_PER_METER)
}

/// Render a meter total as `"<miles> mi."` with exactly two decimals.
pub fn format_miles(meters: f64) -> String {
    format!("{:.2} mi.", meters_to_miles(meters))
}
