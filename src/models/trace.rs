// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Decoded activity traces.

use geo::LineString;

/// The decoded summary polyline of one activity.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedTrace {
    pub activity_id: u64,
    /// Coordinates as decoded: `x` is longitude, `y` is latitude.
    pub line: LineString<f64>,
}

impl DecodedTrace {
    /// Points as `(latitude, longitude)` pairs, in path order.
    pub fn lat_lngs(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.line.coords().map(|c| (c.y, c.x))
    }
}
