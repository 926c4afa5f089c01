// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Polyline extraction from fetched activities.

use geo::{BoundingRect, Coord, Rect};

use crate::error::AppError;
use crate::models::{ActivityMap, DecodedTrace};

/// Precision Strava encodes summary polylines with (1e5).
const STRAVA_POLYLINE_PRECISION: u32 = 5;

/// Decode the polyline of every activity that has a non-empty one.
///
/// Lazy: each item is decoded when pulled. Calling again starts a fresh
/// pass in the same (first-seen) order. A polyline that fails to decode
/// yields an error item for that activity; later activities still follow.
pub fn extract_polylines(
    activities: &ActivityMap,
) -> impl Iterator<Item = Result<DecodedTrace, AppError>> + '_ {
    activities.iter().filter_map(|activity| {
        let encoded = activity.polyline.as_deref().filter(|p| !p.is_empty())?;
        Some(decode_trace(activity.id, encoded))
    })
}

/// Decode a single Strava polyline.
pub fn decode_trace(activity_id: u64, encoded: &str) -> Result<DecodedTrace, AppError> {
    let line = polyline::decode_polyline(encoded, STRAVA_POLYLINE_PRECISION).map_err(|e| {
        AppError::Polyline(format!("activity {}: {}", activity_id, e))
    })?;
    Ok(DecodedTrace { activity_id, line })
}

/// Bounding rectangle over all traces (`x` = longitude, `y` = latitude).
pub fn trace_bounds<'a, I>(traces: I) -> Option<Rect<f64>>
where
    I: IntoIterator<Item = &'a DecodedTrace>,
{
    traces
        .into_iter()
        .filter_map(|trace| trace.line.bounding_rect())
        .reduce(|acc, rect| {
            Rect::new(
                Coord {
                    x: acc.min().x.min(rect.min().x),
                    y: acc.min().y.min(rect.min().y),
                },
                Coord {
                    x: acc.max().x.max(rect.max().x),
                    y: acc.max().y.max(rect.max().y),
                },
            )
        })
}
