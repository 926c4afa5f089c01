// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Normalized activity records and the per-fetch collection.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashMap;

use crate::time_utils::format_hms;
use crate::units::format_miles;

/// Compact activity record built from a Strava summary activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    /// Strava activity ID
    pub id: u64,
    /// Activity name/title
    pub name: String,
    /// Encoded summary polyline (precision 5)
    pub polyline: Option<String>,
    /// Local start date as `MM/DD/YYYY`
    pub display_time: String,
    /// Activity type (Ride, Run, Hike, etc.)
    #[serde(rename = "type")]
    pub activity_type: String,
    /// Distance in miles, two decimals
    pub distance_miles: f64,
}

/// Activities keyed by Strava ID, iterated in first-seen order.
///
/// Serializes as a JSON object keyed by the decimal ID.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivityMap {
    entries: Vec<Activity>,
    index: HashMap<u64, usize>,
}

impl ActivityMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an activity. A repeated ID replaces the earlier record but
    /// keeps its position; the replaced record is returned.
    pub fn insert(&mut self, activity: Activity) -> Option<Activity> {
        match self.index.get(&activity.id) {
            Some(&pos) => Some(std::mem::replace(&mut self.entries[pos], activity)),
            None => {
                self.index.insert(activity.id, self.entries.len());
                self.entries.push(activity);
                None
            }
        }
    }

    pub fn get(&self, id: u64) -> Option<&Activity> {
        self.index.get(&id).map(|&pos| &self.entries[pos])
    }

    pub fn contains(&self, id: u64) -> bool {
        self.index.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Activity> {
        self.entries.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = u64> + '_ {
        self.entries.iter().map(|a| a.id)
    }
}

impl<'a> IntoIterator for &'a ActivityMap {
    type Item = &'a Activity;
    type IntoIter = std::slice::Iter<'a, Activity>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl FromIterator<Activity> for ActivityMap {
    fn from_iter<I: IntoIterator<Item = Activity>>(iter: I) -> Self {
        let mut map = ActivityMap::new();
        for activity in iter {
            map.insert(activity);
        }
        map
    }
}

impl Serialize for ActivityMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for activity in &self.entries {
            map.serialize_entry(&activity.id.to_string(), activity)?;
        }
        map.end()
    }
}

/// Result of one fetch: traced activities plus totals over every record.
///
/// Totals include records that were left out of `activities` for lacking a
/// trace. Built once by the fetcher and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityCollection {
    activities: ActivityMap,
    time_elapsed: String,
    distance_travelled: String,
    total_distance_meters: f64,
    total_elapsed_seconds: u64,
    total_activities: u32,
}

impl ActivityCollection {
    /// Build a collection, rendering the display totals from the raw ones.
    pub fn new(
        activities: ActivityMap,
        total_distance_meters: f64,
        total_elapsed_seconds: u64,
        total_activities: u32,
    ) -> Self {
        Self {
            activities,
            time_elapsed: format_hms(total_elapsed_seconds),
            distance_travelled: format_miles(total_distance_meters),
            total_distance_meters,
            total_elapsed_seconds,
            total_activities,
        }
    }

    /// An empty result ("no activity history"), which is not an error.
    pub fn empty() -> Self {
        Self::new(ActivityMap::new(), 0.0, 0, 0)
    }

    pub fn activities(&self) -> &ActivityMap {
        &self.activities
    }

    /// Total elapsed time as `H:MM:SS`.
    pub fn time_elapsed(&self) -> &str {
        &self.time_elapsed
    }

    /// Total distance as `"<miles> mi."`.
    pub fn distance_travelled(&self) -> &str {
        &self.distance_travelled
    }

    pub fn total_distance_meters(&self) -> f64 {
        self.total_distance_meters
    }

    pub fn total_elapsed_seconds(&self) -> u64 {
        self.total_elapsed_seconds
    }

    /// Number of well-formed records seen, traced or not.
    pub fn total_activities(&self) -> u32 {
        self.total_activities
    }

    /// True when the remote returned no activities at all for the range.
    pub fn has_no_data(&self) -> bool {
        self.total_activities == 0
    }
}
