// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod fetcher;
pub mod session;
pub mod strava;
pub mod traces;

pub use fetcher::{ActivityFetcher, FetchRange};
pub use session::SessionStore;
pub use strava::StravaClient;
pub use traces::{extract_polylines, trace_bounds};
