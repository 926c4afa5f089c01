// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod activity;
pub mod trace;

pub use activity::{Activity, ActivityCollection, ActivityMap};
pub use trace::DecodedTrace;
