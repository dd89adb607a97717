// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod activity;
pub mod stats;
pub mod user;

pub use activity::{Activity, ActivityUpdate};
pub use stats::{ActivityAggregate, AdminReport, Overview, RecentActivity, UserReport};
pub use user::{NewUser, Role, User};
