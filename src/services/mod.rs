// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod activity_store;
pub mod auth;
pub mod password;
pub mod reports;
pub mod user_directory;

pub use activity_store::{
    aggregate_for_user, filter_by_date_range, filter_by_user_search, ActivityStore,
};
pub use auth::{AuthPort, AuthService};
pub use reports::{build_admin_report, overview, ReportFilter};
pub use user_directory::UserDirectory;
