// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for authenticated users.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{Activity, ActivityAggregate, ActivityUpdate, User};
use crate::routes::check_date_param;
use crate::services::{aggregate_for_user, filter_by_date_range, AuthPort};
use crate::time_utils::parse_iso_date;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// API routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/me", get(get_me))
        .route("/api/activities", get(list_activities))
        .route("/api/activities/today", get(get_today).put(put_today))
        .route("/api/activities/{date}", get(get_activity).put(put_activity))
        .route("/api/stats", get(get_stats))
}

// ─── User Profile ────────────────────────────────────────────

/// Get current user profile.
async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<User>> {
    let profile = state
        .auth
        .current_user(&user.user_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user.user_id)))?;

    Ok(Json(profile))
}

// ─── Activities ──────────────────────────────────────────────

/// Optional inclusive date range.
#[derive(Debug, Default, Deserialize)]
pub struct DateRangeQuery {
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
}

impl DateRangeQuery {
    fn check(&self) -> Result<()> {
        check_date_param("start", self.start.as_deref())?;
        check_date_param("end", self.end.as_deref())
    }
}

/// One calendar day for the current user.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DayResponse {
    /// The recorded activity, or null if nothing was recorded
    pub activity: Option<Activity>,
    pub date: String,
    /// Whether the day is still open for editing
    pub can_edit: bool,
}

/// List own activities, most recent first.
async fn list_activities(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(range): Query<DateRangeQuery>,
) -> Result<Json<Vec<Activity>>> {
    range.check()?;

    let activities = state.store.list_for_user(&user.user_id).await;
    Ok(Json(filter_by_date_range(
        &activities,
        range.start.as_deref(),
        range.end.as_deref(),
    )))
}

async fn get_today(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<DayResponse>> {
    let today = state.store.today();
    day_response(&state, &user, today).await
}

async fn get_activity(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(date): Path<String>,
) -> Result<Json<DayResponse>> {
    require_date(&date)?;
    day_response(&state, &user, date).await
}

async fn day_response(
    state: &AppState,
    user: &AuthUser,
    date: String,
) -> Result<Json<DayResponse>> {
    let activity = state.store.get_by_date(&user.user_id, &date).await;
    let can_edit = state.store.can_edit(&date);

    Ok(Json(DayResponse {
        activity,
        date,
        can_edit,
    }))
}

/// Record today's activity.
async fn put_today(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(update): Json<ActivityUpdate>,
) -> Result<Json<Activity>> {
    let today = state.store.today();
    let activity = state.store.upsert(&user.user_id, &today, &update).await?;
    Ok(Json(activity))
}

/// Record the activity for `date`, which must be today.
async fn put_activity(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(date): Path<String>,
    Json(update): Json<ActivityUpdate>,
) -> Result<Json<Activity>> {
    require_date(&date)?;
    let activity = state.store.upsert(&user.user_id, &date, &update).await?;
    Ok(Json(activity))
}

fn require_date(date: &str) -> Result<()> {
    parse_iso_date(date)
        .map(|_| ())
        .ok_or_else(|| AppError::BadRequest(format!("Invalid date: {}", date)))
}

// ─── Stats ───────────────────────────────────────────────────

/// Own totals, optionally restricted to a date range.
async fn get_stats(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(range): Query<DateRangeQuery>,
) -> Result<Json<ActivityAggregate>> {
    range.check()?;

    let activities = filter_by_date_range(
        &state.store.list_for_user(&user.user_id).await,
        range.start.as_deref(),
        range.end.as_deref(),
    );
    Ok(Json(aggregate_for_user(&user.user_id, &activities)))
}
