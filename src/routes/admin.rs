// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Admin dashboard routes.
//!
//! Mounted behind both `require_auth` and `require_admin` in routes/mod.rs.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::{AdminReport, Overview, User};
use crate::routes::check_date_param;
use crate::services::{build_admin_report, filter_by_user_search, overview, ReportFilter};
use crate::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/admin/overview", get(get_overview))
        .route("/api/admin/reports", get(get_report))
        .route("/api/admin/users", get(list_users).post(create_user))
}

async fn get_overview(State(state): State<Arc<AppState>>) -> Json<Overview> {
    let users = state.users.list_all().await;
    let activities = state.store.list_all().await;
    let todays = state.store.count_for_date(&state.store.today()).await;
    Json(overview(&users, &activities, todays))
}

async fn get_report(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<ReportFilter>,
) -> Result<Json<AdminReport>> {
    check_date_param("start", filter.start.as_deref())?;
    check_date_param("end", filter.end.as_deref())?;

    let users = state.users.list_all().await;
    let activities = state.store.list_all().await;
    Ok(Json(build_admin_report(&users, &activities, &filter)))
}

#[derive(Debug, Default, Deserialize)]
pub struct UserSearchQuery {
    #[serde(default)]
    pub search: Option<String>,
}

/// Regular users whose name or email matches `search`.
async fn list_users(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UserSearchQuery>,
) -> Json<Vec<User>> {
    let users = state.users.regular_users().await;
    Json(filter_by_user_search(&users, query.search.as_deref()))
}

/// New account request body.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    /// Falls back to the configured default password
    #[validate(length(min = 6))]
    #[serde(default)]
    pub password: Option<String>,
}

/// Register a regular user.
async fn create_user(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AuthUser>,
    Json(body): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>)> {
    body.validate()?;

    let user = state
        .auth
        .register_user(&body.name, &body.email, body.password.as_deref())
        .await?;

    tracing::info!(admin_id = %admin.user_id, user_id = %user.id, "Admin registered user");
    Ok((StatusCode::CREATED, Json(user)))
}
