// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Email/password login and logout routes.

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::config::Config;
use crate::error::Result;
use crate::middleware::auth::{decode_jwt, SESSION_COOKIE};
use crate::models::User;
use crate::services::AuthPort;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
}

/// Login request body.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Login response: the account and its session token.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LoginResponse {
    pub user: User,
    pub token: String,
}

/// Session cookie carrying `value`. Attributes must match between set and removal.
fn session_cookie(config: &Config, value: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.secure_cookies())
        .build()
}

/// Check credentials and start a session.
async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>)> {
    body.validate()?;

    let user = state.auth.login(&body.email, &body.password).await?;
    let token = state.auth.issue_session(&user)?;

    let mut cookie = session_cookie(&state.config, token.clone());
    cookie.set_max_age(time::Duration::days(state.config.session_ttl_days));

    Ok((jar.add(cookie), Json(LoginResponse { user, token })))
}

/// End the session by clearing the cookie. Always succeeds.
async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> (CookieJar, StatusCode) {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        if let Ok(claims) = decode_jwt(cookie.value(), &state.config.jwt_signing_key) {
            state.auth.logout(&claims.sub).await;
        }
    }

    let removal = session_cookie(&state.config, String::new());
    (jar.remove(removal), StatusCode::NO_CONTENT)
}
