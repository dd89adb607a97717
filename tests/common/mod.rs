// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use http_body_util::BodyExt;
use sadhna_tracker::config::Config;
use sadhna_tracker::db::{FirestoreDb, MemoryDb};
use sadhna_tracker::routes::create_router;
use sadhna_tracker::time_utils::FixedClock;
use sadhna_tracker::AppState;
use std::sync::Arc;
use tower::ServiceExt;

/// "Today" for every test app.
#[allow(dead_code)]
pub const TODAY: &str = "2024-01-05";

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// A running test app and the handles tests poke at.
#[allow(dead_code)]
pub struct TestApp {
    pub router: axum::Router,
    pub state: Arc<AppState>,
    pub db: MemoryDb,
    pub clock: Arc<FixedClock>,
}

/// Create a test app over in-memory storage with the clock at noon on [`TODAY`].
#[allow(dead_code)]
pub async fn create_test_app() -> TestApp {
    create_test_app_with_config(Config::test_default()).await
}

#[allow(dead_code)]
pub async fn create_test_app_with_frontend_url(frontend_url: &str) -> TestApp {
    let mut config = Config::test_default();
    config.frontend_url = frontend_url.to_string();
    create_test_app_with_config(config).await
}

#[allow(dead_code)]
pub async fn create_test_app_with_config(config: Config) -> TestApp {
    let db = MemoryDb::new();
    let clock = Arc::new(FixedClock::at_noon(TODAY));

    let state = Arc::new(
        AppState::initialize(config, Arc::new(db.clone()), Arc::new(db.clone()), clock.clone())
            .await
            .expect("Failed to initialize state"),
    );

    TestApp {
        router: create_router(state.clone()),
        state,
        db,
        clock,
    }
}

impl TestApp {
    /// Send a request through a fresh clone of the router.
    #[allow(dead_code)]
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Log in through the API and return the bearer token.
    #[allow(dead_code)]
    pub async fn login(&self, email: &str, password: &str) -> String {
        let response = self
            .send(json_request(
                "POST",
                "/auth/login",
                None,
                serde_json::json!({ "email": email, "password": password }),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::OK, "login failed for {email}");
        body_json(response).await["token"]
            .as_str()
            .unwrap()
            .to_string()
    }

    /// Log in as the seed admin.
    #[allow(dead_code)]
    pub async fn admin_token(&self) -> String {
        let config = &self.state.config;
        self.login(&config.admin_email, &config.admin_password).await
    }

    /// Register a regular user (default password) and log in as them.
    #[allow(dead_code)]
    pub async fn user_token(&self, name: &str, email: &str) -> String {
        self.state
            .auth
            .register_user(name, email, None)
            .await
            .expect("Failed to register user");
        self.login(email, "password").await
    }
}

/// Build a request with an optional bearer token and a JSON body.
#[allow(dead_code)]
pub fn json_request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// Build a bodiless GET with an optional bearer token.
#[allow(dead_code)]
pub fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

/// Collect and parse a JSON response body.
#[allow(dead_code)]
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
