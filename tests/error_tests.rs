// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::http::StatusCode;
use axum::response::IntoResponse;
use sadhna_tracker::error::AppError;

mod common;
use common::body_json;

#[test]
fn test_is_validation_matches_domain_errors() {
    let err = AppError::EditWindowClosed {
        date: "2024-01-04".to_string(),
    };
    assert!(err.is_validation());

    let err = AppError::invalid_field("japa_rounds", "must not be negative");
    assert!(err.is_validation());
}

#[test]
fn test_is_validation_no_match() {
    assert!(!AppError::Persistence("disk full".to_string()).is_validation());
    assert!(!AppError::Unauthorized.is_validation());
    assert!(!AppError::BadRequest("Bad Request".to_string()).is_validation());
}

#[tokio::test]
async fn test_status_codes_and_bodies() {
    let cases = [
        (AppError::Unauthorized, StatusCode::UNAUTHORIZED, "unauthorized"),
        (AppError::Forbidden, StatusCode::FORBIDDEN, "forbidden"),
        (
            AppError::EditWindowClosed {
                date: "2024-01-04".to_string(),
            },
            StatusCode::FORBIDDEN,
            "edit_window_closed",
        ),
        (
            AppError::invalid_field("lecture_duration", "must not be negative"),
            StatusCode::UNPROCESSABLE_ENTITY,
            "invalid_field",
        ),
        (
            AppError::NotFound("activity".to_string()),
            StatusCode::NOT_FOUND,
            "not_found",
        ),
        (
            AppError::Conflict("dup".to_string()),
            StatusCode::CONFLICT,
            "conflict",
        ),
        (
            AppError::Persistence("disk full".to_string()),
            StatusCode::INTERNAL_SERVER_ERROR,
            "persistence_error",
        ),
    ];

    for (err, status, code) in cases {
        let response = err.into_response();
        assert_eq!(response.status(), status);
        assert_eq!(body_json(response).await["error"], code);
    }
}

#[tokio::test]
async fn test_internal_details_not_leaked() {
    let response = AppError::Persistence("connection string secret".to_string()).into_response();
    let body = body_json(response).await;
    assert!(body.get("details").is_none());

    let response = AppError::invalid_field("japa_rounds", "must not be negative").into_response();
    let body = body_json(response).await;
    assert!(body["details"].as_str().unwrap().contains("japa_rounds"));
}
