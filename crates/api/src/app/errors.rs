use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use shopgrid_core::DomainError;
use shopgrid_infra::StoreError;

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    let status = match &err {
        DomainError::Validation(_) | DomainError::InvalidId(_) => StatusCode::BAD_REQUEST,
        DomainError::InvariantViolation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        DomainError::NotFound => StatusCode::NOT_FOUND,
        DomainError::Conflict(_) => StatusCode::CONFLICT,
        DomainError::Unauthorized => StatusCode::FORBIDDEN,
    };
    let message = match &err {
        DomainError::Validation(msg)
        | DomainError::InvariantViolation(msg)
        | DomainError::InvalidId(msg)
        | DomainError::Conflict(msg) => msg.clone(),
        DomainError::NotFound => "not found".to_string(),
        DomainError::Unauthorized => "unauthorized".to_string(),
    };
    json_error(status, err.code(), message)
}

pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    match err {
        StoreError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        StoreError::Conflict(code) => json_error(StatusCode::CONFLICT, code, conflict_message(code)),
        StoreError::Database(e) => {
            tracing::error!(error = %e, "database error");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "internal error",
            )
        }
    }
}

fn conflict_message(code: &str) -> &'static str {
    match code {
        "duplicate_sku" => "an item with this SKU already exists for this tenant",
        "duplicate_subdomain" => "this subdomain is already taken",
        "duplicate_event" => "event already recorded",
        _ => "conflict",
    }
}
