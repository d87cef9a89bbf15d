use axum::{http::StatusCode, Json};
use serde_json::{json, Value};

use crate::services::membership_service::MembershipError;

pub mod hike;
pub mod hikes;

// Business-rule rejections carry their own code and keep their message;
// storage faults get a generic detail (and a distinct code, so clients know
// this is the one class worth retrying).
pub(crate) fn error_response(err: &MembershipError) -> (StatusCode, Json<Value>) {
    let status = match err {
        MembershipError::HikeNotFound | MembershipError::RequestNotFound => StatusCode::NOT_FOUND,
        MembershipError::Forbidden => StatusCode::FORBIDDEN,
        MembershipError::NotMember
        | MembershipError::CapacityExceeded
        | MembershipError::RequestAlreadyResolved => StatusCode::CONFLICT,
        MembershipError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let detail = match err {
        MembershipError::Storage(_) => "Storage unavailable.".to_string(),
        other => other.to_string(),
    };
    (status, Json(json!({ "error": err.code(), "detail": detail })))
}

pub(crate) fn storage_error(err: sqlx::Error) -> (StatusCode, Json<Value>) {
    error_response(&MembershipError::Storage(err))
}

pub(crate) fn bad_request(detail: &str) -> (StatusCode, Json<Value>) {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": "invalid_request", "detail": detail })),
    )
}
