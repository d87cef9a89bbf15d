use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tracing::warn;

use crate::services::hike_service::{self, HikeView};
use crate::services::membership_service::{
    self, JoinRequestView, MembershipError, RequestDecisionView,
};
use crate::web::middleware::auth::{self, AuthenticatedUser};
use crate::web::routes::{bad_request, error_response, storage_error};

pub async fn hike_detail_handler(
    headers: HeaderMap,
    Path(hike_id): Path<String>,
    State(pool): State<SqlitePool>,
) -> Result<Json<HikeView>, (StatusCode, Json<Value>)> {
    let viewer = auth::identify(&headers);
    let view = hike_service::load_hike_view(&pool, &hike_id, viewer.as_ref().map(|u| u.id.as_str()))
        .await
        .map_err(|e| {
            warn!("Hike detail load failed for {}: {}", hike_id, e);
            storage_error(e)
        })?;

    match view {
        Some(v) => Ok(Json(v)),
        None => Err(error_response(&MembershipError::HikeNotFound)),
    }
}

#[derive(Debug, Deserialize)]
pub struct MembershipCommandBody {
    pub action: String, // join|leave|cancel_request
    pub subject_user_id: Option<String>,
}

// One command endpoint for everything that changes the caller's (or, for the
// organizer, someone else's) standing on a hike. `leave` with a
// subject_user_id other than the caller is the organizer removing a member.
pub async fn membership_command_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(hike_id): Path<String>,
    State(pool): State<SqlitePool>,
    Json(body): Json<MembershipCommandBody>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    match body.action.as_str() {
        "join" => {
            if body
                .subject_user_id
                .as_deref()
                .is_some_and(|s| s != auth_user.id)
            {
                return Err(bad_request("join is only valid for yourself"));
            }
            let outcome = membership_service::join_or_request(&pool, &hike_id, &auth_user.id)
                .await
                .map_err(|e| {
                    warn!("Join failed for {} on {}: {}", auth_user.id, hike_id, e);
                    error_response(&e)
                })?;
            Ok(Json(json!({
                "status": outcome.status(),
                "detail": outcome.detail(),
            })))
        }
        "leave" => match body.subject_user_id.as_deref().filter(|s| *s != auth_user.id) {
            Some(subject) => {
                membership_service::remove_member(&pool, &hike_id, subject, &auth_user.id)
                    .await
                    .map_err(|e| {
                        warn!("Member removal failed for {} on {}: {}", subject, hike_id, e);
                        error_response(&e)
                    })?;
                Ok(Json(json!({ "status": "removed", "detail": "Member removed." })))
            }
            None => {
                membership_service::leave(&pool, &hike_id, &auth_user.id)
                    .await
                    .map_err(|e| {
                        warn!("Leave failed for {} on {}: {}", auth_user.id, hike_id, e);
                        error_response(&e)
                    })?;
                Ok(Json(json!({ "status": "left", "detail": "Left hike." })))
            }
        },
        "cancel_request" => {
            membership_service::cancel_request(&pool, &hike_id, &auth_user.id)
                .await
                .map_err(|e| {
                    warn!("Request cancel failed for {} on {}: {}", auth_user.id, hike_id, e);
                    error_response(&e)
                })?;
            Ok(Json(json!({
                "status": "cancelled",
                "detail": "Join request cancelled.",
            })))
        }
        _ => Err(bad_request("action must be join, leave or cancel_request")),
    }
}

pub async fn list_requests_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(hike_id): Path<String>,
    State(pool): State<SqlitePool>,
) -> Result<Json<Vec<JoinRequestView>>, (StatusCode, Json<Value>)> {
    let requests = membership_service::list_requests(&pool, &hike_id, &auth_user.id)
        .await
        .map_err(|e| {
            warn!("Request list failed for {}: {}", hike_id, e);
            error_response(&e)
        })?;
    Ok(Json(requests))
}

#[derive(Debug, Deserialize)]
pub struct RequestDecisionBody {
    pub action: String, // approve|reject
}

pub async fn request_decision_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path((hike_id, request_id)): Path<(String, String)>,
    State(pool): State<SqlitePool>,
    Json(body): Json<RequestDecisionBody>,
) -> Result<Json<RequestDecisionView>, (StatusCode, Json<Value>)> {
    let decision = match body.action.as_str() {
        "approve" => {
            membership_service::approve_request(&pool, &hike_id, &request_id, &auth_user.id).await
        }
        "reject" => {
            membership_service::reject_request(&pool, &hike_id, &request_id, &auth_user.id).await
        }
        _ => return Err(bad_request("action must be approve or reject")),
    }
    .map_err(|e| {
        warn!(
            "Request decision '{}' failed for {} on {}: {}",
            body.action, request_id, hike_id, e
        );
        error_response(&e)
    })?;
    Ok(Json(decision))
}
