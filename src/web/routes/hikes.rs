use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::Value;
use sqlx::SqlitePool;
use tracing::warn;

use crate::services::hike_service::{self, HikeView, NewHikeInput};
use crate::web::middleware::auth::{self, AuthenticatedUser};
use crate::web::routes::{bad_request, storage_error};

// Browsing is open to guests; the projection just renders the viewer-relative
// fields as false/absent when no identity is present.
pub async fn list_hikes_handler(
    headers: HeaderMap,
    State(pool): State<SqlitePool>,
) -> Result<Json<Vec<HikeView>>, (StatusCode, Json<Value>)> {
    let viewer = auth::identify(&headers);
    let hikes = hike_service::list_hikes(&pool, viewer.as_ref().map(|u| u.id.as_str()))
        .await
        .map_err(|e| {
            warn!("Hike list failed: {}", e);
            storage_error(e)
        })?;
    Ok(Json(hikes))
}

pub async fn my_hikes_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(pool): State<SqlitePool>,
) -> Result<Json<Vec<HikeView>>, (StatusCode, Json<Value>)> {
    let hikes = hike_service::list_my_hikes(&pool, &auth_user.id)
        .await
        .map_err(|e| {
            warn!("My-hikes list failed for {}: {}", auth_user.id, e);
            storage_error(e)
        })?;
    Ok(Json(hikes))
}

#[derive(Debug, Deserialize)]
pub struct CreateHikeBody {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub location_name: String,
    pub start_time: String,
    pub end_time: Option<String>,
    #[serde(default = "default_intensity")]
    pub intensity: String,
    #[serde(default = "default_visibility")]
    pub visibility: String,
    #[serde(default = "default_capacity")]
    pub capacity: i64,
    #[serde(default)]
    pub items_to_carry: String,
    #[serde(default)]
    pub itinerary: String,
}

fn default_intensity() -> String {
    "easy".to_string()
}

fn default_visibility() -> String {
    "public".to_string()
}

fn default_capacity() -> i64 {
    10
}

pub async fn create_hike_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(pool): State<SqlitePool>,
    Json(body): Json<CreateHikeBody>,
) -> Result<(StatusCode, Json<HikeView>), (StatusCode, Json<Value>)> {
    if body.title.trim().is_empty() {
        return Err(bad_request("title is required"));
    }
    if body.location_name.trim().is_empty() {
        return Err(bad_request("location_name is required"));
    }
    if body.start_time.trim().is_empty() {
        return Err(bad_request("start_time is required"));
    }
    if body.capacity < 1 {
        return Err(bad_request("capacity must be at least 1"));
    }
    if !matches!(body.intensity.as_str(), "easy" | "medium" | "hard") {
        return Err(bad_request("intensity must be easy, medium or hard"));
    }
    if !matches!(body.visibility.as_str(), "public" | "private") {
        return Err(bad_request("visibility must be public or private"));
    }

    let input = NewHikeInput {
        title: body.title.trim().to_string(),
        description: body.description,
        location_name: body.location_name.trim().to_string(),
        start_time: body.start_time,
        end_time: body.end_time,
        intensity: body.intensity,
        visibility: body.visibility,
        capacity: body.capacity,
        items_to_carry: body.items_to_carry,
        itinerary: body.itinerary,
    };

    let view = hike_service::create_hike(&pool, &auth_user.id, &input)
        .await
        .map_err(|e| {
            warn!("Hike create failed for {}: {}", auth_user.id, e);
            storage_error(e)
        })?;
    Ok((StatusCode::CREATED, Json(view)))
}
