#![allow(dead_code)]

use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use trailhead::database::schema;
use trailhead::services::hike_service::{self, HikeView, NewHikeInput};

// A single connection keeps every caller on the same in-memory database.
pub async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory pool");
    schema::ensure_schema(&pool).await.expect("schema");
    pool
}

pub async fn create_hike(
    pool: &SqlitePool,
    creator_id: &str,
    visibility: &str,
    capacity: i64,
) -> HikeView {
    hike_service::create_hike(
        pool,
        creator_id,
        &NewHikeInput {
            title: "Ridge traverse".to_string(),
            description: "A long day on the ridge.".to_string(),
            location_name: "Grindelwald".to_string(),
            start_time: "2026-09-12T07:30:00Z".to_string(),
            end_time: Some("2026-09-12T17:00:00Z".to_string()),
            intensity: "medium".to_string(),
            visibility: visibility.to_string(),
            capacity,
            items_to_carry: "Water, crampons".to_string(),
            itinerary: "Up the west ridge, down the glacier path.".to_string(),
        },
    )
    .await
    .expect("create hike")
}
