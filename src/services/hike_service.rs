use serde::Serialize;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::database::hike_repo::{self, HikeFlagsRow, NewHike};
use crate::database::membership_repo;

/// Hike record plus the viewer-relative projection. Everything below
/// `created_at` is derived per read and never stored.
#[derive(Debug, Serialize)]
pub struct HikeView {
    pub hike_id: String,
    pub title: String,
    pub description: String,
    pub location_name: String,
    pub start_time: String,
    pub end_time: Option<String>,
    pub intensity: String,
    pub visibility: String,
    pub capacity: i64,
    pub creator_id: String,
    pub items_to_carry: String,
    pub itinerary: String,
    pub created_at: String,
    pub member_count: i64,
    pub is_member: bool,
    pub is_admin: bool,
    pub join_request_status: Option<String>,
}

pub struct NewHikeInput {
    pub title: String,
    pub description: String,
    pub location_name: String,
    pub start_time: String,
    pub end_time: Option<String>,
    pub intensity: String,
    pub visibility: String,
    pub capacity: i64,
    pub items_to_carry: String,
    pub itinerary: String,
}

fn build_view(row: HikeFlagsRow) -> HikeView {
    HikeView {
        hike_id: row.hike_id,
        title: row.title,
        description: row.description,
        location_name: row.location_name,
        start_time: row.start_time,
        end_time: row.end_time,
        intensity: row.intensity,
        visibility: row.visibility,
        capacity: row.capacity,
        creator_id: row.creator_id,
        items_to_carry: row.items_to_carry,
        itinerary: row.itinerary,
        created_at: row.created_at,
        member_count: row.member_count,
        is_member: row.is_member != 0,
        is_admin: row.is_admin != 0,
        join_request_status: row.join_request_status,
    }
}

// Guests project as the empty viewer: ids are uuids, so '' matches nothing.
fn viewer_key(viewer_id: Option<&str>) -> &str {
    viewer_id.unwrap_or("")
}

/// Creates the hike and seats the creator in the same transaction; the
/// creator's row is what makes them count toward capacity from the start.
pub async fn create_hike(
    pool: &SqlitePool,
    creator_id: &str,
    input: &NewHikeInput,
) -> sqlx::Result<HikeView> {
    let hike_id = Uuid::new_v4().to_string();

    let mut tx = pool.begin().await?;
    hike_repo::insert_hike(
        &mut *tx,
        NewHike {
            hike_id: &hike_id,
            title: &input.title,
            description: &input.description,
            location_name: &input.location_name,
            start_time: &input.start_time,
            end_time: input.end_time.as_deref(),
            intensity: &input.intensity,
            visibility: &input.visibility,
            capacity: input.capacity,
            creator_id,
            items_to_carry: &input.items_to_carry,
            itinerary: &input.itinerary,
        },
    )
    .await?;
    membership_repo::insert_member(&mut *tx, &hike_id, creator_id).await?;
    tx.commit().await?;

    load_hike_view(pool, &hike_id, Some(creator_id))
        .await?
        .ok_or(sqlx::Error::RowNotFound)
}

pub async fn list_hikes(
    pool: &SqlitePool,
    viewer_id: Option<&str>,
) -> sqlx::Result<Vec<HikeView>> {
    let rows = hike_repo::list_visible(pool, viewer_key(viewer_id)).await?;
    Ok(rows.into_iter().map(build_view).collect())
}

pub async fn list_my_hikes(pool: &SqlitePool, viewer_id: &str) -> sqlx::Result<Vec<HikeView>> {
    let rows = hike_repo::list_mine(pool, viewer_id).await?;
    Ok(rows.into_iter().map(build_view).collect())
}

/// None covers both unknown ids and private hikes the viewer cannot see.
pub async fn load_hike_view(
    pool: &SqlitePool,
    hike_id: &str,
    viewer_id: Option<&str>,
) -> sqlx::Result<Option<HikeView>> {
    let row = hike_repo::load_visible(pool, hike_id, viewer_key(viewer_id)).await?;
    Ok(row.map(build_view))
}
