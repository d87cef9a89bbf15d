use sqlx::{SqlitePool, SqliteExecutor};

use crate::models::HikeRow;

// Hike row augmented with the viewer-relative fields. The flags are computed
// inside the query on every read; nothing here is stored per viewer.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct HikeFlagsRow {
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
    pub is_member: i64,
    pub is_admin: i64,
    pub join_request_status: Option<String>,
}

const SQL_INSERT_HIKE: &str = r#"
INSERT INTO hikes (
  hike_id,
  title,
  description,
  location_name,
  start_time,
  end_time,
  intensity,
  visibility,
  capacity,
  creator_id,
  items_to_carry,
  itinerary
) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
"#;

const SQL_LOAD_HIKE: &str = r#"
SELECT
  hike_id,
  title,
  description,
  location_name,
  start_time,
  end_time,
  intensity,
  visibility,
  capacity,
  creator_id,
  items_to_carry,
  itinerary,
  created_at
FROM hikes
WHERE hike_id = ?
"#;

// Shared SELECT body for the projected reads. The viewer id is bound as ''
// for guests; user ids are uuids, so '' never matches a member row.
const SQL_PROJECTED_FIELDS: &str = r#"
SELECT
  h.hike_id,
  h.title,
  h.description,
  h.location_name,
  h.start_time,
  h.end_time,
  h.intensity,
  h.visibility,
  h.capacity,
  h.creator_id,
  h.items_to_carry,
  h.itinerary,
  h.created_at,
  (SELECT COUNT(*) FROM hike_members m WHERE m.hike_id = h.hike_id) AS member_count,
  EXISTS(
    SELECT 1 FROM hike_members m
    WHERE m.hike_id = h.hike_id AND m.user_id = ?
  ) AS is_member,
  (h.creator_id = ?) AS is_admin,
  (
    SELECT r.status FROM join_requests r
    WHERE r.hike_id = h.hike_id AND r.user_id = ?
  ) AS join_request_status
FROM hikes h
"#;

pub struct NewHike<'a> {
    pub hike_id: &'a str,
    pub title: &'a str,
    pub description: &'a str,
    pub location_name: &'a str,
    pub start_time: &'a str,
    pub end_time: Option<&'a str>,
    pub intensity: &'a str,
    pub visibility: &'a str,
    pub capacity: i64,
    pub creator_id: &'a str,
    pub items_to_carry: &'a str,
    pub itinerary: &'a str,
}

pub async fn insert_hike(
    executor: impl SqliteExecutor<'_>,
    hike: NewHike<'_>,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_INSERT_HIKE)
        .bind(hike.hike_id)
        .bind(hike.title)
        .bind(hike.description)
        .bind(hike.location_name)
        .bind(hike.start_time)
        .bind(hike.end_time)
        .bind(hike.intensity)
        .bind(hike.visibility)
        .bind(hike.capacity)
        .bind(hike.creator_id)
        .bind(hike.items_to_carry)
        .bind(hike.itinerary)
        .execute(executor)
        .await?;
    Ok(res.rows_affected())
}

pub async fn load_hike(
    executor: impl SqliteExecutor<'_>,
    hike_id: &str,
) -> sqlx::Result<Option<HikeRow>> {
    sqlx::query_as::<_, HikeRow>(SQL_LOAD_HIKE)
        .bind(hike_id)
        .fetch_optional(executor)
        .await
}

// Listing follows the privacy rule: guests see public hikes only, signed-in
// viewers additionally see private hikes they belong to or have asked to
// join (a requester has to be able to watch their own request status).
const SQL_VISIBILITY_GUARD: &str = r#"(
  h.visibility = 'public'
  OR EXISTS(
    SELECT 1 FROM hike_members m
    WHERE m.hike_id = h.hike_id AND m.user_id = ?
  )
  OR EXISTS(
    SELECT 1 FROM join_requests r
    WHERE r.hike_id = h.hike_id AND r.user_id = ?
  )
)"#;

pub async fn list_visible(pool: &SqlitePool, viewer_id: &str) -> sqlx::Result<Vec<HikeFlagsRow>> {
    let sql = format!(
        r#"{SQL_PROJECTED_FIELDS}
WHERE {SQL_VISIBILITY_GUARD}
ORDER BY datetime(h.created_at) DESC
"#
    );
    sqlx::query_as::<_, HikeFlagsRow>(&sql)
        .bind(viewer_id)
        .bind(viewer_id)
        .bind(viewer_id)
        .bind(viewer_id)
        .bind(viewer_id)
        .fetch_all(pool)
        .await
}

pub async fn list_mine(pool: &SqlitePool, viewer_id: &str) -> sqlx::Result<Vec<HikeFlagsRow>> {
    let sql = format!(
        r#"{SQL_PROJECTED_FIELDS}
WHERE EXISTS(
  SELECT 1 FROM hike_members m
  WHERE m.hike_id = h.hike_id AND m.user_id = ?
)
ORDER BY datetime(h.created_at) DESC
"#
    );
    sqlx::query_as::<_, HikeFlagsRow>(&sql)
        .bind(viewer_id)
        .bind(viewer_id)
        .bind(viewer_id)
        .bind(viewer_id)
        .fetch_all(pool)
        .await
}

// Returns None for unknown hikes and for private hikes the viewer is not a
// member of; callers cannot tell the two apart, which keeps private hikes
// unenumerable.
pub async fn load_visible(
    pool: &SqlitePool,
    hike_id: &str,
    viewer_id: &str,
) -> sqlx::Result<Option<HikeFlagsRow>> {
    let sql = format!(
        r#"{SQL_PROJECTED_FIELDS}
WHERE h.hike_id = ?
  AND {SQL_VISIBILITY_GUARD}
"#
    );
    sqlx::query_as::<_, HikeFlagsRow>(&sql)
        .bind(viewer_id)
        .bind(viewer_id)
        .bind(viewer_id)
        .bind(hike_id)
        .bind(viewer_id)
        .bind(viewer_id)
        .fetch_optional(pool)
        .await
}
