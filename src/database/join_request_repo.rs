use sqlx::{SqlitePool, SqliteExecutor};

use crate::models::JoinRequestRow;

const SQL_INSERT_REQUEST: &str = r#"
INSERT INTO join_requests (request_id, hike_id, user_id, status)
VALUES (?, ?, ?, 'pending')
"#;

const SQL_FIND_REQUEST_FOR_USER: &str = r#"
SELECT request_id, hike_id, user_id, status, created_at, resolved_at
FROM join_requests
WHERE hike_id = ? AND user_id = ?
"#;

const SQL_LOAD_REQUEST: &str = r#"
SELECT request_id, hike_id, user_id, status, created_at, resolved_at
FROM join_requests
WHERE hike_id = ? AND request_id = ?
"#;

const SQL_LIST_REQUESTS: &str = r#"
SELECT request_id, hike_id, user_id, status, created_at, resolved_at
FROM join_requests
WHERE hike_id = ?
ORDER BY datetime(created_at) DESC, request_id
"#;

// The status guard keeps resolution single-shot: a request that was already
// resolved by a concurrent call reports zero affected rows here.
const SQL_RESOLVE_REQUEST: &str = r#"
UPDATE join_requests
SET status = ?, resolved_at = strftime('%Y-%m-%dT%H:%M:%SZ', 'now')
WHERE request_id = ? AND status = 'pending'
"#;

const SQL_DELETE_PENDING_REQUEST: &str = r#"
DELETE FROM join_requests
WHERE hike_id = ? AND user_id = ? AND status = 'pending'
"#;

const SQL_DELETE_REQUEST_FOR_USER: &str = r#"
DELETE FROM join_requests WHERE hike_id = ? AND user_id = ?
"#;

pub async fn insert_request(
    executor: impl SqliteExecutor<'_>,
    request_id: &str,
    hike_id: &str,
    user_id: &str,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_INSERT_REQUEST)
        .bind(request_id)
        .bind(hike_id)
        .bind(user_id)
        .execute(executor)
        .await?;
    Ok(res.rows_affected())
}

pub async fn find_request_for_user(
    executor: impl SqliteExecutor<'_>,
    hike_id: &str,
    user_id: &str,
) -> sqlx::Result<Option<JoinRequestRow>> {
    sqlx::query_as::<_, JoinRequestRow>(SQL_FIND_REQUEST_FOR_USER)
        .bind(hike_id)
        .bind(user_id)
        .fetch_optional(executor)
        .await
}

pub async fn load_request(
    executor: impl SqliteExecutor<'_>,
    hike_id: &str,
    request_id: &str,
) -> sqlx::Result<Option<JoinRequestRow>> {
    sqlx::query_as::<_, JoinRequestRow>(SQL_LOAD_REQUEST)
        .bind(hike_id)
        .bind(request_id)
        .fetch_optional(executor)
        .await
}

pub async fn list_requests(pool: &SqlitePool, hike_id: &str) -> sqlx::Result<Vec<JoinRequestRow>> {
    sqlx::query_as::<_, JoinRequestRow>(SQL_LIST_REQUESTS)
        .bind(hike_id)
        .fetch_all(pool)
        .await
}

pub async fn resolve_request(
    executor: impl SqliteExecutor<'_>,
    request_id: &str,
    status: &str,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_RESOLVE_REQUEST)
        .bind(status)
        .bind(request_id)
        .execute(executor)
        .await?;
    Ok(res.rows_affected())
}

pub async fn delete_pending_request(
    executor: impl SqliteExecutor<'_>,
    hike_id: &str,
    user_id: &str,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_DELETE_PENDING_REQUEST)
        .bind(hike_id)
        .bind(user_id)
        .execute(executor)
        .await?;
    Ok(res.rows_affected())
}

// Clears whatever request state a departing member leaves behind, so the
// (hike, user) pair starts from a clean slate if they ask to join again.
pub async fn delete_request_for_user(
    executor: impl SqliteExecutor<'_>,
    hike_id: &str,
    user_id: &str,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_DELETE_REQUEST_FOR_USER)
        .bind(hike_id)
        .bind(user_id)
        .execute(executor)
        .await?;
    Ok(res.rows_affected())
}
