use sqlx::SqliteExecutor;

// Capacity is enforced by the insert itself: the row is only written while
// the committed member count is still below the hike's capacity. SQLite runs
// the statement as one atomic unit, so two callers racing for the last slot
// cannot both get a row in. The (hike_id, user_id) primary key turns a
// racing duplicate join into a unique-constraint error instead of a second
// row.
const SQL_INSERT_MEMBER_GUARDED: &str = r#"
INSERT INTO hike_members (hike_id, user_id)
SELECT h.hike_id, ?
FROM hikes h
WHERE h.hike_id = ?
  AND (SELECT COUNT(*) FROM hike_members m WHERE m.hike_id = h.hike_id) < h.capacity
"#;

const SQL_COUNT_MEMBERS: &str = r#"
SELECT COUNT(*) FROM hike_members WHERE hike_id = ?
"#;

const SQL_MEMBER_EXISTS: &str = r#"
SELECT EXISTS(SELECT 1 FROM hike_members WHERE hike_id = ? AND user_id = ?)
"#;

const SQL_DELETE_MEMBER: &str = r#"
DELETE FROM hike_members WHERE hike_id = ? AND user_id = ?
"#;

// Unconditional insert, used for the creator's seat at hike creation where
// capacity >= 1 already guarantees room.
const SQL_INSERT_MEMBER: &str = r#"
INSERT INTO hike_members (hike_id, user_id) VALUES (?, ?)
"#;

pub async fn insert_member_guarded(
    executor: impl SqliteExecutor<'_>,
    hike_id: &str,
    user_id: &str,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_INSERT_MEMBER_GUARDED)
        .bind(user_id)
        .bind(hike_id)
        .execute(executor)
        .await?;
    Ok(res.rows_affected())
}

pub async fn insert_member(
    executor: impl SqliteExecutor<'_>,
    hike_id: &str,
    user_id: &str,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_INSERT_MEMBER)
        .bind(hike_id)
        .bind(user_id)
        .execute(executor)
        .await?;
    Ok(res.rows_affected())
}

pub async fn count_members(
    executor: impl SqliteExecutor<'_>,
    hike_id: &str,
) -> sqlx::Result<i64> {
    sqlx::query_scalar::<_, i64>(SQL_COUNT_MEMBERS)
        .bind(hike_id)
        .fetch_one(executor)
        .await
}

pub async fn member_exists(
    executor: impl SqliteExecutor<'_>,
    hike_id: &str,
    user_id: &str,
) -> sqlx::Result<bool> {
    let exists = sqlx::query_scalar::<_, i64>(SQL_MEMBER_EXISTS)
        .bind(hike_id)
        .bind(user_id)
        .fetch_one(executor)
        .await?;
    Ok(exists != 0)
}

pub async fn delete_member(
    executor: impl SqliteExecutor<'_>,
    hike_id: &str,
    user_id: &str,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_DELETE_MEMBER)
        .bind(hike_id)
        .bind(user_id)
        .execute(executor)
        .await?;
    Ok(res.rows_affected())
}
