use sqlx::SqlitePool;

// The service owns its SQLite file end to end, so the schema is applied at
// startup instead of via an external migration step. Statements are
// idempotent; running them against an existing database is a no-op.

const SQL_CREATE_HIKES: &str = r#"
CREATE TABLE IF NOT EXISTS hikes (
  hike_id        TEXT PRIMARY KEY,
  title          TEXT NOT NULL,
  description    TEXT NOT NULL DEFAULT '',
  location_name  TEXT NOT NULL,
  start_time     TEXT NOT NULL,
  end_time       TEXT,
  intensity      TEXT NOT NULL DEFAULT 'easy',
  visibility     TEXT NOT NULL DEFAULT 'public',
  capacity       INTEGER NOT NULL CHECK (capacity >= 1),
  creator_id     TEXT NOT NULL,
  items_to_carry TEXT NOT NULL DEFAULT '',
  itinerary      TEXT NOT NULL DEFAULT '',
  created_at     TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now'))
)
"#;

const SQL_CREATE_HIKE_MEMBERS: &str = r#"
CREATE TABLE IF NOT EXISTS hike_members (
  hike_id   TEXT NOT NULL,
  user_id   TEXT NOT NULL,
  joined_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now')),
  PRIMARY KEY (hike_id, user_id)
)
"#;

const SQL_CREATE_JOIN_REQUESTS: &str = r#"
CREATE TABLE IF NOT EXISTS join_requests (
  request_id  TEXT PRIMARY KEY,
  hike_id     TEXT NOT NULL,
  user_id     TEXT NOT NULL,
  status      TEXT NOT NULL DEFAULT 'pending',
  created_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now')),
  resolved_at TEXT,
  UNIQUE (hike_id, user_id)
)
"#;

const SQL_CREATE_JOIN_REQUESTS_HIKE_IDX: &str = r#"
CREATE INDEX IF NOT EXISTS idx_join_requests_hike
ON join_requests (hike_id, created_at)
"#;

pub async fn ensure_schema(pool: &SqlitePool) -> sqlx::Result<()> {
    for stmt in [
        SQL_CREATE_HIKES,
        SQL_CREATE_HIKE_MEMBERS,
        SQL_CREATE_JOIN_REQUESTS,
        SQL_CREATE_JOIN_REQUESTS_HIKE_IDX,
    ] {
        sqlx::query(stmt).execute(pool).await?;
    }
    Ok(())
}
