// One row per (hike, user); status is pending until the hike's creator
// resolves it to approved or rejected.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct JoinRequestRow {
    pub request_id: String,
    pub hike_id: String,
    pub user_id: String,
    pub status: String,
    pub created_at: String,
    pub resolved_at: Option<String>,
}
