#[derive(Debug, Clone, sqlx::FromRow)]
pub struct HikeRow {
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
}
