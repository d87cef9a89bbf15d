pub mod hike_repo;
pub mod join_request_repo;
pub mod membership_repo;
pub mod schema;
