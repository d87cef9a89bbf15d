pub mod hike_service;
pub mod membership_service;
