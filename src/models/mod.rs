pub mod hikes;
pub mod join_requests;

pub use hikes::HikeRow;
pub use join_requests::JoinRequestRow;
