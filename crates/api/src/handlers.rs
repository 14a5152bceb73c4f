/// Account registration and sessions
pub mod auth;
/// Meeting creation, editing and the dashboard
pub mod meetings;
/// Availability submission, listing and the aggregated grid
pub mod responses;
