pub mod meeting;
pub mod response;
pub mod user;
