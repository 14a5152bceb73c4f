/// Password hashing and session extractors
pub mod auth;
/// Mapping of domain errors onto HTTP responses
pub mod error_handling;
