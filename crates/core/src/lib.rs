//! # MeetGrid Core
//!
//! Domain types and pure logic for the MeetGrid availability-poll service:
//! the half-hour slot model, the availability aggregator, selection editing
//! state, request validation and access rules. Nothing in this crate does
//! I/O.

pub mod access;
pub mod aggregate;
pub mod errors;
pub mod models;
pub mod selection;
pub mod slots;
pub mod validation;
