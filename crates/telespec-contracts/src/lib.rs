//! # telespec-contracts
//!
//! Shared types, snapshots, and the error taxonomy for the TeleSpecialty
//! intake core.
//!
//! All crates in the workspace import from here. No business logic lives in
//! this crate, only data definitions and error types.

pub mod answer;
pub mod condition;
pub mod dashboard;
pub mod error;
pub mod question;
pub mod risk;
pub mod session;
pub mod summary;
pub mod verify;
