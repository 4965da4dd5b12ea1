//! Reference clinic demo scenarios.
//!
//! Each scenario builds its own `Clinic` from the embedded configuration and
//! walks one or more fictional patients through intake, submission, and the
//! specialist dashboard.

pub mod branching_retreat;
pub mod cardiac_intake;
pub mod dashboard;
