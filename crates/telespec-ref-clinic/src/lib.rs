//! # telespec-ref-clinic
//!
//! Reference telehealth clinic for the TeleSpecialty intake core.
//!
//! Wires the TOML catalog, risk rules, and ISBAR rules under `config/` into a
//! [`clinic::Clinic`] and demonstrates it in three scenarios:
//!
//! 1. **Cardiac intake**: a full interview down the cardiac branch, with live
//!    flag preview and a provenance-linked summary.
//! 2. **Branching and retreat**: a changed answer abandons a branch; the
//!    abandoned answer is kept but no longer counts.
//! 3. **Specialist dashboard**: three patients listed by appointment and
//!    severity, and a refused double submission.
//!
//! All patient data is hardcoded and fictional.

pub mod clinic;
pub mod patients;
pub mod scenarios;

pub use clinic::{run_script, Clinic, ClinicConfig};
pub use patients::PatientRepository;

// ── Tests ─────────────────────────────────────────────────────────────────────
