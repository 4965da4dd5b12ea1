//! # telespec-verify
//!
//! Submission verification for the intake core.
//!
//! This crate provides [`engine::ProvenanceVerifier`], which implements the
//! [`telespec_core::traits::SubmissionVerifier`] trait. It checks every
//! `SubmissionSnapshot` in three phases:
//!
//! 1. **Structural**: JSON Schema validation via the `jsonschema` crate.
//! 2. **Provenance**: no summary statement or flag without a source present
//!    in the snapshot; answers only on the visited path; flags in order.
//! 3. **Custom**: clinic-specific checks registered at startup.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use telespec_verify::ProvenanceVerifier;
//!
//! let mut verifier = ProvenanceVerifier::new();
//! verifier.register_check("critical-needs-recommendation", Box::new(|snapshot| {
//!     let critical = snapshot.flags.iter().any(|f| f.severity == Severity::Critical);
//!     (critical && snapshot.summary.recommendation.is_empty())
//!         .then(|| "critical flag without a recommendation".to_string())
//! }));
//! ```

pub mod engine;
pub mod schema;

pub use engine::{CustomCheckFn, ProvenanceVerifier};
pub use schema::snapshot_schema;

// ── Tests ─────────────────────────────────────────────────────────────────────
