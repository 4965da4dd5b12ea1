//! # telespec-catalog
//!
//! The declarative question catalog for the intake interview.
//!
//! [`TomlQuestionCatalog`] implements
//! [`QuestionCatalog`](telespec_core::traits::QuestionCatalog). Questions,
//! their constraints, and their branches are declared in TOML; the graph is
//! validated once at load time and is read-only afterwards, so one catalog
//! can be shared by every session behind an `Arc`.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::{path::Path, sync::Arc};
//! use telespec_catalog::TomlQuestionCatalog;
//!
//! let catalog = Arc::new(TomlQuestionCatalog::from_file(Path::new("config/catalog.toml"))?);
//! let session = IntakeSession::new(catalog, patient_id)?;
//! ```
//!
//! ## Branching
//!
//! Each question lists conditional branches followed by a default `next`.
//! The first branch whose condition holds wins. A branch whose condition
//! reads an unanswered question does not fire.

pub mod catalog;
pub mod definition;

pub use catalog::TomlQuestionCatalog;
pub use definition::{CatalogConfig, QuestionSpec};

// ── Tests ─────────────────────────────────────────────────────────────────────
