//! # telespec-risk
//!
//! A TOML-driven risk rule engine for the intake core.
//!
//! [`TomlRiskEngine`] implements
//! [`RiskEngine`](telespec_core::traits::RiskEngine). Each rule pairs a
//! `Condition` over answers with a label, a severity, and a priority. Every
//! matching rule produces a flag; nothing is hardcoded in the engine.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::path::Path;
//! use telespec_risk::TomlRiskEngine;
//!
//! let engine = TomlRiskEngine::from_file(Path::new("config/risk_rules.toml"))?;
//! let flags = engine.evaluate(&session.effective_answers())?;
//! ```

pub mod engine;
pub mod rule;

pub use engine::TomlRiskEngine;
pub use rule::{RiskRule, RiskRuleConfig, DEFAULT_PRIORITY};

// ── Tests ─────────────────────────────────────────────────────────────────────
