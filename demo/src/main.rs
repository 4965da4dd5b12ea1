//! TeleSpecialty intake reference clinic demo CLI
//!
//! Runs one or all of the three reference clinic scenarios, or loads a set of
//! catalog and rule documents and reports whether they form a valid clinic.
//!
//! Usage:
//!   cargo run -p demo -- run-all
//!   cargo run -p demo -- cardiac
//!   cargo run -p demo -- branching
//!   cargo run -p demo -- dashboard
//!   cargo run -p demo -- check-config --risk-rules my_rules.toml

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use telespec_contracts::error::TelespecResult;
use telespec_core::traits::QuestionCatalog;
use telespec_ref_clinic::{
    scenarios::{branching_retreat, cardiac_intake, dashboard},
    Clinic, ClinicConfig, PatientRepository,
};

// ── CLI definition ────────────────────────────────────────────────────────────

/// TeleSpecialty: structured pre-consultation intake demo.
///
/// Each subcommand runs one or all of the reference clinic scenarios,
/// showing branching interviews, rule-based risk flags, provenance-linked
/// ISBAR summaries, and the specialist dashboard.
#[derive(Parser)]
#[command(
    name = "demo",
    about = "TeleSpecialty intake reference clinic demo",
    long_about = "Runs TeleSpecialty intake scenarios showing branching questionnaires,\n\
                  risk flagging, ISBAR summaries with provenance, and the specialist dashboard."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run all three scenarios in sequence.
    RunAll,
    /// Scenario 1: Cardiac intake (branch, live flags, ISBAR provenance).
    Cardiac,
    /// Scenario 2: Branching and retreat (abandoned answers, replay).
    Branching,
    /// Scenario 3: Specialist dashboard (ordering, detail view, resubmission).
    Dashboard,
    /// Load catalog and rule documents and cross-check them.
    CheckConfig(ConfigPaths),
}

/// Paths replacing the embedded reference documents.
#[derive(Args)]
struct ConfigPaths {
    /// Question catalog TOML.
    #[arg(long)]
    catalog: Option<PathBuf>,
    /// Risk rule TOML.
    #[arg(long)]
    risk_rules: Option<PathBuf>,
    /// ISBAR extraction rule TOML.
    #[arg(long)]
    summary: Option<PathBuf>,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Initialize structured logging.  Set RUST_LOG=debug for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    print_banner();

    let result = match cli.command {
        Command::RunAll => run_all(),
        Command::Cardiac => cardiac_intake::run_scenario(),
        Command::Branching => branching_retreat::run_scenario(),
        Command::Dashboard => dashboard::run_scenario(),
        Command::CheckConfig(paths) => check_config(&paths),
    };

    match result {
        Ok(()) => {
            println!("All selected commands completed successfully.");
        }
        Err(e) => {
            eprintln!("Demo error: {}", e);
            std::process::exit(1);
        }
    }
}

// ── Dispatch ──────────────────────────────────────────────────────────────────

fn run_all() -> TelespecResult<()> {
    cardiac_intake::run_scenario()?;
    branching_retreat::run_scenario()?;
    dashboard::run_scenario()?;
    Ok(())
}

fn check_config(paths: &ConfigPaths) -> TelespecResult<()> {
    let config = ClinicConfig::reference().with_overrides(
        paths.catalog.as_deref(),
        paths.risk_rules.as_deref(),
        paths.summary.as_deref(),
    )?;
    let today = chrono::Utc::now().date_naive();
    let clinic = Clinic::new(&config, PatientRepository::sample(today))?;

    info!(questions = clinic.catalog().len(), "configuration accepted");
    println!("  Catalog:  {} question(s), starting at '{}'", clinic.catalog().len(), clinic.catalog().start());
    println!("  Rules:    risk rules and ISBAR rules cross-checked against the catalog");
    println!();
    Ok(())
}

// ── Banner ────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("TeleSpecialty Pre-consultation Intake");
    println!("Reference Clinic Demo");
    println!("=======================================");
    println!();
    println!("Submission pipeline per completed session:");
    println!("  [1] Effective answers: only questions on the final path count");
    println!("  [2] Risk engine derives flags, most severe first");
    println!("  [3] ISBAR builder extracts statements, each citing its sources");
    println!("  [4] Verifier checks schema and provenance before anything is stored");
    println!("  [5] Snapshot written to the SHA-256 ledger, then shown on the dashboard");
    println!();
}
