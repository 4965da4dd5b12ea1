//! Scenario 1: Cardiac intake
//!
//! Sarah Mitchell (54, cardiology) completes the interview. Her chest
//! symptoms answer opens the cardiac branch, and the submission pipeline
//! derives critical flags and a provenance-linked ISBAR summary.
//!
//! Walk-through:
//!   1. Each question is shown with "question N of M" progress
//!   2. "Yes" to chest symptoms routes to the cardiac detail question
//!   3. Flags are previewed live before submission
//!   4. Submit: risk → ISBAR → verify → ledger → dashboard
//!   5. Ledger integrity verified at the end

use telespec_contracts::{
    answer::AnswerValue,
    error::TelespecResult,
    session::PatientId,
    summary::{IsbarSummary, Provenance},
};

use crate::clinic::Clinic;

/// Sarah's answers, keyed by question id.
pub fn script() -> Vec<(&'static str, AnswerValue)> {
    vec![
        ("chief_complaint", AnswerValue::text("Chest pain on exertion")),
        ("duration", AnswerValue::text("3 weeks")),
        ("chest_symptoms", AnswerValue::choice("Yes")),
        ("cardiac_detail", AnswerValue::choices(["On exertion", "With stress"])),
        ("weight_change", AnswerValue::choice("No change")),
        ("conditions", AnswerValue::text("Hypertension, high cholesterol")),
        ("medications", AnswerValue::text("Lisinopril 10mg daily, Atorvastatin 20mg")),
        ("allergies", AnswerValue::text("Penicillin")),
        ("age", AnswerValue::text("54")),
        ("sex", AnswerValue::choice("female")),
    ]
}

/// Print every non-empty section with each statement's sources.
pub fn print_summary(summary: &IsbarSummary) {
    for (section, statements) in summary.sections() {
        if statements.is_empty() {
            continue;
        }
        println!("  {}:", section);
        for statement in statements {
            let sources: Vec<String> = statement
                .provenance
                .iter()
                .map(|p| match p {
                    Provenance::Answer { question_id, revision } => format!("{question_id}@r{revision}"),
                    Provenance::Flag { rule_id } => format!("flag:{rule_id}"),
                })
                .collect();
            println!("    - {}  [{}]", statement.text, sources.join(", "));
        }
    }
}

/// Run Scenario 1: Cardiac intake.
pub fn run_scenario() -> TelespecResult<()> {
    println!("=== Scenario 1: Cardiac Intake ===");
    println!();

    let mut clinic = Clinic::reference()?;
    let patient_id = PatientId::new("pt-001");
    let mut session = clinic.start_intake(&patient_id)?;
    let script = script();

    // ── Walk the interview ────────────────────────────────────────────────────

    while let Some(current) = session.current().cloned() {
        let question = session.current_question()?;
        let progress = session.progress();
        println!(
            "  [{}/{}] {}",
            progress.visited, progress.estimated_total, question.prompt
        );

        if let Some((_, value)) = script.iter().find(|(id, _)| *id == current.as_str()) {
            let stored = session.set_answer(&current, value.clone())?;
            println!("         → {}", stored.value);
        } else {
            println!("         → (skipped)");
        }

        let flags = clinic.preview_flags(&session)?;
        if !flags.is_empty() {
            let labels: Vec<&str> = flags.iter().map(|f| f.label.as_str()).collect();
            println!("         live flags: {}", labels.join(", "));
        }

        session.advance()?;
    }

    println!();
    println!("  Interview complete: {} question(s) visited", session.history().len());
    println!();

    // ── Submit ────────────────────────────────────────────────────────────────

    let entry = clinic.submit(&mut session)?;

    println!("  Risk flags (most severe first):");
    for flag in entry.flags() {
        println!("    - [{}] {} (rule {})", flag.severity, flag.label, flag.rule_id);
    }
    println!();
    println!("  ISBAR summary:");
    print_summary(entry.summary());
    println!();

    // ── Verify ledger integrity ───────────────────────────────────────────────

    let integrity_ok = clinic.ledger().verify_integrity();
    println!(
        "  Ledger integrity:  {} ({} submission(s) stored)",
        if integrity_ok { "VERIFIED" } else { "FAILED" },
        clinic.ledger().len()
    );
    println!();
    println!("  Scenario 1 complete.");
    println!();

    Ok(())
}
