//! Scenario 2: Branching and retreat
//!
//! James Chen (67, gastroenterology) first says yes to chest symptoms, which
//! opens the cardiac branch. He goes back, changes his answer to no, and
//! finishes on the other path.
//!
//! Demonstrates:
//!   - Retreat keeps recorded answers
//!   - Answers on an abandoned branch stay stored but stop counting
//!   - Invalid answers are rejected with the prior answer kept
//!   - Replaying the recorded steps rebuilds the same session

use std::sync::Arc;

use telespec_contracts::{
    answer::AnswerValue,
    error::{TelespecError, TelespecResult},
    question::QuestionId,
    session::PatientId,
};
use telespec_core::session::{IntakeSession, IntakeStep};

use crate::{clinic::Clinic, scenarios::cardiac_intake::print_summary};

/// James's recorded steps, including the detour through the cardiac branch.
pub fn steps() -> Vec<IntakeStep> {
    let answer = |id: &str, value: AnswerValue| IntakeStep::Answer {
        question_id: QuestionId::new(id),
        value,
    };
    vec![
        answer("chief_complaint", AnswerValue::text("Unexplained weight loss and heartburn")),
        IntakeStep::Advance,
        answer("duration", AnswerValue::text("2 months")),
        IntakeStep::Advance,
        answer("chest_symptoms", AnswerValue::choice("Yes")),
        IntakeStep::Advance,
        answer("cardiac_detail", AnswerValue::choices(["At night"])),
        IntakeStep::Advance,
        // Back to the chest question: "it's really just heartburn".
        IntakeStep::Retreat,
        IntakeStep::Retreat,
        answer("chest_symptoms", AnswerValue::choice("No")),
        IntakeStep::Advance,
        answer("weight_change", AnswerValue::choice("Lost weight without trying")),
        IntakeStep::Advance,
        answer("conditions", AnswerValue::text("GERD")),
        IntakeStep::Advance,
        answer("medications", AnswerValue::text("Omeprazole 20mg daily")),
        IntakeStep::Advance,
        answer("allergies", AnswerValue::text("None known")),
        IntakeStep::Advance,
        answer("age", AnswerValue::Number(67.0)),
        IntakeStep::Advance,
        answer("sex", AnswerValue::choice("Male")),
        IntakeStep::Advance,
    ]
}

fn path(session: &IntakeSession) -> String {
    session
        .history()
        .iter()
        .map(QuestionId::as_str)
        .collect::<Vec<_>>()
        .join(" → ")
}

/// Run Scenario 2: Branching and retreat.
pub fn run_scenario() -> TelespecResult<()> {
    println!("=== Scenario 2: Branching and Retreat ===");
    println!();

    let mut clinic = Clinic::reference()?;
    let patient_id = PatientId::new("pt-002");
    let mut session = clinic.start_intake(&patient_id)?;
    let steps = steps();

    // ── Step 1: Into the cardiac branch ───────────────────────────────────────

    for step in &steps[..8] {
        session.apply(step)?;
    }
    println!("  Path after answering Yes:   {}", path(&session));
    println!("  Progress:                   {}%", session.progress().percent());

    // ── Step 2: Retreat and change the answer ─────────────────────────────────

    for step in &steps[8..12] {
        session.apply(step)?;
    }
    let cardiac = QuestionId::new("cardiac_detail");
    println!("  Path after changing to No:  {}", path(&session));
    println!(
        "  cardiac_detail stored:      {}   counted: {}",
        session.answers().contains(&cardiac),
        session.effective_answers().contains(&cardiac)
    );
    println!();

    // ── Step 3: A rejected answer ─────────────────────────────────────────────

    session.apply(&steps[12])?;
    let weight = QuestionId::new("weight_change");
    match session.set_answer(&weight, AnswerValue::choice("Gained a lot")) {
        Err(e @ TelespecError::Validation { .. }) => {
            println!("  Rejected answer:            {}", e);
            let kept = session.get_answer(&weight).map(|a| a.value.to_string());
            println!("  Answer kept:                {}", kept.unwrap_or_default());
        }
        Err(e) => return Err(e),
        Ok(_) => {
            return Err(TelespecError::InvalidTransition {
                reason: "an option outside the catalog was accepted".to_string(),
            })
        }
    }
    println!();

    // ── Step 4: Finish and submit ─────────────────────────────────────────────

    for step in &steps[13..] {
        session.apply(step)?;
    }
    println!("  Final path:                 {}", path(&session));

    let replayed = IntakeSession::replay(Arc::clone(clinic.catalog()), patient_id, &steps)?;
    println!(
        "  Replay matches:             {}",
        replayed.history() == session.history()
            && replayed.effective_answers().len() == session.effective_answers().len()
    );
    println!();

    let entry = clinic.submit(&mut session)?;
    println!("  Risk flags:");
    for flag in entry.flags() {
        println!("    - [{}] {}", flag.severity, flag.label);
    }
    println!();
    println!("  ISBAR summary:");
    print_summary(entry.summary());
    println!();
    println!("  Scenario 2 complete.");
    println!();

    Ok(())
}
