//! Scenario 3: Specialist dashboard
//!
//! All three reference patients complete their intake. The specialist's
//! dashboard lists them by appointment, most severe first at equal times,
//! and opens the detail view for one of them. A second submission of the
//! same session is refused.

use telespec_contracts::{
    answer::AnswerValue,
    dashboard::{DashboardEntry, ReviewStatus},
    error::{TelespecError, TelespecResult},
    session::PatientId,
};

use crate::{
    clinic::{run_script, Clinic},
    scenarios::{branching_retreat, cardiac_intake},
};

/// Emma's answers. She skips every optional question.
pub fn endocrine_script() -> Vec<(&'static str, AnswerValue)> {
    vec![
        ("chief_complaint", AnswerValue::text("Fatigue and increased thirst")),
        ("duration", AnswerValue::text("6 weeks")),
        ("chest_symptoms", AnswerValue::choice("No")),
        ("weight_change", AnswerValue::choice("Gained weight")),
        ("age", AnswerValue::Number(42.0)),
        ("sex", AnswerValue::choice("Female")),
    ]
}

/// Complete and submit an intake for each reference patient.
pub fn submit_all(clinic: &mut Clinic) -> TelespecResult<()> {
    let mut sarah = clinic.start_intake(&PatientId::new("pt-001"))?;
    run_script(&mut sarah, &cardiac_intake::script())?;
    clinic.submit(&mut sarah)?;

    let mut james = clinic.start_intake(&PatientId::new("pt-002"))?;
    for step in branching_retreat::steps() {
        james.apply(&step)?;
    }
    clinic.submit(&mut james)?;

    let mut emma = clinic.start_intake(&PatientId::new("pt-003"))?;
    run_script(&mut emma, &endocrine_script())?;
    clinic.submit(&mut emma)?;

    Ok(())
}

fn print_row(entry: &DashboardEntry) {
    let patient = entry.patient();
    let severity = entry
        .highest_severity()
        .map(|s| s.to_string())
        .unwrap_or_else(|| "none".to_string());
    let labels: Vec<&str> = entry.flags().iter().map(|f| f.label.as_str()).collect();
    println!(
        "    {}  {:<15} {:<17} {:<9} risk: {:<13} {}",
        patient.appointment_at.format("%a %H:%M"),
        patient.name,
        patient.specialty,
        format!("{:?}", patient.status),
        severity,
        labels.join(", ")
    );
}

/// Run Scenario 3: Specialist dashboard.
pub fn run_scenario() -> TelespecResult<()> {
    println!("=== Scenario 3: Specialist Dashboard ===");
    println!();

    let mut clinic = Clinic::reference()?;
    submit_all(&mut clinic)?;

    // ── Step 1: Patient list ──────────────────────────────────────────────────

    println!("  Patients ({}):", clinic.board().len());
    for entry in clinic.board().entries() {
        print_row(entry);
    }
    println!();

    let pending = clinic.board().with_status(ReviewStatus::Pending);
    println!("  Pending review: {}", pending.len());
    println!();

    // ── Step 2: Detail view ───────────────────────────────────────────────────

    let detail_id = PatientId::new("pt-001");
    let detail = clinic
        .board()
        .entry(&detail_id)
        .ok_or_else(|| TelespecError::InvalidTransition {
            reason: format!("no dashboard entry for '{detail_id}'"),
        })?;
    let patient = detail.patient();
    println!(
        "  Detail: {} ({}, {}), MRN {}",
        patient.name,
        patient.age.map(|a| a.to_string()).unwrap_or_default(),
        patient.sex,
        patient.mrn
    );
    println!("  Completed at {}", detail.completed_at().format("%Y-%m-%d %H:%M UTC"));
    cardiac_intake::print_summary(detail.summary());
    println!();

    // ── Step 3: Second submission is refused ──────────────────────────────────

    let mut session = clinic.start_intake(&PatientId::new("pt-003"))?;
    run_script(&mut session, &endocrine_script())?;
    clinic.submit(&mut session)?;
    match clinic.submit(&mut session) {
        Err(e @ TelespecError::AlreadySubmitted { .. }) => println!("  Resubmission refused: {}", e),
        Err(e) => return Err(e),
        Ok(_) => {
            return Err(TelespecError::InvalidTransition {
                reason: "a session was accepted twice".to_string(),
            })
        }
    }

    // ── Step 4: Ledger export ─────────────────────────────────────────────────

    let integrity_ok = clinic.ledger().verify_integrity();
    println!(
        "  Ledger: {} submission(s), integrity {}",
        clinic.ledger().len(),
        if integrity_ok { "VERIFIED" } else { "FAILED" }
    );

    let export = clinic.ledger().export();
    let json = serde_json::to_string_pretty(&export).map_err(|e| TelespecError::PersistenceFailed {
        reason: format!("failed to serialize ledger export: {}", e),
    })?;
    println!("  Export: {} bytes of JSON, terminal hash {}", json.len(), export.terminal_hash);
    println!();
    println!("  Scenario 3 complete.");
    println!();

    Ok(())
}

#[cfg(test)]
mod tests {
    use telespec_contracts::{
        answer::AnswerValue,
        dashboard::ReviewStatus,
        error::TelespecError,
        question::QuestionId,
        risk::Severity,
        session::PatientId,
    };

    use super::{endocrine_script, submit_all};
    use crate::clinic::{run_script, Clinic};

    #[test]
    fn board_is_ordered_by_appointment() {
        let mut clinic = Clinic::reference().unwrap();
        submit_all(&mut clinic).unwrap();

        let names: Vec<&str> = clinic.board().entries().iter().map(|e| e.patient().name.as_str()).collect();
        assert_eq!(names, vec!["Sarah Mitchell", "James Chen", "Emma Thompson"]);
        assert_eq!(clinic.board().with_status(ReviewStatus::Pending).len(), 2);
        assert_eq!(clinic.ledger().len(), 3);
    }

    #[test]
    fn skipped_allergies_raise_no_flag() {
        let mut clinic = Clinic::reference().unwrap();
        let mut session = clinic.start_intake(&PatientId::new("pt-003")).unwrap();
        run_script(&mut session, &endocrine_script()).unwrap();

        let entry = clinic.submit(&mut session).unwrap();

        assert!(entry.flags().is_empty());
        assert_eq!(entry.highest_severity(), None);
        assert!(entry.summary().assessment.is_empty());
        assert_eq!(entry.summary().background[0].text, "Weight change: Gained weight.");
    }

    #[test]
    fn uncertain_allergies_flag_cites_the_answer() {
        let mut clinic = Clinic::reference().unwrap();
        let mut session = clinic.start_intake(&PatientId::new("pt-003")).unwrap();
        let mut script = endocrine_script();
        script.push(("allergies", AnswerValue::text("Not sure, maybe shellfish")));
        run_script(&mut session, &script).unwrap();

        let entry = clinic.submit(&mut session).unwrap();

        assert_eq!(entry.flags().len(), 1);
        assert_eq!(entry.flags()[0].rule_id, "allergies-uncertain");
        assert_eq!(entry.flags()[0].triggered_by, vec![QuestionId::new("allergies")]);
        assert_eq!(entry.highest_severity(), Some(Severity::Informational));
        assert_eq!(entry.summary().assessment.len(), 1);
    }

    #[test]
    fn resubmission_is_refused() {
        let mut clinic = Clinic::reference().unwrap();
        let mut session = clinic.start_intake(&PatientId::new("pt-003")).unwrap();
        run_script(&mut session, &endocrine_script()).unwrap();
        clinic.submit(&mut session).unwrap();

        assert!(matches!(
            clinic.submit(&mut session),
            Err(TelespecError::AlreadySubmitted { .. })
        ));
        assert_eq!(clinic.ledger().len(), 1);
    }

    #[test]
    fn later_submission_supersedes_dashboard_entry() {
        let mut clinic = Clinic::reference().unwrap();
        submit_all(&mut clinic).unwrap();
        let first = clinic.board().entry(&PatientId::new("pt-003")).unwrap().session_id();

        let mut again = clinic.start_intake(&PatientId::new("pt-003")).unwrap();
        run_script(&mut again, &endocrine_script()).unwrap();
        clinic.submit(&mut again).unwrap();

        let current = clinic.board().entry(&PatientId::new("pt-003")).unwrap();
        assert_ne!(current.session_id(), first);
        assert_eq!(current.session_id(), again.id());
        assert_eq!(clinic.board().len(), 3);
        assert_eq!(clinic.ledger().len(), 4);
    }
}
