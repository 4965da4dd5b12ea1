//! Three-valued evaluation of `Condition`s and branch resolution.
//!
//! A predicate that reads an unanswered question is neither true nor false
//! but `Pending`. Branch resolution treats `Pending` as "not yet satisfied";
//! the longest-path estimate treats it as "either way is still possible".

use telespec_contracts::{
    answer::{AnswerSet, AnswerValue},
    condition::Condition,
    question::{NextStep, Question, QuestionId},
};

/// Outcome of evaluating a condition against an answer set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Truth {
    Satisfied,
    Unsatisfied,
    /// A question the condition depends on has no answer yet.
    Pending,
}

impl Truth {
    pub fn is_satisfied(self) -> bool {
        self == Truth::Satisfied
    }

    fn from_bool(b: bool) -> Self {
        if b {
            Truth::Satisfied
        } else {
            Truth::Unsatisfied
        }
    }

    fn negate(self) -> Self {
        match self {
            Truth::Satisfied => Truth::Unsatisfied,
            Truth::Unsatisfied => Truth::Satisfied,
            Truth::Pending => Truth::Pending,
        }
    }
}

/// Evaluate `condition` against `answers`. Total: never fails.
pub fn evaluate(condition: &Condition, answers: &AnswerSet) -> Truth {
    match condition {
        Condition::Answered { question } => Truth::from_bool(answers.contains(question)),

        Condition::Equals { question, value } => {
            with_answer(answers, question, |answer| equals(answer, value))
        }

        Condition::NotEquals { question, value } => {
            with_answer(answers, question, |answer| !equals(answer, value))
        }

        Condition::Contains { question, value } => {
            let needle = value.trim().to_lowercase();
            with_answer(answers, question, |answer| match answer {
                AnswerValue::Text(s) | AnswerValue::Choice(s) => s.to_lowercase().contains(&needle),
                AnswerValue::Choices(items) => {
                    items.iter().any(|s| s.to_lowercase().contains(&needle))
                }
                AnswerValue::Number(_) => false,
            })
        }

        Condition::Includes { question, value } => {
            with_answer(answers, question, |answer| match answer {
                AnswerValue::Choices(items) => items.iter().any(|s| same_text(s, value)),
                AnswerValue::Choice(s) => same_text(s, value),
                _ => false,
            })
        }

        Condition::GreaterThan { question, value } => {
            with_answer(answers, question, |answer| answer.as_number().is_some_and(|n| n > *value))
        }

        Condition::AtLeast { question, value } => {
            with_answer(answers, question, |answer| answer.as_number().is_some_and(|n| n >= *value))
        }

        Condition::LessThan { question, value } => {
            with_answer(answers, question, |answer| answer.as_number().is_some_and(|n| n < *value))
        }

        Condition::All(members) => {
            let mut pending = false;
            for member in members {
                match evaluate(member, answers) {
                    Truth::Unsatisfied => return Truth::Unsatisfied,
                    Truth::Pending => pending = true,
                    Truth::Satisfied => {}
                }
            }
            if pending {
                Truth::Pending
            } else {
                Truth::Satisfied
            }
        }

        Condition::Any(members) => {
            let mut pending = false;
            for member in members {
                match evaluate(member, answers) {
                    Truth::Satisfied => return Truth::Satisfied,
                    Truth::Pending => pending = true,
                    Truth::Unsatisfied => {}
                }
            }
            if pending {
                Truth::Pending
            } else {
                Truth::Unsatisfied
            }
        }

        Condition::Not(inner) => evaluate(inner, answers).negate(),
    }
}

/// Case-insensitive comparison of trimmed text.
pub fn same_text(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

fn with_answer<F>(answers: &AnswerSet, question: &QuestionId, test: F) -> Truth
where
    F: FnOnce(&AnswerValue) -> bool,
{
    match answers.value(question) {
        Some(value) => Truth::from_bool(test(value)),
        None => Truth::Pending,
    }
}

fn equals(answer: &AnswerValue, expected: &str) -> bool {
    match answer {
        AnswerValue::Text(s) | AnswerValue::Choice(s) => same_text(s, expected),
        AnswerValue::Choices(items) => items.len() == 1 && same_text(&items[0], expected),
        AnswerValue::Number(n) => expected.trim().parse::<f64>().is_ok_and(|e| e == *n),
    }
}

// ── Branch resolution ─────────────────────────────────────────────────────────

/// The successor of `question`: the first satisfied branch's target, else the
/// default `next`, else `End`.
pub fn resolve_next(question: &Question, answers: &AnswerSet) -> NextStep {
    for branch in &question.branches {
        if evaluate(&branch.when, answers).is_satisfied() {
            return NextStep::Question(branch.goto.clone());
        }
    }
    default_step(question)
}

/// Every successor `question` could still have once pending prerequisites
/// are answered, in branch order. A satisfied branch cuts the list short;
/// otherwise the default successor is always included.
pub fn possible_successors(question: &Question, answers: &AnswerSet) -> Vec<NextStep> {
    let mut out = Vec::new();
    for branch in &question.branches {
        match evaluate(&branch.when, answers) {
            Truth::Satisfied => {
                out.push(NextStep::Question(branch.goto.clone()));
                return out;
            }
            Truth::Pending => out.push(NextStep::Question(branch.goto.clone())),
            Truth::Unsatisfied => {}
        }
    }
    out.push(default_step(question));
    out
}

fn default_step(question: &Question) -> NextStep {
    match &question.next {
        Some(id) => NextStep::Question(id.clone()),
        None => NextStep::End,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
