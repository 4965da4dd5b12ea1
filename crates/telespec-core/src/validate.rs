//! Answer validation against a question's `Constraint`.
//!
//! Validation also normalizes: text is trimmed, choices are mapped to the
//! catalog's canonical spelling, and multi-choice selections are returned in
//! option order without duplicates. Intake UIs submit strings, so a `Text`
//! value is accepted for choice and numeric questions and converted.

use regex::Regex;

use telespec_contracts::{
    answer::AnswerValue,
    error::{TelespecError, TelespecResult},
    question::{AnswerType, ConstraintKind, Question},
};

use crate::condition::same_text;

/// Compile a constraint pattern so that it must match the whole answer.
pub fn compile_pattern(pattern: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!("^(?:{pattern})$"))
}

/// Validate `value` for `question` and return the normalized value to store.
///
/// `pattern` is the catalog's compiled form of the question's text pattern.
///
/// Returns `TelespecError::Validation` naming the first violated constraint,
/// or `TelespecError::ConfigError` if the question declares a pattern the
/// catalog did not compile.
pub fn validate_answer(
    question: &Question,
    pattern: Option<&Regex>,
    value: AnswerValue,
) -> TelespecResult<AnswerValue> {
    match question.answer_type {
        AnswerType::FreeText | AnswerType::ShortText => validate_text(question, pattern, value),
        AnswerType::SingleChoice => validate_single_choice(question, value),
        AnswerType::MultiChoice => validate_multi_choice(question, value),
        AnswerType::Numeric => validate_numeric(question, value),
    }
}

/// Build a `Validation` error for `question`.
pub fn violation(question: &Question, constraint: ConstraintKind, reason: impl Into<String>) -> TelespecError {
    TelespecError::Validation {
        question_id: question.id.0.clone(),
        constraint,
        reason: reason.into(),
    }
}

fn empty_answer(question: &Question) -> TelespecError {
    let reason = if question.constraint.required {
        "an answer is required"
    } else {
        "answer is empty; clear the answer instead of submitting an empty value"
    };
    violation(question, ConstraintKind::Required, reason)
}

fn wrong_type(question: &Question, value: &AnswerValue) -> TelespecError {
    violation(
        question,
        ConstraintKind::AnswerType,
        format!("expected a {:?} answer, got {:?}", question.answer_type, value),
    )
}

fn validate_text(
    question: &Question,
    compiled: Option<&Regex>,
    value: AnswerValue,
) -> TelespecResult<AnswerValue> {
    let raw = match value {
        AnswerValue::Text(s) | AnswerValue::Choice(s) => s,
        other => return Err(wrong_type(question, &other)),
    };
    let text = raw.trim();
    if text.is_empty() {
        return Err(empty_answer(question));
    }

    if let Some(limit) = question.constraint.max_length {
        let length = text.chars().count();
        if length > limit {
            return Err(violation(
                question,
                ConstraintKind::MaxLength,
                format!("answer is {length} characters; the limit is {limit}"),
            ));
        }
    }

    if let Some(pattern) = &question.constraint.pattern {
        let re = compiled.ok_or_else(|| TelespecError::ConfigError {
            reason: format!("catalog holds no compiled pattern for question '{}'", question.id),
        })?;
        if !re.is_match(text) {
            return Err(violation(
                question,
                ConstraintKind::Pattern,
                format!("answer does not match the expected format '{pattern}'"),
            ));
        }
    }

    Ok(AnswerValue::Text(text.to_string()))
}

fn canonical_option<'q>(question: &'q Question, candidate: &str) -> TelespecResult<&'q String> {
    question
        .constraint
        .options
        .iter()
        .find(|option| same_text(option, candidate))
        .ok_or_else(|| {
            violation(
                question,
                ConstraintKind::AllowedOptions,
                format!(
                    "'{}' is not one of: {}",
                    candidate.trim(),
                    question.constraint.options.join(", ")
                ),
            )
        })
}

fn validate_single_choice(question: &Question, value: AnswerValue) -> TelespecResult<AnswerValue> {
    let raw = match value {
        AnswerValue::Text(s) | AnswerValue::Choice(s) => s,
        AnswerValue::Choices(mut items) if items.len() <= 1 => items.pop().unwrap_or_default(),
        other => return Err(wrong_type(question, &other)),
    };
    if raw.trim().is_empty() {
        return Err(empty_answer(question));
    }
    let option = canonical_option(question, &raw)?;
    Ok(AnswerValue::Choice(option.clone()))
}

fn validate_multi_choice(question: &Question, value: AnswerValue) -> TelespecResult<AnswerValue> {
    let raw = match value {
        AnswerValue::Choices(items) => items,
        AnswerValue::Text(s) | AnswerValue::Choice(s) => vec![s],
        other => return Err(wrong_type(question, &other)),
    };

    let mut selected: Vec<&String> = Vec::new();
    for item in raw.iter().filter(|s| !s.trim().is_empty()) {
        selected.push(canonical_option(question, item)?);
    }
    if selected.is_empty() {
        return Err(empty_answer(question));
    }

    // Catalog order, each option at most once.
    let normalized: Vec<String> = question
        .constraint
        .options
        .iter()
        .filter(|option| selected.contains(option))
        .cloned()
        .collect();
    Ok(AnswerValue::Choices(normalized))
}

fn validate_numeric(question: &Question, value: AnswerValue) -> TelespecResult<AnswerValue> {
    let number = match &value {
        AnswerValue::Number(n) => *n,
        AnswerValue::Text(s) => {
            let s = s.trim();
            if s.is_empty() {
                return Err(empty_answer(question));
            }
            s.parse::<f64>().map_err(|_| {
                violation(question, ConstraintKind::AnswerType, format!("'{s}' is not a number"))
            })?
        }
        other => return Err(wrong_type(question, other)),
    };

    if !number.is_finite() {
        return Err(violation(question, ConstraintKind::AnswerType, "value must be a finite number"));
    }
    if let Some(min) = question.constraint.min {
        if number < min {
            return Err(violation(
                question,
                ConstraintKind::Min,
                format!("value {number} is below the minimum of {min}"),
            ));
        }
    }
    if let Some(max) = question.constraint.max {
        if number > max {
            return Err(violation(
                question,
                ConstraintKind::Max,
                format!("value {number} is above the maximum of {max}"),
            ));
        }
    }

    Ok(AnswerValue::Number(number))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
