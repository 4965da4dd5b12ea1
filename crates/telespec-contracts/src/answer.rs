//! Answer values and the keyed answer set.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::question::QuestionId;

/// A raw answer value, typed per the question's `AnswerType`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "kebab-case")]
pub enum AnswerValue {
    Text(String),
    Choice(String),
    Choices(Vec<String>),
    Number(f64),
}

impl AnswerValue {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    pub fn choice(s: impl Into<String>) -> Self {
        Self::Choice(s.into())
    }

    pub fn choices<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Choices(items.into_iter().map(Into::into).collect())
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// The text of a `Text` or `Choice` value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) | Self::Choice(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for AnswerValue {
    /// Multi-choice values are joined with ", "; whole numbers print without a
    /// fractional part.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) | Self::Choice(s) => f.write_str(s),
            Self::Choices(items) => f.write_str(&items.join(", ")),
            Self::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

/// A validated answer to one question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub question_id: QuestionId,
    pub value: AnswerValue,
    /// Wall-clock time of the last successful `set` (UTC).
    pub recorded_at: DateTime<Utc>,
    /// Store-wide write counter; strictly increases with every successful `set`.
    pub revision: u64,
}

/// Answers keyed by question id, iterated in id order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerSet {
    inner: BTreeMap<QuestionId, Answer>,
}

impl AnswerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &QuestionId) -> Option<&Answer> {
        self.inner.get(id)
    }

    pub fn value(&self, id: &QuestionId) -> Option<&AnswerValue> {
        self.inner.get(id).map(|a| &a.value)
    }

    pub fn contains(&self, id: &QuestionId) -> bool {
        self.inner.contains_key(id)
    }

    /// Insert or replace the answer for `answer.question_id`, returning the previous one.
    pub fn insert(&mut self, answer: Answer) -> Option<Answer> {
        self.inner.insert(answer.question_id.clone(), answer)
    }

    pub fn remove(&mut self, id: &QuestionId) -> Option<Answer> {
        self.inner.remove(id)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Answer> {
        self.inner.values()
    }

    /// A copy holding only the answers whose question id is in `ids`.
    pub fn restricted_to<'a, I>(&self, ids: I) -> AnswerSet
    where
        I: IntoIterator<Item = &'a QuestionId>,
    {
        let mut out = AnswerSet::new();
        for id in ids {
            if let Some(answer) = self.inner.get(id) {
                out.insert(answer.clone());
            }
        }
        out
    }
}

impl FromIterator<Answer> for AnswerSet {
    fn from_iter<T: IntoIterator<Item = Answer>>(iter: T) -> Self {
        let mut set = AnswerSet::new();
        for answer in iter {
            set.insert(answer);
        }
        set
    }
}
