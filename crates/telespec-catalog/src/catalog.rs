//! TOML-loaded question catalog.
//!
//! `TomlQuestionCatalog` validates the whole graph at load time so that
//! sessions never meet a dangling edge or a cycle at runtime:
//!
//! 1. Question ids are unique and the start question exists.
//! 2. Every `next`, branch target, and condition reference names a question.
//! 3. Choice questions declare distinct options; other questions declare none.
//! 4. Numeric bounds are ordered and text patterns compile. Patterns are
//!    compiled once here and reused for every answer.
//! 5. The graph over all edges (branches and defaults) is acyclic.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use regex::Regex;
use tracing::{debug, warn};

use telespec_contracts::{
    answer::AnswerSet,
    error::{TelespecError, TelespecResult},
    question::{NextStep, Question, QuestionId},
};
use telespec_core::{
    condition::{possible_successors, resolve_next, same_text},
    traits::QuestionCatalog,
    validate::compile_pattern,
};

use crate::definition::CatalogConfig;

/// A `QuestionCatalog` read from a TOML document.
///
/// ```rust,ignore
/// use telespec_catalog::TomlQuestionCatalog;
///
/// let catalog = TomlQuestionCatalog::from_file(Path::new("config/catalog.toml"))?;
/// ```
#[derive(Debug)]
pub struct TomlQuestionCatalog {
    start: QuestionId,
    questions: BTreeMap<QuestionId, Question>,
    /// Ids in declaration order.
    order: Vec<QuestionId>,
    /// Anchored text patterns, compiled at load.
    patterns: HashMap<QuestionId, Regex>,
}

impl TomlQuestionCatalog {
    /// Parse `s` as a catalog document and validate it.
    pub fn from_toml_str(s: &str) -> TelespecResult<Self> {
        let config: CatalogConfig = toml::from_str(s).map_err(|e| TelespecError::ConfigError {
            reason: format!("failed to parse catalog TOML: {}", e),
        })?;
        Self::from_config(config)
    }

    /// Read and validate the catalog file at `path`.
    pub fn from_file(path: &Path) -> TelespecResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| TelespecError::ConfigError {
            reason: format!("failed to read catalog file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    /// Build from an already-parsed document.
    pub fn from_config(config: CatalogConfig) -> TelespecResult<Self> {
        if config.questions.is_empty() {
            return Err(config_error("catalog declares no questions".to_string()));
        }

        let mut questions = BTreeMap::new();
        let mut order = Vec::with_capacity(config.questions.len());
        for (ordinal, spec) in config.questions.into_iter().enumerate() {
            let question = spec.into_question(ordinal as u32);
            if questions.contains_key(&question.id) {
                return Err(config_error(format!("duplicate question id '{}'", question.id)));
            }
            order.push(question.id.clone());
            questions.insert(question.id.clone(), question);
        }

        let mut catalog = Self { start: config.start, questions, order, patterns: HashMap::new() };
        catalog.patterns = catalog.validate()?;

        debug!(
            start = %catalog.start,
            questions = catalog.order.len(),
            "question catalog loaded"
        );
        Ok(catalog)
    }

    /// Questions in declaration order.
    pub fn questions(&self) -> impl Iterator<Item = &Question> {
        self.order.iter().filter_map(|id| self.questions.get(id))
    }

    // ── Validation ────────────────────────────────────────────────────────────

    /// Check the whole graph and return the compiled text patterns.
    fn validate(&self) -> TelespecResult<HashMap<QuestionId, Regex>> {
        if !self.questions.contains_key(&self.start) {
            return Err(config_error(format!("start question '{}' is not defined", self.start)));
        }

        let mut patterns = HashMap::new();
        for question in self.questions() {
            self.validate_edges(question)?;
            if let Some(re) = validate_constraint(question)? {
                patterns.insert(question.id.clone(), re);
            }
        }

        self.check_acyclic()?;

        let reachable = self.reachable_from_start();
        for id in &self.order {
            if !reachable.contains(id) {
                warn!(question_id = %id, "question is unreachable from the start question");
            }
        }
        Ok(patterns)
    }

    fn validate_edges(&self, question: &Question) -> TelespecResult<()> {
        let id = &question.id;
        if let Some(next) = &question.next {
            self.require_defined(next, || format!("question '{id}' continues to undefined question '{next}'"))?;
        }
        for branch in &question.branches {
            let target = &branch.goto;
            self.require_defined(target, || {
                format!("question '{id}' branches to undefined question '{target}'")
            })?;
            for read in branch.when.questions() {
                self.require_defined(read, || {
                    format!("branch condition on question '{id}' reads undefined question '{read}'")
                })?;
            }
        }
        Ok(())
    }

    fn require_defined(&self, id: &QuestionId, message: impl FnOnce() -> String) -> TelespecResult<()> {
        if self.questions.contains_key(id) {
            Ok(())
        } else {
            Err(config_error(message()))
        }
    }

    /// Every outgoing edge of `question`, branches first.
    fn edges<'a>(&self, question: &'a Question) -> impl Iterator<Item = &'a QuestionId> {
        question
            .branches
            .iter()
            .map(|b| &b.goto)
            .chain(question.next.as_ref())
    }

    /// Iterative three-colour DFS over every question.
    fn check_acyclic(&self) -> TelespecResult<()> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Visiting,
            Done,
        }

        let mut marks: HashMap<&QuestionId, Mark> = HashMap::new();
        for root in &self.order {
            if marks.contains_key(root) {
                continue;
            }
            // (node, index of the next edge to explore)
            let mut stack: Vec<(&QuestionId, usize)> = vec![(root, 0)];
            marks.insert(root, Mark::Visiting);

            while let Some((node, edge_index)) = stack.pop() {
                let question = self.question(node)?;
                let next_edge = self.edges(question).nth(edge_index);
                match next_edge {
                    None => {
                        marks.insert(node, Mark::Done);
                    }
                    Some(child) => {
                        stack.push((node, edge_index + 1));
                        match marks.get(child) {
                            Some(Mark::Visiting) => {
                                return Err(config_error(format!(
                                    "catalog graph has a cycle through '{node}' → '{child}'"
                                )));
                            }
                            Some(Mark::Done) => {}
                            None => {
                                marks.insert(child, Mark::Visiting);
                                stack.push((child, 0));
                            }
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn reachable_from_start(&self) -> HashSet<&QuestionId> {
        let mut seen = HashSet::new();
        let mut pending = vec![&self.start];
        while let Some(id) = pending.pop() {
            if !seen.insert(id) {
                continue;
            }
            if let Some(question) = self.questions.get(id) {
                pending.extend(self.edges(question));
            }
        }
        seen
    }

    fn longest_from(
        &self,
        id: &QuestionId,
        answers: &AnswerSet,
        memo: &mut HashMap<QuestionId, usize>,
    ) -> TelespecResult<usize> {
        if let Some(len) = memo.get(id) {
            return Ok(*len);
        }
        let question = self.question(id)?;
        let mut best = 0;
        for step in possible_successors(question, answers) {
            let len = match step {
                NextStep::End => 0,
                NextStep::Question(next) => self.longest_from(&next, answers, memo)?,
            };
            best = best.max(len);
        }
        memo.insert(id.clone(), best + 1);
        Ok(best + 1)
    }
}

fn validate_constraint(question: &Question) -> TelespecResult<Option<Regex>> {
    let id = &question.id;
    let constraint = &question.constraint;

    if question.answer_type.is_choice() {
        if constraint.options.is_empty() {
            return Err(config_error(format!("choice question '{id}' declares no options")));
        }
        for (i, option) in constraint.options.iter().enumerate() {
            if option.trim().is_empty() {
                return Err(config_error(format!("choice question '{id}' has an empty option")));
            }
            if constraint.options[..i].iter().any(|earlier| same_text(earlier, option)) {
                return Err(config_error(format!("choice question '{id}' repeats option '{option}'")));
            }
        }
    } else if !constraint.options.is_empty() {
        return Err(config_error(format!(
            "question '{id}' declares options but is not a choice question"
        )));
    }

    if let (Some(min), Some(max)) = (constraint.min, constraint.max) {
        if min > max {
            return Err(config_error(format!("question '{id}' has min {min} greater than max {max}")));
        }
    }

    constraint
        .pattern
        .as_deref()
        .map(|pattern| {
            compile_pattern(pattern).map_err(|e| {
                config_error(format!("question '{id}' has an invalid pattern '{pattern}': {e}"))
            })
        })
        .transpose()
}

fn config_error(reason: String) -> TelespecError {
    TelespecError::ConfigError { reason }
}

impl QuestionCatalog for TomlQuestionCatalog {
    fn start(&self) -> &QuestionId {
        &self.start
    }

    fn question(&self, id: &QuestionId) -> TelespecResult<&Question> {
        self.questions
            .get(id)
            .ok_or_else(|| TelespecError::UnknownQuestion { question_id: id.0.clone() })
    }

    fn len(&self) -> usize {
        self.questions.len()
    }

    fn next_question(&self, current: &QuestionId, answers: &AnswerSet) -> TelespecResult<NextStep> {
        let step = resolve_next(self.question(current)?, answers);
        debug!(from = %current, next = ?step, "resolved next question");
        Ok(step)
    }

    fn longest_path_len(&self, from: &QuestionId, answers: &AnswerSet) -> TelespecResult<usize> {
        self.longest_from(from, answers, &mut HashMap::new())
    }

    fn pattern(&self, id: &QuestionId) -> Option<&Regex> {
        self.patterns.get(id)
    }
}
