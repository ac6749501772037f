use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::utils::text::NO_ANSWER;

/// `correct / total * 100`, or 0 for an empty denominator.
pub fn score_percentage(correct: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        correct as f64 / total as f64 * 100.0
    }
}

/// Single-question statistics for one source module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleStats {
    pub module_name: String,
    pub total_attempted: usize,
    pub correct_first_try: usize,
    /// Correct after two or more attempts.
    pub correct_multiple_tries: usize,
    pub skipped: usize,
    pub shown: usize,
}

impl ModuleStats {
    pub fn new(module_name: impl Into<String>) -> Self {
        Self {
            module_name: module_name.into(),
            ..Default::default()
        }
    }

    pub fn total_correct(&self) -> usize {
        self.correct_first_try + self.correct_multiple_tries
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizStats {
    pub total_questions: usize,
    pub modules: BTreeMap<String, ModuleStats>,
}

impl QuizStats {
    pub fn total_attempted(&self) -> usize {
        self.modules.values().map(|m| m.total_attempted).sum()
    }

    pub fn total_correct(&self) -> usize {
        self.modules.values().map(ModuleStats::total_correct).sum()
    }
}

/// Evaluation of a single question in complete-quiz mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionOutcome {
    pub question_code: String,
    pub question_text: String,
    /// The saved answer, or [`NO_ANSWER`] when nothing usable was saved.
    pub given_answer: String,
    pub correct_answer: String,
    pub is_correct: bool,
}

impl QuestionOutcome {
    pub fn is_unanswered(&self) -> bool {
        self.given_answer == NO_ANSWER
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompleteQuizResult {
    pub total_questions: usize,
    pub correct_answers: usize,
    pub wrong_answers: usize,
    pub score_percentage: f64,
    pub question_results: Vec<QuestionOutcome>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleResult {
    pub module_name: String,
    pub total_questions: usize,
    pub correct_answers: usize,
    pub score_percentage: f64,
    pub time_spent_seconds: u64,
    pub completed: bool,
}

impl ModuleResult {
    pub fn completed(
        module_name: impl Into<String>,
        total_questions: usize,
        correct_answers: usize,
        time_spent_seconds: u64,
    ) -> Self {
        Self {
            module_name: module_name.into(),
            total_questions,
            correct_answers,
            score_percentage: score_percentage(correct_answers, total_questions),
            time_spent_seconds,
            completed: true,
        }
    }
}

/// Aggregate over every finished exam module.
///
/// The overall percentage is derived from the summed counts, so a short
/// module weighs exactly as much as its question count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamResult {
    pub module_results: Vec<ModuleResult>,
    pub total_correct: usize,
    pub total_questions: usize,
    pub total_score_percentage: f64,
    pub total_time_spent_seconds: u64,
}

impl ExamResult {
    pub fn from_modules(module_results: Vec<ModuleResult>) -> Self {
        let total_correct = module_results.iter().map(|r| r.correct_answers).sum();
        let total_questions = module_results.iter().map(|r| r.total_questions).sum();
        let total_time_spent_seconds = module_results.iter().map(|r| r.time_spent_seconds).sum();

        Self {
            module_results,
            total_correct,
            total_questions,
            total_score_percentage: score_percentage(total_correct, total_questions),
            total_time_spent_seconds,
        }
    }
}
