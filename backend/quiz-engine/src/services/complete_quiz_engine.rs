use std::collections::HashMap;

use crate::error::{QuizError, QuizResult};
use crate::metrics::record_session_started;
use crate::models::{score_percentage, CompleteQuizResult, QuestionOutcome, QuestionRecord, QuizMode};
use crate::utils::text::{answers_match, NO_ANSWER};

/// Whole-quiz form: questions keep the order they were given in, answers are
/// collected by question code and scored together by [`evaluate`](Self::evaluate).
pub struct CompleteQuizEngine {
    questions: Vec<QuestionRecord>,
    answers: HashMap<String, String>,
}

impl CompleteQuizEngine {
    pub fn new(questions: Vec<QuestionRecord>) -> QuizResult<Self> {
        if questions.is_empty() {
            return Err(QuizError::EmptyQuestionList);
        }
        questions.iter().for_each(QuestionRecord::debug_assert_well_formed);

        record_session_started(QuizMode::Complete.as_str());
        tracing::info!("Complete quiz created with {} questions", questions.len());

        Ok(Self {
            questions,
            answers: HashMap::new(),
        })
    }

    pub fn questions(&self) -> &[QuestionRecord] {
        &self.questions
    }

    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    /// Stores (or replaces) the answer for a question code. Anything is
    /// accepted here; bad answers simply score as wrong.
    pub fn save_answer(&mut self, code: impl Into<String>, answer: impl Into<String>) {
        self.answers.insert(code.into(), answer.into());
    }

    pub fn get_saved_answer(&self, code: &str) -> Option<&str> {
        self.answers.get(code).map(String::as_str)
    }

    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    /// True when as many answers were saved as there are questions. This is a
    /// count check: an empty answer still counts as saved.
    pub fn is_complete(&self) -> bool {
        self.answers.len() == self.questions.len()
    }

    /// Scores every question in order. Pure: repeated calls return the same
    /// result until another answer is saved.
    pub fn evaluate(&self) -> CompleteQuizResult {
        let question_results: Vec<QuestionOutcome> = self
            .questions
            .iter()
            .map(|question| {
                let saved = self
                    .answers
                    .get(&question.code)
                    .map(String::as_str)
                    .filter(|answer| !answer.trim().is_empty());

                let is_correct = saved
                    .map(|answer| answers_match(answer, &question.correct_option))
                    .unwrap_or(false);

                QuestionOutcome {
                    question_code: question.code.clone(),
                    question_text: question.text.clone(),
                    given_answer: saved.unwrap_or(NO_ANSWER).to_string(),
                    correct_answer: question.correct_option.clone(),
                    is_correct,
                }
            })
            .collect();

        let total_questions = self.questions.len();
        let correct_answers = question_results.iter().filter(|r| r.is_correct).count();

        tracing::debug!(
            "Complete quiz evaluated: {}/{} correct",
            correct_answers,
            total_questions
        );

        CompleteQuizResult {
            total_questions,
            correct_answers,
            wrong_answers: total_questions - correct_answers,
            score_percentage: score_percentage(correct_answers, total_questions),
            question_results,
        }
    }

    /// Drops every saved answer. Question order is kept.
    pub fn reset(&mut self) {
        self.answers.clear();
        tracing::info!("Complete quiz answers cleared");
    }
}
