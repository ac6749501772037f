use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::{BTreeMap, HashMap, VecDeque};

use crate::error::{QuizError, QuizResult};
use crate::metrics::{record_answer_checked, record_question_served, record_session_started};
use crate::models::{AttemptRecord, AttemptStatus, ModuleStats, QuestionRecord, QuizMode, QuizStats};
use crate::utils::sampling::shuffled_indices;

/// Outcome of one `check_answer` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerCheck {
    pub is_correct: bool,
    pub correct_option: String,
    pub attempt_number: u32,
}

/// Question-by-question drill over a shuffled pool.
///
/// Every question is served exactly once per session: the pool is shuffled
/// at construction (and on [`reset`](Self::reset)) and then consumed from the
/// front. A served question stays current until the next call to
/// [`next_question`](Self::next_question), so the caller decides when to
/// move on after a correct answer, a skip or a reveal.
pub struct SingleQuestionEngine {
    questions: Vec<QuestionRecord>,
    remaining: VecDeque<usize>,
    attempts: HashMap<usize, AttemptRecord>,
    current: Option<usize>,
    rng: StdRng,
}

impl SingleQuestionEngine {
    pub fn new(questions: Vec<QuestionRecord>) -> QuizResult<Self> {
        Self::with_rng(questions, StdRng::from_rng(&mut rand::rng()))
    }

    pub fn with_seed(questions: Vec<QuestionRecord>, seed: u64) -> QuizResult<Self> {
        Self::with_rng(questions, StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(questions: Vec<QuestionRecord>, mut rng: StdRng) -> QuizResult<Self> {
        if questions.is_empty() {
            return Err(QuizError::EmptyQuestionList);
        }
        questions.iter().for_each(QuestionRecord::debug_assert_well_formed);

        let remaining = shuffled_indices(&mut rng, questions.len()).into();

        record_session_started(QuizMode::SingleQuestion.as_str());
        tracing::info!(
            "Single-question quiz created with {} questions",
            questions.len()
        );

        Ok(Self {
            questions,
            remaining,
            attempts: HashMap::new(),
            current: None,
            rng,
        })
    }

    /// Serves the next question of the shuffled pool, or `None` once every
    /// question has been served.
    pub fn next_question(&mut self) -> Option<&QuestionRecord> {
        let Some(index) = self.remaining.pop_front() else {
            self.current = None;
            tracing::debug!("Single-question quiz exhausted");
            return None;
        };

        let question = &self.questions[index];
        self.attempts
            .entry(index)
            .or_insert_with(|| AttemptRecord::new(question.code.clone()));
        self.current = Some(index);

        record_question_served(QuizMode::SingleQuestion.as_str());
        tracing::debug!(
            "Serving question {} ({} left)",
            question.code,
            self.remaining.len()
        );

        Some(question)
    }

    pub fn check_answer(&mut self, answer: &str) -> QuizResult<AnswerCheck> {
        let index = self.current.ok_or(QuizError::NoActiveQuestion)?;
        let question = &self.questions[index];
        let is_correct = question.is_correct(answer);

        let attempt = self
            .attempts
            .get_mut(&index)
            .ok_or(QuizError::NoActiveQuestion)?;
        let attempt_number = attempt.record_check(is_correct);

        record_answer_checked(QuizMode::SingleQuestion.as_str(), is_correct);
        tracing::debug!(
            "Checked answer for {}: correct={}, attempt={}",
            question.code,
            is_correct,
            attempt_number
        );

        Ok(AnswerCheck {
            is_correct,
            correct_option: question.correct_option.clone(),
            attempt_number,
        })
    }

    pub fn skip_question(&mut self) -> QuizResult<()> {
        self.current_attempt_mut()?.mark_skipped();
        Ok(())
    }

    /// Reveals the correct option. Not counted as an attempt.
    pub fn show_answer(&mut self) -> QuizResult<&str> {
        let index = self.current.ok_or(QuizError::NoActiveQuestion)?;
        self.current_attempt_mut()?.mark_shown();
        Ok(&self.questions[index].correct_option)
    }

    pub fn is_current_question_completed(&self) -> bool {
        self.current_attempt()
            .map(AttemptRecord::is_completed)
            .unwrap_or(false)
    }

    pub fn remaining_count(&self) -> usize {
        self.remaining.len()
    }

    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    pub fn current_question(&self) -> Option<&QuestionRecord> {
        self.current.map(|index| &self.questions[index])
    }

    /// Position of the current question in the original list.
    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current_attempt(&self) -> Option<&AttemptRecord> {
        self.current.and_then(|index| self.attempts.get(&index))
    }

    /// Starts over: reshuffles the whole pool and forgets every attempt.
    pub fn reset(&mut self) {
        self.remaining = shuffled_indices(&mut self.rng, self.questions.len()).into();
        self.attempts.clear();
        self.current = None;

        record_session_started(QuizMode::SingleQuestion.as_str());
        tracing::info!("Single-question quiz reset");
    }

    /// Groups resolved questions by source module. Questions never served,
    /// or served but left unresolved, are not counted.
    pub fn compute_stats(&self) -> QuizStats {
        let mut modules: BTreeMap<String, ModuleStats> = BTreeMap::new();

        for (&index, attempt) in &self.attempts {
            let module_name = &self.questions[index].source_module;
            let stats = modules
                .entry(module_name.clone())
                .or_insert_with(|| ModuleStats::new(module_name.clone()));

            match attempt.status {
                AttemptStatus::Correct => {
                    if attempt.correct_at_attempt == Some(1) {
                        stats.correct_first_try += 1;
                    } else {
                        stats.correct_multiple_tries += 1;
                    }
                }
                AttemptStatus::Skipped => stats.skipped += 1,
                AttemptStatus::Shown => stats.shown += 1,
                AttemptStatus::NotAnswered => continue,
            }
            stats.total_attempted += 1;
        }

        // served-but-unresolved questions may have created empty entries
        modules.retain(|_, stats| stats.total_attempted > 0);

        QuizStats {
            total_questions: self.questions.len(),
            modules,
        }
    }

    fn current_attempt_mut(&mut self) -> QuizResult<&mut AttemptRecord> {
        let index = self.current.ok_or(QuizError::NoActiveQuestion)?;
        self.attempts
            .get_mut(&index)
            .ok_or(QuizError::NoActiveQuestion)
    }
}
