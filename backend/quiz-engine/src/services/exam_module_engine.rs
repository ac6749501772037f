use chrono::Utc;
use rand::Rng;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use crate::config::ModuleBudget;
use crate::error::{QuizError, QuizResult};
use crate::metrics::{record_answer_checked, record_module_finished};
use crate::models::{
    ExamQuestionView, ModuleResult, QuestionOutcome, QuestionRecord, QuizMode, TimeExpired,
    TimerEvent, TimerTick,
};
use crate::utils::clock::{Clock, SystemClock};
use crate::utils::sampling::sample_indices;
use crate::utils::text::{answers_match, NO_ANSWER};

/// One timed subject of an exam simulation.
///
/// Holds a random sample of the subject's pool sized by its [`ModuleBudget`].
/// Answers are keyed by question code; the navigation index only decides
/// which question is on screen.
///
/// The timer is advisory. Nothing happens when it runs out: the caller polls
/// [`is_time_expired`](Self::is_time_expired) and calls
/// [`finish_module`](Self::finish_module) itself.
pub struct ExamModuleEngine {
    module_name: String,
    budget: ModuleBudget,
    questions: Vec<QuestionRecord>,
    answers: HashMap<String, String>,
    started_at: Option<Instant>,
    finished_at: Option<Instant>,
    current_index: usize,
    clock: Arc<dyn Clock>,
    metrics_recorded: bool,
}

impl ExamModuleEngine {
    pub fn new(
        module_name: impl Into<String>,
        pool: &[QuestionRecord],
        budget: ModuleBudget,
    ) -> QuizResult<Self> {
        Self::with_parts(
            module_name,
            pool,
            budget,
            Arc::new(SystemClock),
            &mut rand::rng(),
        )
    }

    pub fn with_parts<R: Rng + ?Sized>(
        module_name: impl Into<String>,
        pool: &[QuestionRecord],
        budget: ModuleBudget,
        clock: Arc<dyn Clock>,
        rng: &mut R,
    ) -> QuizResult<Self> {
        let module_name = module_name.into();

        if pool.len() < budget.question_count {
            return Err(QuizError::InsufficientQuestions {
                module: module_name,
                required: budget.question_count,
                available: pool.len(),
            });
        }

        let questions: Vec<QuestionRecord> = sample_indices(rng, pool.len(), budget.question_count)
            .into_iter()
            .map(|index| pool[index].clone())
            .collect();
        questions.iter().for_each(QuestionRecord::debug_assert_well_formed);

        tracing::info!(
            "Exam module {} prepared: {} of {} questions, {} minutes",
            module_name,
            questions.len(),
            pool.len(),
            budget.time_limit_minutes
        );

        Ok(Self {
            module_name,
            budget,
            questions,
            answers: HashMap::new(),
            started_at: None,
            finished_at: None,
            current_index: 0,
            clock,
            metrics_recorded: false,
        })
    }

    pub fn module_name(&self) -> &str {
        &self.module_name
    }

    pub fn budget(&self) -> ModuleBudget {
        self.budget
    }

    pub fn questions(&self) -> &[QuestionRecord] {
        &self.questions
    }

    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    /// Starts (or restarts) the countdown. A previous finish is forgotten.
    pub fn start_timer(&mut self) {
        self.started_at = Some(self.clock.now());
        self.finished_at = None;
        tracing::info!("Exam module {} started", self.module_name);
    }

    pub fn is_started(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn is_finished(&self) -> bool {
        self.finished_at.is_some()
    }

    pub fn elapsed_seconds(&self) -> u64 {
        let Some(started_at) = self.started_at else {
            return 0;
        };
        let until = self.finished_at.unwrap_or_else(|| self.clock.now());
        until.saturating_duration_since(started_at).as_secs()
    }

    pub fn remaining_seconds(&self) -> u64 {
        self.budget
            .time_limit_seconds()
            .saturating_sub(self.elapsed_seconds())
    }

    pub fn is_time_expired(&self) -> bool {
        self.remaining_seconds() == 0
    }

    pub fn timer_event(&self) -> TimerEvent {
        let elapsed_seconds = self.elapsed_seconds();
        if self.is_time_expired() {
            TimerEvent::TimeExpired(TimeExpired {
                module_name: self.module_name.clone(),
                elapsed_seconds,
                timestamp: Utc::now(),
                message: format!("Time is up for module {}", self.module_name),
            })
        } else {
            TimerEvent::TimerTick(TimerTick {
                module_name: self.module_name.clone(),
                remaining_seconds: self.remaining_seconds(),
                elapsed_seconds,
                total_seconds: self.budget.time_limit_seconds(),
                timestamp: Utc::now(),
            })
        }
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_question(&self) -> Option<ExamQuestionView<'_>> {
        self.questions
            .get(self.current_index)
            .map(|question| ExamQuestionView {
                question,
                index: self.current_index,
                position: self.current_index + 1,
                total: self.questions.len(),
            })
    }

    pub fn save_current_answer(&mut self, answer: impl Into<String>) {
        if let Some(question) = self.questions.get(self.current_index) {
            self.answers.insert(question.code.clone(), answer.into());
        }
    }

    pub fn next_question(&mut self) -> bool {
        if self.current_index + 1 < self.questions.len() {
            self.current_index += 1;
            true
        } else {
            false
        }
    }

    pub fn previous_question(&mut self) -> bool {
        if self.current_index > 0 {
            self.current_index -= 1;
            true
        } else {
            false
        }
    }

    /// Jumps to `index`. Out-of-range indices are ignored.
    pub fn go_to_question(&mut self, index: usize) {
        if index < self.questions.len() {
            self.current_index = index;
        }
    }

    pub fn get_saved_answer(&self, index: usize) -> Option<&str> {
        self.questions
            .get(index)
            .and_then(|question| self.answers.get(&question.code))
            .map(String::as_str)
    }

    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    /// Per-question scoring in sample order. Blank or missing answers are wrong.
    pub fn question_outcomes(&self) -> Vec<QuestionOutcome> {
        self.questions
            .iter()
            .map(|question| {
                let saved = self
                    .answers
                    .get(&question.code)
                    .map(String::as_str)
                    .filter(|answer| !answer.trim().is_empty());

                QuestionOutcome {
                    question_code: question.code.clone(),
                    question_text: question.text.clone(),
                    given_answer: saved.unwrap_or(NO_ANSWER).to_string(),
                    correct_answer: question.correct_option.clone(),
                    is_correct: saved
                        .map(|answer| answers_match(answer, &question.correct_option))
                        .unwrap_or(false),
                }
            })
            .collect()
    }

    /// Freezes the clock on the first call and scores the module. Later calls
    /// reuse the same end instant, so the reported time does not drift.
    ///
    /// Metrics are counted once per module, even across timer restarts.
    pub fn finish_module(&mut self) -> ModuleResult {
        let first_finish = self.finished_at.is_none();
        if first_finish {
            self.finished_at = Some(self.clock.now());
        }

        let outcomes = self.question_outcomes();
        let correct = outcomes.iter().filter(|o| o.is_correct).count();
        let time_spent_seconds = self.elapsed_seconds();

        if !self.metrics_recorded {
            self.metrics_recorded = true;
            for outcome in &outcomes {
                record_answer_checked(QuizMode::Exam.as_str(), outcome.is_correct);
            }
            record_module_finished(time_spent_seconds >= self.budget.time_limit_seconds());
        }
        if first_finish {
            tracing::info!(
                "Exam module {} finished: {}/{} correct in {}s",
                self.module_name,
                correct,
                self.questions.len(),
                time_spent_seconds
            );
        }

        ModuleResult::completed(
            self.module_name.clone(),
            self.questions.len(),
            correct,
            time_spent_seconds,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::clock::ManualClock;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn pool(size: usize) -> Vec<QuestionRecord> {
        (0..size)
            .map(|i| QuestionRecord {
                code: format!("C{:03}", i),
                sequence_number: i as u32 + 1,
                text: format!("Question {}", i),
                options: vec!["Yes".to_string(), "No".to_string()],
                correct_option: "Yes".to_string(),
                source_module: "ptda".to_string(),
            })
            .collect()
    }

    fn module(pool_size: usize, budget: ModuleBudget) -> (ExamModuleEngine, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let engine = ExamModuleEngine::with_parts(
            "Ptda",
            &pool(pool_size),
            budget,
            clock.clone(),
            &mut StdRng::seed_from_u64(17),
        )
        .unwrap();
        (engine, clock)
    }

    #[test]
    fn small_pool_is_rejected() {
        let err = ExamModuleEngine::new("Ptda", &pool(10), ModuleBudget::new(15, 15))
            .err()
            .unwrap();
        assert_eq!(
            err,
            QuizError::InsufficientQuestions {
                module: "Ptda".to_string(),
                required: 15,
                available: 10,
            }
        );
    }

    #[test]
    fn sample_has_required_size_without_duplicates() {
        let (engine, _) = module(40, ModuleBudget::new(30, 30));
        assert_eq!(engine.total_questions(), 30);
        let codes: HashSet<_> = engine.questions().iter().map(|q| &q.code).collect();
        assert_eq!(codes.len(), 30);
    }

    #[test]
    fn timer_reads_zero_before_start() {
        let (engine, clock) = module(15, ModuleBudget::new(15, 15));
        clock.advance_secs(100);
        assert_eq!(engine.elapsed_seconds(), 0);
        assert_eq!(engine.remaining_seconds(), 900);
        assert!(!engine.is_time_expired());
    }

    #[test]
    fn expired_module_still_finishes_with_real_elapsed_time() {
        let (mut engine, clock) = module(15, ModuleBudget::new(15, 15));
        engine.start_timer();
        clock.advance_secs(1000);

        assert_eq!(engine.remaining_seconds(), 0);
        assert!(engine.is_time_expired());
        assert!(engine.timer_event().is_expired());

        let result = engine.finish_module();
        assert_eq!(result.time_spent_seconds, 1000);
        assert!(result.completed);
    }

    #[test]
    fn finishing_twice_keeps_the_first_end_time() {
        let (mut engine, clock) = module(15, ModuleBudget::new(15, 15));
        engine.start_timer();
        clock.advance_secs(120);
        let first = engine.finish_module();

        clock.advance_secs(300);
        let second = engine.finish_module();
        assert_eq!(first, second);
        assert_eq!(engine.elapsed_seconds(), 120);
    }

    #[test]
    fn restart_clears_the_end_time() {
        let (mut engine, clock) = module(15, ModuleBudget::new(15, 15));
        engine.start_timer();
        clock.advance_secs(60);
        engine.finish_module();

        engine.start_timer();
        assert!(!engine.is_finished());
        clock.advance_secs(5);
        assert_eq!(engine.elapsed_seconds(), 5);
    }

    #[test]
    fn restarted_module_is_counted_in_metrics_once() {
        let (mut engine, clock) = module(15, ModuleBudget::new(15, 15));
        engine.start_timer();
        clock.advance_secs(60);
        engine.finish_module();
        assert!(engine.metrics_recorded);

        engine.start_timer();
        assert!(engine.metrics_recorded);
        clock.advance_secs(30);
        let result = engine.finish_module();
        assert_eq!(result.time_spent_seconds, 30);
        assert!(engine.metrics_recorded);
    }

    #[test]
    fn navigation_is_bounded() {
        let (mut engine, _) = module(3, ModuleBudget::new(3, 5));
        assert!(!engine.previous_question());
        assert!(engine.next_question());
        assert!(engine.next_question());
        assert!(!engine.next_question());
        assert_eq!(engine.current_index(), 2);

        engine.go_to_question(7);
        assert_eq!(engine.current_index(), 2);
        engine.go_to_question(0);
        assert_eq!(engine.current_index(), 0);

        let view = engine.current_question().unwrap();
        assert_eq!(view.position, 1);
        assert_eq!(view.total, 3);
    }

    #[test]
    fn answers_follow_question_codes_across_navigation() {
        let (mut engine, _) = module(5, ModuleBudget::new(5, 5));
        engine.go_to_question(3);
        engine.save_current_answer("yes");
        engine.go_to_question(1);
        engine.save_current_answer("No");
        engine.go_to_question(3);

        assert_eq!(engine.get_saved_answer(3), Some("yes"));
        assert_eq!(engine.get_saved_answer(1), Some("No"));
        assert_eq!(engine.get_saved_answer(0), None);
        assert_eq!(engine.get_saved_answer(99), None);

        let result = engine.finish_module();
        assert_eq!(result.correct_answers, 1);
        assert_eq!(result.total_questions, 5);
        assert!((result.score_percentage - 20.0).abs() < 1e-9);
    }

    #[test]
    fn empty_module_scores_zero() {
        let (mut engine, _) = module(0, ModuleBudget::new(0, 5));
        assert!(engine.current_question().is_none());
        engine.save_current_answer("ignored");
        assert_eq!(engine.answered_count(), 0);
        assert_eq!(engine.finish_module().score_percentage, 0.0);
    }
}
