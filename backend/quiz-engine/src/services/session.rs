use anyhow::{Context, Result};
use chrono::Utc;

use crate::models::{
    AnswerEvent, CompleteQuizResult, ExamResult, ModuleResult, QuestionOutcome, QuestionRecord,
    QuizMode, SessionSummary, SessionSummaryEvent,
};
use crate::services::complete_quiz_engine::CompleteQuizEngine;
use crate::services::event_log::{new_session_id, EventLog};
use crate::services::exam_engine::ExamEngine;
use crate::services::single_question_engine::{AnswerCheck, SingleQuestionEngine};

/// The engine currently driving a session.
pub enum ActiveQuiz {
    SingleQuestion(SingleQuestionEngine),
    Complete {
        /// Display label only; log events use each question's bank module.
        module_name: String,
        engine: CompleteQuizEngine,
    },
    Exam(ExamEngine),
}

impl ActiveQuiz {
    pub fn mode(&self) -> QuizMode {
        match self {
            ActiveQuiz::SingleQuestion(_) => QuizMode::SingleQuestion,
            ActiveQuiz::Complete { .. } => QuizMode::Complete,
            ActiveQuiz::Exam(_) => QuizMode::Exam,
        }
    }
}

/// One user's pass through one quiz mode.
///
/// Owns the engine and knows who is playing, so it can turn engine results
/// into log events. The engines themselves know nothing about users or logs.
pub struct QuizSession {
    username: String,
    session_id: String,
    quiz: ActiveQuiz,
}

impl QuizSession {
    pub fn new(username: impl Into<String>, quiz: ActiveQuiz) -> Self {
        let session = Self {
            username: username.into(),
            session_id: new_session_id(),
            quiz,
        };
        tracing::info!(
            "Quiz session {} started: user={}, mode={}",
            session.session_id,
            session.username,
            session.mode()
        );
        session
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn mode(&self) -> QuizMode {
        self.quiz.mode()
    }

    pub fn quiz(&self) -> &ActiveQuiz {
        &self.quiz
    }

    pub fn quiz_mut(&mut self) -> &mut ActiveQuiz {
        &mut self.quiz
    }

    pub fn single_question_mut(&mut self) -> Result<&mut SingleQuestionEngine> {
        match &mut self.quiz {
            ActiveQuiz::SingleQuestion(engine) => Ok(engine),
            other => anyhow::bail!("Session is in {} mode, not single_question", other.mode()),
        }
    }

    pub fn complete_mut(&mut self) -> Result<&mut CompleteQuizEngine> {
        match &mut self.quiz {
            ActiveQuiz::Complete { engine, .. } => Ok(engine),
            other => anyhow::bail!("Session is in {} mode, not complete", other.mode()),
        }
    }

    pub fn exam_mut(&mut self) -> Result<&mut ExamEngine> {
        match &mut self.quiz {
            ActiveQuiz::Exam(engine) => Ok(engine),
            other => anyhow::bail!("Session is in {} mode, not exam", other.mode()),
        }
    }

    fn answer_event(
        &self,
        module_name: &str,
        outcome: &QuestionOutcome,
        attempt_number: u32,
    ) -> AnswerEvent {
        AnswerEvent {
            timestamp: Utc::now(),
            username: self.username.clone(),
            quiz_mode: self.mode(),
            module_name: module_name.to_string(),
            question_code: outcome.question_code.clone(),
            user_answer: outcome.given_answer.clone(),
            correct_answer: outcome.correct_answer.clone(),
            is_correct: outcome.is_correct,
            attempt_number,
            session_id: Some(self.session_id.clone()),
        }
    }

    fn summary_event(&self, summary: SessionSummary) -> SessionSummaryEvent {
        SessionSummaryEvent {
            timestamp: Utc::now(),
            username: self.username.clone(),
            quiz_mode: self.mode(),
            session_id: self.session_id.clone(),
            summary,
        }
    }

    /// Checks an answer in single-question mode and logs the attempt.
    pub async fn check_answer(&mut self, answer: &str, log: &dyn EventLog) -> Result<AnswerCheck> {
        let engine = self.single_question_mut()?;
        let check = engine.check_answer(answer)?;
        let question = engine
            .current_question()
            .cloned()
            .context("Checked question is no longer current")?;

        let outcome = QuestionOutcome {
            question_code: question.code,
            question_text: question.text,
            given_answer: answer.to_string(),
            correct_answer: check.correct_option.clone(),
            is_correct: check.is_correct,
        };
        let event = self.answer_event(&question.source_module, &outcome, check.attempt_number);
        log.record_answer(event).await?;

        Ok(check)
    }

    /// Logs the single-question summary built from the per-module statistics.
    pub async fn finish_single_question(&mut self, log: &dyn EventLog) -> Result<SessionSummary> {
        let stats = self.single_question_mut()?.compute_stats();
        let summary = SessionSummary {
            total_questions: stats.total_attempted(),
            correct_answers: stats.total_correct(),
            score_percentage: crate::models::score_percentage(
                stats.total_correct(),
                stats.total_attempted(),
            ),
            time_spent_seconds: None,
        };
        log.record_summary(self.summary_event(summary.clone())).await?;
        Ok(summary)
    }

    /// Evaluates a complete quiz, logging one event per question and a summary.
    pub async fn submit_complete(&mut self, log: &dyn EventLog) -> Result<CompleteQuizResult> {
        let (result, source_modules) = match &self.quiz {
            ActiveQuiz::Complete {
                module_name,
                engine,
            } => {
                tracing::info!(
                    "Complete quiz {} submitted by {}",
                    module_name,
                    self.username
                );
                (engine.evaluate(), source_modules(engine.questions()))
            }
            other => anyhow::bail!("Session is in {} mode, not complete", other.mode()),
        };

        for (outcome, module) in result.question_results.iter().zip(&source_modules) {
            log.record_answer(self.answer_event(module, outcome, 1))
                .await?;
        }
        log.record_summary(self.summary_event(SessionSummary {
            total_questions: result.total_questions,
            correct_answers: result.correct_answers,
            score_percentage: result.score_percentage,
            time_spent_seconds: None,
        }))
        .await?;

        Ok(result)
    }

    /// Finishes the current exam module and logs its answers. A module that
    /// is already finished returns its result again without logging twice.
    pub async fn finish_exam_module(&mut self, log: &dyn EventLog) -> Result<ModuleResult> {
        let exam = self.exam_mut()?;
        let already_finished = exam
            .current_module()
            .is_some_and(|module| module.is_finished());
        let result = exam.finish_current_module()?;
        if already_finished {
            return Ok(result);
        }

        let (outcomes, modules) = exam
            .current_module()
            .map(|module| {
                (
                    module.question_outcomes(),
                    source_modules(module.questions()),
                )
            })
            .unwrap_or_default();

        for (outcome, module) in outcomes.iter().zip(&modules) {
            log.record_answer(self.answer_event(module, outcome, 1))
                .await?;
        }
        Ok(result)
    }

    /// Logs the aggregate exam result.
    pub async fn finish_exam(&mut self, log: &dyn EventLog) -> Result<ExamResult> {
        let result = self.exam_mut()?.final_results();
        log.record_summary(self.summary_event(SessionSummary {
            total_questions: result.total_questions,
            correct_answers: result.total_correct,
            score_percentage: result.total_score_percentage,
            time_spent_seconds: Some(result.total_time_spent_seconds),
        }))
        .await?;
        Ok(result)
    }
}

/// Events are keyed by the bank module of each question, whatever label the
/// caller shows for the quiz.
fn source_modules(questions: &[QuestionRecord]) -> Vec<String> {
    questions
        .iter()
        .map(|question| question.source_module.clone())
        .collect()
}
