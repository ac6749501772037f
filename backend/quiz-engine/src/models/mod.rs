use serde::{Deserialize, Serialize};

use crate::utils::text::answers_match;

pub mod attempt;
pub mod events;
pub mod exam;
pub mod results;
pub mod timer;

pub use attempt::{AttemptRecord, AttemptStatus};
pub use events::{AnswerEvent, LogEntry, SessionSummary, SessionSummaryEvent};
pub use exam::{ExamProgress, ExamQuestionView};
pub use results::{
    score_percentage, CompleteQuizResult, ExamResult, ModuleResult, ModuleStats, QuestionOutcome,
    QuizStats,
};
pub use timer::{TimeExpired, TimerEvent, TimerTick};

/// A validated multiple-choice question.
///
/// Records come from the question bank loader, which guarantees that
/// `options` has at least two trimmed entries and that `correct_option` is
/// one of them. The engines rely on that and do not validate again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub code: String,
    pub sequence_number: u32,
    pub text: String,
    pub options: Vec<String>,
    pub correct_option: String,
    pub source_module: String,
}

impl QuestionRecord {
    pub fn is_correct(&self, answer: &str) -> bool {
        answers_match(answer, &self.correct_option)
    }

    /// Checks the loader contract in debug builds only.
    pub(crate) fn debug_assert_well_formed(&self) {
        debug_assert!(
            self.options.len() >= 2,
            "question {} has fewer than two options",
            self.code
        );
        debug_assert!(
            self.options
                .iter()
                .any(|opt| opt.trim() == self.correct_option.trim()),
            "question {} has a correct option outside its options",
            self.code
        );
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizMode {
    SingleQuestion,
    Complete,
    Exam,
}

impl QuizMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuizMode::SingleQuestion => "single_question",
            QuizMode::Complete => "complete",
            QuizMode::Exam => "exam",
        }
    }
}

impl std::fmt::Display for QuizMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
