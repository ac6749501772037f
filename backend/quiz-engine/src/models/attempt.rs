use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptStatus {
    NotAnswered,
    Correct,
    Skipped,
    Shown,
}

impl AttemptStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, AttemptStatus::NotAnswered)
    }
}

/// Per-question tracking in single-question mode.
///
/// Status only moves forward: once `Correct`, `Skipped` or `Shown` it stays
/// there for the rest of the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub question_code: String,
    pub attempt_count: u32,
    pub status: AttemptStatus,
    pub correct_at_attempt: Option<u32>,
}

impl AttemptRecord {
    pub fn new(question_code: impl Into<String>) -> Self {
        Self {
            question_code: question_code.into(),
            attempt_count: 0,
            status: AttemptStatus::NotAnswered,
            correct_at_attempt: None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status.is_terminal()
    }

    /// Counts one submitted check. Returns the attempt number just used.
    pub fn record_check(&mut self, is_correct: bool) -> u32 {
        self.attempt_count += 1;
        if is_correct && !self.is_completed() {
            self.status = AttemptStatus::Correct;
            self.correct_at_attempt = Some(self.attempt_count);
        }
        self.attempt_count
    }

    pub fn mark_skipped(&mut self) {
        if !self.is_completed() {
            self.status = AttemptStatus::Skipped;
        }
    }

    pub fn mark_shown(&mut self) {
        if !self.is_completed() {
            self.status = AttemptStatus::Shown;
        }
    }
}
