//! Records handed to an event log. The engines never build these themselves;
//! the session layer derives them from engine results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::QuizMode;

/// One scored answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerEvent {
    pub timestamp: DateTime<Utc>,
    pub username: String,
    pub quiz_mode: QuizMode,
    pub module_name: String,
    pub question_code: String,
    pub user_answer: String,
    pub correct_answer: String,
    pub is_correct: bool,
    pub attempt_number: u32,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub total_questions: usize,
    pub correct_answers: usize,
    pub score_percentage: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_spent_seconds: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummaryEvent {
    pub timestamp: DateTime<Utc>,
    pub username: String,
    pub quiz_mode: QuizMode,
    pub session_id: String,
    pub summary: SessionSummary,
}

/// Row of the persisted event log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LogEntry {
    Answer(AnswerEvent),
    SessionSummary(SessionSummaryEvent),
}

impl LogEntry {
    pub fn username(&self) -> &str {
        match self {
            LogEntry::Answer(event) => &event.username,
            LogEntry::SessionSummary(event) => &event.username,
        }
    }

    pub fn as_answer(&self) -> Option<&AnswerEvent> {
        match self {
            LogEntry::Answer(event) => Some(event),
            LogEntry::SessionSummary(_) => None,
        }
    }
}
