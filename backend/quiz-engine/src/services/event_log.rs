use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::models::{score_percentage, AnswerEvent, LogEntry, SessionSummaryEvent};
use crate::utils::text::NO_ANSWER;

/// Destination for the answer and session events derived from quiz results.
#[async_trait]
pub trait EventLog: Send + Sync {
    async fn record_answer(&self, event: AnswerEvent) -> Result<()>;

    async fn record_summary(&self, event: SessionSummaryEvent) -> Result<()>;
}

/// `20251223103000_1a2b3c`: sortable by start time, unique per session.
pub fn new_session_id() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}_{}", Utc::now().format("%Y%m%d%H%M%S"), &suffix[..6])
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerLogStats {
    pub total_attempts: usize,
    pub correct_attempts: usize,
    pub correct_rate: f64,
    pub unique_users: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserModuleStats {
    pub total_questions: usize,
    pub correct_answers: usize,
    pub correct_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserLogStats {
    /// Answers actually given; blanks are left out.
    pub total_questions_answered: usize,
    pub correct_answers: usize,
    pub correct_rate: f64,
    pub modules_practiced: Vec<String>,
    pub modules_stats: BTreeMap<String, UserModuleStats>,
}

fn answer_stats<'a>(answers: impl Iterator<Item = &'a AnswerEvent>) -> AnswerLogStats {
    let mut total_attempts = 0;
    let mut correct_attempts = 0;
    let mut users = HashSet::new();

    for answer in answers {
        total_attempts += 1;
        if answer.is_correct {
            correct_attempts += 1;
        }
        users.insert(answer.username.as_str());
    }

    AnswerLogStats {
        total_attempts,
        correct_attempts,
        correct_rate: score_percentage(correct_attempts, total_attempts),
        unique_users: users.len(),
    }
}

pub fn question_stats(
    entries: &[LogEntry],
    module_name: &str,
    question_code: &str,
) -> AnswerLogStats {
    answer_stats(
        entries
            .iter()
            .filter_map(LogEntry::as_answer)
            .filter(|a| a.module_name == module_name && a.question_code == question_code),
    )
}

pub fn module_stats(entries: &[LogEntry], module_name: &str) -> AnswerLogStats {
    answer_stats(
        entries
            .iter()
            .filter_map(LogEntry::as_answer)
            .filter(|a| a.module_name == module_name),
    )
}

pub fn user_stats(entries: &[LogEntry], username: &str) -> UserLogStats {
    let answers: Vec<&AnswerEvent> = entries
        .iter()
        .filter_map(LogEntry::as_answer)
        .filter(|a| a.username == username)
        .collect();

    let modules: BTreeSet<&str> = answers
        .iter()
        .map(|a| a.module_name.as_str())
        .filter(|m| !m.is_empty())
        .collect();

    let modules_stats = modules
        .iter()
        .map(|&module| {
            let in_module = answers.iter().filter(|a| a.module_name == module);
            let total_questions = in_module
                .clone()
                .filter(|a| a.user_answer != NO_ANSWER)
                .count();
            let correct_answers = in_module.filter(|a| a.is_correct).count();
            (
                module.to_string(),
                UserModuleStats {
                    total_questions,
                    correct_answers,
                    correct_rate: score_percentage(correct_answers, total_questions),
                },
            )
        })
        .collect();

    let total_questions_answered = answers.iter().filter(|a| a.user_answer != NO_ANSWER).count();
    let correct_answers = answers.iter().filter(|a| a.is_correct).count();

    UserLogStats {
        total_questions_answered,
        correct_answers,
        correct_rate: score_percentage(correct_answers, total_questions_answered),
        modules_practiced: modules.into_iter().map(str::to_string).collect(),
        modules_stats,
    }
}

/// Event log persisted as one JSON array on disk.
///
/// Every write rewrites the whole file; the mutex keeps concurrent sessions
/// in the same process from interleaving read-modify-write cycles.
pub struct JsonFileLog {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileLog {
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let log = Self {
            path: path.into(),
            lock: Mutex::new(()),
        };

        if !tokio::fs::try_exists(&log.path)
            .await
            .with_context(|| format!("Failed to inspect log file {}", log.path.display()))?
        {
            log.save_entries(&[]).await?;
            tracing::info!("Created event log at {}", log.path.display());
        }
        Ok(log)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn entries(&self) -> Result<Vec<LogEntry>> {
        let _guard = self.lock.lock().await;
        self.load_entries().await
    }

    pub async fn user_history(&self, username: &str) -> Result<Vec<LogEntry>> {
        Ok(self
            .entries()
            .await?
            .into_iter()
            .filter(|entry| entry.username() == username)
            .collect())
    }

    pub async fn question_stats(
        &self,
        module_name: &str,
        question_code: &str,
    ) -> Result<AnswerLogStats> {
        Ok(question_stats(&self.entries().await?, module_name, question_code))
    }

    pub async fn module_stats(&self, module_name: &str) -> Result<AnswerLogStats> {
        Ok(module_stats(&self.entries().await?, module_name))
    }

    pub async fn user_stats(&self, username: &str) -> Result<UserLogStats> {
        Ok(user_stats(&self.entries().await?, username))
    }

    async fn append(&self, entry: LogEntry) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut entries = self.load_entries().await?;
        entries.push(entry);
        self.save_entries(&entries).await
    }

    async fn load_entries(&self) -> Result<Vec<LogEntry>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read log file {}", self.path.display()))
            }
        };

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse log file {}", self.path.display()))
    }

    async fn save_entries(&self, entries: &[LogEntry]) -> Result<()> {
        let json = serde_json::to_string_pretty(entries).context("Failed to serialize log entries")?;
        tokio::fs::write(&self.path, json)
            .await
            .with_context(|| format!("Failed to write log file {}", self.path.display()))
    }
}

#[async_trait]
impl EventLog for JsonFileLog {
    async fn record_answer(&self, event: AnswerEvent) -> Result<()> {
        tracing::debug!(
            "Logging answer: user={}, mode={}, question={}, correct={}",
            event.username,
            event.quiz_mode,
            event.question_code,
            event.is_correct
        );
        self.append(LogEntry::Answer(event)).await
    }

    async fn record_summary(&self, event: SessionSummaryEvent) -> Result<()> {
        tracing::info!(
            "Logging session summary: user={}, mode={}, session={}",
            event.username,
            event.quiz_mode,
            event.session_id
        );
        self.append(LogEntry::SessionSummary(event)).await
    }
}

/// In-process event log, for tests and embedders that forward events
/// elsewhere.
#[derive(Default)]
pub struct MemoryLog {
    entries: std::sync::Mutex<Vec<LogEntry>>,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    pub fn answers(&self) -> Vec<AnswerEvent> {
        self.entries()
            .into_iter()
            .filter_map(|entry| match entry {
                LogEntry::Answer(event) => Some(event),
                LogEntry::SessionSummary(_) => None,
            })
            .collect()
    }

    pub fn summaries(&self) -> Vec<SessionSummaryEvent> {
        self.entries()
            .into_iter()
            .filter_map(|entry| match entry {
                LogEntry::SessionSummary(event) => Some(event),
                LogEntry::Answer(_) => None,
            })
            .collect()
    }

    fn push(&self, entry: LogEntry) -> Result<()> {
        self.entries
            .lock()
            .map_err(|_| anyhow::anyhow!("Memory log mutex poisoned"))?
            .push(entry);
        Ok(())
    }
}

#[async_trait]
impl EventLog for MemoryLog {
    async fn record_answer(&self, event: AnswerEvent) -> Result<()> {
        self.push(LogEntry::Answer(event))
    }

    async fn record_summary(&self, event: SessionSummaryEvent) -> Result<()> {
        self.push(LogEntry::SessionSummary(event))
    }
}
