use std::sync::Arc;

use crate::config::Config;
use crate::services::event_log::{EventLog, JsonFileLog};
use crate::services::question_bank::QuestionBank;

pub struct AppState {
    pub config: Config,
    pub bank: QuestionBank,
    pub log: Arc<dyn EventLog>,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        tracing::info!("Opening question bank at {}", config.quiz_folder.display());
        let bank = QuestionBank::new(&config.quiz_folder);

        let log = JsonFileLog::open(&config.log_file).await?;
        tracing::info!("Answer log ready at {}", log.path().display());

        Ok(Self {
            config,
            bank,
            log: Arc::new(log),
        })
    }

    /// Same as [`AppState::new`] but with a caller-provided log backend.
    pub fn with_log(config: Config, log: Arc<dyn EventLog>) -> Self {
        let bank = QuestionBank::new(&config.quiz_folder);
        Self { config, bank, log }
    }
}

pub mod bank_preparation;
pub mod complete_quiz_engine;
pub mod event_log;
pub mod exam_engine;
pub mod exam_module_engine;
pub mod question_bank;
pub mod session;
pub mod single_question_engine;
