use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

use crate::error::QuizError;
use crate::utils::text::module_key;

const DEFAULT_QUIZ_FOLDER: &str = "QUIZ_CLEAN/JSON";
const DEFAULT_LOG_FILE: &str = "quiz_logs.json";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub quiz_folder: PathBuf,
    pub log_file: PathBuf,
    pub exam: ExamSettings,
}

/// Question count and time limit for one exam module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ModuleBudget {
    pub question_count: usize,
    pub time_limit_minutes: u64,
}

impl ModuleBudget {
    pub fn new(question_count: usize, time_limit_minutes: u64) -> Self {
        Self {
            question_count,
            time_limit_minutes,
        }
    }

    pub fn time_limit_seconds(&self) -> u64 {
        self.time_limit_minutes * 60
    }
}

impl Default for ModuleBudget {
    fn default() -> Self {
        Self::new(15, 15)
    }
}

fn default_module_budget() -> Option<ModuleBudget> {
    Some(ModuleBudget::default())
}

/// Per-subject exam table. Subjects are matched by their bank key, so
/// `farmacologia`, `farmacologia_final.json` and `Farmacologia` all resolve
/// to the same entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExamSettings {
    #[serde(default)]
    pub modules: HashMap<String, ModuleBudget>,
    #[serde(default = "default_module_budget")]
    pub default_budget: Option<ModuleBudget>,
}

impl Default for ExamSettings {
    fn default() -> Self {
        Self {
            modules: HashMap::new(),
            default_budget: default_module_budget(),
        }
    }
}

impl ExamSettings {
    pub fn with_module(mut self, subject: &str, budget: ModuleBudget) -> Self {
        self.modules.insert(normalize_subject(subject), budget);
        self
    }

    pub fn budget_for(&self, subject: &str) -> Result<ModuleBudget, QuizError> {
        let wanted = normalize_subject(subject);
        self.modules
            .iter()
            .find(|(name, _)| normalize_subject(name) == wanted)
            .map(|(_, budget)| *budget)
            .or(self.default_budget)
            .ok_or_else(|| QuizError::UnknownModule(subject.to_string()))
    }
}

fn normalize_subject(subject: &str) -> String {
    module_key(subject.trim()).to_lowercase().replace(' ', "_")
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        // Load environment variables from root .env file (two levels up)
        // Try root .env first, then fallback to local .env
        let skip_root_env = env::var("SKIP_ROOT_ENV").is_ok();
        if skip_root_env {
            dotenvy::dotenv().ok();
        } else if dotenvy::from_path("../../.env").is_err() {
            dotenvy::dotenv().ok();
        }

        // Determine environment (defaults to dev)
        let env = env::var("APP_ENV").unwrap_or_else(|_| "dev".to_string());

        // Build configuration from config/*.toml + ENV overrides
        let settings = config::Config::builder()
            .add_source(config::File::with_name(&format!("config/{}", env)).required(false))
            // Override with environment variables (prefix: APP_)
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let quiz_folder = settings
            .get_string("quiz_folder")
            .or_else(|_| env::var("QUIZ_FOLDER"))
            .unwrap_or_else(|_| DEFAULT_QUIZ_FOLDER.to_string());

        let log_file = settings
            .get_string("log_file")
            .or_else(|_| env::var("QUIZ_LOG_FILE"))
            .unwrap_or_else(|_| DEFAULT_LOG_FILE.to_string());

        let exam = match settings.get::<ExamSettings>("exam") {
            Ok(exam) => exam,
            Err(config::ConfigError::NotFound(_)) => ExamSettings::default(),
            Err(e) => return Err(e),
        };

        tracing::debug!(
            quiz_folder = %quiz_folder,
            log_file = %log_file,
            exam_modules = exam.modules.len(),
            "Configuration resolved for environment {}",
            env
        );

        Ok(Config {
            quiz_folder: PathBuf::from(quiz_folder),
            log_file: PathBuf::from(log_file),
            exam,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            quiz_folder: PathBuf::from(DEFAULT_QUIZ_FOLDER),
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            exam: ExamSettings::default(),
        }
    }
}
