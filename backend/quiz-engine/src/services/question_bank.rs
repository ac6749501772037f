use lazy_static::lazy_static;
use rand::seq::SliceRandom;
use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use validator::Validate;

use crate::error::BankError;
use crate::models::QuestionRecord;
use crate::utils::text::{module_display_name, module_key};

lazy_static! {
    static ref BANK_FILE_REGEX: Regex = Regex::new(r"^[^/\\]+_final\.json$").unwrap();
}

pub fn is_bank_file(name: &str) -> bool {
    BANK_FILE_REGEX.is_match(name)
}

/// A question exactly as stored in a bank file.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RawQuestion {
    pub num_domanda: u32,

    #[validate(length(min = 1, message = "'domanda' must not be empty"))]
    pub domanda: String,

    #[validate(length(min = 2, message = "'opzioni' must be a list with at least 2 options"))]
    pub opzioni: Vec<String>,

    pub risposta_corretta: String,

    #[validate(length(min = 1, message = "'cod_domanda' must not be empty"))]
    pub cod_domanda: String,
}

impl RawQuestion {
    /// Validates and trims the record, tagging it with its source module.
    pub fn normalize(self, source_module: &str) -> Result<QuestionRecord, String> {
        self.validate().map_err(|e| e.to_string())?;

        let options: Vec<String> = self.opzioni.iter().map(|opt| opt.trim().to_string()).collect();
        let correct_option = self.risposta_corretta.trim().to_string();
        if !options.contains(&correct_option) {
            return Err("'risposta_corretta' must be one of the options".to_string());
        }

        Ok(QuestionRecord {
            code: self.cod_domanda,
            sequence_number: self.num_domanda,
            text: self.domanda.trim().to_string(),
            options,
            correct_option,
            source_module: source_module.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AvailableQuiz {
    pub name: String,
    pub file: String,
}

/// Reads `*_final.json` bank files from one folder.
#[derive(Debug, Clone)]
pub struct QuestionBank {
    folder: PathBuf,
}

impl QuestionBank {
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
        }
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// Bank files in the folder, sorted by display name. A missing folder
    /// yields an empty list.
    pub async fn available_quizzes(&self) -> Result<Vec<AvailableQuiz>, BankError> {
        let mut quizzes = Vec::new();
        for file in list_bank_files(&self.folder).await? {
            quizzes.push(AvailableQuiz {
                name: module_display_name(&file),
                file,
            });
        }
        quizzes.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(quizzes)
    }

    pub async fn load_quiz(&self, file: &str) -> Result<Vec<QuestionRecord>, BankError> {
        let path = self.folder.join(file);
        if !tokio::fs::try_exists(&path)
            .await
            .map_err(|e| BankError::io(path.display().to_string(), e))?
        {
            return Err(BankError::FileNotFound(path.display().to_string()));
        }

        let entries = read_bank_entries(&path, file).await?;
        let source_module = module_key(file);

        let questions = entries
            .into_iter()
            .enumerate()
            .map(|(idx, entry)| {
                serde_json::from_value::<RawQuestion>(entry)
                    .map_err(|e| e.to_string())
                    .and_then(|raw| raw.normalize(source_module))
                    .map_err(|reason| BankError::InvalidQuestion {
                        file: file.to_string(),
                        index: idx + 1,
                        reason,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        tracing::info!("Loaded {} questions from {}", questions.len(), file);
        Ok(questions)
    }

    /// Loads several banks, keeping the requested order.
    pub async fn load_multiple(
        &self,
        files: &[String],
    ) -> Result<Vec<(String, Vec<QuestionRecord>)>, BankError> {
        let mut banks = Vec::with_capacity(files.len());
        for file in files {
            banks.push((file.clone(), self.load_quiz(file).await?));
        }
        Ok(banks)
    }

    /// Loads several banks into one pool, shuffled across modules.
    pub async fn merge_quizzes<R: Rng + ?Sized>(
        &self,
        files: &[String],
        rng: &mut R,
    ) -> Result<Vec<QuestionRecord>, BankError> {
        let mut pool: Vec<QuestionRecord> = self
            .load_multiple(files)
            .await?
            .into_iter()
            .flat_map(|(_, questions)| questions)
            .collect();

        pool.shuffle(rng);
        Ok(pool)
    }
}

pub(crate) async fn list_bank_files(folder: &Path) -> Result<Vec<String>, BankError> {
    let mut dir = match tokio::fs::read_dir(folder).await {
        Ok(dir) => dir,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(BankError::io(folder.display().to_string(), e)),
    };

    let mut files = Vec::new();
    while let Some(entry) = dir
        .next_entry()
        .await
        .map_err(|e| BankError::io(folder.display().to_string(), e))?
    {
        let name = entry.file_name().to_string_lossy().into_owned();
        if is_bank_file(&name) {
            files.push(name);
        }
    }
    files.sort();
    Ok(files)
}

/// Reads a bank file and checks that it holds a JSON array.
pub(crate) async fn read_bank_entries(path: &Path, file: &str) -> Result<Vec<Value>, BankError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| BankError::io(path.display().to_string(), e))?;

    let data: Value = serde_json::from_str(&content).map_err(|source| BankError::Json {
        file: file.to_string(),
        source,
    })?;

    match data {
        Value::Array(entries) => Ok(entries),
        _ => Err(BankError::InvalidStructure {
            file: file.to_string(),
            reason: "expected a list".to_string(),
        }),
    }
}
