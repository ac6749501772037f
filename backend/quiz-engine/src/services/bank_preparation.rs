//! Offline maintenance of bank files: strict structure checks and
//! assignment of stable question codes.

use rand::distr::Alphanumeric;
use rand::Rng;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use std::path::Path;

use crate::error::BankError;
use crate::services::question_bank::{list_bank_files, read_bank_entries};

const CODE_FIELD: &str = "cod_domanda";
const CODE_LENGTH: usize = 8;
const REQUIRED_OPTIONS: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionProblem {
    /// 1-based position in the file.
    pub index: usize,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreparedFile {
    pub file: String,
    pub question_count: usize,
    pub problems: Vec<QuestionProblem>,
    pub codes_assigned: usize,
    pub rewritten: bool,
}

/// Checks one question against the published bank format (four options,
/// correct answer among them). Codes are not required here.
pub fn check_question(entry: &Value) -> Result<(), String> {
    for field in ["num_domanda", "domanda", "opzioni", "risposta_corretta"] {
        if entry.get(field).is_none() {
            return Err(format!("Missing required field: {}", field));
        }
    }

    let options = entry["opzioni"]
        .as_array()
        .filter(|options| options.len() == REQUIRED_OPTIONS)
        .ok_or_else(|| format!("'opzioni' must be a list with {} options", REQUIRED_OPTIONS))?;

    if !options.contains(&entry["risposta_corretta"]) {
        return Err("'risposta_corretta' must be one of the options".to_string());
    }
    Ok(())
}

/// Lists every structural problem in a set of bank entries without stopping
/// at the first one.
pub fn find_problems(entries: &[Value]) -> Vec<QuestionProblem> {
    entries
        .iter()
        .enumerate()
        .filter_map(|(idx, entry)| {
            check_question(entry).err().map(|reason| QuestionProblem {
                index: idx + 1,
                reason,
            })
        })
        .collect()
}

pub async fn validate_bank_file(path: &Path) -> Result<Vec<QuestionProblem>, BankError> {
    let file = path.display().to_string();
    let entries = read_bank_entries(path, &file).await?;
    Ok(find_problems(&entries))
}

fn generate_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..CODE_LENGTH)
        .map(|_| rng.sample(Alphanumeric) as char)
        .collect()
}

/// Gives every object entry lacking a code a fresh one that collides neither
/// with existing codes nor with codes handed out in this run. Returns how
/// many codes were assigned.
pub fn assign_missing_codes<R: Rng + ?Sized>(entries: &mut [Value], rng: &mut R) -> usize {
    let mut used: HashSet<String> = entries
        .iter()
        .filter_map(|entry| entry.get(CODE_FIELD))
        .map(|code| match code {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect();

    let mut assigned = 0;
    for entry in entries.iter_mut() {
        let Some(object) = entry.as_object_mut() else {
            continue;
        };
        if object.contains_key(CODE_FIELD) {
            continue;
        }

        let code = loop {
            let candidate = generate_code(rng);
            if used.insert(candidate.clone()) {
                break candidate;
            }
        };
        object.insert(CODE_FIELD.to_string(), Value::String(code));
        assigned += 1;
    }
    assigned
}

/// Validates every bank file in `folder` and assigns missing codes, rewriting
/// only the files that changed.
pub async fn prepare_folder(folder: &Path) -> Result<Vec<PreparedFile>, BankError> {
    if !tokio::fs::try_exists(folder)
        .await
        .map_err(|e| BankError::io(folder.display().to_string(), e))?
    {
        return Err(BankError::FileNotFound(folder.display().to_string()));
    }

    let files = list_bank_files(folder).await?;
    if files.is_empty() {
        tracing::warn!("No files ending with _final.json found in {}", folder.display());
    }

    let mut report = Vec::with_capacity(files.len());
    for file in files {
        let path = folder.join(&file);
        tracing::info!("Processing {}", file);

        let mut entries = read_bank_entries(&path, &file).await?;
        let problems = find_problems(&entries);
        for problem in &problems {
            tracing::warn!(
                "Error in question {} of {}: {}",
                problem.index,
                file,
                problem.reason
            );
        }

        let codes_assigned = assign_missing_codes(&mut entries, &mut rand::rng());
        let rewritten = codes_assigned > 0;
        if rewritten {
            let json = serde_json::to_string_pretty(&entries).map_err(|source| BankError::Json {
                file: file.clone(),
                source,
            })?;
            tokio::fs::write(&path, json)
                .await
                .map_err(|e| BankError::io(path.display().to_string(), e))?;
            tracing::info!("{} updated with {} new question codes", file, codes_assigned);
        } else {
            tracing::info!("{} already has all question codes assigned", file);
        }

        report.push(PreparedFile {
            file,
            question_count: entries.len(),
            problems,
            codes_assigned,
            rewritten,
        });
    }

    Ok(report)
}
