#![allow(dead_code)]

use serde_json::{json, Value};
use std::path::Path;

use quizbank_engine::models::QuestionRecord;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

pub fn question(code: &str, correct: &str, module: &str) -> QuestionRecord {
    QuestionRecord {
        code: code.to_string(),
        sequence_number: 1,
        text: format!("Question {}", code),
        options: vec![
            correct.to_string(),
            "Wrong 1".to_string(),
            "Wrong 2".to_string(),
            "Wrong 3".to_string(),
        ],
        correct_option: correct.to_string(),
        source_module: module.to_string(),
    }
}

pub fn pool(module: &str, size: usize) -> Vec<QuestionRecord> {
    (0..size)
        .map(|i| QuestionRecord {
            sequence_number: i as u32 + 1,
            ..question(&format!("{}-{:03}", module, i), "Yes", module)
        })
        .collect()
}

/// A bank entry in the on-disk format.
pub fn raw_question(number: u32, code: Option<&str>) -> Value {
    let mut entry = json!({
        "num_domanda": number,
        "domanda": format!("Domanda {}?", number),
        "opzioni": ["A", "B", "C", "D"],
        "risposta_corretta": "A",
    });
    if let Some(code) = code {
        entry["cod_domanda"] = json!(code);
    }
    entry
}

pub fn write_bank(folder: &Path, file: &str, entries: &[Value]) {
    let content = serde_json::to_string_pretty(entries).expect("serialize bank");
    std::fs::write(folder.join(file), content).expect("write bank file");
}
