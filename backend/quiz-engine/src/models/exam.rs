use serde::Serialize;

use super::QuestionRecord;

/// The question under the exam navigator, with display metadata.
#[derive(Debug, Clone, Serialize)]
pub struct ExamQuestionView<'a> {
    #[serde(flatten)]
    pub question: &'a QuestionRecord,
    /// 0-based navigation index.
    pub index: usize,
    /// 1-based position shown to the candidate.
    pub position: usize,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExamProgress {
    pub current_module: usize,
    pub total_modules: usize,
    pub completed_modules: usize,
    pub current_module_name: Option<String>,
}
