use thiserror::Error;

/// Errors raised by the quiz engines. All of them are detected synchronously
/// by the operation that returns them and are never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuizError {
    #[error("cannot start a quiz with an empty question list")]
    EmptyQuestionList,

    #[error("not enough questions for module {module}: required {required}, available {available}")]
    InsufficientQuestions {
        module: String,
        required: usize,
        available: usize,
    },

    #[error("no active question")]
    NoActiveQuestion,

    #[error("no active module to finish")]
    NoActiveModule,

    #[error("cannot start an exam with no modules selected")]
    NoModulesSelected,

    #[error("no exam budget configured for module {0}")]
    UnknownModule(String),
}

pub type QuizResult<T> = std::result::Result<T, QuizError>;

/// Errors raised while reading or preparing question bank files.
#[derive(Debug, Error)]
pub enum BankError {
    #[error("io error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {file}: {source}")]
    Json {
        file: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("quiz file not found: {0}")]
    FileNotFound(String),

    #[error("invalid quiz structure in {file}: {reason}")]
    InvalidStructure { file: String, reason: String },

    #[error("error in question {index} of {file}: {reason}")]
    InvalidQuestion {
        file: String,
        index: usize,
        reason: String,
    },
}

impl BankError {
    pub(crate) fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        BankError::Io {
            path: path.into(),
            source,
        }
    }
}
