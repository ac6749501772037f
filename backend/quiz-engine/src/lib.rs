pub mod config;
pub mod error;
pub mod metrics;
pub mod models;
pub mod services;
pub mod utils;

pub use config::{Config, ExamSettings, ModuleBudget};
pub use error::{BankError, QuizError, QuizResult};
pub use services::complete_quiz_engine::CompleteQuizEngine;
pub use services::event_log::{EventLog, JsonFileLog, MemoryLog};
pub use services::exam_engine::ExamEngine;
pub use services::exam_module_engine::ExamModuleEngine;
pub use services::question_bank::QuestionBank;
pub use services::session::{ActiveQuiz, QuizSession};
pub use services::single_question_engine::SingleQuestionEngine;
pub use services::AppState;
