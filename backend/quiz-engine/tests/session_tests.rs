use std::sync::Arc;

use quizbank_engine::models::{LogEntry, QuizMode};
use quizbank_engine::utils::text::NO_ANSWER;
use quizbank_engine::{
    ActiveQuiz, AppState, CompleteQuizEngine, Config, EventLog, ExamEngine, ExamSettings,
    MemoryLog, ModuleBudget, QuizSession, SingleQuestionEngine,
};

mod common;

#[tokio::test]
async fn test_single_question_session_logs_each_check() {
    common::init_tracing();
    let log = MemoryLog::new();
    let engine = SingleQuestionEngine::with_seed(
        vec![common::question("Q1", "Paris", "geografia")],
        1,
    )
    .unwrap();
    let mut session = QuizSession::new("anna", ActiveQuiz::SingleQuestion(engine));
    assert_eq!(session.mode(), QuizMode::SingleQuestion);

    session.single_question_mut().unwrap().next_question();
    assert!(!session.check_answer("Rome", &log).await.unwrap().is_correct);
    assert!(session.check_answer("paris", &log).await.unwrap().is_correct);

    let answers = log.answers();
    assert_eq!(answers.len(), 2);
    assert_eq!(answers[1].attempt_number, 2);
    assert_eq!(answers[1].module_name, "geografia");
    assert_eq!(answers[1].session_id.as_deref(), Some(session.session_id()));

    let summary = session.finish_single_question(&log).await.unwrap();
    assert_eq!(summary.total_questions, 1);
    assert_eq!(summary.correct_answers, 1);
    assert_eq!(log.summaries().len(), 1);
}

#[tokio::test]
async fn test_complete_session_logs_every_question() {
    let log = MemoryLog::new();
    let engine = CompleteQuizEngine::new(vec![
        common::question("Q1", "A", "ptda"),
        common::question("Q2", "B", "ptda"),
    ])
    .unwrap();
    let mut session = QuizSession::new(
        "bruno",
        ActiveQuiz::Complete {
            module_name: "Ptda".to_string(),
            engine,
        },
    );

    session.complete_mut().unwrap().save_answer("Q1", "a");
    let result = session.submit_complete(&log).await.unwrap();
    assert_eq!(result.correct_answers, 1);

    let answers = log.answers();
    assert_eq!(answers.len(), 2);
    assert!(answers.iter().all(|a| a.module_name == "ptda" && a.attempt_number == 1));
    assert_eq!(answers[1].user_answer, NO_ANSWER);

    let summaries = log.summaries();
    assert_eq!(summaries[0].summary.score_percentage, 50.0);
    assert_eq!(summaries[0].quiz_mode, QuizMode::Complete);
}

#[tokio::test]
async fn test_exam_session_logs_modules_and_total() {
    let log = MemoryLog::new();
    let settings = ExamSettings::default().with_module("ptda", ModuleBudget::new(3, 5));
    let exam = ExamEngine::new(
        vec![("ptda_final.json".to_string(), common::pool("ptda", 6))],
        &settings,
    )
    .unwrap();
    let mut session = QuizSession::new("carla", ActiveQuiz::Exam(exam));

    {
        let exam = session.exam_mut().unwrap();
        exam.start_current_module().unwrap();
        exam.current_module_mut().unwrap().save_current_answer("Yes");
    }
    let module = session.finish_exam_module(&log).await.unwrap();
    assert_eq!(module.correct_answers, 1);
    assert!(!session.exam_mut().unwrap().advance_to_next_module());

    let result = session.finish_exam(&log).await.unwrap();
    assert_eq!(result.total_questions, 3);
    assert_eq!(log.answers().len(), 3);
    assert!(log.answers().iter().all(|a| a.module_name == "ptda"));
    assert!(matches!(
        log.entries().last(),
        Some(LogEntry::SessionSummary(event)) if event.summary.time_spent_seconds.is_some()
    ));
}

#[tokio::test]
async fn test_wrong_mode_is_rejected() {
    let log = MemoryLog::new();
    let engine = CompleteQuizEngine::new(vec![common::question("Q1", "A", "ptda")]).unwrap();
    let mut session = QuizSession::new(
        "anna",
        ActiveQuiz::Complete {
            module_name: "Ptda".to_string(),
            engine,
        },
    );

    assert!(session.single_question_mut().is_err());
    assert!(session.check_answer("A", &log).await.is_err());
    assert!(session.finish_exam(&log).await.is_err());
    assert!(log.entries().is_empty());
}

#[tokio::test]
async fn test_app_state_shares_one_log() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        quiz_folder: dir.path().to_path_buf(),
        log_file: dir.path().join("quiz_log.json"),
        ..Config::default()
    };
    let log = Arc::new(MemoryLog::new());
    let state = AppState::with_log(config, log.clone());

    let engine = CompleteQuizEngine::new(vec![common::question("Q1", "A", "ptda")]).unwrap();
    let mut session = QuizSession::new(
        "anna",
        ActiveQuiz::Complete {
            module_name: "Ptda".to_string(),
            engine,
        },
    );
    session.submit_complete(state.log.as_ref()).await.unwrap();

    assert_eq!(log.entries().len(), 2);
    assert_eq!(state.bank.folder(), dir.path());

    let persisted = AppState::new(state.config.clone()).await.unwrap();
    persisted
        .log
        .record_summary(log.summaries().remove(0))
        .await
        .unwrap();
    assert!(dir.path().join("quiz_log.json").exists());
}

#[tokio::test]
async fn test_finishing_exam_module_twice_logs_answers_once() {
    let log = MemoryLog::new();
    let exam = ExamEngine::new(
        vec![("ptda_final.json".to_string(), common::pool("ptda", 6))],
        &ExamSettings::default().with_module("ptda", ModuleBudget::new(3, 5)),
    )
    .unwrap();
    let mut session = QuizSession::new("dario", ActiveQuiz::Exam(exam));

    session.exam_mut().unwrap().start_current_module().unwrap();
    let first = session.finish_exam_module(&log).await.unwrap();
    let second = session.finish_exam_module(&log).await.unwrap();
    assert_eq!(first, second);

    let result = session.finish_exam(&log).await.unwrap();
    assert_eq!(log.answers().len(), result.total_questions);
}

#[tokio::test]
async fn test_events_share_module_key_across_modes() {
    let log = MemoryLog::new();

    let single = SingleQuestionEngine::with_seed(vec![common::question("S1", "A", "ptda")], 2)
        .unwrap();
    let mut session = QuizSession::new("anna", ActiveQuiz::SingleQuestion(single));
    session.single_question_mut().unwrap().next_question();
    session.check_answer("A", &log).await.unwrap();

    let exam = ExamEngine::new(
        vec![("ptda_final.json".to_string(), common::pool("ptda", 15))],
        &ExamSettings::default(),
    )
    .unwrap();
    let mut session = QuizSession::new("anna", ActiveQuiz::Exam(exam));
    session.exam_mut().unwrap().start_current_module().unwrap();
    session.finish_exam_module(&log).await.unwrap();

    let stats = quizbank_engine::services::event_log::module_stats(&log.entries(), "ptda");
    assert_eq!(stats.total_attempts, 16);
}
