use quizbank_engine::models::AttemptStatus;
use quizbank_engine::{QuizError, SingleQuestionEngine};

mod common;

fn capitals() -> SingleQuestionEngine {
    SingleQuestionEngine::with_seed(
        vec![
            common::question("Q1", "Paris", "geografia"),
            common::question("Q2", "42", "matematica"),
            common::question("Q3", "Blue", "geografia"),
        ],
        11,
    )
    .unwrap()
}

fn serve(engine: &mut SingleQuestionEngine, code: &str) {
    while let Some(question) = engine.next_question() {
        if question.code == code {
            return;
        }
    }
    panic!("question {} was never served", code);
}

#[test]
fn test_answers_are_trimmed_and_case_folded() {
    common::init_tracing();
    let mut engine = capitals();
    serve(&mut engine, "Q1");

    assert!(engine.check_answer(" paris ").unwrap().is_correct);

    let mut engine = capitals();
    serve(&mut engine, "Q1");
    assert!(!engine.check_answer("paris!").unwrap().is_correct);
}

#[test]
fn test_every_question_is_served_once() {
    let mut engine = capitals();
    let mut codes = Vec::new();
    while let Some(question) = engine.next_question() {
        codes.push(question.code.clone());
    }

    codes.sort();
    assert_eq!(codes, ["Q1", "Q2", "Q3"]);
    assert!(engine.next_question().is_none());
    assert_eq!(engine.check_answer("Paris"), Err(QuizError::NoActiveQuestion));
}

#[test]
fn test_correct_at_attempt_tracks_first_match() {
    let mut engine = capitals();
    serve(&mut engine, "Q2");

    assert!(!engine.check_answer("41").unwrap().is_correct);
    assert!(!engine.check_answer("43").unwrap().is_correct);
    let check = engine.check_answer("42").unwrap();
    assert!(check.is_correct);
    assert_eq!(check.attempt_number, 3);

    let attempt = engine.current_attempt().unwrap();
    assert_eq!(attempt.status, AttemptStatus::Correct);
    assert_eq!(attempt.correct_at_attempt, Some(3));
}

#[test]
fn test_resolved_question_keeps_its_status() {
    let mut engine = capitals();
    serve(&mut engine, "Q3");

    engine.check_answer("blue").unwrap();
    engine.check_answer("red").unwrap();

    let attempt = engine.current_attempt().unwrap();
    assert_eq!(attempt.status, AttemptStatus::Correct);
    assert_eq!(attempt.correct_at_attempt, Some(1));
    assert_eq!(attempt.attempt_count, 2);
}

#[test]
fn test_skip_and_show_are_terminal_without_correct_attempt() {
    let mut engine = capitals();
    serve(&mut engine, "Q1");
    engine.skip_question().unwrap();
    assert!(engine.is_current_question_completed());
    assert_eq!(engine.current_attempt().unwrap().correct_at_attempt, None);

    let mut engine = capitals();
    serve(&mut engine, "Q2");
    assert_eq!(engine.show_answer().unwrap(), "42");
    assert!(engine.is_current_question_completed());
    assert_eq!(engine.current_attempt().unwrap().status, AttemptStatus::Shown);
}

#[test]
fn test_stats_are_grouped_by_source_module() {
    let mut engine = capitals();
    while let Some(question) = engine.next_question().cloned() {
        match question.code.as_str() {
            "Q1" => {
                engine.check_answer(&question.correct_option).unwrap();
            }
            "Q2" => {
                engine.check_answer("0").unwrap();
                engine.check_answer("42").unwrap();
            }
            _ => {
                engine.show_answer().unwrap();
            }
        }
    }

    let stats = engine.compute_stats();
    assert_eq!(stats.total_questions, 3);
    assert_eq!(stats.total_attempted(), 3);
    assert_eq!(stats.total_correct(), 2);

    let geografia = &stats.modules["geografia"];
    assert_eq!(geografia.total_attempted, 2);
    assert_eq!(geografia.correct_first_try, 1);
    assert_eq!(geografia.shown, 1);

    let matematica = &stats.modules["matematica"];
    assert_eq!(matematica.correct_multiple_tries, 1);
    assert_eq!(matematica.total_correct(), 1);
}
