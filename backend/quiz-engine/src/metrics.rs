use lazy_static::lazy_static;
use prometheus::{register_int_counter_vec, Encoder, IntCounterVec, TextEncoder};

lazy_static! {
    pub static ref QUIZ_SESSIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "quiz_sessions_total",
        "Total number of quiz engines created",
        &["mode"]
    )
    .unwrap();

    pub static ref QUESTIONS_SERVED_TOTAL: IntCounterVec = register_int_counter_vec!(
        "quiz_questions_served_total",
        "Total number of questions served to users",
        &["mode"]
    )
    .unwrap();

    pub static ref ANSWERS_CHECKED_TOTAL: IntCounterVec = register_int_counter_vec!(
        "quiz_answers_checked_total",
        "Total number of answers scored",
        &["mode", "correct"]
    )
    .unwrap();

    pub static ref EXAM_MODULES_FINISHED_TOTAL: IntCounterVec = register_int_counter_vec!(
        "exam_modules_finished_total",
        "Total number of exam modules finished",
        &["expired"]
    )
    .unwrap();
}

/// Renders all metrics in Prometheus text format
pub fn render_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer)
        .map_err(|e| prometheus::Error::Msg(format!("Failed to convert metrics to UTF-8: {}", e)))
}

pub fn record_session_started(mode: &str) {
    QUIZ_SESSIONS_TOTAL.with_label_values(&[mode]).inc();
}

pub fn record_question_served(mode: &str) {
    QUESTIONS_SERVED_TOTAL.with_label_values(&[mode]).inc();
}

pub fn record_answer_checked(mode: &str, correct: bool) {
    let correct_label = if correct { "true" } else { "false" };
    ANSWERS_CHECKED_TOTAL
        .with_label_values(&[mode, correct_label])
        .inc();
}

pub fn record_module_finished(expired: bool) {
    let expired_label = if expired { "true" } else { "false" };
    EXAM_MODULES_FINISHED_TOTAL
        .with_label_values(&[expired_label])
        .inc();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_metrics() {
        record_answer_checked("complete", true);

        let output = render_metrics().unwrap();
        assert!(output.contains("quiz_answers_checked_total"));
    }
}
