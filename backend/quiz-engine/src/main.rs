use anyhow::Context;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use quizbank_engine::{config::Config, services::bank_preparation::prepare_folder};

/// Validates the bank files of a quiz folder and assigns missing question codes.
///
/// Usage: `quizbank-prepare [FOLDER]`. Without an argument the configured
/// quiz folder is used.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|format| format == "json");
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quizbank_engine=info".into()),
        )
        .with(json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json_logs).then(tracing_subscriber::fmt::layer))
        .init();

    let config = Config::load().context("Failed to load configuration")?;
    let folder = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| config.quiz_folder.clone());

    tracing::info!("Preparing question banks in {}", folder.display());
    let report = prepare_folder(&folder)
        .await
        .with_context(|| format!("Failed to prepare {}", folder.display()))?;

    let mut problem_count = 0;
    for file in &report {
        problem_count += file.problems.len();
        println!(
            "{}: {} questions, {} problems, {} codes assigned{}",
            file.file,
            file.question_count,
            file.problems.len(),
            file.codes_assigned,
            if file.rewritten { " (rewritten)" } else { "" }
        );
        for problem in &file.problems {
            println!("  question {}: {}", problem.index, problem.reason);
        }
    }

    tracing::info!(
        "Prepared {} files, {} problems found",
        report.len(),
        problem_count
    );
    Ok(())
}
