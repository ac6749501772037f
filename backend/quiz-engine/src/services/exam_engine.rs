use rand::Rng;
use std::sync::Arc;

use crate::config::ExamSettings;
use crate::error::{QuizError, QuizResult};
use crate::metrics::record_session_started;
use crate::models::{ExamProgress, ExamResult, ModuleResult, QuestionRecord, QuizMode};
use crate::services::exam_module_engine::ExamModuleEngine;
use crate::utils::clock::{Clock, SystemClock};
use crate::utils::text::module_display_name;

/// Runs the selected exam modules one after another.
///
/// Lifecycle: `NotStarted -> ModuleInProgress(i) -> ModuleFinished(i) ->
/// ModuleInProgress(i + 1) | AllModulesComplete`. The terminal state is
/// reached when [`advance_to_next_module`](Self::advance_to_next_module)
/// returns `false` after the last module was finished; from then on
/// [`current_module`](Self::current_module) is `None`.
pub struct ExamEngine {
    modules: Vec<ExamModuleEngine>,
    results: Vec<Option<ModuleResult>>,
    current_index: usize,
}

impl ExamEngine {
    /// Builds one module per `(subject, pool)` pair, in the given order.
    /// Subjects are bank keys or file names; the budget for each comes from
    /// `settings`. Fails without building anything if any module fails.
    pub fn new<I>(subjects: I, settings: &ExamSettings) -> QuizResult<Self>
    where
        I: IntoIterator<Item = (String, Vec<QuestionRecord>)>,
    {
        Self::with_parts(subjects, settings, Arc::new(SystemClock), &mut rand::rng())
    }

    pub fn with_parts<I, R>(
        subjects: I,
        settings: &ExamSettings,
        clock: Arc<dyn Clock>,
        rng: &mut R,
    ) -> QuizResult<Self>
    where
        I: IntoIterator<Item = (String, Vec<QuestionRecord>)>,
        R: Rng + ?Sized,
    {
        let modules = subjects
            .into_iter()
            .map(|(subject, pool)| {
                let budget = settings.budget_for(&subject)?;
                ExamModuleEngine::with_parts(
                    module_display_name(&subject),
                    &pool,
                    budget,
                    clock.clone(),
                    &mut *rng,
                )
            })
            .collect::<QuizResult<Vec<_>>>()
            .inspect_err(|e| tracing::warn!("Exam construction failed: {}", e))?;

        if modules.is_empty() {
            return Err(QuizError::NoModulesSelected);
        }

        record_session_started(QuizMode::Exam.as_str());
        tracing::info!("Exam created with {} modules", modules.len());

        Ok(Self {
            results: vec![None; modules.len()],
            modules,
            current_index: 0,
        })
    }

    pub fn total_modules(&self) -> usize {
        self.modules.len()
    }

    pub fn modules(&self) -> &[ExamModuleEngine] {
        &self.modules
    }

    pub fn current_module(&self) -> Option<&ExamModuleEngine> {
        self.modules.get(self.current_index)
    }

    pub fn current_module_mut(&mut self) -> Option<&mut ExamModuleEngine> {
        self.modules.get_mut(self.current_index)
    }

    /// Starts the current module's timer. Restarting a finished module drops
    /// its recorded result until it is finished again.
    pub fn start_current_module(&mut self) -> QuizResult<()> {
        let index = self.current_index;
        self.modules
            .get_mut(index)
            .ok_or(QuizError::NoActiveModule)?
            .start_timer();
        if self.results[index].take().is_some() {
            tracing::info!("Exam module {} restarted, previous result discarded", index + 1);
        }
        Ok(())
    }

    /// Finishes the current module and records its result. Finishing the
    /// same module again returns the same result without double counting.
    pub fn finish_current_module(&mut self) -> QuizResult<ModuleResult> {
        let index = self.current_index;
        let module = self
            .modules
            .get_mut(index)
            .ok_or(QuizError::NoActiveModule)?;

        let result = module.finish_module();
        self.results[index] = Some(result.clone());
        Ok(result)
    }

    /// Moves to the next module. At the last module this returns `false`;
    /// if that module is already finished the exam becomes complete.
    pub fn advance_to_next_module(&mut self) -> bool {
        if self.current_index + 1 < self.modules.len() {
            self.current_index += 1;
            tracing::debug!("Advanced to exam module {}", self.current_index + 1);
            return true;
        }

        let last_finished = self
            .results
            .get(self.current_index)
            .is_some_and(Option::is_some);
        if last_finished {
            self.current_index = self.modules.len();
            tracing::info!("Exam complete");
        }
        false
    }

    pub fn is_complete(&self) -> bool {
        self.current_index >= self.modules.len()
    }

    pub fn progress(&self) -> ExamProgress {
        ExamProgress {
            current_module: (self.current_index + 1).min(self.modules.len()),
            total_modules: self.modules.len(),
            completed_modules: self.results.iter().flatten().count(),
            current_module_name: self.current_module().map(|m| m.module_name().to_string()),
        }
    }

    pub fn module_results(&self) -> impl Iterator<Item = &ModuleResult> {
        self.results.iter().flatten()
    }

    /// Sums counts and time over finished modules; the percentage comes from
    /// the summed counts.
    pub fn final_results(&self) -> ExamResult {
        ExamResult::from_modules(self.module_results().cloned().collect())
    }
}
