use tracing::{error, info, trace, warn};

use crate::config::{Config, validate_config};
use crate::error::{ActionFailure, RunError};
use crate::executor::actions::{ActionExecutor, StepOutcome, Timing};
use crate::executor::plan::Plan;
use crate::executor::sequence::{CaptureArtifacts, CaptureSequence};
use crate::session::{AppRegistry, Pilot};

/// Summary of a completed run.
#[derive(Debug, Default)]
pub struct RunReport {
    pub steps_executed: usize,
    /// Artifacts of every capture step, in step order.
    pub captures: Vec<CaptureArtifacts>,
    /// Best-effort steps that were skipped.
    pub skipped: Vec<ActionFailure>,
}

/// Runtime is responsible for:
/// - validating the configuration before anything is touched
/// - resolving and opening the target application
/// - dispatching every step to the ActionExecutor in order
/// - closing the session on every exit path
pub struct Runtime<'r> {
    config: Config,
    registry: &'r AppRegistry,
    executor: ActionExecutor,
    /// Counter of the current (or last) run; `None` until the first run starts.
    sequence: Option<CaptureSequence>,
}

impl<'r> Runtime<'r> {
    /// Create a new runtime with default settle timing.
    pub fn new(config: Config, registry: &'r AppRegistry) -> Self {
        Self::with_timing(config, registry, Timing::default())
    }

    pub fn with_timing(config: Config, registry: &'r AppRegistry, timing: Timing) -> Self {
        let executor = ActionExecutor::new(config.output_dir.as_deref(), timing);
        Self {
            config,
            registry,
            executor,
            sequence: None,
        }
    }

    /// Returns a reference to the configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Auto-named captures issued by the current or most recent run.
    pub fn captures_issued(&self) -> u32 {
        self.sequence.as_ref().map_or(0, CaptureSequence::issued)
    }

    /// The resolved plan of this configuration (dry-run view).
    pub fn plan(&self) -> Plan {
        Plan::from_config(&self.config, None)
    }

    /// Execute the whole sequence once.
    ///
    /// Numbering of auto-named captures restarts at `001` on every call.
    pub async fn run(&mut self) -> Result<RunReport, RunError> {
        validate_config(&self.config)?;

        let app_label = self.config.app_label();
        let app = self
            .registry
            .resolve(&self.config.app_module, &self.config.app_class)?;

        info!(
            target: "tui_capture::runtime",
            app = %app_label,
            size = %self.config.size,
            steps = self.config.steps.len(),
            "Starting capture sequence"
        );

        let mut pilot = app.open(self.config.size).map_err(|source| RunError::Open {
            app: app_label.clone(),
            source,
        })?;

        let result = self.drive(pilot.as_mut()).await;
        let closed = pilot.close().await;

        match (result, closed) {
            (Ok(report), Ok(())) => {
                info!(
                    target: "tui_capture::runtime",
                    app = %app_label,
                    captures = report.captures.len(),
                    skipped = report.skipped.len(),
                    "Capture sequence completed"
                );
                Ok(report)
            }
            (Ok(_), Err(close_err)) => Err(RunError::Close(close_err)),
            (Err(err), Ok(())) => Err(err),
            (Err(err), Err(close_err)) => {
                error!(
                    target: "tui_capture::runtime",
                    error = %close_err,
                    "Failed to close session after an aborted run"
                );
                Err(err)
            }
        }
    }

    async fn drive(&mut self, pilot: &mut dyn Pilot) -> Result<RunReport, RunError> {
        let sequence = self
            .sequence
            .insert(CaptureSequence::new(self.config.capture_prefix.as_str()));
        let mut report = RunReport::default();

        pilot
            .pause(self.executor.timing().initial_settle)
            .await
            .map_err(|source| RunError::Open {
                app: self.config.app_label(),
                source,
            })?;

        for (idx, action) in self.config.steps.iter().enumerate() {
            let step = idx + 1;
            trace!(target: "tui_capture::runtime", step, kind = %action.kind(), "Executing step");
            let outcome = self
                .executor
                .execute(pilot, step, action, sequence)
                .await?;
            report.steps_executed += 1;
            match outcome {
                StepOutcome::Completed => {}
                StepOutcome::Captured(artifacts) => report.captures.push(artifacts),
                StepOutcome::Skipped(failure) => {
                    warn!(target: "tui_capture::runtime", %failure, "Continuing after skipped step");
                    report.skipped.push(failure);
                }
            }
        }
        Ok(report)
    }
}
