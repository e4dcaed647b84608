use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info, trace, warn};

use crate::config::{ActionDef, ActionKind, selector_for_label};
use crate::error::{ActionFailure, ConfigError, ArtifactWriteError, RunError, SessionError};
use crate::executor::sequence::{CaptureArtifacts, CaptureSequence};
use crate::session::Pilot;

/// Settle pauses giving the application time to finish rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// Before the first step, after the session opens.
    pub initial_settle: Duration,
    /// After every key of a `press` step.
    pub key_settle: Duration,
    /// After a successful `click`.
    pub click_settle: Duration,
}

impl Timing {
    /// No settle pauses at all (tests, fast headless backends).
    pub const fn none() -> Self {
        Self {
            initial_settle: Duration::ZERO,
            key_settle: Duration::ZERO,
            click_settle: Duration::ZERO,
        }
    }
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            initial_settle: Duration::from_secs(1),
            key_settle: Duration::from_millis(200),
            click_settle: Duration::from_millis(200),
        }
    }
}

/// Result of a step that did not fail fatally.
#[derive(Debug)]
pub enum StepOutcome {
    Completed,
    Captured(CaptureArtifacts),
    /// Best-effort step that could not be performed; the run continues.
    Skipped(ActionFailure),
}

/// Performs single actions against a pilot.
///
/// Press and click failures that only concern their target are returned as
/// [`StepOutcome::Skipped`]; everything else is a [`RunError`].
#[derive(Debug, Clone)]
pub struct ActionExecutor {
    timing: Timing,
    output_dir: PathBuf,
}

impl ActionExecutor {
    /// Create a new executor writing captures under `output_dir` (current directory when `None`).
    pub fn new(output_dir: Option<&Path>, timing: Timing) -> Self {
        Self {
            timing,
            output_dir: output_dir.map(Path::to_path_buf).unwrap_or_default(),
        }
    }

    pub fn timing(&self) -> Timing {
        self.timing
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Execute one step. `step` is the 1-based position used in logs and errors.
    pub async fn execute(
        &self,
        pilot: &mut dyn Pilot,
        step: usize,
        action: &ActionDef,
        sequence: &mut CaptureSequence,
    ) -> Result<StepOutcome, RunError> {
        match action {
            ActionDef::Press { .. } => self.press(pilot, step, &action.key_list()).await,
            ActionDef::Delay { seconds } => self.delay(pilot, step, *seconds).await,
            ActionDef::Click { label } => self.click(pilot, step, label).await,
            ActionDef::Capture { output } => {
                let base = sequence.next_name(output.as_deref());
                let artifacts = CaptureArtifacts::new(&self.output_dir, base);
                self.capture(pilot, step, &artifacts).await?;
                Ok(StepOutcome::Captured(artifacts))
            }
        }
    }

    /// Send each key in order, settling after every key.
    pub async fn press(
        &self,
        pilot: &mut dyn Pilot,
        step: usize,
        keys: &[String],
    ) -> Result<StepOutcome, RunError> {
        for key in keys {
            trace!(target: "tui_capture::actions", step, %key, "press");
            if let Err(err) = pilot.press(key).await {
                return tolerate(step, ActionKind::Press, key, err);
            }
            settle(pilot, step, ActionKind::Press, self.timing.key_settle).await?;
        }
        info!(target: "tui_capture::actions", step, keys = %keys.join(" "), "Pressed");
        Ok(StepOutcome::Completed)
    }

    pub async fn delay(
        &self,
        pilot: &mut dyn Pilot,
        step: usize,
        seconds: f64,
    ) -> Result<StepOutcome, RunError> {
        let duration = Duration::try_from_secs_f64(seconds).map_err(|e| {
            let field = format!("step[{}].seconds", step.saturating_sub(1));
            ConfigError::invalid(field, e.to_string())
        })?;
        settle(pilot, step, ActionKind::Delay, duration).await?;
        info!(target: "tui_capture::actions", step, seconds, "Delayed");
        Ok(StepOutcome::Completed)
    }

    /// Click the button labelled `label`. Best-effort: a missing or inert button is skipped.
    pub async fn click(
        &self,
        pilot: &mut dyn Pilot,
        step: usize,
        label: &str,
    ) -> Result<StepOutcome, RunError> {
        let selector = selector_for_label(label);
        trace!(target: "tui_capture::actions", step, %label, %selector, "click");
        if let Err(err) = pilot.click(&selector).await {
            return tolerate(step, ActionKind::Click, &selector, err);
        }
        settle(pilot, step, ActionKind::Click, self.timing.click_settle).await?;
        info!(target: "tui_capture::actions", step, %label, "Clicked");
        Ok(StepOutcome::Completed)
    }

    /// Write the SVG, text and tooltip renderings. Any failure is fatal.
    pub async fn capture(
        &self,
        pilot: &mut dyn Pilot,
        step: usize,
        artifacts: &CaptureArtifacts,
    ) -> Result<(), ArtifactWriteError> {
        let fail = |path: &Path, source: SessionError| ArtifactWriteError {
            step,
            path: path.to_path_buf(),
            source,
        };

        for path in artifacts.paths() {
            if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(dir).await.map_err(|source| {
                    fail(
                        path,
                        SessionError::Io {
                            path: dir.to_path_buf(),
                            source,
                        },
                    )
                })?;
            }
        }

        pilot
            .save_screenshot(&artifacts.svg)
            .await
            .map_err(|e| fail(&artifacts.svg, e))?;
        pilot
            .save_text(&artifacts.text)
            .await
            .map_err(|e| fail(&artifacts.text, e))?;
        pilot
            .save_tooltips(&artifacts.tooltips)
            .await
            .map_err(|e| fail(&artifacts.tooltips, e))?;

        info!(
            target: "tui_capture::actions",
            step,
            svg = %artifacts.svg.display(),
            text = %artifacts.text.display(),
            tooltips = %artifacts.tooltips.display(),
            "Captured"
        );
        Ok(())
    }
}

async fn settle(
    pilot: &mut dyn Pilot,
    step: usize,
    kind: ActionKind,
    duration: Duration,
) -> Result<(), RunError> {
    if duration.is_zero() && kind != ActionKind::Delay {
        return Ok(());
    }
    pilot
        .pause(duration)
        .await
        .map_err(|source| RunError::Step { step, kind, source })
}

/// Turn a recoverable session error into a skipped step; propagate the rest.
fn tolerate(
    step: usize,
    kind: ActionKind,
    target: &str,
    err: SessionError,
) -> Result<StepOutcome, RunError> {
    if !err.is_recoverable() {
        return Err(RunError::Step {
            step,
            kind,
            source: err,
        });
    }
    let failure = ActionFailure {
        step,
        kind,
        target: target.to_string(),
        source: err,
    };
    warn!(
        target: "tui_capture::actions",
        step,
        action = %kind,
        on = %target,
        error = %failure.source,
        "Could not {kind} '{target}'; continuing"
    );
    debug!(target: "tui_capture::actions", %failure, "Step skipped");
    Ok(StepOutcome::Skipped(failure))
}
