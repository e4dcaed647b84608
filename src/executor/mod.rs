#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

/*!
Executor module for tui-capture.

This module wires together:
- `actions`: single-step execution against a pilot (press, delay, click, capture)
- `sequence`: auto-naming of captures without an explicit `output`
- `plan`: dry-run expansion of a configuration
- `runtime`: the end-to-end run (validate, resolve, open, iterate, close)

Typical usage:
- Build an `AppRegistry` with the applications you want to drive.
- Load a `Config` and construct a `Runtime`.
- Call `Runtime::run`, or print `Runtime::plan` for a dry run.

Example:
```no_run
use tui_capture::config;
use tui_capture::executor::Runtime;
use tui_capture::session::AppRegistry;

# async fn demo() -> Result<(), tui_capture::error::RunError> {
let registry = AppRegistry::with_builtin_apps();
let cfg = config::load_from_path("sequence.toml")?;
let mut rt = Runtime::new(cfg, &registry);
let report = rt.run().await?;
println!("{} captures written", report.captures.len());
# Ok(())
# }
```
*/

pub mod actions;
pub mod plan;
pub mod runtime;
pub mod sequence;

// Re-exports for convenient access from `tui_capture::executor::*`
pub use actions::{ActionExecutor, StepOutcome, Timing};
pub use plan::{Plan, PlannedStep};
pub use runtime::{RunReport, Runtime};
pub use sequence::{CaptureArtifacts, CaptureSequence};
