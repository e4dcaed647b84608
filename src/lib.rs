#![forbid(unsafe_code)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

//! tui-capture — scripted screenshot capture for terminal UI applications.
//!
//! A TOML file names a registered application and lists steps (press, delay,
//! click, capture). The runtime drives the application through those steps and
//! writes `.svg`, `.txt` and `_tooltips.txt` renderings for every capture.
//! - `config`: Configuration models, loader, validation and schema helpers.
//! - `executor`: Step execution, capture naming, dry-run plans and the runtime.
//! - `session`: The automation interface (`TuiApp`, `Pilot`) and the app registry.
//! - `demo`: A small built-in application used by the legacy CLI mode.
//! - `error`: Error types.
//!
//! Use `tui_capture::prelude::*` to bring commonly used items into scope quickly.

/// Public module: configuration (models, loader, validation, schema helpers).
pub mod config;
/// Public module: built-in demo application.
pub mod demo;
/// Public module: error taxonomy.
pub mod error;
/// Public module: execution engine (actions, sequencing, plan, runtime).
pub mod executor;
/// Public module: automation session interface and app registry.
pub mod session;

use std::path::Path;

use crate::error::RunError;
use crate::executor::{RunReport, Runtime, Timing};
use crate::session::AppRegistry;

/// Crate-level constants for consumers that want to inspect package metadata at runtime.
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Returns the crate version (e.g., "0.1.0").
#[inline]
pub const fn version() -> &'static str {
    PKG_VERSION
}

/// Load, validate and run the sequence described by the TOML file at `path`.
pub async fn capture_file<P: AsRef<Path>>(
    path: P,
    registry: &AppRegistry,
    timing: Timing,
) -> Result<RunReport, RunError> {
    let cfg = config::load_from_path_async(path).await?;
    Runtime::with_timing(cfg, registry, timing).run().await
}

/// Initialize tracing (logging) with a reasonable default.
/// - Honors the `RUST_LOG` environment variable if set.
/// - Falls back to `info` level.
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init_tracing() {
    let level = std::env::var("RUST_LOG").ok();
    init_tracing_with_level(level.as_deref());
}

/// Initialize tracing at an explicit level (trace|debug|info|warn|error).
/// Unknown or missing levels fall back to `info`. Logs go to stderr so that
/// dry-run plans on stdout stay machine-readable.
pub fn init_tracing_with_level(level: Option<&str>) {
    use tracing::Level;
    use tracing_subscriber::fmt;

    let level = level
        .and_then(|s| match s.to_lowercase().as_str() {
            "trace" => Some(Level::TRACE),
            "debug" => Some(Level::DEBUG),
            "info" => Some(Level::INFO),
            "warn" | "warning" => Some(Level::WARN),
            "error" => Some(Level::ERROR),
            _ => None,
        })
        .unwrap_or(Level::INFO);

    // Ignore the error if the global subscriber was already set.
    let _ = fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .try_init();
}

/// A convenient set of exports for most consumers.
///
/// Bring this into scope with:
/// `use tui_capture::prelude::*;`
pub mod prelude {
    // Common result/error handling
    pub use anyhow::{Context, Result, anyhow, bail, ensure};

    // Tracing macros
    pub use tracing::{debug, error, info, instrument, trace, warn};

    pub use std::time::Duration;

    pub use crate as tui_capture;
    pub use crate::config::{ActionDef, Config, Size};
    pub use crate::error::{ConfigError, ResolutionError, RunError, SessionError};
    pub use crate::executor::{Plan, RunReport, Runtime, Timing};
    pub use crate::session::{AppRegistry, Pilot, TuiApp};
    pub use crate::{capture_file, config, executor, session};
}
