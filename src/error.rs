//! Error taxonomy for tui-capture.
//!
//! Fatal failures (bad configuration, unknown application, session-level
//! breakage, unwritable artifacts) surface as [`RunError`]. Best-effort step
//! failures are reported as [`ActionFailure`] values and never abort a run.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::config::ActionKind;

/// The configuration could not be read, parsed, or failed validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration file {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse TOML configuration{}", origin_suffix(.path))]
    Parse {
        path: Option<PathBuf>,
        #[source]
        source: toml::de::Error,
    },

    #[error("missing required field '{field}'")]
    Missing { field: String },

    #[error("'{field}' {reason}")]
    Invalid { field: String, reason: String },
}

impl ConfigError {
    pub(crate) fn missing(field: impl Into<String>) -> Self {
        Self::Missing {
            field: field.into(),
        }
    }

    pub(crate) fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Name of the offending field, when the error is about a single field.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Missing { field } | Self::Invalid { field, .. } => Some(field),
            Self::Io { .. } | Self::Parse { .. } => None,
        }
    }
}

fn origin_suffix(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| format!(" from {}", p.display()))
        .unwrap_or_default()
}

/// The configured application could not be found in the registry.
#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("failed to resolve {class} from {module}: no module named '{module}'")]
    UnknownModule { module: String, class: String },

    #[error("failed to resolve {class} from {module}: module has no application '{class}'")]
    UnknownClass { module: String, class: String },
}

/// Failure reported by an automation session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("unknown key '{0}'")]
    UnknownKey(String),

    #[error("no widget matches selector '{0}'")]
    NoMatch(String),

    #[error("widget '{selector}' cannot be activated: {reason}")]
    NotActivatable { selector: String, reason: String },

    #[error("the application has exited; the session is closed")]
    Closed,

    #[error("failed to write {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("automation backend failure: {0}")]
    Backend(String),
}

impl SessionError {
    /// Whether the failure only concerns the targeted key or widget, leaving the
    /// session usable for the remaining steps.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::UnknownKey(_) | Self::NoMatch(_) | Self::NotActivatable { .. }
        )
    }
}

/// A capture step could not write one of its artifacts.
#[derive(Debug, Error)]
#[error("step {step} (capture) could not write {}", .path.display())]
pub struct ArtifactWriteError {
    pub step: usize,
    pub path: PathBuf,
    #[source]
    pub source: SessionError,
}

/// A best-effort step that was skipped. Logged, never propagated.
#[derive(Debug)]
pub struct ActionFailure {
    pub step: usize,
    pub kind: ActionKind,
    /// Key or selector the step was acting on.
    pub target: String,
    pub source: SessionError,
}

impl fmt::Display for ActionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "step {} ({} '{}') skipped: {}",
            self.step, self.kind, self.target, self.source
        )
    }
}

/// Fatal outcome of a run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error("failed to open an automation session for {app}")]
    Open {
        app: String,
        #[source]
        source: SessionError,
    },

    #[error("step {step} ({kind}) failed")]
    Step {
        step: usize,
        kind: ActionKind,
        #[source]
        source: SessionError,
    },

    #[error(transparent)]
    Artifact(#[from] ArtifactWriteError),

    #[error("failed to close the automation session")]
    Close(#[source] SessionError),
}

impl RunError {
    /// Process exit status the CLI reports for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) => 2,
            Self::Resolution(_) => 3,
            Self::Open { .. } | Self::Step { .. } | Self::Artifact(_) | Self::Close(_) => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_message_names_field() {
        let err = ConfigError::invalid("capture_prefix", "must be a string");
        assert_eq!(err.to_string(), "'capture_prefix' must be a string");
        assert_eq!(err.field(), Some("capture_prefix"));
    }

    #[test]
    fn missing_message_names_field() {
        let err = ConfigError::missing("app_class");
        assert_eq!(err.to_string(), "missing required field 'app_class'");
    }

    #[test]
    fn recoverable_session_errors() {
        assert!(SessionError::NoMatch("Button#X".into()).is_recoverable());
        assert!(SessionError::UnknownKey("hyper".into()).is_recoverable());
        assert!(!SessionError::Closed.is_recoverable());
        assert!(!SessionError::Backend("boom".into()).is_recoverable());
    }

    #[test]
    fn exit_codes_by_class() {
        let cfg: RunError = ConfigError::missing("app_module").into();
        assert_eq!(cfg.exit_code(), 2);
        let res: RunError = ResolutionError::UnknownModule {
            module: "m".into(),
            class: "C".into(),
        }
        .into();
        assert_eq!(res.exit_code(), 3);
        assert_eq!(RunError::Close(SessionError::Closed).exit_code(), 1);
    }
}
