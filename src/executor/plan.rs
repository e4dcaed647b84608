use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::{ActionDef, Config, Size, selector_for_label};
use crate::executor::sequence::CaptureSequence;

/// A configuration expanded into exactly what a run would do, without doing it.
///
/// Capture names are resolved with a fresh [`CaptureSequence`], so the plan
/// shows the same file names a real run would produce.
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    pub source: Option<PathBuf>,
    pub app: String,
    pub size: Size,
    pub output_dir: Option<PathBuf>,
    pub capture_prefix: String,
    pub steps: Vec<PlannedStep>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlannedStep {
    Press { keys: Vec<String> },
    Delay { seconds: f64 },
    Click { label: String, selector: String },
    Capture { output: String, auto: bool },
}

impl Plan {
    pub fn from_config(cfg: &Config, source: Option<&Path>) -> Self {
        let mut sequence = CaptureSequence::new(cfg.capture_prefix.as_str());
        let steps = cfg
            .steps
            .iter()
            .map(|action| match action {
                ActionDef::Press { .. } => PlannedStep::Press {
                    keys: action.key_list(),
                },
                ActionDef::Delay { seconds } => PlannedStep::Delay { seconds: *seconds },
                ActionDef::Click { label } => PlannedStep::Click {
                    label: label.clone(),
                    selector: selector_for_label(label),
                },
                ActionDef::Capture { output } => PlannedStep::Capture {
                    output: sequence.next_name(output.as_deref()),
                    auto: output.is_none(),
                },
            })
            .collect();

        Self {
            source: source.map(Path::to_path_buf),
            app: cfg.app_label(),
            size: cfg.size,
            output_dir: cfg.output_dir.clone(),
            capture_prefix: cfg.capture_prefix.clone(),
            steps,
        }
    }

    /// Base names of every capture, in step order.
    pub fn capture_names(&self) -> impl Iterator<Item = &str> {
        self.steps.iter().filter_map(|s| match s {
            PlannedStep::Capture { output, .. } => Some(output.as_str()),
            _ => None,
        })
    }
}

impl fmt::Display for PlannedStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlannedStep::Press { keys } => write!(f, "press keys={keys:?}"),
            PlannedStep::Delay { seconds } => write!(f, "delay seconds={seconds}"),
            PlannedStep::Click { label, selector } => {
                write!(f, "click label=\"{label}\" target=\"{selector}\"")
            }
            PlannedStep::Capture { output, auto } => {
                write!(f, "capture output=\"{output}\"")?;
                if *auto {
                    f.write_str(" (auto)")?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Some(path) => writeln!(f, "Dry run: {}", path.display())?,
            None => writeln!(f, "Dry run: (command line)")?,
        }
        writeln!(f, "App: {}", self.app)?;
        writeln!(f, "Size: {}", self.size)?;
        match &self.output_dir {
            Some(dir) => writeln!(f, "Output Dir: {}", dir.display())?,
            None => writeln!(f, "Output Dir: . (current directory)")?,
        }
        writeln!(f, "Capture Prefix: {}", self.capture_prefix)?;
        writeln!(f, "Steps: {}", self.steps.len())?;
        for (idx, step) in self.steps.iter().enumerate() {
            writeln!(f, "  {:>3}. {step}", idx + 1)?;
        }
        Ok(())
    }
}
