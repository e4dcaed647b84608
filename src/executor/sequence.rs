use std::path::{Path, PathBuf};

/// Names captures that have no explicit `output`: `<prefix>_001`, `<prefix>_002`, ...
///
/// One instance lives for exactly one run; explicit names never advance it.
#[derive(Debug, Clone)]
pub struct CaptureSequence {
    prefix: String,
    counter: u32,
}

impl CaptureSequence {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: 0,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Number of auto-named captures issued so far.
    pub fn issued(&self) -> u32 {
        self.counter
    }

    /// Base name for a capture step: `explicit` when given, else the next sequence name.
    pub fn next_name(&mut self, explicit: Option<&str>) -> String {
        match explicit {
            Some(name) => name.to_string(),
            None => {
                self.counter += 1;
                format!("{}_{:03}", self.prefix, self.counter)
            }
        }
    }
}

/// The three files written by one capture step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureArtifacts {
    pub base_name: String,
    pub svg: PathBuf,
    pub text: PathBuf,
    pub tooltips: PathBuf,
}

impl CaptureArtifacts {
    pub fn new(dir: &Path, base_name: impl Into<String>) -> Self {
        let base_name = base_name.into();
        Self {
            svg: dir.join(format!("{base_name}.svg")),
            text: dir.join(format!("{base_name}.txt")),
            tooltips: dir.join(format!("{base_name}_tooltips.txt")),
            base_name,
        }
    }

    pub fn paths(&self) -> [&Path; 3] {
        [&self.svg, &self.text, &self.tooltips]
    }
}
