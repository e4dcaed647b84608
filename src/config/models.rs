use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Prefix used for auto-named captures when `capture_prefix` is not set.
pub const DEFAULT_CAPTURE_PREFIX: &str = "capture";

/// Characters rejected in `capture_prefix` (unsafe in file names on some platforms).
pub const UNSAFE_PREFIX_CHARS: [char; 5] = ['/', '\\', ':', '*', '?'];

/// Root configuration of a capture sequence.
///
/// Deserialized from a TOML file:
///
/// ```toml
/// app_module = "demo_app"
/// app_class = "DemoApp"
/// size = [100, 30]
/// output_dir = "screenshots"
/// capture_prefix = "demo"
///
/// [[step]]
/// type = "press"
/// key = "tab tab enter"
///
/// [[step]]
/// type = "capture"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct Config {
    /// Registry module the target application is registered under.
    pub app_module: String,

    /// Name of the application inside `app_module`.
    pub app_class: String,

    /// Terminal size as `[width, height]` (default: `[80, 40]`).
    #[serde(default)]
    pub size: Size,

    /// Directory receiving capture artifacts (default: current directory).
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    /// Prefix for auto-named captures (default: `"capture"`).
    #[serde(default = "default_capture_prefix")]
    pub capture_prefix: String,

    /// Ordered steps, written as `[[step]]` tables.
    #[serde(default, rename = "step")]
    pub steps: Vec<ActionDef>,
}

impl Config {
    /// Minimal configuration targeting `app_module` / `app_class` with no steps.
    pub fn new(app_module: impl Into<String>, app_class: impl Into<String>) -> Self {
        Self {
            app_module: app_module.into(),
            app_class: app_class.into(),
            size: Size::default(),
            output_dir: None,
            capture_prefix: default_capture_prefix(),
            steps: Vec::new(),
        }
    }

    /// `module.Class` label used in logs and plans.
    pub fn app_label(&self) -> String {
        format!("{}.{}", self.app_module, self.app_class)
    }
}

fn default_capture_prefix() -> String {
    DEFAULT_CAPTURE_PREFIX.to_string()
}

/// Terminal size in character cells, serialized as `[width, height]`.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Size(pub u16, pub u16);

impl Size {
    pub const fn width(self) -> u16 {
        self.0
    }

    pub const fn height(self) -> u16 {
        self.1
    }
}

impl Default for Size {
    fn default() -> Self {
        Size(80, 40)
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.0, self.1)
    }
}

/// One step of a capture sequence, selected by its `type` field.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionDef {
    /// Press one or more keys in order.
    Press {
        /// Whitespace-separated key names, e.g. `"tab tab enter"`.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        key: Option<String>,
        /// Key names, sent after those in `key`.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        keys: Vec<String>,
    },

    /// Wait for a number of seconds.
    Delay { seconds: f64 },

    /// Click the button whose label is given.
    Click { label: String },

    /// Write `.svg`, `.txt` and `_tooltips.txt` renderings of the current screen.
    Capture {
        /// Explicit base file name. When omitted, `<capture_prefix>_<NNN>` is used.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        output: Option<String>,
    },
}

impl ActionDef {
    pub fn kind(&self) -> ActionKind {
        match self {
            ActionDef::Press { .. } => ActionKind::Press,
            ActionDef::Delay { .. } => ActionKind::Delay,
            ActionDef::Click { .. } => ActionKind::Click,
            ActionDef::Capture { .. } => ActionKind::Capture,
        }
    }

    /// Resolved key list of a `press` step; empty for other kinds.
    pub fn key_list(&self) -> Vec<String> {
        match self {
            ActionDef::Press { key, keys } => key
                .iter()
                .flat_map(|k| k.split_whitespace())
                .chain(keys.iter().map(|k| k.trim()))
                .filter(|k| !k.is_empty())
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Discriminant of [`ActionDef`], used in logs and errors.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Press,
    Delay,
    Click,
    Capture,
}

impl ActionKind {
    pub const ALL: [ActionKind; 4] = [
        ActionKind::Press,
        ActionKind::Delay,
        ActionKind::Click,
        ActionKind::Capture,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            ActionKind::Press => "press",
            ActionKind::Delay => "delay",
            ActionKind::Click => "click",
            ActionKind::Capture => "capture",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == name)
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Button selector for a click label: `Button#` followed by the label without whitespace.
pub fn selector_for_label(label: &str) -> String {
    let id: String = label.split_whitespace().collect();
    format!("Button#{id}")
}
