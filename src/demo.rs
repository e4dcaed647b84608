//! Built-in demo application.
//!
//! A headless stand-in for a small terminal app: a header, a welcome label, a
//! status line, two buttons ("Run Selected" and "Cancel") and a footer. It is
//! registered as `demo_app` / `DemoApp`, serves as the target of the legacy
//! single-shot CLI mode, and renders just enough of itself for captures to be
//! meaningful.
//!
//! Keys: `tab` / `shift+tab` move focus, `home` / `end` jump to the first or
//! last button, `enter` / `space` activate the focused button, `q` quits.
//! Other single characters are accepted and ignored.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, trace};

use crate::config::Size;
use crate::error::SessionError;
use crate::session::{AppRegistry, Pilot, TuiApp};

pub const DEMO_MODULE: &str = "demo_app";
pub const DEMO_CLASS: &str = "DemoApp";

const TITLE: &str = "Welcome to the Demo App";
const INITIAL_STATUS: &str = "Ready to start...";

struct Button {
    id: &'static str,
    label: &'static str,
    tooltip: &'static str,
    status: &'static str,
}

const BUTTONS: [Button; 2] = [
    Button {
        id: "RunSelected",
        label: "Run Selected",
        tooltip: "Run the selected operation",
        status: "Running selected operation...",
    },
    Button {
        id: "Cancel",
        label: "Cancel",
        tooltip: "Cancel the current operation",
        status: "Operation cancelled",
    },
];

/// Register the demo application under [`DEMO_MODULE`] / [`DEMO_CLASS`].
pub fn register(registry: &mut AppRegistry) {
    registry.register(DEMO_MODULE, DEMO_CLASS, || Box::new(DemoApp::new()));
}

/// Application state of the demo app.
#[derive(Debug, Clone)]
pub struct DemoApp {
    status: String,
    focus: Option<usize>,
}

impl DemoApp {
    pub fn new() -> Self {
        Self {
            status: INITIAL_STATUS.to_string(),
            focus: None,
        }
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    fn activate(&mut self, idx: usize) {
        self.focus = Some(idx);
        self.status = BUTTONS[idx].status.to_string();
        debug!(target: "tui_capture::demo", button = BUTTONS[idx].id, status = %self.status, "Button pressed");
    }

    /// Screen contents, exactly `size.height()` lines of `size.width()` characters.
    fn render_lines(&self, size: Size) -> Vec<String> {
        let width = usize::from(size.width());
        let height = usize::from(size.height());

        let buttons = BUTTONS
            .iter()
            .enumerate()
            .map(|(i, b)| {
                if self.focus == Some(i) {
                    format!("[>{}<]", b.label)
                } else {
                    format!("[ {} ]", b.label)
                }
            })
            .collect::<Vec<_>>()
            .join("  ");

        let mut lines = vec![String::new(); height];
        let mut put = |row: usize, text: String| {
            if let Some(line) = lines.get_mut(row) {
                *line = text;
            }
        };
        put(0, format!("{:^width$}", "DemoApp"));
        put(2, format!("  {TITLE}"));
        put(4, format!("  Status: {}", self.status));
        put(6, format!("  {buttons}"));
        if height > 8 {
            put(height - 1, " q Quit".to_string());
        }

        lines.into_iter().map(|l| fit(&l, width)).collect()
    }

    fn render_svg(&self, size: Size) -> String {
        const CELL_W: u32 = 8;
        const CELL_H: u32 = 16;
        let w = u32::from(size.width()) * CELL_W;
        let h = u32::from(size.height()) * CELL_H;

        let mut svg = format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">\n\
             <rect width=\"100%\" height=\"100%\" fill=\"#1e1e1e\"/>\n\
             <g font-family=\"monospace\" font-size=\"14\" fill=\"#e0e0e0\" xml:space=\"preserve\">\n"
        );
        for (row, line) in self.render_lines(size).iter().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let y = (row as u32 + 1) * CELL_H - 4;
            svg.push_str(&format!(
                "<text x=\"0\" y=\"{y}\">{}</text>\n",
                escape_xml(line.trim_end())
            ));
        }
        svg.push_str("</g>\n</svg>\n");
        svg
    }

    fn render_tooltips(&self) -> String {
        BUTTONS
            .iter()
            .map(|b| format!("Button#{}: {}\n", b.id, b.tooltip))
            .collect()
    }
}

impl Default for DemoApp {
    fn default() -> Self {
        Self::new()
    }
}

impl TuiApp for DemoApp {
    fn open(self: Box<Self>, size: Size) -> Result<Box<dyn Pilot>, SessionError> {
        debug!(target: "tui_capture::demo", %size, "Opening demo app session");
        Ok(Box::new(DemoPilot {
            app: *self,
            size,
            closed: false,
        }))
    }
}

/// Pilot for [`DemoApp`].
pub struct DemoPilot {
    app: DemoApp,
    size: Size,
    closed: bool,
}

impl DemoPilot {
    pub fn app(&self) -> &DemoApp {
        &self.app
    }

    fn ensure_open(&self) -> Result<(), SessionError> {
        if self.closed {
            Err(SessionError::Closed)
        } else {
            Ok(())
        }
    }

    async fn write(&self, path: &Path, contents: String) -> Result<(), SessionError> {
        tokio::fs::write(path, contents)
            .await
            .map_err(|source| SessionError::Io {
                path: path.to_path_buf(),
                source,
            })
    }
}

#[async_trait]
impl Pilot for DemoPilot {
    async fn press(&mut self, key: &str) -> Result<(), SessionError> {
        self.ensure_open()?;
        trace!(target: "tui_capture::demo", key, "press");
        let last = BUTTONS.len() - 1;
        match key {
            "tab" => self.app.focus = Some(self.app.focus.map_or(0, |i| (i + 1) % BUTTONS.len())),
            "shift+tab" => {
                self.app.focus = Some(self.app.focus.map_or(last, |i| (i + last) % BUTTONS.len()))
            }
            "home" => self.app.focus = Some(0),
            "end" => self.app.focus = Some(last),
            "enter" | "space" => {
                if let Some(idx) = self.app.focus {
                    self.app.activate(idx);
                }
            }
            "q" => self.closed = true,
            other if other.chars().count() == 1 => {}
            other => return Err(SessionError::UnknownKey(other.to_string())),
        }
        Ok(())
    }

    async fn click(&mut self, selector: &str) -> Result<(), SessionError> {
        self.ensure_open()?;
        let id = selector
            .strip_prefix("Button")
            .unwrap_or(selector)
            .trim_start_matches('#');
        let idx = BUTTONS
            .iter()
            .position(|b| b.id == id)
            .ok_or_else(|| SessionError::NoMatch(selector.to_string()))?;
        self.app.activate(idx);
        Ok(())
    }

    async fn pause(&mut self, duration: Duration) -> Result<(), SessionError> {
        self.ensure_open()?;
        tokio::time::sleep(duration).await;
        Ok(())
    }

    async fn save_screenshot(&mut self, path: &Path) -> Result<(), SessionError> {
        self.ensure_open()?;
        self.write(path, self.app.render_svg(self.size)).await
    }

    async fn save_text(&mut self, path: &Path) -> Result<(), SessionError> {
        self.ensure_open()?;
        let mut text = self
            .app
            .render_lines(self.size)
            .iter()
            .map(|l| l.trim_end())
            .collect::<Vec<_>>()
            .join("\n");
        text.push('\n');
        self.write(path, text).await
    }

    async fn save_tooltips(&mut self, path: &Path) -> Result<(), SessionError> {
        self.ensure_open()?;
        self.write(path, self.app.render_tooltips()).await
    }

    async fn close(&mut self) -> Result<(), SessionError> {
        self.closed = true;
        debug!(target: "tui_capture::demo", status = %self.app.status, "Demo app closed");
        Ok(())
    }
}

/// Pad or truncate `line` to exactly `width` characters.
fn fit(line: &str, width: usize) -> String {
    let mut out: String = line.chars().take(width).collect();
    let len = out.chars().count();
    out.extend(std::iter::repeat_n(' ', width - len));
    out
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pilot() -> DemoPilot {
        DemoPilot {
            app: DemoApp::new(),
            size: Size(40, 12),
            closed: false,
        }
    }

    #[tokio::test]
    async fn tab_then_enter_activates_first_button() {
        let mut p = pilot();
        p.press("tab").await.unwrap();
        p.press("enter").await.unwrap();
        assert_eq!(p.app().status(), "Running selected operation...");
    }

    #[tokio::test]
    async fn click_by_selector() {
        let mut p = pilot();
        p.click("Button#Cancel").await.unwrap();
        assert_eq!(p.app().status(), "Operation cancelled");
        let err = p.click("Button#Nope").await.unwrap_err();
        assert!(err.is_recoverable());
    }

    #[tokio::test]
    async fn unknown_named_key_is_recoverable() {
        let mut p = pilot();
        assert!(p.press("x").await.is_ok());
        let err = p.press("hyperspace").await.unwrap_err();
        assert!(matches!(err, SessionError::UnknownKey(_)));
    }

    #[tokio::test]
    async fn quitting_closes_the_session() {
        let mut p = pilot();
        p.press("q").await.unwrap();
        assert!(matches!(p.press("tab").await, Err(SessionError::Closed)));
    }

    #[test]
    fn render_has_exact_dimensions() {
        let app = DemoApp::new();
        let lines = app.render_lines(Size(30, 10));
        assert_eq!(lines.len(), 10);
        assert!(lines.iter().all(|l| l.chars().count() == 30));
        assert!(lines[4].contains("Ready to start..."));
        assert!(lines[9].contains("q Quit"));
    }

    #[test]
    fn svg_escapes_markup() {
        let mut app = DemoApp::new();
        app.focus = Some(0);
        let svg = app.render_svg(Size(40, 10));
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("[&gt;Run Selected&lt;]"));
    }
}
