/*!
Automation session interface.

The runner never talks to a UI framework directly. It resolves a [`TuiApp`]
from the [`AppRegistry`], asks it to open a sized session, and drives the
returned [`Pilot`]:

- `press` / `click` simulate input and return once the application has
  processed it.
- `pause` suspends the sequence (default: a Tokio sleep).
- `save_screenshot` / `save_text` / `save_tooltips` render the current screen
  to a file.
- `close` shuts the application down and releases the session.

Implementations report failures with [`SessionError`]; recoverable variants
(unknown key, no matching widget) let the sequence continue.
*/

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::Size;
use crate::error::SessionError;

pub mod registry;

pub use registry::{AppFactory, AppRegistry};

/// An application that can be started under automation.
pub trait TuiApp: Send {
    /// Start the application headless at `size` and hand back its pilot.
    fn open(self: Box<Self>, size: Size) -> Result<Box<dyn Pilot>, SessionError>;
}

/// Handle driving a running application.
#[async_trait]
pub trait Pilot: Send {
    /// Send a single key, e.g. `"tab"`, `"enter"`, `"a"`.
    async fn press(&mut self, key: &str) -> Result<(), SessionError>;

    /// Click the widget matched by `selector`, e.g. `"Button#RunSelected"`.
    async fn click(&mut self, selector: &str) -> Result<(), SessionError>;

    /// Suspend the sequence for `duration`. The default sleeps on the Tokio
    /// timer; backends with their own clock may override it.
    async fn pause(&mut self, duration: Duration) -> Result<(), SessionError> {
        tokio::time::sleep(duration).await;
        Ok(())
    }

    /// Write a vector rendering (SVG) of the current screen.
    async fn save_screenshot(&mut self, path: &Path) -> Result<(), SessionError>;

    /// Write the current screen as plain text.
    async fn save_text(&mut self, path: &Path) -> Result<(), SessionError>;

    /// Write the tooltip overlay of the current screen as plain text.
    async fn save_tooltips(&mut self, path: &Path) -> Result<(), SessionError>;

    /// Shut the application down. Further calls are expected to fail with
    /// [`SessionError::Closed`].
    async fn close(&mut self) -> Result<(), SessionError>;
}
