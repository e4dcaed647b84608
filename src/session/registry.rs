use std::collections::BTreeMap;

use tracing::{debug, trace};

use super::TuiApp;
use crate::error::ResolutionError;

/// Constructor for a registered application.
pub type AppFactory = Box<dyn Fn() -> Box<dyn TuiApp> + Send + Sync>;

/// Maps `(app_module, app_class)` identifiers to application constructors.
///
/// The embedding program fills the registry at startup; configurations then
/// select an application by name.
#[derive(Default)]
pub struct AppRegistry {
    modules: BTreeMap<String, BTreeMap<String, AppFactory>>,
}

impl AppRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with the applications shipped in this crate.
    pub fn with_builtin_apps() -> Self {
        let mut registry = Self::new();
        crate::demo::register(&mut registry);
        registry
    }

    /// Register `factory` as `module`/`class`, replacing any previous entry.
    pub fn register<F>(&mut self, module: &str, class: &str, factory: F) -> &mut Self
    where
        F: Fn() -> Box<dyn TuiApp> + Send + Sync + 'static,
    {
        debug!(target: "tui_capture::registry", module, class, "Registering application");
        self.modules
            .entry(module.to_string())
            .or_default()
            .insert(class.to_string(), Box::new(factory));
        self
    }

    pub fn contains(&self, module: &str, class: &str) -> bool {
        self.modules
            .get(module)
            .is_some_and(|classes| classes.contains_key(class))
    }

    /// Registered `(module, class)` pairs in sorted order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.modules.iter().flat_map(|(module, classes)| {
            classes
                .keys()
                .map(move |class| (module.as_str(), class.as_str()))
        })
    }

    /// Instantiate the application registered as `module`/`class`.
    pub fn resolve(&self, module: &str, class: &str) -> Result<Box<dyn TuiApp>, ResolutionError> {
        let classes = self
            .modules
            .get(module)
            .ok_or_else(|| ResolutionError::UnknownModule {
                module: module.to_string(),
                class: class.to_string(),
            })?;
        let factory = classes
            .get(class)
            .ok_or_else(|| ResolutionError::UnknownClass {
                module: module.to_string(),
                class: class.to_string(),
            })?;
        trace!(target: "tui_capture::registry", module, class, "Resolved application");
        Ok(factory())
    }
}

impl std::fmt::Debug for AppRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.entries()).finish()
    }
}
