//! Per-user inspector layout settings.
//!
//! The host injects a [`SettingsStore`]; the inspector treats what it holds as
//! an opaque blob keyed by user and panel. Nothing here touches the document.

#[cfg(test)]
#[path = "settings_test.rs"]
mod settings_test;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Injected key-value side channel for layout settings.
pub trait SettingsStore {
    /// Stored blob for `(user, panel)`, if any.
    fn get(&self, user: &str, panel: &str) -> Option<Value>;
    fn save(&mut self, user: &str, panel: &str, settings: Value);
}

/// Adapts a pair of host closures into a [`SettingsStore`].
pub struct FnSettings<G, S> {
    get: G,
    save: S,
}

impl<G, S> FnSettings<G, S>
where
    G: Fn(&str, &str) -> Option<Value>,
    S: FnMut(&str, &str, Value),
{
    pub fn new(get: G, save: S) -> Self {
        Self { get, save }
    }
}

impl<G, S> SettingsStore for FnSettings<G, S>
where
    G: Fn(&str, &str) -> Option<Value>,
    S: FnMut(&str, &str, Value),
{
    fn get(&self, user: &str, panel: &str) -> Option<Value> {
        (self.get)(user, panel)
    }

    fn save(&mut self, user: &str, panel: &str, settings: Value) {
        (self.save)(user, panel, settings);
    }
}

/// In-process store, for tests and hosts without persistence.
#[derive(Debug, Clone, Default)]
pub struct MemorySettings {
    entries: HashMap<(String, String), Value>,
}

impl MemorySettings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemorySettings {
    fn get(&self, user: &str, panel: &str) -> Option<Value> {
        self.entries.get(&(user.to_owned(), panel.to_owned())).cloned()
    }

    fn save(&mut self, user: &str, panel: &str, settings: Value) {
        self.entries.insert((user.to_owned(), panel.to_owned()), settings);
    }
}

/// Which inspector sections the user has folded away.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectorLayout {
    #[serde(default)]
    pub collapsed_sections: Vec<String>,
}

impl InspectorLayout {
    /// Load the layout for `(user, panel)`. A missing blob gives the default
    /// layout; so does a malformed one, with a warning.
    #[must_use]
    pub fn load(store: &dyn SettingsStore, user: &str, panel: &str) -> Self {
        let Some(blob) = store.get(user, panel) else {
            return Self::default();
        };
        match serde_json::from_value(blob) {
            Ok(layout) => layout,
            Err(e) => {
                tracing::warn!(user, panel, error = %e, "malformed inspector layout, using defaults");
                Self::default()
            }
        }
    }

    pub fn save(&self, store: &mut dyn SettingsStore, user: &str, panel: &str) {
        match serde_json::to_value(self) {
            Ok(blob) => store.save(user, panel, blob),
            Err(e) => tracing::warn!(user, panel, error = %e, "inspector layout not saved"),
        }
    }

    #[must_use]
    pub fn is_collapsed(&self, section: &str) -> bool {
        self.collapsed_sections.iter().any(|s| s == section)
    }

    /// Flip a section. Returns true if it is now collapsed.
    pub fn toggle(&mut self, section: &str) -> bool {
        if let Some(pos) = self.collapsed_sections.iter().position(|s| s == section) {
            self.collapsed_sections.remove(pos);
            false
        } else {
            self.collapsed_sections.push(section.to_owned());
            true
        }
    }
}
