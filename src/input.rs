//! Input model: drag payloads, pointer targets, and the gesture state machine.
//!
//! Geometry is the host layer's business; by the time a pointer event reaches
//! the engine the host has already resolved what is under the pointer into a
//! [`PointerTarget`]. `InputState` is the active gesture tracked between
//! drag start and drop or cancel. [`UiState`] holds the one selection per
//! page shared by the canvas and the tree view.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::doc::{InstanceId, PageId};
use crate::registry::{Category, ComponentDefinition, ComponentKind};

/// Palette entry carried across the drag transfer channel.
///
/// Serialized at drag start and only decoded again at drop time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DragPayload {
    /// Registry type name.
    #[serde(rename = "type")]
    pub component_type: String,
    /// Palette label.
    pub label: String,
    /// Palette group.
    pub category: Category,
    /// Config the new instance should start from.
    #[serde(default)]
    pub default_config: Map<String, Value>,
}

impl DragPayload {
    /// Payload for a registry definition.
    #[must_use]
    pub fn from_definition(def: &ComponentDefinition) -> Self {
        Self {
            component_type: def.kind.as_str().to_owned(),
            label: def.label.clone(),
            category: def.category,
            default_config: def.default_config.clone(),
        }
    }

    /// Encode for the transfer channel.
    ///
    /// # Errors
    ///
    /// Returns the serializer error; only possible for non-string map keys.
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Decode a transfer-channel payload.
    ///
    /// # Errors
    ///
    /// Returns the parse error for malformed payloads.
    pub fn decode(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// The payload's kind, if it names a known type.
    #[must_use]
    pub fn kind(&self) -> Option<ComponentKind> {
        ComponentKind::parse(&self.component_type)
    }
}

/// What the host found under the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerTarget {
    /// Canvas background with no instance under the pointer.
    Background,
    /// The innermost rendered instance under the pointer.
    Instance(InstanceId),
    /// Outside the canvas entirely.
    Outside,
}

/// Where a drop would land.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropTarget {
    /// Page root.
    Root,
    /// Inside the given container, appended.
    Container(InstanceId),
}

impl DropTarget {
    /// The parent id a drop here would use.
    #[must_use]
    pub fn parent_id(self) -> Option<InstanceId> {
        match self {
            Self::Root => None,
            Self::Container(id) => Some(id),
        }
    }
}

/// Internal state for the drag-and-drop state machine.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum InputState {
    /// No gesture in progress.
    #[default]
    Idle,
    /// A palette entry is being dragged onto the canvas.
    DraggingPalette {
        /// Encoded [`DragPayload`], decoded at drop time.
        payload: String,
        /// Drop target currently highlighted, if any.
        hover: Option<DropTarget>,
    },
    /// An existing instance is being moved.
    MovingInstance {
        /// Id of the instance being moved.
        id: InstanceId,
        /// Drop target currently highlighted, if any.
        hover: Option<DropTarget>,
    },
}

impl InputState {
    /// Whether a drag is in flight.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        !matches!(self, Self::Idle)
    }

    /// The highlighted drop target of the in-flight drag.
    #[must_use]
    pub fn hover(&self) -> Option<DropTarget> {
        match self {
            Self::Idle => None,
            Self::DraggingPalette { hover, .. } | Self::MovingInstance { hover, .. } => *hover,
        }
    }

    pub(crate) fn set_hover(&mut self, target: Option<DropTarget>) {
        match self {
            Self::Idle => {}
            Self::DraggingPalette { hover, .. } | Self::MovingInstance { hover, .. } => *hover = target,
        }
    }
}

/// Persistent UI state shared by every view.
#[derive(Debug, Clone, Default)]
pub struct UiState {
    selected: HashMap<PageId, InstanceId>,
}

impl UiState {
    /// The selected instance on `page`, if any.
    #[must_use]
    pub fn selected(&self, page: &PageId) -> Option<InstanceId> {
        self.selected.get(page).copied()
    }

    /// Replace the selection on `page`. Returns true if it changed.
    pub fn select(&mut self, page: PageId, id: Option<InstanceId>) -> bool {
        let previous = match id {
            Some(id) => self.selected.insert(page, id),
            None => self.selected.remove(&page),
        };
        previous != id
    }

    /// Clear the selection on `page` if it is any of `ids`. Returns true if cleared.
    pub fn deselect_any(&mut self, page: &PageId, ids: &[InstanceId]) -> bool {
        if self.selected(page).is_some_and(|sel| ids.contains(&sel)) {
            self.selected.remove(page);
            return true;
        }
        false
    }
}
