//! Engine core: wires the document store to the canvas, tree and inspector.
//!
//! DESIGN
//! ======
//! `EngineCore` is the single owner of editor state. The host forwards
//! resolved input (palette drags, pointer targets, clicks in the tree, field
//! edits) and gets back a list of [`Action`]s describing what changed. Views
//! are never cached: after any action the host asks for a fresh
//! [`CanvasFrame`], tree rows, or inspector form.
//!
//! Drag and drop is a short gesture: begin, pointer moves, then drop or cancel.
//! Only a drop on a valid target mutates the store; everything else returns
//! `DropRejected` or `DragCancelled` and leaves the document untouched.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use std::sync::Arc;

use serde_json::Value;

use crate::canvas::{CanvasFrame, CanvasView};
use crate::config::EditorConfig;
use crate::doc::{DocStore, InstanceId, NewComponent, Page, PageId, PartialComponent, StoreError};
use crate::input::{DragPayload, DropTarget, InputState, PointerTarget, UiState};
use crate::inspector::{FieldError, Inspector, InspectorForm, StructuredEdit};
use crate::registry::{ComponentKind, Registry};
use crate::tree::{TreeRow, TreeView};

/// Why a drop (or move) did not happen.
#[derive(Debug, Clone, PartialEq)]
pub enum DropRejection {
    /// No drag gesture was in flight.
    NotDragging,
    /// No page is active.
    NoActivePage,
    /// The pointer is over an instance that cannot hold children.
    NotAContainer(InstanceId),
    /// The transfer payload could not be decoded.
    BadPayload(String),
    /// The store refused the mutation.
    Store(StoreError),
}

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    InstanceCreated { page_id: PageId, id: InstanceId },
    InstanceMoved { page_id: PageId, id: InstanceId, parent: Option<InstanceId> },
    InstanceUpdated { page_id: PageId, id: InstanceId },
    /// Removed ids, the target first.
    InstancesDeleted { page_id: PageId, ids: Vec<InstanceId> },
    SelectionChanged { page_id: PageId, id: Option<InstanceId> },
    HighlightChanged(Option<DropTarget>),
    DropRejected(DropRejection),
    DragCancelled,
    RenderNeeded,
}

/// Core engine state.
pub struct EngineCore {
    pub doc: DocStore,
    pub ui: UiState,
    pub input: InputState,
    pub canvas: CanvasView,
    pub tree: TreeView,
    pub inspector: Inspector,
    active_page: Option<PageId>,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self::new(Arc::new(Registry::builtin()), &EditorConfig::default())
    }
}

impl EngineCore {
    #[must_use]
    pub fn new(registry: Arc<Registry>, config: &EditorConfig) -> Self {
        Self {
            doc: DocStore::new(registry).with_default_size(config.default_size.clone()),
            ui: UiState::default(),
            input: InputState::default(),
            canvas: CanvasView::new(),
            tree: TreeView::new(config.tree_indent),
            inspector: Inspector::new(config.literal_limits),
            active_page: None,
        }
    }

    // --- Pages ---

    /// Create a page. The first page created becomes active.
    pub fn create_page(&mut self, name: &str, route: &str) -> PageId {
        let page_id = self.doc.create_page(name, route);
        if self.active_page.is_none() {
            self.active_page = Some(page_id);
        }
        page_id
    }

    /// Load a page definition and make it active.
    ///
    /// # Errors
    ///
    /// Returns the store's validation error; nothing is loaded in that case.
    pub fn load_page(&mut self, definition: Page) -> Result<PageId, StoreError> {
        let page_id = self.doc.import_page(definition)?;
        self.active_page = Some(page_id);
        Ok(page_id)
    }

    /// Switch the active page. Returns false for an unknown page.
    pub fn set_active_page(&mut self, page_id: PageId) -> bool {
        if self.doc.page(&page_id).is_none() {
            return false;
        }
        self.active_page = Some(page_id);
        self.input = InputState::Idle;
        true
    }

    #[must_use]
    pub fn active_page(&self) -> Option<PageId> {
        self.active_page
    }

    // --- Selection ---

    /// The selected instance on the active page, if any.
    #[must_use]
    pub fn selection(&self) -> Option<InstanceId> {
        self.active_page.and_then(|page| self.ui.selected(&page))
    }

    /// Select an instance (from the canvas or the tree), or clear with `None`.
    pub fn select(&mut self, id: Option<InstanceId>) -> Vec<Action> {
        let Some(page_id) = self.active_page else {
            return Vec::new();
        };
        if let Some(id) = id {
            if self.doc.get_component(&page_id, &id).is_none() {
                return Vec::new();
            }
        }
        if self.ui.select(page_id, id) {
            vec![Action::SelectionChanged { page_id, id }, Action::RenderNeeded]
        } else {
            Vec::new()
        }
    }

    // --- Drag and drop ---

    /// Start dragging a palette entry.
    pub fn begin_palette_drag(&mut self, kind: ComponentKind) -> Vec<Action> {
        let Some(def) = self.doc.registry().get(kind) else {
            return vec![Action::DropRejected(DropRejection::Store(StoreError::UnknownType(kind.as_str().to_owned())))];
        };
        match DragPayload::from_definition(def).encode() {
            Ok(payload) => self.begin_payload_drag(&payload),
            Err(e) => vec![Action::DropRejected(DropRejection::BadPayload(e.to_string()))],
        }
    }

    /// Start dragging a host-supplied transfer payload. It is only decoded
    /// at drop time.
    pub fn begin_payload_drag(&mut self, payload: &str) -> Vec<Action> {
        self.input = InputState::DraggingPalette { payload: payload.to_owned(), hover: None };
        Vec::new()
    }

    /// Start moving an existing instance.
    pub fn begin_move(&mut self, id: InstanceId) -> Vec<Action> {
        let Some(page_id) = self.active_page else {
            return vec![Action::DropRejected(DropRejection::NoActivePage)];
        };
        if self.doc.get_component(&page_id, &id).is_none() {
            return vec![Action::DropRejected(DropRejection::Store(StoreError::NotFound(id)))];
        }
        self.input = InputState::MovingInstance { id, hover: None };
        Vec::new()
    }

    /// Update the drop highlight for the pointer's current target.
    pub fn pointer_move(&mut self, target: PointerTarget) -> Vec<Action> {
        if !self.input.is_dragging() {
            return Vec::new();
        }
        let moving = matches!(self.input, InputState::MovingInstance { .. });
        let highlight = match self.resolve_drop(target, moving) {
            Ok(Some(drop)) if self.accepts(drop) => Some(drop),
            _ => None,
        };
        if highlight == self.input.hover() {
            return Vec::new();
        }
        self.input.set_hover(highlight);
        vec![Action::HighlightChanged(highlight), Action::RenderNeeded]
    }

    /// Finish the gesture over `target`.
    pub fn drop_on(&mut self, target: PointerTarget) -> Vec<Action> {
        let gesture = std::mem::take(&mut self.input);
        let had_highlight = gesture.hover().is_some();
        let mut actions = Vec::new();
        if had_highlight {
            actions.push(Action::HighlightChanged(None));
        }

        let Some(page_id) = self.active_page else {
            actions.push(Action::DropRejected(DropRejection::NoActivePage));
            return actions;
        };
        if matches!(gesture, InputState::Idle) {
            actions.push(Action::DropRejected(DropRejection::NotDragging));
            return actions;
        }

        let moving = matches!(gesture, InputState::MovingInstance { .. });
        let drop = match self.resolve_drop(target, moving) {
            Ok(Some(drop)) => drop,
            Ok(None) => {
                tracing::debug!(%page_id, "drag cancelled outside canvas");
                actions.extend([Action::DragCancelled, Action::RenderNeeded]);
                return actions;
            }
            Err(reason) => {
                tracing::warn!(%page_id, ?reason, "drop rejected");
                actions.extend([Action::DropRejected(reason), Action::RenderNeeded]);
                return actions;
            }
        };

        let outcome = match gesture {
            InputState::Idle => Err(DropRejection::NotDragging),
            InputState::DraggingPalette { payload, .. } => self.drop_payload(page_id, &payload, drop),
            InputState::MovingInstance { id, .. } => self
                .doc
                .reparent(&page_id, &id, drop.parent_id(), None)
                .map(|()| vec![Action::InstanceMoved { page_id, id, parent: drop.parent_id() }])
                .map_err(DropRejection::Store),
        };
        match outcome {
            Ok(done) => actions.extend(done),
            Err(reason) => {
                tracing::warn!(%page_id, ?reason, "drop rejected");
                actions.push(Action::DropRejected(reason));
            }
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Abandon the gesture without touching the store.
    pub fn cancel_drag(&mut self) -> Vec<Action> {
        let gesture = std::mem::take(&mut self.input);
        match gesture {
            InputState::Idle => Vec::new(),
            _ if gesture.hover().is_some() => {
                vec![Action::HighlightChanged(None), Action::DragCancelled, Action::RenderNeeded]
            }
            _ => vec![Action::DragCancelled],
        }
    }

    /// Where a drop over `target` would land. `Ok(None)` means outside the
    /// canvas. Palette drops onto leaves and unknown types are rejected; a
    /// move over one lands in its nearest container ancestor, or at root.
    fn resolve_drop(&self, target: PointerTarget, moving: bool) -> Result<Option<DropTarget>, DropRejection> {
        let page_id = self.active_page.ok_or(DropRejection::NoActivePage)?;
        match target {
            PointerTarget::Outside => Ok(None),
            PointerTarget::Background => Ok(Some(DropTarget::Root)),
            PointerTarget::Instance(id) => {
                let inst = self
                    .doc
                    .get_component(&page_id, &id)
                    .ok_or(DropRejection::Store(StoreError::NotFound(id)))?;
                let registry = self.doc.registry();
                if registry.is_container(&inst.component_type) {
                    Ok(Some(DropTarget::Container(id)))
                } else if moving {
                    let container = self.doc.ancestors(&page_id, &id).into_iter().find(|ancestor| {
                        self.doc
                            .get_component(&page_id, ancestor)
                            .is_some_and(|a| registry.is_container(&a.component_type))
                    });
                    Ok(Some(container.map_or(DropTarget::Root, DropTarget::Container)))
                } else {
                    Err(DropRejection::NotAContainer(id))
                }
            }
        }
    }

    /// Whether the in-flight gesture may land on `drop`. A moved instance
    /// cannot land inside itself.
    fn accepts(&self, drop: DropTarget) -> bool {
        match (&self.input, drop, self.active_page) {
            (InputState::MovingInstance { id, .. }, DropTarget::Container(parent), Some(page_id)) => {
                *id != parent && !self.doc.descendants(&page_id, id).contains(&parent)
            }
            _ => true,
        }
    }

    fn drop_payload(&mut self, page_id: PageId, raw: &str, drop: DropTarget) -> Result<Vec<Action>, DropRejection> {
        let payload = DragPayload::decode(raw).map_err(|e| DropRejection::BadPayload(e.to_string()))?;
        let request = NewComponent::new(&payload.component_type)
            .with_parent(drop.parent_id())
            .with_config(payload.default_config);
        let id = self.doc.add_component(&page_id, request).map_err(DropRejection::Store)?;
        let mut actions = vec![Action::InstanceCreated { page_id, id }];
        if self.ui.select(page_id, Some(id)) {
            actions.push(Action::SelectionChanged { page_id, id: Some(id) });
        }
        Ok(actions)
    }

    // --- Structure edits ---

    /// Move an instance directly (tree drag, keyboard reorder).
    pub fn move_instance(&mut self, id: InstanceId, parent: Option<InstanceId>, position: Option<usize>) -> Vec<Action> {
        let Some(page_id) = self.active_page else {
            return vec![Action::DropRejected(DropRejection::NoActivePage)];
        };
        match self.doc.reparent(&page_id, &id, parent, position) {
            Ok(()) => vec![Action::InstanceMoved { page_id, id, parent }, Action::RenderNeeded],
            Err(e) => vec![Action::DropRejected(DropRejection::Store(e))],
        }
    }

    /// Delete an instance and its subtree. Clears the selection if it was
    /// inside, and forgets per-instance view state.
    pub fn delete(&mut self, id: InstanceId) -> Vec<Action> {
        let Some(page_id) = self.active_page else {
            return Vec::new();
        };
        let ids = self.doc.delete_component(&page_id, &id);
        if ids.is_empty() {
            return Vec::new();
        }
        self.canvas.forget(&ids);
        self.tree.forget(&ids);
        self.inspector.forget(&ids);
        if let InputState::MovingInstance { id: moving, .. } = &self.input {
            if ids.contains(moving) {
                self.input = InputState::Idle;
            }
        }

        let mut actions = Vec::new();
        if self.ui.deselect_any(&page_id, &ids) {
            actions.push(Action::SelectionChanged { page_id, id: None });
        }
        actions.push(Action::InstancesDeleted { page_id, ids });
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Delete the current selection, if any.
    pub fn delete_selected(&mut self) -> Vec<Action> {
        match self.selection() {
            Some(id) => self.delete(id),
            None => Vec::new(),
        }
    }

    /// Duplicate an instance's subtree next to it and select the copy.
    pub fn duplicate(&mut self, id: InstanceId) -> Vec<Action> {
        let Some(page_id) = self.active_page else {
            return Vec::new();
        };
        match self.doc.duplicate_component(&page_id, &id) {
            Ok(copy) => {
                let mut actions = vec![Action::InstanceCreated { page_id, id: copy }];
                actions.extend(self.select(Some(copy)));
                if !actions.contains(&Action::RenderNeeded) {
                    actions.push(Action::RenderNeeded);
                }
                actions
            }
            Err(e) => {
                tracing::warn!(%page_id, %id, error = %e, "duplicate failed");
                Vec::new()
            }
        }
    }

    /// Apply a raw partial update.
    pub fn update(&mut self, id: InstanceId, partial: &PartialComponent) -> Vec<Action> {
        let Some(page_id) = self.active_page else {
            return Vec::new();
        };
        if self.doc.update_component(&page_id, &id, partial) {
            vec![Action::InstanceUpdated { page_id, id }, Action::RenderNeeded]
        } else {
            Vec::new()
        }
    }

    // --- Inspector ---

    /// Form for the current selection.
    #[must_use]
    pub fn inspect(&self) -> Option<InspectorForm> {
        let page_id = self.active_page?;
        let id = self.selection()?;
        self.inspector.inspect(&self.doc, &page_id, &id)
    }

    /// Set a config field of the selected instance.
    ///
    /// # Errors
    ///
    /// Returns the inspector's [`FieldError`]; nothing changes in that case.
    pub fn set_field(&mut self, key: &str, value: Value) -> Result<Vec<Action>, FieldError> {
        let (page_id, id) = self.selected_pair()?;
        self.inspector.set_field(&mut self.doc, &page_id, &id, key, value)?;
        Ok(vec![Action::InstanceUpdated { page_id, id }, Action::RenderNeeded])
    }

    /// Feed free text to a structured field of the selected instance.
    ///
    /// # Errors
    ///
    /// Returns the inspector's [`FieldError`] for a bad field. Decode
    /// failures are not errors; they come back as [`StructuredEdit::Invalid`].
    pub fn edit_structured(&mut self, key: &str, text: &str) -> Result<(StructuredEdit, Vec<Action>), FieldError> {
        let (page_id, id) = self.selected_pair()?;
        let outcome = self.inspector.edit_structured(&mut self.doc, &page_id, &id, key, text)?;
        let actions = match outcome {
            StructuredEdit::Committed { .. } => vec![Action::InstanceUpdated { page_id, id }, Action::RenderNeeded],
            StructuredEdit::Invalid { .. } => vec![Action::RenderNeeded],
        };
        Ok((outcome, actions))
    }

    fn selected_pair(&self) -> Result<(PageId, InstanceId), FieldError> {
        let page_id = self.active_page.ok_or(FieldError::NoSelection)?;
        let id = self.ui.selected(&page_id).ok_or(FieldError::NoSelection)?;
        Ok((page_id, id))
    }

    // --- Views ---

    /// Flip a container's collapse state on the canvas.
    pub fn toggle_canvas_collapsed(&mut self, id: InstanceId) -> Vec<Action> {
        self.canvas.toggle_collapsed(id);
        vec![Action::RenderNeeded]
    }

    /// Flip a node's expand state in the tree view.
    pub fn toggle_tree_expanded(&mut self, id: InstanceId) -> Vec<Action> {
        self.tree.toggle(id);
        vec![Action::RenderNeeded]
    }

    /// Render the active page's canvas.
    #[must_use]
    pub fn render_canvas(&self) -> CanvasFrame {
        match self.active_page {
            Some(page_id) => self.canvas.render(&self.doc, &page_id, self.ui.selected(&page_id), self.input.hover()),
            None => CanvasFrame::default(),
        }
    }

    /// Visible tree rows for the active page.
    #[must_use]
    pub fn tree_rows(&self) -> Vec<TreeRow> {
        match self.active_page {
            Some(page_id) => self.tree.rows(&self.doc, &page_id, self.ui.selected(&page_id)),
            None => Vec::new(),
        }
    }
}
