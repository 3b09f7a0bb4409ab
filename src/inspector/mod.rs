//! Property inspector: schema-driven editing of the selected instance.
//!
//! DESIGN
//! ======
//! The inspector owns no document data. Each edit reads the instance from the
//! [`DocStore`], validates or decodes the incoming value, and commits a single
//! `update_component` call. What it does own is transient editing state:
//!
//! - structured-field text buffers and their invalid flags, so a failed
//!   decode keeps the user's keystrokes while the store keeps the last good
//!   value;
//! - per-element collapse flags of array editors;
//! - the section layout loaded from the injected settings store.
//!
//! Failures never escape as panics. Structural problems come back as
//! [`FieldError`]; decode failures become a per-field invalid flag.

pub mod array;
pub mod form;
pub mod literal;
pub mod settings;

#[cfg(test)]
#[path = "inspector_test.rs"]
mod inspector_test;

use std::collections::{HashMap, HashSet};

use serde_json::Value;

use crate::doc::{DocStore, InstanceId, PageId, PartialComponent, PartialSize};
use crate::registry::{ConfigField, FieldKind};

pub use array::ArrayPath;
pub use form::{FieldError, FormState, InspectorForm, SizeKey, StyleKey};
pub use literal::{DecodeError, DecodeLimits, DecodeStage};
pub use settings::{InspectorLayout, SettingsStore};

/// Outcome of a structured-field text edit.
#[derive(Debug, Clone, PartialEq)]
pub enum StructuredEdit {
    /// Decoded and written to the store.
    Committed { stage: DecodeStage, value: Value },
    /// Rejected; the buffer is kept and the field flagged.
    Invalid { error: DecodeError },
}

#[derive(Debug, Clone)]
struct Buffer {
    text: String,
    invalid: bool,
}

/// Inspector editing state.
#[derive(Debug, Clone, Default)]
pub struct Inspector {
    limits: DecodeLimits,
    buffers: HashMap<(InstanceId, String), Buffer>,
    collapsed_items: HashSet<(InstanceId, String)>,
    layout: InspectorLayout,
}

impl Inspector {
    #[must_use]
    pub fn new(limits: DecodeLimits) -> Self {
        Self { limits, ..Self::default() }
    }

    #[must_use]
    pub fn limits(&self) -> DecodeLimits {
        self.limits
    }

    #[must_use]
    pub fn layout(&self) -> &InspectorLayout {
        &self.layout
    }

    /// Build the form for an instance, or `None` if it doesn't exist.
    #[must_use]
    pub fn inspect(&self, doc: &DocStore, page_id: &PageId, id: &InstanceId) -> Option<InspectorForm> {
        let inst = doc.get_component(page_id, id)?;
        let def = doc.registry().lookup(&inst.component_type);
        Some(form::build_form(def, inst, self))
    }

    /// Whether the last structured edit of `key` failed to decode.
    #[must_use]
    pub fn is_invalid(&self, id: &InstanceId, key: &str) -> bool {
        self.buffers.get(&(*id, key.to_owned())).is_some_and(|b| b.invalid)
    }

    /// Set a config field from a control value, coercing by field kind.
    ///
    /// # Errors
    ///
    /// Fails for a missing instance, an unknown field, or a value that does
    /// not coerce; the store is unchanged in each case.
    pub fn set_field(
        &mut self,
        doc: &mut DocStore,
        page_id: &PageId,
        id: &InstanceId,
        key: &str,
        value: Value,
    ) -> Result<(), FieldError> {
        let field = schema_field(doc, page_id, id, key)?;
        let value = form::coerce(&field, value)?;
        self.commit(doc, page_id, id, key, value)
    }

    /// Decode free text into a structured or array field.
    ///
    /// On success the value is committed and the buffer cleared. On failure
    /// the store keeps its last value and the text is held as an invalid
    /// buffer.
    ///
    /// # Errors
    ///
    /// Fails for a missing instance or a field that doesn't take free text.
    pub fn edit_structured(
        &mut self,
        doc: &mut DocStore,
        page_id: &PageId,
        id: &InstanceId,
        key: &str,
        text: &str,
    ) -> Result<StructuredEdit, FieldError> {
        let field = schema_field(doc, page_id, id, key)?;
        if !matches!(field.kind, FieldKind::Structured | FieldKind::Array) {
            return Err(FieldError::TypeMismatch { key: key.to_owned(), expected: "text" });
        }

        let decoded = literal::decode(text, &self.limits).and_then(|decoded| {
            if field.kind == FieldKind::Array && !decoded.value.is_array() {
                return Err(DecodeError::Rejected { reason: format!("{key} expects a list") });
            }
            Ok(decoded)
        });

        match decoded {
            Ok(decoded) => {
                self.commit(doc, page_id, id, key, decoded.value.clone())?;
                tracing::debug!(%page_id, %id, key, stage = ?decoded.stage, "structured field committed");
                Ok(StructuredEdit::Committed { stage: decoded.stage, value: decoded.value })
            }
            Err(error) => {
                tracing::warn!(%page_id, %id, key, reason = %error, "structured field rejected");
                self.buffers.insert((*id, key.to_owned()), Buffer { text: text.to_owned(), invalid: true });
                Ok(StructuredEdit::Invalid { error })
            }
        }
    }

    /// Append a seeded element to the list at `path`. Returns its index.
    ///
    /// # Errors
    ///
    /// Fails if the instance or list doesn't exist.
    pub fn add_item(
        &mut self,
        doc: &mut DocStore,
        page_id: &PageId,
        id: &InstanceId,
        path: &ArrayPath,
    ) -> Result<usize, FieldError> {
        self.edit_array(doc, page_id, id, path, |root, field| array::push_item(root, field, path))
    }

    /// Remove element `index` of the list at `path`.
    ///
    /// # Errors
    ///
    /// Fails if the instance, list or element doesn't exist.
    pub fn remove_item(
        &mut self,
        doc: &mut DocStore,
        page_id: &PageId,
        id: &InstanceId,
        path: &ArrayPath,
        index: usize,
    ) -> Result<Value, FieldError> {
        let removed = self.edit_array(doc, page_id, id, path, |root, field| array::remove_item(root, field, path, index))?;
        self.shift_collapsed(id, path, index);
        Ok(removed)
    }

    /// Set one field of one element of the list at `path`.
    ///
    /// # Errors
    ///
    /// Fails if the instance, list, element or item field doesn't exist, or
    /// if the value does not coerce.
    #[allow(clippy::too_many_arguments)]
    pub fn set_item_field(
        &mut self,
        doc: &mut DocStore,
        page_id: &PageId,
        id: &InstanceId,
        path: &ArrayPath,
        index: usize,
        key: &str,
        value: Value,
    ) -> Result<(), FieldError> {
        self.edit_array(doc, page_id, id, path, |root, field| {
            array::set_item_field(root, field, path, index, key, value)
        })
    }

    /// Flip an array element's collapse flag. Returns true if now collapsed.
    pub fn toggle_item_collapsed(&mut self, id: &InstanceId, path: &ArrayPath, index: usize) -> bool {
        let entry = (*id, path.item_key(index));
        if self.collapsed_items.remove(&entry) {
            false
        } else {
            self.collapsed_items.insert(entry);
            true
        }
    }

    /// Write one fixed style control. An empty value clears the override.
    ///
    /// # Errors
    ///
    /// Fails if the instance doesn't exist.
    pub fn set_style(
        &mut self,
        doc: &mut DocStore,
        page_id: &PageId,
        id: &InstanceId,
        key: StyleKey,
        value: &str,
    ) -> Result<(), FieldError> {
        let partial = PartialComponent { style: Some(key.overrides(value.trim())), ..PartialComponent::default() };
        if doc.update_component(page_id, id, &partial) { Ok(()) } else { Err(FieldError::InstanceNotFound(*id)) }
    }

    /// Write width or height.
    ///
    /// # Errors
    ///
    /// Fails if the instance doesn't exist or the value is blank.
    pub fn set_size(
        &mut self,
        doc: &mut DocStore,
        page_id: &PageId,
        id: &InstanceId,
        key: SizeKey,
        value: &str,
    ) -> Result<(), FieldError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(FieldError::TypeMismatch { key: format!("{key:?}").to_lowercase(), expected: "size" });
        }
        let size = match key {
            SizeKey::Width => PartialSize { width: Some(value.to_owned()), height: None },
            SizeKey::Height => PartialSize { width: None, height: Some(value.to_owned()) },
        };
        let partial = PartialComponent { size: Some(size), ..PartialComponent::default() };
        if doc.update_component(page_id, id, &partial) { Ok(()) } else { Err(FieldError::InstanceNotFound(*id)) }
    }

    /// Flip an inspector section. Returns true if now collapsed.
    pub fn toggle_section(&mut self, section: &str) -> bool {
        self.layout.toggle(section)
    }

    pub fn load_layout(&mut self, store: &dyn SettingsStore, user: &str, panel: &str) {
        self.layout = InspectorLayout::load(store, user, panel);
    }

    pub fn save_layout(&self, store: &mut dyn SettingsStore, user: &str, panel: &str) {
        self.layout.save(store, user, panel);
    }

    /// Drop editing state for deleted instances.
    pub fn forget(&mut self, ids: &[InstanceId]) {
        let gone: HashSet<&InstanceId> = ids.iter().collect();
        self.buffers.retain(|(id, _), _| !gone.contains(id));
        self.collapsed_items.retain(|(id, _)| !gone.contains(id));
    }

    fn commit(
        &mut self,
        doc: &mut DocStore,
        page_id: &PageId,
        id: &InstanceId,
        key: &str,
        value: Value,
    ) -> Result<(), FieldError> {
        if !doc.update_component(page_id, id, &PartialComponent::config_value(key, value)) {
            return Err(FieldError::InstanceNotFound(*id));
        }
        self.buffers.remove(&(*id, key.to_owned()));
        Ok(())
    }

    /// Run `edit` on a detached copy of the top-level array value and commit
    /// the result.
    fn edit_array<T>(
        &mut self,
        doc: &mut DocStore,
        page_id: &PageId,
        id: &InstanceId,
        path: &ArrayPath,
        edit: impl FnOnce(&mut Value, &ConfigField) -> Result<T, FieldError>,
    ) -> Result<T, FieldError> {
        let field = schema_field(doc, page_id, id, &path.key)?;
        let mut root = doc
            .get_component(page_id, id)
            .and_then(|inst| inst.config.get(&path.key))
            .unwrap_or(&field.default_value)
            .clone();
        let out = edit(&mut root, &field)?;
        self.commit(doc, page_id, id, &path.key, root)?;
        Ok(out)
    }

    /// Re-key collapse flags after element `removed` of `path` is deleted:
    /// flags of that element and its nested lists go, later elements move
    /// down by one.
    fn shift_collapsed(&mut self, id: &InstanceId, path: &ArrayPath, removed: usize) {
        let prefix = format!("{path}[");
        let shifted: Vec<(InstanceId, String)> = self
            .collapsed_items
            .iter()
            .filter(|(owner, key)| owner == id && key.starts_with(&prefix))
            .cloned()
            .collect();
        for entry in shifted {
            self.collapsed_items.remove(&entry);
            let rest = &entry.1[prefix.len()..];
            let Some(close) = rest.find(']') else {
                continue;
            };
            let Ok(index) = rest[..close].parse::<usize>() else {
                continue;
            };
            if index > removed {
                self.collapsed_items.insert((*id, format!("{prefix}{}{}", index - 1, &rest[close..])));
            }
        }
    }
}

impl FormState for Inspector {
    fn structured_buffer(&self, id: &InstanceId, key: &str) -> Option<(&str, bool)> {
        self.buffers.get(&(*id, key.to_owned())).map(|b| (b.text.as_str(), b.invalid))
    }

    fn item_collapsed(&self, id: &InstanceId, path: &ArrayPath, index: usize) -> bool {
        self.collapsed_items.contains(&(*id, path.item_key(index)))
    }

    fn section_collapsed(&self, section: &str) -> bool {
        self.layout.is_collapsed(section)
    }
}

/// Schema entry for `key` on an existing instance.
fn schema_field(doc: &DocStore, page_id: &PageId, id: &InstanceId, key: &str) -> Result<ConfigField, FieldError> {
    let inst = doc.get_component(page_id, id).ok_or(FieldError::InstanceNotFound(*id))?;
    doc.registry()
        .lookup(&inst.component_type)
        .and_then(|def| def.field(key))
        .cloned()
        .ok_or_else(|| FieldError::UnknownField(key.to_owned()))
}
