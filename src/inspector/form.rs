//! Inspector form view model and value coercion.
//!
//! The form is rebuilt from the store on every call; the only state it reads
//! besides the instance is the inspector's edit buffers and collapse flags,
//! passed in through [`FormState`].

#[cfg(test)]
#[path = "form_test.rs"]
mod form_test;

use serde::Serialize;
use serde_json::{Map, Value};

use super::array::{ArrayPath, item_title};
use super::literal::encode;
use crate::doc::{ComponentInstance, InstanceId, Size, StyleOverrides};
use crate::registry::{ComponentDefinition, ConfigField, FieldKind, number_value};

/// Why an inspector edit was refused. The store is unchanged in every case.
#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum FieldError {
    #[error("nothing is selected")]
    NoSelection,
    #[error("instance not found: {0}")]
    InstanceNotFound(InstanceId),
    #[error("unknown field: {0}")]
    UnknownField(String),
    #[error("field {key} expects a {expected} value")]
    TypeMismatch { key: String, expected: &'static str },
    #[error("{value:?} is not an option of {key}")]
    NotAnOption { key: String, value: String },
    #[error("{key} is not a list")]
    NotAList { key: String },
    #[error("{key}[{index}] is not an object")]
    NotAnObject { key: String, index: usize },
    #[error("{key} has no item {index} (length {len})")]
    IndexOutOfRange { key: String, index: usize, len: usize },
}

impl FieldError {
    /// Stable machine-readable code for the host layer.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NoSelection => "E_NO_SELECTION",
            Self::InstanceNotFound(_) => "E_INSTANCE_NOT_FOUND",
            Self::UnknownField(_) => "E_UNKNOWN_FIELD",
            Self::TypeMismatch { .. } => "E_TYPE_MISMATCH",
            Self::NotAnOption { .. } => "E_NOT_AN_OPTION",
            Self::NotAList { .. } => "E_NOT_A_LIST",
            Self::NotAnObject { .. } => "E_NOT_AN_OBJECT",
            Self::IndexOutOfRange { .. } => "E_INDEX_OUT_OF_RANGE",
        }
    }
}

/// Coerce a raw control value into the shape `field` stores.
///
/// `null` passes through for every kind and resets the field to its default.
///
/// # Errors
///
/// Returns a [`FieldError`] when the value cannot represent the field.
pub fn coerce(field: &ConfigField, value: Value) -> Result<Value, FieldError> {
    if value.is_null() {
        return Ok(value);
    }
    let mismatch = |expected| FieldError::TypeMismatch { key: field.key.clone(), expected };
    match field.kind {
        FieldKind::Text => match value {
            Value::String(_) => Ok(value),
            Value::Number(n) => Ok(Value::String(n.to_string())),
            Value::Bool(b) => Ok(Value::String(b.to_string())),
            _ => Err(mismatch("text")),
        },
        FieldKind::Number => match &value {
            Value::Number(_) => Ok(value),
            Value::String(s) => match s.trim().parse::<f64>() {
                Ok(n) if n.is_finite() => Ok(number_value(n)),
                _ => Err(mismatch("number")),
            },
            _ => Err(mismatch("number")),
        },
        FieldKind::Boolean => match &value {
            Value::Bool(_) => Ok(value),
            Value::String(s) if s == "true" => Ok(Value::Bool(true)),
            Value::String(s) if s == "false" => Ok(Value::Bool(false)),
            _ => Err(mismatch("boolean")),
        },
        FieldKind::Select => {
            let Value::String(choice) = &value else {
                return Err(mismatch("select"));
            };
            if field.options.is_empty() || field.options.contains(choice) {
                Ok(value)
            } else {
                Err(FieldError::NotAnOption { key: field.key.clone(), value: choice.clone() })
            }
        }
        FieldKind::Color => match value {
            Value::String(_) => Ok(value),
            _ => Err(mismatch("color")),
        },
        FieldKind::Array => match value {
            Value::Array(_) => Ok(value),
            _ => Err(FieldError::NotAList { key: field.key.clone() }),
        },
        FieldKind::Structured => Ok(value),
    }
}

// =============================================================
// View model
// =============================================================

/// Inspector sections, in display order.
pub const SECTIONS: [(&str, &str); 4] =
    [("properties", "Properties"), ("lists", "Lists"), ("style", "Style"), ("size", "Size")];

/// One rendered control.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "control", rename_all = "camelCase")]
pub enum FieldControl {
    Text { value: String },
    Number { value: Option<f64> },
    Boolean { value: bool },
    Select { value: String, options: Vec<String> },
    Color { value: String },
    /// Free-text entry. `buffer` holds the user's text when the last
    /// decode failed, otherwise the committed value re-encoded.
    Structured { buffer: String, invalid: bool },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldView {
    pub key: String,
    pub label: String,
    pub control: FieldControl,
}

/// A recursive list editor for one array-kind field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrayEditorView {
    pub path: ArrayPath,
    pub label: String,
    pub items: Vec<ArrayItemView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrayItemView {
    pub index: usize,
    /// "Column 1", "Column 2", ...
    pub title: String,
    pub collapsed: bool,
    pub fields: Vec<FieldView>,
    pub arrays: Vec<ArrayEditorView>,
}

/// One of the fixed style controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum StyleKey {
    Background,
    Padding,
    Margin,
    Gap,
    Border,
    BorderRadius,
}

impl StyleKey {
    pub const ALL: [Self; 6] =
        [Self::Background, Self::Padding, Self::Margin, Self::Gap, Self::Border, Self::BorderRadius];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Background => "Background",
            Self::Padding => "Padding",
            Self::Margin => "Margin",
            Self::Gap => "Gap",
            Self::Border => "Border",
            Self::BorderRadius => "Radius",
        }
    }

    #[must_use]
    pub fn read(self, style: &StyleOverrides) -> Option<&str> {
        match self {
            Self::Background => style.background.as_deref(),
            Self::Padding => style.padding.as_deref(),
            Self::Margin => style.margin.as_deref(),
            Self::Gap => style.gap.as_deref(),
            Self::Border => style.border.as_deref(),
            Self::BorderRadius => style.border_radius.as_deref(),
        }
    }

    /// A sparse override setting only this key.
    #[must_use]
    pub fn overrides(self, value: &str) -> StyleOverrides {
        let mut style = StyleOverrides::default();
        let slot = match self {
            Self::Background => &mut style.background,
            Self::Padding => &mut style.padding,
            Self::Margin => &mut style.margin,
            Self::Gap => &mut style.gap,
            Self::Border => &mut style.border,
            Self::BorderRadius => &mut style.border_radius,
        };
        *slot = Some(value.to_owned());
        style
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SizeKey {
    Width,
    Height,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleControl {
    pub key: StyleKey,
    pub label: &'static str,
    /// Empty when no override is set.
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionView {
    pub id: &'static str,
    pub title: &'static str,
    pub collapsed: bool,
}

/// Everything the host needs to paint the inspector for one instance.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectorForm {
    pub id: InstanceId,
    pub component_type: String,
    /// Palette label; `None` for unknown types.
    pub label: Option<String>,
    pub sections: Vec<SectionView>,
    /// Scalar and structured fields, in schema order.
    pub fields: Vec<FieldView>,
    /// Array-kind fields, grouped separately.
    pub arrays: Vec<ArrayEditorView>,
    pub style: Vec<StyleControl>,
    pub size: Size,
}

/// Inspector state consulted while building a form.
pub trait FormState {
    /// Pending text and invalid flag for a structured field, if any.
    fn structured_buffer(&self, id: &InstanceId, key: &str) -> Option<(&str, bool)>;
    fn item_collapsed(&self, id: &InstanceId, path: &ArrayPath, index: usize) -> bool;
    fn section_collapsed(&self, section: &str) -> bool;
}

/// Build the form for `inst`. Unknown types (`def == None`) get no schema
/// fields but keep the style and size controls.
#[must_use]
pub fn build_form(def: Option<&ComponentDefinition>, inst: &ComponentInstance, state: &dyn FormState) -> InspectorForm {
    let mut fields = Vec::new();
    let mut arrays = Vec::new();

    for field in def.map_or(&[][..], |d| d.config_schema.as_slice()) {
        let value = inst.config.get(&field.key).unwrap_or(&field.default_value);
        if field.kind == FieldKind::Array {
            let path = ArrayPath::root(&field.key);
            arrays.push(array_editor(field, value, path, &inst.id, state));
            continue;
        }
        let control = match state.structured_buffer(&inst.id, &field.key) {
            Some((buffer, invalid)) if field.kind == FieldKind::Structured => {
                FieldControl::Structured { buffer: buffer.to_owned(), invalid }
            }
            _ => control_for(field, value),
        };
        fields.push(FieldView { key: field.key.clone(), label: field.label.clone(), control });
    }

    InspectorForm {
        id: inst.id,
        component_type: inst.component_type.clone(),
        label: def.map(|d| d.label.clone()),
        sections: SECTIONS
            .iter()
            .map(|&(id, title)| SectionView { id, title, collapsed: state.section_collapsed(id) })
            .collect(),
        fields,
        arrays,
        style: StyleKey::ALL
            .iter()
            .map(|key| StyleControl {
                key: *key,
                label: key.label(),
                value: key.read(&inst.style).unwrap_or_default().to_owned(),
            })
            .collect(),
        size: inst.size.clone(),
    }
}

fn control_for(field: &ConfigField, value: &Value) -> FieldControl {
    match field.kind {
        FieldKind::Text => FieldControl::Text { value: display_text(value) },
        FieldKind::Number => FieldControl::Number { value: value.as_f64() },
        FieldKind::Boolean => FieldControl::Boolean { value: value.as_bool().unwrap_or(false) },
        FieldKind::Select => FieldControl::Select { value: display_text(value), options: field.options.clone() },
        FieldKind::Color => FieldControl::Color { value: display_text(value) },
        FieldKind::Structured | FieldKind::Array => FieldControl::Structured { buffer: encode(value), invalid: false },
    }
}

fn display_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn array_editor(
    field: &ConfigField,
    value: &Value,
    path: ArrayPath,
    id: &InstanceId,
    state: &dyn FormState,
) -> ArrayEditorView {
    let empty = Map::new();
    let items = value
        .as_array()
        .map(|items| {
            items
                .iter()
                .enumerate()
                .map(|(index, item)| {
                    let object = item.as_object().unwrap_or(&empty);
                    let mut fields = Vec::new();
                    let mut arrays = Vec::new();
                    for sub in &field.item_schema {
                        let sub_value = object.get(&sub.key).unwrap_or(&sub.default_value);
                        if sub.kind == FieldKind::Array {
                            let sub_path = path.clone().nested(index, &sub.key);
                            arrays.push(array_editor(sub, sub_value, sub_path, id, state));
                        } else {
                            fields.push(FieldView {
                                key: sub.key.clone(),
                                label: sub.label.clone(),
                                control: control_for(sub, sub_value),
                            });
                        }
                    }
                    ArrayItemView {
                        index,
                        title: item_title(field, index),
                        collapsed: state.item_collapsed(id, &path, index),
                        fields,
                        arrays,
                    }
                })
                .collect()
        })
        .unwrap_or_default();

    ArrayEditorView { path, label: field.label.clone(), items }
}
