//! Array field editing: seeding, appending, removing and editing elements of
//! list-valued config fields, including lists nested inside list elements.
//!
//! Every operation works on a detached copy of the top-level field value;
//! the caller writes the result back through the store in one update.

#[cfg(test)]
#[path = "array_test.rs"]
mod array_test;

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use super::form::{FieldError, coerce};
use crate::registry::{ConfigField, FieldKind};

/// Address of one list inside an instance's config.
///
/// `key` names the top-level array field; each step descends into element
/// `index` and then its array-kind field `field`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrayPath {
    pub key: String,
    pub steps: Vec<(usize, String)>,
}

impl ArrayPath {
    /// The top-level array field `key`.
    #[must_use]
    pub fn root(key: &str) -> Self {
        Self { key: key.to_owned(), steps: Vec::new() }
    }

    /// Descend into `field` of element `index`.
    #[must_use]
    pub fn nested(mut self, index: usize, field: &str) -> Self {
        self.steps.push((index, field.to_owned()));
        self
    }

    /// Key identifying element `index` of this list, e.g. `series[0].points[2]`.
    #[must_use]
    pub fn item_key(&self, index: usize) -> String {
        format!("{self}[{index}]")
    }

    /// Resolve the schema of the list this path addresses, starting from the
    /// top-level field.
    ///
    /// # Errors
    ///
    /// Fails if a step names a field that is not an array in the item schema.
    pub fn resolve<'a>(&self, field: &'a ConfigField) -> Result<&'a ConfigField, FieldError> {
        let mut current = as_array_field(field)?;
        for (_, step) in &self.steps {
            let next = current.item_field(step).ok_or_else(|| FieldError::UnknownField(step.clone()))?;
            current = as_array_field(next)?;
        }
        Ok(current)
    }
}

impl fmt::Display for ArrayPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)?;
        for (index, field) in &self.steps {
            write!(f, "[{index}].{field}")?;
        }
        Ok(())
    }
}

fn as_array_field(field: &ConfigField) -> Result<&ConfigField, FieldError> {
    if field.kind == FieldKind::Array {
        Ok(field)
    } else {
        Err(FieldError::NotAList { key: field.key.clone() })
    }
}

/// Display title of element `index`: the field's item label and a 1-based
/// position.
#[must_use]
pub fn item_title(field: &ConfigField, index: usize) -> String {
    format!("{} {}", field.item_label.as_deref().unwrap_or("Item"), index + 1)
}

/// A fresh element for `field`: its `default_item`, with every item-schema
/// key it lacks filled from that sub-field's own default.
#[must_use]
pub fn new_item(field: &ConfigField) -> Value {
    let mut item = match &field.default_item {
        Value::Object(map) => map.clone(),
        Value::Null => serde_json::Map::new(),
        other => return other.clone(),
    };
    for sub in &field.item_schema {
        item.entry(sub.key.clone()).or_insert_with(|| sub.default_value.clone());
    }
    Value::Object(item)
}

/// Walk `root` (the top-level field value) to the list at `path`.
///
/// A nested list missing from its element is created from that sub-field's
/// default, so the first append into a fresh element works.
fn list_mut<'v>(root: &'v mut Value, field: &ConfigField, path: &ArrayPath) -> Result<&'v mut Vec<Value>, FieldError> {
    let mut current = root;
    let mut schema = as_array_field(field)?;
    for (index, step) in &path.steps {
        let items = current.as_array_mut().ok_or_else(|| FieldError::NotAList { key: schema.key.clone() })?;
        let len = items.len();
        let item = items
            .get_mut(*index)
            .ok_or_else(|| FieldError::IndexOutOfRange { key: schema.key.clone(), index: *index, len })?;
        let object = item
            .as_object_mut()
            .ok_or_else(|| FieldError::NotAnObject { key: schema.key.clone(), index: *index })?;
        let sub = schema.item_field(step).ok_or_else(|| FieldError::UnknownField(step.clone()))?;
        schema = as_array_field(sub)?;
        current = object.entry(step.clone()).or_insert_with(|| sub.default_value.clone());
    }
    current.as_array_mut().ok_or_else(|| FieldError::NotAList { key: schema.key.clone() })
}

/// Append a seeded element to the list at `path`. Returns its index.
///
/// # Errors
///
/// Fails if `path` does not address a list.
pub fn push_item(root: &mut Value, field: &ConfigField, path: &ArrayPath) -> Result<usize, FieldError> {
    let schema = path.resolve(field)?;
    let item = new_item(schema);
    let items = list_mut(root, field, path)?;
    items.push(item);
    Ok(items.len() - 1)
}

/// Remove element `index` of the list at `path`, returning it. The other
/// elements keep their relative order and contents.
///
/// # Errors
///
/// Fails if `path` does not address a list or `index` is out of range.
pub fn remove_item(root: &mut Value, field: &ConfigField, path: &ArrayPath, index: usize) -> Result<Value, FieldError> {
    let items = list_mut(root, field, path)?;
    if index >= items.len() {
        return Err(FieldError::IndexOutOfRange { key: path.to_string(), index, len: items.len() });
    }
    Ok(items.remove(index))
}

/// Replace `item[index][key]` of the list at `path`, leaving sibling
/// elements and the element's other fields untouched. `value` is coerced
/// through the item schema; `null` removes the key.
///
/// # Errors
///
/// Fails on an unknown item field, a value that does not coerce, or a bad
/// path or index.
pub fn set_item_field(
    root: &mut Value,
    field: &ConfigField,
    path: &ArrayPath,
    index: usize,
    key: &str,
    value: Value,
) -> Result<(), FieldError> {
    let schema = path.resolve(field)?;
    let sub = schema.item_field(key).ok_or_else(|| FieldError::UnknownField(key.to_owned()))?;
    let value = coerce(sub, value)?;

    let items = list_mut(root, field, path)?;
    let len = items.len();
    let item = items
        .get_mut(index)
        .ok_or_else(|| FieldError::IndexOutOfRange { key: path.to_string(), index, len })?;
    let object = item.as_object_mut().ok_or_else(|| FieldError::NotAnObject { key: path.to_string(), index })?;
    if value.is_null() {
        object.remove(key);
    } else {
        object.insert(key.to_owned(), value);
    }
    Ok(())
}
