#![allow(clippy::float_cmp)]

use std::sync::Arc;

use serde_json::json;
use uuid::Uuid;

use super::*;
use crate::doc::{DocStore, NewComponent, PageId};
use crate::inspector::Inspector;
use crate::registry::{ComponentKind, Registry};

fn field(kind: ComponentKind, key: &str) -> ConfigField {
    Registry::builtin().get(kind).and_then(|d| d.field(key)).cloned().unwrap()
}

fn setup(kind: &str) -> (DocStore, PageId, InstanceId) {
    let mut doc = DocStore::new(Arc::new(Registry::builtin()));
    let page = doc.create_page("Home", "/");
    let id = doc.add_component(&page, NewComponent::new(kind)).unwrap();
    (doc, page, id)
}

// =============================================================
// Coercion
// =============================================================

#[test]
fn text_accepts_scalars() {
    let label = field(ComponentKind::Button, "label");
    assert_eq!(coerce(&label, json!("Go")).unwrap(), json!("Go"));
    assert_eq!(coerce(&label, json!(3)).unwrap(), json!("3"));
    assert_eq!(coerce(&label, json!(true)).unwrap(), json!("true"));
    assert!(coerce(&label, json!({})).is_err());
}

#[test]
fn number_accepts_numeric_strings() {
    let page_size = field(ComponentKind::Table, "pageSize");
    assert_eq!(coerce(&page_size, json!(" 25 ")).unwrap(), json!(25));
    assert_eq!(coerce(&page_size, json!("2.5")).unwrap(), json!(2.5));
    let err = coerce(&page_size, json!("many")).unwrap_err();
    assert_eq!(err, FieldError::TypeMismatch { key: "pageSize".into(), expected: "number" });
    assert_eq!(err.error_code(), "E_TYPE_MISMATCH");
}

#[test]
fn boolean_accepts_literal_strings_only() {
    let disabled = field(ComponentKind::Button, "disabled");
    assert_eq!(coerce(&disabled, json!("true")).unwrap(), json!(true));
    assert_eq!(coerce(&disabled, json!(false)).unwrap(), json!(false));
    assert!(coerce(&disabled, json!("yes")).is_err());
    assert!(coerce(&disabled, json!(1)).is_err());
}

#[test]
fn select_must_be_an_option() {
    let variant = field(ComponentKind::Button, "variant");
    assert!(coerce(&variant, json!("secondary")).is_ok());
    assert_eq!(
        coerce(&variant, json!("neon")).unwrap_err(),
        FieldError::NotAnOption { key: "variant".into(), value: "neon".into() }
    );
}

#[test]
fn array_must_be_a_list_and_null_always_passes() {
    let columns = field(ComponentKind::Table, "columns");
    assert!(coerce(&columns, json!({})).is_err());
    assert!(coerce(&columns, json!([])).is_ok());
    assert_eq!(coerce(&columns, Value::Null).unwrap(), Value::Null);
}

// =============================================================
// Form building
// =============================================================

#[test]
fn form_lists_scalar_fields_in_schema_order_and_arrays_separately() {
    let (doc, page, id) = setup("table");
    let form = Inspector::default().inspect(&doc, &page, &id).unwrap();

    let keys: Vec<&str> = form.fields.iter().map(|f| f.key.as_str()).collect();
    assert_eq!(keys, vec!["dataSource", "pageSize", "striped"]);
    assert_eq!(form.arrays.len(), 1);
    assert_eq!(form.arrays[0].path, ArrayPath::root("columns"));
    assert_eq!(form.arrays[0].items.len(), 2);
    assert_eq!(form.arrays[0].items[1].title, "Column 2");
    assert_eq!(form.fields[1].control, FieldControl::Number { value: Some(10.0) });
    assert_eq!(form.label.as_deref(), Some("Table"));
}

#[test]
fn structured_fields_show_encoded_value() {
    let (doc, page, id) = setup("button");
    let form = Inspector::default().inspect(&doc, &page, &id).unwrap();
    let action = form.fields.iter().find(|f| f.key == "action").unwrap();
    assert_eq!(
        action.control,
        FieldControl::Structured { buffer: "{\n  \"type\": \"none\"\n}".into(), invalid: false }
    );
}

#[test]
fn nested_arrays_render_recursively() {
    let (mut doc, page, id) = setup("chart");
    let partial = crate::doc::PartialComponent::config_value(
        "series",
        json!([{ "name": "A", "color": "#000", "points": [{ "label": "x", "value": 1 }] }]),
    );
    doc.update_component(&page, &id, &partial);

    let form = Inspector::default().inspect(&doc, &page, &id).unwrap();
    let series = &form.arrays[0];
    assert_eq!(series.items[0].fields.len(), 2);
    let points = &series.items[0].arrays[0];
    assert_eq!(points.path, ArrayPath::root("series").nested(0, "points"));
    assert_eq!(points.items[0].title, "Point 1");
    assert_eq!(points.items[0].fields[1].control, FieldControl::Number { value: Some(1.0) });
}

#[test]
fn style_and_size_controls_are_always_present() {
    let (doc, page, id) = setup("divider");
    let form = Inspector::default().inspect(&doc, &page, &id).unwrap();
    assert_eq!(form.style.len(), StyleKey::ALL.len());
    assert!(form.style.iter().all(|c| c.value.is_empty()));
    assert_eq!(form.size, crate::doc::Size::default());
    assert_eq!(form.sections.len(), SECTIONS.len());
}

#[test]
fn unknown_type_keeps_style_and_size_only() {
    let mut doc = DocStore::new(Arc::new(Registry::builtin()));
    let odd = Uuid::new_v4();
    let page: crate::doc::Page = serde_json::from_value(json!({
        "id": Uuid::new_v4(),
        "name": "P",
        "route": "/p",
        "instances": [{ "id": odd, "type": "marquee", "parentId": null, "order": 0, "config": { "speed": 3 } }],
    }))
    .unwrap();
    let page = doc.import_page(page).unwrap();

    let form = Inspector::default().inspect(&doc, &page, &odd).unwrap();
    assert!(form.fields.is_empty());
    assert!(form.arrays.is_empty());
    assert_eq!(form.label, None);
    assert_eq!(form.style.len(), 6);
}

#[test]
fn style_key_overrides_set_one_slot() {
    let style = StyleKey::BorderRadius.overrides("4px");
    assert_eq!(StyleKey::BorderRadius.read(&style), Some("4px"));
    assert_eq!(StyleKey::Border.read(&style), None);
}
