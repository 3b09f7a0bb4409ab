use std::sync::Arc;

use serde_json::json;
use uuid::Uuid;

use super::*;
use crate::doc::NewComponent;
use crate::inspector::form::FieldControl;
use crate::inspector::settings::MemorySettings;
use crate::registry::Registry;

fn setup(kind: &str) -> (DocStore, PageId, InstanceId) {
    let mut doc = DocStore::new(Arc::new(Registry::builtin()));
    let page = doc.create_page("Home", "/");
    let id = doc.add_component(&page, NewComponent::new(kind)).unwrap();
    (doc, page, id)
}

fn config(doc: &DocStore, page: &PageId, id: &InstanceId, key: &str) -> Value {
    doc.get_component(page, id).and_then(|i| i.config.get(key)).cloned().unwrap_or(Value::Null)
}

// =============================================================
// Scalar fields
// =============================================================

#[test]
fn set_field_changes_only_that_key() {
    let (mut doc, page, id) = setup("button");
    let before = doc.get_component(&page, &id).cloned().unwrap();
    let mut inspector = Inspector::default();
    inspector.set_field(&mut doc, &page, &id, "label", json!("Save")).unwrap();

    let after = doc.get_component(&page, &id).unwrap();
    assert_eq!(after.config["label"], json!("Save"));
    assert_eq!(after.id, before.id);
    assert_eq!(after.component_type, before.component_type);
    assert_eq!(after.parent_id, before.parent_id);
    assert_eq!(after.order, before.order);
    assert_eq!(after.config["variant"], before.config["variant"]);
}

#[test]
fn set_field_rejects_bad_values_without_writing() {
    let (mut doc, page, id) = setup("button");
    let mut inspector = Inspector::default();
    let err = inspector.set_field(&mut doc, &page, &id, "variant", json!("neon")).unwrap_err();
    assert!(matches!(err, FieldError::NotAnOption { .. }));
    assert_eq!(config(&doc, &page, &id, "variant"), json!("primary"));

    let err = inspector.set_field(&mut doc, &page, &id, "colour", json!("red")).unwrap_err();
    assert_eq!(err, FieldError::UnknownField("colour".into()));
}

#[test]
fn set_field_on_missing_instance() {
    let (mut doc, page, _) = setup("button");
    let ghost = Uuid::new_v4();
    let err = Inspector::default().set_field(&mut doc, &page, &ghost, "label", json!("x")).unwrap_err();
    assert_eq!(err, FieldError::InstanceNotFound(ghost));
}

// =============================================================
// Structured fields
// =============================================================

#[test]
fn relaxed_text_commits_via_normalization() {
    let (mut doc, page, id) = setup("chart");
    let mut inspector = Inspector::default();
    let outcome = inspector.edit_structured(&mut doc, &page, &id, "options", "{name: 'A', tags: [1,2,], }").unwrap();
    assert_eq!(
        outcome,
        StructuredEdit::Committed { stage: DecodeStage::Normalized, value: json!({"name": "A", "tags": [1, 2]}) }
    );
    assert_eq!(config(&doc, &page, &id, "options"), json!({"name": "A", "tags": [1, 2]}));
    assert!(!inspector.is_invalid(&id, "options"));
}

#[test]
fn failed_decode_keeps_last_value_and_buffer() {
    let (mut doc, page, id) = setup("button");
    let mut inspector = Inspector::default();
    inspector.edit_structured(&mut doc, &page, &id, "action", r#"{"type": "link"}"#).unwrap();

    let outcome = inspector.edit_structured(&mut doc, &page, &id, "action", "{type: 'link'").unwrap();
    assert!(matches!(outcome, StructuredEdit::Invalid { .. }));
    assert_eq!(config(&doc, &page, &id, "action"), json!({"type": "link"}));
    assert!(inspector.is_invalid(&id, "action"));

    let form = inspector.inspect(&doc, &page, &id).unwrap();
    let action = form.fields.iter().find(|f| f.key == "action").unwrap();
    assert_eq!(action.control, FieldControl::Structured { buffer: "{type: 'link'".into(), invalid: true });

    inspector.edit_structured(&mut doc, &page, &id, "action", "{type: 'none'}").unwrap();
    assert!(!inspector.is_invalid(&id, "action"));
}

#[test]
fn array_fields_accept_lists_only() {
    let (mut doc, page, id) = setup("list");
    let mut inspector = Inspector::default();
    let outcome = inspector.edit_structured(&mut doc, &page, &id, "items", "{text: 'a'}").unwrap();
    assert!(matches!(outcome, StructuredEdit::Invalid { .. }));
    let outcome = inspector.edit_structured(&mut doc, &page, &id, "items", "[{text: 'a'}]").unwrap();
    assert!(matches!(outcome, StructuredEdit::Committed { .. }));
    assert_eq!(config(&doc, &page, &id, "items"), json!([{"text": "a"}]));
}

#[test]
fn scalar_fields_do_not_take_structured_text() {
    let (mut doc, page, id) = setup("button");
    let err = Inspector::default().edit_structured(&mut doc, &page, &id, "label", "{}").unwrap_err();
    assert!(matches!(err, FieldError::TypeMismatch { .. }));
}

#[test]
fn decode_limits_apply() {
    let (mut doc, page, id) = setup("chart");
    let mut inspector = Inspector::new(DecodeLimits { max_bytes: 8, max_depth: 4 });
    let outcome = inspector.edit_structured(&mut doc, &page, &id, "options", "{\"a\": 123456}").unwrap();
    assert_eq!(outcome, StructuredEdit::Invalid { error: DecodeError::TooLong { len: 13, max: 8 } });
    assert_eq!(config(&doc, &page, &id, "options"), json!({}));
}

// =============================================================
// Array editor
// =============================================================

#[test]
fn array_operations_round_through_the_store() {
    let (mut doc, page, id) = setup("tabs");
    let mut inspector = Inspector::default();
    let path = ArrayPath::root("tabs");

    assert_eq!(inspector.add_item(&mut doc, &page, &id, &path).unwrap(), 2);
    inspector.set_item_field(&mut doc, &page, &id, &path, 2, "label", json!("Third")).unwrap();
    let removed = inspector.remove_item(&mut doc, &page, &id, &path, 0).unwrap();
    assert_eq!(removed["key"], json!("overview"));

    let tabs = config(&doc, &page, &id, "tabs");
    let labels: Vec<&str> = tabs.as_array().unwrap().iter().map(|t| t["label"].as_str().unwrap()).collect();
    assert_eq!(labels, vec!["Details", "Third"]);
}

#[test]
fn failed_array_edit_leaves_store_alone() {
    let (mut doc, page, id) = setup("tabs");
    let before = config(&doc, &page, &id, "tabs");
    let err = Inspector::default()
        .remove_item(&mut doc, &page, &id, &ArrayPath::root("tabs"), 9)
        .unwrap_err();
    assert!(matches!(err, FieldError::IndexOutOfRange { .. }));
    assert_eq!(config(&doc, &page, &id, "tabs"), before);
}

#[test]
fn item_collapse_follows_removal() {
    let (mut doc, page, id) = setup("tabs");
    let mut inspector = Inspector::default();
    let path = ArrayPath::root("tabs");
    inspector.add_item(&mut doc, &page, &id, &path).unwrap();
    assert!(inspector.toggle_item_collapsed(&id, &path, 0));
    assert!(inspector.toggle_item_collapsed(&id, &path, 2));

    inspector.remove_item(&mut doc, &page, &id, &path, 0).unwrap();
    let form = inspector.inspect(&doc, &page, &id).unwrap();
    let collapsed: Vec<bool> = form.arrays[0].items.iter().map(|i| i.collapsed).collect();
    assert_eq!(collapsed, vec![false, true]);

    assert!(!inspector.toggle_item_collapsed(&id, &path, 1));
}

#[test]
fn collapse_state_is_not_stored_in_the_value() {
    let (mut doc, page, id) = setup("tabs");
    let before = config(&doc, &page, &id, "tabs");
    let mut inspector = Inspector::default();
    inspector.toggle_item_collapsed(&id, &ArrayPath::root("tabs"), 0);
    assert_eq!(config(&doc, &page, &id, "tabs"), before);
}

// =============================================================
// Style, size, layout
// =============================================================

#[test]
fn style_writes_go_to_style_not_config() {
    let (mut doc, page, id) = setup("card");
    let mut inspector = Inspector::default();
    let config_before = doc.get_component(&page, &id).unwrap().config.clone();
    inspector.set_style(&mut doc, &page, &id, StyleKey::Background, "#fff").unwrap();
    let inst = doc.get_component(&page, &id).unwrap();
    assert_eq!(inst.style.background.as_deref(), Some("#fff"));
    assert_eq!(inst.config, config_before);

    inspector.set_style(&mut doc, &page, &id, StyleKey::Background, "").unwrap();
    assert_eq!(doc.get_component(&page, &id).unwrap().style.background, None);
}

#[test]
fn size_writes_one_dimension() {
    let (mut doc, page, id) = setup("image");
    let mut inspector = Inspector::default();
    inspector.set_size(&mut doc, &page, &id, SizeKey::Width, "240px").unwrap();
    let size = &doc.get_component(&page, &id).unwrap().size;
    assert_eq!(size.width, "240px");
    assert_eq!(size.height, "auto");
    assert!(inspector.set_size(&mut doc, &page, &id, SizeKey::Height, "  ").is_err());
}

#[test]
fn layout_round_trips_through_settings() {
    let mut store = MemorySettings::new();
    let mut inspector = Inspector::default();
    assert!(inspector.toggle_section("style"));
    inspector.save_layout(&mut store, "u1", "inspector");

    let mut fresh = Inspector::default();
    fresh.load_layout(&store, "u1", "inspector");
    assert!(fresh.layout().is_collapsed("style"));
}

#[test]
fn forget_drops_buffers() {
    let (mut doc, page, id) = setup("button");
    let mut inspector = Inspector::default();
    inspector.edit_structured(&mut doc, &page, &id, "action", "{").unwrap();
    assert!(inspector.is_invalid(&id, "action"));
    inspector.forget(&[id]);
    assert!(!inspector.is_invalid(&id, "action"));
}
