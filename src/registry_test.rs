use serde_json::json;

use super::*;

// =============================================================
// ComponentKind
// =============================================================

#[test]
fn kind_wire_names_roundtrip_through_parse() {
    for kind in ComponentKind::ALL {
        assert_eq!(ComponentKind::parse(kind.as_str()), Some(kind));
    }
}

#[test]
fn kind_serde_matches_wire_name() {
    for kind in ComponentKind::ALL {
        let json = serde_json::to_string(&kind).unwrap();
        assert_eq!(json, format!("\"{}\"", kind.as_str()));
    }
}

#[test]
fn kind_parse_unknown_is_none() {
    assert_eq!(ComponentKind::parse("carousel"), None);
    assert_eq!(ComponentKind::parse(""), None);
    assert_eq!(ComponentKind::parse("Row"), None);
}

#[test]
fn only_layout_kinds_are_containers() {
    let containers: Vec<ComponentKind> = ComponentKind::ALL.into_iter().filter(|k| k.is_container()).collect();
    assert_eq!(
        containers,
        vec![
            ComponentKind::Row,
            ComponentKind::Column,
            ComponentKind::Card,
            ComponentKind::Section,
            ComponentKind::Header,
            ComponentKind::Footer,
        ]
    );
}

// =============================================================
// ConfigField
// =============================================================

#[test]
fn number_field_prefers_integer_json() {
    let field = ConfigField::number("level", "Level", 2.0);
    assert_eq!(field.default_value, json!(2));
    let field = ConfigField::number("ratio", "Ratio", 0.5);
    assert_eq!(field.default_value, json!(0.5));
}

#[test]
fn select_field_keeps_options_in_order() {
    let field = ConfigField::select("v", "Variant", &["a", "b", "c"], "b");
    assert_eq!(field.options, vec!["a", "b", "c"]);
    assert_eq!(field.default_value, json!("b"));
}

#[test]
fn array_field_defaults_to_empty_list() {
    let field = ConfigField::array("items", "Items", "Item", vec![ConfigField::text("text", "Text", "x")], json!({}));
    assert_eq!(field.kind, FieldKind::Array);
    assert_eq!(field.default_value, json!([]));
    assert_eq!(field.item_label.as_deref(), Some("Item"));
    assert!(field.item_field("text").is_some());
    assert!(field.item_field("missing").is_none());
}

#[test]
fn config_field_serializes_camel_case() {
    let field = ConfigField::array("items", "Items", "Item", vec![], json!({"a": 1}));
    let value = serde_json::to_value(&field).unwrap();
    assert_eq!(value["kind"], json!("array"));
    assert_eq!(value["defaultValue"], json!([]));
    assert_eq!(value["itemLabel"], json!("Item"));
    assert_eq!(value["defaultItem"], json!({"a": 1}));
    assert!(value.get("options").is_none());
}

// =============================================================
// ComponentDefinition
// =============================================================

#[test]
fn definition_default_config_comes_from_schema() {
    let def = ComponentDefinition::new(
        ComponentKind::Button,
        "Button",
        Category::Basic,
        vec![ConfigField::text("label", "Label", "Go"), ConfigField::boolean("disabled", "Disabled", false)],
    );
    assert_eq!(def.default_config.get("label"), Some(&json!("Go")));
    assert_eq!(def.default_config.get("disabled"), Some(&json!(false)));
    assert_eq!(def.default_config.len(), 2);
}

#[test]
fn definition_serializes_type_key() {
    let registry = Registry::builtin();
    let def = registry.get(ComponentKind::Row).unwrap();
    let value = serde_json::to_value(def).unwrap();
    assert_eq!(value["type"], json!("row"));
    assert_eq!(value["category"], json!("layout"));
    assert!(value["defaultConfig"].is_object());
    assert!(value["configSchema"].is_array());
}

// =============================================================
// Registry
// =============================================================

#[test]
fn builtin_registers_every_kind() {
    let registry = Registry::builtin();
    assert_eq!(registry.len(), ComponentKind::ALL.len());
    for kind in ComponentKind::ALL {
        let def = registry.lookup(kind.as_str()).unwrap();
        assert_eq!(def.kind, kind);
    }
}

#[test]
fn lookup_unknown_type_is_none() {
    let registry = Registry::builtin();
    assert!(registry.lookup("marquee").is_none());
    assert!(!registry.is_container("marquee"));
}

#[test]
fn is_container_follows_kind() {
    let registry = Registry::builtin();
    assert!(registry.is_container("row"));
    assert!(registry.is_container("footer"));
    assert!(!registry.is_container("button"));
    assert!(!registry.is_container("table"));
}

#[test]
fn resolve_requires_registration() {
    let registry = Registry::from_definitions(vec![ComponentDefinition::new(
        ComponentKind::Text,
        "Text",
        Category::Basic,
        vec![],
    )]);
    assert_eq!(registry.resolve("text"), Some(ComponentKind::Text));
    assert_eq!(registry.resolve("row"), None);
    assert!(!registry.is_container("row"));
}

#[test]
fn list_groups_by_category_in_palette_order() {
    let registry = Registry::builtin();
    let groups = registry.list();
    let categories: Vec<Category> = groups.iter().map(|(c, _)| *c).collect();
    assert_eq!(categories, Category::ALL.to_vec());

    let (_, layout) = &groups[0];
    assert_eq!(layout[0].kind, ComponentKind::Row);
    assert!(layout.iter().all(|d| d.category == Category::Layout));

    let total: usize = groups.iter().map(|(_, defs)| defs.len()).sum();
    assert_eq!(total, registry.len());
}

#[test]
fn list_omits_empty_categories() {
    let registry = Registry::from_definitions(vec![ComponentDefinition::new(
        ComponentKind::Table,
        "Table",
        Category::Data,
        vec![],
    )]);
    let groups = registry.list();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].0, Category::Data);
}

#[test]
fn duplicate_definitions_last_wins() {
    let registry = Registry::from_definitions(vec![
        ComponentDefinition::new(ComponentKind::Text, "First", Category::Basic, vec![]),
        ComponentDefinition::new(ComponentKind::Text, "Second", Category::Basic, vec![]),
    ]);
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.lookup("text").unwrap().label, "Second");
}

#[test]
fn builtin_array_fields_have_item_schemas() {
    let registry = Registry::builtin();
    for (_, defs) in registry.list() {
        for def in defs {
            for field in &def.config_schema {
                if field.kind == FieldKind::Array {
                    assert!(!field.item_schema.is_empty(), "{}.{} has no item schema", def.label, field.key);
                    assert!(field.default_value.is_array());
                }
                if field.kind == FieldKind::Select {
                    let default = field.default_value.as_str().unwrap();
                    assert!(field.options.iter().any(|o| o == default), "{}.{}", def.label, field.key);
                }
            }
        }
    }
}
