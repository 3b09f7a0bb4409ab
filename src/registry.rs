//! Component registry: definitions, configuration schemas and container rules.
//!
//! A [`ComponentDefinition`] describes one placeable component type: its
//! palette label and category, the defaults new instances start from, and
//! the ordered [`ConfigField`] schema the inspector renders. Instances carry
//! their type as a string (so pages written by newer catalogs still load);
//! [`Registry::resolve`] turns that string into a [`ComponentKind`] once, and
//! everything downstream dispatches on the enum.
//!
//! Lookups on unregistered types return `None`. Callers treat that as
//! "render nothing / do nothing", never as a fatal error.

#[cfg(test)]
#[path = "registry_test.rs"]
mod registry_test;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Every component type the editor knows how to place and preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    /// Horizontal flow container.
    Row,
    /// Vertical flow container.
    Column,
    /// Bordered vertical container.
    Card,
    /// Full-width page section.
    Section,
    /// Page header bar.
    Header,
    /// Page footer bar.
    Footer,
    /// Paragraph of text.
    Text,
    /// Heading (h1 to h6).
    Heading,
    /// Clickable button.
    Button,
    /// Image.
    Image,
    /// Horizontal rule.
    Divider,
    /// Fixed blank space.
    Spacer,
    /// Single-line text input.
    Input,
    /// Dropdown select.
    Select,
    /// Checkbox with label.
    Checkbox,
    /// Data table.
    Table,
    /// Bulleted or numbered list.
    List,
    /// Tab strip.
    Tabs,
    /// Chart.
    Chart,
    /// Single headline number.
    Statistic,
}

impl ComponentKind {
    /// All kinds, in palette order.
    pub const ALL: [Self; 20] = [
        Self::Row,
        Self::Column,
        Self::Card,
        Self::Section,
        Self::Header,
        Self::Footer,
        Self::Text,
        Self::Heading,
        Self::Button,
        Self::Image,
        Self::Divider,
        Self::Spacer,
        Self::Input,
        Self::Select,
        Self::Checkbox,
        Self::Table,
        Self::List,
        Self::Tabs,
        Self::Chart,
        Self::Statistic,
    ];

    /// The wire name used in `type` fields.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Row => "row",
            Self::Column => "column",
            Self::Card => "card",
            Self::Section => "section",
            Self::Header => "header",
            Self::Footer => "footer",
            Self::Text => "text",
            Self::Heading => "heading",
            Self::Button => "button",
            Self::Image => "image",
            Self::Divider => "divider",
            Self::Spacer => "spacer",
            Self::Input => "input",
            Self::Select => "select",
            Self::Checkbox => "checkbox",
            Self::Table => "table",
            Self::List => "list",
            Self::Tabs => "tabs",
            Self::Chart => "chart",
            Self::Statistic => "statistic",
        }
    }

    /// Parse a wire name. Returns `None` for unknown names.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }

    /// Whether instances of this kind may own children.
    ///
    /// Only the layout kinds are containers; everything else is a leaf.
    #[must_use]
    pub fn is_container(self) -> bool {
        matches!(self, Self::Row | Self::Column | Self::Card | Self::Section | Self::Header | Self::Footer)
    }
}

/// Palette grouping for definitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Containers that arrange children.
    Layout,
    /// Static content.
    Basic,
    /// Form controls.
    Form,
    /// Data display.
    Data,
}

impl Category {
    /// Categories in palette order.
    pub const ALL: [Self; 4] = [Self::Layout, Self::Basic, Self::Form, Self::Data];

    /// Human-readable palette heading.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Layout => "Layout",
            Self::Basic => "Basic",
            Self::Form => "Form",
            Self::Data => "Data",
        }
    }
}

/// The control kind of a config field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Free text.
    Text,
    /// Numeric value.
    Number,
    /// On/off toggle.
    Boolean,
    /// One of a fixed set of `options`.
    Select,
    /// Color string.
    Color,
    /// Free-text entry decoded into a nested value.
    Structured,
    /// List of items shaped by `item_schema`.
    Array,
}

/// One declarative field descriptor inside a definition's schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigField {
    /// Key in the instance's `config` map.
    pub key: String,
    /// Label shown next to the control.
    pub label: String,
    /// Control kind.
    pub kind: FieldKind,
    /// Allowed values for [`FieldKind::Select`].
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    /// Value used when an instance has none.
    #[serde(default)]
    pub default_value: Value,
    /// Shape of one element, for [`FieldKind::Array`].
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub item_schema: Vec<ConfigField>,
    /// Singular noun used to title array elements ("Column 1").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_label: Option<String>,
    /// Seed for newly appended array elements.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub default_item: Value,
}

impl ConfigField {
    fn new(key: &str, label: &str, kind: FieldKind, default_value: Value) -> Self {
        Self {
            key: key.to_owned(),
            label: label.to_owned(),
            kind,
            options: Vec::new(),
            default_value,
            item_schema: Vec::new(),
            item_label: None,
            default_item: Value::Null,
        }
    }

    /// A free-text field.
    #[must_use]
    pub fn text(key: &str, label: &str, default: &str) -> Self {
        Self::new(key, label, FieldKind::Text, Value::from(default))
    }

    /// A numeric field.
    #[must_use]
    pub fn number(key: &str, label: &str, default: f64) -> Self {
        Self::new(key, label, FieldKind::Number, number_value(default))
    }

    /// A boolean toggle.
    #[must_use]
    pub fn boolean(key: &str, label: &str, default: bool) -> Self {
        Self::new(key, label, FieldKind::Boolean, Value::Bool(default))
    }

    /// A select field. `default` should be one of `options`.
    #[must_use]
    pub fn select(key: &str, label: &str, options: &[&str], default: &str) -> Self {
        let mut field = Self::new(key, label, FieldKind::Select, Value::from(default));
        field.options = options.iter().map(|o| (*o).to_owned()).collect();
        field
    }

    /// A color field.
    #[must_use]
    pub fn color(key: &str, label: &str, default: &str) -> Self {
        Self::new(key, label, FieldKind::Color, Value::from(default))
    }

    /// A structured (free-text decoded) field.
    #[must_use]
    pub fn structured(key: &str, label: &str, default: Value) -> Self {
        Self::new(key, label, FieldKind::Structured, default)
    }

    /// An array field whose elements follow `item_schema`.
    ///
    /// The array starts empty; use [`ConfigField::with_default`] to seed it.
    #[must_use]
    pub fn array(key: &str, label: &str, item_label: &str, item_schema: Vec<ConfigField>, default_item: Value) -> Self {
        let mut field = Self::new(key, label, FieldKind::Array, Value::Array(Vec::new()));
        field.item_schema = item_schema;
        field.item_label = Some(item_label.to_owned());
        field.default_item = default_item;
        field
    }

    /// Replace the default value.
    #[must_use]
    pub fn with_default(mut self, default: Value) -> Self {
        self.default_value = default;
        self
    }

    /// Look up a field of this array's element schema.
    #[must_use]
    pub fn item_field(&self, key: &str) -> Option<&ConfigField> {
        self.item_schema.iter().find(|f| f.key == key)
    }
}

/// Convert an `f64` default into a JSON number, preferring integers.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < 9.0e15 {
        Value::from(n as i64)
    } else {
        serde_json::Number::from_f64(n).map_or(Value::Null, Value::Number)
    }
}

/// Registry entry describing one component type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentDefinition {
    /// Unique key.
    #[serde(rename = "type")]
    pub kind: ComponentKind,
    /// Palette label.
    pub label: String,
    /// Palette group.
    pub category: Category,
    /// Config new instances start from.
    pub default_config: Map<String, Value>,
    /// Ordered field schema.
    pub config_schema: Vec<ConfigField>,
}

impl ComponentDefinition {
    /// Build a definition whose `default_config` is derived from the schema.
    #[must_use]
    pub fn new(kind: ComponentKind, label: &str, category: Category, config_schema: Vec<ConfigField>) -> Self {
        let default_config = config_schema
            .iter()
            .map(|f| (f.key.clone(), f.default_value.clone()))
            .collect();
        Self { kind, label: label.to_owned(), category, default_config, config_schema }
    }

    /// Look up a top-level schema field by key.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&ConfigField> {
        self.config_schema.iter().find(|f| f.key == key)
    }

    /// Whether this definition's instances may own children.
    #[must_use]
    pub fn is_container(&self) -> bool {
        self.kind.is_container()
    }
}

/// Read-only catalog of component definitions.
#[derive(Debug, Clone)]
pub struct Registry {
    definitions: HashMap<ComponentKind, ComponentDefinition>,
}

impl Registry {
    /// Build a registry from definitions. Later duplicates replace earlier ones.
    #[must_use]
    pub fn from_definitions(definitions: Vec<ComponentDefinition>) -> Self {
        let mut map = HashMap::with_capacity(definitions.len());
        for def in definitions {
            let kind = def.kind;
            if map.insert(kind, def).is_some() {
                tracing::warn!(component_type = kind.as_str(), "duplicate component definition replaced");
            }
        }
        Self { definitions: map }
    }

    /// The built-in catalog.
    #[must_use]
    pub fn builtin() -> Self {
        Self::from_definitions(crate::catalog::builtin_definitions())
    }

    /// Resolve a wire type name to a registered kind.
    #[must_use]
    pub fn resolve(&self, type_name: &str) -> Option<ComponentKind> {
        ComponentKind::parse(type_name).filter(|kind| self.definitions.contains_key(kind))
    }

    /// Look up a definition by wire type name.
    #[must_use]
    pub fn lookup(&self, type_name: &str) -> Option<&ComponentDefinition> {
        self.resolve(type_name).and_then(|kind| self.definitions.get(&kind))
    }

    /// Look up a definition by kind.
    #[must_use]
    pub fn get(&self, kind: ComponentKind) -> Option<&ComponentDefinition> {
        self.definitions.get(&kind)
    }

    /// Whether `type_name` is a registered container type.
    #[must_use]
    pub fn is_container(&self, type_name: &str) -> bool {
        self.lookup(type_name).is_some_and(ComponentDefinition::is_container)
    }

    /// All definitions grouped by category, in palette order.
    ///
    /// Categories with no registered definitions are omitted.
    #[must_use]
    pub fn list(&self) -> Vec<(Category, Vec<&ComponentDefinition>)> {
        Category::ALL
            .into_iter()
            .filter_map(|category| {
                let defs: Vec<&ComponentDefinition> = ComponentKind::ALL
                    .iter()
                    .filter_map(|kind| self.definitions.get(kind))
                    .filter(|def| def.category == category)
                    .collect();
                if defs.is_empty() { None } else { Some((category, defs)) }
            })
            .collect()
    }

    /// Number of registered definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::builtin()
    }
}
