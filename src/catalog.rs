//! The built-in component catalog.

use serde_json::json;

use crate::consts::DEFAULT_GAP;
use crate::registry::{Category, ComponentDefinition, ComponentKind, ConfigField};

const ALIGN_OPTIONS: [&str; 4] = ["start", "center", "end", "stretch"];
const JUSTIFY_OPTIONS: [&str; 5] = ["start", "center", "end", "space-between", "space-around"];
const TEXT_ALIGN_OPTIONS: [&str; 3] = ["left", "center", "right"];

/// Every built-in definition, in palette order.
#[must_use]
pub fn builtin_definitions() -> Vec<ComponentDefinition> {
    vec![
        // ── Layout ──────────────────────────────────────────────
        ComponentDefinition::new(
            ComponentKind::Row,
            "Row",
            Category::Layout,
            vec![
                ConfigField::text("gap", "Gap", DEFAULT_GAP),
                ConfigField::select("align", "Align items", &ALIGN_OPTIONS, "stretch"),
                ConfigField::select("justify", "Justify content", &JUSTIFY_OPTIONS, "start"),
                ConfigField::boolean("wrap", "Wrap", false),
            ],
        ),
        ComponentDefinition::new(
            ComponentKind::Column,
            "Column",
            Category::Layout,
            vec![
                ConfigField::text("gap", "Gap", DEFAULT_GAP),
                ConfigField::select("align", "Align items", &ALIGN_OPTIONS, "stretch"),
            ],
        ),
        ComponentDefinition::new(
            ComponentKind::Card,
            "Card",
            Category::Layout,
            vec![ConfigField::text("title", "Title", "Card"), ConfigField::boolean("elevated", "Shadow", true)],
        ),
        ComponentDefinition::new(
            ComponentKind::Section,
            "Section",
            Category::Layout,
            vec![ConfigField::text("title", "Title", ""), ConfigField::boolean("fullWidth", "Full width", true)],
        ),
        ComponentDefinition::new(
            ComponentKind::Header,
            "Header",
            Category::Layout,
            vec![ConfigField::text("title", "Title", "Page title"), ConfigField::boolean("sticky", "Sticky", false)],
        ),
        ComponentDefinition::new(
            ComponentKind::Footer,
            "Footer",
            Category::Layout,
            vec![ConfigField::text("text", "Text", "")],
        ),
        // ── Basic ───────────────────────────────────────────────
        ComponentDefinition::new(
            ComponentKind::Text,
            "Text",
            Category::Basic,
            vec![
                ConfigField::text("content", "Content", "Text"),
                ConfigField::select("size", "Size", &["sm", "md", "lg"], "md"),
                ConfigField::color("color", "Color", "#111827"),
                ConfigField::select("align", "Align", &TEXT_ALIGN_OPTIONS, "left"),
            ],
        ),
        ComponentDefinition::new(
            ComponentKind::Heading,
            "Heading",
            Category::Basic,
            vec![
                ConfigField::text("content", "Content", "Heading"),
                ConfigField::number("level", "Level", 2.0),
                ConfigField::color("color", "Color", "#111827"),
            ],
        ),
        ComponentDefinition::new(
            ComponentKind::Button,
            "Button",
            Category::Basic,
            vec![
                ConfigField::text("label", "Label", "Button"),
                ConfigField::select("variant", "Variant", &["primary", "secondary", "outline", "link"], "primary"),
                ConfigField::boolean("disabled", "Disabled", false),
                ConfigField::structured("action", "Click action", json!({ "type": "none" })),
            ],
        ),
        ComponentDefinition::new(
            ComponentKind::Image,
            "Image",
            Category::Basic,
            vec![
                ConfigField::text("src", "Source URL", ""),
                ConfigField::text("alt", "Alt text", ""),
                ConfigField::select("fit", "Fit", &["cover", "contain", "fill"], "cover"),
            ],
        ),
        ComponentDefinition::new(
            ComponentKind::Divider,
            "Divider",
            Category::Basic,
            vec![ConfigField::color("color", "Color", "#e5e7eb"), ConfigField::number("thickness", "Thickness", 1.0)],
        ),
        ComponentDefinition::new(
            ComponentKind::Spacer,
            "Spacer",
            Category::Basic,
            vec![ConfigField::number("height", "Height", 16.0)],
        ),
        // ── Form ────────────────────────────────────────────────
        ComponentDefinition::new(
            ComponentKind::Input,
            "Input",
            Category::Form,
            vec![
                ConfigField::text("label", "Label", "Label"),
                ConfigField::text("placeholder", "Placeholder", ""),
                ConfigField::select("inputType", "Type", &["text", "email", "number", "password", "date"], "text"),
                ConfigField::boolean("required", "Required", false),
            ],
        ),
        ComponentDefinition::new(
            ComponentKind::Select,
            "Select",
            Category::Form,
            vec![
                ConfigField::text("label", "Label", "Label"),
                ConfigField::text("placeholder", "Placeholder", "Choose…"),
                ConfigField::array(
                    "options",
                    "Options",
                    "Option",
                    vec![ConfigField::text("label", "Label", "Option"), ConfigField::text("value", "Value", "")],
                    json!({ "label": "Option" }),
                ),
                ConfigField::boolean("multiple", "Multiple", false),
            ],
        ),
        ComponentDefinition::new(
            ComponentKind::Checkbox,
            "Checkbox",
            Category::Form,
            vec![ConfigField::text("label", "Label", "Checkbox"), ConfigField::boolean("checked", "Checked", false)],
        ),
        // ── Data ────────────────────────────────────────────────
        ComponentDefinition::new(
            ComponentKind::Table,
            "Table",
            Category::Data,
            vec![
                ConfigField::array(
                    "columns",
                    "Columns",
                    "Column",
                    vec![
                        ConfigField::text("title", "Title", "Column"),
                        ConfigField::text("field", "Field", ""),
                        ConfigField::text("width", "Width", ""),
                        ConfigField::boolean("sortable", "Sortable", false),
                        ConfigField::select("align", "Align", &TEXT_ALIGN_OPTIONS, "left"),
                    ],
                    json!({ "title": "Column" }),
                )
                .with_default(json!([
                    { "title": "Name", "field": "name", "width": "", "sortable": true, "align": "left" },
                    { "title": "Status", "field": "status", "width": "", "sortable": false, "align": "left" },
                ])),
                ConfigField::structured("dataSource", "Data source", json!([])),
                ConfigField::number("pageSize", "Page size", 10.0),
                ConfigField::boolean("striped", "Striped rows", false),
            ],
        ),
        ComponentDefinition::new(
            ComponentKind::List,
            "List",
            Category::Data,
            vec![
                ConfigField::array(
                    "items",
                    "Items",
                    "Item",
                    vec![ConfigField::text("text", "Text", "List item")],
                    json!({}),
                ),
                ConfigField::boolean("ordered", "Numbered", false),
            ],
        ),
        ComponentDefinition::new(
            ComponentKind::Tabs,
            "Tabs",
            Category::Data,
            vec![
                ConfigField::array(
                    "tabs",
                    "Tabs",
                    "Tab",
                    vec![
                        ConfigField::text("label", "Label", "Tab"),
                        ConfigField::text("key", "Key", ""),
                        ConfigField::boolean("disabled", "Disabled", false),
                    ],
                    json!({}),
                )
                .with_default(json!([
                    { "label": "Overview", "key": "overview", "disabled": false },
                    { "label": "Details", "key": "details", "disabled": false },
                ])),
                ConfigField::text("activeKey", "Active tab", "overview"),
            ],
        ),
        ComponentDefinition::new(
            ComponentKind::Chart,
            "Chart",
            Category::Data,
            vec![
                ConfigField::text("title", "Title", ""),
                ConfigField::select("chartType", "Chart type", &["bar", "line", "pie", "area"], "bar"),
                ConfigField::array(
                    "series",
                    "Series",
                    "Series",
                    vec![
                        ConfigField::text("name", "Name", "Series"),
                        ConfigField::color("color", "Color", "#2563eb"),
                        ConfigField::array(
                            "points",
                            "Points",
                            "Point",
                            vec![ConfigField::text("label", "Label", ""), ConfigField::number("value", "Value", 0.0)],
                            json!({}),
                        ),
                    ],
                    json!({}),
                ),
                ConfigField::structured("options", "Chart options", json!({})),
            ],
        ),
        ComponentDefinition::new(
            ComponentKind::Statistic,
            "Statistic",
            Category::Data,
            vec![
                ConfigField::text("label", "Label", "Metric"),
                ConfigField::text("value", "Value", "0"),
                ConfigField::text("prefix", "Prefix", ""),
                ConfigField::text("suffix", "Suffix", ""),
                ConfigField::select("trend", "Trend", &["none", "up", "down"], "none"),
            ],
        ),
    ]
}
