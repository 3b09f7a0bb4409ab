//! Canvas projection: turns a page's instance tree into a nested preview.
//!
//! This module receives read-only views of document state and produces a
//! [`CanvasFrame`] for the host layer to paint. It does not mutate any
//! document state; the only thing it owns is per-instance collapse state,
//! which is view state and never written to the store.
//!
//! Containers become [`ContainerNode`]s with a [`LayoutStyle`] derived from a
//! fixed per-kind base flow, overlaid with the instance's style overrides
//! (overrides always win). Leaves become [`LeafNode`]s carrying a typed
//! [`LeafPreview`] read from their config. Instances whose type is not
//! registered render nothing, and neither does their subtree.

#[cfg(test)]
#[path = "canvas_test.rs"]
mod canvas_test;

use std::collections::HashSet;
use std::fmt::Write as _;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::consts::DEFAULT_GAP;
use crate::doc::{ComponentInstance, DocStore, InstanceId, PageDoc, PageId, Size, StyleOverrides};
use crate::input::DropTarget;
use crate::registry::{ComponentDefinition, ComponentKind};

// =============================================================
// Layout derivation
// =============================================================

/// Main axis of a flow container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowDirection {
    /// Children laid out left to right.
    Horizontal,
    /// Children laid out top to bottom.
    Vertical,
}

/// Visual flow of a container: type defaults overlaid with overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutStyle {
    pub direction: FlowDirection,
    pub gap: String,
    pub align: String,
    pub justify: String,
    pub wrap: bool,
    pub background: Option<String>,
    pub padding: Option<String>,
    pub margin: Option<String>,
    pub border: Option<String>,
    pub border_radius: Option<String>,
}

impl LayoutStyle {
    fn flow(direction: FlowDirection, gap: &str, align: &str, justify: &str) -> Self {
        Self {
            direction,
            gap: gap.to_owned(),
            align: align.to_owned(),
            justify: justify.to_owned(),
            wrap: false,
            background: None,
            padding: None,
            margin: None,
            border: None,
            border_radius: None,
        }
    }

    /// Base flow for a container kind. `None` for leaf kinds.
    ///
    /// Row and column read gap and alignment from config; header and footer
    /// use fixed alignment.
    #[must_use]
    pub fn base(kind: ComponentKind, config: &ConfigView<'_>) -> Option<Self> {
        let style = match kind {
            ComponentKind::Row => {
                let mut style = Self::flow(
                    FlowDirection::Horizontal,
                    config.str_or("gap", DEFAULT_GAP),
                    config.str_or("align", "stretch"),
                    config.str_or("justify", "start"),
                );
                style.wrap = config.bool_or("wrap", false);
                style
            }
            ComponentKind::Column => Self::flow(
                FlowDirection::Vertical,
                config.str_or("gap", DEFAULT_GAP),
                config.str_or("align", "stretch"),
                "start",
            ),
            ComponentKind::Card => {
                let mut style = Self::flow(FlowDirection::Vertical, "12px", "stretch", "start");
                style.background = Some("#ffffff".into());
                style.padding = Some("16px".into());
                style.border = Some("1px solid #e5e7eb".into());
                style.border_radius = Some("8px".into());
                style
            }
            ComponentKind::Section => {
                let mut style = Self::flow(FlowDirection::Vertical, "16px", "stretch", "start");
                style.padding = Some("24px 0".into());
                style
            }
            ComponentKind::Header => {
                let mut style = Self::flow(FlowDirection::Horizontal, "16px", "center", "space-between");
                style.padding = Some("12px 24px".into());
                style
            }
            ComponentKind::Footer => {
                let mut style = Self::flow(FlowDirection::Horizontal, DEFAULT_GAP, "center", "center");
                style.padding = Some("16px 24px".into());
                style
            }
            _ => return None,
        };
        Some(style)
    }

    /// Overlay instance-level overrides.
    pub fn apply_overrides(&mut self, overrides: &StyleOverrides) {
        if let Some(v) = &overrides.background {
            self.background = Some(v.clone());
        }
        if let Some(v) = &overrides.padding {
            self.padding = Some(v.clone());
        }
        if let Some(v) = &overrides.margin {
            self.margin = Some(v.clone());
        }
        if let Some(v) = &overrides.gap {
            v.clone_into(&mut self.gap);
        }
        if let Some(v) = &overrides.border {
            self.border = Some(v.clone());
        }
        if let Some(v) = &overrides.border_radius {
            self.border_radius = Some(v.clone());
        }
    }

    /// CSS-like `(property, value)` pairs for the host layer.
    #[must_use]
    pub fn declarations(&self) -> Vec<(&'static str, String)> {
        let direction = match self.direction {
            FlowDirection::Horizontal => "row",
            FlowDirection::Vertical => "column",
        };
        let mut out = vec![
            ("display", "flex".to_owned()),
            ("flex-direction", direction.to_owned()),
            ("gap", self.gap.clone()),
            ("align-items", flex_keyword(&self.align)),
            ("justify-content", flex_keyword(&self.justify)),
        ];
        if self.wrap {
            out.push(("flex-wrap", "wrap".to_owned()));
        }
        let optional = [
            ("background", &self.background),
            ("padding", &self.padding),
            ("margin", &self.margin),
            ("border", &self.border),
            ("border-radius", &self.border_radius),
        ];
        for (property, value) in optional {
            if let Some(value) = value {
                out.push((property, value.clone()));
            }
        }
        out
    }
}

fn flex_keyword(value: &str) -> String {
    match value {
        "start" => "flex-start".to_owned(),
        "end" => "flex-end".to_owned(),
        other => other.to_owned(),
    }
}

/// Derive the layout for a container instance. `None` for leaves.
#[must_use]
pub fn derive_layout(def: &ComponentDefinition, instance: &ComponentInstance) -> Option<LayoutStyle> {
    let config = ConfigView::new(&instance.config, def);
    let mut style = LayoutStyle::base(def.kind, &config)?;
    style.apply_overrides(&instance.style);
    Some(style)
}

// =============================================================
// Config access
// =============================================================

/// Typed access to an instance's config, falling back to schema defaults.
pub struct ConfigView<'a> {
    config: &'a Map<String, Value>,
    def: &'a ComponentDefinition,
}

impl<'a> ConfigView<'a> {
    #[must_use]
    pub fn new(config: &'a Map<String, Value>, def: &'a ComponentDefinition) -> Self {
        Self { config, def }
    }

    /// The stored value, else the schema default.
    #[must_use]
    pub fn value(&self, key: &str) -> Option<&'a Value> {
        self.config
            .get(key)
            .or_else(|| self.def.field(key).map(|f| &f.default_value))
    }

    /// String value, or `default` when absent or not a string.
    #[must_use]
    pub fn str_or(&self, key: &str, default: &'a str) -> &'a str {
        self.value(key).and_then(Value::as_str).unwrap_or(default)
    }

    /// Numeric value, or `default` when absent or not a number.
    #[must_use]
    pub fn num_or(&self, key: &str, default: f64) -> f64 {
        self.value(key).and_then(Value::as_f64).unwrap_or(default)
    }

    /// Boolean value, or `default` when absent or not a bool.
    #[must_use]
    pub fn bool_or(&self, key: &str, default: bool) -> bool {
        self.value(key).and_then(Value::as_bool).unwrap_or(default)
    }

    /// For an array of objects, the string field `item_key` of each element.
    #[must_use]
    pub fn item_strings(&self, key: &str, item_key: &str) -> Vec<String> {
        self.value(key)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .map(|item| item.get(item_key).and_then(Value::as_str).unwrap_or_default().to_owned())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Length of an array value, or 0.
    #[must_use]
    pub fn len_of(&self, key: &str) -> usize {
        self.value(key).and_then(Value::as_array).map_or(0, Vec::len)
    }
}

// =============================================================
// Leaf previews
// =============================================================

/// Fixed, type-specific preview of a leaf instance.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum LeafPreview {
    Text { content: String, size: String, color: String, align: String },
    Heading { content: String, level: u8 },
    Button { label: String, variant: String, disabled: bool },
    Image { src: String, alt: String, fit: String },
    Divider { color: String, thickness: f64 },
    Spacer { height: f64 },
    Input { label: String, placeholder: String, input_type: String, required: bool },
    Select { label: String, placeholder: String, options: Vec<String> },
    Checkbox { label: String, checked: bool },
    Table { columns: Vec<String>, rows: usize, striped: bool },
    List { items: Vec<String>, ordered: bool },
    Tabs { tabs: Vec<String>, active: Option<usize> },
    Chart { chart_type: String, title: String, series: Vec<String> },
    Statistic { label: String, value: String, trend: String },
}

impl LeafPreview {
    /// Build the preview for a leaf kind. `None` for containers.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn build(kind: ComponentKind, c: &ConfigView<'_>) -> Option<Self> {
        let s = |key: &str| c.str_or(key, "").to_owned();
        let preview = match kind {
            ComponentKind::Text => Self::Text { content: s("content"), size: s("size"), color: s("color"), align: s("align") },
            ComponentKind::Heading => {
                Self::Heading { content: s("content"), level: c.num_or("level", 2.0).clamp(1.0, 6.0) as u8 }
            }
            ComponentKind::Button => {
                Self::Button { label: s("label"), variant: s("variant"), disabled: c.bool_or("disabled", false) }
            }
            ComponentKind::Image => Self::Image { src: s("src"), alt: s("alt"), fit: s("fit") },
            ComponentKind::Divider => Self::Divider { color: s("color"), thickness: c.num_or("thickness", 1.0) },
            ComponentKind::Spacer => Self::Spacer { height: c.num_or("height", 16.0) },
            ComponentKind::Input => Self::Input {
                label: s("label"),
                placeholder: s("placeholder"),
                input_type: s("inputType"),
                required: c.bool_or("required", false),
            },
            ComponentKind::Select => Self::Select {
                label: s("label"),
                placeholder: s("placeholder"),
                options: c.item_strings("options", "label"),
            },
            ComponentKind::Checkbox => Self::Checkbox { label: s("label"), checked: c.bool_or("checked", false) },
            ComponentKind::Table => Self::Table {
                columns: c.item_strings("columns", "title"),
                rows: c.len_of("dataSource"),
                striped: c.bool_or("striped", false),
            },
            ComponentKind::List => Self::List { items: c.item_strings("items", "text"), ordered: c.bool_or("ordered", false) },
            ComponentKind::Tabs => {
                let active_key = c.str_or("activeKey", "");
                let keys = c.item_strings("tabs", "key");
                Self::Tabs { tabs: c.item_strings("tabs", "label"), active: keys.iter().position(|k| k == active_key) }
            }
            ComponentKind::Chart => Self::Chart {
                chart_type: s("chartType"),
                title: s("title"),
                series: c.item_strings("series", "name"),
            },
            ComponentKind::Statistic => Self::Statistic {
                label: s("label"),
                value: format!("{}{}{}", c.str_or("prefix", ""), c.str_or("value", ""), c.str_or("suffix", "")),
                trend: s("trend"),
            },
            ComponentKind::Row
            | ComponentKind::Column
            | ComponentKind::Card
            | ComponentKind::Section
            | ComponentKind::Header
            | ComponentKind::Footer => return None,
        };
        Some(preview)
    }

    /// One-line textual summary.
    #[must_use]
    pub fn summary(&self) -> String {
        match self {
            Self::Text { content, .. } => format!("text \"{content}\""),
            Self::Heading { content, level } => format!("h{level} \"{content}\""),
            Self::Button { label, variant, disabled } => {
                let state = if *disabled { " disabled" } else { "" };
                format!("button [{variant}] \"{label}\"{state}")
            }
            Self::Image { src, alt, .. } => format!("image {src} \"{alt}\""),
            Self::Divider { thickness, .. } => format!("divider {thickness}px"),
            Self::Spacer { height } => format!("spacer {height}px"),
            Self::Input { label, input_type, .. } => format!("input<{input_type}> \"{label}\""),
            Self::Select { label, options, .. } => format!("select \"{label}\" ({} options)", options.len()),
            Self::Checkbox { label, checked } => format!("[{}] {label}", if *checked { "x" } else { " " }),
            Self::Table { columns, rows, .. } => format!("table [{}] {rows} rows", columns.join(" | ")),
            Self::List { items, ordered } => {
                format!("{} list ({} items)", if *ordered { "numbered" } else { "bulleted" }, items.len())
            }
            Self::Tabs { tabs, .. } => format!("tabs [{}]", tabs.join(" | ")),
            Self::Chart { chart_type, series, .. } => format!("{chart_type} chart ({} series)", series.len()),
            Self::Statistic { label, value, .. } => format!("{label}: {value}"),
        }
    }
}

// =============================================================
// Canvas nodes
// =============================================================

/// A container with its drop-accepting children region.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerNode {
    pub id: InstanceId,
    pub kind: ComponentKind,
    pub size: Size,
    pub layout: LayoutStyle,
    pub selected: bool,
    pub collapsed: bool,
    /// The in-flight drag would drop here.
    pub drop_highlight: bool,
    /// Number of direct children, including hidden ones when collapsed.
    pub child_count: usize,
    /// Rendered children; empty while collapsed.
    pub children: Vec<CanvasNode>,
}

/// A leaf with its fixed preview.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeafNode {
    pub id: InstanceId,
    pub kind: ComponentKind,
    pub size: Size,
    pub selected: bool,
    pub preview: LeafPreview,
}

/// One rendered node.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CanvasNode {
    Container(ContainerNode),
    Leaf(LeafNode),
}

impl CanvasNode {
    #[must_use]
    pub fn id(&self) -> InstanceId {
        match self {
            Self::Container(node) => node.id,
            Self::Leaf(node) => node.id,
        }
    }

    #[must_use]
    pub fn kind(&self) -> ComponentKind {
        match self {
            Self::Container(node) => node.kind,
            Self::Leaf(node) => node.kind,
        }
    }
}

/// A full rendered page.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasFrame {
    /// The in-flight drag would drop at the page root.
    pub root_highlight: bool,
    /// Root nodes in order.
    pub nodes: Vec<CanvasNode>,
}

/// Canvas view state: which containers are collapsed.
#[derive(Debug, Clone, Default)]
pub struct CanvasView {
    collapsed: HashSet<InstanceId>,
}

impl CanvasView {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip a container's collapse state. Returns the new state.
    pub fn toggle_collapsed(&mut self, id: InstanceId) -> bool {
        if self.collapsed.remove(&id) {
            false
        } else {
            self.collapsed.insert(id);
            true
        }
    }

    #[must_use]
    pub fn is_collapsed(&self, id: &InstanceId) -> bool {
        self.collapsed.contains(id)
    }

    /// Drop view state for instances that no longer exist.
    pub fn forget(&mut self, ids: &[InstanceId]) {
        for id in ids {
            self.collapsed.remove(id);
        }
    }

    /// Render a page. Empty when the page doesn't exist.
    #[must_use]
    pub fn render(
        &self,
        doc: &DocStore,
        page_id: &PageId,
        selected: Option<InstanceId>,
        highlight: Option<DropTarget>,
    ) -> CanvasFrame {
        let Some(page) = doc.page(page_id) else {
            return CanvasFrame::default();
        };
        let ctx = RenderCtx { doc, page, selected, highlight, view: self };
        CanvasFrame {
            root_highlight: highlight == Some(DropTarget::Root),
            nodes: ctx.render_group(None),
        }
    }
}

struct RenderCtx<'a> {
    doc: &'a DocStore,
    page: &'a PageDoc,
    selected: Option<InstanceId>,
    highlight: Option<DropTarget>,
    view: &'a CanvasView,
}

impl RenderCtx<'_> {
    fn render_group(&self, parent: Option<InstanceId>) -> Vec<CanvasNode> {
        self.page
            .child_ids(parent)
            .iter()
            .filter_map(|id| self.page.get(id))
            .filter_map(|inst| self.render_node(inst))
            .collect()
    }

    fn render_node(&self, inst: &ComponentInstance) -> Option<CanvasNode> {
        let def = self.doc.registry().lookup(&inst.component_type)?;
        let selected = self.selected == Some(inst.id);

        if let Some(layout) = derive_layout(def, inst) {
            let collapsed = self.view.is_collapsed(&inst.id);
            let child_count = self.page.child_ids(Some(inst.id)).len();
            let children = if collapsed { Vec::new() } else { self.render_group(Some(inst.id)) };
            return Some(CanvasNode::Container(ContainerNode {
                id: inst.id,
                kind: def.kind,
                size: inst.size.clone(),
                layout,
                selected,
                collapsed,
                drop_highlight: self.highlight == Some(DropTarget::Container(inst.id)),
                child_count,
                children,
            }));
        }

        let preview = LeafPreview::build(def.kind, &ConfigView::new(&inst.config, def))?;
        Some(CanvasNode::Leaf(LeafNode { id: inst.id, kind: def.kind, size: inst.size.clone(), selected, preview }))
    }
}

/// Plain-text rendering of a frame, one node per line.
#[must_use]
pub fn outline(frame: &CanvasFrame) -> String {
    let mut out = String::new();
    if frame.root_highlight {
        out.push_str("(drop here)\n");
    }
    let mut stack: Vec<(usize, &CanvasNode)> = frame.nodes.iter().rev().map(|n| (0, n)).collect();
    while let Some((depth, node)) = stack.pop() {
        let indent = "  ".repeat(depth);
        let marker = match node {
            CanvasNode::Container(c) if c.selected => " *",
            CanvasNode::Leaf(l) if l.selected => " *",
            _ => "",
        };
        match node {
            CanvasNode::Container(c) => {
                let direction = match c.layout.direction {
                    FlowDirection::Horizontal => "→",
                    FlowDirection::Vertical => "↓",
                };
                let folded = if c.collapsed { format!(" (+{} hidden)", c.child_count) } else { String::new() };
                let drop = if c.drop_highlight { " (drop here)" } else { "" };
                // Writing to a String cannot fail.
                if writeln!(out, "{indent}{} {direction} gap {}{folded}{drop}{marker}", c.kind.as_str(), c.layout.gap)
                    .is_err()
                {
                    break;
                }
                stack.extend(c.children.iter().rev().map(|n| (depth + 1, n)));
            }
            CanvasNode::Leaf(l) => {
                if writeln!(out, "{indent}{}{marker}", l.preview.summary()).is_err() {
                    break;
                }
            }
        }
    }
    out
}
