//! Document model: pages, component instances, and the in-memory store.
//!
//! This module defines the data types that describe what is placed on a page
//! ([`ComponentInstance`], [`StyleOverrides`], [`Size`]), sparse-update and
//! creation request types ([`PartialComponent`], [`NewComponent`]), the
//! serializable [`Page`] hand-off artifact, and the runtime store that owns
//! all live pages ([`DocStore`]).
//!
//! DESIGN
//! ======
//! Each page keeps its instances in a flat arena keyed by id plus an index
//! from parent id (`None` for roots) to the ordered child id list. The index
//! is maintained on every mutation, so [`DocStore::child_components`] is a
//! direct lookup and both views re-derive hierarchy from it rather than
//! caching structure. Structural violations are rejected with a
//! [`StoreError`] and leave the store untouched; updates and deletes of
//! missing ids are no-ops.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::consts::{DEFAULT_HEIGHT, DEFAULT_WIDTH};
use crate::registry::Registry;

/// Unique identifier for a component instance.
pub type InstanceId = Uuid;

/// Unique identifier for a page.
pub type PageId = Uuid;

// =============================================================================
// TYPES
// =============================================================================

/// Visual overrides layered on top of a component's type defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleOverrides {
    /// Background color or image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    /// Inner spacing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding: Option<String>,
    /// Outer spacing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin: Option<String>,
    /// Spacing between children of a flow container.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gap: Option<String>,
    /// Border shorthand.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border: Option<String>,
    /// Corner radius.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_radius: Option<String>,
}

impl StyleOverrides {
    /// Overwrite every field that is set in `other`. An empty string clears
    /// the override.
    pub fn merge(&mut self, other: &StyleOverrides) {
        let pairs = [
            (&mut self.background, &other.background),
            (&mut self.padding, &other.padding),
            (&mut self.margin, &other.margin),
            (&mut self.gap, &other.gap),
            (&mut self.border, &other.border),
            (&mut self.border_radius, &other.border_radius),
        ];
        for (slot, incoming) in pairs {
            match incoming.as_deref() {
                Some("") => *slot = None,
                Some(value) => *slot = Some(value.to_owned()),
                None => {}
            }
        }
    }

    /// Returns `true` if no override is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Display size as unit strings (e.g. `"50%"`, `"240px"`, `"auto"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    /// Width.
    pub width: String,
    /// Height.
    pub height: String,
}

impl Size {
    #[must_use]
    pub fn new(width: &str, height: &str) -> Self {
        Self { width: width.to_owned(), height: height.to_owned() }
    }
}

impl Default for Size {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }
}

/// Sparse size update. Only present fields are applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialSize {
    /// New width, if being updated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<String>,
    /// New height, if being updated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<String>,
}

/// One placed, configured node in a page's tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentInstance {
    /// Unique identifier, assigned at creation.
    pub id: InstanceId,
    /// Registry type name.
    #[serde(rename = "type")]
    pub component_type: String,
    /// Owning container, or `None` at the page root.
    pub parent_id: Option<InstanceId>,
    /// Position among siblings; lower values come first.
    pub order: i64,
    /// Field values keyed by schema key.
    #[serde(default)]
    pub config: Map<String, Value>,
    /// Visual overrides.
    #[serde(default, skip_serializing_if = "StyleOverrides::is_empty")]
    pub style: StyleOverrides,
    /// Display size.
    #[serde(default)]
    pub size: Size,
}

/// Creation request for [`DocStore::add_component`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewComponent {
    /// Registry type name.
    pub component_type: String,
    /// Config merged over the definition's defaults.
    pub config: Map<String, Value>,
    /// Target container, or `None` for the page root.
    pub parent_id: Option<InstanceId>,
    /// Size; the store default when absent.
    pub size: Option<Size>,
    /// Initial style overrides.
    pub style: Option<StyleOverrides>,
}

impl NewComponent {
    #[must_use]
    pub fn new(component_type: &str) -> Self {
        Self { component_type: component_type.to_owned(), ..Self::default() }
    }

    #[must_use]
    pub fn child_of(mut self, parent_id: InstanceId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    #[must_use]
    pub fn with_parent(mut self, parent_id: Option<InstanceId>) -> Self {
        self.parent_id = parent_id;
        self
    }

    #[must_use]
    pub fn with_config(mut self, config: Map<String, Value>) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn with_size(mut self, size: Size) -> Self {
        self.size = Some(size);
        self
    }

    #[must_use]
    pub fn with_style(mut self, style: StyleOverrides) -> Self {
        self.style = Some(style);
        self
    }
}

/// Sparse update for a component instance. Only present fields are applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialComponent {
    /// Config keys to merge or remove (null values delete keys).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Map<String, Value>>,
    /// Style fields to overwrite.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<StyleOverrides>,
    /// Size fields to overwrite.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<PartialSize>,
}

impl PartialComponent {
    /// A partial that sets a single config key.
    #[must_use]
    pub fn config_value(key: &str, value: Value) -> Self {
        let mut config = Map::new();
        config.insert(key.to_owned(), value);
        Self { config: Some(config), ..Self::default() }
    }
}

/// A finished page definition, as handed to preview/run renderers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Unique identifier.
    pub id: PageId,
    /// Display name.
    pub name: String,
    /// Route the page is served at.
    pub route: String,
    /// Every instance on the page; hierarchy is carried by `parentId`/`order`.
    #[serde(default)]
    pub instances: Vec<ComponentInstance>,
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("page not found: {0}")]
    PageNotFound(PageId),
    #[error("unknown component type: {0}")]
    UnknownType(String),
    #[error("component not found: {0}")]
    NotFound(InstanceId),
    #[error("parent not found: {0}")]
    ParentNotFound(InstanceId),
    #[error("parent is not a container: {0}")]
    ParentNotContainer(InstanceId),
    #[error("moving {id} under {parent} would create a cycle")]
    Cycle { id: InstanceId, parent: InstanceId },
    #[error("duplicate component id: {0}")]
    DuplicateId(InstanceId),
}

impl StoreError {
    /// Stable machine-readable code for this error.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::PageNotFound(_) => "E_PAGE_NOT_FOUND",
            Self::UnknownType(_) => "E_UNKNOWN_TYPE",
            Self::NotFound(_) => "E_COMPONENT_NOT_FOUND",
            Self::ParentNotFound(_) => "E_PARENT_NOT_FOUND",
            Self::ParentNotContainer(_) => "E_PARENT_NOT_CONTAINER",
            Self::Cycle { .. } => "E_CYCLE",
            Self::DuplicateId(_) => "E_DUPLICATE_ID",
        }
    }
}

// =============================================================================
// PAGE DOCUMENT
// =============================================================================

/// One page's instances and child index.
#[derive(Debug, Clone)]
pub struct PageDoc {
    id: PageId,
    name: String,
    route: String,
    instances: HashMap<InstanceId, ComponentInstance>,
    children: HashMap<Option<InstanceId>, Vec<InstanceId>>,
}

impl PageDoc {
    fn new(id: PageId, name: String, route: String) -> Self {
        Self { id, name, route, instances: HashMap::new(), children: HashMap::new() }
    }

    #[must_use]
    pub fn id(&self) -> PageId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn route(&self) -> &str {
        &self.route
    }

    /// Look up an instance by id.
    #[must_use]
    pub fn get(&self, id: &InstanceId) -> Option<&ComponentInstance> {
        self.instances.get(id)
    }

    /// Ordered child ids of `parent` (`None` for roots).
    #[must_use]
    pub fn child_ids(&self, parent: Option<InstanceId>) -> &[InstanceId] {
        self.children.get(&parent).map_or(&[], Vec::as_slice)
    }

    /// Number of instances on the page.
    #[must_use]
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Returns `true` if the page has no instances.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Order for an append to `parent`'s group: one past the largest, or 0.
    /// A group whose largest order is `i64::MAX` is renumbered `0..n` first.
    fn next_order(&mut self, parent: Option<InstanceId>) -> i64 {
        let last = self.child_ids(parent).last().and_then(|id| self.instances.get(id)).map(|inst| inst.order);
        match last {
            None => 0,
            Some(order) => match order.checked_add(1) {
                Some(next) => next,
                None => {
                    self.renumber(parent);
                    i64::try_from(self.child_ids(parent).len()).unwrap_or(i64::MAX)
                }
            },
        }
    }

    /// Whether `candidate` is `ancestor` itself or lies in its subtree.
    fn is_within(&self, ancestor: InstanceId, candidate: InstanceId) -> bool {
        let mut cursor = Some(candidate);
        let mut steps = 0;
        while let Some(id) = cursor {
            if id == ancestor {
                return true;
            }
            steps += 1;
            if steps > self.instances.len() {
                return false;
            }
            cursor = self.instances.get(&id).and_then(|inst| inst.parent_id);
        }
        false
    }

    fn sort_group(&mut self, parent: Option<InstanceId>) {
        let instances = &self.instances;
        if let Some(group) = self.children.get_mut(&parent) {
            group.sort_by_key(|id| (instances.get(id).map_or(i64::MAX, |i| i.order), *id));
        }
    }

    fn insert_instance(&mut self, instance: ComponentInstance) {
        let parent = instance.parent_id;
        self.children.entry(parent).or_default().push(instance.id);
        self.instances.insert(instance.id, instance);
        self.sort_group(parent);
    }

    fn detach(&mut self, id: InstanceId, parent: Option<InstanceId>) {
        if let Some(group) = self.children.get_mut(&parent) {
            group.retain(|c| *c != id);
            if group.is_empty() {
                self.children.remove(&parent);
            }
        }
    }

    /// Reassign orders `0..n` to `parent`'s group in its current sequence.
    fn renumber(&mut self, parent: Option<InstanceId>) {
        let Some(group) = self.children.get(&parent) else {
            return;
        };
        for (position, id) in group.iter().enumerate() {
            if let Some(inst) = self.instances.get_mut(id) {
                inst.order = i64::try_from(position).unwrap_or(i64::MAX);
            }
        }
    }

    fn descendants(&self, id: InstanceId) -> Vec<InstanceId> {
        let mut out = Vec::new();
        let mut stack: Vec<InstanceId> = self.child_ids(Some(id)).iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.child_ids(Some(current)).iter().rev().copied());
        }
        out
    }

    /// Depth-first pre-order traversal from the roots, with depth.
    fn walk(&self) -> Vec<(usize, &ComponentInstance)> {
        let mut out = Vec::with_capacity(self.instances.len());
        let mut stack: Vec<(usize, InstanceId)> = self.child_ids(None).iter().rev().map(|id| (0, *id)).collect();
        while let Some((depth, id)) = stack.pop() {
            let Some(inst) = self.instances.get(&id) else {
                continue;
            };
            out.push((depth, inst));
            stack.extend(self.child_ids(Some(id)).iter().rev().map(|c| (depth + 1, *c)));
        }
        out
    }
}

// =============================================================================
// STORE
// =============================================================================

/// In-memory store of pages and their component instances.
#[derive(Debug, Clone)]
pub struct DocStore {
    registry: Arc<Registry>,
    pages: HashMap<PageId, PageDoc>,
    page_order: Vec<PageId>,
    default_size: Size,
}

impl DocStore {
    /// Create an empty store backed by `registry`.
    #[must_use]
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry, pages: HashMap::new(), page_order: Vec::new(), default_size: Size::default() }
    }

    /// Replace the size given to new instances created without one.
    #[must_use]
    pub fn with_default_size(mut self, size: Size) -> Self {
        self.default_size = size;
        self
    }

    /// The registry this store validates types against.
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    // --- Pages ---

    /// Create an empty page and return its id.
    pub fn create_page(&mut self, name: &str, route: &str) -> PageId {
        let id = Uuid::new_v4();
        self.pages.insert(id, PageDoc::new(id, name.to_owned(), route.to_owned()));
        self.page_order.push(id);
        tracing::debug!(page_id = %id, name, route, "page created");
        id
    }

    /// Remove a page and everything on it. Returns false if it didn't exist.
    pub fn delete_page(&mut self, page_id: &PageId) -> bool {
        if self.pages.remove(page_id).is_none() {
            return false;
        }
        self.page_order.retain(|id| id != page_id);
        tracing::debug!(%page_id, "page deleted");
        true
    }

    /// Rename a page. Returns false if it doesn't exist.
    pub fn rename_page(&mut self, page_id: &PageId, name: &str) -> bool {
        let Some(page) = self.pages.get_mut(page_id) else {
            return false;
        };
        name.clone_into(&mut page.name);
        true
    }

    /// Look up a page.
    #[must_use]
    pub fn page(&self, page_id: &PageId) -> Option<&PageDoc> {
        self.pages.get(page_id)
    }

    /// All pages in creation order.
    #[must_use]
    pub fn pages(&self) -> Vec<&PageDoc> {
        self.page_order.iter().filter_map(|id| self.pages.get(id)).collect()
    }

    fn page_mut(&mut self, page_id: &PageId) -> Result<&mut PageDoc, StoreError> {
        self.pages.get_mut(page_id).ok_or(StoreError::PageNotFound(*page_id))
    }

    // --- Instances ---

    /// Create an instance and append it to its target sibling group.
    ///
    /// The definition's default config is merged under `request.config`.
    ///
    /// # Errors
    ///
    /// Returns `PageNotFound`, `UnknownType`, `ParentNotFound` or
    /// `ParentNotContainer`; the store is unchanged in every error case.
    pub fn add_component(&mut self, page_id: &PageId, request: NewComponent) -> Result<InstanceId, StoreError> {
        let Some(def) = self.registry.lookup(&request.component_type) else {
            tracing::warn!(%page_id, component_type = %request.component_type, "add rejected: unknown type");
            return Err(StoreError::UnknownType(request.component_type));
        };
        let mut config = def.default_config.clone();
        for (key, value) in request.config {
            config.insert(key, value);
        }

        let registry = Arc::clone(&self.registry);
        let default_size = self.default_size.clone();
        let page = self.page_mut(page_id)?;

        if let Some(parent_id) = request.parent_id {
            let parent = page.get(&parent_id).ok_or(StoreError::ParentNotFound(parent_id))?;
            if !registry.is_container(&parent.component_type) {
                tracing::warn!(%page_id, %parent_id, "add rejected: parent is not a container");
                return Err(StoreError::ParentNotContainer(parent_id));
            }
        }

        let instance = ComponentInstance {
            id: Uuid::new_v4(),
            component_type: request.component_type,
            parent_id: request.parent_id,
            order: page.next_order(request.parent_id),
            config,
            style: request.style.unwrap_or_default(),
            size: request.size.unwrap_or(default_size),
        };
        let id = instance.id;
        tracing::debug!(%page_id, %id, component_type = %instance.component_type, order = instance.order, "component added");
        page.insert_instance(instance);
        Ok(id)
    }

    /// Remove an instance and every transitive descendant.
    ///
    /// Returns the removed ids, the target first. Empty if nothing matched.
    pub fn delete_component(&mut self, page_id: &PageId, id: &InstanceId) -> Vec<InstanceId> {
        let Some(page) = self.pages.get_mut(page_id) else {
            return Vec::new();
        };
        let Some(parent) = page.get(id).map(|inst| inst.parent_id) else {
            return Vec::new();
        };

        let mut removed = Vec::new();
        let mut worklist = vec![*id];
        while let Some(current) = worklist.pop() {
            if let Some(kids) = page.children.remove(&Some(current)) {
                worklist.extend(kids);
            }
            if page.instances.remove(&current).is_some() {
                removed.push(current);
            }
        }
        page.detach(*id, parent);

        tracing::debug!(%page_id, %id, removed = removed.len(), "component deleted");
        removed
    }

    /// Shallow-merge `partial` into an instance. Returns false if it doesn't exist.
    ///
    /// Config keys overwrite and null values delete; style and size fields
    /// overwrite individually. Identity and placement never change here.
    pub fn update_component(&mut self, page_id: &PageId, id: &InstanceId, partial: &PartialComponent) -> bool {
        let Some(inst) = self.pages.get_mut(page_id).and_then(|p| p.instances.get_mut(id)) else {
            return false;
        };
        if let Some(config) = &partial.config {
            for (key, value) in config {
                if value.is_null() {
                    inst.config.remove(key);
                } else {
                    inst.config.insert(key.clone(), value.clone());
                }
            }
        }
        if let Some(style) = &partial.style {
            inst.style.merge(style);
        }
        if let Some(size) = &partial.size {
            if let Some(width) = &size.width {
                width.clone_into(&mut inst.size.width);
            }
            if let Some(height) = &size.height {
                height.clone_into(&mut inst.size.height);
            }
        }
        tracing::debug!(%page_id, %id, "component updated");
        true
    }

    /// Look up an instance.
    #[must_use]
    pub fn get_component(&self, page_id: &PageId, id: &InstanceId) -> Option<&ComponentInstance> {
        self.pages.get(page_id).and_then(|p| p.get(id))
    }

    /// The sibling group under `parent` (`None` for roots), ascending by order.
    ///
    /// Empty when the page or parent is unknown.
    #[must_use]
    pub fn child_components(&self, page_id: &PageId, parent: Option<InstanceId>) -> Vec<&ComponentInstance> {
        let Some(page) = self.pages.get(page_id) else {
            return Vec::new();
        };
        page.child_ids(parent).iter().filter_map(|id| page.get(id)).collect()
    }

    /// Move an instance under `new_parent` (`None` for root).
    ///
    /// `position` is an insertion index into the target group; the group is
    /// then renumbered `0..n`. `None` appends with the usual `max + 1` order.
    ///
    /// # Errors
    ///
    /// Returns `PageNotFound`, `NotFound`, `ParentNotFound`,
    /// `ParentNotContainer` or `Cycle`; the store is unchanged in every
    /// error case.
    pub fn reparent(
        &mut self,
        page_id: &PageId,
        id: &InstanceId,
        new_parent: Option<InstanceId>,
        position: Option<usize>,
    ) -> Result<(), StoreError> {
        let registry = Arc::clone(&self.registry);
        let page = self.page_mut(page_id)?;
        let old_parent = page.get(id).ok_or(StoreError::NotFound(*id))?.parent_id;

        if let Some(parent_id) = new_parent {
            let parent = page.get(&parent_id).ok_or(StoreError::ParentNotFound(parent_id))?;
            if !registry.is_container(&parent.component_type) {
                tracing::warn!(%page_id, %id, %parent_id, "move rejected: parent is not a container");
                return Err(StoreError::ParentNotContainer(parent_id));
            }
            if page.is_within(*id, parent_id) {
                tracing::warn!(%page_id, %id, %parent_id, "move rejected: cycle");
                return Err(StoreError::Cycle { id: *id, parent: parent_id });
            }
        }

        page.detach(*id, old_parent);
        match position {
            None => {
                let order = page.next_order(new_parent);
                if let Some(inst) = page.instances.get_mut(id) {
                    inst.parent_id = new_parent;
                    inst.order = order;
                }
                page.children.entry(new_parent).or_default().push(*id);
            }
            Some(index) => {
                if let Some(inst) = page.instances.get_mut(id) {
                    inst.parent_id = new_parent;
                }
                let group = page.children.entry(new_parent).or_default();
                let index = index.min(group.len());
                group.insert(index, *id);
                page.renumber(new_parent);
            }
        }
        tracing::debug!(%page_id, %id, parent = ?new_parent, "component moved");
        Ok(())
    }

    /// Deep-copy an instance's subtree with fresh ids.
    ///
    /// The copy is appended to the end of the original's sibling group.
    ///
    /// # Errors
    ///
    /// Returns `PageNotFound` or `NotFound`.
    pub fn duplicate_component(&mut self, page_id: &PageId, id: &InstanceId) -> Result<InstanceId, StoreError> {
        let page = self.page_mut(page_id)?;
        let original = page.get(id).ok_or(StoreError::NotFound(*id))?;

        let mut root = original.clone();
        root.id = Uuid::new_v4();
        root.order = page.next_order(root.parent_id);
        let new_root = root.id;

        let mut mapping: HashMap<InstanceId, InstanceId> = HashMap::new();
        mapping.insert(*id, new_root);
        let mut copies = vec![root];
        for old in page.descendants(*id) {
            let Some(source) = page.get(&old) else {
                continue;
            };
            let mut copy = source.clone();
            copy.id = Uuid::new_v4();
            copy.parent_id = source.parent_id.and_then(|p| mapping.get(&p).copied());
            mapping.insert(old, copy.id);
            copies.push(copy);
        }

        let count = copies.len();
        for copy in copies {
            page.insert_instance(copy);
        }
        tracing::debug!(%page_id, %id, copy = %new_root, count, "component duplicated");
        Ok(new_root)
    }

    /// Every transitive descendant of `id`, in depth-first pre-order.
    #[must_use]
    pub fn descendants(&self, page_id: &PageId, id: &InstanceId) -> Vec<InstanceId> {
        self.pages.get(page_id).map_or_else(Vec::new, |p| p.descendants(*id))
    }

    /// Ancestors of `id`, nearest first.
    #[must_use]
    pub fn ancestors(&self, page_id: &PageId, id: &InstanceId) -> Vec<InstanceId> {
        let Some(page) = self.pages.get(page_id) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        let mut cursor = page.get(id).and_then(|inst| inst.parent_id);
        while let Some(parent) = cursor {
            if out.contains(&parent) {
                break;
            }
            out.push(parent);
            cursor = page.get(&parent).and_then(|inst| inst.parent_id);
        }
        out
    }

    /// Depth of `id`: 1 for roots. `None` if it doesn't exist.
    #[must_use]
    pub fn depth(&self, page_id: &PageId, id: &InstanceId) -> Option<usize> {
        self.get_component(page_id, id)?;
        Some(self.ancestors(page_id, id).len() + 1)
    }

    /// Depth-first pre-order traversal of a page, with 0-based depth.
    #[must_use]
    pub fn walk(&self, page_id: &PageId) -> Vec<(usize, &ComponentInstance)> {
        self.pages.get(page_id).map_or_else(Vec::new, PageDoc::walk)
    }

    // --- Page definition boundary ---

    /// Snapshot a page as a hand-off artifact, instances in walk order.
    #[must_use]
    pub fn export_page(&self, page_id: &PageId) -> Option<Page> {
        let page = self.pages.get(page_id)?;
        Some(Page {
            id: page.id,
            name: page.name.clone(),
            route: page.route.clone(),
            instances: page.walk().into_iter().map(|(_, inst)| inst.clone()).collect(),
        })
    }

    /// Load a page definition, replacing any page with the same id.
    ///
    /// Unknown component types are kept. Sibling groups with repeated
    /// orders are renumbered, ties broken by id.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateId`, `ParentNotFound`, `ParentNotContainer` or
    /// `Cycle` for structurally invalid pages; nothing is loaded then.
    pub fn import_page(&mut self, definition: Page) -> Result<PageId, StoreError> {
        let mut doc = PageDoc::new(definition.id, definition.name, definition.route);
        for inst in definition.instances {
            if doc.instances.contains_key(&inst.id) {
                return Err(StoreError::DuplicateId(inst.id));
            }
            doc.instances.insert(inst.id, inst);
        }

        for inst in doc.instances.values() {
            let Some(parent_id) = inst.parent_id else {
                continue;
            };
            let parent = doc.instances.get(&parent_id).ok_or(StoreError::ParentNotFound(parent_id))?;
            if !self.registry.is_container(&parent.component_type) {
                return Err(StoreError::ParentNotContainer(parent_id));
            }
        }

        for inst in doc.instances.values() {
            doc.children.entry(inst.parent_id).or_default().push(inst.id);
        }
        let parents: Vec<Option<InstanceId>> = doc.children.keys().copied().collect();
        for parent in parents {
            doc.sort_group(parent);
            let group = doc.child_ids(parent);
            let orders: HashSet<i64> = group.iter().filter_map(|id| doc.get(id)).map(|i| i.order).collect();
            if orders.len() != group.len() {
                doc.renumber(parent);
            }
        }

        if doc.walk().len() != doc.instances.len() {
            let reachable: HashSet<InstanceId> = doc.walk().into_iter().map(|(_, inst)| inst.id).collect();
            let stray = doc.instances.values().find(|inst| !reachable.contains(&inst.id));
            if let Some(inst) = stray {
                return Err(StoreError::Cycle { id: inst.id, parent: inst.parent_id.unwrap_or(inst.id) });
            }
        }

        let id = doc.id;
        let count = doc.instances.len();
        if self.pages.insert(id, doc).is_none() {
            self.page_order.push(id);
        }
        tracing::debug!(page_id = %id, count, "page imported");
        Ok(id)
    }
}
