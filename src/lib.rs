//! Headless engine for a visual page builder.
//!
//! The crate owns the editing model behind a drag-and-drop page designer:
//! a catalog of component definitions, a per-page tree of component
//! instances, and the view models that a host UI paints (nested canvas
//! preview, indented tree, schema-driven property form). The host layer is
//! responsible only for wiring DOM or terminal events into
//! [`engine::EngineCore`] and painting what it returns.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`registry`] | Component definitions, config schemas, container rules |
//! | [`catalog`] | The built-in component definitions |
//! | [`doc`] | Pages, component instances and the [`doc::DocStore`] |
//! | [`canvas`] | Nested preview projection and per-type layout derivation |
//! | [`input`] | Drag payloads, pointer targets and gesture state |
//! | [`engine`] | [`engine::EngineCore`] wiring store, views and selection |
//! | [`tree`] | Linear, indented tree view of a page |
//! | [`inspector`] | Property form, array editor and relaxed literal decoding |
//! | [`config`] | Editor configuration from the environment |
//! | [`consts`] | Shared defaults and limits |

pub mod canvas;
pub mod catalog;
pub mod config;
pub mod consts;
pub mod doc;
pub mod engine;
pub mod input;
pub mod inspector;
pub mod registry;
pub mod tree;
