//! Shared defaults and limits for the editor crate.

// ── Instance sizing ─────────────────────────────────────────────

/// Width given to new instances when the caller supplies no size.
pub const DEFAULT_WIDTH: &str = "100%";

/// Height given to new instances when the caller supplies no size.
pub const DEFAULT_HEIGHT: &str = "auto";

// ── Structured literal decoding ─────────────────────────────────

/// Largest free-text input the decode chain will look at, in bytes.
pub const MAX_LITERAL_BYTES: usize = 64 * 1024;

/// Deepest bracket nesting the relaxed literal parser accepts.
pub const MAX_LITERAL_DEPTH: usize = 64;

// ── Views ───────────────────────────────────────────────────────

/// Columns of indentation per tree depth level.
pub const TREE_INDENT: usize = 2;

/// Gap used by flow containers whose config leaves it unset.
pub const DEFAULT_GAP: &str = "8px";
