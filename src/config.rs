//! Editor configuration parsed from environment variables.

use crate::consts::{DEFAULT_HEIGHT, DEFAULT_WIDTH, MAX_LITERAL_BYTES, MAX_LITERAL_DEPTH, TREE_INDENT};
use crate::doc::Size;
use crate::inspector::DecodeLimits;

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a non-negative integer, got {value:?}")]
    InvalidNumber { var: &'static str, value: String },
    #[error("{var} must not be empty")]
    Empty { var: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorConfig {
    /// Size given to new instances that don't specify one.
    pub default_size: Size,
    /// Bounds on structured-field decoding.
    pub literal_limits: DecodeLimits,
    /// Tree view columns per depth level.
    pub tree_indent: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            default_size: Size::new(DEFAULT_WIDTH, DEFAULT_HEIGHT),
            literal_limits: DecodeLimits { max_bytes: MAX_LITERAL_BYTES, max_depth: MAX_LITERAL_DEPTH },
            tree_indent: TREE_INDENT,
        }
    }
}

impl EditorConfig {
    /// Build config from the process environment.
    ///
    /// Optional:
    /// - `PAGECRAFT_DEFAULT_WIDTH`: default `100%`
    /// - `PAGECRAFT_DEFAULT_HEIGHT`: default `auto`
    /// - `PAGECRAFT_MAX_LITERAL_BYTES`: default 65536
    /// - `PAGECRAFT_MAX_LITERAL_DEPTH`: default 64
    /// - `PAGECRAFT_TREE_INDENT`: default 2
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for malformed values.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for malformed values.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let width = parse_unit(&lookup, "PAGECRAFT_DEFAULT_WIDTH", DEFAULT_WIDTH)?;
        let height = parse_unit(&lookup, "PAGECRAFT_DEFAULT_HEIGHT", DEFAULT_HEIGHT)?;
        let literal_limits = DecodeLimits {
            max_bytes: parse_usize(&lookup, "PAGECRAFT_MAX_LITERAL_BYTES", MAX_LITERAL_BYTES)?,
            max_depth: parse_usize(&lookup, "PAGECRAFT_MAX_LITERAL_DEPTH", MAX_LITERAL_DEPTH)?,
        };
        let tree_indent = parse_usize(&lookup, "PAGECRAFT_TREE_INDENT", TREE_INDENT)?;

        Ok(Self { default_size: Size { width, height }, literal_limits, tree_indent })
    }
}

fn parse_unit(lookup: &impl Fn(&str) -> Option<String>, var: &'static str, default: &str) -> Result<String, ConfigError> {
    match lookup(var) {
        None => Ok(default.to_owned()),
        Some(raw) if raw.trim().is_empty() => Err(ConfigError::Empty { var }),
        Some(raw) => Ok(raw.trim().to_owned()),
    }
}

fn parse_usize(lookup: &impl Fn(&str) -> Option<String>, var: &'static str, default: usize) -> Result<usize, ConfigError> {
    let Some(raw) = lookup(var) else {
        return Ok(default);
    };
    raw.trim().parse::<usize>().map_err(|_| ConfigError::InvalidNumber { var, value: raw })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
