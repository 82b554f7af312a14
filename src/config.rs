//! Configuration management with layered resolution
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Process-wide defaults: `set_defaults` / `update_defaults`
//! 3. Per-instance overrides: `RawOptions` passed at construction
//!
//! A tree copies its resolved options once, at construction. Changing the
//! process-wide defaults later only affects trees constructed afterwards.
//!
//! `RawOptions` can also be read from TOML or from `GLYPHTREE_*` environment
//! variables.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{OnceLock, PoisonError, RwLock};

use config::{Config, ConfigError, Environment};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::ApplicationError;

/// Compiled default class prefix.
pub const DEFAULT_CLASS_PREFIX: &str = "glyphtree-";

/// Icon glyphs shown in front of node labels.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GlyphSet {
    pub leaf: String,
    pub collapsed: String,
    pub expanded: String,
}

impl Default for GlyphSet {
    fn default() -> Self {
        Self {
            leaf: "•".into(),
            collapsed: "▸".into(),
            expanded: "▾".into(),
        }
    }
}

/// Raw glyph config for intermediate parsing (`None` → not specified).
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct RawGlyphSet {
    pub leaf: Option<String>,
    pub collapsed: Option<String>,
    pub expanded: Option<String>,
}

impl GlyphSet {
    /// Overlay wins where specified.
    pub fn merge(&self, overlay: &RawGlyphSet) -> Self {
        Self {
            leaf: overlay.leaf.clone().unwrap_or_else(|| self.leaf.clone()),
            collapsed: overlay
                .collapsed
                .clone()
                .unwrap_or_else(|| self.collapsed.clone()),
            expanded: overlay
                .expanded
                .clone()
                .unwrap_or_else(|| self.expanded.clone()),
        }
    }
}

/// Resolved options of a tree instance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TreeOptions {
    /// Prefix of every generated class name (default: "glyphtree-")
    pub class_prefix: String,
    /// Expansion state of nodes never expanded or collapsed explicitly
    pub start_expanded: bool,
    pub glyphs: GlyphSet,
}

impl Default for TreeOptions {
    fn default() -> Self {
        Self {
            class_prefix: DEFAULT_CLASS_PREFIX.into(),
            start_expanded: false,
            glyphs: GlyphSet::default(),
        }
    }
}

/// Partial options; unspecified fields fall back to the defaults in effect.
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct RawOptions {
    pub class_prefix: Option<String>,
    pub start_expanded: Option<bool>,
    pub glyphs: RawGlyphSet,
}

impl RawOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn class_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.class_prefix = Some(prefix.into());
        self
    }

    pub fn start_expanded(mut self, start_expanded: bool) -> Self {
        self.start_expanded = Some(start_expanded);
        self
    }

    pub fn glyphs(mut self, glyphs: GlyphSet) -> Self {
        self.glyphs = RawGlyphSet {
            leaf: Some(glyphs.leaf),
            collapsed: Some(glyphs.collapsed),
            expanded: Some(glyphs.expanded),
        };
        self
    }

    /// Combine with `overlay`, whose specified fields win.
    pub fn overlay(&self, overlay: &RawOptions) -> Self {
        Self {
            class_prefix: overlay
                .class_prefix
                .clone()
                .or_else(|| self.class_prefix.clone()),
            start_expanded: overlay.start_expanded.or(self.start_expanded),
            glyphs: RawGlyphSet {
                leaf: overlay.glyphs.leaf.clone().or_else(|| self.glyphs.leaf.clone()),
                collapsed: overlay
                    .glyphs
                    .collapsed
                    .clone()
                    .or_else(|| self.glyphs.collapsed.clone()),
                expanded: overlay
                    .glyphs
                    .expanded
                    .clone()
                    .or_else(|| self.glyphs.expanded.clone()),
            },
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ApplicationError> {
        toml::from_str(content).map_err(|e| ApplicationError::Config {
            message: format!("parse options: {e}"),
        })
    }

    /// Load a TOML options file.
    pub fn load(path: &Path) -> Result<Self, ApplicationError> {
        let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
            message: format!("read {}: {}", path.display(), e),
        })?;
        toml::from_str(&content).map_err(|e| ApplicationError::Config {
            message: format!("parse {}: {}", path.display(), e),
        })
    }

    /// Read `GLYPHTREE_*` variables from the process environment.
    pub fn from_env() -> Result<Self, ApplicationError> {
        Self::read_env(None)
    }

    /// Read `GLYPHTREE_*` variables from `vars` instead of the process environment.
    pub fn from_env_source(vars: HashMap<String, String>) -> Result<Self, ApplicationError> {
        Self::read_env(Some(vars.into_iter().collect()))
    }

    fn read_env(source: Option<config::Map<String, String>>) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("GLYPHTREE")
                    .prefix_separator("_")
                    .separator("__")
                    .source(source),
            )
            .build()
            .map_err(config_err)?;

        let mut raw = Self::default();
        if let Ok(val) = config.get_string("class_prefix") {
            raw.class_prefix = Some(val);
        }
        if let Ok(val) = config.get_bool("start_expanded") {
            raw.start_expanded = Some(val);
        }
        if let Ok(val) = config.get_string("glyphs.leaf") {
            raw.glyphs.leaf = Some(val);
        }
        if let Ok(val) = config.get_string("glyphs.collapsed") {
            raw.glyphs.collapsed = Some(val);
        }
        if let Ok(val) = config.get_string("glyphs.expanded") {
            raw.glyphs.expanded = Some(val);
        }
        debug!("read_env: {:?}", raw);
        Ok(raw)
    }
}

impl TreeOptions {
    /// Overlay wins where specified.
    pub fn merge_with(&self, overlay: &RawOptions) -> Self {
        Self {
            class_prefix: overlay
                .class_prefix
                .clone()
                .unwrap_or_else(|| self.class_prefix.clone()),
            start_expanded: overlay.start_expanded.unwrap_or(self.start_expanded),
            glyphs: self.glyphs.merge(&overlay.glyphs),
        }
    }

    /// Current process-wide defaults with `overrides` applied.
    pub fn resolve(overrides: &RawOptions) -> Self {
        defaults().merge_with(overrides)
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

fn registry() -> &'static RwLock<TreeOptions> {
    static DEFAULTS: OnceLock<RwLock<TreeOptions>> = OnceLock::new();
    DEFAULTS.get_or_init(|| RwLock::new(TreeOptions::default()))
}

/// Snapshot of the process-wide defaults.
pub fn defaults() -> TreeOptions {
    registry()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Replace the process-wide defaults for trees constructed from now on.
pub fn set_defaults(options: TreeOptions) {
    debug!("set_defaults: {:?}", options);
    *registry().write().unwrap_or_else(PoisonError::into_inner) = options;
}

/// Modify the process-wide defaults in place.
pub fn update_defaults(f: impl FnOnce(&mut TreeOptions)) {
    let mut guard = registry().write().unwrap_or_else(PoisonError::into_inner);
    f(&mut guard);
    debug!("update_defaults: {:?}", *guard);
}

/// Restore the compiled defaults.
pub fn reset_defaults() {
    set_defaults(TreeOptions::default());
}
