// src/config/model.rs

use serde::Deserialize;
use toml::{Table, Value};

use crate::config::merge::deep_merge;
use crate::paths::Sources;
use crate::tasks::Kind;

/// Destination root used when a destination has no directory part.
pub const DEFAULT_DEST: &str = "public";

/// Base for generated output names (`app`, `app2`, ...).
pub const DEFAULT_NAME: &str = "app";

/// Manifest as read from TOML, before validation.
///
/// ```toml
/// [config]
/// dest = "public"
/// name = "app"
/// compress = true
///
/// [config.style]
/// compiler = "lessc -"
///
/// [[step]]
/// kind = "style"
/// src = ["assets/less/app.less"]
/// dest = "public/css/app.css"
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawManifest {
    /// Global settings from `[config]`, kept as a free-form table so that
    /// per-kind sub-tables can carry arbitrary keys.
    #[serde(default)]
    pub config: Table,

    /// Declared operations from `[[step]]`, in declaration order.
    #[serde(default)]
    pub step: Vec<StepConfig>,
}

/// Validated manifest. Construct through `TryFrom<RawManifest>`.
#[derive(Debug, Clone)]
pub struct Manifest {
    settings: Settings,
    steps: Vec<StepConfig>,
}

impl Manifest {
    pub(crate) fn new_unchecked(config: Table, steps: Vec<StepConfig>) -> Self {
        let mut settings = Settings::default();
        settings.merge(&config);
        Self { settings, steps }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn steps(&self) -> &[StepConfig] {
        &self.steps
    }
}

/// One `[[step]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct StepConfig {
    /// `files`, `style` (`less`, `css`), `script` (`js`) or `task` (`callback`).
    pub kind: Kind,

    /// Source patterns; one string or a list.
    #[serde(default)]
    pub src: Option<Sources>,

    /// Destination file or directory (trailing `/`).
    #[serde(default)]
    pub dest: Option<String>,

    /// Per-step overrides, deep-merged over `[config.<kind>]`.
    #[serde(default)]
    pub config: Option<Table>,

    /// Shell command run by `task` steps.
    #[serde(default)]
    pub cmd: Option<String>,

    /// Watch patterns for `task` steps.
    #[serde(default)]
    pub watch: Option<Vec<String>>,
}

/// Global configuration scope.
///
/// A nested table with typed accessors for the keys the orchestrator itself
/// reads. Changes only through [`Settings::merge`].
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    table: Table,
}

impl Default for Settings {
    fn default() -> Self {
        let mut table = Table::new();
        table.insert("dest".into(), Value::String(DEFAULT_DEST.into()));
        table.insert("name".into(), Value::String(DEFAULT_NAME.into()));
        Self { table }
    }
}

impl Settings {
    pub fn merge(&mut self, overrides: &Table) {
        deep_merge(&mut self.table, overrides);
    }

    pub fn as_table(&self) -> &Table {
        &self.table
    }

    pub fn dest(&self) -> &str {
        self.str_or("dest", DEFAULT_DEST)
    }

    pub fn name(&self) -> &str {
        self.str_or("name", DEFAULT_NAME)
    }

    /// Explicit `compress` setting, `None` when unset.
    pub fn compress(&self) -> Option<bool> {
        self.table.get("compress").and_then(Value::as_bool)
    }

    /// Explicit `watch` setting, `None` when unset.
    pub fn watch(&self) -> Option<bool> {
        self.table.get("watch").and_then(Value::as_bool)
    }

    pub fn use_hash(&self) -> bool {
        self.table
            .get("use_hash")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// The `[config.<kind>]` sub-table, or an empty table.
    pub fn kind_defaults(&self, kind: Kind) -> Table {
        self.table
            .get(kind.config_key())
            .and_then(Value::as_table)
            .cloned()
            .unwrap_or_default()
    }

    fn str_or<'a>(&'a self, key: &str, fallback: &'a str) -> &'a str {
        match self.table.get(key).and_then(Value::as_str) {
            Some(s) if !s.is_empty() => s,
            _ => fallback,
        }
    }
}
