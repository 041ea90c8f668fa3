use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sqlwindow_common::error::{Error, Result};
use sqlwindow_common::types::Value;

use crate::partition::{CollationEquality, KeyEquality, NumericEquality, StrictEquality};

pub const PARALLEL_EXECUTION: &str = "PARALLEL_EXECUTION";
pub const PARALLEL_THRESHOLD: &str = "PARALLEL_THRESHOLD";
pub const DEFAULT_NULL_ORDER: &str = "DEFAULT_NULL_ORDER";
pub const PARTITION_EQUALITY: &str = "PARTITION_EQUALITY";

/// Placement of NULLs for sort keys that do not say `NULLS FIRST/LAST`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NullOrder {
    First,
    #[default]
    Last,
}

impl NullOrder {
    pub fn nulls_first(&self) -> bool {
        matches!(self, NullOrder::First)
    }
}

/// Which [`KeyEquality`] the partitioner uses when none is injected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartitionEquality {
    #[default]
    Strict,
    Numeric,
    Collation,
}

impl PartitionEquality {
    pub fn key_equality(&self) -> Arc<dyn KeyEquality> {
        match self {
            PartitionEquality::Strict => Arc::new(StrictEquality),
            PartitionEquality::Numeric => Arc::new(NumericEquality),
            PartitionEquality::Collation => Arc::new(CollationEquality),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub parallel: bool,
    /// Inputs smaller than this are always evaluated on the calling thread.
    pub parallel_threshold: usize,
    pub default_null_order: NullOrder,
    pub partition_equality: PartitionEquality,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            parallel_threshold: 10_000,
            default_null_order: NullOrder::Last,
            partition_equality: PartitionEquality::Strict,
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::config(e.to_string()))
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_toml_str(&text)
    }

    pub fn is_parallel_for(&self, row_count: usize) -> bool {
        self.parallel && row_count >= self.parallel_threshold
    }

    /// Session-style override, e.g. `SET PARALLEL_EXECUTION = false`.
    pub fn set_variable(&mut self, name: &str, value: &Value) -> Result<()> {
        match name.to_ascii_uppercase().as_str() {
            PARALLEL_EXECUTION => {
                self.parallel = value.as_bool().ok_or_else(|| {
                    Error::config(format!("{} expects BOOL, got {}", PARALLEL_EXECUTION, value))
                })?;
            }
            PARALLEL_THRESHOLD => {
                let threshold = value
                    .as_i64()
                    .filter(|n| *n >= 0)
                    .ok_or_else(|| {
                        Error::config(format!(
                            "{} expects a non-negative INT64, got {}",
                            PARALLEL_THRESHOLD, value
                        ))
                    })?;
                self.parallel_threshold = threshold as usize;
            }
            DEFAULT_NULL_ORDER => {
                self.default_null_order = match value.as_str().map(str::to_ascii_uppercase) {
                    Some(s) if s == "FIRST" => NullOrder::First,
                    Some(s) if s == "LAST" => NullOrder::Last,
                    _ => {
                        return Err(Error::config(format!(
                            "{} expects 'FIRST' or 'LAST', got {}",
                            DEFAULT_NULL_ORDER, value
                        )));
                    }
                };
            }
            PARTITION_EQUALITY => {
                self.partition_equality = match value.as_str().map(str::to_ascii_uppercase) {
                    Some(s) if s == "STRICT" => PartitionEquality::Strict,
                    Some(s) if s == "NUMERIC" => PartitionEquality::Numeric,
                    Some(s) if s == "COLLATION" => PartitionEquality::Collation,
                    _ => {
                        return Err(Error::config(format!(
                            "{} expects 'STRICT', 'NUMERIC' or 'COLLATION', got {}",
                            PARTITION_EQUALITY, value
                        )));
                    }
                };
            }
            other => return Err(Error::config(format!("unknown variable: {}", other))),
        }
        Ok(())
    }
}
