use std::sync::Arc;

use indexmap::IndexMap;
use itertools::Itertools;
use rustc_hash::FxHashMap;
use sqlwindow_common::error::{Error, Result};
use sqlwindow_ir::{NamedWindowDefinition, WindowSpec};

/// Resolved WINDOW clause. Every definition is flattened against its base
/// exactly once, so all references to a name share one `Arc<WindowSpec>`.
#[derive(Debug, Default)]
pub struct WindowRegistry {
    definitions: IndexMap<String, NamedWindowDefinition>,
    resolved: FxHashMap<String, Arc<WindowSpec>>,
}

impl WindowRegistry {
    pub fn new(definitions: &[NamedWindowDefinition]) -> Result<Self> {
        let mut registry = WindowRegistry::default();
        for def in definitions {
            let key = def.name.to_lowercase();
            if registry.definitions.contains_key(&key) {
                return Err(Error::specification(
                    &def.name,
                    format!("window {} is defined more than once", def.name),
                ));
            }
            registry.definitions.insert(key, def.clone());
        }

        let names: Vec<String> = registry.definitions.keys().cloned().collect();
        for name in names {
            let mut stack = Vec::new();
            registry.resolve_named(&name, &mut stack)?;
        }
        Ok(registry)
    }

    pub fn get(&self, name: &str) -> Option<&Arc<WindowSpec>> {
        self.resolved.get(&name.to_lowercase())
    }

    /// Canonical spelling of a defined name, as written in its definition.
    pub fn display_name(&self, name: &str) -> Option<&str> {
        self.definitions
            .get(&name.to_lowercase())
            .map(|d| d.name.as_str())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.definitions.values().map(|d| d.name.as_str())
    }

    pub fn lookup(&self, name: &str, referrer: &str) -> Result<Arc<WindowSpec>> {
        self.get(name).cloned().ok_or_else(|| {
            Error::specification(referrer, format!("window {} is not defined", name))
        })
    }

    /// Flattens a window written inline in an OVER clause. Specs without a
    /// base come back as the same allocation.
    pub fn resolve_inline(&self, spec: &Arc<WindowSpec>, label: &str) -> Result<Arc<WindowSpec>> {
        match &spec.base {
            None => Ok(Arc::clone(spec)),
            Some(base_name) => {
                let base = self.lookup(base_name, label)?;
                Ok(Arc::new(inherit(base_name, &base, spec, label)?))
            }
        }
    }

    fn resolve_named(&mut self, key: &str, stack: &mut Vec<String>) -> Result<Arc<WindowSpec>> {
        if let Some(spec) = self.resolved.get(key) {
            return Ok(Arc::clone(spec));
        }
        let def = match self.definitions.get(key) {
            Some(def) => def.clone(),
            None => {
                let referrer = stack.last().cloned().unwrap_or_default();
                return Err(Error::specification(
                    referrer,
                    format!("window {} is not defined", key),
                ));
            }
        };
        if stack.iter().any(|n| n.eq_ignore_ascii_case(&def.name)) {
            let cycle = stack
                .iter()
                .chain(std::iter::once(&def.name))
                .join(" -> ");
            return Err(Error::specification(
                &def.name,
                format!("circular window reference: {}", cycle),
            ));
        }

        let spec = match &def.spec.base {
            None => Arc::new(def.spec.clone()),
            Some(base_name) => {
                stack.push(def.name.clone());
                let base = match self.resolve_named(&base_name.to_lowercase(), stack) {
                    Ok(base) => base,
                    Err(e) => {
                        stack.pop();
                        return Err(e);
                    }
                };
                stack.pop();
                let display = self
                    .display_name(base_name)
                    .unwrap_or(base_name)
                    .to_string();
                Arc::new(inherit(&display, &base, &def.spec, &def.name)?)
            }
        };
        self.resolved.insert(key.to_string(), Arc::clone(&spec));
        Ok(spec)
    }
}

/// `child` extends `base`: partitioning is inherited, ordering may be added
/// only when the base has none, and a base carrying a frame cannot be
/// extended at all.
fn inherit(base_name: &str, base: &WindowSpec, child: &WindowSpec, label: &str) -> Result<WindowSpec> {
    if !child.partition_by.is_empty() {
        return Err(Error::specification(
            label,
            format!("cannot override PARTITION BY of window {}", base_name),
        ));
    }
    if !child.order_by.is_empty() && !base.order_by.is_empty() {
        return Err(Error::specification(
            label,
            format!("cannot override ORDER BY of window {}", base_name),
        ));
    }
    if base.frame.is_some() {
        return Err(Error::specification(
            label,
            format!("cannot copy window {} because it has a frame clause", base_name),
        ));
    }

    let order_by = if base.order_by.is_empty() {
        child.order_by.clone()
    } else {
        base.order_by.clone()
    };
    Ok(WindowSpec {
        base: None,
        partition_by: base.partition_by.clone(),
        order_by,
        frame: child.frame.clone(),
    })
}
