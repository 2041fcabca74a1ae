/*!
 * Symbol size metrics.
 *
 * Sizes are looked up by full key (`S15a04`), then by base key (`S15a`).
 * Symbols absent from the table have no size: normalization of a sign that
 * uses one reports no canonical form, so the sign keeps the box it was given.
 */

use anyhow::{Context, Result};
use log::debug;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::path::Path;

use super::SymbolKey;

/// Size drawn for symbols absent from the table. Never used for normalization.
pub const NOMINAL_SYMBOL_SIZE: (u32, u32) = (30, 30);

static EMBEDDED_SIZES: Lazy<HashMap<String, (u32, u32)>> = Lazy::new(|| {
    serde_json::from_str(include_str!("../../data/symbol_sizes.json")).unwrap_or_else(|e| {
        log::error!("Embedded symbol size table is invalid: {}", e);
        HashMap::new()
    })
});

/// Width and height of symbols in FSW units
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolMetrics {
    sizes: HashMap<String, (u32, u32)>,
}

impl SymbolMetrics {
    /// The table shipped with the crate
    pub fn embedded() -> Self {
        Self {
            sizes: EMBEDDED_SIZES.clone(),
        }
    }

    /// A table with no sizes at all
    pub fn empty() -> Self {
        Self {
            sizes: HashMap::new(),
        }
    }

    /// Parse a `{"S15a04": [25, 21], ...}` table
    pub fn from_json(json: &str) -> Result<Self> {
        let sizes: HashMap<String, (u32, u32)> =
            serde_json::from_str(json).context("Failed to parse symbol size table")?;
        Ok(Self { sizes })
    }

    /// Load a table from disk, layered over the embedded one
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = crate::file_utils::FileManager::read_to_string(&path)?;
        let overrides = Self::from_json(&content)
            .with_context(|| format!("Invalid symbol size table: {:?}", path.as_ref()))?;

        let mut metrics = Self::embedded();
        metrics.sizes.extend(overrides.sizes);
        debug!("Loaded {} symbol sizes from {:?}", metrics.sizes.len(), path.as_ref());
        Ok(metrics)
    }

    /// Record a size for a full or base key
    pub fn insert(&mut self, key: &str, size: (u32, u32)) {
        self.sizes.insert(key.to_string(), size);
    }

    /// Size of a symbol, if known
    pub fn size(&self, key: &SymbolKey) -> Option<(u32, u32)> {
        self.sizes
            .get(&key.to_string())
            .or_else(|| self.sizes.get(&key.base_key()))
            .copied()
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }
}

impl Default for SymbolMetrics {
    fn default() -> Self {
        Self::embedded()
    }
}
