//! Stock sets: named index memberships plus ad-hoc custom lists.
//!
//! Index memberships (KSE-100, KSE-50, KSE-30) are stored in a TOML catalog
//! mapping set name to ordered ticker list:
//!
//! ```toml
//! [sets]
//! kse30 = ["OGDC", "PPL", "LUCK"]
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use screener_core::domain::Subject;

// ─── Error type ──────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum StockSetError {
    #[error("Failed to read stock set file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse stock set TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Unknown stock set: {0}")]
    UnknownSet(String),
}

// ─── Stock set ───────────────────────────────────────────────────────

/// Which stocks a ranking run covers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockSet {
    Kse100,
    Kse50,
    Kse30,
    Custom(Vec<String>),
}

impl StockSet {
    /// Catalog key for index sets. Custom sets carry their own symbols.
    pub fn name(&self) -> &'static str {
        match self {
            StockSet::Kse100 => "kse100",
            StockSet::Kse50 => "kse50",
            StockSet::Kse30 => "kse30",
            StockSet::Custom(_) => "custom",
        }
    }
}

impl fmt::Display for StockSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parses `kse100`, `kse50`, `kse30`, or `custom:SYM1,SYM2`.
impl FromStr for StockSet {
    type Err = StockSetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.to_ascii_lowercase().as_str() {
            "kse100" => return Ok(StockSet::Kse100),
            "kse50" => return Ok(StockSet::Kse50),
            "kse30" => return Ok(StockSet::Kse30),
            _ => {}
        }
        let Some((head, symbols)) = s.split_once(':') else {
            return Err(StockSetError::UnknownSet(s.to_string()));
        };
        if !head.eq_ignore_ascii_case("custom") {
            return Err(StockSetError::UnknownSet(s.to_string()));
        }
        Ok(StockSet::Custom(
            symbols
                .split(',')
                .map(str::trim)
                .filter(|sym| !sym.is_empty())
                .map(str::to_string)
                .collect(),
        ))
    }
}

// ─── Catalog ─────────────────────────────────────────────────────────

/// Index memberships keyed by set name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StockSetCatalog {
    #[serde(default)]
    pub sets: BTreeMap<String, Vec<String>>,
}

impl StockSetCatalog {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, StockSetError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| StockSetError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, StockSetError> {
        Ok(toml::from_str(content)?)
    }

    pub fn set_names(&self) -> Vec<&str> {
        self.sets.keys().map(|s| s.as_str()).collect()
    }

    /// Symbols of `set`, in catalog order.
    ///
    /// An index set absent from the catalog resolves to no symbols.
    pub fn resolve(&self, set: &StockSet) -> Vec<String> {
        match set {
            StockSet::Custom(symbols) => symbols.clone(),
            index => self.sets.get(index.name()).cloned().unwrap_or_default(),
        }
    }
}

/// Pick the subjects named by `set` out of `pool`, in the set's order.
///
/// Symbols with no subject in the pool are skipped.
pub fn select_subjects<'a, S: Subject>(
    catalog: &StockSetCatalog,
    set: &StockSet,
    pool: &'a [S],
) -> Vec<&'a S> {
    let by_symbol: BTreeMap<&str, &S> = pool.iter().map(|s| (s.symbol(), s)).collect();
    catalog
        .resolve(set)
        .iter()
        .filter_map(|symbol| {
            let found = by_symbol.get(symbol.as_str()).copied();
            if found.is_none() {
                tracing::warn!(set = %set, symbol = %symbol, "no price history for symbol, skipping");
            }
            found
        })
        .collect()
}
