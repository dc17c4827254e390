//! # Threat Catalog Module
//!
//! @title Threat Catalog Loader
//! @author Ramprasad
//!
//! Loads the JSON threat catalog that drives the scanner and validates each
//! rule individually. A broken rule is logged and skipped; a broken document
//! degrades to an empty catalog so scanning always proceeds.
//!
//! ## Document Format
//!
//! ```json
//! { "threats": [ { "id": "...", "severity": "critical", "pattern": { ... }, ... } ] }
//! ```
//!
//! ## Key Types
//!
//! - [`ThreatCatalog`] - Immutable, validated rule set
//! - [`CatalogHandle`] - Reloadable reference to the current catalog
//! - [`ThreatRule`] / [`RulePattern`] - A single rule and its pattern shape
//! - [`CheckKind`] - Safety checks a rule can require

mod check;
mod rule;

pub use check::CheckKind;
pub use rule::{RuleError, RulePattern, ThreatRule, UNKNOWN};

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use thiserror::Error;

/// Catalog shipped with the binary.
const BUILTIN_CATALOG: &str = include_str!("../../threats/sui_threats.json");

/// Document-level catalog failure.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read threat catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse threat catalog: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A catalog entry that failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedRule {
    /// Position of the entry in the `threats` array.
    pub index: usize,

    /// Why the entry was rejected.
    pub error: RuleError,
}

#[derive(Deserialize)]
struct CatalogDocument {
    threats: Vec<Value>,
}

/// Validated, immutable set of threat rules.
///
/// Rules keep their document order, which is also the order findings are
/// reported in.
#[derive(Debug, Clone, Default)]
pub struct ThreatCatalog {
    rules: Vec<ThreatRule>,
    rejected: Vec<RejectedRule>,
}

impl ThreatCatalog {
    /// Creates an empty catalog. Scans against it find nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parses a catalog document.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Parse`] if the text is not JSON or has no
    /// `threats` array. Individual bad entries do not fail the parse.
    pub fn from_json(text: &str) -> Result<Self, CatalogError> {
        let document: CatalogDocument = serde_json::from_str(text)?;

        let mut catalog = Self::default();
        let mut seen = HashSet::new();

        for (index, entry) in document.threats.into_iter().enumerate() {
            catalog.admit(index, ThreatRule::from_value(entry), &mut seen);
        }

        log::debug!(
            "Loaded threat catalog: {} rules, {} rejected",
            catalog.rules.len(),
            catalog.rejected.len()
        );

        Ok(catalog)
    }

    /// Reads and parses a catalog file.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Io`] if the file cannot be read, or
    /// [`CatalogError::Parse`] if it is not a catalog document.
    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let text = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Loads a catalog file, degrading to an empty catalog on failure.
    ///
    /// The failure is logged; callers get a usable (possibly empty) catalog.
    pub fn load_or_empty(path: &Path) -> Self {
        match Self::from_path(path) {
            Ok(catalog) => catalog,
            Err(e) => {
                log::warn!("{}; continuing with an empty threat catalog", e);
                Self::empty()
            }
        }
    }

    /// The catalog embedded in the binary.
    pub fn builtin() -> Self {
        match Self::from_json(BUILTIN_CATALOG) {
            Ok(catalog) => catalog,
            Err(e) => {
                log::error!("Built-in threat catalog is invalid: {}", e);
                Self::empty()
            }
        }
    }

    /// Accepted rules, in document order.
    pub fn rules(&self) -> &[ThreatRule] {
        &self.rules
    }

    /// Entries rejected during loading.
    pub fn rejected(&self) -> &[RejectedRule] {
        &self.rejected
    }

    /// Looks up a rule by id.
    pub fn get(&self, id: &str) -> Option<&ThreatRule> {
        self.rules.iter().find(|rule| rule.id == id)
    }

    /// Number of accepted rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if no rule was accepted.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    fn admit(
        &mut self,
        index: usize,
        checked: Result<ThreatRule, RuleError>,
        seen: &mut HashSet<String>,
    ) {
        let outcome = checked.and_then(|rule| {
            if seen.insert(rule.id.clone()) {
                Ok(rule)
            } else {
                Err(RuleError::DuplicateId(rule.id))
            }
        });

        match outcome {
            Ok(rule) => self.rules.push(rule),
            Err(error) => {
                log::warn!("Skipping threat catalog entry #{}: {}", index, error);
                self.rejected.push(RejectedRule { index, error });
            }
        }
    }
}

/// Shared, reloadable reference to the current catalog.
///
/// Scans take a [`snapshot`](CatalogHandle::snapshot) and keep using it even
/// if a reload happens concurrently. A reload builds a complete new catalog
/// before swapping it in, so no scan ever sees a half-loaded rule set.
#[derive(Debug)]
pub struct CatalogHandle {
    path: Option<PathBuf>,
    current: RwLock<Arc<ThreatCatalog>>,
}

impl CatalogHandle {
    /// Handle over the embedded catalog.
    pub fn builtin() -> Self {
        Self {
            path: None,
            current: RwLock::new(Arc::new(ThreatCatalog::builtin())),
        }
    }

    /// Handle over a catalog file. An unreadable file yields an empty catalog.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let catalog = ThreatCatalog::load_or_empty(&path);
        Self {
            path: Some(path),
            current: RwLock::new(Arc::new(catalog)),
        }
    }

    /// Returns the catalog currently in effect.
    pub fn snapshot(&self) -> Arc<ThreatCatalog> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Re-reads the catalog source and swaps it in.
    ///
    /// # Returns
    ///
    /// The newly installed catalog.
    pub fn reload(&self) -> Arc<ThreatCatalog> {
        let fresh = Arc::new(match &self.path {
            Some(path) => ThreatCatalog::load_or_empty(path),
            None => ThreatCatalog::builtin(),
        });

        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *current = Arc::clone(&fresh);
        log::info!("Threat catalog reloaded: {} rules", fresh.len());

        fresh
    }
}
