//! Symbol table and qualifier registry
//!
//! Both tables are compiled in and immutable once built. Construction checks
//! that they agree with each other, so a rewrite can never produce a selector
//! whose import path is unknown.

use std::collections::{BTreeMap, HashMap};

use crate::error::MappingError;

/// Import path of the package being phased out.
pub const DEPRECATED_PATH: &str = "sfDBTools/internal/types";

/// Qualifier under which the deprecated package is referenced.
pub const DEPRECATED_QUALIFIER: &str = "types";

/// Symbol -> destination qualifier.
const SYMBOLS: &[(&str, &str)] = &[
    // shared domain
    ("DBInfo", "domain"),
    ("ProfileInfo", "domain"),
    ("SSHTunnelConfig", "domain"),
    ("FilterOptions", "domain"),
    ("FilterStats", "domain"),
    ("CompressionOptions", "domain"),
    ("EncryptionOptions", "domain"),
    // dbscan feature
    ("ScanEntryConfig", "dbscanmodel"),
    ("ScanOptions", "dbscanmodel"),
    ("ScanResult", "dbscanmodel"),
    ("DatabaseDetailInfo", "dbscanmodel"),
    // profile feature
    ("ProfileShowOptions", "profilemodel"),
    ("ProfileCreateOptions", "profilemodel"),
    ("ProfileEditOptions", "profilemodel"),
    ("ProfileDeleteOptions", "profilemodel"),
    ("ProfileEntryConfig", "profilemodel"),
    // restore feature
    ("RestoreSelectionEntry", "restoremodel"),
    ("RestoreSelectionOptions", "restoremodel"),
    ("RestoreSingleOptions", "restoremodel"),
    ("RestorePrimaryOptions", "restoremodel"),
    ("RestoreSecondaryOptions", "restoremodel"),
    ("RestoreAllOptions", "restoremodel"),
    ("RestoreCustomOptions", "restoremodel"),
    ("RestoreBackupOptions", "restoremodel"),
    ("RestoreResult", "restoremodel"),
];

/// Qualifier -> import path.
const QUALIFIERS: &[(&str, &str)] = &[
    ("domain", "sfDBTools/internal/domain"),
    ("dbscanmodel", "sfDBTools/internal/app/dbscan/model"),
    ("profilemodel", "sfDBTools/internal/app/profile/model"),
    ("restoremodel", "sfDBTools/internal/app/restore/model"),
];

/// A destination package: the qualifier code uses and the path that provides it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifierEntry {
    qualifier: String,
    path: String,
}

impl QualifierEntry {
    pub fn qualifier(&self) -> &str {
        &self.qualifier
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Whether the import needs an explicit alias.
    ///
    /// Go names an unaliased import after its last path segment, so a
    /// qualifier that matches it can be imported with the bare path.
    pub fn needs_alias(&self) -> bool {
        self.path.rsplit('/').next() != Some(self.qualifier.as_str())
    }

    /// The import spec as it appears inside an import block, without indentation.
    pub fn import_spec(&self) -> String {
        if self.needs_alias() {
            format!("{} \"{}\"", self.qualifier, self.path)
        } else {
            format!("\"{}\"", self.path)
        }
    }
}

/// The complete, validated relocation table for one run.
#[derive(Debug, Clone)]
pub struct Mapping {
    deprecated_qualifier: String,
    deprecated_path: String,
    symbols: HashMap<String, String>,
    qualifiers: BTreeMap<String, QualifierEntry>,
}

impl Mapping {
    /// The compiled-in tables for the `internal/types` split.
    pub fn builtin() -> Result<Self, MappingError> {
        Self::new(DEPRECATED_QUALIFIER, DEPRECATED_PATH, SYMBOLS, QUALIFIERS)
    }

    /// Build a mapping from raw tables.
    ///
    /// Rejects duplicate symbols and qualifiers outright, and any symbol whose
    /// qualifier has no registered path.
    pub fn new(
        deprecated_qualifier: &str,
        deprecated_path: &str,
        symbols: &[(&str, &str)],
        qualifiers: &[(&str, &str)],
    ) -> Result<Self, MappingError> {
        let mut registry = BTreeMap::new();
        for &(qualifier, path) in qualifiers {
            if !is_valid_import_path(path) {
                return Err(MappingError::InvalidPath {
                    qualifier: qualifier.to_string(),
                    path: path.to_string(),
                });
            }
            let entry = QualifierEntry {
                qualifier: qualifier.to_string(),
                path: path.to_string(),
            };
            if registry.insert(qualifier.to_string(), entry).is_some() {
                return Err(MappingError::DuplicateQualifier {
                    qualifier: qualifier.to_string(),
                });
            }
        }

        let mut table = HashMap::with_capacity(symbols.len());
        for &(symbol, qualifier) in symbols {
            if !registry.contains_key(qualifier) {
                return Err(MappingError::UnresolvedQualifier {
                    symbol: symbol.to_string(),
                    qualifier: qualifier.to_string(),
                });
            }
            if table
                .insert(symbol.to_string(), qualifier.to_string())
                .is_some()
            {
                return Err(MappingError::DuplicateSymbol {
                    symbol: symbol.to_string(),
                });
            }
        }

        Ok(Self {
            deprecated_qualifier: deprecated_qualifier.to_string(),
            deprecated_path: deprecated_path.to_string(),
            symbols: table,
            qualifiers: registry,
        })
    }

    pub fn deprecated_qualifier(&self) -> &str {
        &self.deprecated_qualifier
    }

    pub fn deprecated_path(&self) -> &str {
        &self.deprecated_path
    }

    /// Destination qualifier for a symbol of the deprecated package.
    pub fn resolve_qualifier(&self, symbol: &str) -> Option<&str> {
        self.symbols.get(symbol).map(String::as_str)
    }

    /// Import path providing a qualifier.
    pub fn resolve_path(&self, qualifier: &str) -> Option<&str> {
        self.qualifiers.get(qualifier).map(QualifierEntry::path)
    }

    pub fn qualifier(&self, qualifier: &str) -> Option<&QualifierEntry> {
        self.qualifiers.get(qualifier)
    }

    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    /// Registered destination packages, sorted by qualifier.
    pub fn qualifiers(&self) -> impl Iterator<Item = &QualifierEntry> {
        self.qualifiers.values()
    }
}

fn is_valid_import_path(path: &str) -> bool {
    !path.is_empty()
        && !path.starts_with('/')
        && !path.ends_with('/')
        && !path.chars().any(|c| c == '"' || c == '`' || c.is_whitespace())
}
