//! Per-file rewrite: the decision of whether a file changes, and how.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::trace;

use crate::imports::{Declined, ensure_imports, imported_bindings, imported_paths, remove_import};
use crate::mapping::{Mapping, QualifierEntry};
use crate::selectors::rewrite_selectors;

static LAST_MODIFIED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^([ \t]*//[ \t]*Last Modified[ \t]*:)[^\r\n]*")
        .expect("LAST_MODIFIED regex is invalid")
});

/// Options that apply on top of the selector and import rewrite.
#[derive(Debug, Clone, Default)]
pub struct RewriteOptions {
    /// New value for `// Last Modified : ...` header lines of changed files.
    pub last_modified: Option<String>,
}

/// Result of rewriting a single file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteResult {
    original: String,
    updated: String,
    needed: BTreeSet<String>,
    unmapped: BTreeSet<String>,
    missing_imports: Vec<String>,
    declined: Option<Declined>,
    deprecated_imported: bool,
}

impl RewriteResult {
    fn unchanged(text: &str) -> Self {
        Self {
            original: text.to_string(),
            updated: text.to_string(),
            needed: BTreeSet::new(),
            unmapped: BTreeSet::new(),
            missing_imports: Vec::new(),
            declined: None,
            deprecated_imported: false,
        }
    }

    pub fn is_changed(&self) -> bool {
        self.original != self.updated
    }

    pub fn new_text(&self) -> &str {
        &self.updated
    }

    pub fn into_new_text(self) -> String {
        self.updated
    }

    /// Destination qualifiers the rewritten file uses.
    pub fn needed(&self) -> &BTreeSet<String> {
        &self.needed
    }

    /// Symbols still selected through the deprecated qualifier.
    pub fn unmapped(&self) -> &BTreeSet<String> {
        &self.unmapped
    }

    /// Needed qualifiers not bound to their import path in the new text.
    pub fn missing_imports(&self) -> &[String] {
        &self.missing_imports
    }

    /// Why imports could not be placed, when they could not.
    pub fn declined(&self) -> Option<Declined> {
        self.declined
    }

    /// Unmapped selectors remain but the deprecated import is gone, so the
    /// file no longer compiles without a manual fix.
    pub fn has_dangling_selectors(&self) -> bool {
        !self.unmapped.is_empty() && !self.deprecated_imported
    }
}

/// The rewrite engine. Holds only immutable tables, so one instance can be
/// shared across worker threads.
#[derive(Debug, Clone)]
pub struct Rewriter {
    mapping: Mapping,
    options: RewriteOptions,
    selector_prefix: String,
}

impl Rewriter {
    pub fn new(mapping: Mapping, options: RewriteOptions) -> Self {
        let selector_prefix = format!("{}.", mapping.deprecated_qualifier());
        Self {
            mapping,
            options,
            selector_prefix,
        }
    }

    /// Cheap pre-check: can this text need any change at all?
    pub fn is_candidate(&self, text: &str) -> bool {
        text.contains(self.mapping.deprecated_path()) || text.contains(&self.selector_prefix)
    }

    /// Rewrite one file's text.
    ///
    /// Runs import removal, selector rewrite and import insertion in that
    /// order. Import removal goes first because it only touches the import
    /// line, never selector usages.
    pub fn rewrite(&self, text: &str) -> RewriteResult {
        if !self.is_candidate(text) {
            return RewriteResult::unchanged(text);
        }

        let without_import = remove_import(
            text,
            self.mapping.deprecated_path(),
            self.mapping.deprecated_qualifier(),
        );
        let selectors = rewrite_selectors(&without_import, &self.mapping);

        let entries: Vec<&QualifierEntry> = selectors
            .needed
            .iter()
            .filter_map(|q| self.mapping.qualifier(q))
            .collect();
        let (mut updated, declined) = match ensure_imports(&selectors.text, &entries) {
            Ok(updated) => (updated, None),
            Err(reason) => {
                trace!(%reason, "imports not ensured");
                (selectors.text, Some(reason))
            }
        };

        if updated != text {
            if let Some(value) = &self.options.last_modified {
                updated = stamp_last_modified(&updated, value);
            }
        }

        let bound = imported_bindings(&updated);
        let missing_imports = entries
            .iter()
            .filter(|entry| {
                !bound.contains(&(entry.qualifier().to_string(), entry.path().to_string()))
            })
            .map(|entry| entry.qualifier().to_string())
            .collect();
        let deprecated_imported = imported_paths(&updated).contains(self.mapping.deprecated_path());

        RewriteResult {
            original: text.to_string(),
            updated,
            needed: selectors.needed,
            unmapped: selectors.unmapped,
            missing_imports,
            declined,
            deprecated_imported,
        }
    }
}

/// Put `value` on every `// Last Modified : ...` line.
pub fn stamp_last_modified(text: &str, value: &str) -> String {
    LAST_MODIFIED
        .replace_all(text, |caps: &Captures| format!("{} {}", &caps[1], value))
        .into_owned()
}
