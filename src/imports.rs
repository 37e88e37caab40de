//! Import declaration editing
//!
//! Import declarations are read off the token stream into [`ImportDecl`]s;
//! edits are then applied as whole-line deletions and insertions on the
//! original text. Whenever a declaration's layout is not the plain
//! one-spec-per-line form, the edit is skipped instead of guessed.

use std::collections::HashSet;
use std::ops::Range;

use thiserror::Error;

use crate::lexer::{Spanned, Token, lex_code, line_bounds, starts_line};
use crate::mapping::QualifierEntry;

/// One `[alias] "path"` import spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSpec {
    /// Explicit package name, `_` or `.`, if present.
    pub alias: Option<String>,
    pub path: String,
    /// From the alias (or the path when unaliased) to the closing quote.
    pub span: Range<usize>,
}

impl ImportSpec {
    /// The name this file refers to the package by. Unaliased imports are
    /// assumed to use the last path segment as package name; blank and dot
    /// imports bind no name.
    pub fn name(&self) -> Option<&str> {
        match self.alias.as_deref() {
            Some("_" | ".") => None,
            Some(alias) => Some(alias),
            None => self.path.rsplit('/').next(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportDecl {
    /// `import [alias] "path"`
    Single { span: Range<usize>, spec: ImportSpec },
    /// `import ( ... )`; `close` is `None` when the group is never closed.
    Group {
        open: usize,
        close: Option<usize>,
        specs: Vec<ImportSpec>,
    },
}

impl ImportDecl {
    pub fn specs(&self) -> &[ImportSpec] {
        match self {
            ImportDecl::Single { spec, .. } => std::slice::from_ref(spec),
            ImportDecl::Group { specs, .. } => specs,
        }
    }
}

/// Why required imports could not be placed.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum Declined {
    #[error("no grouped import block")]
    NoImportBlock,
    #[error("import block is never closed")]
    Unterminated,
    #[error("closing parenthesis of the import block shares a line")]
    ClosingNotOnOwnLine,
}

/// Read every import declaration in the file, in source order.
pub fn parse_imports(source: &str) -> Vec<ImportDecl> {
    let tokens = lex_code(source);
    let mut decls = Vec::new();
    let mut i = 0;

    while i < tokens.len() {
        if !tokens[i].is_word(source, "import") {
            i += 1;
            continue;
        }
        let keyword = tokens[i].span.start;

        match tokens.get(i + 1).map(|t| t.token) {
            Some(Token::LParen) => {
                let open = tokens[i + 1].span.start;
                let mut specs = Vec::new();
                let mut close = None;
                let mut j = i + 2;
                while j < tokens.len() {
                    if tokens[j].token == Token::RParen {
                        close = Some(tokens[j].span.start);
                        break;
                    }
                    match parse_spec(source, &tokens, j) {
                        Some((spec, next)) => {
                            specs.push(spec);
                            j = next;
                        }
                        None => j += 1,
                    }
                }
                decls.push(ImportDecl::Group { open, close, specs });
                i = j + 1;
            }
            Some(_) => match parse_spec(source, &tokens, i + 1) {
                Some((spec, next)) => {
                    decls.push(ImportDecl::Single {
                        span: keyword..spec.span.end,
                        spec,
                    });
                    i = next;
                }
                None => i += 1,
            },
            None => break,
        }
    }

    decls
}

fn parse_spec(source: &str, tokens: &[Spanned], at: usize) -> Option<(ImportSpec, usize)> {
    let first = tokens.get(at)?;
    let (alias, path_token, next) = match first.token {
        Token::Word | Token::Dot => (Some(first.text(source).to_string()), tokens.get(at + 1)?, at + 2),
        _ => (None, first, at + 1),
    };
    let path = path_token.string_value(source)?;

    Some((
        ImportSpec {
            alias,
            path: path.to_string(),
            span: first.span.start..path_token.span.end,
        },
        next,
    ))
}

/// Every import path the file already has, grouped or single.
pub fn imported_paths(source: &str) -> HashSet<String> {
    parse_imports(source)
        .iter()
        .flat_map(|decl| decl.specs().iter().map(|spec| spec.path.clone()))
        .collect()
}

/// Every `(name, path)` pair the file's imports bind.
pub fn imported_bindings(source: &str) -> HashSet<(String, String)> {
    parse_imports(source)
        .iter()
        .flat_map(|decl| decl.specs().iter())
        .filter_map(|spec| Some((spec.name()?.to_string(), spec.path.clone())))
        .collect()
}

/// Delete the import of `path`, in either surface form.
///
/// Only unaliased specs and specs aliased to `qualifier` are removed; under
/// any other alias the package is referenced by a name the rewrite does not
/// touch. A spec sharing its line with other code is left alone.
pub fn remove_import(source: &str, path: &str, qualifier: &str) -> String {
    let targets = |spec: &ImportSpec| {
        spec.path == path && spec.alias.as_deref().is_none_or(|alias| alias == qualifier)
    };

    let mut ranges: Vec<Range<usize>> = Vec::new();
    for decl in parse_imports(source) {
        match decl {
            ImportDecl::Single { span, spec } if targets(&spec) => {
                ranges.extend(removable_line(source, span));
            }
            ImportDecl::Group { specs, .. } => {
                for spec in specs.iter().filter(|s| targets(s)) {
                    ranges.extend(removable_line(source, spec.span.clone()));
                }
            }
            ImportDecl::Single { .. } => {}
        }
    }

    if ranges.is_empty() {
        return source.to_string();
    }
    ranges.sort_by_key(|r| r.start);

    let mut out = String::with_capacity(source.len());
    let mut cursor = 0;
    for range in ranges {
        if range.start < cursor {
            continue;
        }
        out.push_str(&source[cursor..range.start]);
        cursor = range.end;
    }
    out.push_str(&source[cursor..]);
    out
}

/// The full line holding `span`, if nothing but whitespace, an optional `;`
/// and an optional line comment share it. A blank line squeezed between the
/// removed line's blank neighbours goes too.
fn removable_line(source: &str, span: Range<usize>) -> Option<Range<usize>> {
    let line = line_bounds(source, span.start);
    if span.end > line.end || !starts_line(source, span.start) {
        return None;
    }

    let rest = source[span.end..line.end].trim();
    let rest = rest.strip_prefix(';').unwrap_or(rest).trim_start();
    if !rest.is_empty() && !rest.starts_with("//") {
        return None;
    }

    let is_blank = |r: &Range<usize>| source[r.clone()].trim().is_empty();
    let mut range = line;
    if range.start > 0 && range.end < source.len() {
        let previous = line_bounds(source, range.start - 1);
        let next = line_bounds(source, range.end);
        if is_blank(&previous) && is_blank(&next) {
            range.end = next.end;
        }
    }
    Some(range)
}

/// Append import lines for `needed` at the end of the first import block.
///
/// An entry counts as present when some import anywhere in the file binds
/// its qualifier to its path, which makes the operation idempotent. The same
/// path imported under another name does not count. Returns the text
/// unchanged when nothing is missing.
pub fn ensure_imports(source: &str, needed: &[&QualifierEntry]) -> Result<String, Declined> {
    let decls = parse_imports(source);
    let present: HashSet<(&str, &str)> = decls
        .iter()
        .flat_map(|decl| decl.specs().iter())
        .filter_map(|spec| Some((spec.name()?, spec.path.as_str())))
        .collect();

    let missing: Vec<&QualifierEntry> = needed
        .iter()
        .copied()
        .filter(|entry| !present.contains(&(entry.qualifier(), entry.path())))
        .collect();
    if missing.is_empty() {
        return Ok(source.to_string());
    }

    let close = decls
        .iter()
        .find_map(|decl| match decl {
            ImportDecl::Group { close, .. } => Some(*close),
            ImportDecl::Single { .. } => None,
        })
        .ok_or(Declined::NoImportBlock)?
        .ok_or(Declined::Unterminated)?;
    if !starts_line(source, close) {
        return Err(Declined::ClosingNotOnOwnLine);
    }

    let at = line_bounds(source, close).start;
    let newline = if source[..at].ends_with("\r\n") { "\r\n" } else { "\n" };
    let mut out = String::with_capacity(source.len() + missing.len() * 48);
    out.push_str(&source[..at]);
    for entry in missing {
        out.push('\t');
        out.push_str(&entry.import_spec());
        out.push_str(newline);
    }
    out.push_str(&source[at..]);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::Mapping;

    const TYPES: &str = "sfDBTools/internal/types";

    fn entries<'a>(mapping: &'a Mapping, qualifiers: &[&str]) -> Vec<&'a QualifierEntry> {
        qualifiers
            .iter()
            .map(|q| mapping.qualifier(q).unwrap())
            .collect()
    }

    #[test]
    fn test_parse_group_and_single() {
        let src = r#"package main

import "os"

import (
	"fmt"
	m "a/b/model"
	_ "embed"
	. "dot/pkg"
)
"#;
        let decls = parse_imports(src);
        assert_eq!(decls.len(), 2);
        assert_eq!(decls[0].specs()[0].path, "os");
        let specs = decls[1].specs();
        assert_eq!(specs.len(), 4);
        assert_eq!(specs[0].alias, None);
        assert_eq!(specs[1].alias.as_deref(), Some("m"));
        assert_eq!(specs[2].alias.as_deref(), Some("_"));
        assert_eq!(specs[3].alias.as_deref(), Some("."));
        assert!(matches!(decls[1], ImportDecl::Group { close: Some(_), .. }));
    }

    #[test]
    fn test_parse_ignores_commented_imports() {
        let src = "package main\n\n// import \"fake\"\nimport (\n\t\"fmt\" // printing\n)\n";
        let paths = imported_paths(src);
        assert!(paths.contains("fmt"));
        assert!(!paths.contains("fake"));
    }

    #[test]
    fn test_parse_unterminated_group() {
        let src = "package main\n\nimport (\n\t\"fmt\"\n";
        let decls = parse_imports(src);
        assert!(matches!(decls[0], ImportDecl::Group { close: None, .. }));
    }

    #[test]
    fn test_remove_from_group() {
        let src = "import (\n\t\"fmt\"\n\t\"sfDBTools/internal/types\"\n\t\"os\"\n)\n";
        assert_eq!(
            remove_import(src, TYPES, "types"),
            "import (\n\t\"fmt\"\n\t\"os\"\n)\n"
        );
    }

    #[test]
    fn test_remove_single_statement() {
        let src = "package x\n\nimport \"sfDBTools/internal/types\"\n\nfunc f() {}\n";
        assert_eq!(
            remove_import(src, TYPES, "types"),
            "package x\n\nfunc f() {}\n"
        );
    }

    #[test]
    fn test_remove_with_matching_alias_and_comment() {
        let src = "import (\n\ttypes \"sfDBTools/internal/types\" // legacy\n\t\"os\"\n)\n";
        assert_eq!(remove_import(src, TYPES, "types"), "import (\n\t\"os\"\n)\n");
    }

    #[test]
    fn test_remove_keeps_other_alias() {
        let src = "import (\n\tlegacy \"sfDBTools/internal/types\"\n)\n";
        assert_eq!(remove_import(src, TYPES, "types"), src);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let src = "import (\n\t\"fmt\"\n)\n\nvar s = \"sfDBTools/internal/types\"\n";
        assert_eq!(remove_import(src, TYPES, "types"), src);
    }

    #[test]
    fn test_remove_collapses_blank_lines() {
        let src = "import (\n\t\"fmt\"\n\n\t\"sfDBTools/internal/types\"\n\n\t\"github.com/spf13/cobra\"\n)\n";
        assert_eq!(
            remove_import(src, TYPES, "types"),
            "import (\n\t\"fmt\"\n\n\t\"github.com/spf13/cobra\"\n)\n"
        );
    }

    #[test]
    fn test_remove_skips_shared_line() {
        let src = "import (\"fmt\"; \"sfDBTools/internal/types\")\n";
        assert_eq!(remove_import(src, TYPES, "types"), src);
    }

    #[test]
    fn test_ensure_appends_before_closing_paren() {
        let mapping = Mapping::builtin().unwrap();
        let src = "import (\n\t\"fmt\"\n)\n\nfunc f() {}\n";
        let out = ensure_imports(src, &entries(&mapping, &["dbscanmodel", "domain"])).unwrap();
        assert_eq!(
            out,
            "import (\n\t\"fmt\"\n\tdbscanmodel \"sfDBTools/internal/app/dbscan/model\"\n\t\"sfDBTools/internal/domain\"\n)\n\nfunc f() {}\n"
        );
    }

    #[test]
    fn test_ensure_is_idempotent() {
        let mapping = Mapping::builtin().unwrap();
        let needed = entries(&mapping, &["domain", "restoremodel"]);
        let src = "import (\n\t\"fmt\"\n)\n";
        let once = ensure_imports(src, &needed).unwrap();
        let twice = ensure_imports(&once, &needed).unwrap();
        assert_eq!(once, twice);
        assert_eq!(once.matches("sfDBTools/internal/domain").count(), 1);
    }

    #[test]
    fn test_ensure_skips_path_imported_as_single() {
        let mapping = Mapping::builtin().unwrap();
        let src = "import \"sfDBTools/internal/domain\"\n\nimport (\n\t\"fmt\"\n)\n";
        let out = ensure_imports(src, &entries(&mapping, &["domain"])).unwrap();
        assert_eq!(out, src);
    }

    #[test]
    fn test_ensure_adds_when_path_bound_to_other_name() {
        let mapping = Mapping::builtin().unwrap();
        let src = "import (\n\tdom \"sfDBTools/internal/domain\"\n\tdbscanmodel \"sfDBTools/internal/app/dbscan/model\"\n)\n";
        let out = ensure_imports(src, &entries(&mapping, &["dbscanmodel", "domain"])).unwrap();
        assert_eq!(
            out,
            "import (\n\tdom \"sfDBTools/internal/domain\"\n\tdbscanmodel \"sfDBTools/internal/app/dbscan/model\"\n\t\"sfDBTools/internal/domain\"\n)\n"
        );
    }

    #[test]
    fn test_import_names() {
        let src = "import (\n\t\"a/b/domain\"\n\tm \"a/b/model\"\n\t_ \"embed\"\n\t. \"dot/pkg\"\n)\n";
        let bindings = imported_bindings(src);
        assert_eq!(bindings.len(), 2);
        assert!(bindings.contains(&("domain".to_string(), "a/b/domain".to_string())));
        assert!(bindings.contains(&("m".to_string(), "a/b/model".to_string())));
    }

    #[test]
    fn test_ensure_into_empty_group() {
        let mapping = Mapping::builtin().unwrap();
        let src = "import (\n)\n";
        let out = ensure_imports(src, &entries(&mapping, &["domain"])).unwrap();
        assert_eq!(out, "import (\n\t\"sfDBTools/internal/domain\"\n)\n");
    }

    #[test]
    fn test_ensure_declines_without_block() {
        let mapping = Mapping::builtin().unwrap();
        let needed = entries(&mapping, &["domain"]);
        assert_eq!(
            ensure_imports("import \"fmt\"\n", &needed),
            Err(Declined::NoImportBlock)
        );
        assert_eq!(
            ensure_imports("package x\n", &needed),
            Err(Declined::NoImportBlock)
        );
    }

    #[test]
    fn test_ensure_declines_unterminated_or_inline_close() {
        let mapping = Mapping::builtin().unwrap();
        let needed = entries(&mapping, &["domain"]);
        assert_eq!(
            ensure_imports("import (\n\t\"fmt\"\n", &needed),
            Err(Declined::Unterminated)
        );
        assert_eq!(
            ensure_imports("import (\n\t\"fmt\")\n", &needed),
            Err(Declined::ClosingNotOnOwnLine)
        );
    }

    #[test]
    fn test_ensure_nothing_needed() {
        let src = "package x\n";
        assert_eq!(ensure_imports(src, &[]).unwrap(), src);
    }
}
