//! Selector rewriting: `types.X` -> `q.X`

use std::collections::BTreeSet;

use crate::lexer::{Spanned, Token, lex};
use crate::mapping::Mapping;

/// Outcome of one selector pass over a file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectorRewrite {
    pub text: String,
    /// Destination qualifiers the rewritten selectors now use.
    pub needed: BTreeSet<String>,
    /// Symbols still referenced through the deprecated qualifier.
    pub unmapped: BTreeSet<String>,
}

/// Rewrite every deprecated-qualifier selector whose symbol is mapped.
///
/// Matches are taken left to right from the token stream, so selectors in
/// string literals are never touched and `x.types.Y` field chains are not
/// mistaken for package selectors. Inside comments mapped selectors are
/// renamed as prose: they are neither needed nor reported as unmapped.
pub fn rewrite_selectors(source: &str, mapping: &Mapping) -> SelectorRewrite {
    let tokens = lex(source);
    let qualifier = mapping.deprecated_qualifier();

    let mut result = SelectorRewrite::default();
    let mut out = String::with_capacity(source.len());
    let mut cursor = 0;

    for (i, token) in tokens.iter().enumerate() {
        if token.token == Token::Comment {
            out.push_str(&source[cursor..token.span.start]);
            rewrite_comment(token.text(source), qualifier, mapping, &mut out);
            cursor = token.span.end;
            continue;
        }
        if !token.is_word(source, qualifier) {
            continue;
        }
        let Some(symbol) = selected_symbol(source, &tokens, i) else {
            continue;
        };
        if i > 0 && tokens[i - 1].token == Token::Dot {
            continue;
        }

        match mapping.resolve_qualifier(symbol) {
            Some(destination) => {
                out.push_str(&source[cursor..token.span.start]);
                out.push_str(destination);
                cursor = token.span.end;
                result.needed.insert(destination.to_string());
            }
            None => {
                result.unmapped.insert(symbol.to_string());
            }
        }
    }

    out.push_str(&source[cursor..]);
    result.text = out;
    result
}

/// Rename mapped `qualifier.Ident` mentions in comment text, appending the
/// result to `out`.
fn rewrite_comment(comment: &str, qualifier: &str, mapping: &Mapping, out: &mut String) {
    let mut cursor = 0;
    for (at, _) in comment.match_indices(qualifier) {
        let before = &comment[..at];
        if before.ends_with(is_ident_char) || (before.ends_with('.') && !before.ends_with("...")) {
            continue;
        }
        let Some(rest) = comment[at + qualifier.len()..].strip_prefix('.') else {
            continue;
        };
        let end = rest.find(|c: char| !is_ident_char(c)).unwrap_or(rest.len());
        let symbol = &rest[..end];
        if symbol.is_empty() || symbol.starts_with(|c: char| c.is_numeric()) {
            continue;
        }
        if let Some(destination) = mapping.resolve_qualifier(symbol) {
            out.push_str(&comment[cursor..at]);
            out.push_str(destination);
            cursor = at + qualifier.len();
        }
    }
    out.push_str(&comment[cursor..]);
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// The identifier selected by the qualifier at `at`, when written as
/// `qualifier.Ident` with nothing in between.
fn selected_symbol<'a>(source: &'a str, tokens: &[Spanned], at: usize) -> Option<&'a str> {
    let qualifier = &tokens[at];
    let dot = tokens.get(at + 1)?;
    let ident = tokens.get(at + 2)?;

    if dot.token != Token::Dot || dot.span.start != qualifier.span.end {
        return None;
    }
    if ident.token != Token::Word || ident.span.start != dot.span.end {
        return None;
    }

    let name = ident.text(source);
    if name.starts_with(|c: char| c.is_numeric()) {
        return None;
    }
    Some(name)
}
