//! Terminal matchers
//!
//! Terminals are the leaves of a grammar. Each one skips leading whitespace,
//! matches a single token at the cursor and produces a [`Terminal`] node whose
//! position is the offset of the token itself (after the skipped whitespace).
//! On a miss the caller's scanner is handed back untouched.
//!
//! Built-in terminals and the names they produce:
//!
//! ```text
//! string()  "..." with backslash escapes   STRING
//! char()    'x'                            CHAR
//! float()   1.5  .5  -2.                   FLOAT
//! hex()     0x1F                           HEX
//! oct()     0755                           OCT
//! int()     42                             INT
//! ident()   name_1                         IDENT
//! end()     end of input                   EOF
//! ```

use once_cell::sync::Lazy;

use crate::parsec::combinators::Parser;
use crate::parsec::node::{Node, Terminal};
use crate::parsec::scanner::{Pattern, PatternError, Scanner};

fn builtin(pattern: &str) -> Pattern {
    Pattern::new(pattern).expect("built-in terminal pattern compiles")
}

static STRING: Lazy<Pattern> = Lazy::new(|| builtin(r#"(?s)"(?:[^"\\]|\\.)*""#));
static CHAR: Lazy<Pattern> = Lazy::new(|| builtin(r"(?s)'(?:[^'\\]|\\.)'"));
static FLOAT: Lazy<Pattern> = Lazy::new(|| builtin(r"[+-]?(?:[0-9]+\.[0-9]*|\.[0-9]+)"));
static HEX: Lazy<Pattern> = Lazy::new(|| builtin(r"0[xX][0-9a-fA-F]+"));
static OCT: Lazy<Pattern> = Lazy::new(|| builtin(r"0[0-7]+"));
static INT: Lazy<Pattern> = Lazy::new(|| builtin(r"[0-9]+"));
static IDENT: Lazy<Pattern> = Lazy::new(|| builtin(r"[A-Za-z][0-9a-zA-Z_]*"));

/// Skip whitespace, then try `pattern` at the new cursor.
fn match_terminal<S: Scanner>(s: &S, pattern: &Pattern, name: &str) -> Option<(Node, S)> {
    let (_, trimmed) = s.skip_whitespace();
    let position = trimmed.cursor();
    match trimmed.match_pattern(pattern) {
        (Some(bytes), next) => {
            let value = String::from_utf8_lossy(&bytes).into_owned();
            Some((Terminal::new(name, value, position).into(), next))
        }
        (None, _) => None,
    }
}

fn terminal<'a, S>(pattern: Pattern, name: String) -> Parser<'a, S>
where
    S: Scanner + 'a,
{
    Parser::new(move |s: S| match match_terminal(&s, &pattern, &name) {
        Some((node, next)) => (Some(node), next),
        None => (None, s),
    })
}

/// A terminal named `name` matching the regular expression `pattern`.
pub fn token<'a, S>(pattern: &str, name: &str) -> Result<Parser<'a, S>, PatternError>
where
    S: Scanner + 'a,
{
    Ok(terminal(Pattern::new(pattern)?, name.to_string()))
}

/// Try several token patterns in order; the first one that matches wins and
/// names the node.
pub fn ord_tokens<'a, S>(
    patterns: &[&str],
    names: &[&str],
) -> Result<Parser<'a, S>, PatternError>
where
    S: Scanner + 'a,
{
    if patterns.len() != names.len() {
        return Err(PatternError::Mismatch {
            patterns: patterns.len(),
            names: names.len(),
        });
    }
    let table = patterns
        .iter()
        .zip(names)
        .map(|(pattern, name)| Ok((Pattern::new(pattern)?, name.to_string())))
        .collect::<Result<Vec<_>, PatternError>>()?;

    Ok(Parser::new(move |s: S| {
        for (pattern, name) in &table {
            if let Some((node, next)) = match_terminal(&s, pattern, name) {
                return (Some(node), next);
            }
        }
        (None, s)
    }))
}

/// Double-quoted string literal. The node value keeps the quotes and escapes
/// exactly as written.
pub fn string<'a, S: Scanner + 'a>() -> Parser<'a, S> {
    terminal(STRING.clone(), "STRING".to_string())
}

/// Single-quoted character literal
pub fn char<'a, S: Scanner + 'a>() -> Parser<'a, S> {
    terminal(CHAR.clone(), "CHAR".to_string())
}

pub fn float<'a, S: Scanner + 'a>() -> Parser<'a, S> {
    terminal(FLOAT.clone(), "FLOAT".to_string())
}

pub fn hex<'a, S: Scanner + 'a>() -> Parser<'a, S> {
    terminal(HEX.clone(), "HEX".to_string())
}

pub fn oct<'a, S: Scanner + 'a>() -> Parser<'a, S> {
    terminal(OCT.clone(), "OCT".to_string())
}

/// Unsigned decimal integer
pub fn int<'a, S: Scanner + 'a>() -> Parser<'a, S> {
    terminal(INT.clone(), "INT".to_string())
}

pub fn ident<'a, S: Scanner + 'a>() -> Parser<'a, S> {
    terminal(IDENT.clone(), "IDENT".to_string())
}

/// Matches only at end of input, trailing whitespace allowed.
pub fn end<'a, S: Scanner + 'a>() -> Parser<'a, S> {
    Parser::new(|s: S| {
        let (_, trimmed) = s.skip_whitespace();
        if trimmed.at_end() {
            let position = trimmed.cursor();
            (Some(Terminal::new("EOF", "", position).into()), trimmed)
        } else {
            (None, s)
        }
    })
}
