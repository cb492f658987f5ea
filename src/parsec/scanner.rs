//! Scanner contract and the default byte-buffer scanner
//!
//! A scanner is an immutable view over an input buffer: a shared buffer plus a
//! cursor. Every operation that consumes input returns a new scanner and
//! leaves the receiver untouched, which is what lets the combinators backtrack
//! by simply holding on to an earlier value.
//!
//! Patterns are compiled up front into [`Pattern`] values. A pattern always
//! matches at the cursor, never further into the input.

use regex::bytes::Regex;
use std::fmt;
use std::sync::Arc;

/// Errors that can occur while building patterns
#[derive(Debug, Clone, PartialEq)]
pub enum PatternError {
    /// The regular expression failed to compile
    Invalid { pattern: String, message: String },
    /// Pattern and name lists given to an ordered token matcher differ in length
    Mismatch { patterns: usize, names: usize },
}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternError::Invalid { pattern, message } => {
                write!(f, "Invalid pattern '{}': {}", pattern, message)
            }
            PatternError::Mismatch { patterns, names } => write!(
                f,
                "Pattern/name count mismatch: {} patterns, {} names",
                patterns, names
            ),
        }
    }
}

impl std::error::Error for PatternError {}

/// A compiled regular expression anchored at the scanner cursor.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    /// Compile `pattern`. A leading `^` is accepted but not required.
    pub fn new(pattern: &str) -> Result<Self, PatternError> {
        let anchored = format!("^(?:{})", pattern);
        let regex = Regex::new(&anchored).map_err(|e| PatternError::Invalid {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    /// The pattern as it was written, without the added anchor
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Length of the match at the start of `input`, if any
    pub fn match_len(&self, input: &[u8]) -> Option<usize> {
        self.regex.find(input).map(|m| m.end())
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

/// The input view every parser consumes.
///
/// Implementations must be cheap to clone: combinators clone before every
/// attempt that might be rolled back. None of the methods mutate the
/// receiver; advancing produces a new scanner.
pub trait Scanner: Clone {
    /// Current byte offset into the input
    fn cursor(&self) -> usize;

    /// Match `pattern` at the cursor.
    ///
    /// On success returns the matched bytes and a scanner positioned after
    /// them. On failure returns `None` and a scanner positioned identically
    /// to the receiver.
    fn match_pattern(&self, pattern: &Pattern) -> (Option<Vec<u8>>, Self);

    /// Consume leading whitespace (`' '`, `\t`, `\r`, `\n`), possibly none.
    fn skip_whitespace(&self) -> (Vec<u8>, Self);

    /// True once the cursor has reached the end of the input
    fn at_end(&self) -> bool;
}

/// Scanner over an in-memory byte buffer.
///
/// The buffer is shared between clones; only the cursor is copied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleScanner {
    buf: Arc<[u8]>,
    cursor: usize,
}

impl SimpleScanner {
    pub fn new(text: impl Into<Vec<u8>>) -> Self {
        Self {
            buf: Arc::from(text.into()),
            cursor: 0,
        }
    }

    /// The whole input buffer
    pub fn text(&self) -> &[u8] {
        &self.buf
    }

    /// Input from the cursor onwards
    pub fn remaining(&self) -> &[u8] {
        &self.buf[self.cursor..]
    }

    fn advanced(&self, by: usize) -> Self {
        Self {
            buf: Arc::clone(&self.buf),
            cursor: self.cursor + by,
        }
    }
}

impl From<&str> for SimpleScanner {
    fn from(text: &str) -> Self {
        Self::new(text.as_bytes())
    }
}

impl Scanner for SimpleScanner {
    fn cursor(&self) -> usize {
        self.cursor
    }

    fn match_pattern(&self, pattern: &Pattern) -> (Option<Vec<u8>>, Self) {
        match pattern.match_len(self.remaining()) {
            Some(len) => {
                let matched = self.remaining()[..len].to_vec();
                (Some(matched), self.advanced(len))
            }
            None => (None, self.clone()),
        }
    }

    fn skip_whitespace(&self) -> (Vec<u8>, Self) {
        let len = self
            .remaining()
            .iter()
            .take_while(|b| matches!(b, b' ' | b'\t' | b'\r' | b'\n'))
            .count();
        (self.remaining()[..len].to_vec(), self.advanced(len))
    }

    fn at_end(&self) -> bool {
        self.cursor >= self.buf.len()
    }
}
