//! Nesting limits for recursive rules
//!
//! Every level of a recursive grammar costs several stack frames, so deeply
//! nested input can exhaust the stack long before the grammar runs out of
//! input. [`bounded`] wraps a recursive rule and fails it cleanly once the
//! number of active entries reaches a limit. The counter lives in a
//! `thread_local!` [`NestingDepth`], one per grammar, so grammar statics stay
//! shareable across threads.
//!
//! ```ignore
//! thread_local! {
//!     static DEPTH: NestingDepth = const { NestingDepth::new() };
//! }
//!
//! // count a level only once its opening bracket has matched
//! and(nodify(second), parsers![open, bounded(&DEPTH, 128, values), close])
//! ```

use std::cell::Cell;
use std::thread::LocalKey;

use tracing::trace;

use crate::parsec::combinators::Parser;
use crate::parsec::scanner::Scanner;

/// Per-thread nesting counter for one grammar.
#[derive(Debug, Default)]
pub struct NestingDepth {
    depth: Cell<usize>,
    exceeded: Cell<bool>,
}

impl NestingDepth {
    pub const fn new() -> Self {
        Self {
            depth: Cell::new(0),
            exceeded: Cell::new(false),
        }
    }

    /// Clear the counter before a top-level parse
    pub fn reset(&self) {
        self.depth.set(0);
        self.exceeded.set(false);
    }

    /// True if some rule was refused since the last reset
    pub fn exceeded(&self) -> bool {
        self.exceeded.get()
    }

    fn enter(&self, max: usize) -> bool {
        let depth = self.depth.get();
        if depth >= max {
            self.exceeded.set(true);
            return false;
        }
        self.depth.set(depth + 1);
        true
    }

    fn leave(&self) {
        self.depth.set(self.depth.get().saturating_sub(1));
    }
}

/// Run `parser` with at most `max` active entries on this thread.
///
/// A refused entry is an ordinary failure (no node, scanner unchanged) and
/// marks the counter as exceeded so the grammar can report why it failed.
pub fn bounded<'a, S>(
    counter: &'static LocalKey<NestingDepth>,
    max: usize,
    parser: Parser<'a, S>,
) -> Parser<'a, S>
where
    S: Scanner + 'a,
{
    Parser::new(move |s: S| {
        if !counter.with(|c| c.enter(max)) {
            trace!(cursor = s.cursor(), max, "bounded: nesting limit reached");
            return (None, s);
        }
        let result = parser.parse(s);
        counter.with(NestingDepth::leave);
        result
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsec::combinators::{and, nodify, ord_choice, succeed, ParseResult};
    use crate::parsec::scanner::SimpleScanner;
    use crate::parsec::terminals::token;

    thread_local! {
        static DEPTH: NestingDepth = const { NestingDepth::new() };
    }

    // nested := '(' nested? ')', at most 3 levels
    fn nested(s: SimpleScanner) -> ParseResult<SimpleScanner> {
        let inner = ord_choice(nodify(|mut n| n.pop()), crate::parsers![nested, succeed()]);
        and(
            None,
            vec![
                token(r"\(", "OPEN").unwrap(),
                bounded(&DEPTH, 3, inner),
                token(r"\)", "CLOSE").unwrap(),
            ],
        )
        .parse(s)
    }

    fn run(input: &str) -> (bool, usize, bool) {
        DEPTH.with(NestingDepth::reset);
        let (node, s) = nested(SimpleScanner::from(input));
        (node.is_some(), s.cursor(), DEPTH.with(NestingDepth::exceeded))
    }

    #[test]
    fn test_within_limit() {
        assert_eq!(run("((()))"), (true, 6, false));
    }

    #[test]
    fn test_over_limit_fails_cleanly() {
        assert_eq!(run("(((())))"), (false, 0, true));
    }

    #[test]
    fn test_depth_unwinds_between_siblings() {
        let counter = NestingDepth::new();

        assert!(counter.enter(1));
        counter.leave();
        assert!(counter.enter(1));
        assert!(!counter.enter(1));
        assert!(counter.exceeded());

        counter.reset();
        assert!(!counter.exceeded());
        assert!(counter.enter(1));
    }
}
