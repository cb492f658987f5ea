//! Parser combinators
//!
//! A [`Parser`] is a shared function from a scanner to an optional node plus
//! the scanner to continue from. `None` is the only failure signal; when a
//! combinator fails it hands back the scanner it was called with, so the
//! caller can retry something else from the same position.
//!
//! The five combinators:
//!
//! ```text
//! and         p1 p2 ... pn      all must match, in order (atomic)
//! ord_choice  p1 | p2 | ... pn  first match in declaration order wins
//! kleene      (elem sep?)*      zero or more, never fails
//! many        (elem sep?)+      one or more
//! maybe       p                 one attempt, fails if p fails
//! ```
//!
//! Each takes an optional [`Nodify`] callback that turns the accumulated child
//! nodes into the result node. Without a callback the children are returned
//! as a [`Node::List`].

use std::fmt;
use std::sync::Arc;

use tracing::trace;

use crate::parsec::node::Node;
use crate::parsec::scanner::Scanner;

/// What every parser returns: the node (if it matched) and the next scanner
pub type ParseResult<S> = (Option<Node>, S);

/// Construction callback: accumulated children in, result node out.
pub type Nodify = Arc<dyn Fn(Vec<Node>) -> Option<Node> + Send + Sync>;

/// Wrap a closure as a construction callback
pub fn nodify<F>(f: F) -> Option<Nodify>
where
    F: Fn(Vec<Node>) -> Option<Node> + Send + Sync + 'static,
{
    Some(Arc::new(f))
}

/// A composable parser over scanners of type `S`.
///
/// Cloning is cheap; clones share the underlying function.
pub struct Parser<'a, S> {
    f: Arc<dyn Fn(S) -> ParseResult<S> + Send + Sync + 'a>,
}

impl<'a, S: Scanner> Parser<'a, S> {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(S) -> ParseResult<S> + Send + Sync + 'a,
    {
        Self { f: Arc::new(f) }
    }

    pub fn parse(&self, scanner: S) -> ParseResult<S> {
        (self.f)(scanner)
    }
}

impl<'a, S> Clone for Parser<'a, S> {
    fn clone(&self) -> Self {
        Self {
            f: Arc::clone(&self.f),
        }
    }
}

impl<'a, S> fmt::Debug for Parser<'a, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Parser")
    }
}

/// Anything that can stand in for a parser: a [`Parser`] or a plain
/// function/closure of the parser shape.
pub trait IntoParser<'a, S> {
    fn into_parser(self) -> Parser<'a, S>;
}

impl<'a, S: Scanner> IntoParser<'a, S> for Parser<'a, S> {
    fn into_parser(self) -> Parser<'a, S> {
        self
    }
}

impl<'a, S, F> IntoParser<'a, S> for F
where
    S: Scanner,
    F: Fn(S) -> ParseResult<S> + Send + Sync + 'a,
{
    fn into_parser(self) -> Parser<'a, S> {
        Parser::new(self)
    }
}

/// Build a `Vec<Parser>` from parsers and parser-shaped functions.
///
/// ```ignore
/// and(None, parsers![open, values, close])
/// ```
#[macro_export]
macro_rules! parsers {
    ($($p:expr),* $(,)?) => {
        vec![$($crate::parsec::combinators::IntoParser::into_parser($p)),*]
    };
}

/// Run the callback over the accumulated children, or return them as a list.
///
/// A callback that rejects its children turns the whole application into a
/// failure, and failures always hand back the `entry` scanner.
fn dispatch<S: Scanner>(
    callback: Option<&Nodify>,
    nodes: Vec<Node>,
    next: S,
    entry: S,
) -> ParseResult<S> {
    let node = match callback {
        Some(f) => f(nodes),
        None => Some(Node::List(nodes)),
    };
    match node {
        Some(node) => (Some(node), next),
        None => {
            trace!(cursor = entry.cursor(), "callback rejected children");
            (None, entry)
        }
    }
}

/// Sequence: every parser must match, each starting where the previous one
/// stopped.
///
/// On failure the whole sequence backtracks to the scanner it was called
/// with, not to where the failing parser was tried.
pub fn and<'a, S>(callback: Option<Nodify>, parsers: Vec<Parser<'a, S>>) -> Parser<'a, S>
where
    S: Scanner + 'a,
{
    Parser::new(move |s: S| {
        let mut nodes = Vec::with_capacity(parsers.len());
        let mut next = s.clone();
        for (index, parser) in parsers.iter().enumerate() {
            match parser.parse(next) {
                (Some(node), advanced) => {
                    nodes.push(node);
                    next = advanced;
                }
                (None, _) => {
                    trace!(cursor = s.cursor(), index, "and: backtrack");
                    return (None, s);
                }
            }
        }
        dispatch(callback.as_ref(), nodes, next, s)
    })
}

/// Ordered choice: try each parser from the same starting point and take
/// the first that matches.
pub fn ord_choice<'a, S>(callback: Option<Nodify>, parsers: Vec<Parser<'a, S>>) -> Parser<'a, S>
where
    S: Scanner + 'a,
{
    Parser::new(move |s: S| {
        for (index, parser) in parsers.iter().enumerate() {
            if let (Some(node), next) = parser.parse(s.clone()) {
                trace!(cursor = s.cursor(), index, "ord_choice: matched");
                return dispatch(callback.as_ref(), vec![node], next, s);
            }
        }
        trace!(cursor = s.cursor(), "ord_choice: no alternative");
        (None, s)
    })
}

/// Shared loop of `kleene` and `many`.
///
/// Stops at the first failed element or separator. A separator that matched
/// before a failed element stays consumed.
fn repeat<S: Scanner>(
    element: &Parser<'_, S>,
    separator: Option<&Parser<'_, S>>,
    s: S,
) -> (Vec<Node>, S) {
    let mut nodes = Vec::new();
    let mut cur = s;
    loop {
        let (node, next) = element.parse(cur.clone());
        let Some(node) = node else {
            break;
        };
        nodes.push(node);
        cur = next;

        if let Some(separator) = separator {
            match separator.parse(cur.clone()) {
                (Some(_), next) => cur = next,
                (None, _) => break,
            }
        }
    }
    (nodes, cur)
}

/// Zero or more `element`s, separated by `separator` when one is given.
///
/// Never fails on its own: with no matches the callback receives an empty
/// list and the scanner is returned unchanged. Only a rejecting callback
/// makes it fail.
pub fn kleene<'a, S>(
    callback: Option<Nodify>,
    element: Parser<'a, S>,
    separator: Option<Parser<'a, S>>,
) -> Parser<'a, S>
where
    S: Scanner + 'a,
{
    Parser::new(move |s: S| {
        let (nodes, next) = repeat(&element, separator.as_ref(), s.clone());
        trace!(cursor = next.cursor(), count = nodes.len(), "kleene: done");
        dispatch(callback.as_ref(), nodes, next, s)
    })
}

/// One or more `element`s, separated by `separator` when one is given.
pub fn many<'a, S>(
    callback: Option<Nodify>,
    element: Parser<'a, S>,
    separator: Option<Parser<'a, S>>,
) -> Parser<'a, S>
where
    S: Scanner + 'a,
{
    Parser::new(move |s: S| {
        let (nodes, next) = repeat(&element, separator.as_ref(), s.clone());
        if nodes.is_empty() {
            trace!(cursor = s.cursor(), "many: no element");
            return (None, s);
        }
        trace!(cursor = next.cursor(), count = nodes.len(), "many: done");
        dispatch(callback.as_ref(), nodes, next, s)
    })
}

/// A single attempt at `parser`.
///
/// Unlike `kleene`, a miss is a failure: no node, entry scanner. Use
/// `ord_choice` with [`succeed`] as the last alternative for an optional
/// position that always succeeds.
pub fn maybe<'a, S>(callback: Option<Nodify>, parser: Parser<'a, S>) -> Parser<'a, S>
where
    S: Scanner + 'a,
{
    Parser::new(move |s: S| match parser.parse(s.clone()) {
        (Some(node), next) => dispatch(callback.as_ref(), vec![node], next, s),
        (None, _) => (None, s),
    })
}

/// Matches nothing and always succeeds with the absent sentinel.
pub fn succeed<'a, S: Scanner + 'a>() -> Parser<'a, S> {
    Parser::new(|s: S| (Some(Node::absent()), s))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsec::node::{NonTerminal, Terminal};
    use crate::parsec::scanner::{Pattern, SimpleScanner};

    fn lit(text: &'static str, name: &'static str) -> Parser<'static, SimpleScanner> {
        let pattern = Pattern::new(&regex::escape(text)).unwrap();
        Parser::new(move |s: SimpleScanner| {
            let cursor = s.cursor();
            match s.match_pattern(&pattern) {
                (Some(bytes), next) => (
                    Some(Terminal::new(name, String::from_utf8(bytes).unwrap(), cursor).into()),
                    next,
                ),
                (None, _) => (None, s),
            }
        })
    }

    fn names(node: &Node) -> Vec<&str> {
        node.children().iter().map(|n| n.name()).collect()
    }

    #[test]
    fn test_and_without_callback_returns_list() {
        let p = and(None, vec![lit("a", "A"), lit("b", "B")]);

        let (node, s) = p.parse(SimpleScanner::from("ab"));

        let node = node.unwrap();
        assert!(node.as_list().is_some());
        assert_eq!(names(&node), vec!["A", "B"]);
        assert!(s.at_end());
    }

    #[test]
    fn test_and_backtracks_to_entry() {
        let p = and(None, vec![lit("a", "A"), lit("b", "B"), lit("c", "C")]);

        let (node, s) = p.parse(SimpleScanner::from("abx"));

        assert!(node.is_none());
        assert_eq!(s.cursor(), 0);
    }

    #[test]
    fn test_and_with_no_parsers_succeeds_empty() {
        let p = and::<SimpleScanner>(None, vec![]);

        let (node, s) = p.parse(SimpleScanner::from("x"));

        assert_eq!(node, Some(Node::List(vec![])));
        assert_eq!(s.cursor(), 0);
    }

    #[test]
    fn test_callback_builds_non_terminal() {
        let p = and(
            nodify(|ns| Some(NonTerminal::new("AB", ns).into())),
            vec![lit("a", "A"), lit("b", "B")],
        );

        let (node, _) = p.parse(SimpleScanner::from("ab"));

        let node = node.unwrap();
        assert_eq!(node.name(), "AB");
        assert_eq!(names(&node), vec!["A", "B"]);
    }

    #[test]
    fn test_ord_choice_first_match_wins() {
        let p = ord_choice(None, vec![lit("a", "FIRST"), lit("ab", "SECOND")]);

        let (node, s) = p.parse(SimpleScanner::from("ab"));

        assert_eq!(names(&node.unwrap()), vec!["FIRST"]);
        assert_eq!(s.cursor(), 1);
    }

    #[test]
    fn test_ord_choice_failure_keeps_scanner() {
        let p = ord_choice(None, vec![lit("x", "X"), lit("y", "Y")]);

        let (node, s) = p.parse(SimpleScanner::from("z"));

        assert!(node.is_none());
        assert_eq!(s.cursor(), 0);
    }

    #[test]
    fn test_kleene_without_separator() {
        let p = kleene(None, lit("a", "A"), None);

        let (node, s) = p.parse(SimpleScanner::from("aaab"));

        assert_eq!(node.unwrap().children().len(), 3);
        assert_eq!(s.cursor(), 3);
    }

    #[test]
    fn test_kleene_empty_success() {
        let p = kleene(None, lit("a", "A"), Some(lit(",", "COMMA")));

        let (node, s) = p.parse(SimpleScanner::from("b"));

        assert_eq!(node, Some(Node::List(vec![])));
        assert_eq!(s.cursor(), 0);
    }

    #[test]
    fn test_kleene_invokes_callback_on_empty() {
        let p = kleene(
            nodify(|ns| Some(NonTerminal::new("EMPTY", ns).into())),
            lit("a", "A"),
            None,
        );

        let (node, _) = p.parse(SimpleScanner::from(""));

        assert_eq!(node, Some(NonTerminal::new("EMPTY", vec![]).into()));
    }

    #[test]
    fn test_many_requires_one() {
        let p = many(None, lit("a", "A"), Some(lit(",", "COMMA")));

        let (node, s) = p.parse(SimpleScanner::from("b"));

        assert!(node.is_none());
        assert_eq!(s.cursor(), 0);
    }

    #[test]
    fn test_many_stops_on_separator_failure() {
        let p = many(None, lit("a", "A"), Some(lit(",", "COMMA")));

        let (node, s) = p.parse(SimpleScanner::from("a,aa"));

        assert_eq!(node.unwrap().children().len(), 2);
        assert_eq!(s.cursor(), 3);
    }

    #[test]
    fn test_separator_nodes_are_dropped() {
        let p = many(None, lit("a", "A"), Some(lit(",", "COMMA")));

        let (node, _) = p.parse(SimpleScanner::from("a,a"));

        assert_eq!(names(&node.unwrap()), vec!["A", "A"]);
    }

    #[test]
    fn test_maybe_success_and_failure() {
        let p = maybe(None, lit("a", "A"));

        let (hit, s) = p.parse(SimpleScanner::from("a"));
        assert_eq!(names(&hit.unwrap()), vec!["A"]);
        assert!(s.at_end());

        let (miss, s) = p.parse(SimpleScanner::from("b"));
        assert!(miss.is_none());
        assert_eq!(s.cursor(), 0);
    }

    #[test]
    fn test_callback_returning_none_fails() {
        let p = maybe(nodify(|_| None), lit("a", "A"));

        let (node, s) = p.parse(SimpleScanner::from("a"));

        assert!(node.is_none());
        assert_eq!(s.cursor(), 0);
    }

    #[test]
    fn test_callback_rejection_restores_entry_scanner() {
        let reject = || nodify(|_| None);
        let x = || lit("x", "X");
        let parsers = vec![
            and(reject(), vec![x(), x()]),
            ord_choice(reject(), vec![x()]),
            kleene(reject(), x(), None),
            many(reject(), x(), None),
            maybe(reject(), x()),
        ];

        for p in parsers {
            let (node, s) = p.parse(SimpleScanner::from("xxx"));

            assert!(node.is_none());
            assert_eq!(s.cursor(), 0);
        }
    }

    #[test]
    fn test_succeed_as_optional_fallback() {
        let p = ord_choice(None, vec![lit("a", "A"), succeed()]);

        let (node, s) = p.parse(SimpleScanner::from("b"));

        assert!(node.unwrap().children()[0].is_absent());
        assert_eq!(s.cursor(), 0);
    }

    #[test]
    fn test_parsers_macro_accepts_functions() {
        fn x(s: SimpleScanner) -> ParseResult<SimpleScanner> {
            lit("x", "X").parse(s)
        }

        let p = and(None, crate::parsers![x, lit("y", "Y")]);

        let (node, _) = p.parse(SimpleScanner::from("xy"));

        assert_eq!(names(&node.unwrap()), vec!["X", "Y"]);
    }
}
