//! Test helpers: fluent assertions over parse trees
//!
//! ```ignore
//! assert_node(&node)
//!     .non_terminal("XY")
//!     .child_count(2)
//!     .child(0, |c| {
//!         c.terminal("X", "x").position(0);
//!     });
//! ```

use crate::parsec::combinators::{ParseResult, Parser};
use crate::parsec::formats::to_sexp_str;
use crate::parsec::node::Node;
use crate::parsec::scanner::SimpleScanner;

/// Run `parser` over `input` from offset 0
pub fn parse_str(parser: &Parser<'_, SimpleScanner>, input: &str) -> ParseResult<SimpleScanner> {
    parser.parse(SimpleScanner::from(input))
}

/// Create an assertion builder for a node
pub fn assert_node(node: &Node) -> NodeAssertion<'_> {
    NodeAssertion {
        node,
        context: "root".to_string(),
    }
}

pub struct NodeAssertion<'a> {
    node: &'a Node,
    context: String,
}

impl<'a> NodeAssertion<'a> {
    /// Assert this is a terminal with the given name and value
    pub fn terminal(self, name: &str, value: &str) -> Self {
        match self.node {
            Node::Terminal(t) => {
                assert_eq!(
                    (t.name.as_str(), t.value.as_str()),
                    (name, value),
                    "{}: terminal mismatch",
                    self.context
                );
            }
            other => panic!(
                "{}: Expected Terminal {}, found {}",
                self.context,
                name,
                to_sexp_str(other)
            ),
        }
        self
    }

    /// Assert this is a non-terminal with the given name
    pub fn non_terminal(self, name: &str) -> Self {
        match self.node {
            Node::NonTerminal(nt) => {
                assert_eq!(nt.name, name, "{}: non-terminal name mismatch", self.context);
            }
            other => panic!(
                "{}: Expected NonTerminal {}, found {}",
                self.context,
                name,
                to_sexp_str(other)
            ),
        }
        self
    }

    /// Assert this is a list (the result of a combinator without a callback)
    pub fn list(self) -> Self {
        assert!(
            self.node.as_list().is_some(),
            "{}: Expected List, found {}",
            self.context,
            to_sexp_str(self.node)
        );
        self
    }

    pub fn name(self, expected: &str) -> Self {
        assert_eq!(self.node.name(), expected, "{}: name mismatch", self.context);
        self
    }

    pub fn value(self, expected: &str) -> Self {
        assert_eq!(self.node.value(), expected, "{}: value mismatch", self.context);
        self
    }

    /// Assert the byte offset of a terminal
    pub fn position(self, expected: usize) -> Self {
        let actual = self
            .node
            .as_terminal()
            .map(|t| t.position)
            .unwrap_or_else(|| panic!("{}: position on a non-terminal node", self.context));
        assert_eq!(actual, expected, "{}: position mismatch", self.context);
        self
    }

    pub fn child_count(self, expected: usize) -> Self {
        let actual = self.node.children().len();
        assert_eq!(
            actual,
            expected,
            "{}: Expected {} children, found {}: {}",
            self.context,
            expected,
            actual,
            to_sexp_str(self.node)
        );
        self
    }

    /// Assert the names of all children, in order
    pub fn child_names(self, expected: &[&str]) -> Self {
        let actual: Vec<&str> = self.node.children().iter().map(|c| c.name()).collect();
        assert_eq!(actual, expected, "{}: child names mismatch", self.context);
        self
    }

    /// Assert on a specific child by index
    pub fn child<F>(self, index: usize, assertion: F) -> Self
    where
        F: FnOnce(NodeAssertion<'a>),
    {
        let children = self.node.children();
        assert!(
            index < children.len(),
            "{}: child index {} out of bounds (node has {} children)",
            self.context,
            index,
            children.len()
        );
        assertion(NodeAssertion {
            node: &children[index],
            context: format!("{}.children[{}]", self.context, index),
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsec::node::{NonTerminal, Terminal};

    fn sample() -> Node {
        NonTerminal::new(
            "XY",
            vec![Terminal::new("X", "x", 0).into(), Terminal::new("Y", "y", 1).into()],
        )
        .into()
    }

    #[test]
    fn test_fluent_assertions_pass() {
        let node = sample();

        assert_node(&node)
            .non_terminal("XY")
            .name("XY")
            .value("")
            .child_count(2)
            .child_names(&["X", "Y"])
            .child(0, |c| {
                c.terminal("X", "x").position(0);
            })
            .child(1, |c| {
                c.terminal("Y", "y").position(1);
            });
    }

    #[test]
    #[should_panic(expected = "root.children[1]: terminal mismatch")]
    fn test_fluent_assertions_report_context() {
        let node = sample();

        assert_node(&node).child(1, |c| {
            c.terminal("Y", "z");
        });
    }

    #[test]
    #[should_panic(expected = "Expected List")]
    fn test_list_assertion() {
        assert_node(&sample()).list();
    }
}
