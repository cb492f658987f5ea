//! AST node model
//!
//! Parsers produce [`Node`] values. The engine never looks inside a node: it
//! only moves nodes from the parsers that built them into the construction
//! callback of the enclosing combinator. Two shapes cover most grammars,
//! [`Terminal`] for matched tokens and [`NonTerminal`] for rule results.
//! Grammars that need more shapes implement [`CustomNode`] and wrap their
//! values in [`Node::Custom`].

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Common interface for grammar-defined node shapes
pub trait CustomNode: fmt::Debug + Send + Sync {
    fn name(&self) -> &str;

    fn children(&self) -> &[Node] {
        &[]
    }

    /// One-line description used by the tree renderers
    fn display_label(&self) -> String {
        self.name().to_string()
    }

    fn as_any(&self) -> &dyn Any;

    /// Structural equality against another custom node
    fn eq_node(&self, other: &dyn CustomNode) -> bool;
}

/// Leaf node: one matched token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Terminal {
    /// Token kind
    pub name: String,
    /// Matched text
    pub value: String,
    /// Byte offset where the token starts
    pub position: usize,
}

impl Terminal {
    pub fn new(name: impl Into<String>, value: impl Into<String>, position: usize) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            position,
        }
    }

    /// The "nothing matched" sentinel: empty name, empty value.
    ///
    /// Grammars may hand this out from callbacks; the combinators themselves
    /// report failure with `None` instead.
    pub fn absent() -> Self {
        Self::new("", "", 0)
    }

    pub fn is_absent(&self) -> bool {
        self.name.is_empty() && self.value.is_empty()
    }
}

/// Interior node: the result of a grammar rule.
#[derive(Debug, Clone, PartialEq)]
pub struct NonTerminal {
    pub name: String,
    /// Optional literal, empty when unused
    pub value: String,
    pub children: Vec<Node>,
}

impl NonTerminal {
    pub fn new(name: impl Into<String>, children: Vec<Node>) -> Self {
        Self {
            name: name.into(),
            value: String::new(),
            children,
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }
}

/// A parse result.
#[derive(Debug, Clone)]
pub enum Node {
    Terminal(Terminal),
    NonTerminal(NonTerminal),
    /// Children accumulated by a combinator that was given no callback
    List(Vec<Node>),
    Custom(Arc<dyn CustomNode>),
}

impl Node {
    pub fn absent() -> Self {
        Node::Terminal(Terminal::absent())
    }

    pub fn custom<T: CustomNode + 'static>(node: T) -> Self {
        Node::Custom(Arc::new(node))
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Node::Terminal(t) if t.is_absent())
    }

    /// Token kind or rule name; empty for lists
    pub fn name(&self) -> &str {
        match self {
            Node::Terminal(t) => &t.name,
            Node::NonTerminal(nt) => &nt.name,
            Node::List(_) => "",
            Node::Custom(c) => c.name(),
        }
    }

    /// Literal text; empty for lists and custom nodes
    pub fn value(&self) -> &str {
        match self {
            Node::Terminal(t) => &t.value,
            Node::NonTerminal(nt) => &nt.value,
            Node::List(_) | Node::Custom(_) => "",
        }
    }

    pub fn children(&self) -> &[Node] {
        match self {
            Node::Terminal(_) => &[],
            Node::NonTerminal(nt) => &nt.children,
            Node::List(nodes) => nodes,
            Node::Custom(c) => c.children(),
        }
    }

    pub fn node_type(&self) -> &'static str {
        match self {
            Node::Terminal(_) => "Terminal",
            Node::NonTerminal(_) => "NonTerminal",
            Node::List(_) => "List",
            Node::Custom(_) => "Custom",
        }
    }

    pub fn display_label(&self) -> String {
        match self {
            Node::Terminal(t) => format!("{} {:?} @{}", t.name, t.value, t.position),
            Node::NonTerminal(nt) if nt.value.is_empty() => nt.name.clone(),
            Node::NonTerminal(nt) => format!("{} {:?}", nt.name, nt.value),
            Node::List(nodes) => format!("{} items", nodes.len()),
            Node::Custom(c) => c.display_label(),
        }
    }

    pub fn as_terminal(&self) -> Option<&Terminal> {
        match self {
            Node::Terminal(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_non_terminal(&self) -> Option<&NonTerminal> {
        match self {
            Node::NonTerminal(nt) => Some(nt),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Node]> {
        match self {
            Node::List(nodes) => Some(nodes),
            _ => None,
        }
    }

    /// Downcast a custom node to its concrete grammar type
    pub fn as_custom<T: CustomNode + 'static>(&self) -> Option<&T> {
        match self {
            Node::Custom(c) => c.as_any().downcast_ref::<T>(),
            _ => None,
        }
    }

    /// Consume a list node into its items. Any other node becomes a
    /// one-element list.
    pub fn into_list(self) -> Vec<Node> {
        match self {
            Node::List(nodes) => nodes,
            other => vec![other],
        }
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Node::Terminal(a), Node::Terminal(b)) => a == b,
            (Node::NonTerminal(a), Node::NonTerminal(b)) => a == b,
            (Node::List(a), Node::List(b)) => a == b,
            (Node::Custom(a), Node::Custom(b)) => a.eq_node(b.as_ref()),
            _ => false,
        }
    }
}

impl From<Terminal> for Node {
    fn from(t: Terminal) -> Self {
        Node::Terminal(t)
    }
}

impl From<NonTerminal> for Node {
    fn from(nt: NonTerminal) -> Self {
        Node::NonTerminal(nt)
    }
}

impl From<Vec<Node>> for Node {
    fn from(nodes: Vec<Node>) -> Self {
        Node::List(nodes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Tagged {
        tag: String,
        inner: Vec<Node>,
    }

    impl CustomNode for Tagged {
        fn name(&self) -> &str {
            &self.tag
        }

        fn children(&self) -> &[Node] {
            &self.inner
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn eq_node(&self, other: &dyn CustomNode) -> bool {
            other
                .as_any()
                .downcast_ref::<Tagged>()
                .map_or(false, |o| o == self)
        }
    }

    #[test]
    fn test_absent_sentinel() {
        assert!(Node::absent().is_absent());
        assert!(!Node::from(Terminal::new("X", "x", 0)).is_absent());
        assert!(!Node::List(vec![]).is_absent());
    }

    #[test]
    fn test_uniform_accessors() {
        let leaf = Node::from(Terminal::new("INT", "42", 3));
        let tree = Node::from(NonTerminal::new("SUM", vec![leaf.clone()]).with_value("+"));

        assert_eq!(leaf.name(), "INT");
        assert_eq!(leaf.value(), "42");
        assert!(leaf.children().is_empty());
        assert_eq!(tree.name(), "SUM");
        assert_eq!(tree.value(), "+");
        assert_eq!(tree.children(), &[leaf][..]);
    }

    #[test]
    fn test_custom_node_equality_and_downcast() {
        let make = || {
            Node::custom(Tagged {
                tag: "T".into(),
                inner: vec![Terminal::new("A", "a", 0).into()],
            })
        };

        assert_eq!(make(), make());
        assert_eq!(make().name(), "T");
        assert_eq!(make().children().len(), 1);
        assert!(make().as_custom::<Tagged>().is_some());
        assert_ne!(make(), Node::from(Terminal::new("T", "", 0)));
    }

    #[test]
    fn test_into_list() {
        let a = Node::from(Terminal::new("A", "a", 0));

        assert_eq!(Node::List(vec![a.clone()]).into_list(), vec![a.clone()]);
        assert_eq!(a.clone().into_list(), vec![a]);
    }

    #[test]
    fn test_display_label() {
        assert_eq!(
            Node::from(Terminal::new("X", "x", 2)).display_label(),
            "X \"x\" @2"
        );
        assert_eq!(Node::from(NonTerminal::new("XY", vec![])).display_label(), "XY");
        assert_eq!(Node::List(vec![Node::absent()]).display_label(), "1 items");
    }
}
