//! # parsec
//!
//! Parser combinators for building backtracking recursive-descent parsers.
//!
//! Every parser has the same shape: it takes a [`Scanner`](parsec::scanner::Scanner)
//! and returns an optional [`Node`](parsec::node::Node) together with the scanner
//! to continue from. The combinators in [`parsec::combinators`] take parsers and
//! return new parsers of the same shape, so grammars are built by nesting them.
//!
//! The [`grammars`] module holds two complete grammars (JSON and integer
//! arithmetic) written on top of the engine.

pub mod grammars;
pub mod parsec;

pub use parsec::combinators::{
    and, kleene, many, maybe, nodify, ord_choice, succeed, Nodify, ParseResult, Parser,
};
pub use parsec::node::{CustomNode, Node, NonTerminal, Terminal};
pub use parsec::scanner::{Pattern, PatternError, Scanner, SimpleScanner};
