//! Integer arithmetic expressions
//!
//! ```text
//! expr   := sum EOF
//! sum    := prod (('+' | '-') prod)*
//! prod   := value (('*' | '/' | '%') value)*
//! value  := int | '(' sum ')'
//! ```
//!
//! A `sum` or `prod` with operators becomes a `SUM`/`PROD` non-terminal whose
//! children alternate operand, operator, operand, ...; one without operators
//! collapses to its single operand. Operators are terminals named `ADD`,
//! `SUB`, `MUL`, `DIV` and `MOD`. Evaluation is left-associative on `i64`.
//! Parentheses nest at most [`MAX_DEPTH`] levels deep.

use std::fmt;

use once_cell::sync::Lazy;
use tracing::debug;

use crate::parsec::combinators::{and, kleene, nodify, ord_choice, ParseResult, Parser};
use crate::parsec::nesting::{bounded, NestingDepth};
use crate::parsec::node::{Node, NonTerminal};
use crate::parsec::scanner::{PatternError, SimpleScanner};
use crate::parsec::terminals::{end, int, ord_tokens, token};
use crate::parsers;

type ExprParser = Parser<'static, SimpleScanner>;

/// Deepest parenthesis nesting accepted
pub const MAX_DEPTH: usize = 128;

thread_local! {
    static DEPTH: NestingDepth = const { NestingDepth::new() };
}

#[derive(Debug, Clone, PartialEq)]
pub enum EvalError {
    /// The input is not an expression
    Syntax,
    DivisionByZero,
    Overflow,
    /// A node that does not belong in an expression tree
    Malformed(String),
    /// Parentheses nested deeper than the limit
    TooDeep(usize),
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalError::Syntax => write!(f, "Syntax error: input is not an expression"),
            EvalError::DivisionByZero => write!(f, "Division by zero"),
            EvalError::Overflow => write!(f, "Integer overflow"),
            EvalError::Malformed(name) => write!(f, "Malformed expression tree at {}", name),
            EvalError::TooDeep(max) => write!(f, "Nesting deeper than {} levels", max),
        }
    }
}

impl std::error::Error for EvalError {}

fn expect_tokens(parser: Result<ExprParser, PatternError>) -> ExprParser {
    parser.expect("expression token patterns compile")
}

fn first(nodes: Vec<Node>) -> Option<Node> {
    nodes.into_iter().next()
}

fn second(nodes: Vec<Node>) -> Option<Node> {
    nodes.into_iter().nth(1)
}

/// `[operand, [[op, operand], ...]]` into a flat operator chain
fn chain(name: &'static str) -> impl Fn(Vec<Node>) -> Option<Node> + Send + Sync {
    move |nodes: Vec<Node>| {
        let mut nodes = nodes.into_iter();
        let head = nodes.next()?;
        let tail: Vec<Node> = nodes
            .next()?
            .into_list()
            .into_iter()
            .flat_map(Node::into_list)
            .collect();
        if tail.is_empty() {
            return Some(head);
        }
        let mut children = Vec::with_capacity(tail.len() + 1);
        children.push(head);
        children.extend(tail);
        Some(NonTerminal::new(name, children).into())
    }
}

static ADD_OP: Lazy<ExprParser> =
    Lazy::new(|| expect_tokens(ord_tokens(&[r"\+", "-"], &["ADD", "SUB"])));

static MUL_OP: Lazy<ExprParser> =
    Lazy::new(|| expect_tokens(ord_tokens(&[r"\*", "/", "%"], &["MUL", "DIV", "MOD"])));

static SUM: Lazy<ExprParser> = Lazy::new(|| {
    let rest = kleene(None, and(None, parsers![ADD_OP.clone(), prod]), None);
    and(nodify(chain("SUM")), parsers![prod, rest])
});

static PROD: Lazy<ExprParser> = Lazy::new(|| {
    let rest = kleene(None, and(None, parsers![MUL_OP.clone(), value]), None);
    and(nodify(chain("PROD")), parsers![value, rest])
});

static VALUE: Lazy<ExprParser> = Lazy::new(|| {
    let open = expect_tokens(token(r"\(", "OPENPAREN"));
    let close = expect_tokens(token(r"\)", "CLOSEPAREN"));
    let inner = bounded(&DEPTH, MAX_DEPTH, Parser::new(sum));
    ord_choice(
        nodify(first),
        parsers![int(), and(nodify(second), parsers![open, inner, close])],
    )
});

static EXPR: Lazy<ExprParser> = Lazy::new(|| and(nodify(first), parsers![sum, end()]));

/// Parser for a sum, for embedding in larger grammars
pub fn sum(s: SimpleScanner) -> ParseResult<SimpleScanner> {
    SUM.parse(s)
}

fn prod(s: SimpleScanner) -> ParseResult<SimpleScanner> {
    PROD.parse(s)
}

fn value(s: SimpleScanner) -> ParseResult<SimpleScanner> {
    VALUE.parse(s)
}

/// Parse a complete expression into its tree
pub fn parse(text: &str) -> Result<Node, EvalError> {
    debug!(len = text.len(), "expr: parse");
    DEPTH.with(NestingDepth::reset);
    match EXPR.parse(SimpleScanner::from(text)) {
        (Some(node), _) => Ok(node),
        (None, _) if DEPTH.with(NestingDepth::exceeded) => Err(EvalError::TooDeep(MAX_DEPTH)),
        (None, _) => Err(EvalError::Syntax),
    }
}

/// Parse and evaluate in one step
pub fn eval_str(text: &str) -> Result<i64, EvalError> {
    evaluate(&parse(text)?)
}

/// Evaluate a tree produced by this grammar
pub fn evaluate(node: &Node) -> Result<i64, EvalError> {
    match node {
        Node::Terminal(t) if t.name == "INT" => {
            t.value.parse::<i64>().map_err(|_| EvalError::Overflow)
        }
        Node::NonTerminal(nt) if nt.name == "SUM" || nt.name == "PROD" => {
            let mut children = nt.children.iter();
            let head = children
                .next()
                .ok_or_else(|| EvalError::Malformed(nt.name.clone()))?;
            let mut acc = evaluate(head)?;
            while let Some(op) = children.next() {
                let rhs = children
                    .next()
                    .ok_or_else(|| EvalError::Malformed(op.name().to_string()))?;
                acc = apply(op.name(), acc, evaluate(rhs)?)?;
            }
            Ok(acc)
        }
        other => Err(EvalError::Malformed(other.name().to_string())),
    }
}

fn apply(op: &str, lhs: i64, rhs: i64) -> Result<i64, EvalError> {
    match op {
        "ADD" => lhs.checked_add(rhs).ok_or(EvalError::Overflow),
        "SUB" => lhs.checked_sub(rhs).ok_or(EvalError::Overflow),
        "MUL" => lhs.checked_mul(rhs).ok_or(EvalError::Overflow),
        "DIV" | "MOD" if rhs == 0 => Err(EvalError::DivisionByZero),
        "DIV" => lhs.checked_div(rhs).ok_or(EvalError::Overflow),
        "MOD" => lhs.checked_rem(rhs).ok_or(EvalError::Overflow),
        other => Err(EvalError::Malformed(other.to_string())),
    }
}
