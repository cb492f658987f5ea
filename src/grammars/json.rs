//! JSON grammar
//!
//! ```text
//! document   := value EOF
//! value      := true | false | null | string | float | int | array | object
//! array      := '[' (value (',' value)*)? ']'
//! object     := '{' (property (',' property)*)? '}'
//! property   := string ':' value
//! ```
//!
//! Arrays become `VALUES` non-terminals and objects become `PROPERTIES`
//! non-terminals whose children are [`PropertyNode`]s sorted by key. Scalars
//! stay as terminals named `TRUE`, `FALSE`, `NULL`, `STRING`, `FLOAT` and
//! `INT`.
//!
//! The element lists are `kleene` repetitions with a `,` separator, so a
//! trailing comma before the closing bracket is tolerated. Numbers follow
//! JSON: no leading zeros, and a float needs a fraction or an exponent.
//! Arrays and objects nest at most [`MAX_DEPTH`] levels deep.

use std::any::Any;
use std::fmt;

use once_cell::sync::Lazy;
use serde_json::{Map, Number, Value};
use tracing::debug;

use crate::parsec::combinators::{and, kleene, nodify, ord_choice, ParseResult, Parser};
use crate::parsec::nesting::{bounded, NestingDepth};
use crate::parsec::node::{CustomNode, Node, NonTerminal};
use crate::parsec::scanner::SimpleScanner;
use crate::parsec::terminals::{end, string, token};
use crate::parsers;

type JsonParser = Parser<'static, SimpleScanner>;

/// Deepest array/object nesting accepted, matching serde_json's reader
pub const MAX_DEPTH: usize = 128;

thread_local! {
    static DEPTH: NestingDepth = const { NestingDepth::new() };
}

/// Errors from parsing a JSON document or converting its tree
#[derive(Debug, Clone, PartialEq)]
pub enum JsonError {
    /// The input is not a JSON document
    Syntax,
    InvalidNumber(String),
    InvalidString(String),
    /// A node that does not belong in a JSON tree
    UnexpectedNode(String),
    /// Arrays/objects nested deeper than the limit
    TooDeep(usize),
}

impl fmt::Display for JsonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JsonError::Syntax => write!(f, "Syntax error: input is not a JSON document"),
            JsonError::InvalidNumber(n) => write!(f, "Invalid number: {}", n),
            JsonError::InvalidString(s) => write!(f, "Invalid string literal: {}", s),
            JsonError::UnexpectedNode(n) => write!(f, "Unexpected node in JSON tree: {}", n),
            JsonError::TooDeep(max) => write!(f, "Nesting deeper than {} levels", max),
        }
    }
}

impl std::error::Error for JsonError {}

/// One `"key": value` member of an object.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyNode {
    /// The key exactly as written, quotes included
    pub key: String,
    pub value: Node,
}

impl CustomNode for PropertyNode {
    fn name(&self) -> &str {
        "PROPERTY"
    }

    fn children(&self) -> &[Node] {
        std::slice::from_ref(&self.value)
    }

    fn display_label(&self) -> String {
        format!("PROPERTY {}", self.key)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn eq_node(&self, other: &dyn CustomNode) -> bool {
        other
            .as_any()
            .downcast_ref::<PropertyNode>()
            .map_or(false, |o| o == self)
    }
}

const FLOAT_PATTERN: &str =
    r"-?(?:0|[1-9][0-9]*)(?:\.[0-9]+(?:[eE][+-]?[0-9]+)?|[eE][+-]?[0-9]+)";
const INT_PATTERN: &str = r"-?(?:0|[1-9][0-9]*)";

fn tok(pattern: &str, name: &str) -> JsonParser {
    token(pattern, name).expect("JSON token pattern compiles")
}

fn first(nodes: Vec<Node>) -> Option<Node> {
    nodes.into_iter().next()
}

fn second(nodes: Vec<Node>) -> Option<Node> {
    nodes.into_iter().nth(1)
}

fn values_node(nodes: Vec<Node>) -> Option<Node> {
    Some(NonTerminal::new("VALUES", nodes).into())
}

fn property_key(node: &Node) -> &str {
    node.as_custom::<PropertyNode>().map_or("", |p| p.key.as_str())
}

fn properties_node(mut nodes: Vec<Node>) -> Option<Node> {
    nodes.sort_by(|a, b| property_key(a).cmp(property_key(b)));
    Some(NonTerminal::new("PROPERTIES", nodes).into())
}

fn property_node(nodes: Vec<Node>) -> Option<Node> {
    let mut nodes = nodes.into_iter();
    let key = nodes.next()?.value().to_string();
    // skip the colon
    let value = nodes.nth(1)?;
    Some(Node::custom(PropertyNode { key, value }))
}

static COMMA: Lazy<JsonParser> = Lazy::new(|| tok(",", "COMMA"));

static VALUE: Lazy<JsonParser> = Lazy::new(|| {
    ord_choice(
        nodify(first),
        parsers![
            tok("true", "TRUE"),
            tok("false", "FALSE"),
            tok("null", "NULL"),
            string(),
            tok(FLOAT_PATTERN, "FLOAT"),
            tok(INT_PATTERN, "INT"),
            array,
            object,
        ],
    )
});

static ARRAY: Lazy<JsonParser> = Lazy::new(|| {
    let values = kleene(nodify(values_node), Parser::new(value), Some(COMMA.clone()));
    let values = bounded(&DEPTH, MAX_DEPTH, values);
    and(
        nodify(second),
        parsers![tok(r"\[", "OPENSQR"), values, tok(r"\]", "CLOSESQR")],
    )
});

static OBJECT: Lazy<JsonParser> = Lazy::new(|| {
    let properties = kleene(
        nodify(properties_node),
        Parser::new(property),
        Some(COMMA.clone()),
    );
    let properties = bounded(&DEPTH, MAX_DEPTH, properties);
    and(
        nodify(second),
        parsers![tok(r"\{", "OPENBRACE"), properties, tok(r"\}", "CLOSEBRACE")],
    )
});

static PROPERTY: Lazy<JsonParser> =
    Lazy::new(|| and(nodify(property_node), parsers![string(), tok(":", "COLON"), value]));

static DOCUMENT: Lazy<JsonParser> = Lazy::new(|| and(nodify(first), parsers![value, end()]));

/// Parser for a single JSON value, for embedding in larger grammars
pub fn value(s: SimpleScanner) -> ParseResult<SimpleScanner> {
    VALUE.parse(s)
}

fn array(s: SimpleScanner) -> ParseResult<SimpleScanner> {
    ARRAY.parse(s)
}

fn object(s: SimpleScanner) -> ParseResult<SimpleScanner> {
    OBJECT.parse(s)
}

fn property(s: SimpleScanner) -> ParseResult<SimpleScanner> {
    PROPERTY.parse(s)
}

/// Parse a complete JSON document into its tree. Surrounding whitespace is
/// allowed; anything else after the value is an error.
pub fn parse(text: &str) -> Result<Node, JsonError> {
    debug!(len = text.len(), "json: parse");
    DEPTH.with(NestingDepth::reset);
    match DOCUMENT.parse(SimpleScanner::from(text)) {
        (Some(node), _) => Ok(node),
        (None, _) if DEPTH.with(NestingDepth::exceeded) => Err(JsonError::TooDeep(MAX_DEPTH)),
        (None, _) => Err(JsonError::Syntax),
    }
}

/// Parse a complete JSON document straight into a `serde_json::Value`
pub fn parse_value(text: &str) -> Result<Value, JsonError> {
    to_value(&parse(text)?)
}

/// Convert a tree produced by this grammar into a `serde_json::Value`.
pub fn to_value(node: &Node) -> Result<Value, JsonError> {
    match node {
        Node::Terminal(t) => match t.name.as_str() {
            "TRUE" => Ok(Value::Bool(true)),
            "FALSE" => Ok(Value::Bool(false)),
            "NULL" => Ok(Value::Null),
            "STRING" => unquote(&t.value).map(Value::String),
            "INT" => match t.value.parse::<i64>() {
                Ok(n) => Ok(Value::from(n)),
                Err(_) => float_value(&t.value),
            },
            "FLOAT" => float_value(&t.value),
            other => Err(JsonError::UnexpectedNode(other.to_string())),
        },
        Node::NonTerminal(nt) if nt.name == "VALUES" => nt
            .children
            .iter()
            .map(to_value)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        Node::NonTerminal(nt) if nt.name == "PROPERTIES" => {
            let mut map = Map::new();
            for child in &nt.children {
                let property = child
                    .as_custom::<PropertyNode>()
                    .ok_or_else(|| JsonError::UnexpectedNode(child.name().to_string()))?;
                map.insert(unquote(&property.key)?, to_value(&property.value)?);
            }
            Ok(Value::Object(map))
        }
        other => Err(JsonError::UnexpectedNode(other.name().to_string())),
    }
}

fn unquote(literal: &str) -> Result<String, JsonError> {
    serde_json::from_str::<String>(literal)
        .map_err(|_| JsonError::InvalidString(literal.to_string()))
}

fn float_value(text: &str) -> Result<Value, JsonError> {
    text.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .ok_or_else(|| JsonError::InvalidNumber(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsec::testing::assert_node;
    use serde_json::json;

    #[test]
    fn test_scalars() {
        assert_node(&parse("true").unwrap()).terminal("TRUE", "true");
        assert_node(&parse(" null ").unwrap()).terminal("NULL", "null").position(1);
        assert_node(&parse("-12").unwrap()).terminal("INT", "-12");
        assert_node(&parse("1.5e3").unwrap()).terminal("FLOAT", "1.5e3");
        assert_node(&parse(r#""hi""#).unwrap()).terminal("STRING", r#""hi""#);
    }

    #[test]
    fn test_array_tree() {
        let node = parse("[1, true]").unwrap();

        assert_node(&node)
            .non_terminal("VALUES")
            .child_names(&["INT", "TRUE"]);
    }

    #[test]
    fn test_empty_containers() {
        assert_node(&parse("[]").unwrap()).non_terminal("VALUES").child_count(0);
        assert_node(&parse("{ }").unwrap()).non_terminal("PROPERTIES").child_count(0);
    }

    #[test]
    fn test_properties_sorted_by_key() {
        let node = parse(r#"{"b": 1, "a": 2}"#).unwrap();

        let keys: Vec<&str> = node.children().iter().map(property_key).collect();
        assert_eq!(keys, vec![r#""a""#, r#""b""#]);
    }

    #[test]
    fn test_trailing_input_rejected() {
        assert_eq!(parse("[1] x"), Err(JsonError::Syntax));
        assert_eq!(parse(""), Err(JsonError::Syntax));
    }

    #[test]
    fn test_to_value() {
        let value = parse_value(r#"{"name": "parsec", "tags": ["a", "b\n"], "n": 3, "f": 0.5}"#)
            .unwrap();

        assert_eq!(
            value,
            json!({"name": "parsec", "tags": ["a", "b\n"], "n": 3, "f": 0.5})
        );
    }

    #[test]
    fn test_invalid_escape() {
        assert!(matches!(
            parse_value(r#""\q""#),
            Err(JsonError::InvalidString(_))
        ));
    }

    #[test]
    fn test_float_out_of_range() {
        assert!(matches!(
            parse_value("1e999"),
            Err(JsonError::InvalidNumber(_))
        ));
    }

    #[test]
    fn test_leading_zeros_rejected() {
        assert_eq!(parse("01"), Err(JsonError::Syntax));
        assert_eq!(parse("[-01]"), Err(JsonError::Syntax));
        assert_eq!(parse("00.5"), Err(JsonError::Syntax));
        assert_node(&parse("0").unwrap()).terminal("INT", "0");
        assert_node(&parse("-0.5").unwrap()).terminal("FLOAT", "-0.5");
        assert_node(&parse("10").unwrap()).terminal("INT", "10");
    }

    #[test]
    fn test_nesting_limit() {
        let nest = |depth: usize| format!("{}{}", "[".repeat(depth), "]".repeat(depth));

        assert!(parse(&nest(MAX_DEPTH)).is_ok());
        assert_eq!(parse(&nest(MAX_DEPTH + 1)), Err(JsonError::TooDeep(MAX_DEPTH)));
        assert_eq!(parse(&nest(5000)), Err(JsonError::TooDeep(MAX_DEPTH)));
    }

    #[test]
    fn test_syntax_error_after_deep_nesting_is_not_too_deep() {
        let text = format!("{}1]", "[".repeat(MAX_DEPTH));

        assert_eq!(parse(&text), Err(JsonError::Syntax));
    }

    #[test]
    fn test_unexpected_node() {
        let node = Node::from(NonTerminal::new("SUM", vec![]));

        assert_eq!(
            to_value(&node),
            Err(JsonError::UnexpectedNode("SUM".to_string()))
        );
    }
}
