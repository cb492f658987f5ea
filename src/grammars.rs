//! Grammars built on the combinator engine
//!
//! - `json`: JSON documents, with conversion into `serde_json::Value`
//! - `expr`: integer arithmetic with `+ - * / %` and parentheses

pub mod expr;
pub mod json;
