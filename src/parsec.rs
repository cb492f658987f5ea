//! Main module for the combinator engine and its collaborators

pub mod combinators;
pub mod config;
pub mod formats;
pub mod nesting;
pub mod node;
pub mod scanner;
pub mod terminals;
pub mod testing;
