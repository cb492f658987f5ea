//! Output formats for parsed trees
//!
//! - `treeviz`: one node per line, nesting drawn with box connectors
//! - `sexp`: the whole tree on a single line, handy in tests and logs

pub mod sexp;
pub mod treeviz;

pub use sexp::to_sexp_str;
pub use treeviz::to_treeviz_str;
