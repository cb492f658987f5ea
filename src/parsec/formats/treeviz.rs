//! Treeviz formatter for parse trees
//!
//! One line per node, nesting encoded as indentation of 2 characters per
//! level, with box-drawing connectors:
//!
//! ```text
//! └─ NonTerminal: SUM
//!   ├─ Terminal: INT "1" @0
//!   ├─ Terminal: ADD "+" @2
//!   └─ NonTerminal: PROD
//!     ├─ Terminal: INT "2" @4
//!     ├─ Terminal: MUL "*" @6
//!     └─ Terminal: INT "3" @8
//! ```
//!
//! Each line is `<prefix><connector> <node type>: <label>`, with the label
//! truncated to the configured width.

use crate::parsec::node::Node;

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let mut truncated = s.chars().take(max_chars).collect::<String>();
        truncated.push_str("...");
        truncated
    } else {
        s.to_string()
    }
}

pub fn to_treeviz_str(node: &Node, label_width: usize) -> String {
    let mut result = String::new();
    append_node(&mut result, node, "", true, label_width);
    result
}

fn append_node(
    result: &mut String,
    node: &Node,
    prefix: &str,
    is_last: bool,
    label_width: usize,
) {
    let connector = if is_last { "└─" } else { "├─" };
    let display_label = truncate(&node.display_label(), label_width);

    result.push_str(&format!(
        "{}{} {}: {}\n",
        prefix,
        connector,
        node.node_type(),
        display_label
    ));

    let new_prefix = format!("{}{}", prefix, if is_last { "  " } else { "│ " });
    let children = node.children();
    for (i, child) in children.iter().enumerate() {
        let is_last = i == children.len() - 1;
        append_node(result, child, &new_prefix, is_last, label_width);
    }
}
