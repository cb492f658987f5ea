//! Single-line s-expression rendering
//!
//! ```text
//! Terminal         NAME:"value"
//! absent           _
//! NonTerminal      (NAME child ...)   or (NAME="value" child ...)
//! List             [child ...]
//! Custom           (name child ...)
//! ```

use crate::parsec::node::Node;

pub fn to_sexp_str(node: &Node) -> String {
    let mut out = String::new();
    write_node(&mut out, node);
    out
}

fn write_node(out: &mut String, node: &Node) {
    match node {
        Node::Terminal(t) if t.is_absent() => out.push('_'),
        Node::Terminal(t) => out.push_str(&format!("{}:{:?}", t.name, t.value)),
        Node::NonTerminal(nt) => {
            out.push('(');
            out.push_str(&nt.name);
            if !nt.value.is_empty() {
                out.push_str(&format!("={:?}", nt.value));
            }
            write_children(out, &nt.children);
            out.push(')');
        }
        Node::List(nodes) => {
            out.push('[');
            for (i, child) in nodes.iter().enumerate() {
                if i > 0 {
                    out.push(' ');
                }
                write_node(out, child);
            }
            out.push(']');
        }
        Node::Custom(c) => {
            out.push('(');
            out.push_str(c.name());
            write_children(out, c.children());
            out.push(')');
        }
    }
}

fn write_children(out: &mut String, children: &[Node]) {
    for child in children {
        out.push(' ');
        write_node(out, child);
    }
}
