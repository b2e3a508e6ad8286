use crate::node::tree::ConfigNode;
use std::fmt::{self, Write};

const INDENT: char = '\t';

impl ConfigNode {
    /// Render the node in canonical form: tab indentation, header and
    /// braces on their own lines, values before child blocks.
    ///
    /// Reparsing the output yields an identical tree.
    pub fn serialize(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = write_node(&mut out, self, 0);
        out
    }
}

impl fmt::Display for ConfigNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_node(f, self, 0)
    }
}

fn write_node<W: Write>(out: &mut W, node: &ConfigNode, depth: usize) -> fmt::Result {
    if node.is_root() {
        return write_contents(out, node, depth);
    }

    indent(out, depth)?;
    writeln!(out, "{}", node.header())?;
    indent(out, depth)?;
    writeln!(out, "{{")?;
    write_contents(out, node, depth + 1)?;
    indent(out, depth)?;
    writeln!(out, "}}")
}

fn write_contents<W: Write>(out: &mut W, node: &ConfigNode, depth: usize) -> fmt::Result {
    for value in node.values() {
        indent(out, depth)?;
        writeln!(out, "{value}")?;
    }
    for child in node.children() {
        write_node(out, child, depth)?;
    }
    Ok(())
}

fn indent<W: Write>(out: &mut W, depth: usize) -> fmt::Result {
    for _ in 0..depth {
        out.write_char(INDENT)?;
    }
    Ok(())
}
