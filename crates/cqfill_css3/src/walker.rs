use crate::node::{BlockKind, Node, NodeType};
use std::io::Write;
use std::ops::Deref;

/// The walker is used to walk the AST and print it to stdout.
pub struct Walker<'a> {
    root: &'a Node,
}

impl<'a> Walker<'a> {
    pub fn new(root: &'a Node) -> Self {
        Self { root }
    }

    pub fn walk_stdout(&self) {
        let _ = inner_walk(self.root, 0, &mut std::io::stdout());
    }

    pub fn walk_to_string(&self) -> String {
        let mut output: Vec<u8> = Vec::new();

        let _ = inner_walk(self.root, 0, &mut output);

        String::from_utf8_lossy(&output).into_owned()
    }
}

fn inner_walk(node: &Node, depth: usize, f: &mut dyn Write) -> Result<(), std::io::Error> {
    let prefix = " ".repeat(depth * 2);

    match node.node_type.deref() {
        NodeType::StyleSheet { children } => {
            writeln!(f, "{}[StyleSheet ({})]", prefix, children.len())?;
            for child in children.iter() {
                inner_walk(child, depth + 1, f)?;
            }
        }
        NodeType::AtRule {
            name,
            prelude,
            block,
        } => {
            writeln!(f, "{}[AtRule] name: {}", prefix, name)?;
            for child in prelude.iter() {
                inner_walk(child, depth + 1, f)?;
            }
            if let Some(block) = block {
                inner_walk(block, depth + 1, f)?;
            }
        }
        NodeType::Rule { prelude, block } => {
            writeln!(f, "{}[Rule]", prefix)?;
            for child in prelude.iter() {
                inner_walk(child, depth + 1, f)?;
            }
            inner_walk(block, depth + 1, f)?;
        }
        NodeType::Declaration {
            property,
            value,
            important,
        } => {
            writeln!(
                f,
                "{}[Declaration] property: {} important: {}",
                prefix, property, important
            )?;
            for child in value.iter() {
                inner_walk(child, depth + 1, f)?;
            }
        }
        NodeType::Block {
            kind, children, ..
        } => {
            match kind {
                BlockKind::Simple => writeln!(f, "{}[Block]", prefix)?,
                kind => writeln!(f, "{}[Block] kind: {:?}", prefix, kind)?,
            }
            for child in children.iter() {
                inner_walk(child, depth + 1, f)?;
            }
        }
        NodeType::Function { name, arguments } => {
            writeln!(f, "{}[Function] {}", prefix, name)?;
            for child in arguments.iter() {
                inner_walk(child, depth + 1, f)?;
            }
        }
        NodeType::Ident { value } => {
            writeln!(f, "{}[Ident] {}", prefix, value)?;
        }
        NodeType::Number { raw, .. } => {
            writeln!(f, "{}[Number] {}", prefix, raw)?;
        }
        NodeType::Percentage { raw, .. } => {
            writeln!(f, "{}[Percentage] {}%", prefix, raw)?;
        }
        NodeType::Dimension { unit, raw, .. } => {
            writeln!(f, "{}[Dimension] {}{}", prefix, raw, unit)?;
        }
        NodeType::String { value } => {
            writeln!(f, "{}[String] {}", prefix, value)?;
        }
        NodeType::Url { url } => {
            writeln!(f, "{}[Url] {}", prefix, url)?;
        }
        NodeType::Hash { value, .. } => {
            writeln!(f, "{}[Hash] {}", prefix, value)?;
        }
        NodeType::Delim { value } => {
            writeln!(f, "{}[Delim] {}", prefix, value)?;
        }
        NodeType::Whitespace => {}
        NodeType::Comma => {
            writeln!(f, "{}[Comma]", prefix)?;
        }
        NodeType::Colon => {
            writeln!(f, "{}[Colon]", prefix)?;
        }
        NodeType::Semicolon => {
            writeln!(f, "{}[Semicolon]", prefix)?;
        }
        NodeType::Cdo => {}
        NodeType::Cdc => {}
        NodeType::Raw { value } => {
            writeln!(f, "{}[Raw] {}", prefix, value)?;
        }
    }
    Ok(())
}
