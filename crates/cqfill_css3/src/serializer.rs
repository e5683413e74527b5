use crate::node::{BlockKind, Node, NodeType};

/// Serializes a node tree back to CSS text.
///
/// Leaves emit their canonical form, numeric leaves keep the author's raw
/// spelling, whitespace collapses into a single space, and blocks re-emit
/// the bracket pair they were parsed with.
pub fn serialize(node: &Node) -> String {
    let mut out = String::new();
    serialize_node(node, BlockKind::RuleList, &mut out);
    out
}

/// Serializes a slice of component values exactly as stored
pub fn serialize_nodes(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        serialize_node(node, BlockKind::Simple, &mut out);
    }
    out
}

fn serialize_nodes_trimmed(nodes: &[Node]) -> String {
    serialize_nodes(nodes).trim().to_string()
}

fn serialize_node(node: &Node, parent: BlockKind, out: &mut String) {
    match &*node.node_type {
        NodeType::StyleSheet { children } => {
            for (i, child) in children.iter().enumerate() {
                if i > 0 {
                    out.push('\n');
                }
                serialize_node(child, BlockKind::RuleList, out);
            }
        }
        NodeType::AtRule {
            name,
            prelude,
            block,
        } => {
            out.push('@');
            out.push_str(name);

            let prelude = serialize_nodes_trimmed(prelude);
            if !prelude.is_empty() {
                out.push(' ');
                out.push_str(&prelude);
            }

            match block {
                Some(block) => {
                    out.push(' ');
                    serialize_node(block, parent, out);
                }
                None => out.push(';'),
            }
        }
        NodeType::Rule { prelude, block } => {
            out.push_str(&serialize_nodes_trimmed(prelude));
            out.push(' ');
            serialize_node(block, parent, out);
        }
        NodeType::Declaration {
            property,
            value,
            important,
        } => {
            out.push_str(property);
            out.push_str(": ");
            out.push_str(&serialize_nodes_trimmed(value));
            if *important {
                out.push_str(" !important");
            }
            // a declaration directly inside a simple block carries no
            // terminator of its own
            if parent != BlockKind::Simple {
                out.push(';');
            }
        }
        NodeType::Block {
            delim,
            kind,
            children,
        } => {
            out.push(delim.open());
            match kind {
                BlockKind::Simple => {
                    for child in children {
                        serialize_node(child, BlockKind::Simple, out);
                    }
                }
                kind => {
                    for child in children {
                        out.push(' ');
                        serialize_node(child, *kind, out);
                    }
                    if !children.is_empty() {
                        out.push(' ');
                    }
                }
            }
            out.push(delim.close());
        }
        NodeType::Function { name, arguments } => {
            out.push_str(name);
            out.push('(');
            for argument in arguments {
                serialize_node(argument, BlockKind::Simple, out);
            }
            out.push(')');
        }
        NodeType::Ident { value } => out.push_str(value),
        NodeType::Number { raw, .. } => out.push_str(raw),
        NodeType::Percentage { raw, .. } => {
            out.push_str(raw);
            out.push('%');
        }
        NodeType::Dimension { unit, raw, .. } => {
            out.push_str(raw);
            out.push_str(unit);
        }
        NodeType::String { value } => {
            out.push('"');
            out.push_str(&value.replace('\\', "\\\\").replace('"', "\\\""));
            out.push('"');
        }
        NodeType::Url { url } => {
            out.push_str("url(\"");
            out.push_str(&url.replace('\\', "\\\\").replace('"', "\\\""));
            out.push_str("\")");
        }
        NodeType::Hash { value, .. } => {
            out.push('#');
            out.push_str(value);
        }
        NodeType::Delim { value } => out.push(*value),
        NodeType::Whitespace => out.push(' '),
        NodeType::Comma => out.push(','),
        NodeType::Colon => out.push(':'),
        NodeType::Semicolon => out.push(';'),
        NodeType::Cdo => out.push_str("<!--"),
        NodeType::Cdc => out.push_str("-->"),
        NodeType::Raw { value } => out.push_str(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser_config::ParserConfig;
    use crate::CssParser;

    fn round_trip(input: &str) -> String {
        let config = ParserConfig {
            ignore_errors: true,
            ..Default::default()
        };
        let node = CssParser::parse(input, config).unwrap();
        serialize(&node)
    }

    #[test]
    fn serialize_rule() {
        assert_eq!(
            round_trip(".a { color: red; }"),
            ".a { color: red; }"
        );
    }

    #[test]
    fn serialize_preserves_raw_numbers() {
        assert_eq!(
            round_trip(".a { width: 3.0px; }"),
            ".a { width: 3.0px; }"
        );
    }

    #[test]
    fn serialize_selector_whitespace() {
        assert_eq!(
            round_trip(".a > .b .c { color: red; }"),
            ".a > .b .c { color: red; }"
        );
    }

    #[test]
    fn serialize_at_rule() {
        assert_eq!(
            round_trip("@media screen { .a { color: red; } }"),
            "@media screen { .a { color: red; } }"
        );
    }

    #[test]
    fn serialize_at_rule_without_block() {
        assert_eq!(
            round_trip("@layer base;"),
            "@layer base;"
        );
    }

    #[test]
    fn serialize_important() {
        assert_eq!(
            round_trip(".a { color: red !important; }"),
            ".a { color: red !important; }"
        );
    }

    #[test]
    fn serialize_function_values() {
        assert_eq!(
            round_trip(".a { width: calc(100% - 10px); }"),
            ".a { width: calc(100% - 10px); }"
        );
    }

    #[test]
    fn serialize_unknown_at_rule_block_verbatim() {
        assert_eq!(
            round_trip("@font-feature-values Demo { @styleset { x: 1; } }"),
            "@font-feature-values Demo { @styleset { x: 1; } }"
        );
    }

    #[test]
    fn stable_after_one_pass() {
        let inputs = [
            ".a { color: red; }",
            "@container card (min-width: 200px) { .a { color: red; } }",
            "@media all { .b { margin: 0 auto; } }",
        ];
        for input in inputs {
            let once = round_trip(input);
            assert_eq!(round_trip(&once), once, "stability of {input}");
        }
    }
}
