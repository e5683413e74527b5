use cqfill_css3::node::{Node, NodeType};
use cqfill_css3::serializer::serialize_nodes;

/// Pseudo elements that are still addressable with a single colon
const LEGACY_PSEUDO_ELEMENTS: [&str; 4] = ["before", "after", "first-line", "first-letter"];

/// Splits a selector prelude on top-level commas. Commas inside blocks and
/// functions stay where they are.
pub fn split_selector_list(prelude: &[Node]) -> Vec<Vec<Node>> {
    let mut components = Vec::new();
    let mut current = Vec::new();

    for node in prelude {
        if node.is_comma() {
            components.push(std::mem::take(&mut current));
        } else {
            current.push(node.clone());
        }
    }
    components.push(current);

    components
}

/// Partitions one selector into the part that selects the element and the
/// pseudo-element suffix that styles something the element generates. The
/// suffix starts at the first `::` pseudo, or at a single-colon legacy
/// pseudo element.
pub fn partition_pseudo(component: &[Node]) -> (Vec<Node>, Vec<Node>) {
    let mut i = 0;
    while i < component.len() {
        if component[i].is_colon() && starts_pseudo_element(&component[i + 1..]) {
            return (component[..i].to_vec(), component[i..].to_vec());
        }
        i += 1;
    }

    (component.to_vec(), Vec::new())
}

fn starts_pseudo_element(rest: &[Node]) -> bool {
    match rest.first().map(|n| &*n.node_type) {
        Some(NodeType::Colon) => true,
        Some(NodeType::Ident { value }) => LEGACY_PSEUDO_ELEMENTS
            .iter()
            .any(|p| value.eq_ignore_ascii_case(p)),
        _ => false,
    }
}

/// The element selector form of a partition prefix. An empty prefix selects
/// everything.
pub fn element_selector(prefix: &[Node]) -> String {
    let selector = serialize_nodes(prefix).trim().to_string();
    if selector.is_empty() {
        "*".to_string()
    } else {
        selector
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cqfill_css3::node::NodeType;
    use cqfill_css3::parser_config::{Context, ParserConfig};
    use cqfill_css3::CssParser;

    fn prelude(input: &str) -> Vec<Node> {
        let config = ParserConfig {
            context: Context::Rule,
            ..Default::default()
        };
        let rule = CssParser::parse(&format!("{input} {{ }}"), config).unwrap();
        match *rule.node_type {
            NodeType::Rule { prelude, .. } => prelude,
            _ => panic!("expected rule"),
        }
    }

    fn partition(input: &str) -> (String, String) {
        let prelude = prelude(input);
        let components = split_selector_list(&prelude);
        assert_eq!(components.len(), 1);
        let (prefix, suffix) = partition_pseudo(&components[0]);
        (
            element_selector(&prefix),
            serialize_nodes(&suffix).trim().to_string(),
        )
    }

    #[test]
    fn no_pseudo() {
        assert_eq!(partition(".a > .b"), (".a > .b".to_string(), String::new()));
    }

    #[test]
    fn double_colon_pseudo() {
        assert_eq!(
            partition(".a::before"),
            (".a".to_string(), "::before".to_string())
        );
    }

    #[test]
    fn legacy_single_colon_pseudo() {
        assert_eq!(
            partition(".a:after"),
            (".a".to_string(), ":after".to_string())
        );
        assert_eq!(
            partition("p:first-line"),
            ("p".to_string(), ":first-line".to_string())
        );
    }

    #[test]
    fn pseudo_class_stays_in_the_prefix() {
        assert_eq!(
            partition(".a:hover::after"),
            (".a:hover".to_string(), "::after".to_string())
        );
        assert_eq!(
            partition(".a:not(.b)"),
            (".a:not(.b)".to_string(), String::new())
        );
    }

    #[test]
    fn bare_pseudo_element_selects_everything() {
        assert_eq!(
            partition("::before"),
            ("*".to_string(), "::before".to_string())
        );
    }

    #[test]
    fn selector_list_splits_on_top_level_commas() {
        let prelude = prelude(".a, .b:is(c, d)");
        let components = split_selector_list(&prelude);
        assert_eq!(components.len(), 2);
        assert_eq!(element_selector(&components[0]), ".a");
        assert_eq!(element_selector(&components[1]), ".b:is(c, d)");
    }
}
