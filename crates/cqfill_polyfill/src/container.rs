use crate::condition::{parse_condition, ContainerCondition, SizeFeature};
use crate::cursor::NodeCursor;
use cqfill_css3::node::{Node, NodeType};
use cqfill_shared::errors::{CssError, CssResult};
use lazy_static::lazy_static;
use std::collections::HashSet;

/// Prefix applied to sentinel keywords (`none`, `normal`, and the CSS-wide
/// keywords) before they are written into a custom property value, so the
/// keyword loses its cascade meaning but stays recognizable to the host.
pub const INTERNAL_KEYWORD_PREFIX: &str = "cq-";

lazy_static! {
    static ref CSS_WIDE_KEYWORDS: HashSet<&'static str> = {
        let mut s = HashSet::new();
        s.insert("initial");
        s.insert("inherit");
        s.insert("unset");
        s.insert("revert");
        s.insert("revert-layer");
        s
    };

    /// Words that can never be used as a container name
    static ref RESERVED_CONTAINER_NAMES: HashSet<&'static str> = {
        let mut s = HashSet::new();
        s.insert("none");
        s.insert("and");
        s.insert("not");
        s.insert("or");
        s.insert("normal");
        s.insert("auto");
        s.extend(CSS_WIDE_KEYWORDS.iter());
        s
    };
}

fn is_css_wide_keyword(name: &str) -> bool {
    CSS_WIDE_KEYWORDS.contains(name.to_ascii_lowercase().as_str())
}

fn is_reserved_container_name(name: &str) -> bool {
    RESERVED_CONTAINER_NAMES.contains(name.to_ascii_lowercase().as_str())
}

fn sentinel(keyword: &str) -> String {
    format!("{INTERNAL_KEYWORD_PREFIX}{}", keyword.to_ascii_lowercase())
}

/// One parsed `@container` rule
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerRule {
    /// The optional container name the rule is restricted to
    pub name: Option<String>,
    /// The parsed condition
    pub condition: ContainerCondition,
    /// Every size feature the condition references. When one of these
    /// resolves to unknown, the whole rule does.
    pub features: HashSet<SizeFeature>,
}

/// Parses an `@container` prelude: `[ <name> ]? <condition>`
pub fn parse_container_rule(nodes: &[Node]) -> CssResult<ContainerRule> {
    log::trace!("parse_container_rule");

    let mut cursor = NodeCursor::new(nodes);

    let mut name = None;
    if let Some(node) = cursor.peek() {
        if let NodeType::Ident { value } = &*node.node_type {
            // "not" opens a condition instead of naming the container
            if !value.eq_ignore_ascii_case("not") {
                if is_reserved_container_name(value) {
                    return Err(CssError::new(
                        format!("'{value}' cannot be used as a container name").as_str(),
                    ));
                }
                name = Some(value.clone());
                cursor.next();
            }
        }
    }

    let condition = parse_condition(&mut cursor)?;
    if !cursor.at_end() {
        return Err(CssError::new("unexpected content after container condition"));
    }

    let mut features = HashSet::new();
    collect_features(&condition, &mut features);

    Ok(ContainerRule {
        name,
        condition,
        features,
    })
}

fn collect_features(condition: &ContainerCondition, features: &mut HashSet<SizeFeature>) {
    match condition {
        ContainerCondition::Not(inner) => collect_features(inner, features),
        ContainerCondition::And(left, right) | ContainerCondition::Or(left, right) => {
            collect_features(left, features);
            collect_features(right, features);
        }
        ContainerCondition::Compare { left, right, .. } => {
            collect_features(left, features);
            collect_features(right, features);
        }
        ContainerCondition::Feature(feature) => {
            features.insert(*feature);
        }
        ContainerCondition::Literal(_) => {}
    }
}

fn idents(nodes: &[Node]) -> CssResult<Vec<String>> {
    let mut cursor = NodeCursor::new(nodes);
    let mut values = Vec::new();

    while let Some(node) = cursor.next() {
        match &*node.node_type {
            NodeType::Ident { value } => values.push(value.clone()),
            _ => return Err(CssError::new("expected identifier")),
        }
    }

    Ok(values)
}

/// Parses a `container-name` declaration value: one or more custom idents,
/// or (standalone only) the `none` keyword or a CSS-wide keyword, which
/// produce a single internal-prefixed sentinel.
pub fn parse_container_name_property(nodes: &[Node], standalone: bool) -> CssResult<Vec<String>> {
    let names = idents(nodes)?;

    if names.is_empty() {
        return Err(CssError::new("expected container name"));
    }

    if names.len() == 1 && standalone {
        let lower = names[0].to_ascii_lowercase();
        if lower == "none" || is_css_wide_keyword(&lower) {
            return Ok(vec![sentinel(&lower)]);
        }
    }

    for name in &names {
        if is_reserved_container_name(name) {
            return Err(CssError::new(
                format!("'{name}' cannot be used as a container name").as_str(),
            ));
        }
    }

    Ok(names)
}

/// Parses a `container-type` declaration value: `size`, `inline-size`, or
/// `normal`, or (standalone only) a CSS-wide keyword sentinel.
pub fn parse_container_type_property(nodes: &[Node], standalone: bool) -> CssResult<Vec<String>> {
    let types = idents(nodes)?;

    if types.is_empty() {
        return Err(CssError::new("expected container type"));
    }

    if types.len() == 1 && standalone && is_css_wide_keyword(&types[0]) {
        return Ok(vec![sentinel(&types[0])]);
    }

    let mut values = Vec::new();
    for value in &types {
        match value.to_ascii_lowercase().as_str() {
            t @ ("size" | "inline-size" | "normal") => values.push(t.to_string()),
            _ => {
                return Err(CssError::new(
                    format!("'{value}' is not a container type").as_str(),
                ))
            }
        }
    }

    Ok(values)
}

/// Parses the `container` shorthand: `<name-list> [ / <type-list> ]?`.
/// Either side of the slash may be empty. A lone CSS-wide keyword applies to
/// both longhands.
pub fn parse_container_shorthand(nodes: &[Node]) -> CssResult<(Vec<String>, Vec<String>)> {
    let mut name_nodes: Vec<Node> = Vec::new();
    let mut type_nodes: Vec<Node> = Vec::new();
    let mut seen_slash = false;

    for node in nodes {
        if node.is_delim('/') {
            if seen_slash {
                return Err(CssError::new("unexpected '/' in container shorthand"));
            }
            seen_slash = true;
            continue;
        }

        if seen_slash {
            type_nodes.push(node.clone());
        } else {
            name_nodes.push(node.clone());
        }
    }

    let significant =
        |nodes: &[Node]| nodes.iter().any(|n| !n.is_whitespace());

    if !seen_slash {
        let names = idents(&name_nodes)?;
        if names.len() == 1 && is_css_wide_keyword(&names[0]) {
            let word = sentinel(&names[0]);
            return Ok((vec![word.clone()], vec![word]));
        }
    }

    let names = if significant(&name_nodes) {
        parse_container_name_property(&name_nodes, false)?
    } else {
        Vec::new()
    };

    let types = if significant(&type_nodes) {
        parse_container_type_property(&type_nodes, false)?
    } else {
        Vec::new()
    };

    Ok((names, types))
}
