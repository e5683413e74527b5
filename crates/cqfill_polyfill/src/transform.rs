use crate::container::{
    parse_container_name_property, parse_container_rule, parse_container_shorthand,
    parse_container_type_property, ContainerRule, INTERNAL_KEYWORD_PREFIX,
};
use crate::errors::Error;
use crate::selector;
use anyhow::{anyhow, Result};
use cqfill_css3::node::{BlockDelim, BlockKind, Node, NodeType};
use cqfill_css3::parser_config::ParserConfig;
use cqfill_css3::serializer::{serialize, serialize_nodes};
use cqfill_css3::tokenizer::{Number, NumericFlag};
use cqfill_css3::CssParser;
use cqfill_shared::byte_stream::Location;
use itertools::Itertools;
use url::Url;

/// Attribute whose whitespace-separated words are the descriptor uids the
/// host has applied to an element
pub const SELF_ATTRIBUTE: &str = "data-cq-match";

/// Guard the author writes into a selector so it stays rewritable in
/// environments without `:where()`
pub const FALLBACK_SENTINEL: &str = ":not(.container-query-polyfill)";

#[derive(Debug, Clone)]
pub struct TranspileConfig {
    /// Suffix woven into generated custom property names and descriptor uids
    /// so two polyfill instances can coexist in one document
    pub salt: String,
    /// Base URL every url() reference is resolved against
    pub base_url: Option<String>,
    /// Whether the target environment supports the :where() pseudo class
    pub supports_where: bool,
    /// Source name used in diagnostics
    pub source: Option<String>,
}

impl Default for TranspileConfig {
    fn default() -> Self {
        Self {
            salt: "0".to_string(),
            base_url: None,
            supports_where: true,
            source: None,
        }
    }
}

/// The transformer's handle for one `@container` rule. The host locates
/// candidate elements with the selector and tags matches with the uid.
#[derive(Debug, Clone)]
pub struct ContainerQueryDescriptor {
    pub rule: ContainerRule,
    /// Opaque id, unique within one transpilation result, usable verbatim as
    /// an attribute-value word
    pub uid: String,
    /// Deduplicated, comma-joined element selectors of the rules guarded by
    /// this descriptor. None when the rule body holds no style rules.
    pub selector: Option<String>,
    /// Index of the enclosing `@container` descriptor, for nested rules
    pub parent: Option<usize>,
}

#[derive(Debug)]
pub struct TranspileResult {
    pub source: String,
    pub descriptors: Vec<ContainerQueryDescriptor>,
    pub diagnostics: Vec<Error>,
}

/// Rewrites a stylesheet so container query rules become plain CSS the host
/// can switch on and off per element.
pub struct Transpiler {
    config: TranspileConfig,
    base_url: Option<Url>,
    counter: u32,
    descriptors: Vec<ContainerQueryDescriptor>,
    /// Element selectors collected per descriptor while walking its body
    elements: Vec<Vec<String>>,
    diagnostics: Vec<Error>,
}

impl Transpiler {
    pub fn new(config: TranspileConfig) -> Self {
        let base_url = config
            .base_url
            .as_deref()
            .and_then(|base| Url::parse(base).ok());

        Self {
            config,
            base_url,
            counter: 0,
            descriptors: Vec::new(),
            elements: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Transforms the stylesheet. This never fails: when the sheet cannot be
    /// processed at all, the input comes back unchanged with no descriptors.
    pub fn transpile(mut self, source: &str) -> TranspileResult {
        match self.transpile_internal(source) {
            Ok(output) => {
                for (descriptor, elements) in self.descriptors.iter_mut().zip(&self.elements) {
                    if !elements.is_empty() {
                        descriptor.selector = Some(elements.iter().unique().join(", "));
                    }
                }

                TranspileResult {
                    source: output,
                    descriptors: self.descriptors,
                    diagnostics: self.diagnostics,
                }
            }
            Err(e) => {
                log::warn!("returning the stylesheet unchanged: {e}");
                self.diagnostics.push(Error::CssCompile(e.to_string()));

                TranspileResult {
                    source: source.to_string(),
                    descriptors: Vec::new(),
                    diagnostics: self.diagnostics,
                }
            }
        }
    }

    fn transpile_internal(&mut self, source: &str) -> Result<String> {
        let config = ParserConfig {
            ignore_errors: true,
            source: self.config.source.clone(),
            ..Default::default()
        };

        let sheet = CssParser::parse(source, config).map_err(|e| anyhow!("css parse: {e}"))?;
        let location = sheet.location.clone();

        let children = match *sheet.node_type {
            NodeType::StyleSheet { children } => children,
            _ => return Err(anyhow!("expected a stylesheet root")),
        };

        let children = if self.base_url.is_some() {
            children.into_iter().map(|c| self.rewrite_urls(c)).collect()
        } else {
            children
        };

        let children = self.transform_rule_list(children, None);

        Ok(serialize(&Node::new(
            NodeType::StyleSheet { children },
            location,
        )))
    }

    fn transform_rule_list(&mut self, children: Vec<Node>, parent: Option<usize>) -> Vec<Node> {
        children
            .into_iter()
            .map(|child| self.transform_rule(child, parent))
            .collect()
    }

    fn transform_rule(&mut self, node: Node, parent: Option<usize>) -> Node {
        let loc = node.location.clone();
        match *node.node_type {
            NodeType::AtRule {
                name,
                prelude,
                block,
            } => self.transform_at_rule(name, prelude, block, parent, loc),
            NodeType::Rule { prelude, block } => {
                self.transform_qualified_rule(prelude, block, parent, loc)
            }
            other => Node::new(other, loc),
        }
    }

    fn transform_at_rule(
        &mut self,
        name: String,
        prelude: Vec<Node>,
        block: Option<Node>,
        parent: Option<usize>,
        loc: Location,
    ) -> Node {
        match name.to_ascii_lowercase().as_str() {
            "container" => self.transform_container_rule(name, prelude, block, parent, loc),
            "media" | "layer" => {
                let block = block.map(|b| self.transform_nested_block(b, parent));
                Node::new(
                    NodeType::AtRule {
                        name,
                        prelude,
                        block,
                    },
                    loc,
                )
            }
            "supports" => {
                let prelude = self.transform_supports_condition(prelude);
                let block = block.map(|b| self.transform_nested_block(b, parent));
                Node::new(
                    NodeType::AtRule {
                        name,
                        prelude,
                        block,
                    },
                    loc,
                )
            }
            lower if is_keyframes_name(lower) => {
                let block = block.map(|b| self.transform_keyframes_block(b));
                Node::new(
                    NodeType::AtRule {
                        name,
                        prelude,
                        block,
                    },
                    loc,
                )
            }
            _ => Node::new(
                NodeType::AtRule {
                    name,
                    prelude,
                    block,
                },
                loc,
            ),
        }
    }

    /// Rewrites `@container` into an always-live `@media all` wrapper whose
    /// rules only apply to elements the host has tagged with the descriptor
    /// uid. An unparseable prelude leaves the rule untouched.
    fn transform_container_rule(
        &mut self,
        name: String,
        prelude: Vec<Node>,
        block: Option<Node>,
        parent: Option<usize>,
        loc: Location,
    ) -> Node {
        let rule = match parse_container_rule(&prelude) {
            Ok(rule) => rule,
            Err(e) => {
                log::warn!("leaving @container rule unchanged: {e}");
                return Node::new(
                    NodeType::AtRule {
                        name,
                        prelude,
                        block,
                    },
                    loc,
                );
            }
        };

        let index = self.descriptors.len();
        let uid = format!("cq-{}-{}", self.config.salt, self.counter);
        self.counter += 1;

        self.descriptors.push(ContainerQueryDescriptor {
            rule,
            uid,
            selector: None,
            parent,
        });
        self.elements.push(Vec::new());

        let block = block.map(|b| self.transform_nested_block(b, Some(index)));

        Node::new(
            NodeType::AtRule {
                name: "media".to_string(),
                prelude: vec![Node::new(
                    NodeType::Ident {
                        value: "all".to_string(),
                    },
                    loc.clone(),
                )],
                block,
            },
            loc,
        )
    }

    /// Recurses into the rule list of a grouping at-rule
    fn transform_nested_block(&mut self, block: Node, parent: Option<usize>) -> Node {
        let loc = block.location.clone();
        match *block.node_type {
            NodeType::Block {
                delim,
                kind,
                children,
            } => Node::new(
                NodeType::Block {
                    delim,
                    kind,
                    children: self.transform_rule_list(children, parent),
                },
                loc,
            ),
            other => Node::new(other, loc),
        }
    }

    fn transform_qualified_rule(
        &mut self,
        prelude: Vec<Node>,
        block: Node,
        parent: Option<usize>,
        loc: Location,
    ) -> Node {
        let prelude = match parent {
            Some(index) => self.rewrite_selector(prelude, index),
            None => prelude,
        };

        let block = self.transform_style_block(block, parent);

        Node::new(NodeType::Rule { prelude, block }, loc)
    }

    fn transform_style_block(&mut self, block: Node, parent: Option<usize>) -> Node {
        let loc = block.location.clone();
        match *block.node_type {
            NodeType::Block {
                delim,
                kind,
                children,
            } => {
                let mut out = Vec::new();
                for child in children {
                    let child_loc = child.location.clone();
                    match *child.node_type {
                        NodeType::Declaration {
                            property,
                            value,
                            important,
                        } => out.extend(
                            self.transform_declaration(property, value, important, child_loc),
                        ),
                        other => {
                            out.push(self.transform_rule(Node::new(other, child_loc), parent))
                        }
                    }
                }

                Node::new(
                    NodeType::Block {
                        delim,
                        kind,
                        children: out,
                    },
                    loc,
                )
            }
            other => Node::new(other, loc),
        }
    }

    /// Rewrites the selector list of a rule guarded by a container query so
    /// the native engine only applies it to elements carrying the uid.
    fn rewrite_selector(&mut self, prelude: Vec<Node>, index: usize) -> Vec<Node> {
        let uid = self.descriptors[index].uid.clone();
        let attribute = format!("[{}~=\"{}\"]", SELF_ATTRIBUTE, uid);

        let location = prelude
            .first()
            .map(|n| n.location.clone())
            .unwrap_or_default();

        let mut style_selectors = Vec::new();

        for component in selector::split_selector_list(&prelude) {
            let (prefix, suffix) = selector::partition_pseudo(&component);
            let element = selector::element_selector(&prefix);
            let suffix = serialize_nodes(&suffix).trim().to_string();

            let style = if self.config.supports_where {
                format!("{element}:where({attribute}){suffix}")
            } else if element.contains(FALLBACK_SENTINEL) {
                format!("{}{}", element.replacen(FALLBACK_SENTINEL, &attribute, 1), suffix)
            } else {
                let original = serialize_nodes(&component).trim().to_string();
                log::warn!(
                    "selector '{original}' cannot be scoped without :where(), add a \
                     '{FALLBACK_SENTINEL}' guard"
                );
                self.diagnostics.push(Error::UnguardedSelector(original.clone()));
                original
            };

            self.elements[index].push(element);
            style_selectors.push(style);
        }

        vec![Node::new(
            NodeType::Raw {
                value: style_selectors.join(", "),
            },
            location,
        )]
    }

    /// Declarations: the `container` family becomes salted custom
    /// properties, every other declaration gets its container-relative units
    /// rewritten.
    fn transform_declaration(
        &mut self,
        property: String,
        value: Vec<Node>,
        important: bool,
        loc: Location,
    ) -> Vec<Node> {
        match property.to_ascii_lowercase().as_str() {
            "container" => match parse_container_shorthand(&value) {
                Ok((names, types)) => vec![
                    self.custom_property_declaration(
                        "container-name",
                        with_default(names, "none"),
                        important,
                        loc.clone(),
                    ),
                    self.custom_property_declaration(
                        "container-type",
                        with_default(types, "normal"),
                        important,
                        loc,
                    ),
                ],
                Err(e) => {
                    log::warn!("leaving container declaration unchanged: {e}");
                    vec![Node::new(
                        NodeType::Declaration {
                            property,
                            value,
                            important,
                        },
                        loc,
                    )]
                }
            },
            "container-name" => match parse_container_name_property(&value, true) {
                Ok(names) => vec![self.custom_property_declaration(
                    "container-name",
                    names,
                    important,
                    loc,
                )],
                Err(e) => {
                    log::warn!("leaving container-name declaration unchanged: {e}");
                    vec![Node::new(
                        NodeType::Declaration {
                            property,
                            value,
                            important,
                        },
                        loc,
                    )]
                }
            },
            "container-type" => match parse_container_type_property(&value, true) {
                Ok(types) => vec![self.custom_property_declaration(
                    "container-type",
                    types,
                    important,
                    loc,
                )],
                Err(e) => {
                    log::warn!("leaving container-type declaration unchanged: {e}");
                    vec![Node::new(
                        NodeType::Declaration {
                            property,
                            value,
                            important,
                        },
                        loc,
                    )]
                }
            },
            _ => vec![Node::new(
                NodeType::Declaration {
                    property,
                    value: self.transform_value_units(value),
                    important,
                },
                loc,
            )],
        }
    }

    fn custom_property_declaration(
        &self,
        longhand: &str,
        words: Vec<String>,
        important: bool,
        loc: Location,
    ) -> Node {
        let property = format!("--cq-{}-{}", longhand, self.config.salt);

        let mut value = Vec::new();
        for (i, word) in words.iter().enumerate() {
            if i > 0 {
                value.push(Node::new(NodeType::Whitespace, loc.clone()));
            }
            value.push(Node::new(
                NodeType::Ident {
                    value: word.clone(),
                },
                loc.clone(),
            ));
        }

        Node::new(
            NodeType::Declaration {
                property,
                value,
                important,
            },
            loc,
        )
    }

    /// Container-relative lengths have no native meaning, so they become
    /// calc() products over the salted unit custom properties.
    fn transform_value_units(&self, value: Vec<Node>) -> Vec<Node> {
        value
            .into_iter()
            .map(|node| self.transform_value_node(node))
            .collect()
    }

    fn transform_value_node(&self, node: Node) -> Node {
        let loc = node.location.clone();
        match *node.node_type {
            NodeType::Dimension {
                value,
                flag,
                unit,
                raw,
            } => match unit.to_ascii_lowercase().as_str() {
                "cqw" => self.unit_calc(value, flag, raw, self.unit_var("w", &loc), loc.clone()),
                "cqh" => self.unit_calc(value, flag, raw, self.unit_var("h", &loc), loc.clone()),
                "cqi" => self.unit_calc(value, flag, raw, self.unit_var("i", &loc), loc.clone()),
                "cqb" => self.unit_calc(value, flag, raw, self.unit_var("b", &loc), loc.clone()),
                "cqmin" => {
                    let min = self.min_max_of_logical_units("min", &loc);
                    self.unit_calc(value, flag, raw, min, loc.clone())
                }
                "cqmax" => {
                    let max = self.min_max_of_logical_units("max", &loc);
                    self.unit_calc(value, flag, raw, max, loc.clone())
                }
                _ => Node::new(
                    NodeType::Dimension {
                        value,
                        flag,
                        unit,
                        raw,
                    },
                    loc,
                ),
            },
            NodeType::Function { name, arguments } => Node::new(
                NodeType::Function {
                    name,
                    arguments: self.transform_value_units(arguments),
                },
                loc,
            ),
            NodeType::Block {
                delim,
                kind,
                children,
            } => Node::new(
                NodeType::Block {
                    delim,
                    kind,
                    children: self.transform_value_units(children),
                },
                loc,
            ),
            other => Node::new(other, loc),
        }
    }

    /// `calc(<number> * <scale>)`
    fn unit_calc(
        &self,
        value: Number,
        flag: NumericFlag,
        raw: String,
        scale: Node,
        loc: Location,
    ) -> Node {
        Node::new(
            NodeType::Function {
                name: "calc".to_string(),
                arguments: vec![
                    Node::new(NodeType::Number { value, flag, raw }, loc.clone()),
                    Node::new(NodeType::Whitespace, loc.clone()),
                    Node::new(NodeType::Delim { value: '*' }, loc.clone()),
                    Node::new(NodeType::Whitespace, loc.clone()),
                    scale,
                ],
            },
            loc,
        )
    }

    /// `var(--cq-<axis>-<salt>)`
    fn unit_var(&self, axis: &str, loc: &Location) -> Node {
        Node::new(
            NodeType::Function {
                name: "var".to_string(),
                arguments: vec![Node::new(
                    NodeType::Ident {
                        value: format!("--cq-{}-{}", axis, self.config.salt),
                    },
                    loc.clone(),
                )],
            },
            loc.clone(),
        )
    }

    /// `min(var(--cq-i-<salt>), var(--cq-b-<salt>))` and the max twin
    fn min_max_of_logical_units(&self, which: &str, loc: &Location) -> Node {
        Node::new(
            NodeType::Function {
                name: which.to_string(),
                arguments: vec![
                    self.unit_var("i", loc),
                    Node::new(NodeType::Comma, loc.clone()),
                    Node::new(NodeType::Whitespace, loc.clone()),
                    self.unit_var("b", loc),
                ],
            },
            loc.clone(),
        )
    }

    /// Declaration-shaped groups inside a supports condition go through the
    /// declaration rewriter, so feature tests against the container
    /// properties keep testing the polyfill's internal properties.
    fn transform_supports_condition(&mut self, prelude: Vec<Node>) -> Vec<Node> {
        prelude
            .into_iter()
            .map(|node| self.transform_supports_node(node))
            .collect()
    }

    fn transform_supports_node(&mut self, node: Node) -> Node {
        let loc = node.location.clone();

        match *node.node_type {
            NodeType::Block {
                delim: BlockDelim::Paren,
                kind,
                children,
            } => {
                if let Some((property, value)) = declaration_shape(&children) {
                    let declarations =
                        self.transform_declaration(property, value, false, loc.clone());

                    let children = if declarations.len() == 1 {
                        declarations
                    } else {
                        // the shorthand splits in two, tested as a conjunction
                        let mut nodes = Vec::new();
                        for (i, declaration) in declarations.into_iter().enumerate() {
                            if i > 0 {
                                nodes.push(Node::new(NodeType::Whitespace, loc.clone()));
                                nodes.push(Node::new(
                                    NodeType::Ident {
                                        value: "and".to_string(),
                                    },
                                    loc.clone(),
                                ));
                                nodes.push(Node::new(NodeType::Whitespace, loc.clone()));
                            }
                            nodes.push(Node::new(
                                NodeType::Block {
                                    delim: BlockDelim::Paren,
                                    kind: BlockKind::Simple,
                                    children: vec![declaration],
                                },
                                loc.clone(),
                            ));
                        }
                        nodes
                    };

                    return Node::new(
                        NodeType::Block {
                            delim: BlockDelim::Paren,
                            kind,
                            children,
                        },
                        loc,
                    );
                }

                // not a declaration: recurse, the block may group nested
                // conditions
                Node::new(
                    NodeType::Block {
                        delim: BlockDelim::Paren,
                        kind,
                        children: self.transform_supports_condition(children),
                    },
                    loc,
                )
            }
            other => Node::new(other, loc),
        }
    }

    /// Keyframe declaration blocks only need their container units rewritten
    fn transform_keyframes_block(&mut self, block: Node) -> Node {
        let loc = block.location.clone();
        match *block.node_type {
            NodeType::Block {
                delim,
                kind,
                children,
            } => {
                let children = children
                    .into_iter()
                    .map(|child| {
                        let child_loc = child.location.clone();
                        match *child.node_type {
                            NodeType::Rule { prelude, block } => Node::new(
                                NodeType::Rule {
                                    prelude,
                                    block: self.transform_keyframe_declarations(block),
                                },
                                child_loc,
                            ),
                            other => Node::new(other, child_loc),
                        }
                    })
                    .collect();

                Node::new(
                    NodeType::Block {
                        delim,
                        kind,
                        children,
                    },
                    loc,
                )
            }
            other => Node::new(other, loc),
        }
    }

    fn transform_keyframe_declarations(&mut self, block: Node) -> Node {
        let loc = block.location.clone();
        match *block.node_type {
            NodeType::Block {
                delim,
                kind,
                children,
            } => {
                let children = children
                    .into_iter()
                    .map(|child| {
                        let child_loc = child.location.clone();
                        match *child.node_type {
                            NodeType::Declaration {
                                property,
                                value,
                                important,
                            } => Node::new(
                                NodeType::Declaration {
                                    property,
                                    value: self.transform_value_units(value),
                                    important,
                                },
                                child_loc,
                            ),
                            other => Node::new(other, child_loc),
                        }
                    })
                    .collect();

                Node::new(
                    NodeType::Block {
                        delim,
                        kind,
                        children,
                    },
                    loc,
                )
            }
            other => Node::new(other, loc),
        }
    }

    /// Resolves every url() reference against the configured base URL.
    /// References that do not join cleanly are left as written.
    fn rewrite_urls(&self, node: Node) -> Node {
        let loc = node.location.clone();
        match *node.node_type {
            NodeType::Url { url } => Node::new(
                NodeType::Url {
                    url: self.resolve_url(url),
                },
                loc,
            ),
            NodeType::Function { name, arguments } if name.eq_ignore_ascii_case("url") => {
                let arguments = arguments
                    .into_iter()
                    .map(|argument| {
                        let arg_loc = argument.location.clone();
                        match *argument.node_type {
                            NodeType::String { value } => Node::new(
                                NodeType::String {
                                    value: self.resolve_url(value),
                                },
                                arg_loc,
                            ),
                            other => Node::new(other, arg_loc),
                        }
                    })
                    .collect();

                Node::new(NodeType::Function { name, arguments }, loc)
            }
            NodeType::StyleSheet { children } => Node::new(
                NodeType::StyleSheet {
                    children: children.into_iter().map(|c| self.rewrite_urls(c)).collect(),
                },
                loc,
            ),
            NodeType::AtRule {
                name,
                prelude,
                block,
            } => Node::new(
                NodeType::AtRule {
                    name,
                    prelude: prelude.into_iter().map(|c| self.rewrite_urls(c)).collect(),
                    block: block.map(|b| self.rewrite_urls(b)),
                },
                loc,
            ),
            NodeType::Rule { prelude, block } => Node::new(
                NodeType::Rule {
                    prelude,
                    block: self.rewrite_urls(block),
                },
                loc,
            ),
            NodeType::Declaration {
                property,
                value,
                important,
            } => Node::new(
                NodeType::Declaration {
                    property,
                    value: value.into_iter().map(|c| self.rewrite_urls(c)).collect(),
                    important,
                },
                loc,
            ),
            NodeType::Block {
                delim,
                kind,
                children,
            } => Node::new(
                NodeType::Block {
                    delim,
                    kind,
                    children: children.into_iter().map(|c| self.rewrite_urls(c)).collect(),
                },
                loc,
            ),
            NodeType::Function { name, arguments } => Node::new(
                NodeType::Function {
                    name,
                    arguments: arguments.into_iter().map(|c| self.rewrite_urls(c)).collect(),
                },
                loc,
            ),
            other => Node::new(other, loc),
        }
    }

    fn resolve_url(&self, url: String) -> String {
        match &self.base_url {
            Some(base) => base
                .join(&url)
                .map(|joined| joined.to_string())
                .unwrap_or(url),
            None => url,
        }
    }
}

/// The shorthand always sets both longhands; a side left empty gets the
/// sentinel for its initial keyword
fn with_default(words: Vec<String>, default: &str) -> Vec<String> {
    if words.is_empty() {
        vec![format!("{INTERNAL_KEYWORD_PREFIX}{default}")]
    } else {
        words
    }
}

/// `@keyframes` and its vendor-prefixed spellings
fn is_keyframes_name(lower: &str) -> bool {
    let name = lower.strip_prefix('-').map_or(lower, |rest| {
        rest.split_once('-').map_or(rest, |(_, name)| name)
    });
    name == "keyframes"
}

/// Matches the `ident : value` shape inside a supports-condition block
fn declaration_shape(children: &[Node]) -> Option<(String, Vec<Node>)> {
    let mut significant = children
        .iter()
        .enumerate()
        .filter(|(_, node)| !node.is_whitespace());

    let (_, first) = significant.next()?;
    let (colon_index, second) = significant.next()?;

    let NodeType::Ident { value: property } = &*first.node_type else {
        return None;
    };
    if !second.is_colon() {
        return None;
    }

    let mut value: Vec<Node> = children[colon_index + 1..].to_vec();
    while value.first().map_or(false, |n| n.is_whitespace()) {
        value.remove(0);
    }
    while value.last().map_or(false, |n| n.is_whitespace()) {
        value.pop();
    }
    if value.is_empty() {
        return None;
    }

    Some((property.clone(), value))
}
