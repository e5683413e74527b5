use crate::tokenizer::{Number, NumericFlag};
use core::fmt::{Display, Formatter};
use cqfill_shared::byte_stream::Location;

/// Opening delimiter of a block, so the serializer can re-emit the matching
/// bracket pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockDelim {
    Brace,
    Paren,
    Bracket,
}

impl BlockDelim {
    pub fn open(&self) -> char {
        match self {
            BlockDelim::Brace => '{',
            BlockDelim::Paren => '(',
            BlockDelim::Bracket => '[',
        }
    }

    pub fn close(&self) -> char {
        match self {
            BlockDelim::Brace => '}',
            BlockDelim::Paren => ')',
            BlockDelim::Bracket => ']',
        }
    }
}

/// Inner form of a block. Declarations only take a trailing semicolon inside
/// style blocks and declaration lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    /// Preserved component values, brackets included
    Simple,
    /// Declarations mixed with nested rules and at-rules
    Style,
    /// Declarations and at-rules only
    DeclarationList,
    /// Rules and at-rules only
    RuleList,
}

#[derive(Debug, PartialEq, Clone)]
pub enum NodeType {
    StyleSheet {
        children: Vec<Node>,
    },
    AtRule {
        name: String,
        prelude: Vec<Node>,
        block: Option<Node>,
    },
    /// A qualified rule. The prelude holds the selector as raw component
    /// values, whitespace included.
    Rule {
        prelude: Vec<Node>,
        block: Node,
    },
    Declaration {
        property: String,
        value: Vec<Node>,
        important: bool,
    },
    Block {
        delim: BlockDelim,
        kind: BlockKind,
        children: Vec<Node>,
    },
    Function {
        name: String,
        arguments: Vec<Node>,
    },
    Ident {
        value: String,
    },
    Number {
        value: Number,
        flag: NumericFlag,
        raw: String,
    },
    Percentage {
        value: Number,
        raw: String,
    },
    Dimension {
        value: Number,
        flag: NumericFlag,
        unit: String,
        raw: String,
    },
    String {
        value: String,
    },
    Url {
        url: String,
    },
    Hash {
        value: String,
        id: bool,
    },
    Delim {
        value: char,
    },
    Whitespace,
    Comma,
    Colon,
    Semicolon,
    Cdo,
    Cdc,
    /// Verbatim CSS text, emitted unchanged by the serializer. Produced by
    /// the transformer for rewritten selectors, never by the parser.
    Raw {
        value: String,
    },
}

/// A node is a single element in the AST
#[derive(Debug, PartialEq, Clone)]
pub struct Node {
    pub node_type: Box<NodeType>,
    pub location: Location,
}

impl Node {
    pub fn new(node_type: NodeType, location: Location) -> Self {
        Self {
            node_type: Box::new(node_type),
            location,
        }
    }

    #[must_use]
    pub fn is_stylesheet(&self) -> bool {
        matches!(&*self.node_type, NodeType::StyleSheet { .. })
    }

    #[must_use]
    pub fn as_stylesheet(&self) -> &Vec<Node> {
        match &&*self.node_type {
            &NodeType::StyleSheet { children } => children,
            _ => panic!("Node is not a stylesheet"),
        }
    }

    #[must_use]
    pub fn is_whitespace(&self) -> bool {
        matches!(&*self.node_type, NodeType::Whitespace)
    }

    #[must_use]
    pub fn is_comma(&self) -> bool {
        matches!(&*self.node_type, NodeType::Comma)
    }

    #[must_use]
    pub fn is_colon(&self) -> bool {
        matches!(&*self.node_type, NodeType::Colon)
    }

    #[must_use]
    pub fn is_ident(&self) -> bool {
        matches!(&*self.node_type, NodeType::Ident { .. })
    }

    #[must_use]
    pub fn as_ident(&self) -> &String {
        match &&*self.node_type {
            &NodeType::Ident { value } => value,
            _ => panic!("Node is not an ident"),
        }
    }

    #[must_use]
    pub fn is_delim(&self, delim: char) -> bool {
        matches!(&*self.node_type, NodeType::Delim { value } if *value == delim)
    }

    #[must_use]
    pub fn is_block(&self) -> bool {
        matches!(&*self.node_type, NodeType::Block { .. })
    }

    #[must_use]
    pub fn is_paren_block(&self) -> bool {
        matches!(
            &*self.node_type,
            NodeType::Block {
                delim: BlockDelim::Paren,
                ..
            }
        )
    }

    #[must_use]
    pub fn as_block(&self) -> &Vec<Node> {
        match &&*self.node_type {
            &NodeType::Block { children, .. } => children,
            _ => panic!("Node is not a block"),
        }
    }

    #[must_use]
    pub fn is_declaration(&self) -> bool {
        matches!(&*self.node_type, NodeType::Declaration { .. })
    }

    #[must_use]
    pub fn as_declaration(&self) -> (&String, &Vec<Node>, &bool) {
        match &&*self.node_type {
            &NodeType::Declaration {
                property,
                value,
                important,
            } => (property, value, important),
            _ => panic!("Node is not a declaration"),
        }
    }

    #[must_use]
    pub fn is_dimension(&self) -> bool {
        matches!(&*self.node_type, NodeType::Dimension { .. })
    }

    #[must_use]
    pub fn is_number(&self) -> bool {
        matches!(&*self.node_type, NodeType::Number { .. })
    }

    #[must_use]
    pub fn as_number(&self) -> Number {
        match &*self.node_type {
            NodeType::Number { value, .. } => *value,
            _ => panic!("Node is not a number"),
        }
    }

    #[must_use]
    pub fn is_function(&self) -> bool {
        matches!(&*self.node_type, NodeType::Function { .. })
    }
}

impl Display for Node {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", crate::serializer::serialize(self))
    }
}
