use crate::node::{BlockDelim, BlockKind, Node, NodeType};
use crate::tokenizer::TokenType;
use crate::CssParser;
use cqfill_shared::errors::{CssError, CssResult};

/// How the contents of a `{}` block are interpreted, which depends on the
/// rule the block belongs to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BlockParseMode {
    Style,
    DeclarationList,
    RuleList,
}

impl BlockParseMode {
    fn kind(self) -> BlockKind {
        match self {
            BlockParseMode::Style => BlockKind::Style,
            BlockParseMode::DeclarationList => BlockKind::DeclarationList,
            BlockParseMode::RuleList => BlockKind::RuleList,
        }
    }
}

impl CssParser<'_> {
    /// Reads until the end of a declaration or rule (or end of the block), in
    /// case there is a syntax error
    pub(crate) fn parse_until_rule_end(&mut self) {
        loop {
            let t = self.consume_any();
            if t.is_err() {
                break;
            }
            match t.unwrap().token_type {
                TokenType::Semicolon => {
                    break;
                }
                TokenType::RCurly => {
                    self.tokenizer.reconsume();
                    break;
                }
                TokenType::Eof => {
                    break;
                }
                _ => {
                    // ignore
                }
            }
        }
    }

    /// Parses the contents of a `{}` block whose opening brace has already
    /// been consumed. Stops before the closing brace, which the caller eats.
    pub fn parse_block(&mut self, mode: BlockParseMode) -> CssResult<Node> {
        log::trace!("parse_block with parse mode: {:?}", mode);

        let loc = self.tokenizer.current_location();
        let mut children: Vec<Node> = Vec::new();

        while !self.tokenizer.eof() {
            let t = self.consume_any()?;
            match t.token_type {
                TokenType::RCurly => {
                    // end of the block
                    self.tokenizer.reconsume();
                    break;
                }
                TokenType::Whitespace | TokenType::Semicolon => {
                    // just eat the token
                }
                TokenType::Eof => {}
                TokenType::AtKeyword(_) => {
                    self.tokenizer.reconsume();
                    if let Some(at_rule_node) =
                        self.parse_at_rule(mode == BlockParseMode::Style)?
                    {
                        children.push(at_rule_node);
                    }
                }
                _ => match mode {
                    BlockParseMode::RuleList => {
                        self.tokenizer.reconsume();

                        if let Some(rule_node) = self.parse_rule()? {
                            children.push(rule_node);
                        }
                    }
                    BlockParseMode::Style | BlockParseMode::DeclarationList => {
                        self.tokenizer.reconsume();

                        if t.is_ident() {
                            if let Some(declaration_node) = self.parse_declaration()? {
                                children.push(declaration_node);
                            }
                        } else if mode == BlockParseMode::Style {
                            // something that is not a declaration can only be
                            // a nested rule here
                            if let Some(rule_node) = self.parse_rule()? {
                                children.push(rule_node);
                            }
                        } else if self.config.ignore_errors {
                            log::warn!("Ignoring unexpected token in declaration list: {:?}", t);
                            self.parse_until_rule_end();
                        } else {
                            return Err(CssError::with_location(
                                format!("Expected declaration, got {:?}", t).as_str(),
                                self.tokenizer.current_location(),
                            ));
                        }
                    }
                },
            }
        }

        Ok(Node::new(
            NodeType::Block {
                delim: BlockDelim::Brace,
                kind: mode.kind(),
                children,
            },
            loc,
        ))
    }

    /// Parses a simple block whose opening token has already been consumed.
    /// The contents are preserved verbatim as component values; the matching
    /// closing token is consumed as well.
    pub fn parse_simple_block(&mut self, delim: BlockDelim) -> CssResult<Node> {
        log::trace!("parse_simple_block {:?}", delim);

        let loc = self.tokenizer.current_location();
        let mut children: Vec<Node> = Vec::new();

        let close = match delim {
            BlockDelim::Brace => TokenType::RCurly,
            BlockDelim::Paren => TokenType::RParen,
            BlockDelim::Bracket => TokenType::RBracket,
        };

        loop {
            let t = self.consume_any()?;
            if t.token_type == close {
                break;
            }
            match t.token_type {
                TokenType::Eof => break,
                _ => {
                    self.tokenizer.reconsume();
                    children.push(self.parse_component_value()?);
                }
            }
        }

        Ok(Node::new(
            NodeType::Block {
                delim,
                kind: BlockKind::Simple,
                children,
            },
            loc,
        ))
    }
}
