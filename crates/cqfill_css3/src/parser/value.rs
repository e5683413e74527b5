use crate::node::{BlockDelim, Node, NodeType};
use crate::tokenizer::TokenType;
use crate::CssParser;
use cqfill_shared::byte_stream::Location;
use cqfill_shared::errors::{CssError, CssResult};

impl CssParser<'_> {
    /// Parses one component value: a preserved token, a simple block, or a
    /// function.
    pub fn parse_component_value(&mut self) -> CssResult<Node> {
        let t = self.consume_any()?;
        let loc = t.location.clone();

        match t.token_type {
            TokenType::LCurly => self.parse_simple_block(BlockDelim::Brace),
            TokenType::LParen => self.parse_simple_block(BlockDelim::Paren),
            TokenType::LBracket => self.parse_simple_block(BlockDelim::Bracket),
            TokenType::Function(name) => self.parse_function(name, loc),
            TokenType::Whitespace => Ok(Node::new(NodeType::Whitespace, loc)),
            TokenType::Ident(value) => Ok(Node::new(NodeType::Ident { value }, loc)),
            TokenType::Number { value, flag, raw } => {
                Ok(Node::new(NodeType::Number { value, flag, raw }, loc))
            }
            TokenType::Percentage { value, raw } => {
                Ok(Node::new(NodeType::Percentage { value, raw }, loc))
            }
            TokenType::Dimension {
                value,
                flag,
                unit,
                raw,
            } => Ok(Node::new(
                NodeType::Dimension {
                    value,
                    flag,
                    unit,
                    raw,
                },
                loc,
            )),
            TokenType::QuotedString(value) => Ok(Node::new(NodeType::String { value }, loc)),
            TokenType::Url(url) => Ok(Node::new(NodeType::Url { url }, loc)),
            TokenType::Hash { value, id } => Ok(Node::new(NodeType::Hash { value, id }, loc)),
            TokenType::Delim(value) => Ok(Node::new(NodeType::Delim { value }, loc)),
            TokenType::Comma => Ok(Node::new(NodeType::Comma, loc)),
            TokenType::Colon => Ok(Node::new(NodeType::Colon, loc)),
            TokenType::Semicolon => Ok(Node::new(NodeType::Semicolon, loc)),
            TokenType::Cdo => Ok(Node::new(NodeType::Cdo, loc)),
            TokenType::Cdc => Ok(Node::new(NodeType::Cdc, loc)),
            TokenType::AtKeyword(value) => Ok(Node::new(
                NodeType::Raw {
                    value: format!("@{value}"),
                },
                loc,
            )),
            TokenType::BadString(_) | TokenType::BadUrl(_) => Err(CssError::with_location(
                format!("Bad token in component value: {:?}", t).as_str(),
                self.tokenizer.current_location(),
            )),
            TokenType::RCurly | TokenType::RParen | TokenType::RBracket => {
                Err(CssError::with_location(
                    format!("Unexpected {:?}", t).as_str(),
                    self.tokenizer.current_location(),
                ))
            }
            TokenType::Eof => Err(CssError::with_location(
                "Unexpected end of stream",
                self.tokenizer.current_location(),
            )),
        }
    }

    /// Parses a function whose name token has already been consumed. The
    /// arguments run until the matching closing parenthesis.
    fn parse_function(&mut self, name: String, loc: Location) -> CssResult<Node> {
        log::trace!("parse_function {}", name);

        let mut arguments = Vec::new();

        loop {
            let t = self.consume_any()?;
            match t.token_type {
                TokenType::RParen => break,
                TokenType::Eof => break,
                _ => {
                    self.tokenizer.reconsume();
                    arguments.push(self.parse_component_value()?);
                }
            }
        }

        Ok(Node::new(NodeType::Function { name, arguments }, loc))
    }
}
