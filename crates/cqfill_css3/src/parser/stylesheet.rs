use crate::node::{Node, NodeType};
use crate::tokenizer::TokenType;
use crate::CssParser;
use cqfill_shared::errors::CssResult;

impl CssParser<'_> {
    pub fn parse_stylesheet(&mut self) -> CssResult<Node> {
        log::trace!("parse_stylesheet");

        let loc = self.tokenizer.current_location();

        let mut children = Vec::new();

        while !self.tokenizer.eof() {
            let t = self.consume_any()?;

            match t.token_type {
                TokenType::Eof => {}
                TokenType::Whitespace => {}
                // CDO and CDC are discarded at the top level
                TokenType::Cdo | TokenType::Cdc => {}
                TokenType::AtKeyword(_) => {
                    self.tokenizer.reconsume();

                    if let Some(at_rule_node) = self.parse_at_rule(false)? {
                        children.push(at_rule_node);
                    }
                }
                _ => {
                    self.tokenizer.reconsume();

                    if let Some(rule_node) = self.parse_rule()? {
                        children.push(rule_node);
                    }
                }
            }
        }

        Ok(Node::new(NodeType::StyleSheet { children }, loc))
    }
}
