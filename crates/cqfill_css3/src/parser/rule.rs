use crate::node::{Node, NodeType};
use crate::parser::block::BlockParseMode;
use crate::tokenizer::TokenType;
use crate::CssParser;
use cqfill_shared::errors::{CssError, CssResult};

impl CssParser<'_> {
    // Either the rule parsing succeeds as a whole, or not. When no valid rule
    // is found, we return None if the config.ignore_errors is set to true,
    // otherwise this will return an Err and is handled by the caller
    pub fn parse_rule(&mut self) -> CssResult<Option<Node>> {
        log::trace!("parse_rule");

        let result = self.parse_rule_internal();
        if result.is_err() && self.config.ignore_errors {
            log::warn!("Ignoring error in parse_rule: {:?}", result);
            self.parse_until_rule_end();
            return Ok(None);
        }

        result.map(Some)
    }

    fn parse_rule_internal(&mut self) -> CssResult<Node> {
        let loc = self.tokenizer.current_location();

        self.consume_whitespace();

        let mut prelude = Vec::new();
        while !self.tokenizer.eof() {
            let t = self.consume_any()?;
            match t.token_type {
                TokenType::LCurly | TokenType::Eof => {
                    self.tokenizer.reconsume();
                    break;
                }
                _ => {
                    self.tokenizer.reconsume();
                    prelude.push(self.parse_component_value()?);
                }
            }
        }

        while prelude.last().map_or(false, Node::is_whitespace) {
            prelude.pop();
        }

        if prelude.is_empty() {
            return Err(CssError::with_location(
                "Expected selector in rule",
                self.tokenizer.current_location(),
            ));
        }

        self.consume(TokenType::LCurly)?;

        let block = self.parse_block(BlockParseMode::Style)?;

        let t = self.consume_any()?;
        if !matches!(t.token_type, TokenType::RCurly | TokenType::Eof) {
            return Err(CssError::with_location(
                format!("Expected }}, got {:?}", t).as_str(),
                self.tokenizer.current_location(),
            ));
        }

        Ok(Node::new(NodeType::Rule { prelude, block }, loc))
    }
}
