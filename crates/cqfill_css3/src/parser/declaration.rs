use crate::node::{Node, NodeType};
use crate::tokenizer::TokenType;
use crate::CssParser;
use cqfill_shared::errors::{CssError, CssResult};

impl CssParser<'_> {
    pub fn parse_declaration(&mut self) -> CssResult<Option<Node>> {
        log::trace!("parse_declaration");

        let result = self.parse_declaration_internal();
        if result.is_err() && self.config.ignore_errors {
            log::warn!("Ignoring error in parse_declaration: {:?}", result);
            self.parse_until_declaration_end();
            return Ok(None);
        }

        result.map(Some)
    }

    fn parse_declaration_internal(&mut self) -> CssResult<Node> {
        let loc = self.tokenizer.current_location();

        let property = self.consume_any_ident()?;

        self.consume_whitespace();
        self.consume(TokenType::Colon)?;

        let mut value = Vec::new();
        while !self.tokenizer.eof() {
            let t = self.consume_any()?;
            match t.token_type {
                TokenType::Semicolon | TokenType::RCurly => {
                    self.tokenizer.reconsume();
                    break;
                }
                TokenType::Eof => break,
                _ => {
                    self.tokenizer.reconsume();
                    value.push(self.parse_component_value()?);
                }
            }
        }

        while value.first().map_or(false, Node::is_whitespace) {
            value.remove(0);
        }

        let important = strip_important(&mut value);

        while value.last().map_or(false, Node::is_whitespace) {
            value.pop();
        }

        if value.is_empty() {
            return Err(CssError::with_location(
                "Expected value in declaration",
                self.tokenizer.current_location(),
            ));
        }

        Ok(Node::new(
            NodeType::Declaration {
                property,
                value,
                important,
            },
            loc,
        ))
    }

    fn parse_until_declaration_end(&mut self) {
        log::trace!(
            "parse_until_declaration_end, now at: {:?}",
            self.tokenizer.current_location()
        );
        loop {
            let t = self.consume_any();
            if t.is_err() {
                break;
            }
            match t.unwrap().token_type {
                TokenType::Semicolon | TokenType::RCurly => {
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
}

/// An `!important` suffix is the final two significant children of the value:
/// a `!` delimiter followed by the `important` keyword. When matched, both
/// are removed from the value.
fn strip_important(value: &mut Vec<Node>) -> bool {
    let significant: Vec<usize> = value
        .iter()
        .enumerate()
        .filter(|(_, n)| !n.is_whitespace())
        .map(|(i, _)| i)
        .collect();

    if significant.len() < 2 {
        return false;
    }

    let bang = significant[significant.len() - 2];
    let keyword = significant[significant.len() - 1];

    let matched = value[bang].is_delim('!')
        && matches!(
            &*value[keyword].node_type,
            NodeType::Ident { value } if value.eq_ignore_ascii_case("important")
        );

    if matched {
        value.truncate(bang);
    }

    matched
}
