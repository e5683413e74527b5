use crate::node::{BlockDelim, Node, NodeType};
use crate::parser::block::BlockParseMode;
use crate::tokenizer::TokenType;
use crate::CssParser;
use cow_utils::CowUtils;
use cqfill_shared::errors::{CssError, CssResult};

/// Returns how the block of the named at-rule is parsed, or None when the
/// rule is unknown and its block is preserved verbatim.
fn block_mode(name: &str, is_declaration_context: bool) -> Option<BlockParseMode> {
    let name = name.cow_to_ascii_lowercase();
    let name = name.strip_prefix('-').map_or(name.as_ref(), |rest| {
        // vendor prefixed rules behave like the unprefixed form
        rest.split_once('-').map_or(rest, |(_, name)| name)
    });

    match name {
        "container" | "media" | "supports" | "layer" | "scope" => {
            if is_declaration_context {
                Some(BlockParseMode::Style)
            } else {
                Some(BlockParseMode::RuleList)
            }
        }
        "keyframes" => Some(BlockParseMode::RuleList),
        "font-face" | "page" => Some(BlockParseMode::DeclarationList),
        _ => None,
    }
}

impl CssParser<'_> {
    // Either the at_rule parsing succeeds as a whole, or not. When no valid
    // at_rule is found, we return None if the config.ignore_errors is set to
    // true, otherwise this will return an Err and is handled by the caller
    pub fn parse_at_rule(&mut self, is_declaration_context: bool) -> CssResult<Option<Node>> {
        log::trace!("parse_at_rule");

        let result = self.parse_at_rule_internal(is_declaration_context);
        if result.is_err() && self.config.ignore_errors {
            log::warn!("Ignoring error in parse_at_rule: {:?}", result);
            self.parse_until_rule_end();
            return Ok(None);
        }

        result.map(Some)
    }

    fn parse_at_rule_internal(&mut self, is_declaration_context: bool) -> CssResult<Node> {
        let t = self.consume_any()?;
        let loc = t.location.clone();

        let name = match t.token_type {
            TokenType::AtKeyword(keyword) => keyword,
            _ => {
                return Err(CssError::with_location(
                    "Expected at keyword",
                    self.tokenizer.current_location(),
                ))
            }
        };

        self.consume_whitespace();

        let mut prelude = Vec::new();
        while !self.tokenizer.eof() {
            let t = self.consume_any()?;
            match t.token_type {
                TokenType::LCurly | TokenType::Semicolon | TokenType::Eof => {
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

        let t = self.consume_any()?;
        let block = match t.token_type {
            TokenType::Semicolon | TokenType::Eof => None,
            TokenType::LCurly => match block_mode(name.as_str(), is_declaration_context) {
                Some(mode) => {
                    let block = self.parse_block(mode)?;

                    let t = self.consume_any()?;
                    if !matches!(t.token_type, TokenType::RCurly | TokenType::Eof) {
                        return Err(CssError::with_location(
                            format!("Expected }}, got {:?}", t).as_str(),
                            self.tokenizer.current_location(),
                        ));
                    }

                    Some(block)
                }
                None => Some(self.parse_simple_block(BlockDelim::Brace)?),
            },
            _ => {
                return Err(CssError::with_location(
                    "Expected semicolon or left curly brace",
                    self.tokenizer.current_location(),
                ))
            }
        };

        Ok(Node::new(
            NodeType::AtRule {
                name,
                prelude,
                block,
            },
            loc,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::walker::Walker;
    use cqfill_shared::byte_stream::{ByteStream, Location};

    macro_rules! test {
        ($func:ident ( $($args:expr),* ), $input:expr, $expected:expr) => {
            let mut stream = ByteStream::new(None);
            stream.read_from_str($input);
            stream.close();

            let mut parser = crate::CssParser::new(&mut stream, Location::default());
            let result = parser.$func($($args),*).unwrap().unwrap();

            let w = Walker::new(&result);
            assert_eq!(w.walk_to_string(), $expected);
        };
    }

    #[test]
    fn test_parse_at_rule_container() {
        test!(
            parse_at_rule(false),
            "@container card (min-width: 200px) { .a { color: red; } }",
            "[AtRule] name: container\n  [Ident] card\n  [Block]\n    [Ident] min-width\n    [Colon]\n    [Dimension] 200px\n  [Block] kind: RuleList\n    [Rule]\n      [Delim] .\n      [Ident] a\n      [Block] kind: Style\n        [Declaration] property: color important: false\n          [Ident] red\n"
        );
    }

    #[test]
    fn test_parse_at_rule_without_block() {
        test!(
            parse_at_rule(false),
            "@layer tokens;",
            "[AtRule] name: layer\n  [Ident] tokens\n"
        );
    }

    #[test]
    fn test_block_mode() {
        assert_eq!(block_mode("media", false), Some(BlockParseMode::RuleList));
        assert_eq!(block_mode("media", true), Some(BlockParseMode::Style));
        assert_eq!(
            block_mode("KEYFRAMES", false),
            Some(BlockParseMode::RuleList)
        );
        assert_eq!(
            block_mode("-webkit-keyframes", false),
            Some(BlockParseMode::RuleList)
        );
        assert_eq!(
            block_mode("font-face", false),
            Some(BlockParseMode::DeclarationList)
        );
        assert_eq!(block_mode("font-feature-values", false), None);
    }
}
