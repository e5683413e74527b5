use crate::node::Node;
use crate::parser_config::{Context, ParserConfig};
use crate::tokenizer::Tokenizer;
use cqfill_shared::byte_stream::{ByteStream, Location};
use cqfill_shared::errors::{CssError, CssResult};

pub mod node;
pub mod parser;
pub mod parser_config;
pub mod serializer;
pub mod tokenizer;
mod unicode;
pub mod walker;

/// Recursive descent CSS parser over the token stream. The node tree it
/// produces keeps enough of the source (bracket pairs, raw numeric
/// spellings, whitespace inside preludes and values) to be serialized back
/// to equivalent CSS.
pub struct CssParser<'stream> {
    /// The tokenizer the parser consumes from
    pub tokenizer: Tokenizer<'stream>,
    /// The parser configuration as given
    config: ParserConfig,
}

impl<'stream> CssParser<'stream> {
    /// Parse a CSS string, which depends on the context.
    pub fn parse(data: &str, config: ParserConfig) -> CssResult<Node> {
        let mut stream = ByteStream::new(None);
        stream.read_from_str(data);
        stream.close();

        let mut parser = CssParser::new(&mut stream, config.location.clone());
        parser.parse_internal(config)
    }

    /// Create a new parser with the given bytestream
    fn new(stream: &'stream mut ByteStream, location: Location) -> Self {
        Self {
            tokenizer: Tokenizer::new(stream, location),
            config: Default::default(),
        }
    }

    /// Actual parser implementation
    fn parse_internal(&mut self, config: ParserConfig) -> CssResult<Node> {
        self.config = config;

        match self.config.context {
            Context::Stylesheet => self.parse_stylesheet(),
            Context::Rule => self
                .parse_rule()?
                .ok_or_else(|| CssError::new("no rule found")),
            Context::AtRule => self
                .parse_at_rule(false)?
                .ok_or_else(|| CssError::new("no at-rule found")),
            Context::Declaration => self
                .parse_declaration()?
                .ok_or_else(|| CssError::new("no declaration found")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::walker::Walker;

    #[test]
    fn parse_stylesheet() {
        let _ = simple_logger::SimpleLogger::new().init();

        let config = ParserConfig {
            ignore_errors: true,
            ..Default::default()
        };

        let css = "@media screen { .a { color: red; } }\n.b { margin: 0; }";
        let result = CssParser::parse(css, config).unwrap();

        let w = Walker::new(&result);
        assert_eq!(
            w.walk_to_string(),
            "[StyleSheet (2)]\n  \
               [AtRule] name: media\n    \
                 [Ident] screen\n    \
                 [Block] kind: RuleList\n      \
                   [Rule]\n        \
                     [Delim] .\n        \
                     [Ident] a\n        \
                     [Block] kind: Style\n          \
                       [Declaration] property: color important: false\n            \
                         [Ident] red\n  \
               [Rule]\n    \
                 [Delim] .\n    \
                 [Ident] b\n    \
                 [Block] kind: Style\n      \
                   [Declaration] property: margin important: false\n        \
                     [Number] 0\n"
        );
    }

    #[test]
    fn parse_empty_stylesheet() {
        let result = CssParser::parse("", ParserConfig::default()).unwrap();
        assert!(result.as_stylesheet().is_empty());
    }
}
