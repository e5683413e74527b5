use crate::tokenizer::{Token, TokenType};
use crate::CssParser;
use cqfill_shared::errors::{CssError, CssResult};

mod at_rule;
mod block;
mod declaration;
mod rule;
mod stylesheet;
mod value;

impl CssParser<'_> {
    /// Consumes a specific token
    pub fn consume(&mut self, token_type: TokenType) -> CssResult<Token> {
        let t = self.tokenizer.consume();
        if t.token_type != token_type {
            return Err(CssError::with_location(
                format!("Expected {:?}, got {:?}", token_type, t).as_str(),
                self.tokenizer.current_location(),
            ));
        }

        Ok(t)
    }

    /// Consumes any token
    pub fn consume_any(&mut self) -> CssResult<Token> {
        Ok(self.tokenizer.consume())
    }

    pub fn consume_any_ident(&mut self) -> CssResult<String> {
        let t = self.tokenizer.consume();
        match t.token_type {
            TokenType::Ident(s) => Ok(s),
            _ => Err(CssError::with_location(
                format!("Expected ident, got {:?}", t).as_str(),
                self.tokenizer.current_location(),
            )),
        }
    }

    /// Eats all whitespace tokens until the next significant token
    pub fn consume_whitespace(&mut self) {
        loop {
            let t = self.tokenizer.consume();
            if !t.is_whitespace() {
                self.tokenizer.reconsume();
                break;
            }
        }
    }
}
