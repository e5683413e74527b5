use crate::unicode::UnicodeChar;
use cqfill_shared::byte_stream::Character::Ch;
use cqfill_shared::byte_stream::{ByteStream, Character, Location};
use cqfill_shared::errors::CssError;
use std::fmt;

pub type Number = f32;

/// Type flag of a numeric token: "integer" when the spelling has neither a
/// fractional part nor an exponent, "number" otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericFlag {
    Integer,
    Number,
}

#[derive(Debug, PartialEq, Clone)]
pub enum TokenType {
    /// A [`<at-keyword-token>`](https://drafts.csswg.org/css-syntax/#at-keyword-token-diagram)
    ///
    /// The value does not include the `@` marker.
    AtKeyword(String),
    Ident(String),
    Function(String),
    Url(String),
    BadUrl(String),
    /// A `<dimension-token>`. The raw field holds the spelling of the numeric
    /// part so that serialization keeps the author's precision.
    Dimension {
        value: Number,
        flag: NumericFlag,
        unit: String,
        raw: String,
    },
    Percentage {
        value: Number,
        raw: String,
    },
    Number {
        value: Number,
        flag: NumericFlag,
        raw: String,
    },
    /// A [`<string-token>`](https://drafts.csswg.org/css-syntax/#string-token-diagram)
    ///
    /// The value does not include the quotes.
    QuotedString(String),
    /// A `<bad-string-token>`. This token always indicates a parse error.
    BadString(String),
    /// A run of whitespace, collapsed into a single token
    Whitespace,
    /// A [`<hash-token>`](https://drafts.csswg.org/css-syntax/#hash-token-diagram).
    ///
    /// The value does not include the `#` marker. The id flag is set when the
    /// hash is a valid ID selector.
    Hash {
        value: String,
        id: bool,
    },
    /// A `<delim-token>`
    Delim(char),
    /// A `<{-token>`
    LCurly,
    /// A `<}-token>`
    RCurly,
    /// A `<(-token>`
    LParen,
    /// A `<)-token>`
    RParen,
    /// A `<[-token>`
    LBracket,
    /// A `<]-token>`
    RBracket,
    Comma,
    Colon,
    Semicolon,
    /// A `<!--` `<CDO-token>`
    Cdo,
    /// A `-->` `<CDC-token>`
    Cdc,
    /// A `<EOF-token>`
    Eof,
}

#[derive(Clone, PartialEq, Debug)]
pub struct Token {
    /// Type of the token
    pub token_type: TokenType,
    /// Location of the token in the stream
    pub location: Location,
}

impl Token {
    /// Returns a new token for the given type on the given location
    fn new(token_type: TokenType, location: Location) -> Token {
        Token {
            token_type,
            location,
        }
    }

    fn new_delim(c: char, location: Location) -> Token {
        Token::new(TokenType::Delim(c), location)
    }

    fn new_hash(value: &str, id: bool, location: Location) -> Token {
        Token::new(
            TokenType::Hash {
                value: value.to_string(),
                id,
            },
            location,
        )
    }

    fn new_atkeyword(keyword: &str, location: Location) -> Token {
        Token::new(TokenType::AtKeyword(keyword.to_string()), location)
    }

    fn new_number(value: Number, flag: NumericFlag, raw: String, location: Location) -> Token {
        Token::new(TokenType::Number { value, flag, raw }, location)
    }

    fn new_percentage(value: Number, raw: String, location: Location) -> Token {
        Token::new(TokenType::Percentage { value, raw }, location)
    }

    fn new_dimension(
        value: Number,
        flag: NumericFlag,
        unit: &str,
        raw: String,
        location: Location,
    ) -> Token {
        Token::new(
            TokenType::Dimension {
                value,
                flag,
                unit: unit.to_string(),
                raw,
            },
            location,
        )
    }

    fn new_ident(value: &str, location: Location) -> Token {
        Token::new(TokenType::Ident(value.to_string()), location)
    }

    fn new_function(value: &str, location: Location) -> Token {
        Token::new(TokenType::Function(value.to_string()), location)
    }

    fn new_quoted_string(value: &str, location: Location) -> Token {
        Token::new(TokenType::QuotedString(value.to_string()), location)
    }

    fn new_bad_string(value: &str, location: Location) -> Token {
        Token::new(TokenType::BadString(value.to_string()), location)
    }

    fn new_url(value: &str, location: Location) -> Token {
        Token::new(TokenType::Url(value.to_string()), location)
    }

    fn new_bad_url(value: &str, location: Location) -> Token {
        Token::new(TokenType::BadUrl(value.to_string()), location)
    }
}

impl Token {
    pub fn is_ident(&self) -> bool {
        matches!(self.token_type, TokenType::Ident(_))
    }

    pub fn is_whitespace(&self) -> bool {
        matches!(self.token_type, TokenType::Whitespace)
    }

    pub fn is_eof(&self) -> bool {
        matches!(self.token_type, TokenType::Eof)
    }
}

/// Writes the token back as CSS text. Re-tokenizing the output yields the
/// same token again, which the serializer and the round-trip tests rely on.
impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.token_type {
            TokenType::AtKeyword(val) => write!(f, "@{val}"),
            TokenType::Ident(val) => write!(f, "{val}"),
            TokenType::Function(val) => write!(f, "{val}("),
            TokenType::Url(val) => write!(f, "url({val})"),
            TokenType::BadUrl(val) => write!(f, "url({val}"),
            TokenType::Dimension { unit, raw, .. } => write!(f, "{raw}{unit}"),
            TokenType::Percentage { raw, .. } => write!(f, "{raw}%"),
            TokenType::Number { raw, .. } => write!(f, "{raw}"),
            TokenType::QuotedString(val) => {
                write!(f, "\"{}\"", val.replace('\\', "\\\\").replace('"', "\\\""))
            }
            TokenType::BadString(val) => write!(f, "\"{val}"),
            TokenType::Whitespace => write!(f, " "),
            TokenType::Hash { value, .. } => write!(f, "#{value}"),
            TokenType::Delim(val) => write!(f, "{val}"),
            TokenType::LCurly => write!(f, "{{"),
            TokenType::RCurly => write!(f, "}}"),
            TokenType::LParen => write!(f, "("),
            TokenType::RParen => write!(f, ")"),
            TokenType::LBracket => write!(f, "["),
            TokenType::RBracket => write!(f, "]"),
            TokenType::Comma => write!(f, ","),
            TokenType::Colon => write!(f, ":"),
            TokenType::Semicolon => write!(f, ";"),
            TokenType::Cdo => write!(f, "<!--"),
            TokenType::Cdc => write!(f, "-->"),
            TokenType::Eof => Ok(()),
        }
    }
}

/// CSS Tokenizer according to the [w3 specification](https://www.w3.org/TR/css-syntax-3/#tokenization)
pub struct Tokenizer<'stream> {
    stream: &'stream mut ByteStream,
    /// Position of the NEXT token to consume out of the token buffer
    position: usize,
    /// All tokens produced so far
    tokens: Vec<Token>,
    /// Tokenization errors. These never stop the tokenizer; they are kept for
    /// diagnostics only.
    errors: Vec<CssError>,
    /// Start position of the stream (this does not have to be 1/1)
    start_location: Location,
    /// Current position within the stream, relative to start_location
    cur_location: Location,
}

impl<'stream> Tokenizer<'stream> {
    /// Creates a new tokenizer with the given stream that starts on the given
    /// location. This does not have to be 1/1, but can be any location.
    pub fn new(stream: &'stream mut ByteStream, location: Location) -> Self {
        Self {
            stream,
            position: 0,
            tokens: Vec::new(),
            errors: Vec::new(),
            start_location: location,
            cur_location: Location::new(1, 1, 0),
        }
    }

    /// Returns the current location and takes the start location into account
    pub fn current_location(&self) -> Location {
        if self.position < self.tokens.len() {
            return self.tokens[self.position].location.clone();
        }

        self.stream_location()
    }

    /// Location of the next character the stream will produce
    fn stream_location(&self) -> Location {
        Location::new(
            self.start_location.line() + self.cur_location.line() - 1,
            self.start_location.column() + self.cur_location.column() - 1,
            self.cur_location.offset(),
        )
    }

    /// Returns true when the next token to consume is the end of the stream
    pub fn eof(&mut self) -> bool {
        self.lookahead(0).is_eof()
    }

    /// Returns the errors collected during tokenization
    pub fn errors(&self) -> &[CssError] {
        &self.errors
    }

    /// Looks ahead at the next non-whitespace token with the given offset
    /// counted in non-whitespace tokens
    pub fn lookahead_sc(&mut self, offset: usize) -> Token {
        let mut skipped = 0;
        let mut i = 0;

        loop {
            let t = self.lookahead(i);
            i += 1;
            if t.is_whitespace() {
                continue;
            }
            if skipped == offset || t.is_eof() {
                return t;
            }
            skipped += 1;
        }
    }

    /// Looks ahead at the token at the given offset. So lookahead(0) will look
    /// at the next token that will be consumed with consume()
    pub fn lookahead(&mut self, offset: usize) -> Token {
        while self.tokens.len() <= self.position + offset {
            let token = self.consume_token();
            self.tokens.push(token);
        }

        self.tokens[self.position + offset].clone()
    }

    /// Consumes the next token and returns it
    pub fn consume(&mut self) -> Token {
        if self.tokens.len() <= self.position {
            let token = self.consume_token();
            self.tokens.push(token);
        }

        let token = &self.tokens[self.position];
        self.position += 1;

        log::trace!("{:?}", token);

        token.clone()
    }

    /// Pushes the read position back so the next consume returns the same
    /// token again
    pub fn reconsume(&mut self) {
        if self.position > 0 {
            self.position -= 1;
        }
    }

    /// 4.3.1. [Consume a token](https://www.w3.org/TR/css-syntax-3/#consume-token)
    fn consume_token(&mut self) -> Token {
        let loc = self.stream_location();

        // whitespace runs and comments collapse into one whitespace token,
        // so dropping a comment can never fuse its neighbours together
        let mut saw_space = false;
        loop {
            if matches!(self.current_char(), Ch(c) if is_css_whitespace(c)) {
                self.consume_whitespace();
                saw_space = true;
                continue;
            }
            if self.look_ahead_slice(2) == "/*" {
                self.consume_comment();
                saw_space = true;
                continue;
            }
            break;
        }
        if saw_space {
            return Token::new(TokenType::Whitespace, loc);
        }

        let current = self.current_char();

        match current {
            Character::StreamEnd => Token::new(TokenType::Eof, loc),
            Ch('"' | '\'') => self.consume_string_token(),
            Ch(c @ '#') => {
                // consume '#'
                self.next_char();

                if self.is_ident_char(self.current_char().into()) || self.is_start_of_escape(0) {
                    let id = self.is_next_3_points_starts_ident_seq(0);
                    return Token::new_hash(self.consume_ident().as_str(), id, loc);
                }

                Token::new_delim(c, loc)
            }
            Ch('(') => {
                self.next_char();
                Token::new(TokenType::LParen, loc)
            }
            Ch(')') => {
                self.next_char();
                Token::new(TokenType::RParen, loc)
            }
            Ch('[') => {
                self.next_char();
                Token::new(TokenType::LBracket, loc)
            }
            Ch(']') => {
                self.next_char();
                Token::new(TokenType::RBracket, loc)
            }
            Ch('{') => {
                self.next_char();
                Token::new(TokenType::LCurly, loc)
            }
            Ch('}') => {
                self.next_char();
                Token::new(TokenType::RCurly, loc)
            }
            Ch(',') => {
                self.next_char();
                Token::new(TokenType::Comma, loc)
            }
            Ch(':') => {
                self.next_char();
                Token::new(TokenType::Colon, loc)
            }
            Ch(';') => {
                self.next_char();
                Token::new(TokenType::Semicolon, loc)
            }
            Ch(c @ '+') => {
                if self.is_signed_decimal(0) {
                    return self.consume_numeric_token();
                }

                // consume '+'
                self.next_char();
                Token::new_delim(c, loc)
            }
            Ch('.') => {
                if matches!(self.stream.look_ahead(1), Ch(c) if c.is_ascii_digit()) {
                    return self.consume_numeric_token();
                }

                // consume '.'
                self.next_char();
                Token::new_delim('.', loc)
            }
            Ch(c @ '-') => {
                if self.is_signed_decimal(0) {
                    return self.consume_numeric_token();
                }

                let cdc_token = "-->";
                if self.look_ahead_slice(cdc_token.len()) == cdc_token {
                    // consume '-->'
                    self.consume_chars(cdc_token.len());
                    return Token::new(TokenType::Cdc, loc);
                }

                if self.is_next_3_points_starts_ident_seq(0) {
                    return self.consume_ident_like_seq();
                }

                // consume '-'
                self.next_char();
                Token::new_delim(c, loc)
            }
            Ch(c @ '<') => {
                let cdo_token = "<!--";
                if self.look_ahead_slice(cdo_token.len()) == cdo_token {
                    // consume '<!--'
                    self.consume_chars(cdo_token.len());
                    return Token::new(TokenType::Cdo, loc);
                }

                // consume '<'
                self.next_char();
                Token::new_delim(c, loc)
            }
            Ch(c @ '@') => {
                // consume '@'
                self.next_char();

                if self.is_next_3_points_starts_ident_seq(0) {
                    return Token::new_atkeyword(self.consume_ident().as_str(), loc);
                }

                Token::new_delim(c, loc)
            }
            Ch(c @ '\\') => {
                if self.is_start_of_escape(0) {
                    return self.consume_ident_like_seq();
                }

                self.error("invalid escape");

                // consume '\'
                self.next_char();
                Token::new_delim(c, loc)
            }
            Ch(c) if c.is_ascii_digit() => self.consume_numeric_token(),
            Ch(c) if self.is_ident_start(c) => self.consume_ident_like_seq(),
            Ch(c) => {
                self.next_char();
                Token::new_delim(c, loc)
            }
        }
    }

    /// 4.3.2. [Consume comments](https://www.w3.org/TR/css-syntax-3/#consume-comment)
    ///
    /// Comments never produce a token. An unterminated comment is a parse
    /// error, but tokenization continues on whatever input remains.
    fn consume_comment(&mut self) {
        // consume '/*'
        self.consume_chars(2);

        while self.look_ahead_slice(2) != "*/" {
            if self.stream.eof() {
                self.error("unterminated comment");
                return;
            }
            self.next_char();
        }

        // consume '*/'
        self.consume_chars(2);
    }

    /// 4.3.3. [Consume a numeric token](https://www.w3.org/TR/css-syntax-3/#consume-numeric-token)
    ///
    /// Returns either a `<number-token>`, `<percentage-token>`, or `<dimension-token>`.
    fn consume_numeric_token(&mut self) -> Token {
        let loc = self.stream_location();

        let (value, flag, raw) = self.consume_number();

        if self.is_next_3_points_starts_ident_seq(0) {
            let unit = self.consume_ident();

            return Token::new_dimension(value, flag, unit.as_str(), raw, loc);
        } else if self.current_char() == Ch('%') {
            // consume '%'
            self.next_char();
            return Token::new_percentage(value, raw, loc);
        }

        Token::new_number(value, flag, raw, loc)
    }

    /// 4.3.5. [Consume a string token](https://www.w3.org/TR/css-syntax-3/#consume-string-token)
    ///
    /// Returns either a `<string-token>` or `<bad-string-token>`.
    fn consume_string_token(&mut self) -> Token {
        let loc = self.stream_location();

        // consume the string opening: (') or (")
        let ending = self.next_char();
        let mut value = String::new();

        loop {
            if self.stream.eof() {
                self.error("unterminated string");
                return Token::new_quoted_string(value.as_str(), loc);
            }

            if self.current_char() == ending {
                // consume the string ending
                self.next_char();
                return Token::new_quoted_string(value.as_str(), loc);
            }

            // newline: parse error, the newline itself is not consumed
            if self.current_char() == Ch('\n') {
                self.error("newline in string");
                return Token::new_bad_string(value.as_str(), loc);
            }

            if self.current_char() == Ch('\\') {
                // an escaped newline is a line continuation
                if self.stream.look_ahead(1) == Ch('\n') {
                    self.consume_chars(2);
                    continue;
                }

                // a backslash at the very end of the stream is dropped
                if self.stream.look_ahead(1) == Character::StreamEnd {
                    self.next_char();
                    continue;
                }

                value.push(self.consume_escaped_token());
                continue;
            }

            value.push(self.next_char().into());
        }
    }

    /// 4.3.12. [Consume a number](https://www.w3.org/TR/css-syntax-3/#consume-number)
    ///
    /// Returns the parsed value, the integer/number type flag, and the raw
    /// spelling of the number.
    fn consume_number(&mut self) -> (Number, NumericFlag, String) {
        let mut raw = String::new();
        let mut flag = NumericFlag::Integer;

        if matches!(self.current_char(), Ch('+' | '-')) {
            raw.push(self.next_char().into());
        }

        raw.push_str(&self.consume_digits());

        if self.current_char() == Ch('.')
            && matches!(self.stream.look_ahead(1), Ch(c) if c.is_ascii_digit())
        {
            raw.push_str(&self.consume_chars(2));
            raw.push_str(&self.consume_digits());
            flag = NumericFlag::Number;
        }

        let c1 = self.stream.look_ahead(0);
        let c2 = self.stream.look_ahead(1);
        let c3 = self.stream.look_ahead(2);
        if (c1 == Ch('e') || c1 == Ch('E'))
            && (matches!(c2, Ch(c) if c.is_ascii_digit())
                || (matches!(c2, Ch('+' | '-')) && matches!(c3, Ch(c) if c.is_ascii_digit())))
        {
            raw.push(self.next_char().into());
            if matches!(self.current_char(), Ch('+' | '-')) {
                raw.push(self.next_char().into());
            }
            raw.push_str(&self.consume_digits());
            flag = NumericFlag::Number;
        }

        let value = raw.parse().unwrap_or_default();

        (value, flag, raw)
    }

    /// 4.3.4. [Consume an ident-like token](https://www.w3.org/TR/css-syntax-3/#consume-ident-like-token)
    ///
    /// Returns: `<ident-token>`, `<function-token>`, `<url-token>`, or `<bad-url-token>`.
    fn consume_ident_like_seq(&mut self) -> Token {
        let loc = self.stream_location();

        let value = self.consume_ident();

        if value.eq_ignore_ascii_case("url") && self.current_char() == Ch('(') {
            // consume '('
            self.next_char();
            self.consume_whitespace();

            if self.is_any_of(&['"', '\'']) {
                return Token::new_function(value.as_str(), loc);
            }

            return self.consume_url(loc);
        } else if self.current_char() == Ch('(') {
            // consume '('
            self.next_char();
            return Token::new_function(value.as_str(), loc);
        }

        Token::new_ident(value.as_str(), loc)
    }

    /// 4.3.6. [Consume a url token](https://www.w3.org/TR/css-syntax-3/#consume-a-url-token)
    ///
    /// Returns either a `<url-token>` or a `<bad-url-token>`
    fn consume_url(&mut self, loc: Location) -> Token {
        let mut url = String::new();

        self.consume_whitespace();

        loop {
            if self.current_char() == Ch(')') {
                // consume ')'
                self.next_char();
                break;
            }

            if self.stream.eof() {
                self.error("unterminated url");
                break;
            }

            if matches!(self.current_char(), Ch(c) if is_css_whitespace(c)) {
                self.consume_whitespace();
                // only trailing whitespace may remain before the closing paren
                if self.current_char() == Ch(')') || self.stream.eof() {
                    continue;
                }

                self.error("bad url");
                self.consume_remnants_of_bad_url();
                return Token::new_bad_url(url.as_str(), loc);
            }

            if self.is_any_of(&['"', '\'', '(']) || self.is_non_printable_char() {
                self.error("bad url");
                self.consume_remnants_of_bad_url();
                return Token::new_bad_url(url.as_str(), loc);
            }

            if self.current_char() == Ch('\\') {
                if self.is_start_of_escape(0) {
                    url.push(self.consume_escaped_token());
                    continue;
                }

                self.error("bad url");
                self.consume_remnants_of_bad_url();
                return Token::new_bad_url(url.as_str(), loc);
            }

            url.push(self.next_char().into());
        }

        Token::new_url(url.as_str(), loc)
    }

    /// 4.3.14. [Consume the remnants of a bad url](https://www.w3.org/TR/css-syntax-3/#consume-remnants-of-bad-url)
    ///
    /// Consumes enough of the input stream to reach a recovery point where
    /// normal tokenizing can resume.
    fn consume_remnants_of_bad_url(&mut self) {
        loop {
            if self.current_char() == Ch(')') {
                self.next_char();
                break;
            }

            if self.stream.eof() {
                break;
            }

            if self.is_start_of_escape(0) {
                self.consume_escaped_token();
                continue;
            }

            self.next_char();
        }
    }

    /// 4.3.7. [Consume an escaped code point](https://www.w3.org/TR/css-syntax-3/#consume-an-escaped-code-point)
    fn consume_escaped_token(&mut self) -> char {
        // consume '\'
        self.next_char();

        if self.stream.eof() {
            self.error("escape at end of stream");
            return UnicodeChar::REPLACEMENT_CHARACTER;
        }

        if !matches!(self.current_char(), Ch(c) if c.is_ascii_hexdigit()) {
            // anything that is not a hex digit is escaped verbatim
            return self.next_char().into();
        }

        let mut value = String::new();
        while matches!(self.current_char(), Ch(c) if c.is_ascii_hexdigit()) && value.len() < 6 {
            value.push(self.next_char().into());
        }

        if matches!(self.current_char(), Ch(c) if is_css_whitespace(c)) {
            self.next_char();
        }

        let as_u32 = u32::from_str_radix(&value, 16).unwrap_or_default();

        match char::from_u32(as_u32) {
            Some(char) if char != UnicodeChar::NULL && char <= UnicodeChar::MAX_ALLOWED => char,
            // null, surrogates and out-of-range code points all collapse into
            // the replacement character
            _ => UnicodeChar::REPLACEMENT_CHARACTER,
        }
    }

    /// 4.3.11. [Consume an ident sequence](https://www.w3.org/TR/css-syntax-3/#consume-name)
    ///
    /// Note: that algorithm does not do the verification that is necessary to
    /// ensure the returned code points would constitute an `<ident-token>`.
    /// The caller should ensure that the stream starts with an ident sequence
    /// before calling this algorithm.
    fn consume_ident(&mut self) -> String {
        let mut value = String::new();

        loop {
            if self.is_start_of_escape(0) {
                value.push(self.consume_escaped_token());
                continue;
            }

            if !self.is_ident_char(self.current_char().into()) {
                break;
            }

            value.push(self.next_char().into());
        }

        value
    }

    fn consume_digits(&mut self) -> String {
        let mut value = String::new();

        while matches!(self.current_char(), Ch(c) if c.is_ascii_digit()) {
            value.push(self.next_char().into());
        }

        value
    }

    fn consume_chars(&mut self, mut len: usize) -> String {
        let mut value = String::new();

        while len > 0 {
            value.push(self.next_char().into());
            len -= 1;
        }

        value
    }

    fn consume_whitespace(&mut self) {
        while matches!(self.current_char(), Ch(c) if is_css_whitespace(c)) {
            self.next_char();
        }
    }

    /// [ident-start code point](https://www.w3.org/TR/css-syntax-3/#ident-start-code-point)
    fn is_ident_start(&self, char: char) -> bool {
        char.is_alphabetic() || !char.is_ascii() || char == '_'
    }

    /// [ident code point](https://www.w3.org/TR/css-syntax-3/#ident-start-code-point)
    fn is_ident_char(&self, char: char) -> bool {
        self.is_ident_start(char) || char.is_ascii_digit() || char == '-'
    }

    /// def: [non-printable code point](https://www.w3.org/TR/css-syntax-3/#non-printable-code-point)
    fn is_non_printable_char(&self) -> bool {
        if let Ch(char) = self.current_char() {
            (char >= UnicodeChar::NULL && char <= UnicodeChar::BACKSPACE)
                || (char >= UnicodeChar::SHIFT_OUT
                    && char <= UnicodeChar::INFORMATION_SEPARATOR_ONE)
                || char == UnicodeChar::TAB
                || char == UnicodeChar::DELETE
        } else {
            false
        }
    }

    /// 4.3.8. [Check if two code points are a valid escape](https://www.w3.org/TR/css-syntax-3/#starts-with-a-valid-escape)
    fn is_start_of_escape(&self, start: usize) -> bool {
        let current_char = self.stream.look_ahead(start);
        let next_char = self.stream.look_ahead(start + 1);

        current_char == Ch('\\') && next_char != Ch('\n')
    }

    /// 4.3.9. [Check if three code points would start an ident sequence](https://www.w3.org/TR/css-syntax-3/#check-if-three-code-points-would-start-an-ident-sequence)
    fn is_next_3_points_starts_ident_seq(&self, start: usize) -> bool {
        let first = self.stream.look_ahead(start);
        let second = self.stream.look_ahead(start + 1);

        if first == Ch('-') {
            return self.is_ident_start(second.into())
                || second == Ch('-')
                || self.is_start_of_escape(start + 1);
        }

        if first == Ch('\\') {
            return self.is_start_of_escape(start);
        }

        match first {
            Ch(c) => self.is_ident_start(c),
            Character::StreamEnd => false,
        }
    }

    fn is_signed_decimal(&self, start: usize) -> bool {
        let current = self.stream.look_ahead(start);
        let next = self.stream.look_ahead(start + 1);
        let last = self.stream.look_ahead(start + 2);

        // e.g. +1, -1, +.1, -0.01
        matches!(current, Ch('+' | '-'))
            && ((next == Ch('.') && matches!(last, Ch(c) if c.is_ascii_digit()))
                || matches!(next, Ch(c) if c.is_ascii_digit()))
    }

    fn is_any_of(&self, chars: &[char]) -> bool {
        let current_char = self.current_char();
        chars.iter().any(|c| current_char == Ch(*c))
    }

    fn current_char(&self) -> Character {
        self.stream.look_ahead(0)
    }

    fn next_char(&mut self) -> Character {
        if self.stream.eof() {
            return Character::StreamEnd;
        }

        let c = self.stream.read();
        self.cur_location.inc_offset();
        if c == Ch('\n') {
            self.cur_location.inc_line();
            self.cur_location.set_column(1);
        } else {
            self.cur_location.inc_column();
        }

        // advance position in the stream
        self.stream.next();

        c
    }

    fn look_ahead_slice(&self, len: usize) -> String {
        let mut s = String::new();

        for i in 0..len {
            match self.stream.look_ahead(i) {
                Ch(c) => s.push(c),
                _ => break,
            }
        }

        s
    }

    fn error(&mut self, message: &str) {
        self.errors
            .push(CssError::with_location(message, self.stream_location()));
    }
}

/// Whitespace per CSS Syntax: newline, tab, or space. The stream has already
/// normalized CR, CR LF, and FF into newlines.
fn is_css_whitespace(c: char) -> bool {
    matches!(c, '\n' | '\t' | ' ')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(input: &str) -> Vec<TokenType> {
        let mut stream = ByteStream::new(None);
        stream.read_from_str(input);
        stream.close();

        let mut tokenizer = Tokenizer::new(&mut stream, Location::default());
        let mut tokens = Vec::new();

        loop {
            let t = tokenizer.consume();
            let eof = t.is_eof();
            tokens.push(t.token_type);
            if eof {
                break;
            }
        }

        tokens
    }

    fn ident(value: &str) -> TokenType {
        TokenType::Ident(value.to_string())
    }

    fn number(value: Number, flag: NumericFlag, raw: &str) -> TokenType {
        TokenType::Number {
            value,
            flag,
            raw: raw.to_string(),
        }
    }

    fn dimension(value: Number, flag: NumericFlag, unit: &str, raw: &str) -> TokenType {
        TokenType::Dimension {
            value,
            flag,
            unit: unit.to_string(),
            raw: raw.to_string(),
        }
    }

    #[test]
    fn declaration_tokens() {
        assert_eq!(
            tokenize(".a { width: 50cqw; }"),
            vec![
                TokenType::Delim('.'),
                ident("a"),
                TokenType::Whitespace,
                TokenType::LCurly,
                TokenType::Whitespace,
                ident("width"),
                TokenType::Colon,
                TokenType::Whitespace,
                dimension(50.0, NumericFlag::Integer, "cqw", "50"),
                TokenType::Semicolon,
                TokenType::Whitespace,
                TokenType::RCurly,
                TokenType::Eof,
            ]
        );
    }

    #[test]
    fn numbers() {
        assert_eq!(
            tokenize("12 +34 -56 7.8 -9.10 .5 1e2 1e+2 1e-2 3.0"),
            vec![
                number(12.0, NumericFlag::Integer, "12"),
                TokenType::Whitespace,
                number(34.0, NumericFlag::Integer, "+34"),
                TokenType::Whitespace,
                number(-56.0, NumericFlag::Integer, "-56"),
                TokenType::Whitespace,
                number(7.8, NumericFlag::Number, "7.8"),
                TokenType::Whitespace,
                number(-9.10, NumericFlag::Number, "-9.10"),
                TokenType::Whitespace,
                number(0.5, NumericFlag::Number, ".5"),
                TokenType::Whitespace,
                number(100.0, NumericFlag::Number, "1e2"),
                TokenType::Whitespace,
                number(100.0, NumericFlag::Number, "1e+2"),
                TokenType::Whitespace,
                number(0.01, NumericFlag::Number, "1e-2"),
                TokenType::Whitespace,
                number(3.0, NumericFlag::Number, "3.0"),
                TokenType::Eof,
            ]
        );
    }

    #[test]
    fn percentages_and_dimensions() {
        assert_eq!(
            tokenize("50% 1.5em 200px 10cqmin"),
            vec![
                TokenType::Percentage {
                    value: 50.0,
                    raw: "50".to_string()
                },
                TokenType::Whitespace,
                dimension(1.5, NumericFlag::Number, "em", "1.5"),
                TokenType::Whitespace,
                dimension(200.0, NumericFlag::Integer, "px", "200"),
                TokenType::Whitespace,
                dimension(10.0, NumericFlag::Integer, "cqmin", "10"),
                TokenType::Eof,
            ]
        );
    }

    #[test]
    fn at_keyword_and_hash() {
        assert_eq!(
            tokenize("@container #a #1"),
            vec![
                TokenType::AtKeyword("container".to_string()),
                TokenType::Whitespace,
                TokenType::Hash {
                    value: "a".to_string(),
                    id: true
                },
                TokenType::Whitespace,
                TokenType::Hash {
                    value: "1".to_string(),
                    id: false
                },
                TokenType::Eof,
            ]
        );
    }

    #[test]
    fn idents() {
        assert_eq!(tokenize("-ident"), vec![ident("-ident"), TokenType::Eof]);
        assert_eq!(
            tokenize("--custom-prop"),
            vec![ident("--custom-prop"), TokenType::Eof]
        );
        assert_eq!(
            tokenize("_123\\2A x"),
            vec![ident("_123*x"), TokenType::Eof]
        );
    }

    #[test]
    fn escapes() {
        assert_eq!(tokenize("\\2A"), vec![ident("*"), TokenType::Eof]);
        assert_eq!(tokenize("\\69 dent"), vec![ident("ident"), TokenType::Eof]);
        // null, surrogate and out-of-range escapes become the replacement char
        assert_eq!(tokenize("\\0"), vec![ident("\u{FFFD}"), TokenType::Eof]);
        assert_eq!(tokenize("\\110000"), vec![ident("\u{FFFD}"), TokenType::Eof]);
    }

    #[test]
    fn strings() {
        assert_eq!(
            tokenize("\"foo\" 'bar'"),
            vec![
                TokenType::QuotedString("foo".to_string()),
                TokenType::Whitespace,
                TokenType::QuotedString("bar".to_string()),
                TokenType::Eof,
            ]
        );
    }

    #[test]
    fn bad_string() {
        let mut stream = ByteStream::new(None);
        stream.read_from_str("\"foo\nbar");
        stream.close();

        let mut tokenizer = Tokenizer::new(&mut stream, Location::default());
        let t = tokenizer.consume();
        assert_eq!(t.token_type, TokenType::BadString("foo".to_string()));
        assert_eq!(tokenizer.errors().len(), 1);
    }

    #[test]
    fn unterminated_string_is_an_error() {
        let mut stream = ByteStream::new(None);
        stream.read_from_str("\"foo");
        stream.close();

        let mut tokenizer = Tokenizer::new(&mut stream, Location::default());
        let t = tokenizer.consume();
        assert_eq!(t.token_type, TokenType::QuotedString("foo".to_string()));
        assert_eq!(tokenizer.errors().len(), 1);
    }

    #[test]
    fn urls() {
        assert_eq!(
            tokenize("url(https://example.com/a.png)"),
            vec![
                TokenType::Url("https://example.com/a.png".to_string()),
                TokenType::Eof
            ]
        );
        assert_eq!(
            tokenize("url(  spaced.png   )"),
            vec![TokenType::Url("spaced.png".to_string()), TokenType::Eof]
        );
        // a quoted url yields a function token followed by a string
        assert_eq!(
            tokenize("url(\"x.png\")"),
            vec![
                TokenType::Function("url".to_string()),
                TokenType::QuotedString("x.png".to_string()),
                TokenType::RParen,
                TokenType::Eof,
            ]
        );
    }

    #[test]
    fn bad_url() {
        let mut stream = ByteStream::new(None);
        stream.read_from_str("url(a\"b) x");
        stream.close();

        let mut tokenizer = Tokenizer::new(&mut stream, Location::default());
        let t = tokenizer.consume();
        assert_eq!(t.token_type, TokenType::BadUrl("a".to_string()));
        assert!(!tokenizer.errors().is_empty());

        // tokenization resumes after the recovery point
        assert!(tokenizer.consume().is_whitespace());
        assert_eq!(tokenizer.consume().token_type, ident("x"));
    }

    #[test]
    fn comments_collapse_into_whitespace() {
        assert_eq!(
            tokenize("a/* comment */b"),
            vec![ident("a"), TokenType::Whitespace, ident("b"), TokenType::Eof]
        );
        // a whitespace-comment run yields a single whitespace token
        assert_eq!(
            tokenize("a /* one */ /* two */ b"),
            vec![ident("a"), TokenType::Whitespace, ident("b"), TokenType::Eof]
        );
    }

    #[test]
    fn unterminated_comment_is_an_error() {
        let mut stream = ByteStream::new(None);
        stream.read_from_str("a/* comment");
        stream.close();

        let mut tokenizer = Tokenizer::new(&mut stream, Location::default());
        assert_eq!(tokenizer.consume().token_type, ident("a"));
        assert!(tokenizer.consume().is_whitespace());
        assert!(tokenizer.consume().is_eof());
        assert_eq!(tokenizer.errors().len(), 1);
    }

    #[test]
    fn whitespace_collapses() {
        assert_eq!(
            tokenize("a  \t\n  b"),
            vec![ident("a"), TokenType::Whitespace, ident("b"), TokenType::Eof]
        );
    }

    #[test]
    fn cdo_cdc() {
        assert_eq!(
            tokenize("<!-- a -->"),
            vec![
                TokenType::Cdo,
                TokenType::Whitespace,
                ident("a"),
                TokenType::Whitespace,
                TokenType::Cdc,
                TokenType::Eof,
            ]
        );
    }

    #[test]
    fn functions() {
        assert_eq!(
            tokenize("calc(1px)"),
            vec![
                TokenType::Function("calc".to_string()),
                dimension(1.0, NumericFlag::Integer, "px", "1"),
                TokenType::RParen,
                TokenType::Eof,
            ]
        );
    }

    #[test]
    fn display_round_trip() {
        let inputs = [
            ".a { width: 50cqw; }",
            "@container card (min-width: 200px) { .a { color: red; } }",
            "a[href=\"x\"] > .b:hover::before { content: \"y\"; }",
            "url(https://example.com/) 50% 1.5em",
        ];

        for input in inputs {
            let first = tokenize(input);

            let mut stream = ByteStream::new(None);
            stream.read_from_str(input);
            stream.close();
            let mut tokenizer = Tokenizer::new(&mut stream, Location::default());
            let mut serialized = String::new();
            loop {
                let t = tokenizer.consume();
                if t.is_eof() {
                    break;
                }
                serialized.push_str(&t.to_string());
            }

            assert_eq!(tokenize(&serialized), first, "round trip of {input}");
        }
    }

    #[test]
    fn lookahead_does_not_consume() {
        let mut stream = ByteStream::new(None);
        stream.read_from_str("a b");
        stream.close();

        let mut tokenizer = Tokenizer::new(&mut stream, Location::default());
        assert_eq!(tokenizer.lookahead(0).token_type, ident("a"));
        assert_eq!(tokenizer.lookahead_sc(1).token_type, ident("b"));
        assert_eq!(tokenizer.consume().token_type, ident("a"));

        tokenizer.reconsume();
        assert_eq!(tokenizer.consume().token_type, ident("a"));
    }
}
