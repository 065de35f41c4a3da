//! Turns a JMESPath expression string into a stream of tokens.
//!
//! The lexer is a single hand-written forward scan over `char_indices()`,
//! in the idiom of the recursive-descent parsers in this space rather than
//! reaching for a lexer-generator crate — JMESPath's token set is small and
//! the few multi-character lookaheads (`[?`, `[]`, `==`, `!=`, `<=`, `>=`,
//! `&&`, `||`) are cheap to hand-roll.

use std::sync::Arc;

use crate::error::{ErrorReason, JmespathError};
use crate::value::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Identifier(String),
    QuotedIdentifier(String),
    Number(i64),
    Literal(Value),
    RawString(String),
    Dot,
    Comma,
    Colon,
    Semicolon,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Pipe,
    Or,
    And,
    Not,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Ampersand,
    Star,
    At,
    Dollar,
    /// `[?` — filter-open, a single token.
    FilterOpen,
    /// `[]` — flatten, a single token.
    Flatten,
    Eof,
}

impl Token {
    /// A short human-readable name, used in syntax error messages.
    pub fn describe(&self) -> String {
        match self {
            Token::Identifier(s) => format!("identifier {s:?}"),
            Token::QuotedIdentifier(s) => format!("quoted identifier {s:?}"),
            Token::Number(n) => format!("number {n}"),
            Token::Literal(_) => "literal".to_string(),
            Token::RawString(_) => "raw string".to_string(),
            Token::Eof => "end of expression".to_string(),
            other => format!("{other:?}"),
        }
    }
}

/// A token paired with the byte column in the source expression where it
/// starts, for error reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub column: usize,
}

pub struct Lexer<'a> {
    source: &'a str,
    expression: Arc<str>,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str, expression: Arc<str>) -> Self {
        Lexer {
            source,
            expression,
            chars: source.char_indices().peekable(),
        }
    }

    fn err(&self, column: usize, msg: impl Into<String>) -> JmespathError {
        JmespathError::new(self.expression.clone(), column, ErrorReason::Syntax(msg.into()))
    }

    /// Lexes the whole expression into a token vector, terminated by `Eof`.
    pub fn tokenize(mut self) -> Result<Vec<Spanned>, JmespathError> {
        let mut tokens = Vec::new();
        loop {
            let tok = self.next_token()?;
            let is_eof = tok.token == Token::Eof;
            tokens.push(tok);
            if is_eof {
                break;
            }
        }
        Ok(tokens)
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, c)| *c)
    }

    fn next_token(&mut self) -> Result<Spanned, JmespathError> {
        // Skip whitespace.
        while let Some((_, c)) = self.chars.peek() {
            if c.is_whitespace() {
                self.chars.next();
            } else {
                break;
            }
        }

        let (start, c) = match self.chars.next() {
            Some(pair) => pair,
            None => {
                return Ok(Spanned {
                    token: Token::Eof,
                    column: self.source.len(),
                })
            }
        };

        let token = match c {
            '.' => Token::Dot,
            ',' => Token::Comma,
            ':' => Token::Colon,
            ';' => Token::Semicolon,
            '(' => Token::LParen,
            ')' => Token::RParen,
            '{' => Token::LBrace,
            '}' => Token::RBrace,
            '@' => Token::At,
            '$' => Token::Dollar,
            '*' => Token::Star,
            '[' => match self.peek_char() {
                Some('?') => {
                    self.chars.next();
                    Token::FilterOpen
                }
                Some(']') => {
                    self.chars.next();
                    Token::Flatten
                }
                _ => Token::LBracket,
            },
            ']' => Token::RBracket,
            '|' => {
                if self.peek_char() == Some('|') {
                    self.chars.next();
                    Token::Or
                } else {
                    Token::Pipe
                }
            }
            '&' => {
                if self.peek_char() == Some('&') {
                    self.chars.next();
                    Token::And
                } else {
                    Token::Ampersand
                }
            }
            '!' => {
                if self.peek_char() == Some('=') {
                    self.chars.next();
                    Token::Ne
                } else {
                    Token::Not
                }
            }
            '=' => {
                if self.peek_char() == Some('=') {
                    self.chars.next();
                    Token::Eq
                } else {
                    return Err(self.err(start, "unexpected character '=' (did you mean '==' ?)"));
                }
            }
            '<' => {
                if self.peek_char() == Some('=') {
                    self.chars.next();
                    Token::Le
                } else {
                    Token::Lt
                }
            }
            '>' => {
                if self.peek_char() == Some('=') {
                    self.chars.next();
                    Token::Ge
                } else {
                    Token::Gt
                }
            }
            '-' => {
                // A leading '-' only begins a number token inside brackets,
                // i.e. immediately followed by a digit; the parser rejects
                // it as a prefix operator everywhere else by never seeing
                // a Number token where it isn't expected.
                if self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
                    self.lex_number(start, true)
                } else {
                    return Err(self.err(start, "unexpected character '-'"));
                }
            }
            c if c.is_ascii_digit() => self.lex_number(start, false),
            '"' => self.lex_quoted_identifier(start)?,
            '\'' => self.lex_raw_string(start)?,
            '`' => self.lex_literal(start)?,
            c if c == '_' || c.is_alphabetic() => self.lex_identifier(start),
            other => {
                return Err(self.err(start, format!("unexpected character {other:?}")));
            }
        };

        Ok(Spanned { token, column: start })
    }

    fn lex_number(&mut self, start: usize, negative: bool) -> Token {
        let mut end = start + 1;
        while let Some((i, c)) = self.chars.peek().copied() {
            if c.is_ascii_digit() {
                end = i + c.len_utf8();
                self.chars.next();
            } else {
                break;
            }
        }
        let text = &self.source[start..end];
        let n: i64 = text.parse().unwrap_or(0);
        let _ = negative;
        Token::Number(n)
    }

    fn lex_identifier(&mut self, start: usize) -> Token {
        let mut end = start + 1;
        while let Some((i, c)) = self.chars.peek().copied() {
            if c == '_' || c.is_alphanumeric() {
                end = i + c.len_utf8();
                self.chars.next();
            } else {
                break;
            }
        }
        Token::Identifier(self.source[start..end].to_string())
    }

    /// `"..."` — contents are JSON-string-decoded (the body between the
    /// quotes is itself a valid JSON string literal).
    fn lex_quoted_identifier(&mut self, start: usize) -> Result<Token, JmespathError> {
        let body_start = start + 1;
        let end = self.scan_to_unescaped(body_start, '"')?;
        let raw = &self.source[start..end + 1];
        let decoded: String = serde_json::from_str(raw)
            .map_err(|_| self.err(start, "invalid quoted identifier"))?;
        Ok(Token::QuotedIdentifier(decoded))
    }

    /// `'...'` — raw string: only `\\` and `\'` are escapes, every other
    /// backslash is preserved literally.
    fn lex_raw_string(&mut self, start: usize) -> Result<Token, JmespathError> {
        let mut out = String::new();
        loop {
            match self.chars.next() {
                None => return Err(self.err(start, "unterminated raw string literal")),
                Some((_, '\'')) => break,
                Some((_, '\\')) => match self.chars.peek().copied() {
                    Some((_, '\'')) => {
                        out.push('\'');
                        self.chars.next();
                    }
                    Some((_, '\\')) => {
                        out.push('\\');
                        self.chars.next();
                    }
                    _ => out.push('\\'),
                },
                Some((_, c)) => out.push(c),
            }
        }
        Ok(Token::RawString(out))
    }

    /// `` `...` `` — a JSON literal, with `\'` honored as an escape for a
    /// literal `'` (so a raw string can be embedded) and otherwise decoded
    /// as JSON after substituting the outer backtick delimiters for quotes
    /// is not needed: the body is JSON directly, e.g. `` `[1,2,3]` ``,
    /// `` `"str"` ``, `` `{"a":1}` ``, `` `'it''s raw'` `` is not legal —
    /// only `\'` inside the backticks is unescaped back to `'` before
    /// JSON-decoding.
    fn lex_literal(&mut self, start: usize) -> Result<Token, JmespathError> {
        let mut raw = String::new();
        loop {
            match self.chars.next() {
                None => return Err(self.err(start, "unterminated literal")),
                Some((_, '`')) => break,
                Some((_, '\\')) => match self.chars.peek().copied() {
                    Some((_, '\'')) => {
                        raw.push('\'');
                        self.chars.next();
                    }
                    Some((_, '`')) => {
                        raw.push('`');
                        self.chars.next();
                    }
                    _ => raw.push('\\'),
                },
                Some((_, c)) => raw.push(c),
            }
        }
        let trimmed = raw.trim();
        // A bare identifier-shaped literal such as `` `foo` `` is not valid
        // JSON; JMESPath treats an unquoted non-JSON body as an error
        // rather than implicitly stringifying it.
        let value: serde_json::Value = serde_json::from_str(&raw).map_err(|_| {
            self.err(start, format!("invalid JSON literal: {trimmed}"))
        })?;
        Ok(Token::Literal(Value::from(value)))
    }

    /// Scans forward from `from` (inclusive) looking for an unescaped
    /// `quote`, returning the byte index of that quote.
    fn scan_to_unescaped(&mut self, from: usize, quote: char) -> Result<usize, JmespathError> {
        loop {
            match self.chars.next() {
                None => return Err(self.err(from, "unterminated string")),
                Some((_, '\\')) => {
                    self.chars.next();
                }
                Some((i, c)) if c == quote => return Ok(i),
                Some(_) => {}
            }
        }
    }
}
