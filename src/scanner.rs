//! Streaming lexer for Lox source text.
//!
//! [`Scanner`] is an iterator of `Result<Token<'a>>`: whitespace and `//`
//! comments are skipped, every lexeme is a slice of the input, and exactly
//! one `EOF` token is produced before the iterator is exhausted.  A lex error
//! is yielded in place of the offending token and scanning carries on, so a
//! caller can collect every diagnostic in one pass.
//!
//! Keywords are looked up in a compile‑time perfect hash; comments are
//! skipped with `memchr`.
//!
//! ```rust
//! use rox::scanner::Scanner;
//!
//! for result in Scanner::new("print 123; // done") {
//!     match result {
//!         Ok(token) => println!("{}", token),
//!         Err(err) => eprintln!("{}", err),
//!     }
//! }
//! ```

use crate::error::{LoxError, Result};
use crate::token::{Token, TokenType};
use log::{debug, info};
use memchr::memchr;
use phf::phf_map;
use std::iter::FusedIterator;

static KEYWORDS: phf::Map<&'static str, TokenType> = phf_map! {
    "and"    => TokenType::AND,
    "class"  => TokenType::CLASS,
    "else"   => TokenType::ELSE,
    "false"  => TokenType::FALSE,
    "fun"    => TokenType::FUN,
    "for"    => TokenType::FOR,
    "if"     => TokenType::IF,
    "nil"    => TokenType::NIL,
    "or"     => TokenType::OR,
    "print"  => TokenType::PRINT,
    "return" => TokenType::RETURN,
    "super"  => TokenType::SUPER,
    "this"   => TokenType::THIS,
    "true"   => TokenType::TRUE,
    "var"    => TokenType::VAR,
    "while"  => TokenType::WHILE,
};

pub struct Scanner<'a> {
    text: &'a str,
    bytes: &'a [u8],

    /// First byte of the lexeme being scanned.
    start: usize,

    /// Next byte to examine.
    pos: usize,

    line: usize,
    done: bool,
}

impl<'a> Scanner<'a> {
    pub fn new(text: &'a str) -> Self {
        info!("Scanner created over {} bytes", text.len());

        Self {
            text,
            bytes: text.as_bytes(),
            start: 0,
            pos: 0,
            line: 1,
            done: false,
        }
    }

    #[inline(always)]
    fn is_at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    /// Callers check `is_at_end` first.
    #[inline(always)]
    fn bump(&mut self) -> u8 {
        let b = self.bytes[self.pos];
        self.pos += 1;
        b
    }

    /// Byte `offset` positions ahead, or `0` past the end.
    #[inline(always)]
    fn look(&self, offset: usize) -> u8 {
        self.bytes.get(self.pos + offset).copied().unwrap_or(0)
    }

    /// `long` if the next byte is `=` (consuming it), else `short`.
    #[inline(always)]
    fn with_equals(&mut self, long: TokenType, short: TokenType) -> TokenType {
        if self.look(0) == b'=' {
            self.pos += 1;
            long
        } else {
            short
        }
    }

    /// Scans one lexeme starting at `self.start`.  `Ok(None)` means the bytes
    /// were insignificant (whitespace or a comment).
    fn scan_token(&mut self) -> Result<Option<TokenType>> {
        let kind = match self.bump() {
            b'(' => TokenType::LEFT_PAREN,
            b')' => TokenType::RIGHT_PAREN,
            b'{' => TokenType::LEFT_BRACE,
            b'}' => TokenType::RIGHT_BRACE,
            b',' => TokenType::COMMA,
            b'.' => TokenType::DOT,
            b'-' => TokenType::MINUS,
            b'+' => TokenType::PLUS,
            b';' => TokenType::SEMICOLON,
            b'*' => TokenType::STAR,

            b'!' => self.with_equals(TokenType::BANG_EQUAL, TokenType::BANG),
            b'=' => self.with_equals(TokenType::EQUAL_EQUAL, TokenType::EQUAL),
            b'<' => self.with_equals(TokenType::LESS_EQUAL, TokenType::LESS),
            b'>' => self.with_equals(TokenType::GREATER_EQUAL, TokenType::GREATER),

            b'/' if self.look(0) == b'/' => {
                // The newline itself is left for the next call so it bumps `line`.
                self.pos = match memchr(b'\n', &self.bytes[self.pos..]) {
                    Some(offset) => self.pos + offset,
                    None => self.bytes.len(),
                };
                return Ok(None);
            }
            b'/' => TokenType::SLASH,

            b' ' | b'\r' | b'\t' => return Ok(None),

            b'\n' => {
                self.line += 1;
                return Ok(None);
            }

            b'"' => self.string()?,
            b'0'..=b'9' => self.number(),
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => self.identifier(),

            other => {
                let c: char = self.text[self.start..]
                    .chars()
                    .next()
                    .unwrap_or(other as char);

                // Resume after the whole character, not just its first byte.
                self.pos = self.start + c.len_utf8();

                return Err(LoxError::lex(
                    self.line,
                    format!("Unexpected character: {}", c),
                ));
            }
        };

        Ok(Some(kind))
    }

    /// Lox strings may span lines and have no escapes.
    fn string(&mut self) -> Result<TokenType> {
        let body_start = self.pos;

        let Some(offset) = memchr(b'"', &self.bytes[body_start..]) else {
            self.line += self.bytes[body_start..]
                .iter()
                .filter(|&&b| b == b'\n')
                .count();
            self.pos = self.bytes.len();

            return Err(LoxError::lex(self.line, "Unterminated string."));
        };

        let body: &'a str = &self.text[body_start..body_start + offset];
        self.line += body.bytes().filter(|&b| b == b'\n').count();
        self.pos = body_start + offset + 1;

        Ok(TokenType::STRING(body.to_owned()))
    }

    fn number(&mut self) -> TokenType {
        while self.look(0).is_ascii_digit() {
            self.pos += 1;
        }

        if self.look(0) == b'.' && self.look(1).is_ascii_digit() {
            self.pos += 1;

            while self.look(0).is_ascii_digit() {
                self.pos += 1;
            }
        }

        // Only ASCII digits with at most one interior '.', so this always parses.
        let value: f64 = self.text[self.start..self.pos].parse().unwrap_or(0.0);

        TokenType::NUMBER(value)
    }

    fn identifier(&mut self) -> TokenType {
        while matches!(self.look(0), b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'_') {
            self.pos += 1;
        }

        KEYWORDS
            .get(&self.text[self.start..self.pos])
            .cloned()
            .unwrap_or(TokenType::IDENTIFIER)
    }
}

impl<'a> Iterator for Scanner<'a> {
    type Item = Result<Token<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        while !self.is_at_end() {
            self.start = self.pos;

            match self.scan_token() {
                Ok(Some(kind)) => {
                    let lexeme: &'a str = &self.text[self.start..self.pos];

                    debug!("Scanned {:?} on line {}", kind, self.line);

                    return Some(Ok(Token::new(kind, lexeme, self.line)));
                }

                Ok(None) => continue,

                Err(e) => return Some(Err(e)),
            }
        }

        self.done = true;

        Some(Ok(Token::new(TokenType::EOF, "", self.line)))
    }
}

impl<'a> FusedIterator for Scanner<'a> {}
