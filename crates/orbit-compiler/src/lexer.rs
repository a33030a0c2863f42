// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2025 Tobias Sarnowski <tobias@sarnowski.cloud>

//! Tokenizer for Orbit source. One token of lookahead, plus an
//! `unscan` that rewinds to the cursor a given token was produced at —
//! the parser uses it to backtrack out of `assign` when a `cond`
//! turns out not to start an assignment.

use std::iter::Peekable;
use std::str::CharIndices;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Ident(String),
    Number(f64),
    Str(String),

    // keywords
    Object,
    State,
    Fun,
    Var,
    Return,
    If,
    Else,
    While,
    For,
    Foreach,
    In,
    Break,
    Continue,
    TypeOf,
    True,
    False,
    Null,
    This,

    // punctuation / operators
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Semi,
    Comma,
    Dot,
    Question,
    Colon,

    Assign,
    PlusAssign,
    MinusAssign,
    StarAssign,
    SlashAssign,
    PercentAssign,

    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Inc,
    Dec,

    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,

    AndAnd,
    OrOr,
    Not,

    Eof,
}

/// A scanned token plus the cursor it was scanned from, so the parser
/// can rewind to exactly this point via [`Lexer::unscan`].
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: u32,
    input_pos: usize,
    input_line: u32,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LexError {
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("invalid escape sequence '\\{0}'")]
    InvalidEscape(char),
    #[error("invalid number literal")]
    InvalidNumber,
    #[error("unexpected character '{0}'")]
    UnexpectedChar(char),
    #[error("unterminated block comment")]
    UnterminatedComment,
}

pub struct Lexer<'a> {
    source: &'a str,
    chars: Peekable<CharIndices<'a>>,
    line: u32,
    /// Set by `unscan`; the next call to `next_token` returns this
    /// token again instead of scanning.
    pushback: Option<Token>,
}

impl<'a> Lexer<'a> {
    #[must_use]
    pub fn new(source: &'a str) -> Self {
        Self { source, chars: source.char_indices().peekable(), line: 1, pushback: None }
    }

    /// Restore the lexer to the cursor a previously returned token was
    /// scanned from, so the next `next_token` call re-scans it.
    pub fn unscan(&mut self, token: Token) {
        self.line = token.input_line;
        self.chars = self.source[token.input_pos..].char_indices().peekable();
        // char_indices restarts byte offsets from 0 for the sub-slice;
        // re-anchor them to the original source so `input_pos` on the
        // next token is correct.
        self.pushback = Some(token);
    }

    pub fn next_token(&mut self) -> Result<Token, LexError> {
        if let Some(token) = self.pushback.take() {
            self.line = token.input_line;
            self.chars = self.source[token.input_pos..].char_indices().peekable();
            return self.scan(token.input_pos, token.input_line);
        }
        self.skip_trivia()?;
        let (pos, line) = self.cursor();
        self.scan(pos, line)
    }

    fn cursor(&mut self) -> (usize, u32) {
        let pos = self.chars.peek().map_or(self.source.len(), |&(i, _)| i);
        (pos, self.line)
    }

    fn skip_trivia(&mut self) -> Result<(), LexError> {
        loop {
            match self.chars.peek().copied() {
                Some((_, c)) if c.is_whitespace() => {
                    if c == '\n' {
                        self.line += 1;
                    }
                    self.chars.next();
                }
                Some((_, '/')) => {
                    let mut lookahead = self.chars.clone();
                    lookahead.next();
                    match lookahead.peek().copied() {
                        Some((_, '/')) => {
                            self.chars.next();
                            self.chars.next();
                            for (_, c) in self.chars.by_ref() {
                                if c == '\n' {
                                    self.line += 1;
                                    break;
                                }
                            }
                        }
                        Some((_, '*')) => {
                            self.chars.next();
                            self.chars.next();
                            let mut closed = false;
                            let mut prev = '\0';
                            for (_, c) in self.chars.by_ref() {
                                if c == '\n' {
                                    self.line += 1;
                                }
                                if prev == '*' && c == '/' {
                                    closed = true;
                                    break;
                                }
                                prev = c;
                            }
                            if !closed {
                                return Err(LexError::UnterminatedComment);
                            }
                        }
                        _ => break,
                    }
                }
                _ => break,
            }
        }
        Ok(())
    }

    fn scan(&mut self, input_pos: usize, input_line: u32) -> Result<Token, LexError> {
        let line = self.line;
        let mk = |kind| Token { kind, line, input_pos, input_line };

        let Some(&(_, c)) = self.chars.peek() else {
            return Ok(mk(TokenKind::Eof));
        };

        match c {
            '(' => self.single(mk, TokenKind::LParen),
            ')' => self.single(mk, TokenKind::RParen),
            '{' => self.single(mk, TokenKind::LBrace),
            '}' => self.single(mk, TokenKind::RBrace),
            '[' => self.single(mk, TokenKind::LBracket),
            ']' => self.single(mk, TokenKind::RBracket),
            ';' => self.single(mk, TokenKind::Semi),
            ',' => self.single(mk, TokenKind::Comma),
            '.' => self.single(mk, TokenKind::Dot),
            '?' => self.single(mk, TokenKind::Question),
            ':' => self.single(mk, TokenKind::Colon),
            '"' | '\'' => self.scan_string(c).map(mk),
            '0'..='9' => self.scan_number().map(mk),
            c if is_ident_start(c) => Ok(mk(self.scan_ident())),
            '+' => self.scan_two(mk, '+', TokenKind::Inc, '=', TokenKind::PlusAssign, TokenKind::Plus),
            '-' => self.scan_two(mk, '-', TokenKind::Dec, '=', TokenKind::MinusAssign, TokenKind::Minus),
            '*' => self.scan_eq(mk, TokenKind::StarAssign, TokenKind::Star),
            '/' => self.scan_eq(mk, TokenKind::SlashAssign, TokenKind::Slash),
            '%' => self.scan_eq(mk, TokenKind::PercentAssign, TokenKind::Percent),
            '=' => self.scan_eq(mk, TokenKind::Eq, TokenKind::Assign),
            '!' => self.scan_eq(mk, TokenKind::Ne, TokenKind::Not),
            '<' => self.scan_eq(mk, TokenKind::Le, TokenKind::Lt),
            '>' => self.scan_eq(mk, TokenKind::Ge, TokenKind::Gt),
            '&' => self.scan_double(mk, '&', TokenKind::AndAnd),
            '|' => self.scan_double(mk, '|', TokenKind::OrOr),
            _ => Err(LexError::UnexpectedChar(c)),
        }
    }

    fn single(&mut self, mk: impl Fn(TokenKind) -> Token, kind: TokenKind) -> Result<Token, LexError> {
        self.chars.next();
        Ok(mk(kind))
    }

    /// `c` optionally followed by itself (`double`) or `=` (`with_eq`),
    /// falling back to `plain`.
    fn scan_two(
        &mut self,
        mk: impl Fn(TokenKind) -> Token,
        double_char: char,
        double: TokenKind,
        eq_char: char,
        with_eq: TokenKind,
        plain: TokenKind,
    ) -> Result<Token, LexError> {
        self.chars.next();
        match self.chars.peek().copied() {
            Some((_, c)) if c == double_char => {
                self.chars.next();
                Ok(mk(double))
            }
            Some((_, c)) if c == eq_char => {
                self.chars.next();
                Ok(mk(with_eq))
            }
            _ => Ok(mk(plain)),
        }
    }

    fn scan_eq(&mut self, mk: impl Fn(TokenKind) -> Token, with_eq: TokenKind, plain: TokenKind) -> Result<Token, LexError> {
        self.chars.next();
        if matches!(self.chars.peek(), Some((_, '='))) {
            self.chars.next();
            Ok(mk(with_eq))
        } else {
            Ok(mk(plain))
        }
    }

    fn scan_double(&mut self, mk: impl Fn(TokenKind) -> Token, repeat: char, token: TokenKind) -> Result<Token, LexError> {
        self.chars.next();
        if matches!(self.chars.peek(), Some((_, c)) if *c == repeat) {
            self.chars.next();
            Ok(mk(token))
        } else {
            Err(LexError::UnexpectedChar(repeat))
        }
    }

    fn scan_string(&mut self, quote: char) -> Result<TokenKind, LexError> {
        self.chars.next();
        let mut s = String::new();
        loop {
            match self.chars.next() {
                Some((_, c)) if c == quote => return Ok(TokenKind::Str(s)),
                Some((_, '\\')) => {
                    let escaped = match self.chars.next() {
                        Some((_, 'n')) => '\n',
                        Some((_, 't')) => '\t',
                        Some((_, 'r')) => '\r',
                        Some((_, '0')) => '\0',
                        Some((_, '\\')) => '\\',
                        Some((_, '"')) => '"',
                        Some((_, '\'')) => '\'',
                        Some((_, c)) => return Err(LexError::InvalidEscape(c)),
                        None => return Err(LexError::UnterminatedString),
                    };
                    s.push(escaped);
                }
                Some((_, '\n')) | None => return Err(LexError::UnterminatedString),
                Some((_, c)) => s.push(c),
            }
        }
    }

    fn scan_number(&mut self) -> Result<TokenKind, LexError> {
        let mut text = String::new();
        while matches!(self.chars.peek(), Some((_, c)) if c.is_ascii_digit()) {
            text.push(self.chars.next().unwrap().1);
        }
        if matches!(self.chars.peek(), Some((_, '.'))) {
            let mut lookahead = self.chars.clone();
            lookahead.next();
            if matches!(lookahead.peek(), Some((_, c)) if c.is_ascii_digit()) {
                text.push(self.chars.next().unwrap().1);
                while matches!(self.chars.peek(), Some((_, c)) if c.is_ascii_digit()) {
                    text.push(self.chars.next().unwrap().1);
                }
            }
        }
        text.parse().map(TokenKind::Number).map_err(|_| LexError::InvalidNumber)
    }

    fn scan_ident(&mut self) -> TokenKind {
        let mut text = String::new();
        while matches!(self.chars.peek(), Some((_, c)) if is_ident_continue(*c)) {
            text.push(self.chars.next().unwrap().1);
        }
        match text.as_str() {
            "object" => TokenKind::Object,
            "state" => TokenKind::State,
            "fun" => TokenKind::Fun,
            "var" => TokenKind::Var,
            "return" => TokenKind::Return,
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "while" => TokenKind::While,
            "for" => TokenKind::For,
            "foreach" => TokenKind::Foreach,
            "in" => TokenKind::In,
            "break" => TokenKind::Break,
            "continue" => TokenKind::Continue,
            "typeof" => TokenKind::TypeOf,
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "null" => TokenKind::Null,
            "this" => TokenKind::This,
            _ => TokenKind::Ident(text),
        }
    }
}

/// Scan `source` fully, collecting every token including the trailing
/// `Eof`. The parser works over this materialized vector rather than
/// driving the lexer token-by-token, so its own backtracking (for
/// `assign` vs. plain `cond`) is just saving and restoring an index.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    loop {
        let tok = lexer.next_token()?;
        let at_eof = tok.kind == TokenKind::Eof;
        tokens.push(tok);
        if at_eof {
            return Ok(tokens);
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests;
