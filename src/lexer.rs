// ABOUTME: Hand-written scanner turning source text into a token stream

use crate::span::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Eof,
    Err,
    LParen,
    RParen,
    LBrace,
    RBrace,
    Sym,
    Num,
    Dbl,
    Str,
}

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: Span,
}

pub const SIGN_CHARS: &str = "+-*/%^?!:;,._#~<>=$\u{a7}\u{a3}\u{a4}\u{b5}\\&|";

fn is_sign_char(c: char) -> bool {
    SIGN_CHARS.contains(c)
}

fn is_symbol_start(c: char) -> bool {
    c.is_alphabetic() || is_sign_char(c)
}

fn is_symbol_cont(c: char) -> bool {
    c.is_alphanumeric() || is_sign_char(c)
}

/// Scans the full input up front and returns a flat `Vec<Token>` terminated
/// by an `Eof` token. A source-level doubly linked list has no advantage
/// over an index-addressable vector here, so the cursor-over-`Vec` idiom
/// stands in for it.
pub struct Lexer<'a> {
    chars: Vec<char>,
    pos: usize,
    line: u32,
    col: u32,
    _source: &'a str,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Lexer {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            col: 1,
            _source: source,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(c)
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(c) if c == ' ' || c == '\t' || c == '\r' || c == '\n' => {
                    self.advance();
                }
                Some(';') => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    pub fn tokenize(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            self.skip_trivia();
            let start = Span::new(self.line, self.col);
            let Some(c) = self.peek() else {
                tokens.push(Token {
                    kind: TokenKind::Eof,
                    text: String::new(),
                    span: start,
                });
                break;
            };

            let token = match c {
                '(' => {
                    self.advance();
                    Token {
                        kind: TokenKind::LParen,
                        text: "(".to_string(),
                        span: start,
                    }
                }
                ')' => {
                    self.advance();
                    Token {
                        kind: TokenKind::RParen,
                        text: ")".to_string(),
                        span: start,
                    }
                }
                '{' => {
                    self.advance();
                    Token {
                        kind: TokenKind::LBrace,
                        text: "{".to_string(),
                        span: start,
                    }
                }
                '}' => {
                    self.advance();
                    Token {
                        kind: TokenKind::RBrace,
                        text: "}".to_string(),
                        span: start,
                    }
                }
                '"' => self.scan_string(start),
                '-' if self.peek_at(1).is_some_and(|d| d.is_ascii_digit()) => self.scan_number(start),
                c if c.is_ascii_digit() => self.scan_number(start),
                c if is_symbol_start(c) => self.scan_symbol(start),
                other => {
                    self.advance();
                    Token {
                        kind: TokenKind::Err,
                        text: format!("unknown character '{other}'"),
                        span: start,
                    }
                }
            };
            tokens.push(token);
        }
        tokens
    }

    fn scan_number(&mut self, start: Span) -> Token {
        let mut text = String::new();
        if self.peek() == Some('-') {
            text.push(self.advance().unwrap());
        }
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                text.push(self.advance().unwrap());
            } else {
                break;
            }
        }

        let mut kind = TokenKind::Num;
        if self.peek() == Some('.') && self.peek_at(1).is_some_and(|d| d.is_ascii_digit()) {
            kind = TokenKind::Dbl;
            text.push(self.advance().unwrap());
            while let Some(c) = self.peek() {
                if c.is_ascii_digit() {
                    text.push(self.advance().unwrap());
                } else {
                    break;
                }
            }
        }

        Token { kind, text, span: start }
    }

    fn scan_symbol(&mut self, start: Span) -> Token {
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if is_symbol_cont(c) {
                text.push(self.advance().unwrap());
            } else {
                break;
            }
        }
        Token {
            kind: TokenKind::Sym,
            text,
            span: start,
        }
    }

    fn scan_string(&mut self, start: Span) -> Token {
        self.advance(); // opening quote
        let mut text = String::new();
        loop {
            match self.peek() {
                None => {
                    return Token {
                        kind: TokenKind::Err,
                        text: "missing closing quotation mark".to_string(),
                        span: start,
                    };
                }
                Some('"') => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    text.push(self.advance().unwrap());
                    if let Some(c) = self.peek() {
                        text.push(self.advance().unwrap_or(c));
                    }
                }
                Some(_) => text.push(self.advance().unwrap()),
            }
        }
        Token {
            kind: TokenKind::Str,
            text,
            span: start,
        }
    }
}

/// Wraps `source` in an implicit top-level `( … )` when it doesn't already
/// start with one, so the REPL can accept `+ 1 2` without outer parens.
pub fn surround_if_needed(source: &str) -> String {
    let trimmed = source.trim_start();
    if trimmed.starts_with('(') {
        source.to_string()
    } else {
        format!("({source})")
    }
}
