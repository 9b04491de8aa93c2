// ABOUTME: Recursive-descent parser building a spanned AST with inline error nodes

use crate::ast::Ast;
use crate::lexer::{Token, TokenKind};
use crate::span::Span;

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser { tokens, pos: 0 }
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos.min(self.tokens.len() - 1)].clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        tok
    }

    fn at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    /// `program = { sexpr } EOF`
    pub fn parse_program(&mut self) -> Ast {
        let start = self.peek().span;
        let mut items = Vec::new();
        while !self.at_end() {
            let item = self.parse_sexpr();
            let had_error = item.is_err();
            items.push(item);
            if had_error {
                break;
            }
        }
        Ast::Prog(items, start)
    }

    /// `sexpr = "(" expr ")"`, where the items following the head are any
    /// mix of atom, sexpr, qexpr.
    fn parse_sexpr(&mut self) -> Ast {
        let open = self.peek().clone();
        if open.kind != TokenKind::LParen {
            return Ast::Err("missing opening parenthesis".to_string(), open.span);
        }
        self.advance();

        if self.peek().kind == TokenKind::RParen {
            self.advance();
            return Ast::Sexpr(Vec::new(), open.span);
        }

        let mut items = Vec::new();
        let head = match self.peek().kind {
            TokenKind::LParen => self.parse_sexpr(),
            TokenKind::Sym => self.parse_atom(),
            _ => {
                let tok = self.peek().clone();
                return Ast::Err(
                    "an expression must start with a symbol or a `(`".to_string(),
                    tok.span,
                );
            }
        };
        let head_failed = head.is_err();
        items.push(head);
        if head_failed {
            return Ast::Sexpr(items, open.span);
        }

        loop {
            match self.peek().kind {
                TokenKind::RParen => {
                    self.advance();
                    break;
                }
                TokenKind::Eof => {
                    items.push(Ast::Err("missing closing parenthesis".to_string(), self.peek().span));
                    break;
                }
                TokenKind::LParen => items.push(self.parse_sexpr()),
                TokenKind::LBrace => items.push(self.parse_qexpr()),
                TokenKind::Num | TokenKind::Dbl | TokenKind::Str | TokenKind::Sym => {
                    items.push(self.parse_atom())
                }
                TokenKind::Err => {
                    let tok = self.advance();
                    items.push(Ast::Err(tok.text, tok.span));
                }
                TokenKind::RBrace => {
                    let tok = self.peek().clone();
                    items.push(Ast::Err(
                        "operands must be of types num|double|string|symbol|sexpr".to_string(),
                        tok.span,
                    ));
                    self.advance();
                }
            }
            if items.last().is_some_and(Ast::is_err) {
                break;
            }
        }

        Ast::Sexpr(items, open.span)
    }

    /// Like `parse_program`, but when the input does not start with `(`,
    /// treats the whole line as the body of one implicit top-level sexpr
    /// (head plus trailing args), without consuming a leading `(`/`)` pair.
    /// This is how the REPL accepts bare input like `+ 1 2`.
    pub fn parse_surrounding(&mut self) -> Ast {
        if self.peek().kind == TokenKind::LParen {
            return self.parse_program();
        }

        let start = self.peek().span;
        let head = match self.peek().kind {
            TokenKind::Sym => self.parse_atom(),
            _ => {
                let tok = self.peek().clone();
                return Ast::Prog(
                    vec![Ast::Err("an expression must start with a symbol or a `(`".to_string(), tok.span)],
                    start,
                );
            }
        };
        let mut items = vec![head];

        if !items[0].is_err() {
            loop {
                match self.peek().kind {
                    TokenKind::Eof => break,
                    TokenKind::LParen => items.push(self.parse_sexpr()),
                    TokenKind::LBrace => items.push(self.parse_qexpr()),
                    TokenKind::Num | TokenKind::Dbl | TokenKind::Str | TokenKind::Sym => {
                        items.push(self.parse_atom())
                    }
                    TokenKind::Err => {
                        let tok = self.advance();
                        items.push(Ast::Err(tok.text, tok.span));
                    }
                    TokenKind::RParen | TokenKind::RBrace => {
                        let tok = self.peek().clone();
                        items.push(Ast::Err("unexpected closing delimiter".to_string(), tok.span));
                        self.advance();
                    }
                }
                if items.last().is_some_and(Ast::is_err) {
                    break;
                }
            }
        }

        Ast::Prog(vec![Ast::Sexpr(items, start)], start)
    }

    /// `qexpr = "{" { atom | sexpr | qexpr } "}"`
    fn parse_qexpr(&mut self) -> Ast {
        let open = self.advance(); // LBrace
        let mut items = Vec::new();
        loop {
            match self.peek().kind {
                TokenKind::RBrace => {
                    self.advance();
                    break;
                }
                TokenKind::Eof => {
                    items.push(Ast::Err("missing closing brace".to_string(), self.peek().span));
                    break;
                }
                TokenKind::LParen => items.push(self.parse_sexpr()),
                TokenKind::LBrace => items.push(self.parse_qexpr()),
                TokenKind::Num | TokenKind::Dbl | TokenKind::Str | TokenKind::Sym => {
                    items.push(self.parse_atom())
                }
                TokenKind::Err => {
                    let tok = self.advance();
                    items.push(Ast::Err(tok.text, tok.span));
                }
                TokenKind::RParen => {
                    let tok = self.peek().clone();
                    items.push(Ast::Err(
                        "operands must be of types num|double|string|symbol|sexpr".to_string(),
                        tok.span,
                    ));
                    self.advance();
                }
            }
            if items.last().is_some_and(Ast::is_err) {
                break;
            }
        }
        Ast::Qexpr(items, open.span)
    }

    fn parse_atom(&mut self) -> Ast {
        let tok = self.advance();
        match tok.kind {
            TokenKind::Num => Ast::Num(tok.text, tok.span),
            TokenKind::Dbl => Ast::Dbl(tok.text, tok.span),
            TokenKind::Str => Ast::Str(tok.text, tok.span),
            TokenKind::Sym => Ast::Sym(tok.text, tok.span),
            TokenKind::Err => Ast::Err(tok.text, tok.span),
            _ => Ast::Err("expected an atom".to_string(), tok.span),
        }
    }
}

/// Depth-first search for the first `Ast::Err` node, used by the driver to
/// surface a single diagnostic even though the tree is otherwise complete.
pub fn first_error(ast: &Ast) -> Option<(&str, Span)> {
    match ast {
        Ast::Err(msg, span) => Some((msg.as_str(), *span)),
        Ast::Prog(items, _) | Ast::Sexpr(items, _) | Ast::Qexpr(items, _) => {
            items.iter().find_map(first_error)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn parse(src: &str) -> Ast {
        let tokens = Lexer::new(src).tokenize();
        Parser::new(tokens).parse_program()
    }

    #[test]
    fn parses_simple_sexpr() {
        let ast = parse("(+ 1 2)");
        match ast {
            Ast::Prog(items, _) => {
                assert_eq!(items.len(), 1);
                match &items[0] {
                    Ast::Sexpr(children, _) => assert_eq!(children.len(), 3),
                    _ => panic!("expected sexpr"),
                }
            }
            _ => panic!("expected prog"),
        }
    }

    #[test]
    fn parses_nested_qexpr() {
        let ast = parse("(head {1 2 3})");
        assert!(first_error(&ast).is_none());
    }

    #[test]
    fn missing_closing_paren_reports_error() {
        let ast = parse("(+ 1 (+ 1");
        let (msg, _) = first_error(&ast).expect("expected an error node");
        assert_eq!(msg, "missing closing parenthesis");
    }

    #[test]
    fn nested_head_sexpr_allows_trailing_args() {
        let ast = parse("((\\ {x y} {+ x y}) 10)");
        assert!(first_error(&ast).is_none());
        match &ast {
            Ast::Prog(items, _) => match &items[0] {
                Ast::Sexpr(children, _) => {
                    assert_eq!(children.len(), 2);
                    assert!(matches!(children[0], Ast::Sexpr(..)));
                    assert!(matches!(children[1], Ast::Num(..)));
                }
                _ => panic!("expected sexpr"),
            },
            _ => panic!("expected prog"),
        }
    }

    #[test]
    fn parse_surrounding_wraps_bare_input_in_an_implicit_sexpr() {
        let tokens = Lexer::new("+ 1 2").tokenize();
        let ast = Parser::new(tokens).parse_surrounding();
        assert!(first_error(&ast).is_none());
        match &ast {
            Ast::Prog(items, _) => match &items[0] {
                Ast::Sexpr(children, _) => assert_eq!(children.len(), 3),
                _ => panic!("expected sexpr"),
            },
            _ => panic!("expected prog"),
        }
    }

    #[test]
    fn parse_surrounding_leaves_parenthesized_input_untouched() {
        let tokens = Lexer::new("(+ 1 2)").tokenize();
        let ast = Parser::new(tokens).parse_surrounding();
        assert!(first_error(&ast).is_none());
        match &ast {
            Ast::Prog(items, _) => assert_eq!(items.len(), 1),
            _ => panic!("expected prog"),
        }
    }

    #[test]
    fn expr_must_start_with_symbol_or_paren() {
        let ast = parse("(1 2)");
        let (msg, _) = first_error(&ast).expect("expected an error node");
        assert_eq!(msg, "an expression must start with a symbol or a `(`");
    }
}
