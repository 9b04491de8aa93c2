// ABOUTME: Spanned abstract syntax tree produced by the parser

use crate::span::Span;

#[derive(Debug, Clone)]
pub enum Ast {
    Prog(Vec<Ast>, Span),
    Sexpr(Vec<Ast>, Span),
    Qexpr(Vec<Ast>, Span),
    Num(String, Span),
    Dbl(String, Span),
    Str(String, Span),
    Sym(String, Span),
    Err(String, Span),
}

impl Ast {
    pub fn span(&self) -> Span {
        match self {
            Ast::Prog(_, s)
            | Ast::Sexpr(_, s)
            | Ast::Qexpr(_, s)
            | Ast::Num(_, s)
            | Ast::Dbl(_, s)
            | Ast::Str(_, s)
            | Ast::Sym(_, s)
            | Ast::Err(_, s) => *s,
        }
    }

    pub fn is_err(&self) -> bool {
        matches!(self, Ast::Err(..))
    }
}
