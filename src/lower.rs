// ABOUTME: Lowers a parsed AST into the initial Value tree

use crate::ast::Ast;
use crate::error::{ErrorCode, LispError};
use crate::value::Value;
use num_bigint::BigInt;
use std::str::FromStr;

/// NUM -> Num if it fits in 64 bits, else BigNum; DBL -> Dbl; STR unescapes
/// `\"`; SEXPR/QEXPR lower their children recursively; PROG becomes a Sexpr
/// of Sexprs, one top-level expression evaluated after another.
pub fn lower(ast: &Ast) -> Value {
    match ast {
        Ast::Prog(items, span) => {
            let children: Vec<Value> = items.iter().map(lower).collect();
            Value::sexpr(children).with_span(Some(*span))
        }
        Ast::Sexpr(items, span) => {
            let children: Vec<Value> = items.iter().map(lower).collect();
            Value::sexpr(children).with_span(Some(*span))
        }
        Ast::Qexpr(items, span) => {
            let children: Vec<Value> = items.iter().map(lower).collect();
            Value::qexpr(children).with_span(Some(*span))
        }
        Ast::Num(text, span) => match text.parse::<i64>() {
            Ok(n) => Value::num(n).with_span(Some(*span)),
            Err(_) => match BigInt::from_str(text) {
                Ok(n) => Value::bignum(n).with_span(Some(*span)),
                Err(_) => {
                    Value::err(LispError::with_location(ErrorCode::BadOperand, "invalid number", Some(*span)))
                        .with_span(Some(*span))
                }
            },
        },
        Ast::Dbl(text, span) => match text.parse::<f64>() {
            Ok(n) => Value::dbl(n).with_span(Some(*span)),
            Err(_) => {
                Value::err(LispError::with_location(ErrorCode::BadOperand, "invalid double", Some(*span)))
                    .with_span(Some(*span))
            }
        },
        Ast::Str(text, span) => Value::str(unescape(text)).with_span(Some(*span)),
        Ast::Sym(text, span) => Value::sym(text.clone()).with_span(Some(*span)),
        Ast::Err(msg, span) => {
            Value::err(LispError::with_location(ErrorCode::Ast, msg.clone(), Some(*span))).with_span(Some(*span))
        }
    }
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('"') => out.push('"'),
                Some('\\') => out.push('\\'),
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => out.push('\\'),
            }
        } else {
            out.push(c);
        }
    }
    out
}
