// ABOUTME: Function descriptor: builtins, accumulators and user-defined lambdas

use crate::env::Environment;
use crate::error::LispError;
use crate::guard::Guard;
use crate::value::Value;
use num_bigint::BigInt;
use std::fmt;
use std::rc::Rc;

pub type BuiltinFn = fn(&Rc<Environment>, &[Value]) -> Result<Value, LispError>;

/// The four operator variants an accumulator builtin needs, one per
/// representation in the numeric tower, plus the overflow test that decides
/// when to promote `Num` to `BigNum` mid-fold.
#[derive(Clone)]
pub struct AccumulatorOps {
    pub op_num: fn(i64, i64) -> i64,
    pub op_bignum: fn(&BigInt, &BigInt) -> BigInt,
    pub op_dbl: fn(f64, f64) -> f64,
    pub overflow: Option<fn(i64, i64) -> bool>,
}

#[derive(Clone)]
pub enum Dispatch {
    Builtin(BuiltinFn),
    Accumulator(AccumulatorOps),
    Lisp {
        formals: Value,
        body: Value,
        captured_scope: Rc<Environment>,
    },
}

/// A function descriptor: either a native builtin (plain or accumulator) or
/// a user-defined lambda, plus the partial-application buffer shared by
/// both kinds.
#[derive(Clone)]
pub struct Function {
    pub symbol: String,
    pub min_argc: i32,
    pub max_argc: i32,
    pub accumulator: bool,
    pub init_neutral: bool,
    pub neutral: Option<Value>,
    pub guards: Vec<Guard>,
    pub dispatch: Dispatch,
    pub args: Vec<Value>,
}

impl Function {
    pub fn builtin(symbol: &str, min_argc: i32, max_argc: i32, f: BuiltinFn) -> Self {
        Function {
            symbol: symbol.to_string(),
            min_argc,
            max_argc,
            accumulator: false,
            init_neutral: false,
            neutral: None,
            guards: Vec::new(),
            dispatch: Dispatch::Builtin(f),
            args: Vec::new(),
        }
    }

    pub fn accumulator(
        symbol: &str,
        min_argc: i32,
        max_argc: i32,
        init_neutral: bool,
        neutral: Value,
        ops: AccumulatorOps,
    ) -> Self {
        Function {
            symbol: symbol.to_string(),
            min_argc,
            max_argc,
            accumulator: true,
            init_neutral,
            neutral: Some(neutral),
            guards: Vec::new(),
            dispatch: Dispatch::Accumulator(ops),
            args: Vec::new(),
        }
    }

    pub fn lambda(formals: Value, body: Value, captured_scope: Rc<Environment>) -> Self {
        let formal_items = formals.as_list().unwrap_or(&[]);
        let argc = formal_items.len() as i32;
        let (min_argc, max_argc) = if formal_items.len() >= 2
            && formal_items[formal_items.len() - 2].as_sym() == Some("&")
        {
            (argc - 2, -1)
        } else {
            (argc, argc)
        };
        Function {
            symbol: "\u{3bb}".to_string(),
            min_argc,
            max_argc,
            accumulator: false,
            init_neutral: false,
            neutral: None,
            guards: Vec::new(),
            dispatch: Dispatch::Lisp {
                formals,
                body,
                captured_scope,
            },
            args: Vec::new(),
        }
    }

    pub fn with_guards(mut self, guards: Vec<Guard>) -> Self {
        self.guards = guards;
        self
    }

    pub fn renamed(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = symbol.into();
        self
    }

    pub fn is_lisp(&self) -> bool {
        matches!(self.dispatch, Dispatch::Lisp { .. })
    }

    pub fn arity_display(&self) -> String {
        match (self.min_argc, self.max_argc) {
            (a, b) if a == b => format!("{a}"),
            (a, -1) => format!("{a}+"),
            (a, b) => format!("{a}-{b}"),
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.dispatch {
            Dispatch::Lisp { formals, body, .. } => {
                write!(f, "<\u{3bb} {formals} {body}")?;
                if !self.args.is_empty() {
                    write!(f, " | bound")?;
                    for a in &self.args {
                        write!(f, " {a}")?;
                    }
                }
                write!(f, ">")
            }
            _ => write!(f, "<builtin:{}/{}>", self.symbol, self.arity_display()),
        }
    }
}
