// ABOUTME: Precondition checks run before builtin dispatch

use crate::error::{ErrorCode, LispError};
use crate::function::Function;
use crate::value::{Tag, Value};
use std::rc::Rc;

/// A guard predicate: given the function being called and either a single
/// argument or the whole argument list (depending on `Guard::applicability`),
/// returns `Ok(())` on pass or `Err((index, message))` on failure. `index`,
/// when present, is the position within the full argument list that should
/// receive the blame for the error's source span; when absent the runner
/// falls back to the span of the value the predicate was actually given.
pub type GuardPredicate = Rc<dyn Fn(&Function, &Value) -> Result<(), (Option<usize>, String)>>;

/// A single precondition. `applicability` follows the convention: `n > 0`
/// checks only the n-th argument (1-based), `n == 0` checks every argument
/// independently stopping at the first failure, `n == -1` checks all
/// arguments at once as a single Qexpr.
#[derive(Clone)]
pub struct Guard {
    pub applicability: i32,
    pub predicate: GuardPredicate,
    pub code: ErrorCode,
}

impl Guard {
    pub fn new(applicability: i32, code: ErrorCode, predicate: GuardPredicate) -> Self {
        Guard {
            applicability,
            code,
            predicate,
        }
    }
}

/// Runs the two universal arity guards, then the function's own guards, in
/// order, stopping at the first failure. A third universal guard existed in
/// the source to catch a builtin defined with neither an accumulator nor a
/// function pointer ("pointer-not-null"); `Dispatch` makes that state
/// unrepresentable here, so it is not reproduced.
pub fn run_guards(func: &Function, args: &[Value]) -> Result<(), LispError> {
    for g in universal_guards() {
        check_one(func, args, &g)?;
    }
    for g in &func.guards {
        check_one(func, args, g)?;
    }
    Ok(())
}

fn universal_guards() -> Vec<Guard> {
    vec![
        Guard::new(
            -1,
            ErrorCode::TooManyArgs,
            Rc::new(|func: &Function, whole: &Value| {
                let len = whole.len().unwrap_or(0) as i32;
                if func.max_argc != -1 && len > func.max_argc {
                    return Err((None, format!("takes {} arguments at maximum", func.max_argc)));
                }
                Ok(())
            }),
        ),
        Guard::new(
            -1,
            ErrorCode::TooFewArgs,
            Rc::new(|func: &Function, whole: &Value| {
                let len = whole.len().unwrap_or(0) as i32;
                if func.min_argc != -1 && len < func.min_argc {
                    return Err((None, format!("takes {} arguments at minimum", func.min_argc)));
                }
                Ok(())
            }),
        ),
    ]
}

fn check_one(func: &Function, args: &[Value], g: &Guard) -> Result<(), LispError> {
    let (result, fallback_span) = if g.applicability == 0 {
        let mut result = Ok(());
        let mut span = None;
        for a in args {
            if let Err(e) = (g.predicate)(func, a) {
                result = Err(e);
                span = a.span;
                break;
            }
        }
        (result, span)
    } else if g.applicability > 0 {
        let idx = (g.applicability - 1) as usize;
        match args.get(idx) {
            Some(a) => ((g.predicate)(func, a), a.span),
            None => (Ok(()), None),
        }
    } else {
        let whole = Value::qexpr(args.to_vec());
        ((g.predicate)(func, &whole), None)
    };

    if let Err((idx, msg)) = result {
        let span = idx.and_then(|i| args.get(i)).and_then(|v| v.span).or(fallback_span);
        return Err(LispError::with_location(g.code, msg, span));
    }
    Ok(())
}

// ===== Builtin-specific predicates =====

pub fn is_numeric() -> GuardPredicate {
    Rc::new(|_f, v| {
        if v.is_numeric() {
            Ok(())
        } else {
            Err((None, "must be numeric".to_string()))
        }
    })
}

pub fn is_integral() -> GuardPredicate {
    Rc::new(|_f, v| {
        if v.is_integral() {
            Ok(())
        } else {
            Err((None, "must be integral".to_string()))
        }
    })
}

pub fn is_positive() -> GuardPredicate {
    Rc::new(|_f, v| {
        if v.sign() < 0 {
            Err((None, "must be positive".to_string()))
        } else {
            Ok(())
        }
    })
}

/// Checks every argument from index 1 onward (skipping the dividend) for a
/// zero value. Intended for `applicability = -1` guards on `/` and `%`. A
/// lone argument has no dividend to skip: the accumulator fold treats it as
/// the divisor against the neutral element, so index 0 is checked too.
pub fn divisor_nonzero() -> GuardPredicate {
    Rc::new(|_f, whole| {
        let items = whole.as_list().unwrap_or(&[]);
        let skip = if items.len() == 1 { 0 } else { 1 };
        for (i, v) in items.iter().enumerate().skip(skip) {
            if v.is_zero() {
                return Err((Some(i), "divisor must not be 0".to_string()));
            }
        }
        Ok(())
    })
}

pub fn fits_in_ulong() -> GuardPredicate {
    Rc::new(|_f, v| match v.tag() {
        Tag::Num => {
            if v.sign() < 0 {
                Err((None, "must be positive".to_string()))
            } else {
                Ok(())
            }
        }
        Tag::BigNum => {
            let n = v.as_bignum().expect("tag checked");
            if *n > num_bigint::BigInt::from(u64::MAX) {
                Err((None, "is too large".to_string()))
            } else {
                Ok(())
            }
        }
        _ => Err((None, "must be integral".to_string())),
    })
}

pub fn is_list() -> GuardPredicate {
    Rc::new(|_f, v| {
        if v.is_list() {
            Ok(())
        } else {
            Err((None, "must be a list".to_string()))
        }
    })
}

pub fn is_str() -> GuardPredicate {
    Rc::new(|_f, v| {
        if v.tag() == Tag::Str {
            Ok(())
        } else {
            Err((None, "must be a string".to_string()))
        }
    })
}

pub fn is_func() -> GuardPredicate {
    Rc::new(|_f, v| {
        if v.tag() == Tag::Func {
            Ok(())
        } else {
            Err((None, "must be a function".to_string()))
        }
    })
}

pub fn is_qexpr() -> GuardPredicate {
    Rc::new(|_f, v| {
        if v.tag() == Tag::Qexpr {
            Ok(())
        } else {
            Err((None, "must be a list".to_string()))
        }
    })
}

pub fn min_len(min: usize) -> GuardPredicate {
    Rc::new(move |_f, v| {
        if v.len().unwrap_or(0) < min {
            Err((None, format!("must have a length of at least {min}")))
        } else {
            Ok(())
        }
    })
}

/// `applicability = -1` guard ensuring every argument shares the leading
/// argument's tag (used by `join`, which must not mix lists and strings).
pub fn all_same_type() -> GuardPredicate {
    Rc::new(|_f, whole| {
        let items = whole.as_list().unwrap_or(&[]);
        let Some(first) = items.first() else {
            return Ok(());
        };
        let first_tag = first.tag();
        for (i, v) in items.iter().enumerate().skip(1) {
            if v.tag() != first_tag {
                return Err((Some(i), format!("must be a list of {first_tag}")));
            }
        }
        Ok(())
    })
}

/// `applicability = -1` guard for `def`/`=`/`override`: the symbol Qexpr
/// (first argument) must name exactly as many symbols as values follow.
pub fn equal_lens() -> GuardPredicate {
    Rc::new(|_f, whole| {
        let items = whole.as_list().unwrap_or(&[]);
        let symbols_len = items.first().and_then(|v| v.len()).unwrap_or(0);
        let values_len = items.len().saturating_sub(1);
        if values_len < symbols_len {
            return Err((
                None,
                format!("length must match: {symbols_len} symbol(s) and {values_len} value(s)"),
            ));
        }
        if values_len > symbols_len {
            return Err((
                None,
                format!("length must match: {symbols_len} symbol(s) and {values_len} value(s)"),
            ));
        }
        Ok(())
    })
}
