//! Arithmetic operators: `+ - * / % ^ !`
//!
//! `+ - * /` are accumulator builtins over the numeric tower (Num -> BigNum
//! -> Dbl); `%` and `^` are plain two-argument builtins; `!` is unary.

use crate::env::Environment;
use crate::error::{ErrorCode, LispError};
use crate::eval::demote_if_small;
use crate::function::{AccumulatorOps, Function};
use crate::guard::{self, Guard};
use crate::value::{Tag, Value};
use num_bigint::BigInt;
use std::rc::Rc;

fn numeric_guard() -> Guard {
    Guard::new(0, ErrorCode::BadOperand, guard::is_numeric())
}

fn builtin_mod(_env: &Rc<Environment>, args: &[Value]) -> Result<Value, LispError> {
    let a = args[0].as_num().expect("guarded integral");
    let b = args[1].as_num().expect("guarded integral");
    Ok(Value::num(a % b))
}

fn builtin_pow(_env: &Rc<Environment>, args: &[Value]) -> Result<Value, LispError> {
    let base = &args[0];
    let exp = args[1].as_num().expect("guarded fits_in_ulong") as u64;

    if base.tag() == Tag::Dbl {
        let b = base.as_dbl_widened().unwrap();
        return Ok(Value::dbl(b.powf(exp as f64)));
    }

    let base_big = match base.tag() {
        Tag::BigNum => base.as_bignum().unwrap().clone(),
        _ => BigInt::from(base.as_num().unwrap()),
    };
    Ok(demote_if_small(base_big.pow(exp as u32)))
}

fn builtin_factorial(_env: &Rc<Environment>, args: &[Value]) -> Result<Value, LispError> {
    let n = args[0].as_num().expect("guarded fits_in_ulong") as u64;
    let mut acc = BigInt::from(1);
    for i in 2..=n {
        acc *= BigInt::from(i);
    }
    Ok(demote_if_small(acc))
}

pub fn register(env: &Rc<Environment>) {
    let overflow_add: Option<fn(i64, i64) -> bool> = Some(|a: i64, b: i64| a.checked_add(b).is_none());
    let overflow_sub: Option<fn(i64, i64) -> bool> = Some(|a: i64, b: i64| a.checked_sub(b).is_none());
    let overflow_mul: Option<fn(i64, i64) -> bool> = Some(|a: i64, b: i64| a.checked_mul(b).is_none());

    env.put(
        "+",
        Value::func(
            Function::accumulator(
                "+",
                1,
                -1,
                true,
                Value::num(0),
                AccumulatorOps {
                    op_num: |a, b| a.wrapping_add(b),
                    op_bignum: |a, b| a + b,
                    op_dbl: |a, b| a + b,
                    overflow: overflow_add,
                },
            )
            .with_guards(vec![numeric_guard()]),
        ),
    );

    env.put(
        "-",
        Value::func(
            Function::accumulator(
                "-",
                1,
                -1,
                false,
                Value::num(0),
                AccumulatorOps {
                    op_num: |a, b| a.wrapping_sub(b),
                    op_bignum: |a, b| a - b,
                    op_dbl: |a, b| a - b,
                    overflow: overflow_sub,
                },
            )
            .with_guards(vec![numeric_guard()]),
        ),
    );

    env.put(
        "*",
        Value::func(
            Function::accumulator(
                "*",
                1,
                -1,
                true,
                Value::num(1),
                AccumulatorOps {
                    op_num: |a, b| a.wrapping_mul(b),
                    op_bignum: |a, b| a * b,
                    op_dbl: |a, b| a * b,
                    overflow: overflow_mul,
                },
            )
            .with_guards(vec![numeric_guard()]),
        ),
    );

    env.put(
        "/",
        Value::func(
            Function::accumulator(
                "/",
                1,
                -1,
                false,
                Value::num(1),
                AccumulatorOps {
                    op_num: |a, b| a / b,
                    op_bignum: |a, b| a / b,
                    op_dbl: |a, b| a / b,
                    overflow: None,
                },
            )
            .with_guards(vec![
                numeric_guard(),
                Guard::new(-1, ErrorCode::DivZero, guard::divisor_nonzero()),
            ]),
        ),
    );

    env.put(
        "%",
        Value::func(
            Function::builtin("%", 2, 2, builtin_mod).with_guards(vec![
                Guard::new(0, ErrorCode::BadOperand, guard::is_integral()),
                Guard::new(-1, ErrorCode::DivZero, guard::divisor_nonzero()),
            ]),
        ),
    );

    env.put(
        "^",
        Value::func(Function::builtin("^", 2, 2, builtin_pow).with_guards(vec![
            Guard::new(1, ErrorCode::BadOperand, guard::is_numeric()),
            Guard::new(2, ErrorCode::BadOperand, guard::fits_in_ulong()),
        ])),
    );

    env.put(
        "!",
        Value::func(
            Function::builtin("!", 1, 1, builtin_factorial).with_guards(vec![
                Guard::new(1, ErrorCode::BadOperand, guard::is_integral()),
                Guard::new(1, ErrorCode::BadOperand, guard::is_positive()),
                Guard::new(1, ErrorCode::BadOperand, guard::fits_in_ulong()),
            ]),
        ),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::apply;

    fn lookup(env: &Rc<Environment>, name: &str) -> Function {
        env.get(name).unwrap().as_func().unwrap().clone()
    }

    #[test]
    fn add_folds_and_overflows_into_bignum() {
        let env = Environment::new();
        register(&env);
        let plus = lookup(&env, "+");
        let result = apply(&env, plus.clone(), vec![Value::num(1), Value::num(2)]).unwrap();
        assert_eq!(result.as_num(), Some(3));

        let overflowed = apply(&env, plus, vec![Value::num(i64::MAX), Value::num(1)]).unwrap();
        assert_eq!(overflowed.tag(), Tag::BigNum);
    }

    #[test]
    fn add_with_zero_args_is_too_few() {
        let env = Environment::new();
        register(&env);
        let plus = lookup(&env, "+");
        let err = apply(&env, plus, vec![]).unwrap_err();
        assert_eq!(err.code, ErrorCode::TooFewArgs);
    }

    #[test]
    fn division_of_a_lone_zero_reports_div_zero_without_panicking() {
        let env = Environment::new();
        register(&env);
        let div = lookup(&env, "/");
        let err = apply(&env, div, vec![Value::num(0)]).unwrap_err();
        assert_eq!(err.code, ErrorCode::DivZero);
    }

    #[test]
    fn unary_minus_negates() {
        let env = Environment::new();
        register(&env);
        let minus = lookup(&env, "-");
        let result = apply(&env, minus, vec![Value::num(5)]).unwrap();
        assert_eq!(result.as_num(), Some(-5));
    }

    #[test]
    fn division_by_zero_is_divzero() {
        let env = Environment::new();
        register(&env);
        let div = lookup(&env, "/");
        let err = apply(&env, div, vec![Value::num(10), Value::num(0)]).unwrap_err();
        assert_eq!(err.code, ErrorCode::DivZero);
    }

    #[test]
    fn factorial_of_21_is_bignum() {
        let env = Environment::new();
        register(&env);
        let bang = lookup(&env, "!");
        let result = apply(&env, bang, vec![Value::num(21)]).unwrap();
        assert_eq!(result.tag(), Tag::BigNum);
        assert_eq!(result.to_string(), "51090942171709440000");
    }

    #[test]
    fn mixed_num_and_dbl_promotes_to_dbl() {
        let env = Environment::new();
        register(&env);
        let plus = lookup(&env, "+");
        let result = apply(&env, plus, vec![Value::dbl(1.0), Value::num(2)]).unwrap();
        assert_eq!(result.to_string(), "3.0");
    }
}
