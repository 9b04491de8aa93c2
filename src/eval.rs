// ABOUTME: Tree-walking evaluator: symbol resolution, sexpr application, accumulator folds

use crate::env::Environment;
use crate::error::{ErrorCode, LispError};
use crate::function::{AccumulatorOps, Dispatch, Function};
use crate::guard;
use crate::value::{Tag, Value};
use num_bigint::BigInt;
use num_traits::ToPrimitive;
use std::rc::Rc;

/// Evaluates `value` in `env`, converting any propagated [`LispError`] into
/// a displayable `Err`-tagged value. Nested evaluation uses [`eval_result`]
/// directly so errors short-circuit without being materialized as values.
pub fn eval(env: &Rc<Environment>, value: &Value) -> Value {
    match eval_result(env, value) {
        Ok(v) => v,
        Err(e) => Value::err(e),
    }
}

pub fn eval_result(env: &Rc<Environment>, value: &Value) -> Result<Value, LispError> {
    match value.tag() {
        Tag::Sym => {
            let name = value.as_sym().expect("tag checked");
            env.get(name)
                .map(|v| v.with_span(value.span))
                .ok_or_else(|| {
                    LispError::with_location(ErrorCode::BadSymbol, format!("unknown symbol '{name}'"), value.span)
                })
        }
        Tag::Sexpr => {
            let items = value.as_list().expect("tag checked").to_vec();
            eval_sexpr(env, &items, value.span)
        }
        _ => Ok(value.clone()),
    }
}

fn eval_sexpr(env: &Rc<Environment>, items: &[Value], span: Option<crate::span::Span>) -> Result<Value, LispError> {
    if items.is_empty() {
        return Ok(Value::nil());
    }

    let mut vals = Vec::with_capacity(items.len());
    for item in items {
        vals.push(eval_result(env, item)?);
    }

    if let Some(last) = vals.last() {
        env.def(".", last.clone());
    }

    let head = vals[0].clone();
    if let Some(func) = head.as_func() {
        let func = func.clone();
        let args = vals[1..].to_vec();
        apply(env, func, args)
    } else {
        Ok(vals.into_iter().last().unwrap_or_else(|| Value::nil().with_span(span)))
    }
}

/// Concatenates the function's partial-application buffer with the newly
/// supplied arguments, runs guards against the full list, then dispatches.
pub fn apply(env: &Rc<Environment>, func: Function, args: Vec<Value>) -> Result<Value, LispError> {
    let mut all_args = func.args.clone();
    all_args.extend(args);

    guard::run_guards(&func, &all_args)?;

    match &func.dispatch {
        Dispatch::Lisp {
            formals,
            body,
            captured_scope,
        } => apply_lisp(&func, formals, body, captured_scope, all_args),
        Dispatch::Builtin(f) => f(env, &all_args),
        Dispatch::Accumulator(ops) => apply_accumulator(&func, ops, all_args),
    }
}

fn apply_lisp(
    func: &Function,
    formals: &Value,
    body: &Value,
    captured_scope: &Rc<Environment>,
    args: Vec<Value>,
) -> Result<Value, LispError> {
    let formal_items = formals.as_list().unwrap_or(&[]);
    let has_variadic =
        formal_items.len() >= 2 && formal_items[formal_items.len() - 2].as_sym() == Some("&");
    let fixed_count = if has_variadic { formal_items.len() - 2 } else { formal_items.len() };

    if args.len() > fixed_count && !has_variadic {
        return Err(LispError::new(
            ErrorCode::TooManyArgs,
            format!("takes {fixed_count} arguments at maximum"),
        ));
    }

    if args.len() < fixed_count {
        let mut partial = func.clone();
        partial.args = args;
        return Ok(Value::func(partial));
    }

    let scope = Environment::with_parent(captured_scope.clone());
    for (formal, arg) in formal_items.iter().take(fixed_count).zip(args.iter()) {
        let name = formal.as_sym().unwrap_or_default();
        scope.put(name, arg.clone());
    }
    if has_variadic {
        let tail_name = formal_items[formal_items.len() - 1].as_sym().unwrap_or_default();
        let rest = args[fixed_count..].to_vec();
        scope.put(tail_name, Value::qexpr(rest));
    }

    let body_items = body.as_list().unwrap_or(&[]).to_vec();
    eval_sexpr(&scope, &body_items, body.span)
}

fn apply_accumulator(func: &Function, ops: &AccumulatorOps, args: Vec<Value>) -> Result<Value, LispError> {
    if args.is_empty() {
        // Guarded to be unreachable for non-neutral accumulators; neutral
        // accumulators (+, *) reach here with init_neutral already implied
        // by the registered neutral element.
        return Ok(func.neutral.clone().unwrap_or_else(Value::nil));
    }

    if args.len() == 1 {
        let seed = func.neutral.clone().unwrap_or_else(|| Value::num(0));
        return Ok(accumulator_step(&seed, &args[0], ops));
    }

    let mut acc = args[0].clone();
    for arg in &args[1..] {
        acc = accumulator_step(&acc, arg, ops);
    }
    Ok(acc)
}

/// Widest-type-wins promotion: Dbl > BigNum > Num, with overflow detection
/// promoting a `Num` pair to `BigNum` before the step is applied.
fn accumulator_step(acc: &Value, arg: &Value, ops: &AccumulatorOps) -> Value {
    if acc.tag() == Tag::Dbl || arg.tag() == Tag::Dbl {
        let a = acc.as_dbl_widened().unwrap_or(0.0);
        let b = arg.as_dbl_widened().unwrap_or(0.0);
        return Value::dbl((ops.op_dbl)(a, b));
    }

    if acc.tag() == Tag::BigNum || arg.tag() == Tag::BigNum {
        let a = to_bigint(acc);
        let b = to_bigint(arg);
        return Value::bignum((ops.op_bignum)(&a, &b));
    }

    let a = acc.as_num().unwrap_or(0);
    let b = arg.as_num().unwrap_or(0);
    if ops.overflow.is_some_and(|f| f(a, b)) {
        let result = (ops.op_bignum)(&BigInt::from(a), &BigInt::from(b));
        return Value::bignum(result);
    }
    Value::num((ops.op_num)(a, b))
}

fn to_bigint(v: &Value) -> BigInt {
    match v.tag() {
        Tag::BigNum => v.as_bignum().expect("tag checked").clone(),
        Tag::Num => BigInt::from(v.as_num().expect("tag checked")),
        _ => BigInt::from(0),
    }
}

/// Narrows a `BigNum` back to `Num` when the value fits, used by `^`/`!`
/// after a computation that started in `BigInt` space.
pub fn demote_if_small(n: BigInt) -> Value {
    match n.to_i64() {
        Some(i) => Value::num(i),
        None => Value::bignum(n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::Environment;
    use crate::guard::Guard;

    fn root_with(name: &str, f: Function) -> Rc<Environment> {
        let env = Environment::new();
        env.put(name, Value::func(f));
        env
    }

    #[test]
    fn symbol_lookup_resolves() {
        let env = Environment::new();
        env.put("x", Value::num(5));
        let result = eval(&env, &Value::sym("x"));
        assert_eq!(result.as_num(), Some(5));
    }

    #[test]
    fn unbound_symbol_is_bad_symbol() {
        let env = Environment::new();
        let result = eval(&env, &Value::sym("nope"));
        assert_eq!(result.as_err().unwrap().code, ErrorCode::BadSymbol);
    }

    #[test]
    fn empty_sexpr_is_nil() {
        let env = Environment::new();
        let result = eval(&env, &Value::sexpr(vec![]));
        assert_eq!(result.tag(), Tag::Nil);
    }

    #[test]
    fn sexpr_without_leading_func_returns_last_value() {
        let env = Environment::new();
        let result = eval(&env, &Value::sexpr(vec![Value::num(1), Value::num(2)]));
        assert_eq!(result.as_num(), Some(2));
    }

    #[test]
    fn accumulator_add_folds_left_to_right() {
        let ops = AccumulatorOps {
            op_num: |a, b| a + b,
            op_bignum: |a, b| a + b,
            op_dbl: |a, b| a + b,
            overflow: Some(|a, b| a.checked_add(b).is_none()),
        };
        let func = Function::accumulator("+", 0, -1, true, Value::num(0), ops).with_guards(vec![Guard::new(
            0,
            ErrorCode::BadOperand,
            guard::is_numeric(),
        )]);
        let env = root_with("+", func.clone());
        let result = apply(&env, func, vec![Value::num(1), Value::num(2), Value::num(3)]).unwrap();
        assert_eq!(result.as_num(), Some(6));
    }

    #[test]
    fn accumulator_empty_args_returns_neutral() {
        let ops = AccumulatorOps {
            op_num: |a, b| a + b,
            op_bignum: |a, b| a + b,
            op_dbl: |a, b| a + b,
            overflow: Some(|a, b| a.checked_add(b).is_none()),
        };
        let func = Function::accumulator("+", 0, -1, true, Value::num(0), ops);
        let env = Environment::new();
        let result = apply(&env, func, vec![]).unwrap();
        assert_eq!(result.as_num(), Some(0));
    }

    #[test]
    fn accumulator_overflow_promotes_to_bignum() {
        let ops = AccumulatorOps {
            op_num: |a, b| a.wrapping_add(b),
            op_bignum: |a, b| a + b,
            op_dbl: |a, b| a + b,
            overflow: Some(|a, b| a.checked_add(b).is_none()),
        };
        let func = Function::accumulator("+", 0, -1, true, Value::num(0), ops);
        let env = Environment::new();
        let result = apply(&env, func, vec![Value::num(i64::MAX), Value::num(1)]).unwrap();
        assert_eq!(result.tag(), Tag::BigNum);
    }

    #[test]
    fn lambda_partial_application_returns_new_func() {
        let formals = Value::qexpr(vec![Value::sym("x"), Value::sym("y")]);
        let body = Value::qexpr(vec![Value::sym("+"), Value::sym("x"), Value::sym("y")]);
        let root = Environment::new();
        let func = Function::lambda(formals, body, root.clone());
        let result = apply(&root, func, vec![Value::num(10)]).unwrap();
        assert!(result.as_func().unwrap().is_lisp());
        assert_eq!(result.as_func().unwrap().args.len(), 1);
    }

    #[test]
    fn lambda_full_application_evaluates_body() {
        let ops = AccumulatorOps {
            op_num: |a, b| a + b,
            op_bignum: |a, b| a + b,
            op_dbl: |a, b| a + b,
            overflow: Some(|a, b| a.checked_add(b).is_none()),
        };
        let plus = Function::accumulator("+", 0, -1, true, Value::num(0), ops);
        let root = Environment::new();
        root.put("+", Value::func(plus));

        let formals = Value::qexpr(vec![Value::sym("x"), Value::sym("y")]);
        let body = Value::qexpr(vec![Value::sym("+"), Value::sym("x"), Value::sym("y")]);
        let func = Function::lambda(formals, body, root.clone());

        let result = apply(&root, func, vec![Value::num(10), Value::num(5)]).unwrap();
        assert_eq!(result.as_num(), Some(15));
    }

    #[test]
    fn variadic_tail_collects_remaining_args() {
        let formals = Value::qexpr(vec![Value::sym("x"), Value::sym("&"), Value::sym("rest")]);
        let body = Value::qexpr(vec![Value::sym("rest")]);
        let root = Environment::new();
        let func = Function::lambda(formals, body, root.clone());
        let result = apply(&root, func, vec![Value::num(1), Value::num(2), Value::num(3)]).unwrap();
        assert_eq!(result.as_list().unwrap().len(), 2);
    }
}
