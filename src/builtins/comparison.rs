//! Comparison operators: `== != < > <= >=`

use crate::env::Environment;
use crate::error::{ErrorCode, LispError};
use crate::function::Function;
use crate::guard::Guard;
use crate::value::{Tag, Value};
use std::rc::Rc;

fn ordering(a: &Value, b: &Value) -> Option<std::cmp::Ordering> {
    if a.is_numeric() && b.is_numeric() {
        return a.as_dbl_widened().unwrap().partial_cmp(&b.as_dbl_widened().unwrap());
    }
    if a.tag() == Tag::Str && b.tag() == Tag::Str {
        return a.as_str().unwrap().partial_cmp(b.as_str().unwrap());
    }
    None
}

fn comparable_guard() -> Guard {
    Guard::new(
        0,
        ErrorCode::BadOperand,
        std::rc::Rc::new(|_f, v| {
            if v.is_numeric() || v.tag() == Tag::Str {
                Ok(())
            } else {
                Err((None, "must be numeric or a string".to_string()))
            }
        }),
    )
}

fn builtin_eq(_env: &Rc<Environment>, args: &[Value]) -> Result<Value, LispError> {
    Ok(Value::bool(Value::values_equal(&args[0], &args[1])))
}

fn builtin_ne(_env: &Rc<Environment>, args: &[Value]) -> Result<Value, LispError> {
    Ok(Value::bool(!Value::values_equal(&args[0], &args[1])))
}

fn builtin_lt(_env: &Rc<Environment>, args: &[Value]) -> Result<Value, LispError> {
    let ord = ordering(&args[0], &args[1]).ok_or_else(|| {
        LispError::new(ErrorCode::BadOperand, "operands must be of the same comparable type")
    })?;
    Ok(Value::bool(ord.is_lt()))
}

fn builtin_gt(_env: &Rc<Environment>, args: &[Value]) -> Result<Value, LispError> {
    let ord = ordering(&args[0], &args[1]).ok_or_else(|| {
        LispError::new(ErrorCode::BadOperand, "operands must be of the same comparable type")
    })?;
    Ok(Value::bool(ord.is_gt()))
}

fn builtin_le(_env: &Rc<Environment>, args: &[Value]) -> Result<Value, LispError> {
    let ord = ordering(&args[0], &args[1]).ok_or_else(|| {
        LispError::new(ErrorCode::BadOperand, "operands must be of the same comparable type")
    })?;
    Ok(Value::bool(ord.is_le()))
}

fn builtin_ge(_env: &Rc<Environment>, args: &[Value]) -> Result<Value, LispError> {
    let ord = ordering(&args[0], &args[1]).ok_or_else(|| {
        LispError::new(ErrorCode::BadOperand, "operands must be of the same comparable type")
    })?;
    Ok(Value::bool(ord.is_ge()))
}

pub fn register(env: &Rc<Environment>) {
    env.put("==", Value::func(Function::builtin("==", 2, 2, builtin_eq)));
    env.put("!=", Value::func(Function::builtin("!=", 2, 2, builtin_ne)));
    env.put(
        "<",
        Value::func(Function::builtin("<", 2, 2, builtin_lt).with_guards(vec![comparable_guard()])),
    );
    env.put(
        ">",
        Value::func(Function::builtin(">", 2, 2, builtin_gt).with_guards(vec![comparable_guard()])),
    );
    env.put(
        "<=",
        Value::func(Function::builtin("<=", 2, 2, builtin_le).with_guards(vec![comparable_guard()])),
    );
    env.put(
        ">=",
        Value::func(Function::builtin(">=", 2, 2, builtin_ge).with_guards(vec![comparable_guard()])),
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
    fn equality_across_num_and_dbl() {
        let env = Environment::new();
        register(&env);
        let eq = lookup(&env, "==");
        let result = apply(&env, eq, vec![Value::num(2), Value::dbl(2.0)]).unwrap();
        assert_eq!(result.as_bool(), Some(true));
    }

    #[test]
    fn string_ordering() {
        let env = Environment::new();
        register(&env);
        let lt = lookup(&env, "<");
        let result = apply(&env, lt, vec![Value::str("a"), Value::str("b")]).unwrap();
        assert_eq!(result.as_bool(), Some(true));
    }

    #[test]
    fn ordering_rejects_mixed_types() {
        let env = Environment::new();
        register(&env);
        let lt = lookup(&env, "<");
        let err = apply(&env, lt, vec![Value::num(1), Value::str("a")]).unwrap_err();
        assert_eq!(err.code, ErrorCode::BadOperand);
    }
}
