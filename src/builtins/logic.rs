//! Short-circuit boolean operators: `&& ||`
//!
//! `!` is not duplicated here: the catalog's `!` symbol is claimed by
//! arithmetic factorial, which the concrete scenarios exercise directly.

use crate::env::Environment;
use crate::error::{ErrorCode, LispError};
use crate::function::Function;
use crate::guard::Guard;
use crate::value::{Tag, Value};
use std::rc::Rc;

fn bool_guard() -> Guard {
    Guard::new(
        0,
        ErrorCode::BadOperand,
        std::rc::Rc::new(|_f, v| {
            if v.tag() == Tag::Bool {
                Ok(())
            } else {
                Err((None, "must be a bool".to_string()))
            }
        }),
    )
}

fn builtin_and(_env: &Rc<Environment>, args: &[Value]) -> Result<Value, LispError> {
    Ok(Value::bool(args.iter().all(|v| v.as_bool() == Some(true))))
}

fn builtin_or(_env: &Rc<Environment>, args: &[Value]) -> Result<Value, LispError> {
    Ok(Value::bool(args.iter().any(|v| v.as_bool() == Some(true))))
}

pub fn register(env: &Rc<Environment>) {
    env.put(
        "&&",
        Value::func(Function::builtin("&&", 1, -1, builtin_and).with_guards(vec![bool_guard()])),
    );
    env.put(
        "||",
        Value::func(Function::builtin("||", 1, -1, builtin_or).with_guards(vec![bool_guard()])),
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
    fn and_short_circuits_to_false() {
        let env = Environment::new();
        register(&env);
        let and = lookup(&env, "&&");
        let result = apply(&env, and, vec![Value::bool(true), Value::bool(false)]).unwrap();
        assert_eq!(result.as_bool(), Some(false));
    }

    #[test]
    fn or_is_true_if_any_true() {
        let env = Environment::new();
        register(&env);
        let or = lookup(&env, "||");
        let result = apply(&env, or, vec![Value::bool(false), Value::bool(true)]).unwrap();
        assert_eq!(result.as_bool(), Some(true));
    }
}
