// ABOUTME: Control-flow builtins: `if` and `loop`

use crate::env::Environment;
use crate::error::{ErrorCode, LispError};
use crate::eval::eval_result;
use crate::function::Function;
use crate::guard::Guard;
use crate::value::{Tag, Value};
use std::rc::Rc;

fn cond_is_bool() -> Guard {
    Guard::new(
        1,
        ErrorCode::BadOperand,
        std::rc::Rc::new(|_f, v| {
            if v.tag() == Tag::Bool {
                Ok(())
            } else {
                Err((None, "condition must be a bool".to_string()))
            }
        }),
    )
}

/// `(if cond then else)`: `then`/`else` are Qexpr bodies, each wrapped in a
/// Sexpr and evaluated in `env` the way `eval` evaluates a Qexpr argument.
fn builtin_if(env: &Rc<Environment>, args: &[Value]) -> Result<Value, LispError> {
    let cond = args[0].as_bool().expect("guarded bool");
    let branch = if cond { &args[1] } else { &args[2] };
    eval_branch(env, branch)
}

/// `(loop cond body)`: evaluates `body` while `cond` holds, returning the
/// last body value (or Nil if the loop never ran).
fn builtin_loop(env: &Rc<Environment>, args: &[Value]) -> Result<Value, LispError> {
    let cond_expr = &args[0];
    let body = &args[1];
    let mut result = Value::nil();
    loop {
        let cond_val = eval_branch(env, cond_expr)?;
        if cond_val.as_bool() != Some(true) {
            break;
        }
        result = eval_branch(env, body)?;
    }
    Ok(result)
}

fn eval_branch(env: &Rc<Environment>, branch: &Value) -> Result<Value, LispError> {
    let items = branch.as_list().unwrap_or(std::slice::from_ref(branch)).to_vec();
    eval_result(env, &Value::sexpr(items).with_span(branch.span))
}

pub fn register(env: &Rc<Environment>) {
    env.put(
        "if",
        Value::func(Function::builtin("if", 3, 3, builtin_if).with_guards(vec![cond_is_bool()])),
    );
    env.put("loop", Value::func(Function::builtin("loop", 2, 2, builtin_loop)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::apply;
    use crate::function::Function;

    fn lookup(env: &Rc<Environment>, name: &str) -> Function {
        env.get(name).unwrap().as_func().unwrap().clone()
    }

    #[test]
    fn if_picks_then_branch() {
        let env = Environment::new();
        register(&env);
        let iff = lookup(&env, "if");
        let then_branch = Value::qexpr(vec![Value::num(1)]);
        let else_branch = Value::qexpr(vec![Value::num(2)]);
        let result = apply(&env, iff, vec![Value::bool(true), then_branch, else_branch]).unwrap();
        assert_eq!(result.as_num(), Some(1));
    }

    #[test]
    fn if_picks_else_branch() {
        let env = Environment::new();
        register(&env);
        let iff = lookup(&env, "if");
        let then_branch = Value::qexpr(vec![Value::num(1)]);
        let else_branch = Value::qexpr(vec![Value::num(2)]);
        let result = apply(&env, iff, vec![Value::bool(false), then_branch, else_branch]).unwrap();
        assert_eq!(result.as_num(), Some(2));
    }
}
