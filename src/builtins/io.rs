//! I/O and source inclusion: `print error load`

use crate::driver;
use crate::env::Environment;
use crate::error::{ErrorCode, LispError};
use crate::function::Function;
use crate::guard::{self, Guard};
use crate::value::Value;
use std::rc::Rc;

fn builtin_print(_env: &Rc<Environment>, args: &[Value]) -> Result<Value, LispError> {
    let rendered: Vec<String> = args.iter().map(|v| v.to_string()).collect();
    println!("{}", rendered.join(" "));
    Ok(Value::nil())
}

fn builtin_error(_env: &Rc<Environment>, args: &[Value]) -> Result<Value, LispError> {
    let message = args[0].as_str().expect("guarded string");
    Err(LispError::new(ErrorCode::LispUser, message.to_string()))
}

fn builtin_load(env: &Rc<Environment>, args: &[Value]) -> Result<Value, LispError> {
    let mut result = Value::nil();
    for arg in args {
        let path = arg.as_str().expect("guarded string");
        result = driver::eval_file(env, path)?;
    }
    Ok(result)
}

pub fn register(env: &Rc<Environment>) {
    env.put("print", Value::func(Function::builtin("print", 0, -1, builtin_print)));
    env.put(
        "error",
        Value::func(Function::builtin("error", 1, 1, builtin_error).with_guards(vec![Guard::new(
            1,
            ErrorCode::BadOperand,
            guard::is_str(),
        )])),
    );
    env.put(
        "load",
        Value::func(Function::builtin("load", 1, -1, builtin_load).with_guards(vec![Guard::new(
            0,
            ErrorCode::BadOperand,
            guard::is_str(),
        )])),
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
    fn error_builtin_short_circuits_with_lisp_user_code() {
        let env = Environment::new();
        register(&env);
        let error_fn = lookup(&env, "error");
        let err = apply(&env, error_fn, vec![Value::str("boom")]).unwrap_err();
        assert_eq!(err.code, ErrorCode::LispUser);
        assert_eq!(err.message, "boom");
    }

    #[test]
    fn load_reports_enoent_for_missing_file() {
        let env = Environment::new();
        register(&env);
        let load = lookup(&env, "load");
        let err = apply(&env, load, vec![Value::str("/nonexistent/missing.lisp")]).unwrap_err();
        assert_eq!(err.code, ErrorCode::EnoentFile);
    }
}
