//! Inspection builtins: `debug-env debug-fun debug-val`

use crate::env::Environment;
use crate::error::LispError;
use crate::eval::eval_result;
use crate::function::Function;
use crate::value::{Tag, Value};
use std::rc::Rc;

fn builtin_debug_env(env: &Rc<Environment>, _args: &[Value]) -> Result<Value, LispError> {
    Ok(env.list())
}

fn builtin_debug_fun(_env: &Rc<Environment>, args: &[Value]) -> Result<Value, LispError> {
    let func = args[0].as_func().expect("guarded func");
    let mut items = vec![func_formals(func), Value::qexpr(func.args.clone())];
    if let Some(body) = func_body(func) {
        items.push(body);
    }
    Ok(Value::qexpr(items))
}

fn func_formals(func: &Function) -> Value {
    match &func.dispatch {
        crate::function::Dispatch::Lisp { formals, .. } => formals.clone(),
        _ => Value::qexpr(vec![]),
    }
}

fn func_body(func: &Function) -> Option<Value> {
    match &func.dispatch {
        crate::function::Dispatch::Lisp { body, .. } => Some(body.clone()),
        _ => None,
    }
}

/// Evaluates each entry of `list`, pairing the symbol's static type with its
/// value, and the result's type with the result, either flat (one symbol)
/// or one Qexpr per symbol (multiple).
fn builtin_debug_val(env: &Rc<Environment>, args: &[Value]) -> Result<Value, LispError> {
    let list = args[0].as_list().expect("guarded qexpr");
    let mut rows = Vec::with_capacity(list.len());
    for sym in list {
        let result = eval_result(env, sym)?;
        rows.push((sym.clone(), result));
    }
    if rows.len() == 1 {
        let (sym, result) = rows.into_iter().next().unwrap();
        return Ok(Value::qexpr(vec![
            Value::str(sym.type_name()),
            sym,
            Value::str(result.type_name()),
            result,
        ]));
    }
    let grouped = rows
        .into_iter()
        .map(|(sym, result)| {
            Value::qexpr(vec![
                Value::str(sym.type_name()),
                sym,
                Value::str(result.type_name()),
                result,
            ])
        })
        .collect();
    Ok(Value::qexpr(grouped))
}

pub fn register(env: &Rc<Environment>) {
    env.put("debug-env", Value::func(Function::builtin("debug-env", 0, 0, builtin_debug_env)));
    env.put(
        "debug-fun",
        Value::func(Function::builtin("debug-fun", 1, 1, builtin_debug_fun).with_guards(vec![
            crate::guard::Guard::new(1, crate::error::ErrorCode::BadOperand, crate::guard::is_func()),
        ])),
    );
    env.put(
        "debug-val",
        Value::func(Function::builtin("debug-val", 1, 1, builtin_debug_val).with_guards(vec![
            crate::guard::Guard::new(1, crate::error::ErrorCode::BadOperand, crate::guard::is_qexpr()),
        ])),
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
    fn debug_env_lists_root_bindings() {
        let env = Environment::new();
        register(&env);
        env.put("x", Value::num(5));
        let debug_env = lookup(&env, "debug-env");
        let result = apply(&env, debug_env, vec![]).unwrap();
        assert_eq!(result.tag(), Tag::Qexpr);
        assert!(result.as_list().unwrap().len() >= 2);
    }

    #[test]
    fn debug_val_reports_symbol_and_result_types() {
        let env = Environment::new();
        register(&env);
        env.put("x", Value::num(5));
        let debug_val = lookup(&env, "debug-val");
        let list = Value::qexpr(vec![Value::sym("x")]);
        let result = apply(&env, debug_val, vec![list]).unwrap();
        let items = result.as_list().unwrap();
        assert_eq!(items[0].as_str(), Some("symbol"));
        assert_eq!(items[2].as_str(), Some("num"));
    }
}
