//! Symbol binding and function construction: `def = override \ fun pack unpack partial`

use crate::env::Environment;
use crate::error::{ErrorCode, LispError};
use crate::eval::apply;
use crate::function::Function;
use crate::guard::{self, Guard};
use crate::value::Value;
use std::rc::Rc;

fn symbols_qexpr_guard() -> Guard {
    Guard::new(1, ErrorCode::BadOperand, guard::is_qexpr())
}

type Definer = fn(&Rc<Environment>, &str, Value) -> Result<(), LispError>;

fn define_with(env: &Rc<Environment>, args: &[Value], definer: Definer) -> Result<Value, LispError> {
    let symbols = args[0].as_list().expect("guarded qexpr");
    let values = &args[1..];
    for (sym, value) in symbols.iter().zip(values.iter()) {
        let name = sym
            .as_sym()
            .ok_or_else(|| LispError::new(ErrorCode::BadOperand, "binding target must be a symbol"))?;
        definer(env, name, value.clone())?;
    }
    Ok(args[0].clone())
}

fn builtin_def(env: &Rc<Environment>, args: &[Value]) -> Result<Value, LispError> {
    define_with(env, args, |env, name, value| {
        env.def(name, value);
        Ok(())
    })
}

fn builtin_put(env: &Rc<Environment>, args: &[Value]) -> Result<Value, LispError> {
    define_with(env, args, |env, name, value| {
        env.put(name, value);
        Ok(())
    })
}

fn builtin_override(env: &Rc<Environment>, args: &[Value]) -> Result<Value, LispError> {
    define_with(env, args, |env, name, value| env.override_binding(name, value))
}

fn builtin_lambda(env: &Rc<Environment>, args: &[Value]) -> Result<Value, LispError> {
    let formals = args[0].clone();
    let body = args[1].clone();
    Ok(Value::func(Function::lambda(formals, body, env.clone())))
}

/// `fun`: sugar over `\` + `def`. The first argument is a Qexpr whose head
/// symbol is the function's name and whose tail is its formal parameters.
fn builtin_fun(env: &Rc<Environment>, args: &[Value]) -> Result<Value, LispError> {
    let name_and_formals = args[0].as_list().expect("guarded qexpr");
    let name = name_and_formals
        .first()
        .and_then(|v| v.as_sym())
        .ok_or_else(|| LispError::new(ErrorCode::BadOperand, "fun's first symbol must be the function name"))?
        .to_string();
    let formals = Value::qexpr(name_and_formals[1..].to_vec());
    let body = args[1].clone();
    let func = Function::lambda(formals, body, env.clone()).renamed(name.clone());
    env.def(&name, Value::func(func.clone()));
    Ok(Value::func(func))
}

fn builtin_pack(env: &Rc<Environment>, args: &[Value]) -> Result<Value, LispError> {
    let func = args[0].as_func().expect("guarded func").clone();
    let packed = vec![Value::qexpr(args[1..].to_vec())];
    apply(env, func, packed)
}

fn builtin_unpack(env: &Rc<Environment>, args: &[Value]) -> Result<Value, LispError> {
    let func = args[0].as_func().expect("guarded func").clone();
    let unpacked = args[1].as_list().expect("guarded qexpr").to_vec();
    apply(env, func, unpacked)
}

fn builtin_partial(_env: &Rc<Environment>, args: &[Value]) -> Result<Value, LispError> {
    let mut func = args[0].as_func().expect("guarded func").clone();
    func.args.extend(args[1..].to_vec());
    Ok(Value::func(func))
}

pub fn register(env: &Rc<Environment>) {
    env.put(
        "def",
        Value::func(Function::builtin("def", 2, -1, builtin_def).with_guards(vec![symbols_qexpr_guard()])),
    );
    env.put(
        "=",
        Value::func(Function::builtin("=", 2, -1, builtin_put).with_guards(vec![symbols_qexpr_guard()])),
    );
    env.put(
        "override",
        Value::func(Function::builtin("override", 2, -1, builtin_override).with_guards(vec![symbols_qexpr_guard()])),
    );
    env.put(
        "\\",
        Value::func(
            Function::builtin("\\", 2, 2, builtin_lambda)
                .with_guards(vec![Guard::new(0, ErrorCode::BadOperand, guard::is_qexpr())]),
        ),
    );
    env.put(
        "fun",
        Value::func(
            Function::builtin("fun", 2, 2, builtin_fun)
                .with_guards(vec![symbols_qexpr_guard(), Guard::new(2, ErrorCode::BadOperand, guard::is_qexpr())]),
        ),
    );
    env.put(
        "pack",
        Value::func(Function::builtin("pack", 1, -1, builtin_pack).with_guards(vec![Guard::new(
            1,
            ErrorCode::BadOperand,
            guard::is_func(),
        )])),
    );
    env.put(
        "unpack",
        Value::func(Function::builtin("unpack", 2, 2, builtin_unpack).with_guards(vec![
            Guard::new(1, ErrorCode::BadOperand, guard::is_func()),
            Guard::new(2, ErrorCode::BadOperand, guard::is_qexpr()),
        ])),
    );
    env.put(
        "partial",
        Value::func(Function::builtin("partial", 1, -1, builtin_partial).with_guards(vec![Guard::new(
            1,
            ErrorCode::BadOperand,
            guard::is_func(),
        )])),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins::arithmetic;

    fn lookup(env: &Rc<Environment>, name: &str) -> Function {
        env.get(name).unwrap().as_func().unwrap().clone()
    }

    #[test]
    fn def_binds_multiple_symbols_at_root() {
        let env = Environment::new();
        register(&env);
        let def = lookup(&env, "def");
        let symbols = Value::qexpr(vec![Value::sym("x"), Value::sym("y")]);
        apply(&env, def, vec![symbols, Value::num(1), Value::num(2)]).unwrap();
        assert_eq!(env.get("x").unwrap().as_num(), Some(1));
        assert_eq!(env.get("y").unwrap().as_num(), Some(2));
    }

    #[test]
    fn override_fails_on_unbound_symbol() {
        let env = Environment::new();
        register(&env);
        let over = lookup(&env, "override");
        let symbols = Value::qexpr(vec![Value::sym("z")]);
        let err = apply(&env, over, vec![symbols, Value::num(1)]).unwrap_err();
        assert_eq!(err.code, ErrorCode::BadSymbol);
    }

    #[test]
    fn fun_defines_a_named_function() {
        let env = Environment::new();
        register(&env);
        arithmetic::register(&env);
        let fun = lookup(&env, "fun");
        let name_and_formals = Value::qexpr(vec![Value::sym("double"), Value::sym("x")]);
        let body = Value::qexpr(vec![Value::sym("*"), Value::num(2), Value::sym("x")]);
        apply(&env, fun, vec![name_and_formals, body]).unwrap();
        let double = lookup(&env, "double");
        let result = apply(&env, double, vec![Value::num(21)]).unwrap();
        assert_eq!(result.as_num(), Some(42));
    }

    #[test]
    fn partial_binds_leading_arguments() {
        let env = Environment::new();
        register(&env);
        arithmetic::register(&env);
        let partial = lookup(&env, "partial");
        let plus = lookup(&env, "+");
        let bound = apply(&env, partial, vec![Value::func(plus), Value::num(10)]).unwrap();
        let result = apply(&env, bound.as_func().unwrap().clone(), vec![Value::num(5)]).unwrap();
        assert_eq!(result.as_num(), Some(15));
    }

    #[test]
    fn pack_wraps_trailing_args_into_a_qexpr() {
        let env = Environment::new();
        register(&env);
        let list_fn = Function::builtin("list", 0, -1, |_env, args| Ok(Value::qexpr(args.to_vec())));
        let pack = lookup(&env, "pack");
        let result = apply(&env, pack, vec![Value::func(list_fn), Value::num(1), Value::num(2)]).unwrap();
        assert_eq!(result.to_string(), "{1 2}");
    }
}
