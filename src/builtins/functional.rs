//! Higher-order list traversal: `map filter fold eval sort reverse zip repeat all any`

use crate::env::Environment;
use crate::error::{ErrorCode, LispError};
use crate::eval::{apply, eval_result};
use crate::function::Function;
use crate::guard::{self, Guard};
use crate::value::{Tag, Value};
use std::rc::Rc;

fn func_guard() -> Guard {
    Guard::new(1, ErrorCode::BadOperand, guard::is_func())
}

fn list_guard_at(n: i32) -> Guard {
    Guard::new(n, ErrorCode::BadOperand, guard::is_list())
}

/// Picks the accumulator shape to reuse when traversing `list`, matching
/// `join`'s own string/sexpr/qexpr convention.
fn empty_like(list: &Value) -> Value {
    match list.tag() {
        Tag::Str => Value::str(""),
        Tag::Sexpr => Value::sexpr(vec![]),
        _ => Value::qexpr(vec![]),
    }
}

fn items_of(v: &Value) -> Vec<Value> {
    if let Some(s) = v.as_str() {
        return s.chars().map(|c| Value::str(c.to_string())).collect();
    }
    v.as_list().map(|s| s.to_vec()).unwrap_or_default()
}

fn builtin_map(env: &Rc<Environment>, args: &[Value]) -> Result<Value, LispError> {
    let func = args[0].as_func().expect("guarded func").clone();
    let list = &args[1];
    let mut acc = empty_like(list);
    let mut out = items_of(list);
    for elem in out.drain(..) {
        let result = apply(env, func.clone(), vec![elem])?;
        push_into(&mut acc, result);
    }
    Ok(acc)
}

fn builtin_filter(env: &Rc<Environment>, args: &[Value]) -> Result<Value, LispError> {
    let func = args[0].as_func().expect("guarded func").clone();
    let list = &args[1];
    let mut acc = empty_like(list);
    for elem in items_of(list) {
        let keep = apply(env, func.clone(), vec![elem.clone()])?;
        if keep.as_bool() == Some(true) {
            push_into(&mut acc, elem);
        }
    }
    Ok(acc)
}

fn builtin_fold(env: &Rc<Environment>, args: &[Value]) -> Result<Value, LispError> {
    let func = args[0].as_func().expect("guarded func").clone();
    let mut acc = args[1].clone();
    for elem in items_of(&args[2]) {
        acc = apply(env, func.clone(), vec![acc, elem])?;
    }
    Ok(acc)
}

/// Converts a Qexpr to a Sexpr and evaluates it in `env`; any other value
/// evaluates to itself.
fn builtin_eval(env: &Rc<Environment>, args: &[Value]) -> Result<Value, LispError> {
    let arg = &args[0];
    let rewrapped = if arg.tag() == Tag::Qexpr {
        Value::sexpr(arg.as_list().expect("tag checked").to_vec()).with_span(arg.span)
    } else {
        arg.clone()
    };
    eval_result(env, &rewrapped)
}

fn builtin_sort(_env: &Rc<Environment>, args: &[Value]) -> Result<Value, LispError> {
    let list = &args[0];
    let mut items = items_of(list);
    items.sort_by(|a, b| {
        a.as_dbl_widened()
            .zip(b.as_dbl_widened())
            .and_then(|(x, y)| x.partial_cmp(&y))
            .or_else(|| a.as_str().zip(b.as_str()).map(|(x, y)| x.cmp(y)))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    let mut acc = empty_like(list);
    for item in items {
        push_into(&mut acc, item);
    }
    Ok(acc)
}

fn builtin_reverse(_env: &Rc<Environment>, args: &[Value]) -> Result<Value, LispError> {
    let list = &args[0];
    let mut items = items_of(list);
    items.reverse();
    let mut acc = empty_like(list);
    for item in items {
        push_into(&mut acc, item);
    }
    Ok(acc)
}

fn builtin_zip(_env: &Rc<Environment>, args: &[Value]) -> Result<Value, LispError> {
    let lists: Vec<Vec<Value>> = args.iter().map(items_of).collect();
    let len = lists.iter().map(|l| l.len()).min().unwrap_or(0);
    let mut out = Vec::with_capacity(len);
    for i in 0..len {
        let row = lists.iter().map(|l| l[i].clone()).collect();
        out.push(Value::qexpr(row));
    }
    Ok(Value::qexpr(out))
}

fn builtin_repeat(_env: &Rc<Environment>, args: &[Value]) -> Result<Value, LispError> {
    let n = args[1].as_num().expect("guarded integral");
    if n < 0 {
        return Err(LispError::new(ErrorCode::BadOperand, "repeat count must not be negative"));
    }
    Ok(Value::qexpr(std::iter::repeat(args[0].clone()).take(n as usize).collect()))
}

fn builtin_all(env: &Rc<Environment>, args: &[Value]) -> Result<Value, LispError> {
    let func = args[0].as_func().expect("guarded func").clone();
    for elem in items_of(&args[1]) {
        if apply(env, func.clone(), vec![elem])?.as_bool() != Some(true) {
            return Ok(Value::bool(false));
        }
    }
    Ok(Value::bool(true))
}

fn builtin_any(env: &Rc<Environment>, args: &[Value]) -> Result<Value, LispError> {
    let func = args[0].as_func().expect("guarded func").clone();
    for elem in items_of(&args[1]) {
        if apply(env, func.clone(), vec![elem])?.as_bool() == Some(true) {
            return Ok(Value::bool(true));
        }
    }
    Ok(Value::bool(false))
}

fn push_into(acc: &mut Value, item: Value) {
    match acc.tag() {
        Tag::Str => {
            let mut s = acc.as_str().unwrap_or_default().to_string();
            s.push_str(item.as_str().unwrap_or_default());
            *acc = Value::str(s);
        }
        Tag::Sexpr => {
            let mut items = acc.as_list().unwrap_or_default().to_vec();
            items.push(item);
            *acc = Value::sexpr(items);
        }
        _ => {
            let mut items = acc.as_list().unwrap_or_default().to_vec();
            items.push(item);
            *acc = Value::qexpr(items);
        }
    }
}

pub fn register(env: &Rc<Environment>) {
    env.put(
        "map",
        Value::func(Function::builtin("map", 2, 2, builtin_map).with_guards(vec![func_guard(), list_guard_at(2)])),
    );
    env.put(
        "filter",
        Value::func(
            Function::builtin("filter", 2, 2, builtin_filter).with_guards(vec![func_guard(), list_guard_at(2)]),
        ),
    );
    env.put(
        "fold",
        Value::func(Function::builtin("fold", 3, 3, builtin_fold).with_guards(vec![func_guard(), list_guard_at(3)])),
    );
    env.put("eval", Value::func(Function::builtin("eval", 1, 1, builtin_eval)));
    env.put(
        "sort",
        Value::func(Function::builtin("sort", 1, 1, builtin_sort).with_guards(vec![list_guard_at(1)])),
    );
    env.put(
        "reverse",
        Value::func(Function::builtin("reverse", 1, 1, builtin_reverse).with_guards(vec![list_guard_at(1)])),
    );
    env.put("zip", Value::func(Function::builtin("zip", 0, -1, builtin_zip)));
    env.put(
        "repeat",
        Value::func(Function::builtin("repeat", 2, 2, builtin_repeat).with_guards(vec![Guard::new(
            2,
            ErrorCode::BadOperand,
            guard::is_integral(),
        )])),
    );
    env.put(
        "all",
        Value::func(Function::builtin("all", 2, 2, builtin_all).with_guards(vec![func_guard(), list_guard_at(2)])),
    );
    env.put(
        "any",
        Value::func(Function::builtin("any", 2, 2, builtin_any).with_guards(vec![func_guard(), list_guard_at(2)])),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins::arithmetic;
    use crate::builtins::comparison;

    fn lookup(env: &Rc<Environment>, name: &str) -> Function {
        env.get(name).unwrap().as_func().unwrap().clone()
    }

    fn qexpr(items: Vec<i64>) -> Value {
        Value::qexpr(items.into_iter().map(Value::num).collect())
    }

    #[test]
    fn map_adds_one_to_each_element() {
        let env = Environment::new();
        register(&env);
        arithmetic::register(&env);
        let formals = Value::qexpr(vec![Value::sym("x")]);
        let body = Value::qexpr(vec![Value::sym("+"), Value::sym("x"), Value::num(1)]);
        let lambda = Function::lambda(formals, body, env.clone());
        let map = lookup(&env, "map");
        let result = apply(&env, map, vec![Value::func(lambda), qexpr(vec![1, 2, 3])]).unwrap();
        assert_eq!(result.to_string(), "{2 3 4}");
    }

    #[test]
    fn filter_keeps_matching_elements() {
        let env = Environment::new();
        register(&env);
        comparison::register(&env);
        let formals = Value::qexpr(vec![Value::sym("x")]);
        let body = Value::qexpr(vec![Value::sym(">"), Value::sym("x"), Value::num(2)]);
        let lambda = Function::lambda(formals, body, env.clone());
        let filter = lookup(&env, "filter");
        let result = apply(&env, filter, vec![Value::func(lambda), qexpr(vec![1, 2, 3, 4])]).unwrap();
        assert_eq!(result.to_string(), "{3 4}");
    }

    #[test]
    fn fold_sums_a_list() {
        let env = Environment::new();
        register(&env);
        arithmetic::register(&env);
        let plus = lookup(&env, "+");
        let fold = lookup(&env, "fold");
        let result = apply(&env, fold, vec![Value::func(plus), Value::num(0), qexpr(vec![1, 2, 3, 4])]).unwrap();
        assert_eq!(result.as_num(), Some(10));
    }

    #[test]
    fn eval_converts_qexpr_to_sexpr() {
        let env = Environment::new();
        register(&env);
        arithmetic::register(&env);
        let eval_fn = lookup(&env, "eval");
        let qe = Value::qexpr(vec![Value::sym("+"), Value::num(1), Value::num(1)]);
        let result = apply(&env, eval_fn, vec![qe]).unwrap();
        assert_eq!(result.as_num(), Some(2));
    }

    #[test]
    fn sort_orders_numbers_ascending() {
        let env = Environment::new();
        register(&env);
        let sort = lookup(&env, "sort");
        let result = apply(&env, sort, vec![qexpr(vec![3, 1, 2])]).unwrap();
        assert_eq!(result.to_string(), "{1 2 3}");
    }

    #[test]
    fn zip_pairs_elements_positionally() {
        let env = Environment::new();
        register(&env);
        let zip = lookup(&env, "zip");
        let result = apply(&env, zip, vec![qexpr(vec![1, 2]), qexpr(vec![3, 4])]).unwrap();
        assert_eq!(result.to_string(), "{{1 3} {2 4}}");
    }
}
