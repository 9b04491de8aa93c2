//! List and string accessors: `head tail init last cons len join list index take drop elem seq`

use crate::env::Environment;
use crate::error::{ErrorCode, LispError};
use crate::function::Function;
use crate::guard::{self, Guard};
use crate::value::{Tag, Value};
use std::rc::Rc;

fn list_or_str_guard() -> Guard {
    Guard::new(
        1,
        ErrorCode::BadOperand,
        Rc::new(|_f, v| {
            if v.is_list() || v.tag() == Tag::Str {
                Ok(())
            } else {
                Err((None, "must be a list or a string".to_string()))
            }
        }),
    )
}

/// Resolves a spec-style index, where negative counts from the end, into a
/// bounds-checked `usize`.
fn resolve_index(i: i64, len: usize) -> Option<usize> {
    let idx = if i < 0 { len as i64 + i } else { i };
    if idx < 0 || idx as usize >= len {
        None
    } else {
        Some(idx as usize)
    }
}

fn items_of(v: &Value) -> Vec<Value> {
    v.as_list().map(|s| s.to_vec()).unwrap_or_default()
}

fn builtin_head(_env: &Rc<Environment>, args: &[Value]) -> Result<Value, LispError> {
    let v = &args[0];
    if let Some(s) = v.as_str() {
        return Ok(Value::str(s.chars().next().map(String::from).unwrap_or_default()));
    }
    let items = items_of(v);
    items
        .first()
        .cloned()
        .ok_or_else(|| LispError::new(ErrorCode::BadOperand, "cannot take head of an empty list"))
}

fn builtin_tail(_env: &Rc<Environment>, args: &[Value]) -> Result<Value, LispError> {
    let v = &args[0];
    if let Some(s) = v.as_str() {
        return Ok(Value::str(s.chars().skip(1).collect::<String>()));
    }
    let items = items_of(v);
    Ok(Value::qexpr(items.into_iter().skip(1).collect()))
}

fn builtin_init(_env: &Rc<Environment>, args: &[Value]) -> Result<Value, LispError> {
    let v = &args[0];
    if let Some(s) = v.as_str() {
        let mut chars: Vec<char> = s.chars().collect();
        chars.pop();
        return Ok(Value::str(chars.into_iter().collect::<String>()));
    }
    let mut items = items_of(v);
    items.pop();
    Ok(Value::qexpr(items))
}

fn builtin_last(_env: &Rc<Environment>, args: &[Value]) -> Result<Value, LispError> {
    let v = &args[0];
    if let Some(s) = v.as_str() {
        return Ok(Value::str(s.chars().last().map(String::from).unwrap_or_default()));
    }
    let items = items_of(v);
    items
        .last()
        .cloned()
        .ok_or_else(|| LispError::new(ErrorCode::BadOperand, "cannot take last of an empty list"))
}

fn builtin_cons(_env: &Rc<Environment>, args: &[Value]) -> Result<Value, LispError> {
    let mut items = vec![args[0].clone()];
    items.extend(items_of(&args[1]));
    Ok(Value::qexpr(items))
}

fn builtin_len(_env: &Rc<Environment>, args: &[Value]) -> Result<Value, LispError> {
    Ok(Value::num(args[0].len().unwrap_or(0) as i64))
}

/// Seeds the accumulator's shape from the first argument's tag: an empty
/// string for `Str`, an empty `Sexpr` for `Sexpr`, otherwise an empty
/// `Qexpr`, then concatenates the rest in.
fn builtin_join(_env: &Rc<Environment>, args: &[Value]) -> Result<Value, LispError> {
    if args.is_empty() {
        return Ok(Value::qexpr(vec![]));
    }
    if args[0].tag() == Tag::Str {
        let mut out = String::new();
        for a in args {
            out.push_str(a.as_str().unwrap_or_default());
        }
        return Ok(Value::str(out));
    }
    let make = if args[0].tag() == Tag::Sexpr { Value::sexpr } else { Value::qexpr };
    let mut items = Vec::new();
    for a in args {
        items.extend(items_of(a));
    }
    Ok(make(items))
}

fn builtin_list(_env: &Rc<Environment>, args: &[Value]) -> Result<Value, LispError> {
    Ok(Value::qexpr(args.to_vec()))
}

fn builtin_index(_env: &Rc<Environment>, args: &[Value]) -> Result<Value, LispError> {
    let i = args[1].as_num().expect("guarded integral");
    let v = &args[0];
    if let Some(s) = v.as_str() {
        let chars: Vec<char> = s.chars().collect();
        return resolve_index(i, chars.len())
            .map(|idx| Value::str(chars[idx].to_string()))
            .ok_or_else(|| LispError::new(ErrorCode::BadOperand, "index out of bounds"));
    }
    let items = items_of(v);
    resolve_index(i, items.len())
        .map(|idx| items[idx].clone())
        .ok_or_else(|| LispError::new(ErrorCode::BadOperand, "index out of bounds"))
}

fn builtin_take(_env: &Rc<Environment>, args: &[Value]) -> Result<Value, LispError> {
    let v = &args[0];
    let i = args[1].as_num().expect("guarded integral");
    if let Some(s) = v.as_str() {
        let chars: Vec<char> = s.chars().collect();
        let end = if i < 0 { (chars.len() as i64 + i).max(0) as usize } else { (i as usize).min(chars.len()) };
        return Ok(Value::str(chars[..end].iter().collect::<String>()));
    }
    let items = items_of(v);
    let end = if i < 0 { (items.len() as i64 + i).max(0) as usize } else { (i as usize).min(items.len()) };
    Ok(Value::qexpr(items[..end].to_vec()))
}

fn builtin_drop(_env: &Rc<Environment>, args: &[Value]) -> Result<Value, LispError> {
    let v = &args[0];
    let i = args[1].as_num().expect("guarded integral");
    if let Some(s) = v.as_str() {
        let chars: Vec<char> = s.chars().collect();
        let start = if i < 0 { (chars.len() as i64 + i).max(0) as usize } else { (i as usize).min(chars.len()) };
        return Ok(Value::str(chars[start..].iter().collect::<String>()));
    }
    let items = items_of(v);
    let start = if i < 0 { (items.len() as i64 + i).max(0) as usize } else { (i as usize).min(items.len()) };
    Ok(Value::qexpr(items[start..].to_vec()))
}

fn builtin_elem(_env: &Rc<Environment>, args: &[Value]) -> Result<Value, LispError> {
    let items = items_of(&args[1]);
    Ok(Value::bool(items.iter().any(|v| Value::values_equal(v, &args[0]))))
}

fn builtin_seq(_env: &Rc<Environment>, args: &[Value]) -> Result<Value, LispError> {
    let from = args[0].as_num().expect("guarded integral");
    let to = args[1].as_num().expect("guarded integral");
    let step = if args.len() == 3 {
        args[2].as_num().expect("guarded integral")
    } else if to >= from {
        1
    } else {
        -1
    };
    if step == 0 {
        return Err(LispError::new(ErrorCode::BadOperand, "step must not be 0"));
    }
    let mut items = Vec::new();
    let mut cur = from;
    while (step > 0 && cur < to) || (step < 0 && cur > to) {
        items.push(Value::num(cur));
        cur += step;
    }
    Ok(Value::qexpr(items))
}

pub fn register(env: &Rc<Environment>) {
    env.put(
        "head",
        Value::func(Function::builtin("head", 1, 1, builtin_head).with_guards(vec![list_or_str_guard()])),
    );
    env.put(
        "tail",
        Value::func(Function::builtin("tail", 1, 1, builtin_tail).with_guards(vec![list_or_str_guard()])),
    );
    env.put(
        "init",
        Value::func(Function::builtin("init", 1, 1, builtin_init).with_guards(vec![list_or_str_guard()])),
    );
    env.put(
        "last",
        Value::func(Function::builtin("last", 1, 1, builtin_last).with_guards(vec![list_or_str_guard()])),
    );
    env.put(
        "cons",
        Value::func(Function::builtin("cons", 2, 2, builtin_cons).with_guards(vec![Guard::new(
            2,
            ErrorCode::BadOperand,
            guard::is_list(),
        )])),
    );
    env.put(
        "len",
        Value::func(Function::builtin("len", 1, 1, builtin_len).with_guards(vec![list_or_str_guard()])),
    );
    env.put(
        "join",
        Value::func(Function::builtin("join", 0, -1, builtin_join).with_guards(vec![Guard::new(
            -1,
            ErrorCode::BadOperand,
            guard::all_same_type(),
        )])),
    );
    env.put("list", Value::func(Function::builtin("list", 0, -1, builtin_list)));
    env.put(
        "index",
        Value::func(
            Function::builtin("index", 2, 2, builtin_index)
                .with_guards(vec![list_or_str_guard(), Guard::new(2, ErrorCode::BadOperand, guard::is_integral())]),
        ),
    );
    env.put(
        "take",
        Value::func(
            Function::builtin("take", 2, 2, builtin_take)
                .with_guards(vec![list_or_str_guard(), Guard::new(2, ErrorCode::BadOperand, guard::is_integral())]),
        ),
    );
    env.put(
        "drop",
        Value::func(
            Function::builtin("drop", 2, 2, builtin_drop)
                .with_guards(vec![list_or_str_guard(), Guard::new(2, ErrorCode::BadOperand, guard::is_integral())]),
        ),
    );
    env.put(
        "elem",
        Value::func(Function::builtin("elem", 2, 2, builtin_elem).with_guards(vec![Guard::new(
            2,
            ErrorCode::BadOperand,
            guard::is_list(),
        )])),
    );
    env.put(
        "seq",
        Value::func(Function::builtin("seq", 2, 3, builtin_seq).with_guards(vec![Guard::new(
            0,
            ErrorCode::BadOperand,
            guard::is_integral(),
        )])),
    );
}
