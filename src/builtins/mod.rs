//! Builtin catalog, organized into categories that mirror the spec's
//! contract table. Each category module exposes `register(env)`, which
//! `register_all` calls in turn to populate a fresh root environment.

pub mod arithmetic;
pub mod binding;
pub mod comparison;
pub mod control;
pub mod functional;
pub mod introspection;
pub mod io;
pub mod lists;
pub mod logic;

use crate::env::Environment;
use crate::value::Value;
use std::rc::Rc;

/// Populates `env` with the full builtin catalog plus the constants
/// `true`, `false`, `nil`, and `.` (initialized to nil, updated by the
/// evaluator after every sexpr).
pub fn register_all(env: &Rc<Environment>) {
    arithmetic::register(env);
    comparison::register(env);
    logic::register(env);
    control::register(env);
    lists::register(env);
    functional::register(env);
    binding::register(env);
    io::register(env);
    introspection::register(env);

    env.put("true", Value::bool(true));
    env.put("false", Value::bool(false));
    env.put("nil", Value::nil());
    env.put(".", Value::nil());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_all_populates_constants_and_arithmetic() {
        let env = Environment::new();
        register_all(&env);
        assert!(env.get("true").is_some());
        assert!(env.get("+").is_some());
        assert!(env.get("map").is_some());
        assert!(env.get("def").is_some());
    }
}
