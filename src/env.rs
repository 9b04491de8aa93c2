// ABOUTME: Environment module for managing variable bindings and scopes

use crate::error::{ErrorCode, LispError};
use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

pub struct Environment {
    bindings: RefCell<HashMap<String, Value>>,
    parent: RefCell<Option<Rc<Environment>>>,
}

impl Environment {
    /// Creates a new global environment with no parent.
    pub fn new() -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            parent: RefCell::new(None),
        })
    }

    /// Creates a new child environment with a parent.
    pub fn with_parent(parent: Rc<Environment>) -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            parent: RefCell::new(Some(parent)),
        })
    }

    /// Attaches a parent to an environment built without one. Used once, at
    /// lambda-call time, to splice the call frame onto the captured scope.
    pub fn set_parent(&self, parent: Rc<Environment>) {
        *self.parent.borrow_mut() = Some(parent);
    }

    /// Defines a binding in THIS scope only, not walking the parent chain.
    /// This is the source-level `=`/`put`.
    pub fn put(&self, name: &str, value: Value) {
        self.bindings.borrow_mut().insert(name.to_string(), value);
    }

    /// Defines a binding in the root (outermost) scope. This is the
    /// source-level `def`.
    pub fn def(&self, name: &str, value: Value) {
        match self.parent.borrow().as_ref() {
            Some(parent) => parent.def(name, value),
            None => self.put(name, value),
        }
    }

    /// Overwrites a binding wherever it is already visible, starting from
    /// this scope and walking outward. Fails if the symbol is unbound
    /// anywhere in the chain.
    pub fn override_binding(&self, name: &str, value: Value) -> Result<(), LispError> {
        if self.bindings.borrow().contains_key(name) {
            self.bindings.borrow_mut().insert(name.to_string(), value);
            return Ok(());
        }
        match self.parent.borrow().as_ref() {
            Some(parent) => parent.override_binding(name, value),
            None => Err(LispError::new(
                ErrorCode::BadSymbol,
                format!("unbound symbol '{name}'"),
            )),
        }
    }

    /// Looks up a symbol in this scope and parent scopes recursively.
    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.bindings.borrow().get(name) {
            return Some(value.clone());
        }
        self.parent.borrow().as_ref().and_then(|parent| parent.get(name))
    }

    /// All bindings visible from this scope, innermost first, as `(sym val)`
    /// pairs, for the `debug-env` builtin.
    pub fn list(&self) -> Value {
        let mut seen = std::collections::HashSet::new();
        let mut pairs = Vec::new();
        for (sym, val) in self.bindings.borrow().iter() {
            if seen.insert(sym.clone()) {
                pairs.push(Value::qexpr(vec![Value::sym(sym.clone()), val.clone()]));
            }
        }
        let mut cur = self.parent.borrow().clone();
        loop {
            let env = match cur {
                Some(e) => e,
                None => break,
            };
            for (sym, val) in env.bindings.borrow().iter() {
                if seen.insert(sym.clone()) {
                    pairs.push(Value::qexpr(vec![Value::sym(sym.clone()), val.clone()]));
                }
            }
            cur = env.parent.borrow().clone();
        }
        Value::qexpr(pairs)
    }
}
