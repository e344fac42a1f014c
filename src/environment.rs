use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::object::Object;

/// A lexical scope: a flat map of bindings plus a link to its enclosing
/// scope. The globals environment is the root and has no enclosing link.
#[derive(Debug, Default)]
pub struct Environment {
    values: HashMap<String, Object>,
    enclosing: Option<Rc<RefCell<Environment>>>,
}

impl Environment {
    pub fn new(enclosing: Option<Rc<RefCell<Environment>>>) -> Self {
        Environment { values: HashMap::new(), enclosing }
    }

    pub fn define(&mut self, name: &str, value: Object) {
        self.values.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str) -> Option<Object> {
        if let Some(value) = self.values.get(name) {
            return Some(value.clone());
        }

        self.enclosing.as_ref().and_then(|enclosing| enclosing.borrow().get(name))
    }

    /// Returns whether the name was bound somewhere in the chain.
    pub fn assign(&mut self, name: &str, value: Object) -> bool {
        if self.values.contains_key(name) {
            self.values.insert(name.to_string(), value);
            return true;
        }

        match &self.enclosing {
            Some(enclosing) => enclosing.borrow_mut().assign(name, value),
            None => false,
        }
    }
}

/// Walks exactly `distance` enclosing links from `env`. The resolver only
/// ever records a distance it has itself verified against the same scope
/// structure the interpreter builds, so this never overruns the chain.
fn ancestor(env: &Rc<RefCell<Environment>>, distance: usize) -> Rc<RefCell<Environment>> {
    let mut current = Rc::clone(env);
    for _ in 0..distance {
        let next = current.borrow().enclosing.clone()
            .expect("resolver recorded a distance deeper than the environment chain");
        current = next;
    }
    current
}

pub fn get_at(env: &Rc<RefCell<Environment>>, distance: usize, name: &str) -> Option<Object> {
    ancestor(env, distance).borrow().values.get(name).cloned()
}

pub fn assign_at(env: &Rc<RefCell<Environment>>, distance: usize, name: &str, value: Object) {
    ancestor(env, distance).borrow_mut().values.insert(name.to_string(), value);
}
