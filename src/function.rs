use std::cell::RefCell;
use std::fmt::{self, Debug, Display};
use std::rc::Rc;

use crate::ast::FunctionData;
use crate::class::Instance;
use crate::environment::{self, Environment};
use crate::error::RuntimeError;
use crate::interpreter::{ControlFlow, Interpreter};
use crate::literal::Literal;
use crate::object::{Callable, Object};

/// A user-defined function or method. `closure` is the environment captured
/// at the point the `def` was evaluated; every call frame's environment
/// chains off it, not off whatever environment happens to be active when the
/// call is made. This is what makes closures work.
#[derive(Clone)]
pub struct Function {
    declaration: Rc<FunctionData>,
    closure: Rc<RefCell<Environment>>,
    is_initializer: bool,
}

impl Function {
    pub fn new(declaration: Rc<FunctionData>, closure: Rc<RefCell<Environment>>, is_initializer: bool) -> Self {
        Function { declaration, closure, is_initializer }
    }

    /// Produces a method bound to `instance`: a new closure environment,
    /// enclosed by the method's original closure, with `self` defined at
    /// distance zero. The resolver assumed exactly this shape when it
    /// recorded the distance for every `self` reference inside the method.
    pub fn bind(&self, instance: Rc<RefCell<Instance>>) -> Function {
        let environment = Rc::new(RefCell::new(Environment::new(Some(Rc::clone(&self.closure)))));
        environment.borrow_mut().define("self", Object::Instance(instance));
        Function::new(Rc::clone(&self.declaration), environment, self.is_initializer)
    }
}

impl Callable for Function {
    fn arity(&self) -> usize {
        self.declaration.params.len()
    }

    fn call(&self, interpreter: &mut Interpreter, arguments: Vec<Object>) -> Result<Object, RuntimeError> {
        let call_environment = Rc::new(RefCell::new(Environment::new(Some(Rc::clone(&self.closure)))));
        for (param, argument) in self.declaration.params.iter().zip(arguments) {
            call_environment.borrow_mut().define(&param.lexeme, argument);
        }

        let control_flow = interpreter.execute_block(&self.declaration.body, call_environment)?;

        if self.is_initializer {
            // Bare or explicit `return` inside init always yields the
            // instance; the resolver has already rejected a non-bare one.
            return Ok(environment::get_at(&self.closure, 0, "self")
                .expect("a bound initializer's closure always carries self"));
        }

        match control_flow {
            ControlFlow::Return(value) => Ok(value),
            _ => Ok(Object::Literal(Literal::Nil)),
        }
    }
}

impl Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<fn {}>", self.declaration.name.lexeme)
    }
}

impl Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<fn {}>", self.declaration.name.lexeme)
    }
}

/// A host-provided callable. Rocks only ships one: `clock()`.
#[derive(Clone)]
pub struct NativeFunction {
    pub name: &'static str,
    arity: usize,
    function: fn(&mut Interpreter, Vec<Object>) -> Result<Object, RuntimeError>,
}

impl Callable for NativeFunction {
    fn arity(&self) -> usize {
        self.arity
    }

    fn call(&self, interpreter: &mut Interpreter, arguments: Vec<Object>) -> Result<Object, RuntimeError> {
        (self.function)(interpreter, arguments)
    }
}

impl NativeFunction {
    /// The natives seeded into a fresh interpreter's globals scope.
    pub fn globals() -> Vec<NativeFunction> {
        vec![
            NativeFunction {
                name: "clock",
                arity: 0,
                function: |_, _| {
                    let seconds = std::time::SystemTime::now()
                        .duration_since(std::time::UNIX_EPOCH)
                        .unwrap_or_default()
                        .as_secs_f64();
                    Ok(Object::Literal(Literal::Number(seconds)))
                },
            },
        ]
    }
}

impl Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<native fn {}>", self.name)
    }
}

impl Display for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<native fn {}>", self.name)
    }
}
