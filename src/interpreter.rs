use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Write;
use std::rc::Rc;

use crate::ast::*;
use crate::class::{Class, Instance};
use crate::environment::{self, Environment};
use crate::error::RuntimeError;
use crate::function::{Function, NativeFunction};
use crate::literal::Literal;
use crate::object::{Callable, Object};
use crate::token::{Token, Type};

/// What a statement did, threaded back up through its caller instead of
/// raised as a host exception. `Normal` means fallthrough; the other three
/// ask every enclosing block/loop/call to unwind without running anything
/// further at that level.
pub enum ControlFlow {
    Normal,
    Break,
    Continue,
    Return(Object),
}

/// Walks the AST, holding the live environment chain and the resolver's
/// site→distance table. One `Interpreter` per run (or per REPL session) so
/// nothing here is process-global.
pub struct Interpreter<'a> {
    globals: Rc<RefCell<Environment>>,
    environment: Rc<RefCell<Environment>>,
    locals: HashMap<u32, usize>,
    output: &'a mut dyn Write,
}

impl<'a> Interpreter<'a> {
    pub fn new(output: &'a mut dyn Write) -> Self {
        let globals = Rc::new(RefCell::new(Environment::new(None)));
        for native in NativeFunction::globals() {
            globals.borrow_mut().define(native.name, Object::NativeFunction(Rc::new(native)));
        }

        Interpreter { environment: Rc::clone(&globals), globals, locals: HashMap::new(), output }
    }

    pub fn interpret(&mut self, statements: &[Stmt], locals: HashMap<u32, usize>) -> Result<(), RuntimeError> {
        self.locals = locals;

        for statement in statements {
            self.execute(statement)?;
        }

        Ok(())
    }

    /// REPL convenience: evaluate a bare expression and print its value,
    /// without requiring the caller to have wrapped it in a `print` statement.
    pub fn interpret_expression(&mut self, expr: &Expr, locals: HashMap<u32, usize>) -> Result<(), RuntimeError> {
        self.locals = locals;
        let value = self.evaluate(expr)?;
        self.print_line(&value.to_string());
        Ok(())
    }

    fn print_line(&mut self, line: &str) {
        let _ = writeln!(self.output, "{line}");
    }

    // --- statements ---

    fn execute(&mut self, statement: &Stmt) -> Result<ControlFlow, RuntimeError> {
        match statement {
            Stmt::Expression(data) => {
                self.evaluate(&data.expr)?;
                Ok(ControlFlow::Normal)
            }
            Stmt::Print(data) => {
                let value = self.evaluate(&data.expr)?;
                self.print_line(&value.to_string());
                Ok(ControlFlow::Normal)
            }
            Stmt::Var(data) => {
                let value = match &data.initializer {
                    Some(initializer) => self.evaluate(initializer)?,
                    None => Object::Literal(Literal::Nil),
                };
                self.environment.borrow_mut().define(&data.name.lexeme, value);
                Ok(ControlFlow::Normal)
            }
            Stmt::Block(data) => {
                let scope = Rc::new(RefCell::new(Environment::new(Some(Rc::clone(&self.environment)))));
                self.execute_block(&data.statements, scope)
            }
            Stmt::If(data) => {
                if self.evaluate(&data.condition)?.is_truthy() {
                    self.execute(&data.then_branch)
                } else if let Some(else_branch) = &data.else_branch {
                    self.execute(else_branch)
                } else {
                    Ok(ControlFlow::Normal)
                }
            }
            Stmt::While(data) => self.execute_while(data),
            Stmt::For(data) => self.execute_for(data),
            Stmt::Break(_) => Ok(ControlFlow::Break),
            Stmt::Continue(_) => Ok(ControlFlow::Continue),
            Stmt::Return(data) => {
                let value = match &data.value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Object::Literal(Literal::Nil),
                };
                Ok(ControlFlow::Return(value))
            }
            Stmt::Function(data) => {
                let function = Function::new(Rc::clone(data), Rc::clone(&self.environment), false);
                self.environment.borrow_mut().define(&data.name.lexeme, Object::Function(Rc::new(function)));
                Ok(ControlFlow::Normal)
            }
            Stmt::Class(data) => self.execute_class(data),
        }
    }

    /// Runs `statements` with `environment` current, restoring whatever was
    /// current before on every exit path — fallthrough, an error, or a
    /// non-`Normal` control flow bubbling up from inside.
    pub fn execute_block(
        &mut self,
        statements: &[Stmt],
        environment: Rc<RefCell<Environment>>,
    ) -> Result<ControlFlow, RuntimeError> {
        let previous = std::mem::replace(&mut self.environment, environment);

        let mut result = Ok(ControlFlow::Normal);
        for statement in statements {
            match self.execute(statement) {
                Ok(ControlFlow::Normal) => continue,
                other => {
                    result = other;
                    break;
                }
            }
        }

        self.environment = previous;
        result
    }

    fn execute_while(&mut self, data: &WhileData) -> Result<ControlFlow, RuntimeError> {
        while self.evaluate(&data.condition)?.is_truthy() {
            match self.execute(&data.body)? {
                ControlFlow::Break => break,
                ControlFlow::Continue | ControlFlow::Normal => {}
                control_flow @ ControlFlow::Return(_) => return Ok(control_flow),
            }
        }

        Ok(ControlFlow::Normal)
    }

    /// `for` keeps its own AST node rather than desugaring into a `while`
    /// block so that `continue` can fall through to the increment instead of
    /// unwinding past it along with the rest of the body.
    fn execute_for(&mut self, data: &ForData) -> Result<ControlFlow, RuntimeError> {
        let scope = Rc::new(RefCell::new(Environment::new(Some(Rc::clone(&self.environment)))));
        let previous = std::mem::replace(&mut self.environment, scope);

        let result = (|| -> Result<ControlFlow, RuntimeError> {
            if let Some(initializer) = &data.initializer {
                self.execute(initializer)?;
            }

            loop {
                if let Some(condition) = &data.condition {
                    if !self.evaluate(condition)?.is_truthy() {
                        break;
                    }
                }

                match self.execute(&data.body)? {
                    ControlFlow::Break => break,
                    ControlFlow::Continue | ControlFlow::Normal => {}
                    control_flow @ ControlFlow::Return(_) => return Ok(control_flow),
                }

                if let Some(increment) = &data.increment {
                    self.evaluate(increment)?;
                }
            }

            Ok(ControlFlow::Normal)
        })();

        self.environment = previous;
        result
    }

    fn execute_class(&mut self, data: &ClassData) -> Result<ControlFlow, RuntimeError> {
        let superclass = match &data.superclass {
            Some(super_data) => {
                let value = self.lookup_variable(&super_data.name, super_data.site_id)?;
                match value {
                    Object::Class(class) => Some(class),
                    _ => {
                        return Err(RuntimeError {
                            token: super_data.name.clone(),
                            message: "Superclass must be a class.".to_string(),
                        })
                    }
                }
            }
            None => None,
        };

        self.environment.borrow_mut().define(&data.name.lexeme, Object::Literal(Literal::Nil));

        // Methods always close over an environment carrying `super`, even
        // when there is no superclass: the resolver only pushes that scope
        // conditionally, so its absence here would desync the distances it
        // recorded for `super.*` sites, but those sites simply never occur
        // in a class with no superclass.
        let method_closure = match &superclass {
            Some(superclass) => {
                let scope = Rc::new(RefCell::new(Environment::new(Some(Rc::clone(&self.environment)))));
                scope.borrow_mut().define("super", Object::Class(Rc::clone(superclass)));
                scope
            }
            None => Rc::clone(&self.environment),
        };

        let mut methods = HashMap::new();
        for method in &data.methods {
            let is_initializer = method.name.lexeme == "init";
            let function = Function::new(Rc::clone(method), Rc::clone(&method_closure), is_initializer);
            methods.insert(method.name.lexeme.clone(), Rc::new(function));
        }

        let class = Class::new(data.name.lexeme.clone(), superclass, methods);
        self.environment.borrow_mut().assign(&data.name.lexeme, Object::Class(Rc::new(class)));

        Ok(ControlFlow::Normal)
    }

    // --- expressions ---

    fn evaluate(&mut self, expr: &Expr) -> Result<Object, RuntimeError> {
        match expr {
            Expr::Literal(literal) => Ok(Object::Literal(literal.clone())),
            Expr::Grouping(data) => self.evaluate(&data.expr),
            Expr::Unary(data) => self.evaluate_unary(data),
            Expr::Binary(data) => self.evaluate_binary(data),
            Expr::Logical(data) => self.evaluate_logical(data),
            Expr::Variable(data) => self.lookup_variable(&data.name, data.site_id),
            Expr::Assign(data) => self.evaluate_assign(data),
            Expr::Call(data) => self.evaluate_call(data),
            Expr::Get(data) => self.evaluate_get(data),
            Expr::Set(data) => self.evaluate_set(data),
            Expr::SelfExpr(data) => self.lookup_variable(&data.keyword, data.site_id),
            Expr::Super(data) => self.evaluate_super(data),
        }
    }

    fn evaluate_unary(&mut self, data: &UnaryData) -> Result<Object, RuntimeError> {
        let operand = self.evaluate(&data.expr)?;

        match data.operator.r#type {
            Type::Minus => match &operand {
                Object::Literal(Literal::Number(n)) => Ok(Object::Literal(Literal::Number(-n))),
                _ => Err(RuntimeError {
                    token: data.operator.clone(),
                    message: format!("Operand must be a number, got {}.", operand.type_name()),
                }),
            },
            Type::Bang => Ok(Object::Literal(Literal::Bool(!operand.is_truthy()))),
            _ => unreachable!("parser never produces a unary operator other than '-' or '!'"),
        }
    }

    fn evaluate_binary(&mut self, data: &BinaryData) -> Result<Object, RuntimeError> {
        let left = self.evaluate(&data.left)?;
        let right = self.evaluate(&data.right)?;
        let operator = &data.operator;

        let numbers = |left: &Object, right: &Object| match (left, right) {
            (Object::Literal(Literal::Number(l)), Object::Literal(Literal::Number(r))) => Some((*l, *r)),
            _ => None,
        };

        // Both arithmetic/comparison mismatches funnel through here so the
        // message always names the actual types the operator choked on.
        let operands_must_be_numbers = || RuntimeError {
            token: operator.clone(),
            message: format!("Operands must be numbers, got {} and {}.", left.type_name(), right.type_name()),
        };

        match operator.r#type {
            Type::Plus => match (&left, &right) {
                (Object::Literal(Literal::Number(l)), Object::Literal(Literal::Number(r))) => {
                    Ok(Object::Literal(Literal::Number(l + r)))
                }
                (Object::Literal(Literal::String(l)), Object::Literal(Literal::String(r))) => {
                    Ok(Object::Literal(Literal::String(format!("{l}{r}"))))
                }
                _ => Err(RuntimeError {
                    token: operator.clone(),
                    message: format!(
                        "Operands must be two numbers or two strings, got {} and {}.",
                        left.type_name(),
                        right.type_name(),
                    ),
                }),
            },
            Type::Minus => numbers(&left, &right)
                .map(|(l, r)| Object::Literal(Literal::Number(l - r)))
                .ok_or_else(operands_must_be_numbers),
            Type::Star => numbers(&left, &right)
                .map(|(l, r)| Object::Literal(Literal::Number(l * r)))
                .ok_or_else(operands_must_be_numbers),
            Type::Slash => numbers(&left, &right)
                .map(|(l, r)| Object::Literal(Literal::Number(l / r)))
                .ok_or_else(operands_must_be_numbers),
            Type::Greater => numbers(&left, &right)
                .map(|(l, r)| Object::Literal(Literal::Bool(l > r)))
                .ok_or_else(operands_must_be_numbers),
            Type::GreaterEqual => numbers(&left, &right)
                .map(|(l, r)| Object::Literal(Literal::Bool(l >= r)))
                .ok_or_else(operands_must_be_numbers),
            Type::Less => numbers(&left, &right)
                .map(|(l, r)| Object::Literal(Literal::Bool(l < r)))
                .ok_or_else(operands_must_be_numbers),
            Type::LessEqual => numbers(&left, &right)
                .map(|(l, r)| Object::Literal(Literal::Bool(l <= r)))
                .ok_or_else(operands_must_be_numbers),
            Type::EqualEqual => Ok(Object::Literal(Literal::Bool(left == right))),
            Type::BangEqual => Ok(Object::Literal(Literal::Bool(left != right))),
            _ => unreachable!("parser never produces a binary operator outside this set"),
        }
    }

    fn evaluate_logical(&mut self, data: &LogicalData) -> Result<Object, RuntimeError> {
        let left = self.evaluate(&data.left)?;

        // Short-circuit returns the deciding operand itself, not a coerced bool.
        if data.operator.r#type == Type::Or {
            if left.is_truthy() {
                return Ok(left);
            }
        } else if !left.is_truthy() {
            return Ok(left);
        }

        self.evaluate(&data.right)
    }

    fn lookup_variable(&self, name: &Token, site_id: u32) -> Result<Object, RuntimeError> {
        let value = match self.locals.get(&site_id) {
            Some(&distance) => environment::get_at(&self.environment, distance, &name.lexeme),
            None => self.globals.borrow().get(&name.lexeme),
        };

        value.ok_or_else(|| RuntimeError {
            token: name.clone(),
            message: format!("Undefined variable '{}'.", name.lexeme),
        })
    }

    fn evaluate_assign(&mut self, data: &AssignData) -> Result<Object, RuntimeError> {
        let value = self.evaluate(&data.value)?;

        match self.locals.get(&data.site_id) {
            Some(&distance) => {
                environment::assign_at(&self.environment, distance, &data.name.lexeme, value.clone());
            }
            None => {
                if !self.globals.borrow_mut().assign(&data.name.lexeme, value.clone()) {
                    return Err(RuntimeError {
                        token: data.name.clone(),
                        message: format!("Undefined variable '{}'.", data.name.lexeme),
                    });
                }
            }
        }

        Ok(value)
    }

    fn evaluate_call(&mut self, data: &CallData) -> Result<Object, RuntimeError> {
        let callee = self.evaluate(&data.callee)?;

        let mut arguments = Vec::with_capacity(data.arguments.len());
        for argument in &data.arguments {
            arguments.push(self.evaluate(argument)?);
        }

        match callee {
            Object::Function(function) => {
                check_arity(&data.paren, function.arity(), arguments.len())?;
                function.call(self, arguments)
            }
            Object::NativeFunction(function) => {
                check_arity(&data.paren, function.arity(), arguments.len())?;
                function.call(self, arguments)
            }
            Object::Class(class) => {
                check_arity(&data.paren, class.arity(), arguments.len())?;
                let instance = Rc::new(RefCell::new(Instance::new(Rc::clone(&class))));
                if let Some(init) = class.find_method("init") {
                    init.bind(Rc::clone(&instance)).call(self, arguments)?;
                }
                Ok(Object::Instance(instance))
            }
            _ => Err(RuntimeError { token: data.paren.clone(), message: "Can only call functions and classes.".to_string() }),
        }
    }

    fn evaluate_get(&mut self, data: &GetData) -> Result<Object, RuntimeError> {
        let object = self.evaluate(&data.object)?;

        match object {
            Object::Instance(instance) => Instance::get(&instance, &data.name),
            _ => Err(RuntimeError { token: data.name.clone(), message: "Only instances have properties.".to_string() }),
        }
    }

    fn evaluate_set(&mut self, data: &SetData) -> Result<Object, RuntimeError> {
        let object = self.evaluate(&data.object)?;

        let instance = match object {
            Object::Instance(instance) => instance,
            _ => return Err(RuntimeError { token: data.name.clone(), message: "Only instances have fields.".to_string() }),
        };

        let value = self.evaluate(&data.value)?;
        instance.borrow_mut().set(&data.name, value.clone());
        Ok(value)
    }

    fn evaluate_super(&mut self, data: &SuperData) -> Result<Object, RuntimeError> {
        let distance = *self.locals.get(&data.site_id).expect("resolver always records a distance for 'super'");

        let superclass = match environment::get_at(&self.environment, distance, "super") {
            Some(Object::Class(class)) => class,
            _ => unreachable!("the binding at a recorded 'super' distance is always a Class"),
        };

        let instance = match environment::get_at(&self.environment, distance - 1, "self") {
            Some(Object::Instance(instance)) => instance,
            _ => unreachable!("the scope directly inside 'super' always binds 'self'"),
        };

        match superclass.find_method(&data.method.lexeme) {
            Some(method) => Ok(Object::Function(Rc::new(method.bind(instance)))),
            None => Err(RuntimeError {
                token: data.method.clone(),
                message: format!("Undefined property '{}'.", data.method.lexeme),
            }),
        }
    }
}

fn check_arity(paren: &Token, expected: usize, got: usize) -> Result<(), RuntimeError> {
    if expected == got {
        Ok(())
    } else {
        Err(RuntimeError {
            token: paren.clone(),
            message: format!("Expected {expected} arguments but got {got}."),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;
    use crate::resolver::Resolver;
    use crate::scanner::Scanner;

    fn run(source: &str) -> Result<String, RuntimeError> {
        let (tokens, _) = Scanner::new(source).scan_tokens();
        let statements = Parser::new(tokens).parse().expect("source parses");
        let locals = Resolver::new().resolve(&statements).expect("source resolves");

        let mut output = Vec::new();
        let mut interpreter = Interpreter::new(&mut output);
        interpreter.interpret(&statements, locals)?;
        Ok(String::from_utf8(output).expect("interpreter only writes UTF-8"))
    }

    #[test]
    fn super_dispatch_resolves_through_a_closure() {
        let source = r#"
            class A { say() { print "A"; } }
            class B : A {
                getClosure() { def closure() { super.say(); } return closure; }
                say() { print "B"; }
            }
            class C : B { say() { print "C"; } }
            C().getClosure()();
        "#;
        assert_eq!(run(source).unwrap(), "A\n");
    }

    #[test]
    fn closure_over_mutable_local_persists_across_calls() {
        let source = r#"
            def makeCounter() {
                var count = 0;
                def inc() { count = count + 1; print count; }
                return inc;
            }
            var c = makeCounter(); c(); c(); c();
        "#;
        assert_eq!(run(source).unwrap(), "1\n2\n3\n");
    }

    #[test]
    fn recursive_fibonacci() {
        let source = "def fib(n){ if (n<=1) return n; return fib(n-1)+fib(n-2); } print fib(10);";
        assert_eq!(run(source).unwrap(), "55\n");
    }

    #[test]
    fn shadowing_a_global_inside_a_block_does_not_retroactively_capture() {
        let source = r#"
            var a = "global";
            { def show() { print a; } show(); var a = "inner"; show(); }
        "#;
        assert_eq!(run(source).unwrap(), "global\nglobal\n");
    }

    #[test]
    fn for_loop_continue_still_runs_the_increment() {
        let source = "for (var i=0; i<5; i=i+1) { if (i==2) continue; print i; }";
        assert_eq!(run(source).unwrap(), "0\n1\n3\n4\n");
    }

    #[test]
    fn initializer_always_returns_the_instance() {
        let source = "class P { init(x){ self.x = x; } } var p = P(7); print p.x;";
        assert_eq!(run(source).unwrap(), "7\n");
    }

    #[test]
    fn calling_with_the_wrong_arity_is_a_runtime_error() {
        let source = "def f(a, b) { return a + b; } f(1);";
        let error = run(source).unwrap_err();
        assert!(error.message.contains("Expected 2 arguments but got 1"));
    }

    #[test]
    fn division_by_zero_follows_ieee754_rather_than_erroring() {
        let source = "print 1 / 0;";
        assert_eq!(run(source).unwrap(), "inf\n");
    }

    #[test]
    fn instance_and_class_print_formats() {
        let source = "class Foo {} print Foo; var f = Foo(); print f;";
        assert_eq!(run(source).unwrap(), "Foo\nFoo instance\n");
    }
}
