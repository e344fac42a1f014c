use std::collections::HashMap;

use crate::ast::*;
use crate::error::ResolveError;
use crate::token::Token;

#[derive(PartialEq, Clone, Copy)]
enum FunctionType {
    None,
    Function,
    Method,
    Initializer,
}

#[derive(PartialEq, Clone, Copy)]
enum ClassType {
    None,
    Class,
    Subclass,
}

/// A static pass that mirrors the scoping the interpreter will later
/// produce, without evaluating anything. For every `Variable`/`Assign`/
/// `self`/`super` site it records how many enclosing scopes to skip to find
/// the binding; an unrecorded site falls back to a global lookup at runtime.
///
/// Errors are accumulated rather than raised immediately so one resolve pass
/// can report every structural problem in the program, not just the first.
pub struct Resolver {
    scopes: Vec<HashMap<String, bool>>,
    locals: HashMap<u32, usize>,
    errors: Vec<ResolveError>,
    current_function: FunctionType,
    current_class: ClassType,
    loop_depth: usize,
}

impl Resolver {
    pub fn new() -> Self {
        Resolver {
            scopes: Vec::new(),
            locals: HashMap::new(),
            errors: Vec::new(),
            current_function: FunctionType::None,
            current_class: ClassType::None,
            loop_depth: 0,
        }
    }

    pub fn resolve(mut self, statements: &[Stmt]) -> Result<HashMap<u32, usize>, Vec<ResolveError>> {
        self.resolve_stmts(statements);

        if self.errors.is_empty() {
            Ok(self.locals)
        } else {
            Err(self.errors)
        }
    }

    /// REPL convenience: resolve a single expression in isolation, with no
    /// enclosing scopes, mirroring how the interpreter evaluates one in the
    /// global environment.
    pub fn resolve_expression(mut self, expr: &Expr) -> Result<HashMap<u32, usize>, Vec<ResolveError>> {
        self.resolve_expr(expr);

        if self.errors.is_empty() {
            Ok(self.locals)
        } else {
            Err(self.errors)
        }
    }

    fn error(&mut self, token: &Token, message: impl Into<String>) {
        self.errors.push(ResolveError { token: token.clone(), message: message.into() });
    }

    fn begin_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    fn end_scope(&mut self) {
        self.scopes.pop();
    }

    fn declare(&mut self, name: &Token) {
        if let Some(scope) = self.scopes.last_mut() {
            if scope.contains_key(&name.lexeme) {
                self.error(name, format!("Variable '{}' is already declared in this scope.", name.lexeme));
            }
            scope.insert(name.lexeme.clone(), false);
        }
    }

    fn define(&mut self, name: &Token) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.lexeme.clone(), true);
        }
    }

    fn define_synthetic(&mut self, name: &str) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string(), true);
        }
    }

    /// Scans scopes from innermost to outermost; the first one containing
    /// `name` fixes the distance. No match leaves the site unrecorded.
    fn resolve_local(&mut self, site_id: u32, name: &str) {
        for (i, scope) in self.scopes.iter().enumerate().rev() {
            if scope.contains_key(name) {
                self.locals.insert(site_id, self.scopes.len() - 1 - i);
                return;
            }
        }
    }

    fn resolve_stmts(&mut self, statements: &[Stmt]) {
        for statement in statements {
            self.resolve_stmt(statement);
        }
    }

    fn resolve_stmt(&mut self, statement: &Stmt) {
        match statement {
            Stmt::Expression(data) => self.resolve_expr(&data.expr),
            Stmt::Print(data) => self.resolve_expr(&data.expr),
            Stmt::Var(data) => {
                self.declare(&data.name);
                if let Some(initializer) = &data.initializer {
                    self.resolve_expr(initializer);
                }
                self.define(&data.name);
            }
            Stmt::Block(data) => {
                self.begin_scope();
                self.resolve_stmts(&data.statements);
                self.end_scope();
            }
            Stmt::If(data) => {
                self.resolve_expr(&data.condition);
                self.resolve_stmt(&data.then_branch);
                if let Some(else_branch) = &data.else_branch {
                    self.resolve_stmt(else_branch);
                }
            }
            Stmt::While(data) => {
                self.resolve_expr(&data.condition);
                self.loop_depth += 1;
                self.resolve_stmt(&data.body);
                self.loop_depth -= 1;
            }
            Stmt::For(data) => {
                // The header gets its own scope so a `var` in the
                // initializer is visible to the condition/increment/body
                // but nothing outside the loop.
                self.begin_scope();
                if let Some(initializer) = &data.initializer {
                    self.resolve_stmt(initializer);
                }
                if let Some(condition) = &data.condition {
                    self.resolve_expr(condition);
                }
                if let Some(increment) = &data.increment {
                    self.resolve_expr(increment);
                }
                self.loop_depth += 1;
                self.resolve_stmt(&data.body);
                self.loop_depth -= 1;
                self.end_scope();
            }
            Stmt::Break(data) => {
                if self.loop_depth == 0 {
                    self.error(&data.keyword, "Cannot use 'break' outside of a loop.");
                }
            }
            Stmt::Continue(data) => {
                if self.loop_depth == 0 {
                    self.error(&data.keyword, "Cannot use 'continue' outside of a loop.");
                }
            }
            Stmt::Return(data) => {
                if self.current_function == FunctionType::None {
                    self.error(&data.keyword, "Cannot return from top-level code.");
                }
                if let Some(value) = &data.value {
                    if self.current_function == FunctionType::Initializer {
                        self.error(&data.keyword, "Cannot return a value from an initializer.");
                    }
                    self.resolve_expr(value);
                }
            }
            Stmt::Function(data) => {
                self.declare(&data.name);
                self.define(&data.name);
                self.resolve_function(data, FunctionType::Function);
            }
            Stmt::Class(data) => self.resolve_class(data),
        }
    }

    fn resolve_function(&mut self, data: &FunctionData, kind: FunctionType) {
        let enclosing_function = self.current_function;
        self.current_function = kind;

        // A loop wrapping the whole `def` doesn't let a bare `break` inside
        // the function body escape to it, so the loop counter starts fresh
        // for the duration of the body.
        let enclosing_loop_depth = std::mem::replace(&mut self.loop_depth, 0);

        self.begin_scope();
        for param in &data.params {
            self.declare(param);
            self.define(param);
        }
        self.resolve_stmts(&data.body);
        self.end_scope();

        self.loop_depth = enclosing_loop_depth;
        self.current_function = enclosing_function;
    }

    fn resolve_class(&mut self, data: &ClassData) {
        let enclosing_class = self.current_class;
        self.current_class = ClassType::Class;

        self.declare(&data.name);
        self.define(&data.name);

        let has_superclass = if let Some(superclass) = &data.superclass {
            if superclass.name.lexeme == data.name.lexeme {
                self.error(&superclass.name, "A class cannot inherit from itself.");
                false
            } else {
                self.current_class = ClassType::Subclass;
                self.resolve_local(superclass.site_id, &superclass.name.lexeme);
                true
            }
        } else {
            false
        };

        if has_superclass {
            self.begin_scope();
            self.define_synthetic("super");
        }

        self.begin_scope();
        self.define_synthetic("self");

        for method in &data.methods {
            let kind = if method.name.lexeme == "init" {
                FunctionType::Initializer
            } else {
                FunctionType::Method
            };
            self.resolve_function(method, kind);
        }

        self.end_scope();

        if has_superclass {
            self.end_scope();
        }

        self.current_class = enclosing_class;
    }

    fn resolve_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Literal(_) => {}
            Expr::Unary(data) => self.resolve_expr(&data.expr),
            Expr::Binary(data) => {
                self.resolve_expr(&data.left);
                self.resolve_expr(&data.right);
            }
            Expr::Logical(data) => {
                self.resolve_expr(&data.left);
                self.resolve_expr(&data.right);
            }
            Expr::Grouping(data) => self.resolve_expr(&data.expr),
            Expr::Variable(data) => {
                if let Some(scope) = self.scopes.last() {
                    if scope.get(&data.name.lexeme) == Some(&false) {
                        self.error(&data.name, "Cannot read local variable in its own initializer.");
                    }
                }
                self.resolve_local(data.site_id, &data.name.lexeme);
            }
            Expr::Assign(data) => {
                self.resolve_expr(&data.value);
                self.resolve_local(data.site_id, &data.name.lexeme);
            }
            Expr::Call(data) => {
                self.resolve_expr(&data.callee);
                for argument in &data.arguments {
                    self.resolve_expr(argument);
                }
            }
            Expr::Get(data) => self.resolve_expr(&data.object),
            Expr::Set(data) => {
                self.resolve_expr(&data.value);
                self.resolve_expr(&data.object);
            }
            Expr::SelfExpr(data) => {
                if self.current_class == ClassType::None {
                    self.error(&data.keyword, "Cannot use 'self' outside of a class.");
                    return;
                }
                self.resolve_local(data.site_id, "self");
            }
            Expr::Super(data) => match self.current_class {
                ClassType::None => self.error(&data.keyword, "Cannot use 'super' outside of a class."),
                ClassType::Class => self.error(&data.keyword, "Cannot use 'super' in a class with no superclass."),
                ClassType::Subclass => self.resolve_local(data.site_id, "super"),
            },
        }
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}
