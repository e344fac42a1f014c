#![allow(clippy::needless_return)]

//! Rocks is a programming language written in Rust. It is a dynamically typed language with
//! lexical scoping and first-class functions. Rocks is a tree-walk interpreter with a hand-written
//! recursive descent parser. Rocks is a hobby project and is not intended for production use.
//!
//! Rocks is a dynamically typed language. This means that the type of a variable is determined at
//! runtime. This is in contrast to statically typed languages, where the type of a variable is
//! determined at compile time. Dynamically typed languages are often easier to use, but are
//! generally slower than statically typed languages.
//!
//! Rocks is a tree-walk interpreter. This means that the interpreter walks the abstract syntax tree
//! (AST) and evaluates each node. This is in contrast to a compiler, which would convert the AST
//! into bytecode or machine code. Tree-walk interpreters are generally easier to implement than
//! compilers, but are generally slower than compilers.
//!
//! Rocks is a hobby project and is not intended for production use. The goal of this project is to
//! learn more about programming languages and interpreters. This project is inspired by the
//! [Crafting Interpreters](https://craftinginterpreters.com/) book by Bob Nystrom.
//!
//! ## Scanning
//! The first step in the interpreter is scanning. Scanning is the process of converting a string of
//! characters into a list of tokens. A token is a single unit of a programming language. For
//! example, the string `1 + 2` would be converted into the following tokens:
//! ```text
//! [Number(1), Plus, Number(2)]
//! ```
//! The scanner is implemented in the [`scanner`](scanner) module as an iterator over the characters
//! in the source code. It is a simple state machine that returns the next token in the source code
//! when called.
//!
//! The scanner reports syntax errors in the source code as a [`ScanError`](error::ScanError).
//! These errors are trivial problems like an unterminated string literal or an unexpected character.
//! Scan errors are accumulated rather than raised immediately, so a single scan reports every
//! lexical mistake in the source instead of just the first.
//!
//! ## Parsing
//! The second step in the interpreter is parsing. Parsing is the process of converting a list of
//! tokens into an abstract syntax tree (AST). The parser is implemented in the [`parser`](parser)
//! module as a recursive descent parser. The parser transforms the list of tokens into expressions
//! and statements ([`ast::Expr`] and [`ast::Stmt`]). Expressions are pieces of code that produce a
//! value, specifically an [`Object`](object::Object). Statements are pieces of code that do not
//! produce a value but instead perform some action (a side effect).
//!
//! The parser reports syntax errors in the source code as a [`ParseError`](error::ParseError).
//! The parser synchronizes at the next statement boundary after an error so that several mistakes
//! in one source file are all reported in a single pass instead of stopping at the first.
//!
//! ## Resolving
//! The third step in the interpreter is resolving. Resolving is the process of statically analyzing
//! the AST to determine the scope of each variable reference before anything runs. The resolver is
//! implemented in the [`resolver`](resolver) module as a static tree-walk over the AST that mirrors
//! the scoping the interpreter will later reproduce at runtime. It reports errors as a
//! [`ResolveError`](error::ResolveError) — structural problems (a bad `return`, `self`/`super` used
//! outside a method, redeclaring a name in the same scope) that are syntactically valid but
//! semantically wrong, so neither the scanner nor the parser can catch them.
//!
//! ## Interpreting
//! The final step is interpreting: walking the resolved AST and producing effects. The interpreter
//! is implemented in the [`interpreter`](interpreter) module. It owns the live environment chain
//! (see [`environment`](environment)), materializes function, class and instance values, and
//! performs call/method dispatch. Runtime errors ([`RuntimeError`](error::RuntimeError)) — type
//! mismatches, arity mismatches, undefined names — can only be caught here, since they depend on
//! values the static passes never compute.

use std::io::Write;
use std::process;

use home::home_dir;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

pub mod ast;
pub mod class;
pub mod environment;
pub mod error;
pub mod function;
pub mod interpreter;
pub mod literal;
pub mod object;
pub mod parser;
pub mod resolver;
pub mod scanner;
pub mod token;

use error::ErrorReporter;
use interpreter::Interpreter;
use parser::Parser;
use resolver::Resolver;
use scanner::Scanner;

/// What a completed run boiled down to, for the sake of picking a process
/// exit code. Mirrors spec §6: 65 for a static (scan/parse/resolve) error,
/// 70 for a runtime error, 0 otherwise.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum RunStatus {
    Ok,
    StaticError,
    RuntimeError,
}

/// Drives one interpreter session: a file run, or a REPL. Owns the
/// interpreter (and therefore the global environment) so that successive
/// REPL lines share state, and both the `print` sink and the diagnostics
/// sink as plain fields rather than behind a `static mut` — two `rocks`
/// instances in the same process (as in a test binary running many cases
/// in parallel) never stomp on each other, and a test can hand in a buffer
/// in place of the real stdout/stderr.
#[allow(non_camel_case_types)]
pub struct rocks<'a> {
    interpreter: Interpreter<'a>,
    errors: &'a mut dyn Write,
}

impl<'a> rocks<'a> {
    /// `output` receives everything the interpreted program `print`s;
    /// `errors` receives `[line N] <message>`-shaped diagnostics. Kept as
    /// two independent sinks rather than one, matching spec §6's
    /// stdout/stderr split.
    pub fn new(output: &'a mut dyn Write, errors: &'a mut dyn Write) -> Self {
        rocks { interpreter: Interpreter::new(output), errors }
    }

    pub fn run_file(&mut self, path: String) {
        let contents = fs_read(&path);

        match self.run_source(&contents) {
            RunStatus::Ok => {}
            RunStatus::StaticError => process::exit(65),
            RunStatus::RuntimeError => process::exit(70),
        }
    }

    /// Runs one chunk of source as a full program (not REPL mode) and
    /// reports the outcome instead of exiting the process, so callers other
    /// than [`run_file`](Self::run_file) can inspect what happened.
    pub fn run_source(&mut self, source: &str) -> RunStatus {
        self.run(source, false)
    }

    pub fn run_prompt(&mut self) {
        let mut editor = DefaultEditor::new().expect("readline editor initializes");
        let history_path = home_dir().map(|home| home.join(".rocks_history"));
        if let Some(path) = &history_path {
            let _ = editor.load_history(path);
        }

        loop {
            match editor.readline("> ") {
                Ok(line) => {
                    let _ = editor.add_history_entry(line.as_str());
                    self.run(&line, true);
                }
                Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
                Err(_) => break,
            }
        }

        if let Some(path) = &history_path {
            let _ = editor.save_history(path);
        }
    }

    /// Runs one chunk of source through the whole pipeline. In REPL mode a
    /// source that parses as a single bare expression has its value printed,
    /// the way a REPL is expected to behave even though the language's
    /// grammar otherwise requires a `;`-terminated statement.
    fn run(&mut self, source: &str, repl: bool) -> RunStatus {
        let mut errors = ErrorReporter::new(self.errors);

        let (tokens, scan_errors) = Scanner::new(source).scan_tokens();
        if !scan_errors.is_empty() {
            for error in &scan_errors {
                errors.static_error(error);
            }
            return RunStatus::StaticError;
        }

        if repl {
            if let Some(status) = try_run_bare_expression(&mut self.interpreter, &tokens, &mut errors) {
                return status;
            }
        }

        let statements = match Parser::new(tokens).parse() {
            Ok(statements) => statements,
            Err(parse_errors) => {
                for error in &parse_errors {
                    errors.static_error(error);
                }
                return RunStatus::StaticError;
            }
        };

        let locals = match Resolver::new().resolve(&statements) {
            Ok(locals) => locals,
            Err(resolve_errors) => {
                for error in &resolve_errors {
                    errors.static_error(error);
                }
                return RunStatus::StaticError;
            }
        };

        match self.interpreter.interpret(&statements, locals) {
            Ok(()) => RunStatus::Ok,
            Err(error) => {
                errors.runtime_error(&error);
                RunStatus::RuntimeError
            }
        }
    }
}

/// Tries to parse `tokens` as a single expression (no trailing `;`) and, if
/// that succeeds, evaluates and prints it. Returns `None` when the source
/// isn't a bare expression, so the caller falls through to normal statement
/// parsing.
fn try_run_bare_expression(
    interpreter: &mut Interpreter,
    tokens: &[crate::token::Token],
    errors: &mut ErrorReporter,
) -> Option<RunStatus> {
    let expr = Parser::new(tokens.to_vec()).parse_single_expression().ok()?;
    let locals = Resolver::new().resolve_expression(&expr).ok()?;

    Some(match interpreter.interpret_expression(&expr, locals) {
        Ok(()) => RunStatus::Ok,
        Err(error) => {
            errors.runtime_error(&error);
            RunStatus::RuntimeError
        }
    })
}

fn fs_read(path: &str) -> String {
    std::fs::read_to_string(path).unwrap_or_else(|error| {
        eprintln!("Could not read file '{path}': {error}");
        process::exit(64);
    })
}
