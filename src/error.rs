use std::io::Write;

use crate::token::{Location, Token, Type};

/// Renders an error message the way [`ErrorReporter`] expects: a single line,
/// no trailing newline.
pub trait RocksError {
    fn render(&self) -> String;
}

/// Represents an error that occurs during scanning.
#[derive(Debug)]
pub struct ScanError {
    pub location: Location,
    pub message: String,
}

impl RocksError for ScanError {
    fn render(&self) -> String {
        format!(
            "[line {line}:{column}] Error: {message}",
            line = self.location.line,
            column = self.location.column,
            message = self.message,
        )
    }
}

/// Represents an error that occurs during parsing.
#[derive(Debug)]
pub struct ParseError {
    pub token: Token,
    pub message: String,
}

impl RocksError for ParseError {
    fn render(&self) -> String {
        render_at_token(&self.token, &self.message)
    }
}

/// Represents an error that occurs during resolution.
#[derive(Debug)]
pub struct ResolveError {
    pub token: Token,
    pub message: String,
}

impl RocksError for ResolveError {
    fn render(&self) -> String {
        render_at_token(&self.token, &self.message)
    }
}

/// Represents an error that occurs during interpretation.
#[derive(Debug)]
pub struct RuntimeError {
    pub token: Token,
    pub message: String,
}

impl RocksError for RuntimeError {
    fn render(&self) -> String {
        render_at_token(&self.token, &self.message)
    }
}

fn render_at_token(token: &Token, message: &str) -> String {
    if token.r#type == Type::EOF {
        format!(
            "[line {line}:{column}] Error at end: {message}",
            line = token.location.line,
            column = token.location.column,
        )
    } else {
        format!(
            "[line {line}:{column}] Error at '{lexeme}': {message}",
            line = token.location.line,
            column = token.location.column,
            lexeme = token.lexeme,
        )
    }
}

/// Owns the diagnostics sink that used to be a pair of `static mut`s. One of
/// these lives per [`crate::rocks`] instance, so two interpreters running in
/// the same process (as in a test binary) never stomp on each other's error
/// state. Whether a run failed is derived from the `Result`s the pipeline
/// stages already return (see `lib.rs::run`), not tracked redundantly here;
/// this type's only job is rendering.
pub struct ErrorReporter<'a> {
    sink: &'a mut dyn Write,
}

impl<'a> ErrorReporter<'a> {
    pub fn new(sink: &'a mut dyn Write) -> Self {
        ErrorReporter { sink }
    }

    pub fn static_error(&mut self, error: &impl RocksError) {
        let _ = writeln!(self.sink, "{}", error.render());
    }

    pub fn runtime_error(&mut self, error: &RuntimeError) {
        let _ = writeln!(self.sink, "{}", error.render());
    }
}
