use std::rc::Rc;

use crate::ast::*;
use crate::error::ParseError;
use crate::token::{Token, Type};

const MAX_ARGS: usize = 255;

/// A recursive-descent parser. Each grammar rule gets its own method, from
/// lowest precedence (`expression`) down to the primaries; the call chain
/// mirrors the grammar directly.
///
/// A single malformed statement does not abort the whole parse: on error the
/// parser records it and synchronizes to the next statement boundary, so a
/// source file with several mistakes gets them all reported in one pass.
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    errors: Vec<ParseError>,
    next_site_id: u32,
}

type ExprResult = Result<Expr, ParseError>;
type StmtResult = Result<Stmt, ParseError>;

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser { tokens, current: 0, errors: Vec::new(), next_site_id: 0 }
    }

    pub fn parse(mut self) -> Result<Vec<Stmt>, Vec<ParseError>> {
        let mut statements = Vec::new();

        while !self.is_at_end() {
            match self.declaration() {
                Ok(statement) => statements.push(statement),
                Err(error) => {
                    self.errors.push(error);
                    self.synchronize();
                }
            }
        }

        if self.errors.is_empty() {
            Ok(statements)
        } else {
            Err(self.errors)
        }
    }

    /// REPL convenience: parse the whole token stream as a single expression
    /// with no trailing `;` required, so a bare expression can be evaluated
    /// and its value printed instead of demanding statement syntax.
    pub fn parse_single_expression(mut self) -> Result<Expr, Vec<ParseError>> {
        let expr = self.expression().map_err(|error| vec![error])?;

        if !self.is_at_end() {
            return Err(vec![ParseError {
                token: self.peek().clone(),
                message: "Expect end of expression.".to_string(),
            }]);
        }

        Ok(expr)
    }

    fn site_id(&mut self) -> u32 {
        let id = self.next_site_id;
        self.next_site_id += 1;
        id
    }

    // --- token plumbing ---

    fn is_at_end(&self) -> bool {
        self.peek().r#type == Type::EOF
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current - 1]
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    fn check(&self, r#type: Type) -> bool {
        !self.is_at_end() && self.peek().r#type == r#type
    }

    fn matches(&mut self, types: &[Type]) -> bool {
        for r#type in types {
            if self.check(*r#type) {
                self.advance();
                return true;
            }
        }
        false
    }

    fn consume(&mut self, r#type: Type, message: &str) -> Result<&Token, ParseError> {
        if self.check(r#type) {
            Ok(self.advance())
        } else {
            Err(ParseError { token: self.peek().clone(), message: message.to_string() })
        }
    }

    fn error(&self, token: &Token, message: impl Into<String>) -> ParseError {
        ParseError { token: token.clone(), message: message.into() }
    }

    /// After a parse error, skip tokens until we are plausibly standing at
    /// the start of a new statement, so later statements still get parsed
    /// (and their own errors reported) instead of cascading failures.
    fn synchronize(&mut self) {
        self.advance();

        while !self.is_at_end() {
            if self.previous().r#type == Type::Semicolon {
                return;
            }

            match self.peek().r#type {
                Type::Class | Type::Def | Type::Var | Type::For | Type::If
                | Type::While | Type::Print | Type::Return => return,
                _ => {
                    self.advance();
                }
            }
        }
    }

    // --- declarations ---

    fn declaration(&mut self) -> StmtResult {
        if self.matches(&[Type::Class]) {
            self.class_declaration()
        } else if self.matches(&[Type::Def]) {
            self.function_declaration("function")
        } else if self.matches(&[Type::Var]) {
            self.var_declaration()
        } else {
            self.statement()
        }
    }

    fn class_declaration(&mut self) -> StmtResult {
        let name = self.consume(Type::Identifier, "Expect class name.")?.clone();

        let superclass = if self.matches(&[Type::Colon]) {
            let super_name = self.consume(Type::Identifier, "Expect superclass name.")?.clone();
            Some(VariableData { name: super_name, site_id: self.site_id() })
        } else {
            None
        };

        self.consume(Type::LeftBrace, "Expect '{' before class body.")?;

        let mut methods = Vec::new();
        while !self.check(Type::RightBrace) && !self.is_at_end() {
            let method = self.function_declaration("method")?;
            match method {
                Stmt::Function(data) => methods.push(data),
                _ => unreachable!("function_declaration always returns Stmt::Function"),
            }
        }

        self.consume(Type::RightBrace, "Expect '}' after class body.")?;

        Ok(Stmt::Class(ClassData { name, superclass, methods }))
    }

    fn function_declaration(&mut self, kind: &str) -> StmtResult {
        let name = self.consume(Type::Identifier, &format!("Expect {kind} name."))?.clone();

        self.consume(Type::LeftParen, &format!("Expect '(' after {kind} name."))?;
        let mut params = Vec::new();
        if !self.check(Type::RightParen) {
            loop {
                if params.len() >= MAX_ARGS {
                    let token = self.peek().clone();
                    self.errors.push(self.error(&token, format!("Cannot have more than {MAX_ARGS} parameters.")));
                }
                params.push(self.consume(Type::Identifier, "Expect parameter name.")?.clone());
                if !self.matches(&[Type::Comma]) {
                    break;
                }
            }
        }
        self.consume(Type::RightParen, "Expect ')' after parameters.")?;

        self.consume(Type::LeftBrace, &format!("Expect '{{' before {kind} body."))?;
        let body = self.block()?;

        Ok(Stmt::Function(Rc::new(FunctionData { name, params, body })))
    }

    fn var_declaration(&mut self) -> StmtResult {
        let name = self.consume(Type::Identifier, "Expect variable name.")?.clone();

        let initializer = if self.matches(&[Type::Equal]) {
            Some(self.expression()?)
        } else {
            None
        };

        self.consume(Type::Semicolon, "Expect ';' after variable declaration.")?;
        Ok(Stmt::Var(VarData { name, initializer }))
    }

    // --- statements ---

    fn statement(&mut self) -> StmtResult {
        if self.matches(&[Type::Print]) {
            self.print_statement()
        } else if self.matches(&[Type::LeftBrace]) {
            Ok(Stmt::Block(BlockData { statements: self.block()? }))
        } else if self.matches(&[Type::If]) {
            self.if_statement()
        } else if self.matches(&[Type::While]) {
            self.while_statement()
        } else if self.matches(&[Type::For]) {
            self.for_statement()
        } else if self.matches(&[Type::Break]) {
            let keyword = self.previous().clone();
            self.consume(Type::Semicolon, "Expect ';' after 'break'.")?;
            Ok(Stmt::Break(BreakData { keyword }))
        } else if self.matches(&[Type::Continue]) {
            let keyword = self.previous().clone();
            self.consume(Type::Semicolon, "Expect ';' after 'continue'.")?;
            Ok(Stmt::Continue(ContinueData { keyword }))
        } else if self.matches(&[Type::Return]) {
            self.return_statement()
        } else {
            self.expression_statement()
        }
    }

    fn print_statement(&mut self) -> StmtResult {
        let expr = self.expression()?;
        self.consume(Type::Semicolon, "Expect ';' after value.")?;
        Ok(Stmt::Print(PrintData { expr }))
    }

    fn return_statement(&mut self) -> StmtResult {
        let keyword = self.previous().clone();
        let value = if self.check(Type::Semicolon) { None } else { Some(self.expression()?) };
        self.consume(Type::Semicolon, "Expect ';' after return value.")?;
        Ok(Stmt::Return(ReturnData { keyword, value }))
    }

    fn block(&mut self) -> Result<Vec<Stmt>, ParseError> {
        let mut statements = Vec::new();

        while !self.check(Type::RightBrace) && !self.is_at_end() {
            match self.declaration() {
                Ok(statement) => statements.push(statement),
                Err(error) => {
                    self.errors.push(error);
                    self.synchronize();
                }
            }
        }

        self.consume(Type::RightBrace, "Expect '}' after block.")?;
        Ok(statements)
    }

    fn if_statement(&mut self) -> StmtResult {
        self.consume(Type::LeftParen, "Expect '(' after 'if'.")?;
        let condition = self.expression()?;
        self.consume(Type::RightParen, "Expect ')' after if condition.")?;

        let then_branch = Box::new(self.statement()?);
        let else_branch = if self.matches(&[Type::Else]) {
            Some(Box::new(self.statement()?))
        } else {
            None
        };

        Ok(Stmt::If(IfData { condition, then_branch, else_branch }))
    }

    fn while_statement(&mut self) -> StmtResult {
        self.consume(Type::LeftParen, "Expect '(' after 'while'.")?;
        let condition = self.expression()?;
        self.consume(Type::RightParen, "Expect ')' after condition.")?;
        let body = Box::new(self.statement()?);

        Ok(Stmt::While(WhileData { condition, body }))
    }

    fn for_statement(&mut self) -> StmtResult {
        self.consume(Type::LeftParen, "Expect '(' after 'for'.")?;

        let initializer = if self.matches(&[Type::Semicolon]) {
            None
        } else if self.matches(&[Type::Var]) {
            Some(Box::new(self.var_declaration()?))
        } else {
            Some(Box::new(self.expression_statement()?))
        };

        let condition = if self.check(Type::Semicolon) { None } else { Some(self.expression()?) };
        self.consume(Type::Semicolon, "Expect ';' after loop condition.")?;

        let increment = if self.check(Type::RightParen) { None } else { Some(self.expression()?) };
        self.consume(Type::RightParen, "Expect ')' after for clauses.")?;

        let body = Box::new(self.statement()?);

        Ok(Stmt::For(ForData { initializer, condition, increment, body }))
    }

    fn expression_statement(&mut self) -> StmtResult {
        let expr = self.expression()?;
        self.consume(Type::Semicolon, "Expect ';' after expression.")?;
        Ok(Stmt::Expression(ExpressionData { expr }))
    }

    // --- expressions, lowest to highest precedence ---

    fn expression(&mut self) -> ExprResult {
        self.assignment()
    }

    fn assignment(&mut self) -> ExprResult {
        let expr = self.or()?;

        if self.matches(&[Type::Equal]) {
            let equals = self.previous().clone();
            let value = self.assignment()?;

            return match expr {
                Expr::Variable(data) => {
                    Ok(Expr::Assign(AssignData { name: data.name, value: Box::new(value), site_id: self.site_id() }))
                }
                Expr::Get(data) => {
                    Ok(Expr::Set(SetData { object: data.object, name: data.name, value: Box::new(value) }))
                }
                _ => Err(self.error(&equals, "Invalid assignment target.")),
            };
        }

        Ok(expr)
    }

    fn or(&mut self) -> ExprResult {
        let mut expr = self.and()?;

        while self.matches(&[Type::Or]) {
            let operator = self.previous().clone();
            let right = self.and()?;
            expr = Expr::Logical(LogicalData { left: Box::new(expr), operator, right: Box::new(right) });
        }

        Ok(expr)
    }

    fn and(&mut self) -> ExprResult {
        let mut expr = self.equality()?;

        while self.matches(&[Type::And]) {
            let operator = self.previous().clone();
            let right = self.equality()?;
            expr = Expr::Logical(LogicalData { left: Box::new(expr), operator, right: Box::new(right) });
        }

        Ok(expr)
    }

    fn equality(&mut self) -> ExprResult {
        let mut expr = self.comparison()?;

        while self.matches(&[Type::BangEqual, Type::EqualEqual]) {
            let operator = self.previous().clone();
            let right = self.comparison()?;
            expr = Expr::Binary(BinaryData { left: Box::new(expr), operator, right: Box::new(right) });
        }

        Ok(expr)
    }

    fn comparison(&mut self) -> ExprResult {
        let mut expr = self.term()?;

        while self.matches(&[Type::Greater, Type::GreaterEqual, Type::Less, Type::LessEqual]) {
            let operator = self.previous().clone();
            let right = self.term()?;
            expr = Expr::Binary(BinaryData { left: Box::new(expr), operator, right: Box::new(right) });
        }

        Ok(expr)
    }

    fn term(&mut self) -> ExprResult {
        let mut expr = self.factor()?;

        while self.matches(&[Type::Minus, Type::Plus]) {
            let operator = self.previous().clone();
            let right = self.factor()?;
            expr = Expr::Binary(BinaryData { left: Box::new(expr), operator, right: Box::new(right) });
        }

        Ok(expr)
    }

    fn factor(&mut self) -> ExprResult {
        let mut expr = self.unary()?;

        while self.matches(&[Type::Slash, Type::Star]) {
            let operator = self.previous().clone();
            let right = self.unary()?;
            expr = Expr::Binary(BinaryData { left: Box::new(expr), operator, right: Box::new(right) });
        }

        Ok(expr)
    }

    fn unary(&mut self) -> ExprResult {
        if self.matches(&[Type::Bang, Type::Minus]) {
            let operator = self.previous().clone();
            let expr = self.unary()?;
            return Ok(Expr::Unary(UnaryData { operator, expr: Box::new(expr) }));
        }

        self.call()
    }

    fn call(&mut self) -> ExprResult {
        let mut expr = self.primary()?;

        loop {
            if self.matches(&[Type::LeftParen]) {
                expr = self.finish_call(expr)?;
            } else if self.matches(&[Type::Dot]) {
                let name = self.consume(Type::Identifier, "Expect property name after '.'.")?.clone();
                expr = Expr::Get(GetData { object: Box::new(expr), name });
            } else {
                break;
            }
        }

        Ok(expr)
    }

    fn finish_call(&mut self, callee: Expr) -> ExprResult {
        let mut arguments = Vec::new();

        if !self.check(Type::RightParen) {
            loop {
                if arguments.len() >= MAX_ARGS {
                    let token = self.peek().clone();
                    self.errors.push(self.error(&token, format!("Cannot have more than {MAX_ARGS} arguments.")));
                }
                arguments.push(self.expression()?);
                if !self.matches(&[Type::Comma]) {
                    break;
                }
            }
        }

        let paren = self.consume(Type::RightParen, "Expect ')' after arguments.")?.clone();
        Ok(Expr::Call(CallData { callee: Box::new(callee), paren, arguments }))
    }

    fn primary(&mut self) -> ExprResult {
        if self.matches(&[Type::False]) {
            return Ok(Expr::Literal(Literal::Bool(false)));
        }
        if self.matches(&[Type::True]) {
            return Ok(Expr::Literal(Literal::Bool(true)));
        }
        if self.matches(&[Type::Nil]) {
            return Ok(Expr::Literal(Literal::Nil));
        }
        if self.matches(&[Type::Number, Type::String]) {
            let literal = self.previous().literal.clone()
                .expect("scanner always attaches a literal to Number/String tokens");
            return Ok(Expr::Literal(literal));
        }
        if self.matches(&[Type::Super]) {
            let keyword = self.previous().clone();
            self.consume(Type::Dot, "Expect '.' after 'super'.")?;
            let method = self.consume(Type::Identifier, "Expect superclass method name.")?.clone();
            return Ok(Expr::Super(SuperData { keyword, method, site_id: self.site_id() }));
        }
        if self.matches(&[Type::SelfKw]) {
            let keyword = self.previous().clone();
            return Ok(Expr::SelfExpr(SelfData { keyword, site_id: self.site_id() }));
        }
        if self.matches(&[Type::Identifier]) {
            let name = self.previous().clone();
            return Ok(Expr::Variable(VariableData { name, site_id: self.site_id() }));
        }
        if self.matches(&[Type::LeftParen]) {
            let expr = self.expression()?;
            self.consume(Type::RightParen, "Expect ')' after expression.")?;
            return Ok(Expr::Grouping(GroupingData { expr: Box::new(expr) }));
        }

        Err(self.error(self.peek(), "Expect expression."))
    }
}
