// ABOUTME: The tree-walking evaluator, executes the AST against the environment chain
// Walks statements in declaration order, mutating the active environment and writing to an
// injected output sink. Runtime errors abort only the top-level statement in which they
// occurred; execution resumes at the next one.

use std::cell::{Cell, RefCell};
use std::io::{self, Write};
use std::rc::Rc;

use crate::ast::{Expr, Stmt};
use crate::environment::Environment;
use crate::error::RuntimeError;
use crate::token::{Token, TokenKind};
use crate::value::Value;

/// An explicit interpreter object, not process-global state. The
/// CLI and REPL each construct exactly one; tests construct a fresh one per case so that
/// `had_runtime_error` never leaks between unrelated programs.
pub struct Interpreter<W: Write> {
    environment: RefCell<Rc<Environment>>,
    output: RefCell<W>,
    had_runtime_error: Cell<bool>,
}

impl Interpreter<io::Stdout> {
    pub fn new_stdout() -> Self {
        Interpreter::new(io::stdout())
    }
}

impl<W: Write> Interpreter<W> {
    pub fn new(output: W) -> Self {
        Interpreter {
            environment: RefCell::new(Environment::new_global()),
            output: RefCell::new(output),
            had_runtime_error: Cell::new(false),
        }
    }

    /// Whether any runtime error has been reported since construction (or since the last
    /// `reset_had_runtime_error`).
    pub fn had_runtime_error(&self) -> bool {
        self.had_runtime_error.get()
    }

    pub fn reset_had_runtime_error(&self) {
        self.had_runtime_error.set(false);
    }

    /// Consumes the interpreter and returns its output sink, e.g. a `Vec<u8>` buffer in tests.
    pub fn into_output(self) -> W {
        self.output.into_inner()
    }

    /// Runs a full program: each top-level statement is executed independently. A runtime
    /// error is reported to the output sink's companion stderr-like channel (here: printed via
    /// `report_runtime_error`) and aborts only that statement.
    pub fn run(&self, statements: &[Stmt]) {
        for statement in statements {
            if let Err(err) = self.execute(statement) {
                self.report_runtime_error(&err);
            }
        }
    }

    fn report_runtime_error(&self, err: &RuntimeError) {
        self.had_runtime_error.set(true);
        tracing::debug!(error = %err, "runtime error");
        let mut out = self.output.borrow_mut();
        let _ = writeln!(out, "{err}");
    }

    fn execute(&self, stmt: &Stmt) -> Result<(), RuntimeError> {
        match stmt {
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;
                Ok(())
            }
            Stmt::Print(expr) => {
                let value = self.evaluate(expr)?;
                let mut out = self.output.borrow_mut();
                let _ = writeln!(out, "{value}");
                Ok(())
            }
            Stmt::Var(name, initializer) => self.execute_var(name, initializer.as_ref()),
            Stmt::Block(statements) => {
                let enclosed = Environment::new_enclosed(self.environment.borrow().clone());
                self.execute_block(statements, enclosed)
            }
            Stmt::If(condition, then_branch, else_branch) => {
                if self.evaluate(condition)?.is_truthy() {
                    self.execute(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch)
                } else {
                    Ok(())
                }
            }
            Stmt::While(condition, body) => {
                while self.evaluate(condition)?.is_truthy() {
                    self.execute(body)?;
                }
                Ok(())
            }
            Stmt::For {
                initializer,
                condition,
                increment,
                body,
            } => self.execute_for(initializer.as_deref(), condition, increment, body),
        }
    }

    fn execute_var(&self, name: &Token, initializer: Option<&Expr>) -> Result<(), RuntimeError> {
        // A re-declaration in the same scope is a no-op until assigned:
        // `var x; var x;` leaves the original binding untouched.
        let env = self.environment.borrow().clone();
        if !env.defined_here(&name.lexeme) {
            env.define(&name.lexeme, Value::Nil);
        }
        if let Some(initializer) = initializer {
            let value = self.evaluate(initializer)?;
            env.assign(name, value)?;
        }
        Ok(())
    }

    /// Executes `statements` with `env` as the active environment, restoring the previous
    /// environment on every exit path — normal return or an error propagated via `?` — via an
    /// RAII scope guard.
    fn execute_block(&self, statements: &[Stmt], env: Rc<Environment>) -> Result<(), RuntimeError> {
        let previous = self.environment.replace(env);
        let _guard = RestoreEnvironment {
            interpreter: self,
            previous,
        };
        for statement in statements {
            self.execute(statement)?;
        }
        Ok(())
    }

    fn execute_for(
        &self,
        initializer: Option<&Stmt>,
        condition: &Option<Expr>,
        increment: &Option<Expr>,
        body: &Stmt,
    ) -> Result<(), RuntimeError> {
        // The initializer runs in whatever environment the `for` itself runs in — there is no
        // extra scope wrapping the loop as a whole (only `body`, if it is a `Block`, gets one
        // per iteration). This matches the Go interpreter this was distilled from exactly.
        if let Some(initializer) = initializer {
            self.execute(initializer)?;
        }

        loop {
            if let Some(condition) = condition {
                if !self.evaluate(condition)?.is_truthy() {
                    break;
                }
            }

            self.execute(body)?;

            if let Some(increment) = increment {
                self.evaluate(increment)?;
            }
        }

        Ok(())
    }

    fn evaluate(&self, expr: &Expr) -> Result<Value, RuntimeError> {
        match expr {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Grouping(inner) => self.evaluate(inner),
            Expr::Variable(name) => self.environment.borrow().get(name),
            Expr::Assign(name, value_expr) => {
                let value = self.evaluate(value_expr)?;
                self.environment.borrow().assign(name, value.clone())?;
                Ok(value)
            }
            Expr::Unary(operator, right) => self.evaluate_unary(operator, right),
            Expr::Binary(left, operator, right) => self.evaluate_binary(left, operator, right),
        }
    }

    fn evaluate_unary(&self, operator: &Token, right: &Expr) -> Result<Value, RuntimeError> {
        let right = self.evaluate(right)?;
        match operator.kind {
            TokenKind::Minus => match right {
                Value::Number(n) => Ok(Value::Number(-n)),
                _ => Err(RuntimeError::new(&operator.lexeme, "Operand must be a number.")),
            },
            TokenKind::Bang => Ok(Value::Bool(!right.is_truthy())),
            _ => Err(RuntimeError::new(&operator.lexeme, "Unexpected unary operator.")),
        }
    }

    fn evaluate_binary(
        &self,
        left: &Expr,
        operator: &Token,
        right: &Expr,
    ) -> Result<Value, RuntimeError> {
        // Both operands are evaluated, left then right, before either is type-checked.
        let left = self.evaluate(left)?;
        let right = self.evaluate(right)?;

        use TokenKind::*;
        match operator.kind {
            BangEqual => Ok(Value::Bool(!left.is_equal(&right))),
            EqualEqual => Ok(Value::Bool(left.is_equal(&right))),

            Minus | Star | Greater | GreaterEqual | Less | LessEqual => {
                let (l, r) = self
                    .both_numbers(&left, &right)
                    .ok_or_else(|| RuntimeError::new(&operator.lexeme, "Operands must be numbers."))?;
                Ok(match operator.kind {
                    Minus => Value::Number(l - r),
                    Star => Value::Number(l * r),
                    Greater => Value::Bool(l > r),
                    GreaterEqual => Value::Bool(l >= r),
                    Less => Value::Bool(l < r),
                    LessEqual => Value::Bool(l <= r),
                    _ => unreachable!(),
                })
            }

            Slash => {
                let (l, r) = self
                    .both_numbers(&left, &right)
                    .ok_or_else(|| RuntimeError::new(&operator.lexeme, "Operands must be numbers."))?;
                if r == 0.0 {
                    return Err(RuntimeError::new(&operator.lexeme, "Division by zero."));
                }
                Ok(Value::Number(l / r))
            }

            Mod => {
                let (l, r) = self.both_numbers(&left, &right).ok_or_else(|| {
                    RuntimeError::new(&operator.lexeme, "Operands of modulo must be numbers.")
                })?;
                if r == 0.0 {
                    return Err(RuntimeError::new(&operator.lexeme, "Modulo by zero."));
                }
                Ok(Value::Number(((l as i64) % (r as i64)) as f64))
            }

            Plus => self.both_numbers(&left, &right).map(|(l, r)| Value::Number(l + r)).ok_or_else(|| {
                RuntimeError::new(
                    &operator.lexeme,
                    "Operands must be two numbers or two strings.",
                )
            }),

            _ => Err(RuntimeError::new(&operator.lexeme, "Unexpected binary operator.")),
        }
    }

    fn both_numbers(&self, left: &Value, right: &Value) -> Option<(f64, f64)> {
        match (left, right) {
            (Value::Number(l), Value::Number(r)) => Some((*l, *r)),
            _ => None,
        }
    }
}

/// RAII scope guard restoring the interpreter's previous active environment on drop — the
/// sole resource-lifetime invariant in this interpreter.
struct RestoreEnvironment<'a, W: Write> {
    interpreter: &'a Interpreter<W>,
    previous: Rc<Environment>,
}

impl<'a, W: Write> Drop for RestoreEnvironment<'a, W> {
    fn drop(&mut self) {
        self.interpreter
            .environment
            .replace(std::mem::replace(&mut self.previous, Environment::new_global()));
    }
}
