use std::time::Instant;

use diagnostics::{Diagnostic, Diagnostics, ErrorKind, Line, Location};
use parser::{Expr, Parser};
use scanner::{Scanner, Token, TokenData};

mod value;
pub use value::Value;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum RuntimeErrorType {
    #[error("Operand must be a number.")]
    OperandMustBeNumber,
    #[error("RHS operand must not be 0.")]
    DivisionByZero,
    #[error("Operands must be two numbers or two strings.")]
    InvalidAddOperands,
    #[error("Unsupported operator.")]
    UnsupportedOperator,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("[line {line}] Error at '{operator}': {error}")]
pub struct RuntimeError {
    pub error: RuntimeErrorType,
    pub line: Line,
    pub operator: String,
}

impl RuntimeError {
    fn new(error: RuntimeErrorType, operator: &Token) -> Self {
        Self { error, line: operator.line, operator: operator.lexeme.to_string() }
    }
}

impl From<RuntimeError> for Diagnostic {
    fn from(e: RuntimeError) -> Self {
        Diagnostic::new(ErrorKind::Runtime, e.line, Location::Lexeme(e.operator), e.error)
    }
}

/// Pending work of [`Interpreter::evaluate`].
enum Step<'e, 'a> {
    Eval(&'e Expr<'a>),
    Unary(&'e Token<'a>),
    Binary(&'e Token<'a>),
}

/// Tree-walking evaluator.
///
/// Operands are evaluated through an explicit step stack and value stack, so
/// arbitrarily long operator chains never recurse on the host stack.
#[derive(Debug, Default)]
pub struct Interpreter;

impl Interpreter {
    pub fn new() -> Self {
        Self
    }

    /// Evaluates `expr`, reporting a runtime error into `diagnostics`.
    pub fn interpret(&self, expr: &Expr, diagnostics: &mut Diagnostics) -> Option<Value> {
        match self.evaluate(expr) {
            Ok(value) => Some(value),
            Err(e) => {
                diagnostics.report(e);
                None
            }
        }
    }

    /// Evaluates `expr` left operand first. The first runtime error aborts.
    pub fn evaluate(&self, expr: &Expr) -> Result<Value, RuntimeError> {
        let mut steps = vec![Step::Eval(expr)];
        let mut stack: Vec<Value> = Vec::new();

        while let Some(step) = steps.pop() {
            match step {
                Step::Eval(Expr::Literal(value)) => stack.push((*value).into()),
                Step::Eval(Expr::Grouping(expr)) => steps.push(Step::Eval(expr)),
                Step::Eval(Expr::Unary { operator, right }) => {
                    steps.extend([Step::Unary(operator), Step::Eval(right)]);
                }
                Step::Eval(Expr::Binary { left, operator, right }) => {
                    steps.extend([Step::Binary(operator), Step::Eval(right), Step::Eval(left)]);
                }
                Step::Unary(operator) => {
                    let right = pop(&mut stack);
                    stack.push(self.unary(operator, right)?);
                }
                Step::Binary(operator) => {
                    let right = pop(&mut stack);
                    let left = pop(&mut stack);
                    stack.push(self.binary(operator, left, right)?);
                }
            }
        }

        Ok(pop(&mut stack))
    }

    fn unary(&self, operator: &Token, right: Value) -> Result<Value, RuntimeError> {
        use RuntimeErrorType::*;
        use TokenData as T;
        use Value as V;

        match (&operator.data, right) {
            (T::Minus, V::Number(n)) => Ok((-n).into()),
            (T::Minus, _) => Err(RuntimeError::new(OperandMustBeNumber, operator)),
            (T::Bang, v) => Ok((!v.is_truthy()).into()),
            _ => Err(RuntimeError::new(UnsupportedOperator, operator)),
        }
    }

    fn binary(&self, operator: &Token, left: Value, right: Value) -> Result<Value, RuntimeError> {
        use RuntimeErrorType::*;
        use TokenData as T;
        use Value as V;

        let error = |error| Err(RuntimeError::new(error, operator));

        match (&operator.data, left, right) {
            (T::Minus, V::Number(l), V::Number(r)) => Ok((l - r).into()),
            (T::Star, V::Number(l), V::Number(r)) => Ok((l * r).into()),
            (T::Slash, V::Number(_), V::Number(r)) if r == 0.0 => error(DivisionByZero),
            (T::Slash, V::Number(l), V::Number(r)) => Ok((l / r).into()),
            (T::Minus | T::Star | T::Slash, _, _) => error(OperandMustBeNumber),

            (T::Plus, V::Number(l), V::Number(r)) => Ok((l + r).into()),
            (T::Plus, V::Str(l), V::Str(r)) => Ok((l + &r).into()),
            // Mixed operands concatenate with the number's display form
            (T::Plus, V::Str(l), r @ V::Number(_)) => Ok(format!("{l}{r}").into()),
            (T::Plus, l @ V::Number(_), V::Str(r)) => Ok(format!("{l}{r}").into()),
            (T::Plus, _, _) => error(InvalidAddOperands),

            (T::Greater, V::Number(l), V::Number(r)) => Ok((l > r).into()),
            (T::GreaterEqual, V::Number(l), V::Number(r)) => Ok((l >= r).into()),
            (T::Less, V::Number(l), V::Number(r)) => Ok((l < r).into()),
            (T::LessEqual, V::Number(l), V::Number(r)) => Ok((l <= r).into()),
            (T::Greater | T::GreaterEqual | T::Less | T::LessEqual, _, _) => {
                error(OperandMustBeNumber)
            }

            (T::EqualEqual, l, r) => Ok((l == r).into()),
            (T::BangEqual, l, r) => Ok((l != r).into()),

            _ => error(UnsupportedOperator),
        }
    }
}

fn pop(stack: &mut Vec<Value>) -> Value {
    stack.pop().expect("Value stack underflow")
}

/// Scans, parses and evaluates `source`.
///
/// Each stage only runs if the previous one reported nothing, so the returned
/// diagnostics always stem from a single stage.
pub fn run_source(source: &str) -> Result<Value, Diagnostics> {
    run_source_with(source, |_| {})
}

/// Like [`run_source`], but hands the parsed expression to `inspect` before
/// evaluating it.
pub fn run_source_with(source: &str, inspect: impl FnOnce(&Expr)) -> Result<Value, Diagnostics> {
    let mut diagnostics = Diagnostics::new();

    let start = Instant::now();
    let tokens = Scanner::new(source).scan_tokens(&mut diagnostics);
    log::debug!("Scanned {} tokens in {:?}", tokens.len(), start.elapsed());
    if diagnostics.had_error() {
        return Err(diagnostics);
    }

    let start = Instant::now();
    let expr = Parser::new(&tokens).parse(&mut diagnostics);
    log::debug!("Parsed in {:?}", start.elapsed());
    let Some(expr) = expr else {
        return Err(diagnostics);
    };

    inspect(&expr);

    let start = Instant::now();
    let value = Interpreter::new().interpret(&expr, &mut diagnostics);
    log::debug!("Evaluated in {:?}", start.elapsed());
    value.ok_or(diagnostics)
}
