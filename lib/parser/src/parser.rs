use diagnostics::{Diagnostic, Diagnostics, ErrorKind, Line};
use scanner::{Token, TokenData, TokenType};

mod expr;
pub mod printer;
pub use expr::{Expr, LiteralValue};

use TokenData::*;

/// Limit for nested unary operators and parentheses, so that adversarial input
/// can't exhaust the stack of the parser or the interpreter.
pub const MAX_NESTING: usize = 255;

pub type Result<'a, T> = std::result::Result<T, ParseError<'a>>;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ParseErrorType {
    #[error("Expect ')' after expression.")]
    MissingRightParen,
    #[error("Expecting an expression.")]
    ExpectedExpression,
    #[error("Expect end of expression.")]
    ExpectedEof,
    #[error("Expression nests too deeply.")]
    TooDeeplyNested,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("[line {}] Error{}: {}", .token.line, .token.location(), .error)]
pub struct ParseError<'a> {
    pub error: ParseErrorType,
    pub token: Token<'a>,
}

impl<'a> ParseError<'a> {
    fn new(error: ParseErrorType, token: Token<'a>) -> Self {
        Self { error, token }
    }
}

impl From<ParseError<'_>> for Diagnostic {
    fn from(e: ParseError<'_>) -> Self {
        Diagnostic::new(ErrorKind::Syntax, e.token.line, e.token.location(), e.error)
    }
}

/// Recursive descent parser for a single expression:
///
/// ```text
/// expression     → equality
/// equality       → comparison ( ( "!=" | "==" ) comparison )*
/// comparison     → addition ( ( ">" | ">=" | "<" | "<=" ) addition )*
/// addition       → multiplication ( ( "-" | "+" ) multiplication )*
/// multiplication → unary ( ( "/" | "*" ) unary )*
/// unary          → ( "!" | "-" ) unary | primary
/// primary        → NUMBER | STRING | "false" | "true" | "nil" | "(" expression ")"
/// ```
#[derive(Debug)]
pub struct Parser<'t, 'a> {
    tokens: &'t [Token<'a>],
    current: usize,
    depth: usize,
}

impl<'t, 'a> Parser<'t, 'a> {
    pub fn new(tokens: &'t [Token<'a>]) -> Self {
        Self { tokens, current: 0, depth: 0 }
    }

    /// Parses the whole token sequence as one expression. On a syntax error the
    /// error is reported into `diagnostics` and `None` is returned.
    pub fn parse(mut self, diagnostics: &mut Diagnostics) -> Option<Expr<'a>> {
        match self.expression().and_then(|expr| self.end(expr)) {
            Ok(expr) => {
                log::trace!("Parsed {}", expr);
                Some(expr)
            }
            Err(e) => {
                log::trace!("Hit error: {:?}", e);
                diagnostics.report(e);
                None
            }
        }
    }

    fn end(&mut self, expr: Expr<'a>) -> Result<'a, Expr<'a>> {
        let token = self.peek();
        if token.is_eof() {
            Ok(expr)
        } else {
            Err(ParseError::new(ParseErrorType::ExpectedEof, token))
        }
    }

    fn expression(&mut self) -> Result<'a, Expr<'a>> {
        self.equality()
    }

    fn equality(&mut self) -> Result<'a, Expr<'a>> {
        let mut expr = self.comparison()?;

        while let BangEqual | EqualEqual = self.peek().data {
            let operator = self.advance();
            let right = self.comparison()?;
            expr = Expr::binary(expr, operator, right);
        }
        Ok(expr)
    }

    fn comparison(&mut self) -> Result<'a, Expr<'a>> {
        let mut expr = self.addition()?;

        while let Greater | GreaterEqual | Less | LessEqual = self.peek().data {
            let operator = self.advance();
            let right = self.addition()?;
            expr = Expr::binary(expr, operator, right);
        }
        Ok(expr)
    }

    fn addition(&mut self) -> Result<'a, Expr<'a>> {
        let mut expr = self.multiplication()?;

        while let Minus | Plus = self.peek().data {
            let operator = self.advance();
            let right = self.multiplication()?;
            expr = Expr::binary(expr, operator, right);
        }
        Ok(expr)
    }

    fn multiplication(&mut self) -> Result<'a, Expr<'a>> {
        let mut expr = self.unary()?;

        while let Slash | Star = self.peek().data {
            let operator = self.advance();
            let right = self.unary()?;
            expr = Expr::binary(expr, operator, right);
        }
        Ok(expr)
    }

    fn unary(&mut self) -> Result<'a, Expr<'a>> {
        if let Bang | Minus = self.peek().data {
            let operator = self.advance();
            let right = self.nested(Self::unary)?;
            return Ok(Expr::unary(operator, right));
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<'a, Expr<'a>> {
        let token = self.peek();
        let literal = match token.data {
            False => LiteralValue::Boolean(false),
            True => LiteralValue::Boolean(true),
            Nil => LiteralValue::Nil,
            Number(n) => LiteralValue::Number(n),
            Str(s) => LiteralValue::Str(s),
            LeftParen => {
                self.advance();
                let expr = self.nested(Self::expression)?;
                self.consume(TokenType::RightParen, ParseErrorType::MissingRightParen)?;
                return Ok(Expr::grouping(expr));
            }
            _ => return Err(ParseError::new(ParseErrorType::ExpectedExpression, token)),
        };
        self.advance();
        Ok(Expr::Literal(literal))
    }
}

// Helpers
impl<'t, 'a> Parser<'t, 'a> {
    fn nested<T>(&mut self, rule: impl FnOnce(&mut Self) -> Result<'a, T>) -> Result<'a, T> {
        if self.depth >= MAX_NESTING {
            return Err(ParseError::new(ParseErrorType::TooDeeplyNested, self.peek()));
        }
        self.depth += 1;
        let result = rule(self);
        self.depth -= 1;
        result
    }

    fn consume(&mut self, token_type: TokenType, error: ParseErrorType) -> Result<'a, Token<'a>> {
        let token = self.peek();
        if token.token_type() == token_type {
            Ok(self.advance())
        } else {
            Err(ParseError::new(error, token))
        }
    }

    /// The current token. Past the end of the sequence this is a synthetic
    /// `Eof`, so a token slice missing its `Eof` can't make the parser panic.
    fn peek(&self) -> Token<'a> {
        match self.tokens.get(self.current) {
            Some(token) => token.clone(),
            None => {
                let line = self.tokens.last().map_or(Line::default(), |t| t.line);
                Token::new(Eof, "", line)
            }
        }
    }

    fn advance(&mut self) -> Token<'a> {
        let token = self.peek();
        if !token.is_eof() {
            self.current += 1;
        }
        token
    }
}

#[cfg(test)]
mod tests {
    use diagnostics::Location;
    use pretty_assertions::assert_eq;
    use scanner::Scanner;

    use super::*;

    fn parse(source: &str) -> std::result::Result<Expr, Diagnostics> {
        let mut diagnostics = Diagnostics::new();
        let tokens = Scanner::new(source).scan_tokens(&mut diagnostics);
        assert!(!diagnostics.had_error(), "{diagnostics}");
        Parser::new(&tokens).parse(&mut diagnostics).ok_or(diagnostics)
    }

    fn parse_err(source: &str) -> String {
        parse(source).unwrap_err().to_string()
    }

    #[test]
    fn precedence() {
        assert_eq!(parse("1 + 2 * 3").unwrap().to_string(), "(+ 1 (* 2 3))");
        assert_eq!(parse("1 * 2 + 3").unwrap().to_string(), "(+ (* 1 2) 3)");
        assert_eq!(
            parse("1 < 2 == 3 >= 4 - -5").unwrap().to_string(),
            "(== (< 1 2) (>= 3 (- 4 (- 5))))"
        );
        assert_eq!(parse("!true != false").unwrap().to_string(), "(!= (! true) false)");
    }

    #[test]
    fn left_associativity() {
        assert_eq!(parse("8 - 4 - 2").unwrap().to_string(), "(- (- 8 4) 2)");
        assert_eq!(parse("8 / 4 / 2").unwrap().to_string(), "(/ (/ 8 4) 2)");
        assert_eq!(parse("1 == 2 == 3").unwrap().to_string(), "(== (== 1 2) 3)");
    }

    #[test]
    fn unary_is_right_associative() {
        assert_eq!(parse("!!-1").unwrap().to_string(), "(! (! (- 1)))");
    }

    #[test]
    fn literals_and_grouping() {
        assert_eq!(parse("nil").unwrap(), Expr::Literal(LiteralValue::Nil));
        assert_eq!(parse("\"hi\"").unwrap(), Expr::Literal(LiteralValue::Str("hi")));
        assert_eq!(
            parse("(1.5)").unwrap(),
            Expr::grouping(Expr::Literal(LiteralValue::Number(1.5)))
        );
        assert_eq!(parse("((true))").unwrap().to_string(), "(group (group true))");
    }

    #[test]
    fn operator_tokens_are_kept() {
        let expr = parse("1\n+ 2").unwrap();
        let Expr::Binary { operator, .. } = &expr else {
            panic!("expected a binary expression");
        };
        assert_eq!(operator.data, Plus);
        assert_eq!(operator.lexeme, "+");
        assert_eq!(operator.line, Line(2));
    }

    #[test]
    fn missing_right_paren() {
        assert_eq!(parse_err("(1 + 2"), "[line 1] Error at end: Expect ')' after expression.");
        assert_eq!(parse_err("(1 2)"), "[line 1] Error at '2': Expect ')' after expression.");
    }

    #[test]
    fn expected_expression() {
        assert_eq!(parse_err(""), "[line 1] Error at end: Expecting an expression.");
        assert_eq!(parse_err("1 +"), "[line 1] Error at end: Expecting an expression.");
        assert_eq!(parse_err("\n* 2"), "[line 2] Error at '*': Expecting an expression.");
        assert_eq!(parse_err("foo"), "[line 1] Error at 'foo': Expecting an expression.");
    }

    #[test]
    fn trailing_tokens() {
        assert_eq!(parse_err("1 2"), "[line 1] Error at '2': Expect end of expression.");
        assert_eq!(parse_err("1;"), "[line 1] Error at ';': Expect end of expression.");
    }

    #[test]
    fn only_one_diagnostic_per_parse() {
        let diagnostics = parse("(1 + ) + (").unwrap_err();
        assert_eq!(
            diagnostics.into_inner(),
            vec![Diagnostic::new(
                ErrorKind::Syntax,
                Line(1),
                Location::Lexeme(")".to_string()),
                "Expecting an expression."
            )]
        );
    }

    #[test]
    fn nesting_limit() {
        let ok = format!("{}1{}", "(".repeat(MAX_NESTING), ")".repeat(MAX_NESTING));
        assert!(parse(&ok).is_ok());

        let too_deep = format!("{}1{}", "(".repeat(MAX_NESTING + 1), ")".repeat(MAX_NESTING + 1));
        assert_eq!(parse_err(&too_deep), "[line 1] Error at '1': Expression nests too deeply.");

        let negations = format!("{}1", "-".repeat(MAX_NESTING + 1));
        assert_eq!(parse_err(&negations), "[line 1] Error at '1': Expression nests too deeply.");
    }

    #[test]
    fn missing_eof_token() {
        let tokens = vec![Token::new(Number(1.0), "1", Line(1))];
        let mut diagnostics = Diagnostics::new();
        assert_eq!(
            Parser::new(&tokens).parse(&mut diagnostics),
            Some(Expr::Literal(LiteralValue::Number(1.0)))
        );

        assert_eq!(Parser::new(&[]).parse(&mut diagnostics), None);
        assert_eq!(diagnostics.to_string(), "[line 1] Error at end: Expecting an expression.");
    }
}
