use std::fmt::{self, Display, Formatter};

use scanner::Token;

/// Parsed expression tree.
///
/// Binary chains are folded iteratively by the parser and can be arbitrarily
/// deep, so everything walking a tree (evaluation, printing, dropping) keeps
/// its own work stack instead of recursing.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr<'a> {
    Binary { left: Box<Expr<'a>>, operator: Token<'a>, right: Box<Expr<'a>> },
    Grouping(Box<Expr<'a>>),
    Unary { operator: Token<'a>, right: Box<Expr<'a>> },
    Literal(LiteralValue<'a>),
}

impl<'a> Expr<'a> {
    pub fn binary(left: Expr<'a>, operator: Token<'a>, right: Expr<'a>) -> Self {
        Expr::Binary { left: Box::new(left), operator, right: Box::new(right) }
    }

    pub fn unary(operator: Token<'a>, right: Expr<'a>) -> Self {
        Expr::Unary { operator, right: Box::new(right) }
    }

    pub fn grouping(expression: Expr<'a>) -> Self {
        Expr::Grouping(Box::new(expression))
    }

    /// Moves every non-literal child into `into`, leaving `nil` behind.
    fn detach_branches(&mut self, into: &mut Vec<Expr<'a>>) {
        let mut detach = |child: &mut Box<Expr<'a>>| {
            if !matches!(**child, Expr::Literal(_)) {
                into.push(std::mem::replace(&mut **child, Expr::Literal(LiteralValue::Nil)));
            }
        };

        match self {
            Expr::Binary { left, right, .. } => {
                detach(left);
                detach(right);
            }
            Expr::Grouping(expression) | Expr::Unary { right: expression, .. } => {
                detach(expression)
            }
            Expr::Literal(_) => {}
        }
    }
}

impl Drop for Expr<'_> {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        self.detach_branches(&mut pending);
        // Each popped node loses its branches before it is dropped, so its own
        // `drop` finds nothing left to do.
        while let Some(mut expr) = pending.pop() {
            expr.detach_branches(&mut pending);
        }
    }
}

/// Single-line prefix form, e.g. `(+ 1 (group (- 2)))`.
impl Display for Expr<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        enum Piece<'e, 'a> {
            Node(&'e Expr<'a>),
            Text(&'static str),
        }

        let mut pieces = vec![Piece::Node(self)];
        while let Some(piece) = pieces.pop() {
            match piece {
                Piece::Text(text) => f.write_str(text)?,
                Piece::Node(Expr::Binary { left, operator, right }) => {
                    write!(f, "({} ", operator)?;
                    pieces.extend([
                        Piece::Text(")"),
                        Piece::Node(right),
                        Piece::Text(" "),
                        Piece::Node(left),
                    ]);
                }
                Piece::Node(Expr::Grouping(expression)) => {
                    f.write_str("(group ")?;
                    pieces.extend([Piece::Text(")"), Piece::Node(expression)]);
                }
                Piece::Node(Expr::Unary { operator, right }) => {
                    write!(f, "({} ", operator)?;
                    pieces.extend([Piece::Text(")"), Piece::Node(right)]);
                }
                Piece::Node(Expr::Literal(value)) => write!(f, "{}", value)?,
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LiteralValue<'a> {
    Number(f64),
    Str(&'a str),
    Boolean(bool),
    Nil,
}

impl<'a> Display for LiteralValue<'a> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            LiteralValue::Number(n) => write!(f, "{}", n),
            LiteralValue::Str(s) => write!(f, "{}", s),
            LiteralValue::Boolean(b) => write!(f, "{}", b),
            LiteralValue::Nil => write!(f, "nil"),
        }
    }
}
