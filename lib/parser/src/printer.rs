//! Read-only renderings of an [`Expr`] for debugging and tooling.
//!
//! All printers walk the tree with an explicit stack of pending pieces, so
//! deep left-leaning chains like `1 + 1 + ... + 1` print without recursion.

use itertools::Itertools;
use scanner::TokenData;

use crate::{Expr, LiteralValue};

const INDENT: &str = "  ";

enum Piece<'e, 'a> {
    Node(&'e Expr<'a>),
    Text(&'e str),
}

/// Fully parenthesized prefix form, one operand per line unless all operands
/// of a node are literals:
///
/// ```text
/// (*
///   (- 123)
///   (group 45.67))
/// ```
pub fn parenthesize(expr: &Expr) -> String {
    enum Tree<'e, 'a> {
        Node(&'e Expr<'a>, usize),
        Indent(usize),
        Close,
    }

    let mut out = String::new();
    let mut pieces = vec![Tree::Node(expr, 0)];
    while let Some(piece) = pieces.pop() {
        match piece {
            Tree::Close => out.push(')'),
            Tree::Indent(depth) => {
                out.push('\n');
                out.push_str(&INDENT.repeat(depth));
            }
            Tree::Node(expr, depth) => match split(expr) {
                None => out.push_str(&expr.to_string()),
                Some((name, operands)) => {
                    if operands.iter().all(|e| matches!(e, Expr::Literal(_))) {
                        out.push_str(&format!("({} {})", name, operands.iter().join(" ")));
                        continue;
                    }

                    out.push('(');
                    out.push_str(name);
                    pieces.push(Tree::Close);
                    for operand in operands.into_iter().rev() {
                        pieces.push(Tree::Node(operand, depth + 1));
                        pieces.push(Tree::Indent(depth + 1));
                    }
                }
            },
        }
    }
    out
}

/// Name and operands of an operator node, `None` for literals.
fn split<'e, 'a>(expr: &'e Expr<'a>) -> Option<(&'e str, Vec<&'e Expr<'a>>)> {
    match expr {
        Expr::Binary { left, operator, right } => {
            Some((operator.lexeme, vec![left.as_ref(), right.as_ref()]))
        }
        Expr::Grouping(expression) => Some(("group", vec![expression.as_ref()])),
        Expr::Unary { operator, right } => Some((operator.lexeme, vec![right.as_ref()])),
        Expr::Literal(_) => None,
    }
}

/// Reverse polish notation, e.g. `1 2 + 4 3 - *` for `(1 + 2) * (4 - 3)`.
/// Groupings only exist to steer precedence, so they don't show up here.
pub fn rpn(expr: &Expr) -> String {
    let mut words = vec![];
    let mut pieces = vec![Piece::Node(expr)];
    while let Some(piece) = pieces.pop() {
        match piece {
            Piece::Text(operator) => words.push(operator.to_string()),
            Piece::Node(Expr::Binary { left, operator, right }) => {
                let operator = Piece::Text(operator.lexeme);
                pieces.extend([operator, Piece::Node(right), Piece::Node(left)]);
            }
            Piece::Node(Expr::Grouping(expression)) => pieces.push(Piece::Node(expression)),
            Piece::Node(Expr::Unary { operator, right }) => {
                pieces.extend([Piece::Text(operator.lexeme), Piece::Node(right)]);
            }
            Piece::Node(Expr::Literal(value)) => words.push(value.to_string()),
        }
    }
    words.join(" ")
}

/// How tightly an expression binds, higher binds tighter.
fn precedence(expr: &Expr) -> u8 {
    use TokenData::*;
    match expr {
        Expr::Binary { operator, .. } => match operator.data {
            BangEqual | EqualEqual => 1,
            Greater | GreaterEqual | Less | LessEqual => 2,
            Minus | Plus => 3,
            _ => 4,
        },
        Expr::Unary { .. } => 5,
        Expr::Grouping(_) | Expr::Literal(_) => 6,
    }
}

/// Infix source code for `expr` that scans and parses back into the same tree.
///
/// Parentheses are only added where an operand binds looser than its position
/// requires. Trees coming from the parser already carry those as groupings, so
/// their source is reproduced without any extra nesting.
pub fn infix(expr: &Expr) -> String {
    fn operand<'e, 'a>(pieces: &mut Vec<Piece<'e, 'a>>, expr: &'e Expr<'a>, min: u8) {
        if precedence(expr) < min {
            pieces.extend([Piece::Text(")"), Piece::Node(expr), Piece::Text("(")]);
        } else {
            pieces.push(Piece::Node(expr));
        }
    }

    let mut out = String::new();
    let mut pieces = vec![Piece::Node(expr)];
    while let Some(piece) = pieces.pop() {
        let node = match piece {
            Piece::Text(text) => {
                out.push_str(text);
                continue;
            }
            Piece::Node(node) => node,
        };

        match node {
            Expr::Binary { left, operator, right } => {
                let binding = precedence(node);
                operand(&mut pieces, right, binding + 1);
                pieces.extend([Piece::Text(" "), Piece::Text(operator.lexeme), Piece::Text(" ")]);
                operand(&mut pieces, left, binding);
            }
            Expr::Grouping(expression) => {
                pieces.extend([Piece::Text(")"), Piece::Node(expression), Piece::Text("(")]);
            }
            Expr::Unary { operator, right } => {
                operand(&mut pieces, right, precedence(node));
                pieces.push(Piece::Text(operator.lexeme));
            }
            Expr::Literal(LiteralValue::Str(s)) => {
                out.push('"');
                out.push_str(s);
                out.push('"');
            }
            Expr::Literal(value) => out.push_str(&value.to_string()),
        }
    }
    out
}
