use std::fmt::Display;

use cursor::Line;
use diagnostics::Location;
use strum::EnumDiscriminants;

#[derive(Debug, Clone, PartialEq)]
pub struct Token<'a> {
    pub data: TokenData<'a>,
    pub lexeme: &'a str,
    pub line: Line,
}

impl<'a> Token<'a> {
    pub fn new(data: TokenData<'a>, lexeme: &'a str, line: Line) -> Token<'a> {
        Self { data, lexeme, line }
    }

    pub fn token_type(&self) -> TokenType {
        TokenType::from(&self.data)
    }

    pub fn literal(&self) -> Option<Literal<'a>> {
        match self.data {
            TokenData::Number(n) => Some(Literal::Number(n)),
            TokenData::Str(s) => Some(Literal::Str(s)),
            _ => None,
        }
    }

    pub fn is_eof(&self) -> bool {
        self.data == TokenData::Eof
    }

    /// How diagnostics refer to this token.
    pub fn location(&self) -> Location {
        if self.is_eof() {
            Location::End
        } else {
            Location::Lexeme(self.lexeme.to_string())
        }
    }
}

impl Display for Token<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.lexeme)
    }
}

/// Decoded value of a NUMBER or STRING token.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Literal<'a> {
    Number(f64),
    Str(&'a str),
}

#[derive(Debug, Clone, PartialEq, EnumDiscriminants)]
#[strum_discriminants(name(TokenType), derive(Hash))]
pub enum TokenData<'a> {
    // Single-character tokens.
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    Comma,
    Dot,
    Minus,
    Plus,
    Semicolon,
    Slash,
    Star,

    // One or two character tokens.
    Bang,
    BangEqual,
    Equal,
    EqualEqual,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,

    // Literals.
    Identifier,
    Str(&'a str),
    Number(f64),

    // Keywords.
    And,
    Class,
    Else,
    False,
    Fun,
    For,
    If,
    Nil,
    Or,
    Print,
    Return,
    Super,
    This,
    True,
    Var,
    While,
    Eof,
}

impl<'a> TokenData<'a> {
    pub fn keyword(word: &str) -> Option<TokenData<'a>> {
        use TokenData::*;
        Some(match word {
            "and" => And,
            "class" => Class,
            "else" => Else,
            "false" => False,
            "for" => For,
            "fun" => Fun,
            "if" => If,
            "nil" => Nil,
            "or" => Or,
            "print" => Print,
            "return" => Return,
            "super" => Super,
            "this" => This,
            "true" => True,
            "var" => Var,
            "while" => While,
            _ => return None,
        })
    }
}
