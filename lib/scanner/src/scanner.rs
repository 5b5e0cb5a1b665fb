use cursor::{Cursor, Line};
use diagnostics::{Diagnostic, Diagnostics, ErrorKind, Location};

pub mod token;
pub use token::{Literal, Token, TokenData, TokenType};
use TokenData::*;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ScanErrorType {
    #[error("Unexpected character.")]
    UnexpectedCharacter(char),
    #[error("Unterminated string.")]
    UnterminatedString,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("[line {line}] Error: {error}")]
pub struct ScanError {
    pub error: ScanErrorType,
    pub line: Line,
}

impl ScanError {
    fn new(error: ScanErrorType, line: Line) -> Self {
        Self { error, line }
    }
}

impl From<ScanError> for Diagnostic {
    fn from(e: ScanError) -> Self {
        Diagnostic::new(ErrorKind::Lexical, e.line, Location::Line, e.error)
    }
}

/// Turns source text into tokens.
///
/// As an iterator it yields scan errors inline with the tokens and ends with
/// exactly one `Eof` token. Errors never stop the scan.
#[derive(Debug, Clone)]
pub struct Scanner<'a> {
    cursor: Cursor<'a>,
    done: bool,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { cursor: Cursor::new(source), done: false }
    }

    /// Scans the whole source, reporting errors into `diagnostics`.
    pub fn scan_tokens(self, diagnostics: &mut Diagnostics) -> Vec<Token<'a>> {
        self.filter_map(|token| match token {
            Ok(token) => Some(token),
            Err(e) => {
                diagnostics.report(e);
                None
            }
        })
        .collect()
    }

    fn string(&mut self, start: &Cursor<'a>) -> Result<TokenData<'a>, ScanError> {
        self.cursor.advance_while(|c| c != '"');

        if !self.cursor.next_if_eq('"') {
            return Err(ScanError::new(ScanErrorType::UnterminatedString, self.cursor.line()));
        }

        // Trim the surrounding quotes
        let lexeme = start.slice_until(&self.cursor);
        Ok(Str(&lexeme[1..lexeme.len() - 1]))
    }

    fn number(&mut self, start: &Cursor<'a>) -> TokenData<'a> {
        self.cursor.advance_while(|c| c.is_ascii_digit());

        if self.cursor.peek() == Some('.')
            && self.cursor.peek_next().is_some_and(|c| c.is_ascii_digit())
        {
            self.cursor.next();
            self.cursor.advance_while(|c| c.is_ascii_digit());
        }

        // Digits with at most one inner '.' always parse, overly long ones
        // round to the nearest f64 or infinity.
        Number(start.slice_until(&self.cursor).parse().unwrap_or_default())
    }

    fn identifier(&mut self, start: &Cursor<'a>) -> TokenData<'a> {
        self.cursor.advance_while(|c| c.is_alphabetic() || c.is_ascii_digit() || c == '_');
        TokenData::keyword(start.slice_until(&self.cursor)).unwrap_or(Identifier)
    }
}

impl<'a> Iterator for Scanner<'a> {
    type Item = Result<Token<'a>, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            let start = self.cursor.clone();

            let Some(c) = self.cursor.next() else {
                self.done = true;
                return Some(Ok(Token::new(Eof, "", self.cursor.line())));
            };

            let data = match c {
                '(' => LeftParen,
                ')' => RightParen,
                '{' => LeftBrace,
                '}' => RightBrace,
                ',' => Comma,
                '.' => Dot,
                '-' => Minus,
                '+' => Plus,
                ';' => Semicolon,
                '*' => Star,

                '!' => {
                    if self.cursor.next_if_eq('=') {
                        BangEqual
                    } else {
                        Bang
                    }
                }

                '=' => {
                    if self.cursor.next_if_eq('=') {
                        EqualEqual
                    } else {
                        Equal
                    }
                }

                '<' => {
                    if self.cursor.next_if_eq('=') {
                        LessEqual
                    } else {
                        Less
                    }
                }

                '>' => {
                    if self.cursor.next_if_eq('=') {
                        GreaterEqual
                    } else {
                        Greater
                    }
                }

                '/' => {
                    if self.cursor.next_if_eq('/') {
                        // Comment
                        self.cursor.advance_while(|c| c != '\n');
                        continue;
                    }
                    Slash
                }

                ' ' | '\r' | '\t' | '\n' => continue,

                '"' => match self.string(&start) {
                    Ok(data) => data,
                    Err(e) => return Some(Err(e)),
                },

                d if d.is_ascii_digit() => self.number(&start),

                a if a.is_alphabetic() || a == '_' => self.identifier(&start),

                c => {
                    return Some(Err(ScanError::new(
                        ScanErrorType::UnexpectedCharacter(c),
                        self.cursor.line(),
                    )))
                }
            };

            let token = Token::new(data, start.slice_until(&self.cursor), self.cursor.line());
            log::trace!("Scanned {:?} '{}'", token.token_type(), token.lexeme);
            return Some(Ok(token));
        }
    }
}
