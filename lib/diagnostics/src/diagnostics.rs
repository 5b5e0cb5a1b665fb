use std::{
    fmt::{self, Display, Formatter},
    ops::Deref,
};

use itertools::Itertools;

pub use cursor::Line;

/// Which pipeline stage produced a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Lexical,
    Syntax,
    Runtime,
}

/// Where on a line a diagnostic points to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// Lexical errors only know their line.
    Line,
    /// The offending token was EOF.
    End,
    Lexeme(String),
}

impl Display for Location {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Location::Line => Ok(()),
            Location::End => write!(f, " at end"),
            Location::Lexeme(lexeme) => write!(f, " at '{lexeme}'"),
        }
    }
}

#[derive(thiserror::Error, Clone, Debug, PartialEq)]
#[error("[line {line}] Error{location}: {message}")]
pub struct Diagnostic {
    pub kind: ErrorKind,
    pub line: Line,
    pub location: Location,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: ErrorKind, line: Line, location: Location, message: impl ToString) -> Self {
        Self { kind, line, location, message: message.to_string() }
    }
}

/// Collects the diagnostics of one scan/parse/evaluate run.
///
/// Every stage reports into the same collector and never aborts the whole
/// pipeline by itself. Callers check [`Diagnostics::had_error`] between stages.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, diagnostic: impl Into<Diagnostic>) {
        let diagnostic = diagnostic.into();
        log::debug!("Reported {:?}", diagnostic);
        self.0.push(diagnostic);
    }

    pub fn had_error(&self) -> bool {
        !self.0.is_empty()
    }

    pub fn had_error_of(&self, kind: ErrorKind) -> bool {
        self.0.iter().any(|d| d.kind == kind)
    }

    /// Forgets everything reported so far, e.g. between two REPL lines.
    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn into_inner(self) -> Vec<Diagnostic> {
        self.0
    }
}

impl Deref for Diagnostics {
    type Target = [Diagnostic];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Diagnostic> for Diagnostics {
    fn from(d: Diagnostic) -> Self {
        Self(vec![d])
    }
}

impl Display for Diagnostics {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self.0.iter().join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn formatting() {
        let lexical =
            Diagnostic::new(ErrorKind::Lexical, Line(3), Location::Line, "Unexpected character.");
        assert_eq!(lexical.to_string(), "[line 3] Error: Unexpected character.");

        let at_end = Diagnostic::new(
            ErrorKind::Syntax,
            Line(1),
            Location::End,
            "Expect ')' after expression.",
        );
        assert_eq!(at_end.to_string(), "[line 1] Error at end: Expect ')' after expression.");

        let at_token = Diagnostic::new(
            ErrorKind::Runtime,
            Line(2),
            Location::Lexeme("/".to_string()),
            "RHS operand must not be 0.",
        );
        assert_eq!(at_token.to_string(), "[line 2] Error at '/': RHS operand must not be 0.");
    }

    #[test]
    fn collector() {
        let mut diagnostics = Diagnostics::new();
        assert!(!diagnostics.had_error());

        diagnostics.report(Diagnostic::new(ErrorKind::Lexical, Line(1), Location::Line, "a"));
        diagnostics.report(Diagnostic::new(ErrorKind::Lexical, Line(2), Location::Line, "b"));

        assert!(diagnostics.had_error());
        assert!(diagnostics.had_error_of(ErrorKind::Lexical));
        assert!(!diagnostics.had_error_of(ErrorKind::Runtime));
        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics.to_string(), "[line 1] Error: a\n[line 2] Error: b");

        diagnostics.clear();
        assert!(!diagnostics.had_error());
    }
}
