use std::{error::Error, fmt};

use crate::lex::Span;

/// An error produced while scanning, parsing or evaluating a line
#[derive(Debug, Clone)]
#[must_use]
pub struct AplError {
    pub kind: ErrorKind,
    pub message: String,
    pub span: Span,
}

/// The error classes surfaced to the caller of [`crate::Apl::parse_and_eval`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Scanner or parser failure
    Syntax,
    /// No primitive variant accepts the argument types
    Domain,
    /// Rank mismatch
    Rank,
    /// Axis length mismatch
    Length,
    /// Shape mismatch
    Shape,
    /// Out-of-range index
    Index,
    /// A numeric coercion with no uptype
    Value,
    /// Function/value naming law violation or unbound function name
    Name,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Syntax => write!(f, "syntax error"),
            ErrorKind::Domain => write!(f, "domain error"),
            ErrorKind::Rank => write!(f, "rank error"),
            ErrorKind::Length => write!(f, "length error"),
            ErrorKind::Shape => write!(f, "shape error"),
            ErrorKind::Index => write!(f, "index error"),
            ErrorKind::Value => write!(f, "value error"),
            ErrorKind::Name => write!(f, "name error"),
        }
    }
}

/// Result type used throughout the interpreter
pub type AplResult<T = crate::value::Value> = Result<T, AplError>;

impl AplError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        AplError {
            kind,
            message: message.into(),
            span: Span::Builtin,
        }
    }
    pub fn syntax(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Syntax, message)
    }
    pub fn domain(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Domain, message)
    }
    pub fn rank(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Rank, message)
    }
    pub fn length(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Length, message)
    }
    pub fn shape(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Shape, message)
    }
    pub fn index(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Index, message)
    }
    pub fn value(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Value, message)
    }
    pub fn name(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Name, message)
    }
    /// Attach a source position if the error does not already carry one
    pub fn at(mut self, span: Span) -> Self {
        if let Span::Builtin = self.span {
            self.span = span;
        }
        self
    }
}

impl fmt::Display for AplError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.span {
            Span::Builtin => write!(f, "{}: {}", self.kind, self.message),
            Span::Code(span) => write!(f, "{}: {}: at {}", self.kind, self.message, span),
        }
    }
}

impl Error for AplError {}
