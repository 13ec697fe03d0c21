//! Error types for GDB/MI record parsing and classification

use crate::gdb::types::ValueType;
use std::fmt;
use thiserror::Error;

/// What the parser was looking for when a record turned out malformed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expected {
    Name,
    Equals,
    Value,
    ClosingQuote,
    ClosingBrace,
    ClosingBracket,
    ArrayElement,
    /// End of input or `,` after a top-level value
    Terminator,
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Expected::Name => "a name",
            Expected::Equals => "'='",
            Expected::Value => "a value ('{', '[' or '\"')",
            Expected::ClosingQuote => "closing '\"'",
            Expected::ClosingBrace => "',' or '}'",
            Expected::ClosingBracket => "',' or ']'",
            Expected::ArrayElement => "an object element",
            Expected::Terminator => "',' or end of record",
        };
        f.write_str(s)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MiError {
    /// The record does not follow the MI value grammar
    #[error("malformed record at byte {offset}: expected {expected}")]
    Malformed { offset: usize, expected: Expected },

    /// Objects and arrays nest deeper than the configured limit
    #[error("record nested deeper than {limit} levels at byte {offset}")]
    TooDeep { offset: usize, limit: usize },

    /// The record parsed but its leading identifier is not a known kind
    #[error("unrecognized record kind: {0}")]
    UnrecognizedKind(String),

    /// An accessor was called for a discriminant the value does not hold
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: ValueType, found: ValueType },
}

pub type Result<T> = std::result::Result<T, MiError>;
