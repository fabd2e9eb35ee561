use std::error::Error;
use std::fmt;

/// A failed binding or conversion.
///
/// Absence is mostly not an error in this crate — reading a missing member
/// yields the undefined sentinel. These are the cases that do fail, and
/// they fail deterministically on the first attempt: there is no retry and
/// no partial state to clean up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FalsyError {
    /// Member access on the undefined sentinel, i.e. exactly one level
    /// past a missing member.
    UndefinedAccess { member: String },
    /// Write to a member the target does not have.
    NoSuchMember { type_name: &'static str, member: String },
    /// No callable member matches the name and argument shape.
    NoOverload {
        type_name: &'static str,
        method: String,
        args: usize,
    },
    /// The target shape has no indexer (or a read-only one, on writes).
    NoIndexer { type_name: &'static str },
    IndexOutOfBounds { index: i64, len: usize },
    KeyNotFound { key: String },
    NotIterable { type_name: &'static str },
    /// Forced conversion to an incompatible type.
    Conversion {
        expected: &'static str,
        found: &'static str,
    },
}

impl fmt::Display for FalsyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FalsyError::UndefinedAccess { member } => {
                write!(f, "cannot access member '{member}' of undefined")
            }
            FalsyError::NoSuchMember { type_name, member } => {
                write!(f, "{type_name} has no member '{member}'")
            }
            FalsyError::NoOverload {
                type_name,
                method,
                args,
            } => {
                write!(
                    f,
                    "{type_name} has no method '{method}' taking {args} argument(s)"
                )
            }
            FalsyError::NoIndexer { type_name } => {
                write!(f, "{type_name} does not support indexed assignment")
            }
            FalsyError::IndexOutOfBounds { index, len } => {
                write!(f, "index {index} out of bounds for sequence of length {len}")
            }
            FalsyError::KeyNotFound { key } => write!(f, "key '{key}' not found"),
            FalsyError::NotIterable { type_name } => {
                write!(f, "{type_name} is not iterable")
            }
            FalsyError::Conversion { expected, found } => {
                write!(f, "cannot convert {found} to {expected}")
            }
        }
    }
}

impl Error for FalsyError {}
