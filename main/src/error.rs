//! Error types shared by the whole crate.

use std::fmt;
use thiserror::Error;

/// The result type used throughout this crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A condition of a contract did not hold.
///
/// The message has the form `in <owner>: <role>: <rendering>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractViolation {
    message: String,
}

impl ContractViolation {
    pub(crate) fn new(message: impl Into<String>) -> ContractViolation {
        ContractViolation {
            message: message.into(),
        }
    }

    /// The diagnostic message of the violated condition.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ContractViolation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ContractViolation {}

/// Everything that can go wrong when calling into the object model.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A condition evaluated to `false`.
    #[error(transparent)]
    Violation(#[from] ContractViolation),

    /// A condition referenced a name that is not bound for this call.
    #[error("name `{name}` is not bound")]
    Unbound { name: String },

    /// A value had a different type than expected.
    #[error("expected {expected}, found {found}")]
    Type {
        expected: &'static str,
        found: &'static str,
    },

    /// Attribute lookup failed.
    #[error("`{owner}` has no attribute `{name}`")]
    NoAttribute { owner: String, name: String },

    /// A non-callable attribute was called.
    #[error("`{name}` is not callable")]
    NotCallable { name: String },

    /// A property was used in a way its accessors do not support.
    #[error("can't {action} attribute `{name}`")]
    Accessor { action: &'static str, name: String },

    /// An error raised by user code.
    #[error("{0}")]
    Raised(String),
}

impl Error {
    /// Creates an error raised by user code.
    pub fn raised(message: impl Into<String>) -> Error {
        Error::Raised(message.into())
    }

    /// Returns the contract violation, if this is one.
    pub fn as_violation(&self) -> Option<&ContractViolation> {
        match self {
            Error::Violation(violation) => Some(violation),
            _ => None,
        }
    }
}
