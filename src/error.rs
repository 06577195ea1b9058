//! Error taxonomy shared by every module.
//!
//! Each module keeps its own `thiserror` enum; `kind()` on those enums maps a
//! concrete failure onto one of the four categories below so orchestrators
//! can branch on the category without matching every variant.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Drawing from a shoe with no cards left.
    EmptySource,
    /// A value supplied by the caller is out of range or malformed.
    InvalidArgument,
    /// The object is in a state that does not permit the operation.
    InvalidState,
    /// The requested game action is not allowed for this hand.
    InvalidAction,
}

impl ErrorKind {
    pub fn label(self) -> &'static str {
        match self {
            ErrorKind::EmptySource => "empty source",
            ErrorKind::InvalidArgument => "invalid argument",
            ErrorKind::InvalidState => "invalid state",
            ErrorKind::InvalidAction => "invalid action",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
