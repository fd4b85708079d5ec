use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreErrorCode {
    /// Reading or writing a file failed.
    Io,
    /// The archive could not be decompressed or its payload is not a JSON document.
    Format,
    /// A queried path or key does not exist.
    Absent,
    /// A value exists but cannot be read as the type the caller asked for.
    Validation,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code:?}: {message}")]
pub struct CoreError {
    pub code: CoreErrorCode,
    pub message: String,
}

impl CoreError {
    pub fn new(code: CoreErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn absent(path: impl std::fmt::Display) -> Self {
        Self::new(CoreErrorCode::Absent, format!("no node at '{path}'"))
    }

    pub fn validation(path: impl std::fmt::Display, expected: &str, found: &str) -> Self {
        Self::new(
            CoreErrorCode::Validation,
            format!("'{path}' should be {expected}, found {found}"),
        )
    }

    pub fn is_absent(&self) -> bool {
        self.code == CoreErrorCode::Absent
    }
}
