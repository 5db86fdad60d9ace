//! Errors reported by keyed access.

/// Failure of a keyed operation. Keys are carried pre-formatted with `Debug`
/// so the error does not borrow from the table.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    #[error("key {key} not found in table; valid keys: {valid}")]
    KeyNotFound { key: String, valid: String },
    #[error("key {key} already present in table")]
    DuplicateKey { key: String },
}

pub type Result<T> = std::result::Result<T, TableError>;
