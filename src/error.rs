// Error kinds surfaced by the todo repository

use std::error::Error;
use std::fmt;

#[derive(Debug)]
pub enum TodoError {
    /// Required text was empty or whitespace-only; nothing changed
    Validation(String),
    /// No todo with the given id; the caller is looking at a stale view
    NotFound(String),
    /// Persisted document could not be parsed
    StorageRead(String),
    /// The store adapter failed to flush the list
    Storage(eyre::Report),
}

impl TodoError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, TodoError::NotFound(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, TodoError::Validation(_))
    }
}

impl fmt::Display for TodoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TodoError::Validation(message) => write!(f, "validation error: {}", message),
            TodoError::NotFound(id) => write!(f, "todo not found: {}", id),
            TodoError::StorageRead(message) => write!(f, "malformed stored todo list: {}", message),
            TodoError::Storage(err) => write!(f, "storage error: {:#}", err),
        }
    }
}

impl Error for TodoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            TodoError::Storage(err) => {
                let source: &(dyn Error + 'static) = err.as_ref();
                Some(source)
            }
            _ => None,
        }
    }
}

impl From<eyre::Report> for TodoError {
    fn from(value: eyre::Report) -> Self {
        TodoError::Storage(value)
    }
}

pub type TodoResult<T> = std::result::Result<T, TodoError>;
