use super::selection::Collection;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SessionError {
    #[error("A structure with id '{id}' is already loaded")]
    DuplicateId { id: String },

    #[error("Index {index} is out of range for the {collection} (length {len})")]
    IndexOutOfRange {
        collection: Collection,
        index: usize,
        len: usize,
    },

    #[error("Invalid viewer configuration for '{field}': {reason}")]
    InvalidConfiguration { field: &'static str, reason: String },

    #[error("No structure with id '{id}' is loaded")]
    UnknownStructure { id: String },
}
