use thiserror::Error;

use crate::types::{PageId, record_id::RecordId};

#[derive(Error, Debug)]
pub enum PageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Page is full (page_id: {page_id}, required: {required}, free: {available})")]
    PageFull {
        page_id: PageId,
        required: usize,
        available: usize,
    },

    #[error("Invalid record id {rid}: {reason}")]
    InvalidRecordId { rid: RecordId, reason: &'static str },

    #[error("Buffer too small: record needs {needed} bytes, buffer has {actual}")]
    BufferTooSmall { needed: usize, actual: usize },

    #[error("Empty records cannot be stored")]
    EmptyRecord,

    #[error("Invalid page size: {expected} bytes, got {actual} bytes")]
    InvalidPageSize { expected: usize, actual: usize },

    #[error("Corrupted page: page_id={page_id}, reason={reason}")]
    CorruptedPage { page_id: PageId, reason: String },
}

impl PageError {
    /// True for the "try another page" signal rather than a hard failure.
    pub fn is_exhaustion(&self) -> bool {
        matches!(self, PageError::PageFull { .. })
    }
}

pub type Result<T> = std::result::Result<T, PageError>;
