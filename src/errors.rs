use crate::storage::page::page_address::PageAddress;
use crate::transaction::TransactionId;
use crate::{PageNumber, TableId};
use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, HeapError>;

#[derive(Debug, Error)]
pub enum HeapError {
    #[error("{address} is past the end of the file ({page_count} pages)")]
    OutOfRange {
        address: PageAddress,
        page_count: PageNumber,
    },
    #[error("page belongs to table {found}, expected table {expected}")]
    TableMismatch { expected: TableId, found: TableId },

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("{0} aborted")]
    TransactionAborted(TransactionId),

    #[error("{0} is not supported by heap files")]
    Unsupported(&'static str),

    #[error("scan is not open")]
    ScanNotOpen,
    #[error("no heap file registered for table {0}")]
    UnknownTable(TableId),
    #[error("all buffer pool frames are pinned")]
    BufferPoolExhausted,

    #[error("page holds at most {capacity} tuples")]
    PageFull { capacity: usize },
    #[error("corrupted page: {0}")]
    Corrupted(String),
}

impl HeapError {
    /// Both a page number past the extent and an address of another table
    /// are out of range for a file.
    pub fn is_out_of_range(&self) -> bool {
        matches!(
            self,
            HeapError::OutOfRange { .. } | HeapError::TableMismatch { .. }
        )
    }
}
