use crate::{PageNumber, TableId};
use std::fmt;

/// Identifies a page: the table it belongs to and its zero-based position in
/// that table's heap file.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageAddress {
    pub table_id: TableId,
    pub page_number: PageNumber,
}

impl PageAddress {
    pub fn new(table_id: TableId, page_number: PageNumber) -> Self {
        Self {
            table_id,
            page_number,
        }
    }

    /// Byte offset of this page within its heap file, `None` if it does not
    /// fit in a `u64`.
    pub fn offset(&self, page_size: usize) -> Option<u64> {
        self.page_number.checked_mul(page_size as u64)
    }

    /// Address of the page that follows this one in the same file, `None`
    /// past the last representable page number.
    pub fn next(&self) -> Option<Self> {
        let page_number = self.page_number.checked_add(1)?;
        Some(Self::new(self.table_id, page_number))
    }
}

impl fmt::Display for PageAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Page({}, {})", self.table_id, self.page_number)
    }
}
