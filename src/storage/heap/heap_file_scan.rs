use crate::buffer::page_cache::PageCache;
use crate::errors::{HeapError, Result};
use crate::storage::heap::heap_file::HeapFile;
use crate::storage::page::page_address::PageAddress;
use crate::storage::page::PageTuples;
use crate::storage::tuple::Tuple;
use crate::transaction::{Permission, TransactionId};
use crate::PageNumber;

enum ScanState {
    Closed,
    // Tuples of `page_number` not yet produced.
    AtPage {
        page_number: PageNumber,
        tuples: PageTuples,
    },
    // Page n is used up, page n + 1 not fetched yet.
    Between(PageNumber),
    Exhausted,
}

/// Cursor over every tuple of a heap file, in page order and then slot order,
/// on behalf of one transaction. Pages are fetched read-only through the page
/// cache one at a time as the cursor reaches them.
///
/// A scan starts closed; `open` positions it before the first tuple.
pub struct HeapFileScan<'a, C: PageCache + ?Sized> {
    file: &'a HeapFile,
    cache: &'a C,
    tid: TransactionId,
    state: ScanState,
}

impl<'a, C: PageCache + ?Sized> HeapFileScan<'a, C> {
    pub(crate) fn new(file: &'a HeapFile, cache: &'a C, tid: TransactionId) -> Self {
        Self {
            file,
            cache,
            tid,
            state: ScanState::Closed,
        }
    }

    pub fn transaction_id(&self) -> TransactionId {
        self.tid
    }

    pub fn is_open(&self) -> bool {
        !matches!(self.state, ScanState::Closed)
    }

    pub fn open(&mut self) -> Result<()> {
        self.state = ScanState::Closed;
        let tuples = self.fetch(PageAddress::new(self.file.get_id(), 0))?;
        self.state = ScanState::AtPage {
            page_number: 0,
            tuples,
        };
        Ok(())
    }

    /// The next tuple, or `None` once every page has been read. Blocks only
    /// when the current page is used up and the next one must be fetched.
    pub fn produce_next(&mut self) -> Result<Option<Tuple>> {
        loop {
            match &mut self.state {
                ScanState::Closed => return Err(HeapError::ScanNotOpen),
                ScanState::Exhausted => return Ok(None),
                ScanState::AtPage {
                    page_number,
                    tuples,
                } => {
                    if let Some(tuple) = tuples.next() {
                        return Ok(Some(tuple));
                    }
                    let n = *page_number;
                    self.state = ScanState::Between(n);
                }
                ScanState::Between(n) => {
                    let current = PageAddress::new(self.file.get_id(), *n);
                    let page_count = self.file.page_count()?;
                    let next = match current.next() {
                        Some(next) if next.page_number < page_count => next,
                        _ => {
                            debug!(
                                self.file.logger(),
                                "scan exhausted";
                                "txn" => self.tid.get_id(),
                                "pages" => page_count
                            );
                            self.state = ScanState::Exhausted;
                            return Ok(None);
                        }
                    };
                    let tuples = self.fetch(next)?;
                    self.state = ScanState::AtPage {
                        page_number: next.page_number,
                        tuples,
                    };
                }
            }
        }
    }

    pub fn rewind(&mut self) -> Result<()> {
        self.close();
        self.open()
    }

    // Safe to call in any state, any number of times.
    pub fn close(&mut self) {
        self.state = ScanState::Closed;
    }

    fn fetch(&self, address: PageAddress) -> Result<PageTuples> {
        debug!(
            self.file.logger(),
            "scan fetching page";
            "txn" => self.tid.get_id(),
            "page" => address.page_number
        );
        let page = self.cache.fetch(self.tid, address, Permission::ReadOnly)?;
        Ok(page.tuples())
    }
}
