use crate::buffer::page_cache::PageCache;
use crate::errors::{HeapError, Result};
use crate::storage::heap::heap_file_scan::HeapFileScan;
use crate::storage::page::page_address::PageAddress;
use crate::storage::page::Page;
use crate::storage::tuple::{Tuple, TupleDesc};
use crate::transaction::TransactionId;
use crate::{PageNumber, TableId, PAGE_SIZE};
use slog::Logger;
use std::collections::hash_map::DefaultHasher;
use std::fs::{self, File};
use std::hash::{Hash, Hasher};
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Number of pages needed to hold `len` bytes. A trailing partial page counts
/// as a page.
pub(crate) fn pages_for(len: u64) -> PageNumber {
    let page_size = PAGE_SIZE as u64;
    len / page_size + if len % page_size == 0 { 0 } else { 1 }
}

/// Derives a table id from a canonical path. Equal paths give equal ids;
/// distinct paths may collide.
fn table_id_for(path: &Path) -> TableId {
    let mut hasher = DefaultHasher::new();
    path.hash(&mut hasher);
    let h = hasher.finish();
    (h ^ (h >> 32)) as TableId
}

// HeapFile stores the tuples of one table, in no particular order, as a flat
// sequence of PAGE_SIZE pages. Page k occupies bytes [k * PAGE_SIZE, (k + 1) * PAGE_SIZE).
pub struct HeapFile {
    path: PathBuf,
    table_id: TableId,
    desc: TupleDesc,
    file: Mutex<File>,
    logger: Logger,
}

impl HeapFile {
    // Opens the heap file stored at `path`. The file must exist.
    pub fn open<P: AsRef<Path>>(path: P, desc: TupleDesc, logger: &Logger) -> Result<Self> {
        let path = fs::canonicalize(path)?;
        let file = File::open(&path)?;
        let table_id = table_id_for(&path);
        let logger = logger.new(o!(
            "table_id" => table_id,
            "path" => path.display().to_string()
        ));
        debug!(logger, "opened heap file"; "tuple_size" => desc.size());

        Ok(Self {
            path,
            table_id,
            desc,
            file: Mutex::new(file),
            logger,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get_id(&self) -> TableId {
        self.table_id
    }

    pub fn get_tuple_desc(&self) -> &TupleDesc {
        &self.desc
    }

    pub fn len(&self) -> Result<u64> {
        Ok(self.lock_file().metadata()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    pub fn page_count(&self) -> Result<PageNumber> {
        Ok(pages_for(self.len()?))
    }

    // Read the page at `address` straight from the backing store, bypassing any cache.
    pub fn read_page(&self, address: PageAddress) -> Result<Page> {
        if address.table_id != self.table_id {
            return Err(HeapError::TableMismatch {
                expected: self.table_id,
                found: address.table_id,
            });
        }

        let mut data = vec![0u8; PAGE_SIZE];
        {
            let mut file = self.lock_file();
            let file_len = file.metadata()?.len();
            let offset = match address.offset(PAGE_SIZE) {
                Some(offset) if offset < file_len => offset,
                _ => {
                    return Err(HeapError::OutOfRange {
                        address,
                        page_count: pages_for(file_len),
                    })
                }
            };

            debug!(self.logger, "read page"; "page" => address.page_number, "offset" => offset);

            file.seek(SeekFrom::Start(offset))?;
            if let Err(e) = file.read_exact(&mut data) {
                warn!(
                    self.logger,
                    "Read less than a page, page: {}, file_len: {}, page_size: {}",
                    address.page_number,
                    file_len,
                    PAGE_SIZE
                );
                return Err(e.into());
            }
        }

        Page::from_bytes(address, &data, &self.desc)
    }

    pub fn write_page(&self, _page: &Page) -> Result<()> {
        Err(HeapError::Unsupported("write_page"))
    }

    pub fn insert_tuple(&self, _tid: TransactionId, _tuple: Tuple) -> Result<Vec<PageAddress>> {
        Err(HeapError::Unsupported("insert_tuple"))
    }

    pub fn delete_tuple(&self, _tid: TransactionId, _tuple: &Tuple) -> Result<Vec<PageAddress>> {
        Err(HeapError::Unsupported("delete_tuple"))
    }

    /// A closed scan over this file on behalf of `tid`, fetching pages through `cache`.
    pub fn open_scan<'a, C>(&'a self, cache: &'a C, tid: TransactionId) -> HeapFileScan<'a, C>
    where
        C: PageCache + ?Sized,
    {
        HeapFileScan::new(self, cache, tid)
    }

    pub(crate) fn logger(&self) -> &Logger {
        &self.logger
    }

    fn lock_file(&self) -> MutexGuard<'_, File> {
        self.file.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
