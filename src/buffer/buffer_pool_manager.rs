use crate::buffer::clock_replacer::ClockReplacer;
use crate::buffer::lock_table::LockTable;
use crate::buffer::page_cache::PageCache;
use crate::buffer::replace::Replacer;
use crate::errors::{HeapError, Result};
use crate::storage::heap::heap_file::HeapFile;
use crate::storage::page::page_address::PageAddress;
use crate::storage::page::Page;
use crate::transaction::{Permission, TransactionId};
use crate::{FrameId, TableId, DEFAULT_LOCK_TIMEOUT_MS};
use slog::Logger;
use std::collections::{HashMap, LinkedList};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::time::Duration;

struct Frame {
    page: Arc<Page>,
    // Number of transactions holding a lock on the page.
    pin_count: u32,
}

struct PoolState {
    // Buffer pool frames in use.
    frames: HashMap<FrameId, Frame>,
    // Page table for keeping track of buffer pool pages
    page_table: HashMap<PageAddress, FrameId>,
    replacer: ClockReplacer,
    free_list: LinkedList<FrameId>,
}

impl PoolState {
    // find in free lists first, then replacer
    fn find_replacement(&mut self, logger: &Logger) -> Option<FrameId> {
        if let Some(frame_id) = self.free_list.pop_front() {
            Some(frame_id)
        } else if let Some(frame_id) = self.replacer.victim() {
            if let Some(frame) = self.frames.remove(&frame_id) {
                let evicted = frame.page.get_id();
                debug!(logger, "evicted {}", evicted; "frame_id" => frame_id);
                self.page_table.remove(&evicted);
            }
            Some(frame_id)
        } else {
            // all the pages in buffer pool are pinned
            None
        }
    }

    fn pin_resident(&mut self, address: PageAddress, newly_locked: bool) -> Option<Arc<Page>> {
        let frame_id = *self.page_table.get(&address)?;
        let frame = self.frames.get_mut(&frame_id)?;
        if newly_locked {
            frame.pin_count += 1;
        }
        let page = Arc::clone(&frame.page);
        if newly_locked {
            self.replacer.pin(frame_id);
        }
        Some(page)
    }

    fn unpin(&mut self, address: PageAddress) {
        if let Some(frame_id) = self.page_table.get(&address) {
            if let Some(frame) = self.frames.get_mut(frame_id) {
                frame.pin_count = frame.pin_count.saturating_sub(1);
                if frame.pin_count == 0 {
                    self.replacer.unpin(*frame_id);
                }
            }
        }
    }
}

/// Page cache shared by every transaction. Pages are read through the
/// registered heap files and stay resident while some transaction holds a
/// lock on them; unlocked pages are evicted by a clock replacer when the pool
/// runs out of free frames.
pub struct BufferPoolManager {
    // Number of pages in the buffer pool
    pool_size: usize,
    tables: RwLock<HashMap<TableId, Arc<HeapFile>>>,
    state: Mutex<PoolState>,
    lock_table: LockTable,
    logger: Logger,
}

impl BufferPoolManager {
    pub fn new(pool_size: usize, logger: &Logger) -> Self {
        let mut free_list = LinkedList::new();

        for i in 0..pool_size {
            free_list.push_back(i as FrameId);
        }

        Self {
            pool_size,
            tables: RwLock::new(HashMap::new()),
            state: Mutex::new(PoolState {
                frames: HashMap::new(),
                page_table: Default::default(),
                replacer: ClockReplacer::new(pool_size),
                free_list,
            }),
            lock_table: LockTable::new(Duration::from_millis(DEFAULT_LOCK_TIMEOUT_MS)),
            logger: logger.new(o!("pool_size" => pool_size)),
        }
    }

    /// How long a fetch waits for a conflicting lock before aborting.
    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_table.set_timeout(timeout);
        self
    }

    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    /// Makes the pages of `file` available through this cache. A file whose id
    /// is already registered replaces the earlier one.
    pub fn register(&self, file: Arc<HeapFile>) {
        let table_id = file.get_id();
        debug!(self.logger, "registered table"; "table_id" => table_id);
        let previous = self
            .tables
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(table_id, Arc::clone(&file));
        if let Some(previous) = previous {
            if previous.path() != file.path() {
                warn!(
                    self.logger,
                    "table id collision, {} replaces {}",
                    file.path().display(),
                    previous.path().display();
                    "table_id" => table_id
                );
            }
        }
    }

    pub fn resident_pages(&self) -> usize {
        self.state().page_table.len()
    }

    pub fn holds_lock(&self, tid: TransactionId, address: PageAddress) -> bool {
        self.lock_table.holds_lock(tid, address)
    }

    /// Gives up `tid`'s lock on a single page before the transaction ends.
    pub fn release_page(&self, tid: TransactionId, address: PageAddress) {
        if self.lock_table.release(tid, address) {
            self.state().unpin(address);
        }
    }

    /// Releases every lock and pin held by `tid`.
    pub fn transaction_complete(&self, tid: TransactionId) {
        let pages = self.lock_table.release_all(tid);
        debug!(self.logger, "transaction complete"; "txn" => tid.get_id(), "pages" => pages.len());
        let mut state = self.state();
        for address in pages {
            state.unpin(address);
        }
    }

    fn table(&self, table_id: TableId) -> Result<Arc<HeapFile>> {
        self.tables
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&table_id)
            .cloned()
            .ok_or(HeapError::UnknownTable(table_id))
    }

    // Pins the page, reading it in on a miss. `newly_locked` tells whether
    // this is a new lock holder for the page, and so a new pin. The pool
    // mutex is not held across the read, so hits proceed while a miss waits
    // on the backing store.
    fn pin_page(&self, address: PageAddress, newly_locked: bool) -> Result<Arc<Page>> {
        let (file, frame_id) = {
            let mut state = self.state();
            if let Some(page) = state.pin_resident(address, newly_locked) {
                debug!(self.logger, "hit {}", address);
                return Ok(page);
            }
            let file = self.table(address.table_id)?;
            let frame_id = state
                .find_replacement(&self.logger)
                .ok_or(HeapError::BufferPoolExhausted)?;
            (file, frame_id)
        };
        debug!(self.logger, "miss {}", address; "frame_id" => frame_id);

        // The reserved frame is in neither the free list nor the replacer.
        let read = file.read_page(address);

        let mut state = self.state();
        let page = match read {
            Ok(page) => Arc::new(page),
            Err(e) => {
                state.free_list.push_back(frame_id);
                return Err(e);
            }
        };

        // Another transaction read the same page in meanwhile.
        if let Some(resident) = state.pin_resident(address, newly_locked) {
            debug!(self.logger, "lost read race for {}", address; "frame_id" => frame_id);
            state.free_list.push_back(frame_id);
            return Ok(resident);
        }

        let pin_count = if newly_locked { 1 } else { 0 };
        state.frames.insert(
            frame_id,
            Frame {
                page: Arc::clone(&page),
                pin_count,
            },
        );
        state.page_table.insert(address, frame_id);
        if pin_count == 0 {
            state.replacer.unpin(frame_id);
        }
        Ok(page)
    }

    fn state(&self) -> MutexGuard<'_, PoolState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PageCache for BufferPoolManager {
    fn fetch(
        &self,
        tid: TransactionId,
        address: PageAddress,
        permission: Permission,
    ) -> Result<Arc<Page>> {
        let newly_locked = match self.lock_table.acquire(tid, address, permission) {
            Ok(newly_locked) => newly_locked,
            Err(e) => {
                warn!(
                    self.logger,
                    "lock wait timed out on {}", address;
                    "txn" => tid.get_id(),
                    "permission" => ?permission
                );
                return Err(e);
            }
        };

        self.pin_page(address, newly_locked).map_err(|e| {
            if newly_locked {
                self.lock_table.release(tid, address);
            }
            e
        })
    }
}
