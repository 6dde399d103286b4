use crate::errors::{HeapError, Result};
use crate::storage::page::page_address::PageAddress;
use crate::transaction::{Permission, TransactionId};
use std::collections::{HashMap, HashSet};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

#[derive(Default)]
struct LockState {
    readers: HashSet<TransactionId>,
    writer: Option<TransactionId>,
}

impl LockState {
    fn is_held_by(&self, tid: TransactionId) -> bool {
        self.writer == Some(tid) || self.readers.contains(&tid)
    }

    fn covers(&self, tid: TransactionId, permission: Permission) -> bool {
        match permission {
            Permission::ReadOnly => self.is_held_by(tid),
            Permission::ReadWrite => self.writer == Some(tid),
        }
    }

    // A sole reader may upgrade to writer.
    fn grantable(&self, tid: TransactionId, permission: Permission) -> bool {
        match permission {
            Permission::ReadOnly => self.writer.is_none(),
            Permission::ReadWrite => {
                self.writer.is_none() && self.readers.iter().all(|reader| *reader == tid)
            }
        }
    }

    fn grant(&mut self, tid: TransactionId, permission: Permission) {
        match permission {
            Permission::ReadOnly => {
                self.readers.insert(tid);
            }
            Permission::ReadWrite => {
                self.readers.remove(&tid);
                self.writer = Some(tid);
            }
        }
    }

    fn release(&mut self, tid: TransactionId) -> bool {
        let was_reader = self.readers.remove(&tid);
        let was_writer = self.writer == Some(tid);
        if was_writer {
            self.writer = None;
        }
        was_reader || was_writer
    }

    fn is_free(&self) -> bool {
        self.writer.is_none() && self.readers.is_empty()
    }
}

#[derive(Default)]
struct Locks {
    pages: HashMap<PageAddress, LockState>,
    held: HashMap<TransactionId, HashSet<PageAddress>>,
}

/// Page-level shared/exclusive locks. Shared locks coexist; an exclusive lock
/// excludes every other transaction. A request that cannot be granted waits
/// up to the timeout and then aborts the requesting transaction.
pub struct LockTable {
    locks: Mutex<Locks>,
    cond_var: Condvar,
    timeout: Duration,
}

impl LockTable {
    pub fn new(timeout: Duration) -> Self {
        Self {
            locks: Mutex::new(Locks::default()),
            cond_var: Condvar::new(),
            timeout,
        }
    }

    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    /// Returns true when `tid` held no lock on the page before this call.
    pub fn acquire(
        &self,
        tid: TransactionId,
        address: PageAddress,
        permission: Permission,
    ) -> Result<bool> {
        let deadline = Instant::now() + self.timeout;
        let mut locks = self.lock();
        loop {
            let state = locks.pages.entry(address).or_default();
            if state.covers(tid, permission) {
                return Ok(false);
            }
            if state.grantable(tid, permission) {
                let newly = !state.is_held_by(tid);
                state.grant(tid, permission);
                locks.held.entry(tid).or_default().insert(address);
                return Ok(newly);
            }

            let timeout = deadline.saturating_duration_since(Instant::now());
            if timeout == Duration::from_secs(0) {
                return Err(HeapError::TransactionAborted(tid));
            }
            locks = self
                .cond_var
                .wait_timeout(locks, timeout)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
    }

    /// Returns true when `tid` held a lock on the page.
    pub fn release(&self, tid: TransactionId, address: PageAddress) -> bool {
        let mut locks = self.lock();
        let released = Self::release_locked(&mut locks, tid, address);
        if let Some(pages) = locks.held.get_mut(&tid) {
            pages.remove(&address);
            if pages.is_empty() {
                locks.held.remove(&tid);
            }
        }
        self.cond_var.notify_all();
        released
    }

    /// Releases every lock `tid` holds and returns the pages they covered.
    pub fn release_all(&self, tid: TransactionId) -> Vec<PageAddress> {
        let mut locks = self.lock();
        let pages: Vec<PageAddress> = locks
            .held
            .remove(&tid)
            .map(|pages| pages.into_iter().collect())
            .unwrap_or_default();
        for address in &pages {
            Self::release_locked(&mut locks, tid, *address);
        }
        self.cond_var.notify_all();
        pages
    }

    pub fn holds_lock(&self, tid: TransactionId, address: PageAddress) -> bool {
        self.lock()
            .pages
            .get(&address)
            .map_or(false, |state| state.is_held_by(tid))
    }

    fn release_locked(locks: &mut Locks, tid: TransactionId, address: PageAddress) -> bool {
        let mut released = false;
        if let Some(state) = locks.pages.get_mut(&address) {
            released = state.release(tid);
            if state.is_free() {
                locks.pages.remove(&address);
            }
        }
        released
    }

    fn lock(&self) -> MutexGuard<'_, Locks> {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
