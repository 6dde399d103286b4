mod buffer;
mod errors;
mod storage;
mod transaction;

#[cfg(test)]
mod test_utils;

#[macro_use]
extern crate slog;
extern crate slog_async;
extern crate slog_term;

pub use self::buffer::buffer_pool_manager::BufferPoolManager;
pub use self::buffer::clock_replacer::ClockReplacer;
pub use self::buffer::page_cache::PageCache;
pub use self::buffer::replace::Replacer;
pub use self::errors::{HeapError, Result};
pub use self::storage::heap::heap_file::HeapFile;
pub use self::storage::heap::heap_file_encoder::HeapFileEncoder;
pub use self::storage::heap::heap_file_scan::HeapFileScan;
pub use self::storage::page::page_address::PageAddress;
pub use self::storage::page::{Page, PageTuples};
pub use self::storage::tuple::{Field, RecordId, Tuple, TupleDesc, Type};
pub use self::transaction::{Permission, TransactionId};

pub fn default_logger() -> slog::Logger {
    use slog::Drain;

    let decorator = slog_term::TermDecorator::new().build();
    let drain = slog_term::FullFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();
    slog::Logger::root(drain, o!())
}

/// Size in bytes of every page in every heap file. Changing it invalidates
/// the addressing of all existing files.
pub const PAGE_SIZE: usize = 4096;
/// How long a fetch waits on a conflicting page lock before aborting.
pub const DEFAULT_LOCK_TIMEOUT_MS: u64 = 500;
/// Payload bytes of a `Text` field.
pub const STRING_LEN: usize = 128;

pub type TableId = u32;
pub type PageNumber = u64;
pub type SlotId = usize;
pub type FrameId = u32;
