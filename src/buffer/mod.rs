pub mod buffer_pool_manager;
pub mod clock_replacer;
mod lock_table;
pub mod page_cache;
pub mod replace;
