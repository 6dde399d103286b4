use crate::errors::Result;
use crate::storage::page::page_address::PageAddress;
use crate::storage::page::Page;
use crate::transaction::{Permission, TransactionId};
use std::sync::Arc;

/// Serves pages by address on behalf of transactions.
///
/// A successful fetch leaves `tid` holding a lock on the page matching
/// `permission`, and the page stays resident until the transaction gives the
/// lock up. Fails with `HeapError::TransactionAborted` when the lock cannot be
/// granted; read failures from the backing store are passed through unchanged.
pub trait PageCache {
    fn fetch(
        &self,
        tid: TransactionId,
        address: PageAddress,
        permission: Permission,
    ) -> Result<Arc<Page>>;
}
