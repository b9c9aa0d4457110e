use async_trait::async_trait;
use stream_dispatch_core::attributes::Item;
use stream_dispatch_core::scheduled::IndexQuery;

use crate::error::StoreError;

/// Read access to the backing table.
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Returns every item matching `query`, in the order the store yields
    /// them.
    async fn query(&self, query: &IndexQuery) -> Result<Vec<Item>, StoreError>;
}
