use chrono::{DateTime, Utc};
use stream_dispatch_core::scheduled::pending_items_query;
use tracing::{error, info};

use crate::adapters::item_store::ItemStore;
use crate::error::DispatchError;
use crate::handlers::mutation::ScheduledItemProcessor;

/// Queries pending items from the window ending at `now` and feeds each one
/// to `processor` in query order. Returns the number of items processed.
pub async fn handle_scheduled_event(
    store: &dyn ItemStore,
    processor: &dyn ScheduledItemProcessor,
    table_name: &str,
    now: DateTime<Utc>,
) -> Result<usize, DispatchError> {
    process_pending_items(store, processor, table_name, now)
        .await
        .inspect_err(|error| error!(error = %error, "error in scheduled processing"))
}

async fn process_pending_items(
    store: &dyn ItemStore,
    processor: &dyn ScheduledItemProcessor,
    table_name: &str,
    now: DateTime<Utc>,
) -> Result<usize, DispatchError> {
    let query = pending_items_query(table_name, now);
    let items = store.query(&query).await?;
    info!(record_count = items.len(), "found records for processing");

    for item in &items {
        processor.process_scheduled_item(item).await?;
    }

    Ok(items.len())
}
