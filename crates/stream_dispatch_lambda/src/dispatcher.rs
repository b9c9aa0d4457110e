use chrono::{DateTime, Utc};
use serde_json::Value;
use stream_dispatch_core::envelope::{is_scheduled_event, Envelope};
use stream_dispatch_core::response::{DispatchResponse, DispatchSummary};
use tracing::{error, info};

use crate::adapters::item_store::ItemStore;
use crate::error::DispatchError;
use crate::handlers::mutation::{MutationHandlers, ScheduledItemProcessor};
use crate::handlers::scheduled::handle_scheduled_event;
use crate::handlers::stream::handle_change_batch;

/// Entry point shared by every invocation. Holds no mutable state, so one
/// instance serves the whole process lifetime.
pub struct Dispatcher<'a> {
    store: &'a dyn ItemStore,
    mutations: &'a dyn MutationHandlers,
    scheduled: &'a dyn ScheduledItemProcessor,
    table_name: &'a str,
}

impl<'a> Dispatcher<'a> {
    pub fn new(
        store: &'a dyn ItemStore,
        mutations: &'a dyn MutationHandlers,
        scheduled: &'a dyn ScheduledItemProcessor,
        table_name: &'a str,
    ) -> Self {
        Self {
            store,
            mutations,
            scheduled,
            table_name,
        }
    }

    pub async fn dispatch(&self, event: Value) -> Result<DispatchResponse, DispatchError> {
        self.dispatch_at(event, Utc::now()).await
    }

    /// Same as [`Dispatcher::dispatch`] with the wall clock pinned to `now`.
    /// Errors are logged and returned unchanged.
    pub async fn dispatch_at(
        &self,
        event: Value,
        now: DateTime<Utc>,
    ) -> Result<DispatchResponse, DispatchError> {
        self.route(event, now)
            .await
            .inspect_err(|error| error!(error = %error, "error processing event"))
    }

    async fn route(
        &self,
        event: Value,
        now: DateTime<Utc>,
    ) -> Result<DispatchResponse, DispatchError> {
        let scheduled = is_scheduled_event(&event);
        info!(event = %event, scheduled, "processing event");

        let summary = match Envelope::classify(event)? {
            Envelope::Scheduled => {
                let processed =
                    handle_scheduled_event(self.store, self.scheduled, self.table_name, now).await?;
                DispatchSummary::scheduled_completed(processed)
            }
            Envelope::ChangeBatch(batch) => {
                let outcome = handle_change_batch(&batch, self.mutations).await?;
                info!(
                    dispatched = outcome.dispatched,
                    skipped = outcome.skipped,
                    "stream batch complete"
                );
                DispatchSummary::stream_completed()
            }
        };
        Ok(DispatchResponse::ok(&summary)?)
    }
}
