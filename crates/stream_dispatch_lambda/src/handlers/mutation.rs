//! Extension points invoked by the dispatcher. [`LoggingHandlers`] is the
//! default implementation and only records which item was seen.

use async_trait::async_trait;
use serde_json::Value;
use stream_dispatch_core::attributes::Item;
use tracing::info;

use crate::error::HandlerError;

#[async_trait]
pub trait MutationHandlers: Send + Sync {
    async fn handle_insert(&self, after: &Item) -> Result<(), HandlerError>;

    /// `before` is `None` when the stream view carries new images only.
    async fn handle_modify(
        &self,
        before: Option<&Item>,
        after: &Item,
    ) -> Result<(), HandlerError>;

    async fn handle_remove(&self, before: &Item) -> Result<(), HandlerError>;
}

#[async_trait]
pub trait ScheduledItemProcessor: Send + Sync {
    async fn process_scheduled_item(&self, item: &Item) -> Result<(), HandlerError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingHandlers;

#[async_trait]
impl MutationHandlers for LoggingHandlers {
    async fn handle_insert(&self, after: &Item) -> Result<(), HandlerError> {
        info!(record_id = %item_id(after), "handling INSERT event");
        Ok(())
    }

    async fn handle_modify(
        &self,
        _before: Option<&Item>,
        after: &Item,
    ) -> Result<(), HandlerError> {
        info!(record_id = %item_id(after), "handling MODIFY event");
        Ok(())
    }

    async fn handle_remove(&self, before: &Item) -> Result<(), HandlerError> {
        info!(record_id = %item_id(before), "handling REMOVE event");
        Ok(())
    }
}

#[async_trait]
impl ScheduledItemProcessor for LoggingHandlers {
    async fn process_scheduled_item(&self, item: &Item) -> Result<(), HandlerError> {
        info!(record_id = %item_id(item), "processing scheduled item");
        Ok(())
    }
}

/// Renders an item's `id` attribute for log lines.
pub fn item_id(item: &Item) -> String {
    match item.get("id") {
        Some(Value::String(id)) => id.clone(),
        Some(other) => other.to_string(),
        None => "<missing>".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn item(value: Value) -> Item {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn item_id_prefers_plain_string() {
        assert_eq!(item_id(&item(json!({"id": "abc"}))), "abc");
        assert_eq!(item_id(&item(json!({"id": 17}))), "17");
        assert_eq!(item_id(&item(json!({}))), "<missing>");
    }

    #[tokio::test]
    async fn logging_handlers_never_fail() {
        let handlers = LoggingHandlers;
        let snapshot = item(json!({"id": "1"}));

        assert!(handlers.handle_insert(&snapshot).await.is_ok());
        assert!(handlers.handle_modify(Some(&snapshot), &snapshot).await.is_ok());
        assert!(handlers.handle_remove(&snapshot).await.is_ok());
        assert!(handlers.process_scheduled_item(&snapshot).await.is_ok());
    }
}
