use serde_json::Value;
use stream_dispatch_core::attributes::Item;
use stream_dispatch_core::envelope::{ChangeBatch, ChangeRecord};
use tracing::{debug, info};

use crate::error::DispatchError;
use crate::handlers::mutation::MutationHandlers;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchOutcome {
    pub dispatched: usize,
    pub skipped: usize,
}

/// Routes each record to its mutation handler, strictly in batch order. The
/// first failure aborts the remaining records.
pub async fn handle_change_batch(
    batch: &ChangeBatch,
    handlers: &dyn MutationHandlers,
) -> Result<BatchOutcome, DispatchError> {
    let mut outcome = BatchOutcome::default();

    for (position, record) in batch.records.iter().enumerate() {
        let decoded = record.decode()?;
        let event_name = decoded.event_name.as_deref().unwrap_or("<none>");
        let event_id = record.event_id.as_deref().unwrap_or("<none>");
        info!(
            position,
            event_id,
            event_name,
            old_image = %render_image(decoded.before.as_ref()),
            new_image = %render_image(decoded.after.as_ref()),
            "processing stream record"
        );

        let Some(change) = decoded.into_change()? else {
            debug!(position, "skipping record with unrecognized event name");
            outcome.skipped += 1;
            continue;
        };

        match &change {
            ChangeRecord::Insert { after } => handlers.handle_insert(after).await?,
            ChangeRecord::Modify { before, after } => {
                handlers.handle_modify(before.as_ref(), after).await?
            }
            ChangeRecord::Remove { before } => handlers.handle_remove(before).await?,
        }
        outcome.dispatched += 1;
    }

    Ok(outcome)
}

fn render_image(image: Option<&Item>) -> Value {
    image.cloned().map(Value::Object).unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;
    use stream_dispatch_core::envelope::{Envelope, MutationKind};

    use super::*;
    use crate::error::HandlerError;

    #[derive(Default)]
    struct CapturingHandlers {
        kinds: Mutex<Vec<MutationKind>>,
        fail_on: Option<MutationKind>,
    }

    impl CapturingHandlers {
        fn record(&self, kind: MutationKind) -> Result<(), HandlerError> {
            self.kinds.lock().expect("poisoned mutex").push(kind);
            if self.fail_on == Some(kind) {
                return Err(HandlerError::new(format!("{kind} handler failed")));
            }
            Ok(())
        }

        fn kinds(&self) -> Vec<MutationKind> {
            self.kinds.lock().expect("poisoned mutex").clone()
        }
    }

    #[async_trait]
    impl MutationHandlers for CapturingHandlers {
        async fn handle_insert(&self, _after: &Item) -> Result<(), HandlerError> {
            self.record(MutationKind::Insert)
        }

        async fn handle_modify(
            &self,
            _before: Option<&Item>,
            _after: &Item,
        ) -> Result<(), HandlerError> {
            self.record(MutationKind::Modify)
        }

        async fn handle_remove(&self, _before: &Item) -> Result<(), HandlerError> {
            self.record(MutationKind::Remove)
        }
    }

    fn batch(event: Value) -> ChangeBatch {
        match Envelope::classify(event).expect("batch should classify") {
            Envelope::ChangeBatch(batch) => batch,
            Envelope::Scheduled => panic!("expected change batch"),
        }
    }

    fn mixed_batch() -> ChangeBatch {
        batch(json!({
            "Records": [
                {"eventName": "MODIFY", "dynamodb": {
                    "OldImage": {"id": {"S": "1"}}, "NewImage": {"id": {"S": "1"}}
                }},
                {"eventName": "INSERT", "dynamodb": {"NewImage": {"id": {"S": "2"}}}},
                {"eventName": "REMOVE", "dynamodb": {"OldImage": {"id": {"S": "3"}}}},
                {"eventName": "INSERT", "dynamodb": {"NewImage": {"id": {"S": "4"}}}}
            ]
        }))
    }

    #[tokio::test]
    async fn dispatches_in_input_order() {
        let handlers = CapturingHandlers::default();

        let outcome = handle_change_batch(&mixed_batch(), &handlers)
            .await
            .expect("batch should succeed");

        assert_eq!(
            outcome,
            BatchOutcome {
                dispatched: 4,
                skipped: 0
            }
        );
        assert_eq!(
            handlers.kinds(),
            vec![
                MutationKind::Modify,
                MutationKind::Insert,
                MutationKind::Remove,
                MutationKind::Insert,
            ]
        );
    }

    #[tokio::test]
    async fn handler_failure_stops_remaining_records() {
        let handlers = CapturingHandlers {
            fail_on: Some(MutationKind::Insert),
            ..CapturingHandlers::default()
        };

        let error = handle_change_batch(&mixed_batch(), &handlers)
            .await
            .expect_err("insert failure should abort");

        assert!(matches!(error, DispatchError::Handler(_)));
        assert_eq!(
            handlers.kinds(),
            vec![MutationKind::Modify, MutationKind::Insert]
        );
    }

    #[tokio::test]
    async fn undecodable_image_aborts_before_dispatch() {
        let handlers = CapturingHandlers::default();
        let bad = batch(json!({
            "Records": [
                {"eventName": "INSERT", "dynamodb": {"NewImage": {"n": {"N": "oops"}}}}
            ]
        }));

        let error = handle_change_batch(&bad, &handlers)
            .await
            .expect_err("bad number should fail");

        assert!(matches!(error, DispatchError::Envelope(_)));
        assert!(handlers.kinds().is_empty());
    }
}
