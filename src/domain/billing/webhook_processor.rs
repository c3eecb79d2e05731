//! Idempotent webhook processing.
//!
//! 1. Skip events already recorded as succeeded or ignored.
//! 2. Dispatch to the handler for the event type.
//! 3. Record the outcome.
//!
//! A failed event is recorded too, but a redelivery of it is processed
//! again. Concurrent deliveries of the same event race on the store;
//! the loser gets `AlreadyExists` and reports `AlreadyProcessed`. Grant
//! handlers are keyed on payment references, so a lost race never
//! credits twice.

use async_trait::async_trait;
use std::sync::Arc;

use super::stripe_event::{StripeEvent, StripeEventType};
use super::webhook_errors::WebhookError;
use crate::ports::{
    SaveResult, WebhookEventRecord, WebhookEventRepository, WebhookOutcome, WebhookResult,
};

/// Handles one or more Stripe event types.
#[async_trait]
pub trait WebhookEventHandler: Send + Sync {
    fn handles(&self) -> Vec<StripeEventType>;

    /// `Err(WebhookError::Ignored)` acknowledges without side effects.
    async fn handle(&self, event: &StripeEvent) -> Result<(), WebhookError>;
}

/// Routes events to handlers.
#[async_trait]
pub trait WebhookDispatcher: Send + Sync {
    fn get_handler(&self, event_type: &StripeEventType) -> Option<&dyn WebhookEventHandler>;

    /// Unrouted event types are ignored.
    async fn dispatch(&self, event: &StripeEvent) -> Result<(), WebhookError> {
        let event_type = event.parsed_type();
        match self.get_handler(&event_type) {
            Some(handler) => handler.handle(event).await,
            None => Err(WebhookError::Ignored(format!(
                "no handler for event type {}",
                event.event_type
            ))),
        }
    }
}

pub struct IdempotentWebhookProcessor {
    repository: Arc<dyn WebhookEventRepository>,
    dispatcher: Arc<dyn WebhookDispatcher>,
}

impl IdempotentWebhookProcessor {
    pub fn new(
        repository: Arc<dyn WebhookEventRepository>,
        dispatcher: Arc<dyn WebhookDispatcher>,
    ) -> Self {
        Self {
            repository,
            dispatcher,
        }
    }

    /// Processes `event` at most once successfully.
    ///
    /// Handler failures are recorded and returned so the caller answers
    /// with a retryable status.
    pub async fn process(&self, event: &StripeEvent) -> Result<WebhookResult, WebhookError> {
        if let Some(existing) = self.repository.find_by_event_id(&event.id).await? {
            if existing.result != WebhookOutcome::Failed {
                tracing::debug!(event_id = %event.id, "webhook event already processed");
                return Ok(WebhookResult::AlreadyProcessed);
            }
            tracing::info!(event_id = %event.id, "retrying previously failed webhook event");
        }

        let result = self.dispatcher.dispatch(event).await;

        let record = match &result {
            Ok(()) => WebhookEventRecord::success(&event.id, &event.event_type),
            Err(WebhookError::Ignored(reason)) => {
                WebhookEventRecord::ignored(&event.id, &event.event_type, reason)
            }
            Err(e) => WebhookEventRecord::failed(&event.id, &event.event_type, e.to_string()),
        };

        match self.repository.save(record).await? {
            SaveResult::Inserted => match result {
                Ok(()) => Ok(WebhookResult::Processed),
                Err(WebhookError::Ignored(reason)) => {
                    tracing::info!(event_id = %event.id, %reason, "webhook event ignored");
                    Ok(WebhookResult::Processed)
                }
                Err(e) => Err(e),
            },
            SaveResult::AlreadyExists => Ok(WebhookResult::AlreadyProcessed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryStore;
    use crate::domain::billing::stripe_event::StripeEventBuilder;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

    // ══════════════════════════════════════════════════════════════
    // Test Infrastructure
    // ══════════════════════════════════════════════════════════════

    /// Counts invocations; can be switched between failing and succeeding.
    struct MockHandler {
        handles_types: Vec<StripeEventType>,
        call_count: AtomicU32,
        should_fail: AtomicBool,
        should_ignore: bool,
    }

    impl MockHandler {
        fn new(handles: Vec<StripeEventType>) -> Self {
            Self {
                handles_types: handles,
                call_count: AtomicU32::new(0),
                should_fail: AtomicBool::new(false),
                should_ignore: false,
            }
        }

        fn failing(handles: Vec<StripeEventType>) -> Self {
            let handler = Self::new(handles);
            handler.should_fail.store(true, Ordering::SeqCst);
            handler
        }

        fn ignoring(handles: Vec<StripeEventType>) -> Self {
            Self {
                should_ignore: true,
                ..Self::new(handles)
            }
        }

        fn call_count(&self) -> u32 {
            self.call_count.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl WebhookEventHandler for MockHandler {
        fn handles(&self) -> Vec<StripeEventType> {
            self.handles_types.clone()
        }

        async fn handle(&self, _event: &StripeEvent) -> Result<(), WebhookError> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            if self.should_fail.load(Ordering::SeqCst) {
                Err(WebhookError::Database("Simulated failure".to_string()))
            } else if self.should_ignore {
                Err(WebhookError::Ignored("Test ignore".to_string()))
            } else {
                Ok(())
            }
        }
    }

    struct SingleHandlerDispatcher {
        handler: Arc<MockHandler>,
    }

    #[async_trait]
    impl WebhookDispatcher for SingleHandlerDispatcher {
        fn get_handler(&self, event_type: &StripeEventType) -> Option<&dyn WebhookEventHandler> {
            if self.handler.handles_types.contains(event_type) {
                Some(self.handler.as_ref())
            } else {
                None
            }
        }
    }

    fn processor(handler: Arc<MockHandler>) -> (IdempotentWebhookProcessor, Arc<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::new());
        let processor = IdempotentWebhookProcessor::new(
            store.clone(),
            Arc::new(SingleHandlerDispatcher { handler }),
        );
        (processor, store)
    }

    fn test_event(id: &str, event_type: &str) -> StripeEvent {
        StripeEventBuilder::new().id(id).event_type(event_type).build()
    }

    // ══════════════════════════════════════════════════════════════
    // Dispatcher Tests
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn dispatcher_ignores_unrouted_event_types() {
        let handler = Arc::new(MockHandler::new(vec![StripeEventType::InvoicePaid]));
        let dispatcher = SingleHandlerDispatcher { handler };

        let result = dispatcher
            .dispatch(&test_event("evt_unknown", "charge.refunded"))
            .await;

        assert!(matches!(result, Err(WebhookError::Ignored(_))));
    }

    // ══════════════════════════════════════════════════════════════
    // Processor Tests
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn processes_new_event_and_records_success() {
        let handler = Arc::new(MockHandler::new(vec![StripeEventType::InvoicePaid]));
        let (processor, store) = processor(handler.clone());

        let result = processor.process(&test_event("evt_new", "invoice.paid")).await;

        assert_eq!(result.unwrap(), WebhookResult::Processed);
        assert_eq!(handler.call_count(), 1);
        let record = store.find_by_event_id("evt_new").await.unwrap().unwrap();
        assert_eq!(record.result, WebhookOutcome::Success);
    }

    #[tokio::test]
    async fn replay_is_acknowledged_without_handling() {
        let handler = Arc::new(MockHandler::new(vec![StripeEventType::InvoicePaid]));
        let (processor, _) = processor(handler.clone());
        let event = test_event("evt_dup", "invoice.paid");

        processor.process(&event).await.unwrap();
        let result = processor.process(&event).await;

        assert_eq!(result.unwrap(), WebhookResult::AlreadyProcessed);
        assert_eq!(handler.call_count(), 1);
    }

    #[tokio::test]
    async fn failure_is_recorded_and_returned() {
        let handler = Arc::new(MockHandler::failing(vec![StripeEventType::InvoicePaid]));
        let (processor, store) = processor(handler);

        let result = processor.process(&test_event("evt_fail", "invoice.paid")).await;

        assert!(matches!(result, Err(WebhookError::Database(_))));
        let record = store.find_by_event_id("evt_fail").await.unwrap().unwrap();
        assert_eq!(record.result, WebhookOutcome::Failed);
        assert!(record.error_message.unwrap().contains("Simulated failure"));
    }

    #[tokio::test]
    async fn failed_event_is_processed_again_on_redelivery() {
        let handler = Arc::new(MockHandler::failing(vec![StripeEventType::InvoicePaid]));
        let (processor, store) = processor(handler.clone());
        let event = test_event("evt_retry", "invoice.paid");

        assert!(processor.process(&event).await.is_err());
        handler.should_fail.store(false, Ordering::SeqCst);
        let result = processor.process(&event).await;

        assert_eq!(result.unwrap(), WebhookResult::Processed);
        assert_eq!(handler.call_count(), 2);
        let record = store.find_by_event_id("evt_retry").await.unwrap().unwrap();
        assert_eq!(record.result, WebhookOutcome::Success);
        assert!(record.error_message.is_none());
    }

    #[tokio::test]
    async fn ignored_event_counts_as_processed() {
        let handler = Arc::new(MockHandler::ignoring(vec![StripeEventType::InvoicePaid]));
        let (processor, store) = processor(handler.clone());
        let event = test_event("evt_ignore", "invoice.paid");

        assert_eq!(processor.process(&event).await.unwrap(), WebhookResult::Processed);
        assert_eq!(
            processor.process(&event).await.unwrap(),
            WebhookResult::AlreadyProcessed
        );
        assert_eq!(handler.call_count(), 1);
        let record = store.find_by_event_id("evt_ignore").await.unwrap().unwrap();
        assert_eq!(record.result, WebhookOutcome::Ignored);
    }

    #[tokio::test]
    async fn unrouted_event_is_recorded_as_ignored() {
        let handler = Arc::new(MockHandler::new(vec![StripeEventType::InvoicePaid]));
        let (processor, store) = processor(handler);

        let result = processor
            .process(&test_event("evt_other", "customer.created"))
            .await;

        assert_eq!(result.unwrap(), WebhookResult::Processed);
        let record = store.find_by_event_id("evt_other").await.unwrap().unwrap();
        assert_eq!(record.result, WebhookOutcome::Ignored);
    }
}
