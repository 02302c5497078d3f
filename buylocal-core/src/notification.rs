use async_trait::async_trait;
use buylocal_shared::OfferEvent;

use crate::CoreResult;

/// Fire-and-forget notification collaborator.
///
/// Callers log and discard failures; delivery success never changes the
/// outcome of the operation that produced the event.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, event: &OfferEvent) -> CoreResult<()>;
}

/// Notifier that only writes the event to the trace log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, event: &OfferEvent) -> CoreResult<()> {
        let payload = serde_json::to_string(event)
            .map_err(|e| crate::CoreError::Notification(e.to_string()))?;

        tracing::info!(
            event_type = event.event_type(),
            member_id = event.member_id(),
            offer_id = event.offer_id(),
            "Notification: {}",
            payload
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use buylocal_shared::{RedemptionArtifact, OfferRedeemedEvent};

    #[tokio::test]
    async fn test_log_notifier_accepts_events() {
        let event = OfferEvent::OfferRedeemed(OfferRedeemedEvent {
            event_id: uuid::Uuid::new_v4(),
            offer_id: 1,
            member_id: 2,
            institution_id: 1,
            artifact: RedemptionArtifact::Redemption,
            artifact_id: 9,
            timestamp: 0,
        });

        assert!(LogNotifier.notify(&event).await.is_ok());
    }
}
