use std::sync::Arc;

use async_trait::async_trait;
use buylocal_core::{Clock, CoreError, CoreResult, Notifier, Repository};
use buylocal_shared::OfferEvent;
use tracing::debug;

use crate::models::Notification;

/// Notifier that stores each event as an unread notification for the member
/// it concerns.
#[derive(Clone)]
pub struct NotificationService {
    repository: Arc<dyn Repository<Notification>>,
    clock: Arc<dyn Clock>,
}

impl NotificationService {
    pub fn new(repository: Arc<dyn Repository<Notification>>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    pub async fn unread_for_member(&self, member_id: i64) -> CoreResult<Vec<Notification>> {
        self.repository
            .query(&|n: &Notification| n.member_id == member_id && !n.is_read && !n.is_deleted)
            .await
    }

    pub async fn mark_read(&self, notification_id: i64) -> CoreResult<Notification> {
        let mut notification = self
            .repository
            .find_by_id(notification_id)
            .await?
            .ok_or(CoreError::NotFound { entity: "notification", id: notification_id })?;
        notification.is_read = true;
        self.repository.update(notification).await
    }
}

#[async_trait]
impl Notifier for NotificationService {
    async fn notify(&self, event: &OfferEvent) -> CoreResult<()> {
        let payload = serde_json::to_value(event).map_err(|e| CoreError::Notification(e.to_string()))?;

        let notification = self
            .repository
            .add(Notification {
                id: 0,
                offer_id: event.offer_id(),
                member_id: event.member_id(),
                event_type: event.event_type().to_string(),
                payload,
                created_at: self.clock.now(),
                is_read: false,
                is_deleted: false,
            })
            .await?;

        debug!(notification_id = notification.id, event_type = event.event_type(), "Notification stored");
        Ok(())
    }
}
