//! Notification delivery: one feed row per recipient, with registered push
//! endpoints logged for the SPA's service worker to poll.

use db::{
    DBService,
    models::{notification::Notification, push_subscription::PushSubscription},
};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Clone)]
pub struct NotificationService {
    db: DBService,
}

impl NotificationService {
    pub fn new(db: DBService) -> Self {
        Self { db }
    }

    /// Write a feed entry for `profile_id` and record how many push
    /// endpoints would be woken.
    pub async fn notify(
        &self,
        center_id: Option<Uuid>,
        profile_id: Uuid,
        title: &str,
        body: &str,
    ) -> Result<Notification, NotificationError> {
        let notification =
            Notification::create(&self.db.pool, center_id, profile_id, title, body).await?;
        let subscriptions = PushSubscription::list_by_profile(&self.db.pool, profile_id).await?;
        tracing::info!(
            profile_id = %profile_id,
            title,
            push_endpoints = subscriptions.len(),
            "notification queued"
        );
        Ok(notification)
    }
}
