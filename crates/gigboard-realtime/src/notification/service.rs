//! Notification service: persist an event's notification, then push it.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use gigboard_core::result::AppResult;
use gigboard_database::store::NotificationStore;
use gigboard_entity::notification::Notification;

use crate::broadcast::Broadcaster;
use crate::message::types::OutboundMessage;
use crate::metrics::RealtimeMetrics;

use super::events::{
    BidAcceptedEvent, BidRejectedEvent, CounterOfferEvent, DisputeCreatedEvent,
    DisputeResolvedEvent, DomainEvent, NewBidEvent, NewMessageEvent, NotificationEvent,
    PaymentReceivedEvent, ReviewReceivedEvent, TaskAssignedEvent, TaskCancelledEvent,
    TaskCompletedEvent,
};

/// Maps marketplace events to a stored notification plus a realtime push.
///
/// The pushed frame always carries the record returned by the store, and
/// nothing is pushed unless the store accepted the record.
#[derive(Debug, Clone)]
pub struct NotificationService {
    store: Arc<dyn NotificationStore>,
    broadcaster: Broadcaster,
    metrics: Arc<RealtimeMetrics>,
}

impl NotificationService {
    /// Create a new notification service.
    pub fn new(
        store: Arc<dyn NotificationStore>,
        broadcaster: Broadcaster,
        metrics: Arc<RealtimeMetrics>,
    ) -> Self {
        Self {
            store,
            broadcaster,
            metrics,
        }
    }

    /// Persist and push the notification for one event.
    ///
    /// A store failure is returned and nothing is pushed. A push failure
    /// after a successful store write is logged and the stored record is
    /// still returned.
    pub async fn notify<E: NotificationEvent>(&self, event: E) -> AppResult<Notification> {
        event.check()?;
        let recipient = event.recipient();

        let notification = self
            .store
            .create(event.to_notification())
            .await
            .inspect_err(|e| {
                error!(
                    user_id = %recipient,
                    kind = %E::KIND,
                    error = %e,
                    "Failed to persist notification"
                );
            })?;

        self.push(&notification);

        info!(
            notification_id = %notification.id,
            user_id = %recipient,
            kind = %E::KIND,
            "Notification created"
        );
        Ok(notification)
    }

    /// Route a tagged domain event to its typed operation.
    pub async fn dispatch(&self, event: DomainEvent) -> AppResult<Notification> {
        match event {
            DomainEvent::NewBid(e) => self.new_bid(e).await,
            DomainEvent::BidAccepted(e) => self.bid_accepted(e).await,
            DomainEvent::BidRejected(e) => self.bid_rejected(e).await,
            DomainEvent::NewMessage(e) => self.new_message(e).await,
            DomainEvent::TaskCompleted(e) => self.task_completed(e).await,
            DomainEvent::TaskCancelled(e) => self.task_cancelled(e).await,
            DomainEvent::PaymentReceived(e) => self.payment_received(e).await,
            DomainEvent::ReviewReceived(e) => self.review_received(e).await,
            DomainEvent::DisputeCreated(e) => self.dispute_created(e).await,
            DomainEvent::DisputeResolved(e) => self.dispute_resolved(e).await,
            DomainEvent::TaskAssigned(e) => self.task_assigned(e).await,
            DomainEvent::CounterOffer(e) => self.counter_offer(e).await,
        }
    }

    /// Notify a task owner of a new bid.
    pub async fn new_bid(&self, event: NewBidEvent) -> AppResult<Notification> {
        self.notify(event).await
    }

    /// Notify a freelancer that their bid was accepted.
    pub async fn bid_accepted(&self, event: BidAcceptedEvent) -> AppResult<Notification> {
        self.notify(event).await
    }

    /// Notify a freelancer that their bid was rejected.
    pub async fn bid_rejected(&self, event: BidRejectedEvent) -> AppResult<Notification> {
        self.notify(event).await
    }

    /// Notify a user of a new direct message.
    pub async fn new_message(&self, event: NewMessageEvent) -> AppResult<Notification> {
        self.notify(event).await
    }

    /// Notify a participant that a task was completed.
    pub async fn task_completed(&self, event: TaskCompletedEvent) -> AppResult<Notification> {
        self.notify(event).await
    }

    /// Notify a participant that a task was cancelled.
    pub async fn task_cancelled(&self, event: TaskCancelledEvent) -> AppResult<Notification> {
        self.notify(event).await
    }

    /// Notify a freelancer that escrow was released.
    pub async fn payment_received(&self, event: PaymentReceivedEvent) -> AppResult<Notification> {
        self.notify(event).await
    }

    /// Notify a user of a new review.
    pub async fn review_received(&self, event: ReviewReceivedEvent) -> AppResult<Notification> {
        self.notify(event).await
    }

    /// Notify the other party that a dispute was opened.
    pub async fn dispute_created(&self, event: DisputeCreatedEvent) -> AppResult<Notification> {
        self.notify(event).await
    }

    /// Notify a party that a dispute was resolved.
    pub async fn dispute_resolved(&self, event: DisputeResolvedEvent) -> AppResult<Notification> {
        self.notify(event).await
    }

    /// Notify a freelancer that they were assigned to a task.
    pub async fn task_assigned(&self, event: TaskAssignedEvent) -> AppResult<Notification> {
        self.notify(event).await
    }

    /// Notify a freelancer of a counter offer on their bid.
    pub async fn counter_offer(&self, event: CounterOfferEvent) -> AppResult<Notification> {
        self.notify(event).await
    }

    fn push(&self, notification: &Notification) {
        let frame = OutboundMessage::new_notification(notification.clone());
        match self.broadcaster.push_to_user(notification.user_id, &frame) {
            Ok(delivered) => {
                self.metrics.notification_published();
                debug!(
                    notification_id = %notification.id,
                    delivered,
                    "Notification pushed"
                );
            }
            Err(e) => {
                self.metrics.push_failed();
                warn!(
                    notification_id = %notification.id,
                    user_id = %notification.user_id,
                    error = %e,
                    "Realtime push failed; notification remains in store"
                );
            }
        }
    }
}
