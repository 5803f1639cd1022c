//! Marketplace events that produce notifications.
//!
//! Each event carries ids and display names already resolved by the caller;
//! nothing here looks up users or tasks.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use gigboard_core::error::AppError;
use gigboard_core::result::AppResult;
use gigboard_core::types::UserId;
use gigboard_entity::notification::{NewNotification, NotificationType};

use super::formatter::NotificationFormatter;

/// An event that becomes exactly one notification for one recipient.
pub trait NotificationEvent: Validate + Send {
    /// The notification type this event produces.
    const KIND: NotificationType;

    /// The user who receives the notification.
    fn recipient(&self) -> UserId;

    /// Build the record to persist.
    fn to_notification(&self) -> NewNotification;

    /// Check field constraints, mapped to a validation error.
    fn check(&self) -> AppResult<()> {
        self.validate()
            .map_err(|e| AppError::validation(format!("Invalid {} event: {e}", Self::KIND)))
    }
}

macro_rules! notification_event {
    ($event:ty, $kind:ident, $recipient:ident, $format:ident) => {
        impl NotificationEvent for $event {
            const KIND: NotificationType = NotificationType::$kind;

            fn recipient(&self) -> UserId {
                self.$recipient
            }

            fn to_notification(&self) -> NewNotification {
                NotificationFormatter::$format(self)
            }
        }
    };
}

/// A freelancer bid on a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewBidEvent {
    pub task_owner_id: UserId,
    pub task_id: Uuid,
    #[validate(length(min = 1, max = 200))]
    pub task_title: String,
    pub bid_id: Uuid,
    pub bidder_id: UserId,
    #[validate(length(min = 1, max = 100))]
    pub bidder_name: String,
    #[validate(range(min = 0))]
    pub amount_cents: i64,
}

/// The task owner accepted a freelancer's bid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BidAcceptedEvent {
    pub freelancer_id: UserId,
    pub task_id: Uuid,
    #[validate(length(min = 1, max = 200))]
    pub task_title: String,
    pub bid_id: Uuid,
}

/// The task owner rejected a freelancer's bid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BidRejectedEvent {
    pub freelancer_id: UserId,
    pub task_id: Uuid,
    #[validate(length(min = 1, max = 200))]
    pub task_title: String,
    pub bid_id: Uuid,
}

/// A direct message arrived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewMessageEvent {
    pub recipient_id: UserId,
    pub sender_id: UserId,
    #[validate(length(min = 1, max = 100))]
    pub sender_name: String,
    pub message_id: Uuid,
    #[validate(length(max = 10000))]
    pub preview: String,
    #[serde(default)]
    pub task_id: Option<Uuid>,
}

/// A task was marked complete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TaskCompletedEvent {
    pub recipient_id: UserId,
    pub task_id: Uuid,
    #[validate(length(min = 1, max = 200))]
    pub task_title: String,
    #[validate(length(min = 1, max = 100))]
    pub completed_by_name: String,
}

/// A task was cancelled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TaskCancelledEvent {
    pub recipient_id: UserId,
    pub task_id: Uuid,
    #[validate(length(min = 1, max = 200))]
    pub task_title: String,
    #[serde(default)]
    #[validate(length(max = 500))]
    pub reason: Option<String>,
}

/// Escrowed funds were released to the recipient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PaymentReceivedEvent {
    pub recipient_id: UserId,
    pub payment_id: Uuid,
    pub task_id: Uuid,
    #[validate(length(min = 1, max = 200))]
    pub task_title: String,
    #[validate(range(min = 0))]
    pub amount_cents: i64,
}

/// A review was left for the recipient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReviewReceivedEvent {
    pub reviewee_id: UserId,
    pub review_id: Uuid,
    pub task_id: Uuid,
    #[validate(length(min = 1, max = 200))]
    pub task_title: String,
    #[validate(length(min = 1, max = 100))]
    pub reviewer_name: String,
    #[validate(range(min = 1, max = 5))]
    pub rating: u8,
}

/// A dispute was opened on a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DisputeCreatedEvent {
    pub recipient_id: UserId,
    pub dispute_id: Uuid,
    pub task_id: Uuid,
    #[validate(length(min = 1, max = 200))]
    pub task_title: String,
    #[validate(length(min = 1, max = 100))]
    pub opened_by_name: String,
}

/// A dispute was resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DisputeResolvedEvent {
    pub recipient_id: UserId,
    pub dispute_id: Uuid,
    pub task_id: Uuid,
    #[validate(length(min = 1, max = 200))]
    pub task_title: String,
    #[validate(length(min = 1, max = 500))]
    pub resolution: String,
}

/// A freelancer was assigned to a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TaskAssignedEvent {
    pub freelancer_id: UserId,
    pub task_id: Uuid,
    #[validate(length(min = 1, max = 200))]
    pub task_title: String,
    #[validate(length(min = 1, max = 100))]
    pub owner_name: String,
}

/// The task owner countered a freelancer's bid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CounterOfferEvent {
    pub freelancer_id: UserId,
    pub task_id: Uuid,
    #[validate(length(min = 1, max = 200))]
    pub task_title: String,
    pub bid_id: Uuid,
    #[validate(length(min = 1, max = 100))]
    pub owner_name: String,
    #[validate(range(min = 0))]
    pub amount_cents: i64,
}

notification_event!(NewBidEvent, NewBid, task_owner_id, new_bid);
notification_event!(BidAcceptedEvent, BidAccepted, freelancer_id, bid_accepted);
notification_event!(BidRejectedEvent, BidRejected, freelancer_id, bid_rejected);
notification_event!(NewMessageEvent, NewMessage, recipient_id, new_message);
notification_event!(TaskCompletedEvent, TaskCompleted, recipient_id, task_completed);
notification_event!(TaskCancelledEvent, TaskCancelled, recipient_id, task_cancelled);
notification_event!(PaymentReceivedEvent, PaymentReceived, recipient_id, payment_received);
notification_event!(ReviewReceivedEvent, ReviewReceived, reviewee_id, review_received);
notification_event!(DisputeCreatedEvent, DisputeCreated, recipient_id, dispute_created);
notification_event!(DisputeResolvedEvent, DisputeResolved, recipient_id, dispute_resolved);
notification_event!(TaskAssignedEvent, TaskAssigned, freelancer_id, task_assigned);
notification_event!(CounterOfferEvent, CounterOffer, freelancer_id, counter_offer);

/// Any marketplace event, tagged by `event` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DomainEvent {
    NewBid(NewBidEvent),
    BidAccepted(BidAcceptedEvent),
    BidRejected(BidRejectedEvent),
    NewMessage(NewMessageEvent),
    TaskCompleted(TaskCompletedEvent),
    TaskCancelled(TaskCancelledEvent),
    PaymentReceived(PaymentReceivedEvent),
    ReviewReceived(ReviewReceivedEvent),
    DisputeCreated(DisputeCreatedEvent),
    DisputeResolved(DisputeResolvedEvent),
    TaskAssigned(TaskAssignedEvent),
    CounterOffer(CounterOfferEvent),
}

impl DomainEvent {
    /// The notification type this event produces.
    pub fn kind(&self) -> NotificationType {
        match self {
            Self::NewBid(_) => NewBidEvent::KIND,
            Self::BidAccepted(_) => BidAcceptedEvent::KIND,
            Self::BidRejected(_) => BidRejectedEvent::KIND,
            Self::NewMessage(_) => NewMessageEvent::KIND,
            Self::TaskCompleted(_) => TaskCompletedEvent::KIND,
            Self::TaskCancelled(_) => TaskCancelledEvent::KIND,
            Self::PaymentReceived(_) => PaymentReceivedEvent::KIND,
            Self::ReviewReceived(_) => ReviewReceivedEvent::KIND,
            Self::DisputeCreated(_) => DisputeCreatedEvent::KIND,
            Self::DisputeResolved(_) => DisputeResolvedEvent::KIND,
            Self::TaskAssigned(_) => TaskAssignedEvent::KIND,
            Self::CounterOffer(_) => CounterOfferEvent::KIND,
        }
    }
}
