//! Notification type and related-entity enumerations.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The closed set of events a user can be notified about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    /// A freelancer bid on one of the user's tasks.
    NewBid,
    /// The user's bid was accepted.
    BidAccepted,
    /// The user's bid was rejected.
    BidRejected,
    /// The user received a direct message.
    NewMessage,
    /// A task the user is involved in was marked complete.
    TaskCompleted,
    /// A task the user is involved in was cancelled.
    TaskCancelled,
    /// Escrowed funds were released to the user.
    PaymentReceived,
    /// Someone left the user a review.
    ReviewReceived,
    /// A dispute was opened on one of the user's tasks.
    DisputeCreated,
    /// A dispute the user is party to was resolved.
    DisputeResolved,
    /// The user was assigned to a task.
    TaskAssigned,
    /// The task owner countered the user's bid.
    CounterOffer,
}

impl NotificationType {
    /// Every variant, in declaration order.
    pub const ALL: [NotificationType; 12] = [
        Self::NewBid,
        Self::BidAccepted,
        Self::BidRejected,
        Self::NewMessage,
        Self::TaskCompleted,
        Self::TaskCancelled,
        Self::PaymentReceived,
        Self::ReviewReceived,
        Self::DisputeCreated,
        Self::DisputeResolved,
        Self::TaskAssigned,
        Self::CounterOffer,
    ];

    /// Return the wire/storage name of the type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NewBid => "new_bid",
            Self::BidAccepted => "bid_accepted",
            Self::BidRejected => "bid_rejected",
            Self::NewMessage => "new_message",
            Self::TaskCompleted => "task_completed",
            Self::TaskCancelled => "task_cancelled",
            Self::PaymentReceived => "payment_received",
            Self::ReviewReceived => "review_received",
            Self::DisputeCreated => "dispute_created",
            Self::DisputeResolved => "dispute_resolved",
            Self::TaskAssigned => "task_assigned",
            Self::CounterOffer => "counter_offer",
        }
    }
}

impl std::fmt::Display for NotificationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for NotificationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("Unknown notification type: '{s}'"))
    }
}

/// Kind of domain object a notification points back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelatedEntityType {
    /// A posted task.
    Task,
    /// A bid on a task.
    Bid,
    /// A direct message.
    Message,
    /// A dispute on a task.
    Dispute,
    /// A review left after completion.
    Review,
    /// An escrow payment.
    Payment,
}

impl RelatedEntityType {
    /// Return the wire/storage name of the entity type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Task => "task",
            Self::Bid => "bid",
            Self::Message => "message",
            Self::Dispute => "dispute",
            Self::Review => "review",
            Self::Payment => "payment",
        }
    }
}

impl std::fmt::Display for RelatedEntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RelatedEntityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "task" => Ok(Self::Task),
            "bid" => Ok(Self::Bid),
            "message" => Ok(Self::Message),
            "dispute" => Ok(Self::Dispute),
            "review" => Ok(Self::Review),
            "payment" => Ok(Self::Payment),
            other => Err(format!("Unknown related entity type: '{other}'")),
        }
    }
}
