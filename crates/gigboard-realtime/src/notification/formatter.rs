//! Deterministic title, message and link text for each marketplace event.

use uuid::Uuid;

use gigboard_core::types::UserId;
use gigboard_entity::notification::{NewNotification, NotificationType, RelatedEntityType};

use super::events::{
    BidAcceptedEvent, BidRejectedEvent, CounterOfferEvent, DisputeCreatedEvent,
    DisputeResolvedEvent, NewBidEvent, NewMessageEvent, PaymentReceivedEvent,
    ReviewReceivedEvent, TaskAssignedEvent, TaskCancelledEvent, TaskCompletedEvent,
};

/// Longest message preview copied into a notification body.
const PREVIEW_CHARS: usize = 100;

/// Builds the stored notification for each event type.
pub struct NotificationFormatter;

impl NotificationFormatter {
    pub fn new_bid(e: &NewBidEvent) -> NewNotification {
        NewNotification::new(
            e.task_owner_id,
            NotificationType::NewBid,
            "New Bid Received",
            format!(
                "{} placed a bid of {} on \"{}\"",
                e.bidder_name,
                format_amount(e.amount_cents),
                e.task_title
            ),
        )
        .related(RelatedEntityType::Bid, e.bid_id)
        .action_url(task_url(e.task_id))
        .metadata(serde_json::json!({
            "taskId": e.task_id,
            "bidId": e.bid_id,
            "bidderId": e.bidder_id,
            "amountCents": e.amount_cents,
        }))
    }

    pub fn bid_accepted(e: &BidAcceptedEvent) -> NewNotification {
        NewNotification::new(
            e.freelancer_id,
            NotificationType::BidAccepted,
            "Bid Accepted",
            format!("Your bid on \"{}\" was accepted", e.task_title),
        )
        .related(RelatedEntityType::Bid, e.bid_id)
        .action_url(task_url(e.task_id))
        .metadata(serde_json::json!({ "taskId": e.task_id, "bidId": e.bid_id }))
    }

    pub fn bid_rejected(e: &BidRejectedEvent) -> NewNotification {
        NewNotification::new(
            e.freelancer_id,
            NotificationType::BidRejected,
            "Bid Not Selected",
            format!("Your bid on \"{}\" was not selected", e.task_title),
        )
        .related(RelatedEntityType::Bid, e.bid_id)
        .action_url(task_url(e.task_id))
        .metadata(serde_json::json!({ "taskId": e.task_id, "bidId": e.bid_id }))
    }

    pub fn new_message(e: &NewMessageEvent) -> NewNotification {
        NewNotification::new(
            e.recipient_id,
            NotificationType::NewMessage,
            format!("New message from {}", e.sender_name),
            preview(&e.preview),
        )
        .related(RelatedEntityType::Message, e.message_id)
        .action_url(messages_url(e.sender_id))
        .metadata(serde_json::json!({
            "senderId": e.sender_id,
            "messageId": e.message_id,
            "taskId": e.task_id,
        }))
    }

    pub fn task_completed(e: &TaskCompletedEvent) -> NewNotification {
        NewNotification::new(
            e.recipient_id,
            NotificationType::TaskCompleted,
            "Task Completed",
            format!(
                "{} marked \"{}\" as completed",
                e.completed_by_name, e.task_title
            ),
        )
        .related(RelatedEntityType::Task, e.task_id)
        .action_url(task_url(e.task_id))
    }

    pub fn task_cancelled(e: &TaskCancelledEvent) -> NewNotification {
        let message = match e.reason.as_deref().map(str::trim) {
            Some(reason) if !reason.is_empty() => {
                format!("\"{}\" was cancelled: {reason}", e.task_title)
            }
            _ => format!("\"{}\" was cancelled", e.task_title),
        };
        NewNotification::new(
            e.recipient_id,
            NotificationType::TaskCancelled,
            "Task Cancelled",
            message,
        )
        .related(RelatedEntityType::Task, e.task_id)
        .action_url(task_url(e.task_id))
    }

    pub fn payment_received(e: &PaymentReceivedEvent) -> NewNotification {
        NewNotification::new(
            e.recipient_id,
            NotificationType::PaymentReceived,
            "Payment Received",
            format!(
                "You received {} for \"{}\"",
                format_amount(e.amount_cents),
                e.task_title
            ),
        )
        .related(RelatedEntityType::Payment, e.payment_id)
        .action_url("/payments")
        .metadata(serde_json::json!({
            "taskId": e.task_id,
            "amountCents": e.amount_cents,
        }))
    }

    pub fn review_received(e: &ReviewReceivedEvent) -> NewNotification {
        NewNotification::new(
            e.reviewee_id,
            NotificationType::ReviewReceived,
            "New Review",
            format!(
                "{} left you a {}-star review for \"{}\"",
                e.reviewer_name, e.rating, e.task_title
            ),
        )
        .related(RelatedEntityType::Review, e.review_id)
        .action_url(reviews_url(e.reviewee_id))
        .metadata(serde_json::json!({ "taskId": e.task_id, "rating": e.rating }))
    }

    pub fn dispute_created(e: &DisputeCreatedEvent) -> NewNotification {
        NewNotification::new(
            e.recipient_id,
            NotificationType::DisputeCreated,
            "Dispute Opened",
            format!(
                "{} opened a dispute on \"{}\"",
                e.opened_by_name, e.task_title
            ),
        )
        .related(RelatedEntityType::Dispute, e.dispute_id)
        .action_url(dispute_url(e.dispute_id))
        .metadata(serde_json::json!({ "taskId": e.task_id }))
    }

    pub fn dispute_resolved(e: &DisputeResolvedEvent) -> NewNotification {
        NewNotification::new(
            e.recipient_id,
            NotificationType::DisputeResolved,
            "Dispute Resolved",
            format!(
                "The dispute on \"{}\" was resolved: {}",
                e.task_title, e.resolution
            ),
        )
        .related(RelatedEntityType::Dispute, e.dispute_id)
        .action_url(dispute_url(e.dispute_id))
        .metadata(serde_json::json!({ "taskId": e.task_id }))
    }

    pub fn task_assigned(e: &TaskAssignedEvent) -> NewNotification {
        NewNotification::new(
            e.freelancer_id,
            NotificationType::TaskAssigned,
            "Task Assigned",
            format!(
                "{} assigned you to \"{}\"",
                e.owner_name, e.task_title
            ),
        )
        .related(RelatedEntityType::Task, e.task_id)
        .action_url(task_url(e.task_id))
    }

    pub fn counter_offer(e: &CounterOfferEvent) -> NewNotification {
        NewNotification::new(
            e.freelancer_id,
            NotificationType::CounterOffer,
            "Counter Offer",
            format!(
                "{} countered your bid on \"{}\" with {}",
                e.owner_name,
                e.task_title,
                format_amount(e.amount_cents)
            ),
        )
        .related(RelatedEntityType::Bid, e.bid_id)
        .action_url(task_url(e.task_id))
        .metadata(serde_json::json!({
            "taskId": e.task_id,
            "bidId": e.bid_id,
            "amountCents": e.amount_cents,
        }))
    }
}

/// Render cents as dollars with thousands separators, e.g. `$1,250.00`.
pub fn format_amount(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    let dollars = (abs / 100).to_string();

    let mut grouped = String::with_capacity(dollars.len() + dollars.len() / 3);
    for (i, ch) in dollars.chars().enumerate() {
        if i > 0 && (dollars.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{sign}${grouped}.{:02}", abs % 100)
}

/// Trim whitespace and cut long text at a character boundary.
pub fn preview(text: &str) -> String {
    let text = text.trim();
    if text.chars().count() <= PREVIEW_CHARS {
        return text.to_string();
    }
    let cut: String = text.chars().take(PREVIEW_CHARS).collect();
    format!("{}...", cut.trim_end())
}

fn task_url(task_id: Uuid) -> String {
    format!("/tasks/{task_id}")
}

fn dispute_url(dispute_id: Uuid) -> String {
    format!("/disputes/{dispute_id}")
}

fn messages_url(with_user: UserId) -> String {
    format!("/messages/{with_user}")
}

fn reviews_url(user_id: UserId) -> String {
    format!("/users/{user_id}/reviews")
}
