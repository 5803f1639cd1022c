//! Locally cached notification list and unread count.

use gigboard_entity::notification::Notification;

use crate::machine::AgentNotice;

/// What the client last knew about the user's notifications.
///
/// The cache is never authoritative. Read-state frames only flag it stale;
/// the consumer refreshes it from the notification list endpoint.
#[derive(Debug, Clone, Default)]
pub struct NotificationCache {
    entries: Vec<Notification>,
    unread_count: u64,
    stale: bool,
}

impl NotificationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the contents with a fresh listing, newest first.
    pub fn replace(&mut self, entries: Vec<Notification>, unread_count: u64) {
        self.entries = entries;
        self.unread_count = unread_count;
        self.stale = false;
    }

    /// Flag the cache as out of date.
    pub fn invalidate(&mut self) {
        self.stale = true;
    }

    /// Fold an agent notice into the cache.
    pub fn apply(&mut self, notice: &AgentNotice) {
        match notice {
            AgentNotice::Alert(notification) => {
                if self.entries.iter().all(|n| n.id != notification.id) {
                    self.entries.insert(0, (**notification).clone());
                    if notification.is_unread() {
                        self.unread_count += 1;
                    }
                }
            }
            AgentNotice::Invalidate | AgentNotice::Connected => self.invalidate(),
            _ => {}
        }
    }

    pub fn entries(&self) -> &[Notification] {
        &self.entries
    }

    pub fn unread_count(&self) -> u64 {
        self.unread_count
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }
}
