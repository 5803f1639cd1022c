//! Connection registry: every open connection, indexed by user.

use std::sync::Arc;

use dashmap::DashMap;

use gigboard_core::types::{ConnectionId, UserId};

use super::handle::ConnectionHandle;

/// Thread-safe map from a user to that user's open connections.
///
/// Constructed once at startup and shared by the gateway and broadcaster.
/// An entry exists only while the user has at least one connection.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    by_user: DashMap<UserId, Vec<Arc<ConnectionHandle>>>,
}

impl ConnectionRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a connection under its user. Returns `false` if it was already registered.
    pub fn register(&self, handle: Arc<ConnectionHandle>) -> bool {
        let mut connections = self.by_user.entry(handle.user_id).or_default();
        if connections.iter().any(|c| c.id == handle.id) {
            return false;
        }
        connections.push(handle);
        true
    }

    /// Removes a connection, dropping the user entry once it is empty.
    pub fn unregister(
        &self,
        user_id: UserId,
        conn_id: ConnectionId,
    ) -> Option<Arc<ConnectionHandle>> {
        let removed = self.by_user.get_mut(&user_id).and_then(|mut connections| {
            let pos = connections.iter().position(|c| c.id == conn_id)?;
            Some(connections.remove(pos))
        });
        self.by_user
            .remove_if(&user_id, |_, connections| connections.is_empty());
        removed
    }

    /// Gets all open connections for a user, or an empty list.
    pub fn connections_for(&self, user_id: UserId) -> Vec<Arc<ConnectionHandle>> {
        self.by_user
            .get(&user_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    /// Whether the registry holds an entry for the user.
    pub fn contains_user(&self, user_id: UserId) -> bool {
        self.by_user.contains_key(&user_id)
    }

    /// Returns total number of open connections.
    pub fn connection_count(&self) -> usize {
        self.by_user.iter().map(|entry| entry.value().len()).sum()
    }

    /// Returns number of users with at least one open connection.
    pub fn user_count(&self) -> usize {
        self.by_user.len()
    }

    /// Removes every connection, returning them.
    pub fn drain(&self) -> Vec<Arc<ConnectionHandle>> {
        let users: Vec<UserId> = self.by_user.iter().map(|entry| *entry.key()).collect();
        users
            .into_iter()
            .filter_map(|user_id| self.by_user.remove(&user_id))
            .flat_map(|(_, connections)| connections)
            .collect()
    }
}
