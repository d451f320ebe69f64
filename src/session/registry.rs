//! Session registry: which channels belong to which session.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use super::ChannelId;
use crate::error::CodeTunnelError;
use crate::Result;

/// Thread-safe mapping from session token to its open channels.
///
/// The registry is an explicitly owned instance, constructed once at
/// process start and shared by handle. A session key exists if and only
/// if at least one channel is registered under it; removing the last
/// channel removes the key.
pub struct SessionRegistry {
    channels: RwLock<HashMap<String, HashSet<ChannelId>>>,
}

impl SessionRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            channels: RwLock::new(HashMap::new()),
        }
    }

    /// Register an open channel under a session token.
    ///
    /// The session entry is created on first registration.
    pub fn register(&self, token: &str, channel: ChannelId) -> Result<()> {
        let mut channels = self
            .channels
            .write()
            .map_err(|_| CodeTunnelError::LockPoisoned)?;
        channels.entry(token.to_owned()).or_default().insert(channel);
        Ok(())
    }

    /// Deregister a closed channel from its session entry.
    ///
    /// Removes the session key entirely when its channel set empties.
    /// Returns whether the channel was actually registered.
    pub fn deregister(&self, token: &str, channel: ChannelId) -> Result<bool> {
        let mut channels = self
            .channels
            .write()
            .map_err(|_| CodeTunnelError::LockPoisoned)?;

        let Some(set) = channels.get_mut(token) else {
            return Ok(false);
        };
        let removed = set.remove(&channel);
        if set.is_empty() {
            channels.remove(token);
        }
        Ok(removed)
    }

    /// Whether a session currently has any open channel.
    pub fn contains(&self, token: &str) -> bool {
        self.channels
            .read()
            .map(|c| c.contains_key(token))
            .unwrap_or(false)
    }

    /// Number of distinct active session tokens.
    pub fn session_count(&self) -> usize {
        self.channels.read().map(|c| c.len()).unwrap_or(0)
    }

    /// Number of channels currently open for one session.
    pub fn channel_count(&self, token: &str) -> usize {
        self.channels
            .read()
            .map(|c| c.get(token).map_or(0, HashSet::len))
            .unwrap_or(0)
    }

    /// Snapshot of all active session tokens.
    pub fn session_tokens(&self) -> Result<Vec<String>> {
        let channels = self
            .channels
            .read()
            .map_err(|_| CodeTunnelError::LockPoisoned)?;
        Ok(channels.keys().cloned().collect())
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
