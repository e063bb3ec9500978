//! Notification transport interface.

use async_trait::async_trait;

use crate::models::signal::{Direction, VoteBreakdown};

#[async_trait]
pub trait NotificationTransport: Send + Sync {
    /// Deliver one signal. Returns `false` when the message was not delivered;
    /// transport errors are logged, never raised.
    async fn notify(
        &self,
        symbol: &str,
        direction: Direction,
        strength: u8,
        votes: &VoteBreakdown,
    ) -> bool;
}
