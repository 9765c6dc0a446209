/// Collaborator seams for the hosted backend.
///
/// Persistence and push delivery live in an external service; the core only
/// sees these two traits. `RecordStore` covers filtered reads, inserts and
/// updates; `ChangeFeed` delivers at-least-once notification of newly
/// inserted message rows for one swap, with no ordering guarantee across
/// channels.
use crate::error::Result;
use crate::types::{Message, MessageRow, Profile, Swap, SwapStatus};
use async_trait::async_trait;
use tokio::sync::mpsc;

pub mod memory;

pub use memory::MemoryBackend;

/// Fields supplied by the client for a new message; id and creation
/// timestamp are assigned server-side.
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub swap_id: String,
    pub sender_id: String,
    pub body: String,
}

/// Fields supplied by the client for a new swap proposal
#[derive(Debug, Clone)]
pub struct NewSwap {
    pub requester_id: String,
    pub provider_id: String,
    pub skill_offered: String,
    pub skill_wanted: String,
    pub message: Option<String>,
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// All messages for one swap, ordered by creation timestamp ascending
    async fn fetch_messages(&self, swap_id: &str) -> Result<Vec<Message>>;

    /// One message by id, joined with its sender's profile
    async fn fetch_message(&self, message_id: &str) -> Result<Message>;

    /// Insert a message and return the stored row joined with the sender
    async fn insert_message(&self, new: NewMessage) -> Result<Message>;

    async fn fetch_swap(&self, swap_id: &str) -> Result<Swap>;

    /// Swaps where the user is requester or provider, newest first
    async fn fetch_swaps_for_user(&self, user_id: &str) -> Result<Vec<Swap>>;

    async fn insert_swap(&self, new: NewSwap) -> Result<Swap>;

    async fn update_swap_status(&self, swap_id: &str, status: SwapStatus) -> Result<Swap>;

    async fn fetch_profile(&self, user_id: &str) -> Result<Option<Profile>>;

    async fn upsert_profile(&self, profile: Profile) -> Result<Profile>;

    async fn list_public_profiles(&self) -> Result<Vec<Profile>>;
}

/// An open push subscription, scoped to one swap id.
///
/// The channel name is kept for logging; delivery happens over the
/// receiver. Dropping the subscription closes the channel.
pub struct FeedSubscription {
    pub channel: String,
    pub rx: mpsc::Receiver<MessageRow>,
}

#[async_trait]
pub trait ChangeFeed: Send + Sync {
    /// Subscribe to raw inserted message rows where swap_id matches.
    /// Delivery is at-least-once; duplicates and reordering are possible.
    async fn subscribe(&self, swap_id: &str) -> Result<FeedSubscription>;
}
