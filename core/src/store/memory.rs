/// In-memory backend implementing both collaborator seams.
///
/// Used by tests and by embeddings that want the full engine without a
/// network. Inserted messages fan out to every live subscription for the
/// same swap, mimicking the hosted change feed. Failure-injection flags
/// simulate backend errors; `push_raw` lets tests replay feed events to
/// exercise at-least-once delivery.
use crate::error::{Result, SwapError};
use crate::store::{ChangeFeed, FeedSubscription, NewMessage, NewSwap, RecordStore};
use crate::types::{Message, MessageRow, Profile, Swap, SwapStatus};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{mpsc, Mutex};
use tracing::debug;
use uuid::Uuid;

const FEED_BUFFER: usize = 64;

struct Subscriber {
    swap_id: String,
    tx: mpsc::Sender<MessageRow>,
}

pub struct MemoryBackend {
    profiles: Mutex<HashMap<String, Profile>>,
    swaps: Mutex<HashMap<String, Swap>>,
    messages: Mutex<Vec<MessageRow>>,
    subscribers: Mutex<Vec<Subscriber>>,
    /// Fail the next (and all further) bulk message reads
    pub fail_fetch_messages: AtomicBool,
    /// Fail per-id detail fetches
    pub fail_fetch_message: AtomicBool,
    /// Fail message inserts
    pub fail_insert_message: AtomicBool,
    /// Suppress feed fan-out on insert (tests drive the feed by hand)
    pub mute_feed: AtomicBool,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self {
            profiles: Mutex::new(HashMap::new()),
            swaps: Mutex::new(HashMap::new()),
            messages: Mutex::new(Vec::new()),
            subscribers: Mutex::new(Vec::new()),
            fail_fetch_messages: AtomicBool::new(false),
            fail_fetch_message: AtomicBool::new(false),
            fail_insert_message: AtomicBool::new(false),
            mute_feed: AtomicBool::new(false),
        }
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver a raw row to matching subscribers, bypassing the store.
    /// Lets tests replay a notification or deliver rows out of order.
    pub async fn push_raw(&self, row: MessageRow) {
        let mut subs = self.subscribers.lock().await;
        subs.retain(|s| !s.tx.is_closed());
        for sub in subs.iter() {
            if sub.swap_id == row.swap_id {
                let _ = sub.tx.send(row.clone()).await;
            }
        }
    }

    /// Store a message row directly with a fixed id and timestamp, without
    /// touching the feed. Pairs with `push_raw` in race tests.
    pub async fn seed_message(&self, row: MessageRow) {
        self.messages.lock().await.push(row);
    }

    async fn join_sender(&self, row: &MessageRow) -> Message {
        let sender = self.profiles.lock().await.get(&row.sender_id).cloned();
        Message {
            id: row.id.clone(),
            swap_id: row.swap_id.clone(),
            sender_id: row.sender_id.clone(),
            body: row.body.clone(),
            created_at: row.created_at,
            sender,
        }
    }
}

#[async_trait]
impl RecordStore for MemoryBackend {
    async fn fetch_messages(&self, swap_id: &str) -> Result<Vec<Message>> {
        if self.fail_fetch_messages.load(Ordering::Relaxed) {
            return Err(SwapError::Store("bulk read unavailable".to_string()));
        }
        let rows: Vec<MessageRow> = {
            let messages = self.messages.lock().await;
            let mut rows: Vec<MessageRow> = messages
                .iter()
                .filter(|m| m.swap_id == swap_id)
                .cloned()
                .collect();
            rows.sort_by(|a, b| (a.created_at, &a.id).cmp(&(b.created_at, &b.id)));
            rows
        };
        let mut out = Vec::with_capacity(rows.len());
        for row in &rows {
            out.push(self.join_sender(row).await);
        }
        Ok(out)
    }

    async fn fetch_message(&self, message_id: &str) -> Result<Message> {
        if self.fail_fetch_message.load(Ordering::Relaxed) {
            return Err(SwapError::Store("detail read unavailable".to_string()));
        }
        let row = {
            let messages = self.messages.lock().await;
            messages.iter().find(|m| m.id == message_id).cloned()
        };
        match row {
            Some(row) => Ok(self.join_sender(&row).await),
            None => Err(SwapError::NotFound(format!("message {}", message_id))),
        }
    }

    async fn insert_message(&self, new: NewMessage) -> Result<Message> {
        if self.fail_insert_message.load(Ordering::Relaxed) {
            return Err(SwapError::Store("insert unavailable".to_string()));
        }
        let row = MessageRow {
            id: Uuid::new_v4().to_string(),
            swap_id: new.swap_id,
            sender_id: new.sender_id,
            body: new.body,
            created_at: Utc::now(),
        };
        self.messages.lock().await.push(row.clone());
        debug!("stored message {} for swap {}", row.id, row.swap_id);

        if !self.mute_feed.load(Ordering::Relaxed) {
            self.push_raw(row.clone()).await;
        }
        Ok(self.join_sender(&row).await)
    }

    async fn fetch_swap(&self, swap_id: &str) -> Result<Swap> {
        self.swaps
            .lock()
            .await
            .get(swap_id)
            .cloned()
            .ok_or_else(|| SwapError::NotFound(format!("swap {}", swap_id)))
    }

    async fn fetch_swaps_for_user(&self, user_id: &str) -> Result<Vec<Swap>> {
        let swaps = self.swaps.lock().await;
        let mut out: Vec<Swap> = swaps
            .values()
            .filter(|s| s.is_participant(user_id))
            .cloned()
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out)
    }

    async fn insert_swap(&self, new: NewSwap) -> Result<Swap> {
        let now = Utc::now();
        let swap = Swap {
            id: Uuid::new_v4().to_string(),
            requester_id: new.requester_id,
            provider_id: new.provider_id,
            skill_offered: new.skill_offered,
            skill_wanted: new.skill_wanted,
            message: new.message,
            status: SwapStatus::Proposed,
            created_at: now,
            updated_at: now,
        };
        self.swaps.lock().await.insert(swap.id.clone(), swap.clone());
        Ok(swap)
    }

    async fn update_swap_status(&self, swap_id: &str, status: SwapStatus) -> Result<Swap> {
        let mut swaps = self.swaps.lock().await;
        let swap = swaps
            .get_mut(swap_id)
            .ok_or_else(|| SwapError::NotFound(format!("swap {}", swap_id)))?;
        swap.status = status;
        swap.updated_at = Utc::now();
        Ok(swap.clone())
    }

    async fn fetch_profile(&self, user_id: &str) -> Result<Option<Profile>> {
        Ok(self.profiles.lock().await.get(user_id).cloned())
    }

    async fn upsert_profile(&self, profile: Profile) -> Result<Profile> {
        self.profiles
            .lock()
            .await
            .insert(profile.user_id.clone(), profile.clone());
        Ok(profile)
    }

    async fn list_public_profiles(&self) -> Result<Vec<Profile>> {
        let profiles = self.profiles.lock().await;
        let mut out: Vec<Profile> = profiles
            .values()
            .filter(|p| p.is_public)
            .cloned()
            .collect();
        out.sort_by(|a, b| a.user_id.cmp(&b.user_id));
        Ok(out)
    }
}

#[async_trait]
impl ChangeFeed for MemoryBackend {
    async fn subscribe(&self, swap_id: &str) -> Result<FeedSubscription> {
        let (tx, rx) = mpsc::channel(FEED_BUFFER);
        let channel = format!("chat-messages-{}", swap_id);
        self.subscribers.lock().await.push(Subscriber {
            swap_id: swap_id.to_string(),
            tx,
        });
        debug!("feed subscription opened: {}", channel);
        Ok(FeedSubscription { channel, rx })
    }
}
