/// Conversation Sync Engine — keeps a client-local message log consistent
/// with the server-held log for one swap.
///
/// Three input paths feed the log: one initial bulk load, push
/// notifications from the change feed, and optimistic local sends. All
/// three go through the same de-duplication check, so the log never holds
/// two entries with the same id regardless of arrival order. After every
/// admitted message the log is re-sorted by (created_at, id); the feed is
/// not trusted to deliver in creation order.
use crate::config::Config;
use crate::error::{Result, SwapError};
use crate::session::Session;
use crate::store::{ChangeFeed, NewMessage, RecordStore};
use crate::types::{ChatEvent, Message};
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// De-duplicated, time-ordered local message log.
///
/// Owned by one open chat view; created empty, discarded when the view
/// closes. Never persisted.
#[derive(Debug, Default)]
pub struct ChatLog {
    entries: Vec<Message>,
}

impl ChatLog {
    pub fn contains(&self, message_id: &str) -> bool {
        self.entries.iter().any(|m| m.id == message_id)
    }

    /// Admit one message: discarded when its id is already present,
    /// otherwise appended and the log re-sorted into canonical order.
    /// Returns whether the message was admitted.
    pub fn admit(&mut self, message: Message) -> bool {
        if self.contains(&message.id) {
            return false;
        }
        self.entries.push(message);
        self.entries
            .sort_by(|a, b| a.order_key().cmp(&b.order_key()));
        true
    }

    fn replace_all(&mut self, messages: Vec<Message>) {
        self.entries = messages;
        self.entries
            .sort_by(|a, b| a.order_key().cmp(&b.order_key()));
    }

    pub fn messages(&self) -> &[Message] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Compose buffer for the outgoing message
#[derive(Debug, Default, Clone)]
pub struct Draft {
    text: String,
}

impl Draft {
    pub fn set(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Clear the buffer and return the trimmed body. A blank draft yields
    /// None and the buffer is left untouched.
    pub fn take(&mut self) -> Option<String> {
        let trimmed = self.text.trim();
        if trimmed.is_empty() {
            return None;
        }
        let body = trimmed.to_string();
        self.text.clear();
        Some(body)
    }

    /// Put the original text back after a failed send
    pub fn restore(&mut self, text: String) {
        self.text = text;
    }
}

/// One open conversation view over a swap's message log
pub struct ChatSession {
    swap_id: String,
    session: Session,
    store: Arc<dyn RecordStore>,
    feed: Arc<dyn ChangeFeed>,
    log: Arc<RwLock<ChatLog>>,
    events: broadcast::Sender<ChatEvent>,
}

impl ChatSession {
    pub fn open(
        swap_id: impl Into<String>,
        session: Session,
        store: Arc<dyn RecordStore>,
        feed: Arc<dyn ChangeFeed>,
        config: &Config,
    ) -> Self {
        let (events, _) = broadcast::channel(config.event_buffer);
        Self {
            swap_id: swap_id.into(),
            session,
            store,
            feed,
            log: Arc::new(RwLock::new(ChatLog::default())),
            events,
        }
    }

    pub fn swap_id(&self) -> &str {
        &self.swap_id
    }

    /// Initial bulk load of the conversation history.
    ///
    /// On failure the log is left as it was (empty on first call) and the
    /// caller decides whether to retry; nothing partial is kept. Calling
    /// again after a dropped feed event resynchronizes the full log.
    pub async fn load(&self) -> Result<usize> {
        let messages = self
            .store
            .fetch_messages(&self.swap_id)
            .await
            .map_err(|e| SwapError::Load(e.to_string()))?;

        let count = messages.len();
        self.log.write().await.replace_all(messages);
        info!("loaded {} messages for swap {}", count, self.swap_id);
        let _ = self.events.send(ChatEvent::LogLoaded { count });
        Ok(count)
    }

    /// Establish the push subscription and start pumping feed rows into
    /// the log. The returned guard owns the pump task; dropping it tears
    /// the subscription down, so a late notification can never mutate a
    /// discarded log.
    pub async fn subscribe(&self) -> Result<ChatSubscription> {
        let sub = self
            .feed
            .subscribe(&self.swap_id)
            .await
            .map_err(|e| SwapError::Feed(e.to_string()))?;
        info!("feed subscription active: {}", sub.channel);

        let store = self.store.clone();
        let log = self.log.clone();
        let events = self.events.clone();
        let channel = sub.channel.clone();
        let mut rx = sub.rx;

        let task = tokio::spawn(async move {
            while let Some(row) = rx.recv().await {
                // The push payload carries only the raw row; re-fetch the
                // record joined with its sender before admitting it.
                let message = match store.fetch_message(&row.id).await {
                    Ok(m) => m,
                    Err(e) => {
                        // Dropped, not retried; a full reload recovers it.
                        warn!("dropping feed event {} on {}: {}", row.id, channel, e);
                        continue;
                    }
                };
                let admitted = log.write().await.admit(message.clone());
                if admitted {
                    debug!("admitted message {} from feed", message.id);
                    let _ = events.send(ChatEvent::MessageAppended { message });
                } else {
                    debug!("duplicate message {} from feed, discarded", message.id);
                }
            }
            debug!("feed channel {} closed", channel);
        });

        Ok(ChatSubscription {
            channel: sub.channel,
            task,
        })
    }

    /// Send the draft as a new message.
    ///
    /// The draft is cleared before the round trip (optimistic compose);
    /// on failure it is restored to the original text and the log is not
    /// touched. The confirmed row goes through the same de-dup check as
    /// feed arrivals, covering the case where the push for this insert is
    /// processed before the insert's own response.
    pub async fn send(&self, draft: &mut Draft) -> Result<Message> {
        let original = draft.text().to_string();
        let body = draft.take().ok_or(SwapError::EmptyMessage)?;

        let new = NewMessage {
            swap_id: self.swap_id.clone(),
            sender_id: self.session.user_id().to_string(),
            body,
        };
        match self.store.insert_message(new).await {
            Ok(message) => {
                let admitted = self.log.write().await.admit(message.clone());
                if admitted {
                    let _ = self.events.send(ChatEvent::MessageAppended {
                        message: message.clone(),
                    });
                } else {
                    debug!("sent message {} already in log", message.id);
                }
                Ok(message)
            }
            Err(e) => {
                draft.restore(original);
                Err(SwapError::Send(e.to_string()))
            }
        }
    }

    /// Snapshot of the local log in canonical order
    pub async fn messages(&self) -> Vec<Message> {
        self.log.read().await.messages().to_vec()
    }

    pub async fn message_count(&self) -> usize {
        self.log.read().await.len()
    }

    /// Receiver of real-time chat events for the embedding view
    pub fn events(&self) -> broadcast::Receiver<ChatEvent> {
        self.events.subscribe()
    }

    /// Display-side classification: does this message belong to the
    /// session user?
    pub fn is_own(&self, message: &Message) -> bool {
        message.sender_id == self.session.user_id()
    }
}

/// Scoped feed subscription. Aborts the pump task on drop, on every exit
/// path of the view's lifetime.
pub struct ChatSubscription {
    channel: String,
    task: JoinHandle<()>,
}

impl ChatSubscription {
    pub fn channel(&self) -> &str {
        &self.channel
    }
}

impl Drop for ChatSubscription {
    fn drop(&mut self) {
        debug!("closing feed subscription {}", self.channel);
        self.task.abort();
    }
}
