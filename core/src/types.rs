/// Shared types for the SkillSwap data model
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Public profile record of one member
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: String,
    pub name: Option<String>,
    pub username: Option<String>,
    pub avatar: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub availability: Option<String>,
    pub skills_offered: Vec<String>,
    pub skills_wanted: Vec<String>,
    pub is_public: bool,
    pub profile_complete: bool,
    pub rating: Option<f64>,
    pub swap_count: u32,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Profile {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            name: None,
            username: None,
            avatar: None,
            bio: None,
            location: None,
            availability: None,
            skills_offered: Vec::new(),
            skills_wanted: Vec::new(),
            is_public: true,
            profile_complete: false,
            rating: None,
            swap_count: 0,
            updated_at: None,
        }
    }

    /// A profile is complete once it has a name and at least one skill
    /// on each side of the trade.
    pub fn is_complete(&self) -> bool {
        self.name.as_deref().map(|n| !n.trim().is_empty()).unwrap_or(false)
            && !self.skills_offered.is_empty()
            && !self.skills_wanted.is_empty()
    }
}

/// Raw inserted row as carried by the change feed — no joined sender
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageRow {
    pub id: String,
    pub swap_id: String,
    pub sender_id: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// Full chat message with the sender's profile joined in for display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub swap_id: String,
    pub sender_id: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub sender: Option<Profile>,
}

impl Message {
    /// Canonical ordering key: non-decreasing creation time, ties broken by id
    pub fn order_key(&self) -> (DateTime<Utc>, &str) {
        (self.created_at, self.id.as_str())
    }
}

/// Lifecycle status of a swap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwapStatus {
    Proposed,
    Accepted,
    Rejected,
    Completed,
}

impl SwapStatus {
    /// Allowed transitions: proposed → accepted | rejected, accepted → completed
    pub fn can_transition(self, to: SwapStatus) -> bool {
        matches!(
            (self, to),
            (SwapStatus::Proposed, SwapStatus::Accepted)
                | (SwapStatus::Proposed, SwapStatus::Rejected)
                | (SwapStatus::Accepted, SwapStatus::Completed)
        )
    }
}

impl std::fmt::Display for SwapStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SwapStatus::Proposed => "proposed",
            SwapStatus::Accepted => "accepted",
            SwapStatus::Rejected => "rejected",
            SwapStatus::Completed => "completed",
        };
        write!(f, "{}", s)
    }
}

/// A skill-for-skill trade proposal between two members
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Swap {
    pub id: String,
    /// Member who opened the proposal
    pub requester_id: String,
    /// Member being asked to trade
    pub provider_id: String,
    pub skill_offered: String,
    pub skill_wanted: String,
    /// Optional intro text attached to the proposal
    pub message: Option<String>,
    pub status: SwapStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Swap {
    pub fn is_participant(&self, user_id: &str) -> bool {
        self.requester_id == user_id || self.provider_id == user_id
    }

    /// The other party from `user_id`'s point of view
    pub fn partner_of(&self, user_id: &str) -> &str {
        if self.requester_id == user_id {
            &self.provider_id
        } else {
            &self.requester_id
        }
    }
}

/// Summary of one conversation thread (for the chat list view)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationSummary {
    /// The swap backing this conversation
    pub swap_id: String,
    /// The other party's user id
    pub partner_id: String,
    /// Partner display name, when their profile is available
    pub partner_name: Option<String>,
    /// Preview text of the last message (empty thread → None)
    pub last_preview: Option<String>,
    /// Timestamp of the last message
    pub last_timestamp: Option<DateTime<Utc>>,
}

/// Real-time events emitted by an open chat session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    /// The initial bulk load finished and the log was (re)populated
    LogLoaded { count: usize },
    /// A message was admitted to the local log
    MessageAppended { message: Message },
}
