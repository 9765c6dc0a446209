/// SkillSwap core — client-side library for a skill-exchange application.
///
/// Typed data model, swap lifecycle, explicit session handling, and the
/// conversation sync engine that keeps a local chat log consistent with a
/// hosted backend (record store + push change feed).

pub mod chat;
pub mod config;
pub mod error;
pub mod logging;
pub mod profiles;
pub mod session;
pub mod store;
pub mod swaps;
pub mod types;

pub use chat::{ChatLog, ChatSession, ChatSubscription, Draft};
pub use config::Config;
pub use error::{Result, SwapError};
pub use session::{AdminSession, AuthProvider, Session, StaticAuth, UserIdentity};
pub use store::{ChangeFeed, MemoryBackend, RecordStore};
pub use swaps::SwapManager;
pub use types::{ChatEvent, ConversationSummary, Message, Profile, Swap, SwapStatus};
