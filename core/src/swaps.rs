/// Swap lifecycle: proposals, responses, completion and the conversation
/// list derived from accepted swaps.
use crate::error::{Result, SwapError};
use crate::session::Session;
use crate::store::{NewSwap, RecordStore};
use crate::types::{ConversationSummary, Swap, SwapStatus};
use std::sync::Arc;
use tracing::info;

pub struct SwapManager {
    store: Arc<dyn RecordStore>,
}

impl SwapManager {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Open a new proposal from the session user to `provider_id`
    pub async fn propose(
        &self,
        session: &Session,
        provider_id: impl Into<String>,
        skill_offered: impl Into<String>,
        skill_wanted: impl Into<String>,
        message: Option<String>,
    ) -> Result<Swap> {
        let provider_id = provider_id.into();
        if provider_id == session.user_id() {
            return Err(SwapError::Forbidden(
                "cannot propose a swap with yourself".to_string(),
            ));
        }
        let swap = self
            .store
            .insert_swap(NewSwap {
                requester_id: session.user_id().to_string(),
                provider_id,
                skill_offered: skill_offered.into(),
                skill_wanted: skill_wanted.into(),
                message,
            })
            .await?;
        info!("swap {} proposed by {}", swap.id, swap.requester_id);
        Ok(swap)
    }

    /// Provider accepts or rejects a pending proposal
    pub async fn respond(&self, session: &Session, swap_id: &str, accept: bool) -> Result<Swap> {
        let swap = self.store.fetch_swap(swap_id).await?;
        if swap.provider_id != session.user_id() {
            return Err(SwapError::Forbidden(
                "only the provider can respond to a proposal".to_string(),
            ));
        }
        let target = if accept {
            SwapStatus::Accepted
        } else {
            SwapStatus::Rejected
        };
        self.transition(&swap, target).await
    }

    /// Either participant marks an accepted swap as completed
    pub async fn complete(&self, session: &Session, swap_id: &str) -> Result<Swap> {
        let swap = self.store.fetch_swap(swap_id).await?;
        if !swap.is_participant(session.user_id()) {
            return Err(SwapError::Forbidden(
                "only a participant can complete a swap".to_string(),
            ));
        }
        self.transition(&swap, SwapStatus::Completed).await
    }

    async fn transition(&self, swap: &Swap, to: SwapStatus) -> Result<Swap> {
        if !swap.status.can_transition(to) {
            return Err(SwapError::InvalidTransition(format!(
                "{} -> {}",
                swap.status, to
            )));
        }
        let updated = self.store.update_swap_status(&swap.id, to).await?;
        info!("swap {} moved to {}", updated.id, updated.status);
        Ok(updated)
    }

    /// All swaps where the user participates, newest first
    pub async fn swaps_for(&self, user_id: &str) -> Result<Vec<Swap>> {
        self.store.fetch_swaps_for_user(user_id).await
    }

    /// Chat opens only while the swap is accepted
    pub fn chat_enabled(&self, swap: &Swap) -> bool {
        swap.status == SwapStatus::Accepted
    }

    /// The user's chat list: accepted swaps with partner name and a
    /// preview of the last message.
    pub async fn conversations(&self, user_id: &str) -> Result<Vec<ConversationSummary>> {
        let swaps = self.store.fetch_swaps_for_user(user_id).await?;
        let mut out = Vec::new();
        for swap in swaps.iter().filter(|s| s.status == SwapStatus::Accepted) {
            let partner_id = swap.partner_of(user_id).to_string();
            let partner_name = self
                .store
                .fetch_profile(&partner_id)
                .await?
                .and_then(|p| p.name);
            let messages = self.store.fetch_messages(&swap.id).await?;
            let last = messages.last();
            out.push(ConversationSummary {
                swap_id: swap.id.clone(),
                partner_id,
                partner_name,
                last_preview: last.map(|m| m.body.clone()),
                last_timestamp: last.map(|m| m.created_at),
            });
        }
        // Most recently active thread first; empty threads sink to the end
        out.sort_by(|a, b| b.last_timestamp.cmp(&a.last_timestamp));
        Ok(out)
    }
}
