/// Profile directory: reading, saving and browsing member profiles
use crate::error::Result;
use crate::store::RecordStore;
use crate::types::Profile;
use chrono::Utc;
use std::sync::Arc;
use tracing::debug;

pub struct ProfileDirectory {
    store: Arc<dyn RecordStore>,
}

impl ProfileDirectory {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub async fn get(&self, user_id: &str) -> Result<Option<Profile>> {
        self.store.fetch_profile(user_id).await
    }

    /// Save a profile, stamping the update time and recomputing the
    /// completeness flag.
    pub async fn save(&self, mut profile: Profile) -> Result<Profile> {
        profile.profile_complete = profile.is_complete();
        profile.updated_at = Some(Utc::now());
        debug!("saving profile for {}", profile.user_id);
        self.store.upsert_profile(profile).await
    }

    /// Members shown on the browse page: public, complete profiles,
    /// excluding the viewer.
    pub async fn browse(&self, viewer_id: &str) -> Result<Vec<Profile>> {
        let all = self.store.list_public_profiles().await?;
        Ok(all
            .into_iter()
            .filter(|p| p.profile_complete && p.user_id != viewer_id)
            .collect())
    }
}
