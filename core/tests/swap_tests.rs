/// Swap lifecycle, profile directory and session tests
use chrono::{Duration as ChronoDuration, Utc};
use skillswap_core::profiles::ProfileDirectory;
use skillswap_core::store::MemoryBackend;
use skillswap_core::types::Profile;
use skillswap_core::{
    AdminSession, Config, RecordStore, Session, SwapError, SwapManager, SwapStatus, UserIdentity,
};
use std::sync::Arc;
use std::time::Duration;

fn session(user: &str) -> Session {
    Session::new(UserIdentity::new(user))
}

fn complete_profile(id: &str, name: &str) -> Profile {
    let mut p = Profile::new(id);
    p.name = Some(name.to_string());
    p.skills_offered = vec!["guitar".to_string()];
    p.skills_wanted = vec!["spanish".to_string()];
    p
}

async fn manager() -> (Arc<MemoryBackend>, SwapManager) {
    let backend = Arc::new(MemoryBackend::new());
    let manager = SwapManager::new(backend.clone());
    (backend, manager)
}

#[tokio::test]
async fn propose_creates_pending_swap() {
    let (_, manager) = manager().await;
    let swap = manager
        .propose(&session("alice"), "bob", "guitar", "spanish", Some("hi".to_string()))
        .await
        .unwrap();

    assert_eq!(swap.status, SwapStatus::Proposed);
    assert_eq!(swap.requester_id, "alice");
    assert_eq!(swap.provider_id, "bob");
    assert!(swap.is_participant("alice"));
    assert!(swap.is_participant("bob"));
    assert_eq!(swap.partner_of("alice"), "bob");
    assert!(!manager.chat_enabled(&swap));
}

#[tokio::test]
async fn cannot_propose_to_self() {
    let (_, manager) = manager().await;
    let err = manager
        .propose(&session("alice"), "alice", "guitar", "spanish", None)
        .await
        .unwrap_err();
    assert!(matches!(err, SwapError::Forbidden(_)));
}

#[tokio::test]
async fn provider_accepts_and_chat_opens() {
    let (_, manager) = manager().await;
    let swap = manager
        .propose(&session("alice"), "bob", "guitar", "spanish", None)
        .await
        .unwrap();

    let accepted = manager.respond(&session("bob"), &swap.id, true).await.unwrap();
    assert_eq!(accepted.status, SwapStatus::Accepted);
    assert!(manager.chat_enabled(&accepted));
}

#[tokio::test]
async fn only_provider_can_respond() {
    let (_, manager) = manager().await;
    let swap = manager
        .propose(&session("alice"), "bob", "guitar", "spanish", None)
        .await
        .unwrap();

    let err = manager
        .respond(&session("alice"), &swap.id, true)
        .await
        .unwrap_err();
    assert!(matches!(err, SwapError::Forbidden(_)));
}

#[tokio::test]
async fn rejected_swap_is_terminal() {
    let (_, manager) = manager().await;
    let swap = manager
        .propose(&session("alice"), "bob", "guitar", "spanish", None)
        .await
        .unwrap();
    let rejected = manager.respond(&session("bob"), &swap.id, false).await.unwrap();
    assert_eq!(rejected.status, SwapStatus::Rejected);

    // No way back out of rejected
    let err = manager
        .respond(&session("bob"), &swap.id, true)
        .await
        .unwrap_err();
    assert!(matches!(err, SwapError::InvalidTransition(_)));
    let err = manager
        .complete(&session("alice"), &swap.id)
        .await
        .unwrap_err();
    assert!(matches!(err, SwapError::InvalidTransition(_)));
}

#[tokio::test]
async fn completion_requires_accepted_state() {
    let (_, manager) = manager().await;
    let swap = manager
        .propose(&session("alice"), "bob", "guitar", "spanish", None)
        .await
        .unwrap();

    let err = manager
        .complete(&session("alice"), &swap.id)
        .await
        .unwrap_err();
    assert!(matches!(err, SwapError::InvalidTransition(_)));

    manager.respond(&session("bob"), &swap.id, true).await.unwrap();
    let done = manager.complete(&session("alice"), &swap.id).await.unwrap();
    assert_eq!(done.status, SwapStatus::Completed);
    assert!(!manager.chat_enabled(&done));
}

#[tokio::test]
async fn stranger_cannot_complete() {
    let (_, manager) = manager().await;
    let swap = manager
        .propose(&session("alice"), "bob", "guitar", "spanish", None)
        .await
        .unwrap();
    manager.respond(&session("bob"), &swap.id, true).await.unwrap();

    let err = manager
        .complete(&session("mallory"), &swap.id)
        .await
        .unwrap_err();
    assert!(matches!(err, SwapError::Forbidden(_)));
}

#[tokio::test]
async fn conversations_list_accepted_swaps_with_previews() -> anyhow::Result<()> {
    let (backend, manager) = manager().await;
    backend.upsert_profile(complete_profile("bob", "Bob")).await?;

    let accepted = manager
        .propose(&session("alice"), "bob", "guitar", "spanish", None)
        .await?;
    manager.respond(&session("bob"), &accepted.id, true).await?;

    // A second, still-pending swap must not show up in the chat list
    manager
        .propose(&session("alice"), "carol", "guitar", "violin", None)
        .await?;

    let convs = manager.conversations("alice").await?;
    assert_eq!(convs.len(), 1);
    assert_eq!(convs[0].swap_id, accepted.id);
    assert_eq!(convs[0].partner_id, "bob");
    assert_eq!(convs[0].partner_name, Some("Bob".to_string()));
    assert!(convs[0].last_preview.is_none());

    backend
        .insert_message(skillswap_core::store::NewMessage {
            swap_id: accepted.id.clone(),
            sender_id: "bob".to_string(),
            body: "see you tuesday".to_string(),
        })
        .await?;

    let convs = manager.conversations("alice").await?;
    assert_eq!(convs[0].last_preview, Some("see you tuesday".to_string()));
    assert!(convs[0].last_timestamp.is_some());
    Ok(())
}

#[tokio::test]
async fn browse_excludes_viewer_private_and_incomplete_profiles() {
    let backend = Arc::new(MemoryBackend::new());
    let directory = ProfileDirectory::new(backend.clone());

    directory.save(complete_profile("alice", "Alice")).await.unwrap();
    directory.save(complete_profile("bob", "Bob")).await.unwrap();

    let mut private = complete_profile("carol", "Carol");
    private.is_public = false;
    directory.save(private).await.unwrap();

    // No skills yet, so not complete
    let mut bare = Profile::new("dave");
    bare.name = Some("Dave".to_string());
    directory.save(bare).await.unwrap();

    let visible = directory.browse("alice").await.unwrap();
    let ids: Vec<&str> = visible.iter().map(|p| p.user_id.as_str()).collect();
    assert_eq!(ids, vec!["bob"]);
}

#[tokio::test]
async fn profile_save_stamps_completeness_and_update_time() {
    let backend = Arc::new(MemoryBackend::new());
    let directory = ProfileDirectory::new(backend.clone());

    let saved = directory.save(complete_profile("alice", "Alice")).await.unwrap();
    assert!(saved.profile_complete);
    assert!(saved.updated_at.is_some());

    let mut incomplete = saved.clone();
    incomplete.skills_wanted.clear();
    let saved = directory.save(incomplete).await.unwrap();
    assert!(!saved.profile_complete);
}

#[test]
fn admin_session_expiry_is_a_pure_function() {
    let max_age = Config::default().admin_session_max_age;
    assert_eq!(max_age, Duration::from_secs(24 * 60 * 60));

    let now = Utc::now();
    let fresh = AdminSession::new("root", now - ChronoDuration::hours(1));
    assert!(fresh.is_valid(now, max_age));

    let stale = AdminSession::new("root", now - ChronoDuration::hours(25));
    assert!(!stale.is_valid(now, max_age));

    // Clock skew: a token issued in the future is not valid
    let skewed = AdminSession::new("root", now + ChronoDuration::hours(1));
    assert!(!skewed.is_valid(now, max_age));
}

#[test]
fn static_auth_reports_and_clears_session() {
    use skillswap_core::{AuthProvider, StaticAuth};

    let auth = StaticAuth::signed_in(UserIdentity::new("alice"));
    assert_eq!(auth.current_session().unwrap().user_id(), "alice");

    auth.sign_out();
    assert!(auth.current_session().is_none());
    assert!(StaticAuth::signed_out().current_session().is_none());
}

#[test]
fn status_transition_table() {
    use SwapStatus::*;
    assert!(Proposed.can_transition(Accepted));
    assert!(Proposed.can_transition(Rejected));
    assert!(Accepted.can_transition(Completed));

    assert!(!Accepted.can_transition(Rejected));
    assert!(!Rejected.can_transition(Accepted));
    assert!(!Completed.can_transition(Accepted));
    assert!(!Proposed.can_transition(Completed));
    assert!(!Proposed.can_transition(Proposed));
}
