//! In-memory session store keyed by user identity.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;

use crate::structs::{PendingInput, UserId, UserSession};

/// Process-wide store of user sessions. Cloning is cheap and shares the
/// underlying map; every mutation runs under one write lock so concurrent
/// events cannot observe partial field updates.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<UserId, UserSession>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get-or-create the session for `user`, returning a snapshot.
    pub async fn get(&self, user: UserId) -> UserSession {
        {
            let sessions = self.sessions.read().await;
            if let Some(session) = sessions.get(&user) {
                return session.clone();
            }
        }

        let mut sessions = self.sessions.write().await;
        sessions.entry(user).or_default().clone()
    }

    async fn update<F>(&self, user: UserId, mutate: F)
    where
        F: FnOnce(&mut UserSession),
    {
        let mut sessions = self.sessions.write().await;
        let session = sessions.entry(user).or_default();
        mutate(session);
        session.last_updated = Utc::now();
    }

    pub async fn set_api_key(&self, user: UserId, key: String) {
        self.update(user, |s| s.api_key = Some(key)).await;
        log::debug!("stored API key for user {user}");
    }

    pub async fn set_selected_model(&self, user: UserId, model: String) {
        self.update(user, |s| s.selected_model = model).await;
    }

    pub async fn set_prompt(&self, user: UserId, model: &str, text: String) {
        self.update(user, |s| {
            s.prompts.insert(model.to_string(), text);
        })
        .await;
    }

    /// Clearing stores the empty string, matching "no prompt". Idempotent.
    pub async fn clear_prompt(&self, user: UserId, model: &str) {
        self.set_prompt(user, model, String::new()).await;
    }

    pub async fn set_pending_input(&self, user: UserId, pending: PendingInput) {
        self.update(user, |s| s.pending_input = Some(pending)).await;
    }

    pub async fn clear_pending_input(&self, user: UserId) {
        self.update(user, |s| s.pending_input = None).await;
    }

    /// Read and clear the pending expectation in one critical section, so
    /// it is consumed exactly once even under parallel dispatch.
    pub async fn take_pending_input(&self, user: UserId) -> Option<PendingInput> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.entry(user).or_default();
        let pending = session.pending_input.take();
        if pending.is_some() {
            session.last_updated = Utc::now();
        }
        pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn get_creates_default_session() {
        let store = SessionStore::new();
        let session = store.get(UserId(1)).await;
        assert!(session.api_key.is_none());
        assert_eq!(session.selected_model, crate::DEFAULT_MODEL);
    }

    #[tokio::test]
    async fn set_api_key_round_trips() {
        let store = SessionStore::new();
        store.set_api_key(UserId(1), "sk-abc".to_string()).await;
        assert_eq!(store.get(UserId(1)).await.api_key.as_deref(), Some("sk-abc"));
    }

    #[tokio::test]
    async fn set_selected_model_round_trips() {
        let store = SessionStore::new();
        store
            .set_selected_model(UserId(1), "mistral-medium".to_string())
            .await;
        assert_eq!(store.get(UserId(1)).await.selected_model, "mistral-medium");
    }

    #[tokio::test]
    async fn clear_prompt_is_idempotent() {
        let store = SessionStore::new();
        store
            .set_prompt(UserId(1), "mistral-tiny", "be brief".to_string())
            .await;

        store.clear_prompt(UserId(1), "mistral-tiny").await;
        assert_eq!(store.get(UserId(1)).await.prompt_for("mistral-tiny"), "");

        store.clear_prompt(UserId(1), "mistral-tiny").await;
        assert_eq!(store.get(UserId(1)).await.prompt_for("mistral-tiny"), "");
    }

    #[tokio::test]
    async fn prompts_are_kept_per_model() {
        let store = SessionStore::new();
        store
            .set_prompt(UserId(1), "mistral-tiny", "emoji".to_string())
            .await;
        store
            .set_prompt(UserId(1), "mistral-small", "pirate".to_string())
            .await;

        let session = store.get(UserId(1)).await;
        assert_eq!(session.prompt_for("mistral-tiny"), "emoji");
        assert_eq!(session.prompt_for("mistral-small"), "pirate");
    }

    #[tokio::test]
    async fn take_pending_input_consumes_exactly_once() {
        let store = SessionStore::new();
        store
            .set_pending_input(UserId(1), PendingInput::AwaitingApiKey)
            .await;

        assert_eq!(
            store.take_pending_input(UserId(1)).await,
            Some(PendingInput::AwaitingApiKey)
        );
        assert_eq!(store.take_pending_input(UserId(1)).await, None);
        assert!(store.get(UserId(1)).await.pending_input.is_none());
    }

    #[tokio::test]
    async fn clear_pending_input_discards_expectation() {
        let store = SessionStore::new();
        store
            .set_pending_input(
                UserId(1),
                PendingInput::AwaitingPrompt {
                    model: "mistral-tiny".to_string(),
                },
            )
            .await;
        store.clear_pending_input(UserId(1)).await;
        assert_eq!(store.take_pending_input(UserId(1)).await, None);
    }

    #[tokio::test]
    async fn sessions_are_isolated_per_user() {
        let store = SessionStore::new();
        store.set_api_key(UserId(1), "key-one".to_string()).await;
        store
            .set_selected_model(UserId(2), "mistral-large".to_string())
            .await;

        let one = store.get(UserId(1)).await;
        let two = store.get(UserId(2)).await;
        assert_eq!(one.api_key.as_deref(), Some("key-one"));
        assert_eq!(one.selected_model, crate::DEFAULT_MODEL);
        assert!(two.api_key.is_none());
        assert_eq!(two.selected_model, "mistral-large");
    }

    #[tokio::test]
    async fn concurrent_updates_to_same_user_are_not_lost() {
        let store = SessionStore::new();
        let mut tasks = Vec::new();
        for i in 0..16 {
            let store = store.clone();
            tasks.push(tokio::spawn(async move {
                store
                    .set_prompt(UserId(7), &format!("model-{i}"), format!("prompt-{i}"))
                    .await;
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        let session = store.get(UserId(7)).await;
        assert_eq!(session.prompts.len(), 16);
    }
}
