//! The logged-in user. Absent until login; its id is the patient id used
//! for remote fetches.

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSession {
    pub id: String,
    pub name: String,
}

/// Holds the current session. Injected into the composition root rather
/// than read from ambient shared state.
#[derive(Default)]
pub struct SessionHolder {
    inner: RwLock<Option<UserSession>>,
}

impl SessionHolder {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn login(&self, id: impl Into<String>, name: impl Into<String>) -> UserSession {
        let session = UserSession {
            id: id.into(),
            name: name.into(),
        };
        *self.inner.write().await = Some(session.clone());
        tracing::info!(user_id = %session.id, "user logged in");
        session
    }

    /// Clear the session; returns whether one was active.
    pub async fn logout(&self) -> bool {
        let was_active = self.inner.write().await.take().is_some();
        if was_active {
            tracing::info!("user logged out");
        }
        was_active
    }

    pub async fn current(&self) -> Option<UserSession> {
        self.inner.read().await.clone()
    }

    pub async fn is_active(&self) -> bool {
        self.inner.read().await.is_some()
    }
}
