//! The session/theme shell: an explicit object with a restore/login/logout
//! lifecycle, persisted between invocations as a small cache entry.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::gateway::{AuthGateway, GatewayError};
use crate::domain::entities::UserIdentity;
use crate::domain::types::Theme;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session cache error: {0}")]
    Cache(String),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error("not signed in")]
    NotSignedIn,
}

impl SessionError {
    pub fn cache(err: impl std::fmt::Display) -> Self {
        Self::Cache(err.to_string())
    }
}

/// A signed-in account as cached locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub identity: UserIdentity,
    pub access_token: String,
}

/// The persisted shell state: who is signed in (if anyone) and the chosen
/// theme. Theme survives sign-out.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredSession {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<Account>,
    #[serde(default)]
    pub theme: Theme,
}

impl StoredSession {
    pub fn is_signed_in(&self) -> bool {
        self.account.is_some()
    }

    /// Identity shown in views and stamped onto authored content:
    /// username, then email, then id, then the anonymous fallback.
    pub fn display_identity(&self) -> String {
        match &self.account {
            Some(account) => account.identity.display_name(),
            None => "anonymous".to_string(),
        }
    }
}

/// Local persistence for the shell state.
pub trait SessionStore: Send + Sync {
    fn load(&self) -> Result<Option<StoredSession>, SessionError>;
    fn save(&self, session: &StoredSession) -> Result<(), SessionError>;
    fn clear(&self) -> Result<(), SessionError>;
}

pub struct SessionService {
    auth: Arc<dyn AuthGateway>,
    store: Arc<dyn SessionStore>,
}

impl SessionService {
    pub fn new(auth: Arc<dyn AuthGateway>, store: Arc<dyn SessionStore>) -> Self {
        Self { auth, store }
    }

    /// Restore the cached session. An absent or unreadable cache yields an
    /// anonymous shell rather than an error.
    pub fn restore(&self) -> StoredSession {
        match self.store.load() {
            Ok(Some(session)) => session,
            Ok(None) => StoredSession::default(),
            Err(err) => {
                tracing::warn!(error = %err, "session cache unreadable; starting anonymous");
                StoredSession::default()
            }
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<StoredSession, SessionError> {
        let granted = self.auth.sign_in(email, password).await?;
        let mut session = self.restore();
        session.account = Some(Account {
            identity: granted.identity,
            access_token: granted.access_token,
        });
        self.store.save(&session)?;
        Ok(session)
    }

    /// Best-effort remote sign-out, then clear the local cache either way.
    pub async fn logout(&self) -> Result<(), SessionError> {
        let session = self.restore();
        if let Some(account) = &session.account
            && let Err(err) = self.auth.sign_out(&account.access_token).await
        {
            tracing::warn!(error = %err, "sign-out call failed; clearing the local session anyway");
        }
        self.store.clear()
    }

    /// Re-validate the cached token against the auth service and refresh the
    /// cached identity from the response.
    pub async fn refresh(&self) -> Result<StoredSession, SessionError> {
        let mut session = self.restore();
        let Some(account) = session.account.as_mut() else {
            return Err(SessionError::NotSignedIn);
        };
        account.identity = self.auth.current_user(&account.access_token).await?;
        self.store.save(&session)?;
        Ok(session)
    }

    /// Apply an explicit theme, or toggle when none is given. Returns the
    /// theme now in effect.
    pub fn set_theme(&self, choice: Option<Theme>) -> Result<Theme, SessionError> {
        let mut session = self.restore();
        let next = choice.unwrap_or_else(|| session.theme.toggled());
        session.theme = next;
        self.store.save(&session)?;
        Ok(next)
    }
}
