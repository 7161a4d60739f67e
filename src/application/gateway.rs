//! Gateway traits describing the hosted-service collaborators.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::entities::{NewPost, PostPatch, PostRecord, UserIdentity};

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("backend rejected the request: {message}")]
    Backend {
        message: String,
        code: Option<String>,
        details: Option<String>,
        hint: Option<String>,
    },
    #[error("response could not be decoded: {0}")]
    Decode(String),
    #[error("record not found")]
    NotFound,
}

impl GatewayError {
    pub fn transport(err: impl std::fmt::Display) -> Self {
        Self::Transport(err.to_string())
    }

    pub fn decode(err: impl std::fmt::Display) -> Self {
        Self::Decode(err.to_string())
    }
}

/// Table-scoped operations against the hosted post store.
#[async_trait]
pub trait PostsGateway: Send + Sync {
    /// All posts, newest first.
    async fn list_posts(&self) -> Result<Vec<PostRecord>, GatewayError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<PostRecord>, GatewayError>;

    /// Exact-match lookup used by repost resolution. May legitimately return
    /// zero or several rows.
    async fn find_by_title_and_username(
        &self,
        title: &str,
        username: &str,
    ) -> Result<Vec<PostRecord>, GatewayError>;

    async fn insert_post(&self, post: &NewPost) -> Result<PostRecord, GatewayError>;

    async fn update_post(&self, id: i64, patch: &PostPatch) -> Result<(), GatewayError>;

    async fn delete_post(&self, id: i64) -> Result<(), GatewayError>;
}

/// A granted sign-in: the identity plus the bearer token for later calls.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub identity: UserIdentity,
    pub access_token: String,
}

/// The hosted authentication collaborator.
#[async_trait]
pub trait AuthGateway: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, GatewayError>;

    async fn current_user(&self, access_token: &str) -> Result<UserIdentity, GatewayError>;

    async fn sign_out(&self, access_token: &str) -> Result<(), GatewayError>;
}

/// Best-effort reverse geocoding used to pre-fill the composer's location.
#[async_trait]
pub trait GeocodeGateway: Send + Sync {
    async fn reverse(&self, latitude: f64, longitude: f64)
    -> Result<Option<String>, GatewayError>;
}
