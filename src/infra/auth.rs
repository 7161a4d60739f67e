//! Client for the hosted authentication collaborator: password-grant
//! sign-in, current-user retrieval, and sign-out.

use async_trait::async_trait;
use reqwest::{Client, Response, header};
use serde::Deserialize;
use url::Url;
use uuid::Uuid;

use crate::application::gateway::{AuthGateway, AuthSession, GatewayError};
use crate::domain::entities::UserIdentity;
use crate::infra::rest::user_agent;

#[derive(Clone, Debug)]
pub struct AuthBackend {
    client: Client,
    base: Url,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    user: WireUser,
}

#[derive(Debug, Deserialize)]
struct WireUser {
    id: Uuid,
    #[serde(default)]
    email: String,
    #[serde(default)]
    user_metadata: UserMetadata,
}

#[derive(Debug, Default, Deserialize)]
struct UserMetadata {
    #[serde(default)]
    username: Option<String>,
}

impl From<WireUser> for UserIdentity {
    fn from(user: WireUser) -> Self {
        UserIdentity {
            id: user.id,
            email: user.email,
            username: user.user_metadata.username,
        }
    }
}

/// The auth service reports failures in a couple of shapes; collect the
/// first usable message.
#[derive(Debug, Default, Deserialize)]
struct AuthErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl AuthBackend {
    pub fn new(base: &str, api_key: String) -> Result<Self, GatewayError> {
        let base = Url::parse(base)
            .and_then(|url| url.join("/"))
            .map_err(GatewayError::transport)?;
        let client = Client::builder()
            .user_agent(user_agent())
            .build()
            .map_err(GatewayError::transport)?;
        Ok(Self {
            client,
            base,
            api_key,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, GatewayError> {
        self.base.join(path).map_err(GatewayError::transport)
    }

    async fn reject(resp: Response) -> GatewayError {
        let status = resp.status();
        let bytes = match resp.bytes().await {
            Ok(bytes) => bytes,
            Err(err) => return GatewayError::transport(err),
        };
        let body: AuthErrorBody = serde_json::from_slice(&bytes).unwrap_or_default();
        let message = body
            .message
            .or(body.error_description)
            .or(body.error)
            .unwrap_or_else(|| format!("auth request failed with status {status}"));
        GatewayError::Backend {
            message,
            code: None,
            details: None,
            hint: None,
        }
    }
}

#[async_trait]
impl AuthGateway for AuthBackend {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, GatewayError> {
        let mut url = self.endpoint("auth/v1/token")?;
        url.query_pairs_mut().append_pair("grant_type", "password");

        let resp = self
            .client
            .post(url)
            .header("apikey", &self.api_key)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(GatewayError::transport)?;

        if !resp.status().is_success() {
            return Err(Self::reject(resp).await);
        }

        let granted: TokenResponse = resp.json().await.map_err(GatewayError::decode)?;
        Ok(AuthSession {
            identity: granted.user.into(),
            access_token: granted.access_token,
        })
    }

    async fn current_user(&self, access_token: &str) -> Result<UserIdentity, GatewayError> {
        let url = self.endpoint("auth/v1/user")?;
        let resp = self
            .client
            .get(url)
            .header("apikey", &self.api_key)
            .header(header::AUTHORIZATION, format!("Bearer {access_token}"))
            .send()
            .await
            .map_err(GatewayError::transport)?;

        if !resp.status().is_success() {
            return Err(Self::reject(resp).await);
        }

        let user: WireUser = resp.json().await.map_err(GatewayError::decode)?;
        Ok(user.into())
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), GatewayError> {
        let url = self.endpoint("auth/v1/logout")?;
        let resp = self
            .client
            .post(url)
            .header("apikey", &self.api_key)
            .header(header::AUTHORIZATION, format!("Bearer {access_token}"))
            .send()
            .await
            .map_err(GatewayError::transport)?;

        if !resp.status().is_success() {
            return Err(Self::reject(resp).await);
        }
        Ok(())
    }
}
