//! REST gateway speaking the hosted backend's PostgREST dialect.
//!
//! Filters and ordering travel as query parameters (`id=eq.7`,
//! `order=created_at.desc`), single-row reads use the object Accept header,
//! and inserts ask for the created representation back. Error payloads carry
//! the service's `{message, code, details, hint}` shape.

use async_trait::async_trait;
use reqwest::{Client, Method, Response, StatusCode, header};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::application::gateway::{GatewayError, PostsGateway};
use crate::domain::entities::{NewPost, PostPatch, PostRecord};

const OBJECT_ACCEPT: &str = "application/vnd.pgrst.object+json";

pub fn user_agent() -> &'static str {
    concat!("wayfare/", env!("CARGO_PKG_VERSION"))
}

#[derive(Clone, Debug)]
pub struct RestBackend {
    client: Client,
    base: Url,
    api_key: String,
    bearer: Option<String>,
    table: String,
}

/// Error object returned by the backend on rejected requests.
#[derive(Debug, Deserialize)]
struct BackendErrorBody {
    message: Option<String>,
    code: Option<String>,
    details: Option<String>,
    hint: Option<String>,
}

impl RestBackend {
    pub fn new(base: &str, api_key: String, table: String) -> Result<Self, GatewayError> {
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
            bearer: None,
            table,
        })
    }

    /// Authenticate subsequent calls with a signed-in access token instead
    /// of the anonymous key.
    pub fn with_bearer(mut self, token: Option<String>) -> Self {
        self.bearer = token;
        self
    }

    fn table_url(&self, query: &[(&str, String)]) -> Result<Url, GatewayError> {
        let mut url = self
            .base
            .join(&format!("rest/v1/{}", self.table))
            .map_err(GatewayError::transport)?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> reqwest::RequestBuilder {
        let bearer = self.bearer.as_deref().unwrap_or(&self.api_key);
        self.client
            .request(method, url)
            .header("apikey", &self.api_key)
            .header(header::AUTHORIZATION, format!("Bearer {bearer}"))
    }

    async fn read_body<T: DeserializeOwned>(resp: Response) -> Result<T, GatewayError> {
        let status = resp.status();
        let bytes = resp.bytes().await.map_err(GatewayError::transport)?;
        if !status.is_success() {
            return Err(Self::backend_error(status, &bytes));
        }
        serde_json::from_slice(&bytes).map_err(GatewayError::decode)
    }

    async fn expect_success(resp: Response) -> Result<(), GatewayError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        let bytes = resp.bytes().await.map_err(GatewayError::transport)?;
        Err(Self::backend_error(status, &bytes))
    }

    fn backend_error(status: StatusCode, bytes: &[u8]) -> GatewayError {
        match serde_json::from_slice::<BackendErrorBody>(bytes) {
            Ok(body) => GatewayError::Backend {
                message: body
                    .message
                    .unwrap_or_else(|| format!("request failed with status {status}")),
                code: body.code,
                details: body.details,
                hint: body.hint,
            },
            Err(_) => GatewayError::Backend {
                message: format!(
                    "request failed with status {status}: {}",
                    String::from_utf8_lossy(bytes)
                ),
                code: None,
                details: None,
                hint: None,
            },
        }
    }
}

#[async_trait]
impl PostsGateway for RestBackend {
    async fn list_posts(&self) -> Result<Vec<PostRecord>, GatewayError> {
        let url = self.table_url(&[
            ("select", "*".to_string()),
            ("order", "created_at.desc".to_string()),
        ])?;
        let resp = self
            .request(Method::GET, url)
            .send()
            .await
            .map_err(GatewayError::transport)?;
        Self::read_body(resp).await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<PostRecord>, GatewayError> {
        let url = self.table_url(&[
            ("select", "*".to_string()),
            ("id", format!("eq.{id}")),
        ])?;
        let resp = self
            .request(Method::GET, url)
            .header(header::ACCEPT, OBJECT_ACCEPT)
            .send()
            .await
            .map_err(GatewayError::transport)?;

        // Single-object reads answer 406 when the row count is not one.
        if resp.status() == StatusCode::NOT_ACCEPTABLE {
            return Ok(None);
        }
        Self::read_body(resp).await.map(Some)
    }

    async fn find_by_title_and_username(
        &self,
        title: &str,
        username: &str,
    ) -> Result<Vec<PostRecord>, GatewayError> {
        let url = self.table_url(&[
            ("select", "*".to_string()),
            ("title", format!("eq.{title}")),
            ("username", format!("eq.{username}")),
        ])?;
        let resp = self
            .request(Method::GET, url)
            .send()
            .await
            .map_err(GatewayError::transport)?;
        Self::read_body(resp).await
    }

    async fn insert_post(&self, post: &NewPost) -> Result<PostRecord, GatewayError> {
        let url = self.table_url(&[])?;
        let resp = self
            .request(Method::POST, url)
            .header("Prefer", "return=representation")
            .json(&[post])
            .send()
            .await
            .map_err(GatewayError::transport)?;
        let mut rows: Vec<PostRecord> = Self::read_body(resp).await?;
        if rows.is_empty() {
            return Err(GatewayError::decode("insert returned no representation"));
        }
        Ok(rows.remove(0))
    }

    async fn update_post(&self, id: i64, patch: &PostPatch) -> Result<(), GatewayError> {
        let url = self.table_url(&[("id", format!("eq.{id}"))])?;
        let resp = self
            .request(Method::PATCH, url)
            .json(patch)
            .send()
            .await
            .map_err(GatewayError::transport)?;
        Self::expect_success(resp).await
    }

    async fn delete_post(&self, id: i64) -> Result<(), GatewayError> {
        let url = self.table_url(&[("id", format!("eq.{id}"))])?;
        let resp = self
            .request(Method::DELETE, url)
            .send()
            .await
            .map_err(GatewayError::transport)?;
        Self::expect_success(resp).await
    }
}
