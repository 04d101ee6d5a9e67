//! API gateway: attaches the stored token, classifies failures

use reqwest::{Client, Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::error::ApiResponse;

use crate::storage::{LocalStorage, keys};
use crate::stores::auth::Session;
use crate::{ClientConfig, ClientError, ClientResult};

/// Thin request wrapper shared by every store
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    storage: LocalStorage,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            storage: LocalStorage::new(&config.storage_dir),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn storage(&self) -> &LocalStorage {
        &self.storage
    }

    /// Token of the stored session, read on every call
    pub fn token(&self) -> Option<String> {
        self.storage.get::<Session>(keys::AUTH).map(|s| s.token)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn send<B, Q>(
        &self,
        method: Method,
        path: &str,
        query: Option<&Q>,
        body: Option<&B>,
    ) -> ClientResult<reqwest::Response>
    where
        B: Serialize + ?Sized,
        Q: Serialize + ?Sized,
    {
        let mut req = self.client.request(method.clone(), self.url(path));
        let token = self.token();
        if let Some(token) = &token {
            req = req.bearer_auth(token);
        }
        if let Some(query) = query {
            req = req.query(query);
        }
        if let Some(body) = body {
            req = req.json(body);
        }

        let response = req.send().await.inspect_err(|e| {
            tracing::debug!(method = %method, path = path, error = %e, "Request failed");
        })?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await?;
        let parsed = serde_json::from_str::<ApiResponse<()>>(&text).ok();

        if status == StatusCode::UNAUTHORIZED && token.is_some() {
            // Session is dead: drop it so the next screen is the login page
            tracing::info!(path = path, "Session rejected, clearing stored token");
            self.storage.remove(keys::AUTH)?;
            return Err(ClientError::Unauthorized);
        }

        Err(match parsed {
            Some(body) => ClientError::Api {
                status: status.as_u16(),
                code: body.error_code(),
                message: body.message,
            },
            None => ClientError::Api {
                status: status.as_u16(),
                code: None,
                message: text,
            },
        })
    }

    async fn json<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let response = self.send::<(), ()>(Method::GET, path, None, None).await?;
        Self::json(response).await
    }

    pub async fn get_with_query<T, Q>(&self, path: &str, query: &Q) -> ClientResult<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let response = self.send::<(), Q>(Method::GET, path, Some(query), None).await?;
        Self::json(response).await
    }

    pub async fn post<T, B>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let response = self.send::<B, ()>(Method::POST, path, None, Some(body)).await?;
        Self::json(response).await
    }

    pub async fn patch<T, B>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let response = self.send::<B, ()>(Method::PATCH, path, None, Some(body)).await?;
        Self::json(response).await
    }

    pub async fn put<T, B>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let response = self.send::<B, ()>(Method::PUT, path, None, Some(body)).await?;
        Self::json(response).await
    }

    /// DELETE; the server answers 204
    pub async fn delete(&self, path: &str) -> ClientResult<()> {
        self.send::<(), ()>(Method::DELETE, path, None, None).await?;
        Ok(())
    }
}
