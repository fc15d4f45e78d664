//! Thin client for the deployment's object-storage gateway.
//!
//! The gateway speaks a plain get/put object protocol: `GET`/`PUT` on
//! `{endpoint}/{bucket}/{key}`, optionally authenticated with a static
//! bearer token. Uploaded objects are served publicly from
//! `{public_base}/{key}`.

use anyhow::{Context, Result};
use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use tracing::debug;

use shared::types::server_config::StorageConfig;

#[derive(Debug, Clone)]
pub struct ObjectStore {
    client: Client,
    /// Gateway base URL, no trailing slash.
    endpoint: String,
    bucket: String,
    /// Public base URL for uploaded objects, no trailing slash. Uploads
    /// require it; the proxy works without it.
    public_base: Option<String>,
    access_token: Option<String>,
}

impl ObjectStore {
    /// Resolve a client from config + env. `None` when the endpoint or
    /// bucket is missing — the file surfaces answer 503 in that state.
    pub fn from_config(config: &StorageConfig) -> Option<Self> {
        let endpoint = config.resolved_endpoint()?;
        let bucket = config.resolved_bucket()?;

        Some(Self {
            client: Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            bucket,
            public_base: config
                .resolved_public_base()
                .map(|b| b.trim_end_matches('/').to_string()),
            access_token: config.resolved_access_token(),
        })
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/{}/{}", self.endpoint, self.bucket, key)
    }

    /// Whether uploads can hand back a public URL.
    pub fn has_public_base(&self) -> bool {
        self.public_base.is_some()
    }

    /// Public URL an uploaded object is served from, when a public base
    /// is configured.
    pub fn public_url(&self, key: &str) -> Option<String> {
        self.public_base
            .as_ref()
            .map(|base| format!("{}/{}", base, key))
    }

    /// Recover an object key from a public URL, e.g.
    /// `https://files.example.com/td-tickets/123-a.pdf` → `123-a.pdf`.
    pub fn key_from_url(&self, url: &str) -> Option<String> {
        let marker = format!("/{}/", self.bucket);
        let index = url.find(&marker)?;
        let key = url[index + marker.len()..]
            .split('?')
            .next()
            .unwrap_or("");

        (!key.is_empty()).then(|| key.to_string())
    }

    /// Fetch an object's bytes and content type. `Ok(None)` when the
    /// gateway reports the key absent.
    pub async fn get_object(&self, key: &str) -> Result<Option<(Bytes, String)>> {
        let url = self.object_url(key);
        debug!("Object GET: {}", url);

        let mut request = self.client.get(&url);
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("Object store GET failed: {}", key))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let response = response
            .error_for_status()
            .with_context(|| format!("Object store GET rejected: {}", key))?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();

        let bytes = response
            .bytes()
            .await
            .with_context(|| format!("Object store body read failed: {}", key))?;

        Ok(Some((bytes, content_type)))
    }

    /// Store an object under `key` with the given content type.
    pub async fn put_object(&self, key: &str, bytes: Bytes, content_type: &str) -> Result<()> {
        let url = self.object_url(key);
        debug!("Object PUT: {} ({} bytes)", url, bytes.len());

        let mut request = self
            .client
            .put(&url)
            .header(CONTENT_TYPE, content_type)
            .body(bytes);
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }

        request
            .send()
            .await
            .with_context(|| format!("Object store PUT failed: {}", key))?
            .error_for_status()
            .with_context(|| format!("Object store PUT rejected: {}", key))?;

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
