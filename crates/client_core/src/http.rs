use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Map, Value};
use tracing::debug;
use url::Url;

use crate::operation::{OperationOutcome, RemoteError, RemoteOperationClient};

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct HttpOperationClient {
    http: Client,
    base_url: Url,
    token: Option<String>,
}

impl HttpOperationClient {
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> Result<Self> {
        let mut base_url = base_url.trim().to_string();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        let base_url =
            Url::parse(&base_url).with_context(|| format!("invalid api base url '{base_url}'"))?;
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build http client")?;
        Ok(Self {
            http,
            base_url,
            token,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, operation: &str) -> Result<Url, RemoteError> {
        self.base_url.join(operation).map_err(|err| {
            RemoteError::message(format!("invalid operation name '{operation}': {err}"))
        })
    }
}

#[async_trait]
impl RemoteOperationClient for HttpOperationClient {
    async fn invoke(&self, operation: &str, params: Option<&Value>) -> OperationOutcome {
        let url = self.endpoint(operation)?;
        let body = params
            .cloned()
            .unwrap_or_else(|| Value::Object(Map::new()));

        let mut request = self.http.post(url).json(&body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;
        debug!(operation, status = status.as_u16(), len = bytes.len(), "api response");

        if status.is_success() {
            if bytes.is_empty() {
                return Ok(Value::Null);
            }
            return Ok(serde_json::from_slice(&bytes)?);
        }

        let body = serde_json::from_slice::<Value>(&bytes).unwrap_or(Value::Null);
        Err(RemoteError::structured(
            format!("API error ({status})"),
            json!({ "status": status.as_u16(), "json": body }),
        ))
    }
}

#[cfg(test)]
#[path = "tests/http_tests.rs"]
mod tests;
