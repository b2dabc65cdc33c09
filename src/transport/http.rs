//! HTTP Transport Module
//!
//! [`Transport`] implementation over a reqwest client.

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde_json::Value;
use tracing::debug;

use crate::error::TransportError;
use crate::transport::Transport;

// == HTTP Transport ==
/// JSON-over-HTTP transport.
///
/// Relative URLs are resolved against the optional base URL.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: Client,
    base_url: Option<String>,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses a preconfigured client (timeouts, headers, proxies).
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            base_url: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    fn resolve(&self, url: &str) -> String {
        match &self.base_url {
            Some(base) if !url.contains("://") => format!(
                "{}/{}",
                base.trim_end_matches('/'),
                url.trim_start_matches('/')
            ),
            _ => url.to_string(),
        }
    }
}

async fn into_json(url: String, response: Response) -> Result<Value, TransportError> {
    let status = response.status();
    if !status.is_success() {
        return Err(TransportError::Status {
            url,
            status: status.as_u16(),
        });
    }
    Ok(response.json::<Value>().await?)
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str, params: Option<&Value>) -> Result<Value, TransportError> {
        let full = self.resolve(url);
        debug!("GET {}", full);

        let mut request = self.client.get(&full);
        if let Some(params) = params {
            request = request.query(params);
        }
        let response = request.send().await?;
        into_json(full, response).await
    }

    async fn post(&self, url: &str, params: Option<&Value>) -> Result<Value, TransportError> {
        let full = self.resolve(url);
        debug!("POST {}", full);

        let mut request = self.client.post(&full);
        if let Some(params) = params {
            request = request.json(params);
        }
        let response = request.send().await?;
        into_json(full, response).await
    }
}
