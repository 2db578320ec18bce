//! Network execution of `NewsClient` requests.
//!
//! `SearchTransport` is the seam between the lifecycle controller and the
//! network. `HttpTransport` is the production implementation; tests supply
//! their own.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::client::NewsClient;
use crate::config::{ClientSettings, SearchMethod};
use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{SearchQuery, SearchResult};

#[async_trait]
pub trait SearchTransport: Send + Sync {
    /// Run one search. Must settle with `TransportError::Cancelled` if
    /// `cancel` fires before a result is available.
    async fn execute(
        &self,
        query: &SearchQuery,
        cancel: &CancellationToken,
    ) -> Result<SearchResult, TransportError>;
}

/// `SearchTransport` over reqwest.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: Client,
    client: NewsClient,
    method: SearchMethod,
}

impl HttpTransport {
    pub fn new(settings: &ClientSettings) -> Result<Self, TransportError> {
        let http = Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .map_err(|e| TransportError::NetworkError(e.to_string()))?;
        Ok(Self::with_client(http, settings))
    }

    pub fn with_client(http: Client, settings: &ClientSettings) -> Self {
        Self {
            http,
            client: NewsClient::new(&settings.api_url),
            method: settings.method,
        }
    }

    pub fn method(&self) -> SearchMethod {
        self.method
    }

    /// Liveness probe. Not part of the search lifecycle.
    pub async fn health(&self) -> Result<serde_json::Value, TransportError> {
        let response = self.round_trip(self.client.build_health()).await?;
        self.client.parse_health(response)
    }

    fn build_search(&self, query: &SearchQuery) -> Result<HttpRequest, TransportError> {
        match self.method {
            SearchMethod::Get => Ok(self.client.build_search_get(query)),
            SearchMethod::Post => self.client.build_search_post(query),
        }
    }

    async fn round_trip(&self, req: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = match req.method {
            HttpMethod::Get => self.http.get(&req.path),
            HttpMethod::Post => self.http.post(&req.path),
        };
        for (name, value) in &req.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = req.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(network_error)?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response.text().await.map_err(network_error)?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[async_trait]
impl SearchTransport for HttpTransport {
    async fn execute(
        &self,
        query: &SearchQuery,
        cancel: &CancellationToken,
    ) -> Result<SearchResult, TransportError> {
        if cancel.is_cancelled() {
            return Err(TransportError::Cancelled);
        }
        let req = self.build_search(query)?;
        debug!(method = req.method.as_str(), url = %req.path, "issuing search request");

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(keyword = %query.keyword, page = query.page, "search request aborted");
                return Err(TransportError::Cancelled);
            }
            response = self.round_trip(req) => response?,
        };

        self.client.parse_search(response).inspect_err(|error| {
            debug!(keyword = %query.keyword, %error, "search response rejected");
        })
    }
}

fn network_error(error: reqwest::Error) -> TransportError {
    let detail = if error.is_timeout() {
        format!("request timed out: {error}")
    } else {
        error.to_string()
    };
    debug!(%detail, "search transport network failure");
    TransportError::NetworkError(detail)
}

/// Build a transport that never waits longer than `timeout`, pointed at
/// `api_url`. Convenience for hosts that do not load `ClientSettings`.
pub fn http_transport(api_url: &str, timeout: Duration) -> Result<HttpTransport, TransportError> {
    HttpTransport::new(&ClientSettings {
        api_url: api_url.to_string(),
        request_timeout: timeout,
        ..ClientSettings::default()
    })
}
