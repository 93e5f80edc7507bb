//! Outbound dispatch to the Conversions API endpoint
//!
//! One POST per event: the envelope is JSON-encoded into the `data` field of
//! a URL-encoded form (the wire schema always carries a batch, even of size
//! one) and authenticated with the destination's access token as a query
//! parameter. The token never appears in the request body or headers.

use reqwest::Client;
use tracing::debug;

use crate::config::Destination;
use crate::error::{Error, Result};
use crate::events::{CapiResponse, EventEnvelope};

/// Default Graph API host events are dispatched to.
pub const DEFAULT_API_BASE: &str = "https://graph.facebook.com";

/// Graph API version segment.
pub const DEFAULT_API_VERSION: &str = "v23.0";

/// Endpoint configuration for the transport.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Base URL of the ingestion endpoint.
    pub api_base: String,
    /// API version path segment.
    pub api_version: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
        }
    }
}

/// HTTP transport for single-event dispatch.
///
/// Wraps a caller-supplied `reqwest::Client`; connection pooling and timeout
/// policy belong to that client, not to the pipeline.
#[derive(Debug, Clone)]
pub struct EventTransport {
    http: Client,
    config: TransportConfig,
}

impl EventTransport {
    /// Creates a transport over an injected HTTP client.
    pub fn new(http: Client, config: TransportConfig) -> Self {
        Self { http, config }
    }

    fn events_url(&self, destination: &Destination) -> String {
        format!(
            "{}/{}/{}/events",
            self.config.api_base, self.config.api_version, destination.pixel_id
        )
    }

    /// POSTs one envelope to a destination and parses the acknowledgment.
    ///
    /// # Errors
    ///
    /// - `Error::Transport` for connectivity failures, timeouts and
    ///   response-body decode failures
    /// - `Error::Status` when the endpoint answers non-2xx
    pub async fn send(
        &self,
        destination: &Destination,
        envelope: &EventEnvelope,
        test_event_code: Option<&str>,
    ) -> Result<CapiResponse> {
        let data = serde_json::to_string(&[envelope])?;

        let mut form: Vec<(&str, String)> = vec![("data", data)];
        if let Some(code) = test_event_code {
            form.push(("test_event_code", code.to_string()));
        }

        debug!(
            pixel_id = %destination.pixel_id,
            event_name = %envelope.event_name,
            test = test_event_code.is_some(),
            "dispatching event"
        );

        let response = self
            .http
            .post(self.events_url(destination))
            .query(&[("access_token", destination.access_token.as_str())])
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<CapiResponse>().await?)
    }
}
