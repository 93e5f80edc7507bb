//! Client facade: destination resolution, envelope assembly and dispatch

use reqwest::Client as HttpClient;
use tracing::{error, info};

use crate::config::PixelRegistry;
use crate::error::Result;
use crate::events::{CapiResponse, EventEnvelope, EventInput};
use crate::transport::{EventTransport, TransportConfig};

/// Per-call dispatch options.
#[derive(Debug, Clone, Default)]
pub struct SendOptions {
    /// Named destination to dispatch to; the registry default when `None`.
    pub destination: Option<String>,
    /// Routes the event into the endpoint's test-events console instead of
    /// production processing.
    pub test_event_code: Option<String>,
}

/// Client for dispatching conversion events.
///
/// Holds the read-only destination registry and the HTTP transport. Cheap to
/// share across tasks; every call allocates its own envelope and issues its
/// own request, so concurrent calls need no coordination.
pub struct CapiClient {
    registry: PixelRegistry,
    transport: EventTransport,
}

impl CapiClient {
    /// Creates a client with a default HTTP client and the production
    /// endpoint.
    ///
    /// # Errors
    ///
    /// Returns `Error::Transport` when the HTTP client cannot be built.
    pub fn new(registry: PixelRegistry) -> Result<Self> {
        let http = HttpClient::builder().build()?;
        Ok(Self::with_transport(registry, http, TransportConfig::default()))
    }

    /// Creates a client over a caller-supplied HTTP client and endpoint
    /// configuration. Timeouts and pooling are the supplied client's policy.
    pub fn with_transport(
        registry: PixelRegistry,
        http: HttpClient,
        config: TransportConfig,
    ) -> Self {
        Self {
            registry,
            transport: EventTransport::new(http, config),
        }
    }

    /// The destination registry this client dispatches through.
    pub fn registry(&self) -> &PixelRegistry {
        &self.registry
    }

    /// Sends one event through the pipeline: resolve the destination, build
    /// the envelope, dispatch, and log the outcome.
    ///
    /// # Errors
    ///
    /// - `Error::ConfigurationNotFound` before any network call when the
    ///   named destination is absent
    /// - `Error::Transport` / `Error::Status` propagated from the outbound
    ///   call, unchanged
    pub async fn send_event(
        &self,
        event_name: &str,
        input: &EventInput,
        options: &SendOptions,
    ) -> Result<CapiResponse> {
        let destination = match self.registry.resolve(options.destination.as_deref()) {
            Ok(destination) => destination,
            Err(err) => {
                error!(event_name, error = %err, "event dispatch failed");
                return Err(err);
            }
        };

        let envelope = EventEnvelope::build(event_name, input);
        match self
            .transport
            .send(destination, &envelope, options.test_event_code.as_deref())
            .await
        {
            Ok(response) => {
                info!(
                    event_name,
                    event_id = %envelope.event_id,
                    events_received = response.events_received,
                    fbtrace_id = %response.fbtrace_id,
                    "event dispatched"
                );
                Ok(response)
            }
            Err(err) => {
                error!(
                    event_name,
                    event_id = %envelope.event_id,
                    error = %err,
                    "event dispatch failed"
                );
                Err(err)
            }
        }
    }

    pub async fn track_page_view(
        &self,
        input: &EventInput,
        options: &SendOptions,
    ) -> Result<CapiResponse> {
        self.send_event("PageView", input, options).await
    }

    pub async fn track_lead(
        &self,
        input: &EventInput,
        options: &SendOptions,
    ) -> Result<CapiResponse> {
        self.send_event("Lead", input, options).await
    }

    pub async fn track_view_content(
        &self,
        input: &EventInput,
        options: &SendOptions,
    ) -> Result<CapiResponse> {
        self.send_event("ViewContent", input, options).await
    }

    pub async fn track_add_to_cart(
        &self,
        input: &EventInput,
        options: &SendOptions,
    ) -> Result<CapiResponse> {
        self.send_event("AddToCart", input, options).await
    }

    pub async fn track_initiate_checkout(
        &self,
        input: &EventInput,
        options: &SendOptions,
    ) -> Result<CapiResponse> {
        self.send_event("InitiateCheckout", input, options).await
    }

    pub async fn track_purchase(
        &self,
        input: &EventInput,
        options: &SendOptions,
    ) -> Result<CapiResponse> {
        self.send_event("Purchase", input, options).await
    }

    pub async fn track_upsell_purchase(
        &self,
        input: &EventInput,
        options: &SendOptions,
    ) -> Result<CapiResponse> {
        self.send_event("UpsellPurchase", input, options).await
    }

    pub async fn track_rebill_success(
        &self,
        input: &EventInput,
        options: &SendOptions,
    ) -> Result<CapiResponse> {
        self.send_event("RebillSuccess", input, options).await
    }

    pub async fn track_subscribe(
        &self,
        input: &EventInput,
        options: &SendOptions,
    ) -> Result<CapiResponse> {
        self.send_event("Subscribe", input, options).await
    }

    pub async fn track_add_payment_info(
        &self,
        input: &EventInput,
        options: &SendOptions,
    ) -> Result<CapiResponse> {
        self.send_event("AddPaymentInfo", input, options).await
    }

    /// Fires a verification event at the endpoint's test-events console.
    ///
    /// The test code is mandatory here: it is what routes the request away
    /// from production processing.
    pub async fn test_event(
        &self,
        input: &EventInput,
        test_event_code: &str,
        destination: Option<&str>,
    ) -> Result<CapiResponse> {
        let options = SendOptions {
            destination: destination.map(str::to_string),
            test_event_code: Some(test_event_code.to_string()),
        };
        self.send_event("PageView", input, &options).await
    }
}
