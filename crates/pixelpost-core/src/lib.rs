//! # pixelpost-core
//!
//! Server-side event pipeline for the Meta Conversions API: normalizes raw
//! interaction events, hashes the identity match keys, and dispatches one
//! event per request to a configured destination pixel.
//!
//! ## What leaves the process
//!
//! - Match keys (email, phone, names, city, state, country, zip) only as
//!   lowercase hex SHA-256 digests, normalized the way the receiving side
//!   expects ([`hashing`])
//! - Click ids (`fbc`/`fbp`), external id, client IP and user agent pass
//!   through unhashed, per the endpoint's matching contract
//! - The access token travels only as a URL query parameter, never in the
//!   request body, headers or logs
//!
//! ## Deduplication
//!
//! Each envelope carries an `event_id`. Integrations that report the same
//! action from both a browser pixel and this pipeline must supply the same
//! id on both sides so the receiving system merges the records; when no id
//! is given a random one is generated and no merging happens.
//!
//! ## Quickstart
//!
//! ```no_run
//! use pixelpost_core::{CapiClient, Destination, EventInput, PixelRegistry, SendOptions};
//!
//! # async fn run() -> pixelpost_core::Result<()> {
//! let registry = PixelRegistry::new("main", Destination::new("123456789", "token"));
//! let client = CapiClient::new(registry)?;
//!
//! let input = EventInput {
//!     email: Some("jane@example.com".into()),
//!     value: Some(99.99),
//!     currency: Some("USD".into()),
//!     ..Default::default()
//! };
//! let response = client.track_purchase(&input, &SendOptions::default()).await?;
//! println!("events received: {}", response.events_received);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod hashing;
pub mod transport;

pub use client::{CapiClient, SendOptions};
pub use config::{load_registry, Destination, PixelRegistry};
pub use error::{Error, Result};
pub use events::{CapiResponse, ContentItem, CustomData, EventEnvelope, EventInput, UserData};
pub use transport::{EventTransport, TransportConfig};
