//! Event payload structures and envelope assembly

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::hashing::{hash_country, hash_email, hash_name, hash_phone, sha256_hex};

/// Every envelope is attributed to website traffic.
pub const ACTION_SOURCE: &str = "website";

/// Caller-supplied event fields. Everything is optional; fields left `None`
/// are omitted from the wire payload entirely, never sent as null or empty.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EventInput {
    // Identity fields, hashed before transmission
    pub email: Option<String>,
    pub phone: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub zip: Option<String>,

    // Identity fields passed through unhashed
    pub gender: Option<String>,
    pub external_id: Option<String>,
    pub client_ip: Option<String>,
    pub user_agent: Option<String>,

    // Click ids, passed through unhashed
    pub fbc: Option<String>,
    pub fbp: Option<String>,

    // Commerce fields
    pub value: Option<f64>,
    pub currency: Option<String>,
    pub order_id: Option<String>,
    pub content_ids: Option<Vec<String>>,
    pub content_name: Option<String>,
    pub content_type: Option<String>,
    pub contents: Option<Vec<ContentItem>>,
    pub num_items: Option<u32>,

    /// Dedup identifier. Callers mirroring the same action through a browser
    /// pixel must supply the identical id here, or the receiving side records
    /// the action twice.
    pub event_id: Option<String>,
    pub event_source_url: Option<String>,
}

/// A single line item attached to a commerce event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: String,
    pub quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_price: Option<f64>,
}

/// Identity block in wire form. Hashable fields hold lowercase hex SHA-256
/// digests; the rest are verbatim copies.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserData {
    #[serde(rename = "em", skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(rename = "ph", skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(rename = "fn", skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(rename = "ln", skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(rename = "ct", skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(rename = "st", skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(rename = "zp", skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    #[serde(rename = "ge", skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fbc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fbp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_ip_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_user_agent: Option<String>,
}

impl UserData {
    /// Builds the wire block from raw input, hashing every match key.
    pub fn from_input(input: &EventInput) -> Self {
        Self {
            email: input.email.as_deref().map(hash_email),
            phone: input.phone.as_deref().map(hash_phone),
            first_name: input.first_name.as_deref().map(hash_name),
            last_name: input.last_name.as_deref().map(hash_name),
            city: input.city.as_deref().map(hash_name),
            state: input.state.as_deref().map(hash_name),
            country: input.country.as_deref().map(hash_country),
            zip: input.zip.as_deref().map(sha256_hex),
            gender: input.gender.clone(),
            external_id: input.external_id.clone(),
            fbc: input.fbc.clone(),
            fbp: input.fbp.clone(),
            client_ip_address: input.client_ip.clone(),
            client_user_agent: input.user_agent.clone(),
        }
    }
}

/// Commerce block in wire form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_ids: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contents: Option<Vec<ContentItem>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_items: Option<u32>,
}

impl CustomData {
    /// Copies the commerce fields that were supplied, renaming `order_id`
    /// into the wire schema.
    pub fn from_input(input: &EventInput) -> Self {
        Self {
            value: input.value,
            currency: input.currency.clone(),
            order_id: input.order_id.clone(),
            content_ids: input.content_ids.clone(),
            content_name: input.content_name.clone(),
            content_type: input.content_type.clone(),
            contents: input.contents.clone(),
            num_items: input.num_items,
        }
    }
}

/// The complete single-event wire record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub action_source: String,
    pub event_id: String,
    pub event_name: String,
    /// Unix seconds, stamped when the envelope is built.
    pub event_time: i64,
    pub user_data: UserData,
    pub custom_data: CustomData,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_source_url: Option<String>,
}

impl EventEnvelope {
    /// Assembles the wire record for one event. Never fails, including for
    /// the empty input.
    ///
    /// `event_id` is the dedup key the receiving system uses to reconcile
    /// browser-pixel and server-side records of the same action; when the
    /// caller supplies none, a random one is generated and the event will not
    /// be merged with any pixel-side counterpart.
    pub fn build(event_name: &str, input: &EventInput) -> Self {
        Self {
            action_source: ACTION_SOURCE.to_string(),
            event_id: input
                .event_id
                .clone()
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            event_name: event_name.to_string(),
            event_time: Utc::now().timestamp(),
            user_data: UserData::from_input(input),
            custom_data: CustomData::from_input(input),
            event_source_url: input.event_source_url.clone(),
        }
    }
}

/// Endpoint acknowledgment, passed through to the caller unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapiResponse {
    pub events_received: u64,
    #[serde(default)]
    pub messages: Vec<String>,
    pub fbtrace_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_event_id_passes_through() {
        let input = EventInput {
            event_id: Some("custom-event-123".to_string()),
            ..Default::default()
        };

        let envelope = EventEnvelope::build("PageView", &input);
        assert_eq!(envelope.event_id, "custom-event-123");
    }

    #[test]
    fn test_generated_event_ids_are_unique() {
        let input = EventInput::default();

        let first = EventEnvelope::build("PageView", &input);
        let second = EventEnvelope::build("PageView", &input);

        assert!(!first.event_id.is_empty());
        assert_ne!(first.event_id, second.event_id);
    }

    #[test]
    fn test_event_time_stamped_at_build() {
        let before = Utc::now().timestamp();
        let envelope = EventEnvelope::build("Purchase", &EventInput::default());
        let after = Utc::now().timestamp();

        assert!(envelope.event_time >= before);
        assert!(envelope.event_time <= after);
    }

    #[test]
    fn test_action_source_is_website() {
        let envelope = EventEnvelope::build("Lead", &EventInput::default());
        assert_eq!(envelope.action_source, "website");
    }

    #[test]
    fn test_user_data_hashes_match_keys() {
        let input = EventInput {
            email: Some("Test@Example.COM".to_string()),
            phone: Some("+1 (234) 567-8901".to_string()),
            first_name: Some("JOHN".to_string()),
            gender: Some("M".to_string()),
            fbp: Some("fb.1.987654321".to_string()),
            ..Default::default()
        };

        let user_data = UserData::from_input(&input);
        assert_eq!(
            user_data.email.as_deref(),
            Some("973dfe463ec85785f5f95af5ba3906eedb2d931c24e69824a89ea65dba4e813b")
        );
        assert_eq!(
            user_data.phone.as_deref(),
            Some("254aa248acb47dd654ca3ea53f48c2c26d641d23d7e2e93a1ec56258df7674c4")
        );
        assert_eq!(
            user_data.first_name.as_deref(),
            Some("96d9632f363564cc3032521409cf22a852f2032eec099ed5967c0d000cec607a")
        );
        // Pass-through fields stay in cleartext
        assert_eq!(user_data.gender.as_deref(), Some("M"));
        assert_eq!(user_data.fbp.as_deref(), Some("fb.1.987654321"));
    }

    #[test]
    fn test_absent_fields_omitted_from_wire_json() {
        let input = EventInput {
            email: Some("user@test.com".to_string()),
            ..Default::default()
        };

        let envelope = EventEnvelope::build("PageView", &input);
        let json = serde_json::to_value(&envelope).unwrap();

        let user_data = json["user_data"].as_object().unwrap();
        assert!(user_data.contains_key("em"));
        assert!(!user_data.contains_key("ph"));
        assert!(!user_data.contains_key("fn"));
        assert!(!user_data.contains_key("client_ip_address"));

        assert!(json["custom_data"].as_object().unwrap().is_empty());
        assert!(json.get("event_source_url").is_none());
    }

    #[test]
    fn test_wire_field_names() {
        let input = EventInput {
            first_name: Some("jane".to_string()),
            last_name: Some("doe".to_string()),
            zip: Some("10001".to_string()),
            user_agent: Some("Mozilla/5.0".to_string()),
            client_ip: Some("192.168.1.1".to_string()),
            ..Default::default()
        };

        let json = serde_json::to_value(UserData::from_input(&input)).unwrap();
        let object = json.as_object().unwrap();
        assert_eq!(object.len(), 5);
        for key in ["fn", "ln", "zp", "client_ip_address", "client_user_agent"] {
            assert!(object.contains_key(key), "missing wire field {key}");
        }
    }

    #[test]
    fn test_custom_data_mapping() {
        let input = EventInput {
            value: Some(199.99),
            currency: Some("EUR".to_string()),
            order_id: Some("order456".to_string()),
            content_ids: Some(vec!["prod1".to_string()]),
            ..Default::default()
        };

        let json = serde_json::to_value(CustomData::from_input(&input)).unwrap();
        let object = json.as_object().unwrap();
        assert_eq!(object.len(), 4);
        assert_eq!(json["value"], 199.99);
        assert_eq!(json["currency"], "EUR");
        assert_eq!(json["order_id"], "order456");
        assert_eq!(json["content_ids"], serde_json::json!(["prod1"]));
    }

    #[test]
    fn test_contents_serialized_as_line_items() {
        let input = EventInput {
            contents: Some(vec![ContentItem {
                id: "content1".to_string(),
                quantity: 1,
                item_price: None,
            }]),
            num_items: Some(2),
            ..Default::default()
        };

        let json = serde_json::to_value(CustomData::from_input(&input)).unwrap();
        assert_eq!(
            json["contents"],
            serde_json::json!([{"id": "content1", "quantity": 1}])
        );
        assert_eq!(json["num_items"], 2);
    }

    #[test]
    fn test_response_deserializes() {
        let response: CapiResponse = serde_json::from_str(
            r#"{"events_received":1,"messages":["warning"],"fbtrace_id":"trace123"}"#,
        )
        .unwrap();

        assert_eq!(response.events_received, 1);
        assert_eq!(response.messages, vec!["warning"]);
        assert_eq!(response.fbtrace_id, "trace123");
    }
}
