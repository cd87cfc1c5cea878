//! # Vision Client
//!
//! Sends a receipt image to the Anthropic Messages API and reads back the
//! model's JSON answer.
//!
//! ## Request Shape
//! ```text
//! POST {api_url}
//!   x-api-key: ...            anthropic-version: 2023-06-01
//!   {
//!     "model": ..., "max_tokens": ..., "system": RECEIPT_PROMPT,
//!     "messages": [{ "role": "user", "content": [
//!         { "type": "image", "source": { "type": "base64", "media_type", "data" } },
//!         { "type": "text",  "text": "Please parse this receipt ..." }
//!     ]}]
//!   }
//! ```
//!
//! One attempt per scan; the timeout comes from [`VisionConfig`].

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tabsplit_core::receipt::{ImageFormat, ParsedReceipt};
use tracing::{debug, error, info};

use crate::config::VisionConfig;
use crate::error::{ScanError, ScanResult};
use crate::extract::extract_json;
use crate::ReceiptScanner;

const ANTHROPIC_VERSION: &str = "2023-06-01";

const USER_INSTRUCTION: &str = "Please parse this receipt and return the structured JSON data.";

const RECEIPT_PROMPT: &str = r#"You are an expert at reading restaurant receipts and extracting structured data.

Analyze the receipt image and return a JSON object with this exact structure:
{
  "restaurant_name": "Name of the restaurant",
  "items": [
    { "name": "Item name", "price": 12.99, "quantity": 1 }
  ],
  "subtotal": 25.50,
  "tax": 2.04,
  "tip": 5.00,
  "total": 32.54,
  "confidence": "high|medium|low"
}

Rules:
- All prices are numbers, never strings
- Use null for any field that is missing or unreadable
- Quantity is 1 unless the receipt says otherwise
- Keep item prices separate from subtotal and total
- Skip non-item text such as "Thank you", "Server:" or "Table:"
- confidence is "high" when everything is legible, "medium" when some fields are unclear or missing, "low" when the receipt is hard to read
- Only food and drink lines belong in items
- Fold modifiers and add-ons into the item name, e.g. "Burger with cheese"

Return ONLY the JSON object."#;

/// [`ReceiptScanner`] backed by the Anthropic Messages API.
#[derive(Debug, Clone)]
pub struct VisionClient {
    client: Client,
    config: VisionConfig,
}

impl VisionClient {
    pub fn new(config: VisionConfig) -> ScanResult<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        info!(model = %config.model, key_configured = config.api_key.is_some(), "Vision client ready");
        Ok(VisionClient { client, config })
    }

    pub fn config(&self) -> &VisionConfig {
        &self.config
    }

    async fn send(&self, api_key: &str, body: &CreateMessageRequest<'_>) -> ScanResult<String> {
        let response = self
            .client
            .post(&self.config.api_url)
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            return Err(map_http_error(status, &body));
        }

        let parsed: CreateMessageResponse = response.json().await?;
        extract_text(parsed)
    }
}

#[async_trait]
impl ReceiptScanner for VisionClient {
    async fn scan(&self, image: &[u8], format: ImageFormat) -> ScanResult<ParsedReceipt> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(ScanError::MissingApiKey)?;

        let request = build_request(&self.config, image, format);
        info!(
            model = %self.config.model,
            size = image.len(),
            media_type = format.media_type(),
            "Sending receipt to vision model"
        );

        let text = self.send(api_key, &request).await.map_err(|e| {
            error!(error = %e, "Vision request failed");
            e
        })?;
        debug!(preview = %text.chars().take(200).collect::<String>(), "Vision response");

        let parsed = extract_json(&text)?;
        info!(
            items = parsed.items.len(),
            total = ?parsed.total,
            confidence = ?parsed.confidence,
            "Receipt scanned"
        );
        Ok(parsed)
    }
}

// =============================================================================
// Wire Types
// =============================================================================

fn build_request<'a>(
    config: &'a VisionConfig,
    image: &[u8],
    format: ImageFormat,
) -> CreateMessageRequest<'a> {
    CreateMessageRequest {
        model: &config.model,
        max_tokens: config.max_tokens,
        system: RECEIPT_PROMPT,
        messages: vec![Message {
            role: "user",
            content: vec![
                ContentBlock::Image {
                    source: ImageSource {
                        r#type: "base64",
                        media_type: format.media_type(),
                        data: BASE64_STANDARD.encode(image),
                    },
                },
                ContentBlock::Text {
                    text: USER_INSTRUCTION,
                },
            ],
        }],
    }
}

#[derive(Serialize)]
struct CreateMessageRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'static str,
    messages: Vec<Message>,
}

#[derive(Serialize)]
struct Message {
    role: &'static str,
    content: Vec<ContentBlock>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum ContentBlock {
    Image { source: ImageSource },
    Text { text: &'static str },
}

#[derive(Serialize)]
struct ImageSource {
    r#type: &'static str,
    media_type: &'static str,
    data: String,
}

#[derive(Deserialize)]
struct CreateMessageResponse {
    #[serde(default)]
    content: Vec<ContentBlockResponse>,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum ContentBlockResponse {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

fn extract_text(response: CreateMessageResponse) -> ScanResult<String> {
    response
        .content
        .into_iter()
        .find_map(|block| match block {
            ContentBlockResponse::Text { text } => Some(text),
            ContentBlockResponse::Other => None,
        })
        .ok_or(ScanError::EmptyResponse)
}

fn map_http_error(status: StatusCode, body: &str) -> ScanError {
    let message = serde_json::from_str::<ErrorResponse>(body)
        .map(|wrapper| wrapper.error.message)
        .unwrap_or_else(|_| body.to_string());

    ScanError::Upstream {
        status: status.as_u16(),
        message,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
