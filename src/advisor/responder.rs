//! External responder: the webhook that can answer a visitor turn.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use super::model::CollectedFields;
use crate::error::ResponderError;

/// Largest webhook body accepted. Anything bigger is an invalid response.
pub const MAX_RESPONSE_BYTES: usize = 64 * 1024;

/// Body posted to the responder for every visitor turn.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponderRequest {
    pub message: String,
    pub product_id: String,
    pub step: usize,
    pub customer_info: CollectedFields,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// Something that may produce an advisor reply for a visitor turn.
///
/// `Ok(None)` means the call went through but carried no usable reply.
#[async_trait]
pub trait Responder: Send + Sync {
    async fn respond(&self, request: &ResponderRequest) -> Result<Option<String>, ResponderError>;
}

/// Pull the reply text out of a webhook payload.
///
/// - array: the first element's `response` string, else the element itself
///   when it is a string
/// - object: its `response` string
///
/// Anything else, including blank text, is no reply.
pub fn extract_reply(payload: &Value) -> Option<String> {
    let candidate = match payload {
        Value::Array(items) => {
            let first = items.first()?;
            match first.get("response") {
                Some(response) => response.as_str(),
                None => first.as_str(),
            }
        }
        Value::Object(map) => map.get("response").and_then(Value::as_str),
        _ => None,
    }?;

    if candidate.trim().is_empty() {
        None
    } else {
        Some(candidate.to_string())
    }
}

/// Responder backed by an HTTP webhook.
pub struct WebhookResponder {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl WebhookResponder {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, ResponderError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ResponderError::RequestFailed(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            url: url.into(),
            timeout,
        })
    }

    fn transport_error(&self, e: reqwest::Error) -> ResponderError {
        if e.is_timeout() {
            ResponderError::Timeout(self.timeout)
        } else {
            ResponderError::RequestFailed(e.to_string())
        }
    }

    /// Read the body, giving up as soon as it exceeds `MAX_RESPONSE_BYTES`.
    async fn read_body(&self, mut resp: reqwest::Response) -> Result<Vec<u8>, ResponderError> {
        if resp
            .content_length()
            .is_some_and(|len| len > MAX_RESPONSE_BYTES as u64)
        {
            return Err(body_too_large());
        }

        let mut body = Vec::new();
        while let Some(chunk) = resp.chunk().await.map_err(|e| self.transport_error(e))? {
            if body.len() + chunk.len() > MAX_RESPONSE_BYTES {
                return Err(body_too_large());
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body)
    }
}

fn body_too_large() -> ResponderError {
    ResponderError::InvalidResponse(format!(
        "response body exceeds {MAX_RESPONSE_BYTES} bytes"
    ))
}

#[async_trait]
impl Responder for WebhookResponder {
    async fn respond(&self, request: &ResponderRequest) -> Result<Option<String>, ResponderError> {
        let resp = self
            .client
            .post(&self.url)
            .json(request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ResponderError::BadStatus {
                status: status.as_u16(),
            });
        }

        let body = self.read_body(resp).await?;
        let payload: Value = serde_json::from_slice(&body)
            .map_err(|e| ResponderError::InvalidResponse(e.to_string()))?;

        let reply = extract_reply(&payload);
        tracing::debug!(
            product_id = %request.product_id,
            step = request.step,
            has_reply = reply.is_some(),
            "Webhook responded"
        );
        Ok(reply)
    }
}

/// Responder used when no webhook is configured: always answers with
/// nothing, so the conversation runs on the scripted prompts alone.
pub struct SilentResponder;

#[async_trait]
impl Responder for SilentResponder {
    async fn respond(&self, _request: &ResponderRequest) -> Result<Option<String>, ResponderError> {
        Ok(None)
    }
}
