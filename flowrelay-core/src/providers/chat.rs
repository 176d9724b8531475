//! Flowdock chat transport: POST to the per-flow chat endpoint authenticated by the flow token.

use crate::error::DeliveryError;
use crate::providers::{Payload, Transport};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::sync::Arc;
use url::Url;

#[derive(Serialize)]
struct ChatMessage<'a> {
    content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    external_user_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tags: Option<&'a [String]>,
}

/// Chat transport. The destination is the flow API token. Never log it.
pub struct FlowdockChatTransport {
    api_base: Url,
    client: Arc<Client>,
}

impl FlowdockChatTransport {
    pub fn new(api_base: Url) -> Self {
        Self {
            api_base,
            client: Arc::new(Client::new()),
        }
    }

    fn endpoint(&self, token: &str) -> String {
        format!(
            "{}/v1/messages/chat/{}",
            self.api_base.as_str().trim_end_matches('/'),
            token
        )
    }
}

#[async_trait]
impl Transport for FlowdockChatTransport {
    fn name(&self) -> &str {
        "flowdock-chat"
    }

    async fn deliver(&self, destination: &str, payload: &Payload) -> Result<(), DeliveryError> {
        let body = ChatMessage {
            content: &payload.content,
            external_user_name: payload.identity.as_deref(),
            tags: payload.tags.as_deref(),
        };
        let res = self
            .client
            .post(self.endpoint(destination))
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| DeliveryError::network(e.without_url()))?;

        if res.status() != StatusCode::OK {
            return Err(DeliveryError::Status {
                status: res.status().as_u16(),
            });
        }
        // drain the body so the connection is reusable
        res.bytes()
            .await
            .map_err(|e| DeliveryError::network(e.without_url()))?;
        Ok(())
    }
}
