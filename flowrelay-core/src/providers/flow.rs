//! Flowdock flow transport: authenticated POST of a message event to each configured flow.

use crate::error::DeliveryError;
use crate::providers::{Payload, Transport};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::sync::Arc;
use url::Url;

#[derive(Serialize)]
struct FlowMessage<'a> {
    flow: &'a str,
    event: &'static str,
    content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    external_user_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tags: Option<&'a [String]>,
}

/// Flow transport. The destination is a flow id; credentials are sent as basic auth.
pub struct FlowdockFlowTransport {
    api_base: Url,
    username: String,
    password: Option<String>,
    client: Arc<Client>,
}

impl FlowdockFlowTransport {
    pub fn new(api_base: Url, username: String, password: Option<String>) -> Self {
        Self {
            api_base,
            username,
            password,
            client: Arc::new(Client::new()),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/messages", self.api_base.as_str().trim_end_matches('/'))
    }
}

#[async_trait]
impl Transport for FlowdockFlowTransport {
    fn name(&self) -> &str {
        "flowdock-flow"
    }

    async fn deliver(&self, destination: &str, payload: &Payload) -> Result<(), DeliveryError> {
        let body = FlowMessage {
            flow: destination,
            event: "message",
            content: &payload.content,
            external_user_name: payload.identity.as_deref(),
            tags: payload.tags.as_deref(),
        };
        let res = self
            .client
            .post(self.endpoint())
            .basic_auth(&self.username, self.password.as_deref())
            .json(&body)
            .send()
            .await
            .map_err(|e| DeliveryError::network(e.without_url()))?;

        let status = res.status();
        if !status.is_success() {
            return Err(DeliveryError::Status {
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}
