//! HTTP implementation of the profile service contract.
//!
//! The local profile manager exposes a JSON-over-HTTP API whose responses
//! share one envelope: `{"code": ..., "msg": ..., "data": ...}`. Some error
//! paths answer with a bare HTTP status and a non-JSON body; those are
//! folded into the same shape by reusing the status code as the result code,
//! which keeps the classifier's single code vocabulary.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::config::BridgeConfig;
use crate::error::ErrorSignal;

use super::{EndpointDescriptor, ProfileService, ServiceReply, TransportFault};

/// Maximum bytes of a non-JSON body kept as the reply message.
const RAW_BODY_LIMIT: usize = 200;

#[derive(Deserialize)]
struct RawEnvelope {
    code: i64,
    #[serde(default, alias = "message")]
    msg: String,
    #[serde(default)]
    data: Value,
}

/// `reqwest`-backed client for the profile manager's HTTP API.
pub struct HttpProfileService {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpProfileService {
    /// Builds a client from configuration. The per-request timeout comes
    /// from the config; a timeout surfaces as a transport fault whose
    /// message the classifier recognizes.
    pub fn new(config: &BridgeConfig) -> Result<Self, ErrorSignal> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ErrorSignal::transport(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            http,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    fn url_for(&self, endpoint: &EndpointDescriptor) -> String {
        format!("{}{}", self.base_url, endpoint.path)
    }
}

/// Renders an error with its full source chain. The top-level `reqwest`
/// message often hides the part the fault patterns key on ("connection
/// refused", "timed out"), which lives further down the chain.
fn error_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// Folds an HTTP response body into the service envelope. A body that is
/// not a JSON envelope keeps the HTTP status as the code and a truncated
/// body as the message.
fn parse_reply(status: u16, body: &str) -> ServiceReply {
    match serde_json::from_str::<RawEnvelope>(body) {
        Ok(envelope) => ServiceReply {
            code: envelope.code,
            message: envelope.msg,
            data: envelope.data,
        },
        Err(_) => {
            let mut message = body.trim().to_string();
            if message.len() > RAW_BODY_LIMIT {
                message.truncate(RAW_BODY_LIMIT);
            }
            if message.is_empty() {
                message = format!("HTTP {}", status);
            }
            ServiceReply {
                code: status as i64,
                message,
                data: Value::Null,
            }
        }
    }
}

#[async_trait]
impl ProfileService for HttpProfileService {
    async fn invoke(
        &self,
        endpoint: &EndpointDescriptor,
        body: Value,
    ) -> Result<ServiceReply, TransportFault> {
        let url = self.url_for(endpoint);
        tracing::debug!(method = endpoint.method, %url, "calling profile service");

        let response = self
            .http
            .request(
                endpoint.method.parse().unwrap_or(reqwest::Method::POST),
                &url,
            )
            .header("X-API-KEY", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| TransportFault::new(error_chain(&e)))?;

        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| {
            TransportFault::new(format!("failed reading response body: {}", error_chain(&e)))
        })?;

        Ok(parse_reply(status, &text))
    }
}
