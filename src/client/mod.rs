//! Client for the remote browser-profile service.
//!
//! The orchestrator consumes the service through a single contract:
//! `invoke(endpoint, body)` resolves to a reply carrying a numeric result
//! code (0 means success) or to a transport fault. `ProfileClient` layers
//! typed lifecycle operations and batch variants on top of any
//! implementation of that contract.

pub mod http;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;

use crate::batch::{BatchExecutor, BatchResult, WorkItem};
use crate::config::BridgeConfig;
use crate::error::{ErrorSignal, SUCCESS_CODE};

pub use http::HttpProfileService;

/// A callable endpoint of the profile service.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EndpointDescriptor {
    pub method: &'static str,
    pub path: &'static str,
}

/// Endpoints used by the lifecycle operations.
pub mod endpoints {
    use super::EndpointDescriptor;

    pub const OPEN: EndpointDescriptor = EndpointDescriptor {
        method: "POST",
        path: "/api/v1/profile/open",
    };
    pub const CLOSE: EndpointDescriptor = EndpointDescriptor {
        method: "POST",
        path: "/api/v1/profile/close",
    };
    pub const CREATE: EndpointDescriptor = EndpointDescriptor {
        method: "POST",
        path: "/api/v1/profile/create",
    };
    pub const UPDATE: EndpointDescriptor = EndpointDescriptor {
        method: "POST",
        path: "/api/v1/profile/update",
    };
    pub const DELETE: EndpointDescriptor = EndpointDescriptor {
        method: "POST",
        path: "/api/v1/profile/delete",
    };
    pub const HEALTH: EndpointDescriptor = EndpointDescriptor {
        method: "POST",
        path: "/api/v1/status",
    };
}

/// A response from the service: its result code, message, and payload.
#[derive(Clone, Debug, PartialEq)]
pub struct ServiceReply {
    pub code: i64,
    pub message: String,
    pub data: Value,
}

impl ServiceReply {
    /// Turns a reply into the operation's payload or a classifiable signal.
    pub fn into_result(self) -> Result<Value, ErrorSignal> {
        if self.code == SUCCESS_CODE {
            Ok(self.data)
        } else {
            Err(ErrorSignal::coded(self.code, self.message))
        }
    }
}

/// A call that never produced a response.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct TransportFault {
    pub message: String,
}

impl TransportFault {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<TransportFault> for ErrorSignal {
    fn from(fault: TransportFault) -> Self {
        ErrorSignal::transport(fault.message)
    }
}

/// The collaborator contract the orchestrator depends on. Transport details
/// (HTTP, IPC) live behind it.
#[async_trait]
pub trait ProfileService: Send + Sync {
    /// Performs one call. Every call eventually resolves to a reply with a
    /// numeric code or to a transport fault.
    async fn invoke(
        &self,
        endpoint: &EndpointDescriptor,
        body: Value,
    ) -> Result<ServiceReply, TransportFault>;
}

/// Proxy settings for a profile.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// Proxy protocol: "http", "https", or "socks5".
    pub kind: String,
    pub host: String,
    pub port: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// Parameters for creating a profile.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProfileSpec {
    /// Display name; unique enough to identify the item inside one batch.
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy: Option<ProxyConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remark: Option<String>,
}

impl WorkItem for ProfileSpec {
    fn id(&self) -> &str {
        &self.name
    }
}

/// Fields of an existing profile that can be changed.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy: Option<ProxyConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remark: Option<String>,
}

/// Connection details of a profile whose browser is running.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct OpenedProfile {
    #[serde(rename = "profileId", alias = "profile_id", default)]
    pub profile_id: String,
    /// DevTools websocket endpoint of the launched browser.
    #[serde(rename = "ws", alias = "wsEndpoint", default)]
    pub ws_endpoint: String,
    #[serde(rename = "debugPort", alias = "debug_port", default)]
    pub debug_port: Option<u16>,
}

fn parse_payload<T: serde::de::DeserializeOwned>(data: Value) -> Result<T, ErrorSignal> {
    serde_json::from_value(data)
        .map_err(|e| ErrorSignal::transport(format!("malformed response payload: {}", e)))
}

/// Per-operation window sizes.
///
/// A window is as wide as the remote side can comfortably parallelize the
/// operation: opening spawns browsers but the service queues them well,
/// creation writes shared account state, closing is cheap enough to
/// serialize.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WindowSizes {
    pub open: usize,
    pub create: usize,
    pub close: usize,
}

impl Default for WindowSizes {
    fn default() -> Self {
        Self {
            open: 5,
            create: 3,
            close: 1,
        }
    }
}

/// Typed lifecycle operations over a `ProfileService`, with batch variants
/// driven by the windowed executor.
pub struct ProfileClient<S> {
    service: Arc<S>,
    windows: WindowSizes,
    inter_window_delay: Duration,
    cancel: Option<watch::Receiver<bool>>,
}

impl<S> Clone for ProfileClient<S> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            windows: self.windows,
            inter_window_delay: self.inter_window_delay,
            cancel: self.cancel.clone(),
        }
    }
}

impl<S: ProfileService> ProfileClient<S> {
    /// Wraps a service with the default window sizes and no delay.
    pub fn new(service: S) -> Self {
        Self {
            service: Arc::new(service),
            windows: WindowSizes::default(),
            inter_window_delay: Duration::ZERO,
            cancel: None,
        }
    }

    /// Wraps a service with the tuning knobs from configuration.
    pub fn with_config(service: S, config: &BridgeConfig) -> Self {
        Self {
            service: Arc::new(service),
            windows: config.windows,
            inter_window_delay: config.inter_window_delay,
            cancel: None,
        }
    }

    /// Attach a cancellation signal forwarded to every batch run.
    pub fn with_cancellation(mut self, cancel: watch::Receiver<bool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// The wrapped service. Test doubles use this to inspect what was
    /// invoked.
    pub fn service(&self) -> &S {
        &self.service
    }

    fn executor(&self, window_size: usize) -> BatchExecutor {
        let mut executor =
            BatchExecutor::new(window_size).with_inter_window_delay(self.inter_window_delay);
        if let Some(cancel) = &self.cancel {
            executor = executor.with_cancellation(cancel.clone());
        }
        executor
    }

    async fn call(
        &self,
        endpoint: &EndpointDescriptor,
        body: Value,
    ) -> Result<Value, ErrorSignal> {
        match self.service.invoke(endpoint, body).await {
            Ok(reply) => reply.into_result(),
            Err(fault) => Err(fault.into()),
        }
    }

    /// Launches the browser for one profile.
    pub async fn open_profile(&self, profile_id: &str) -> Result<OpenedProfile, ErrorSignal> {
        let data = self
            .call(&endpoints::OPEN, json!({ "profileId": profile_id }))
            .await?;
        let mut opened: OpenedProfile = parse_payload(data)?;
        if opened.profile_id.is_empty() {
            opened.profile_id = profile_id.to_string();
        }
        Ok(opened)
    }

    /// Stops the browser for one profile.
    pub async fn close_profile(&self, profile_id: &str) -> Result<(), ErrorSignal> {
        self.call(&endpoints::CLOSE, json!({ "profileId": profile_id }))
            .await?;
        Ok(())
    }

    /// Creates a profile and returns its id.
    pub async fn create_profile(&self, spec: &ProfileSpec) -> Result<String, ErrorSignal> {
        let body = serde_json::to_value(spec)
            .map_err(|e| ErrorSignal::transport(format!("unserializable profile spec: {}", e)))?;
        let data = self.call(&endpoints::CREATE, body).await?;

        #[derive(Deserialize)]
        struct Created {
            #[serde(rename = "profileId", alias = "profile_id")]
            profile_id: String,
        }
        let created: Created = parse_payload(data)?;
        Ok(created.profile_id)
    }

    /// Applies an update to an existing profile.
    pub async fn update_profile(
        &self,
        profile_id: &str,
        update: &ProfileUpdate,
    ) -> Result<(), ErrorSignal> {
        let mut body = serde_json::to_value(update)
            .map_err(|e| ErrorSignal::transport(format!("unserializable update: {}", e)))?;
        if let Value::Object(map) = &mut body {
            map.insert("profileId".to_string(), Value::String(profile_id.to_string()));
        }
        self.call(&endpoints::UPDATE, body).await?;
        Ok(())
    }

    /// Deletes one profile.
    pub async fn delete_profile(&self, profile_id: &str) -> Result<(), ErrorSignal> {
        self.call(&endpoints::DELETE, json!({ "profileId": profile_id }))
            .await?;
        Ok(())
    }

    /// Probes the service without touching any profile.
    pub async fn health_check(&self) -> Result<(), ErrorSignal> {
        self.call(&endpoints::HEALTH, json!({})).await?;
        Ok(())
    }

    /// Opens many profiles under the open window.
    pub async fn open_profiles(
        &self,
        profile_ids: Vec<String>,
    ) -> BatchResult<String, OpenedProfile> {
        self.executor(self.windows.open)
            .run(profile_ids, |id| async move { self.open_profile(&id).await })
            .await
    }

    /// Closes many profiles, one at a time.
    pub async fn close_profiles(&self, profile_ids: Vec<String>) -> BatchResult<String, ()> {
        self.executor(self.windows.close)
            .run(profile_ids, |id| async move { self.close_profile(&id).await })
            .await
    }

    /// Creates many profiles under the create window. Each success carries
    /// the new profile id.
    pub async fn create_profiles(
        &self,
        specs: Vec<ProfileSpec>,
    ) -> BatchResult<ProfileSpec, String> {
        self.executor(self.windows.create)
            .run(specs, |spec| async move { self.create_profile(&spec).await })
            .await
    }

    /// Deletes many profiles, one at a time.
    pub async fn delete_profiles(&self, profile_ids: Vec<String>) -> BatchResult<String, ()> {
        self.executor(self.windows.close)
            .run(profile_ids, |id| async move { self.delete_profile(&id).await })
            .await
    }
}
