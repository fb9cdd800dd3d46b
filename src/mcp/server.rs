//! MCP server for the profile bridge.
//!
//! Exposes the lifecycle tools over the Model Context Protocol. Tool routing
//! is a closed match on the catalog names; an unknown name is a parameter
//! error, not a fallthrough.

use rmcp::model::{
    CallToolRequestParam, CallToolResult, Content, Implementation, ListToolsResult,
    PaginatedRequestParam, ServerCapabilities, ServerInfo,
};
use rmcp::service::{RequestContext, RoleServer};
use rmcp::{ErrorData, ServerHandler};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::watch;

use crate::client::{ProfileClient, ProfileService};
use crate::mcp::tools;

/// The MCP server. Cheap to clone; every clone shares the client and the
/// cancellation channel.
pub struct BridgeMcpServer<S> {
    client: Arc<ProfileClient<S>>,
    cancel_sender: Arc<watch::Sender<bool>>,
    cancel_receiver: watch::Receiver<bool>,
}

impl<S> Clone for BridgeMcpServer<S> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            cancel_sender: self.cancel_sender.clone(),
            cancel_receiver: self.cancel_receiver.clone(),
        }
    }
}

impl<S: ProfileService> BridgeMcpServer<S> {
    /// Wraps a profile client. Batches started by the tools honor the
    /// server's cancellation signal at window boundaries.
    pub fn new(client: ProfileClient<S>) -> Self {
        let (cancel_sender, cancel_receiver) = watch::channel(false);
        let client = client.with_cancellation(cancel_receiver.clone());
        Self {
            client: Arc::new(client),
            cancel_sender: Arc::new(cancel_sender),
            cancel_receiver,
        }
    }

    /// Signal running batches to stop dispatching new windows. Items
    /// already in flight finish so their outcomes stay accounted for.
    pub fn cancel(&self) {
        let _ = self.cancel_sender.send(true);
    }

    /// Clear the cancellation signal before new work.
    pub fn reset_cancel(&self) {
        let _ = self.cancel_sender.send(false);
    }

    /// True if `cancel` was called since the last reset.
    pub fn is_cancelled(&self) -> bool {
        *self.cancel_receiver.borrow()
    }

    /// The shared profile client.
    pub fn client(&self) -> &ProfileClient<S> {
        &self.client
    }
}

fn parse_request<T: DeserializeOwned>(
    arguments: Option<rmcp::model::JsonObject>,
) -> Result<T, ErrorData> {
    let value = Value::Object(arguments.unwrap_or_default());
    serde_json::from_value(value)
        .map_err(|e| ErrorData::invalid_params(format!("invalid arguments: {}", e), None))
}

fn to_result<T: Serialize>(response: &T) -> Result<CallToolResult, ErrorData> {
    let text = serde_json::to_string_pretty(response)
        .map_err(|e| ErrorData::internal_error(format!("unserializable response: {}", e), None))?;
    Ok(CallToolResult::success(vec![Content::text(text)]))
}

impl<S: ProfileService + 'static> ServerHandler for BridgeMcpServer<S> {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: Default::default(),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "profilebridge".to_string(),
                title: Some("Browser Profile Bridge".to_string()),
                version: env!("CARGO_PKG_VERSION").to_string(),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Bridge for managing browser profiles on a local profile service: open, close, \
                 create, update, and delete profiles in batches. Batch tools report partial \
                 failure explicitly; check failure_count before assuming success."
                    .to_string(),
            ),
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, ErrorData> {
        Ok(tools::catalog())
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        match request.name.as_ref() {
            "open_profiles" => {
                let req = parse_request(request.arguments)?;
                to_result(&tools::open_profiles::handle(&self.client, req).await)
            }
            "close_profiles" => {
                let req = parse_request(request.arguments)?;
                to_result(&tools::close_profiles::handle(&self.client, req).await)
            }
            "create_profiles" => {
                let req = parse_request(request.arguments)?;
                to_result(&tools::create_profiles::handle(&self.client, req).await)
            }
            "update_profile" => {
                let req = parse_request(request.arguments)?;
                to_result(&tools::update_profile::handle(&self.client, req).await)
            }
            "delete_profiles" => {
                let req = parse_request(request.arguments)?;
                to_result(&tools::delete_profiles::handle(&self.client, req).await)
            }
            other => Err(ErrorData::invalid_params(
                format!("unknown tool: {}", other),
                None,
            )),
        }
    }
}
