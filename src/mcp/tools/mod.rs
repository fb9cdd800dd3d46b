//! MCP tool implementations.
//!
//! One module per tool. Each holds the schemars-annotated request type, the
//! response type, and a `handle` function generic over the profile service
//! so handlers are exercised in tests with a scripted double.

pub mod close_profiles;
pub mod create_profiles;
pub mod delete_profiles;
pub mod open_profiles;
pub mod update_profile;

use std::sync::Arc;

use rmcp::model::{JsonObject, ListToolsResult, Tool};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::batch::{BatchFailure, BatchResult, WorkItem};
use crate::client::ProxyConfig;
use crate::error::{troubleshooting_steps, ErrorCategory, Severity};
use crate::report;

pub use close_profiles::{CloseProfilesRequest, CloseProfilesResponse};
pub use create_profiles::{CreateProfilesRequest, CreateProfilesResponse, NewProfile};
pub use delete_profiles::{DeleteProfilesRequest, DeleteProfilesResponse};
pub use open_profiles::{OpenProfilesRequest, OpenProfilesResponse, OpenedProfileInfo};
pub use update_profile::{UpdateProfileRequest, UpdateProfileResponse};

/// One failed item of a batch, with everything an automated caller needs to
/// decide what to do next.
#[derive(Clone, Debug, Serialize)]
pub struct FailureInfo {
    /// Identifier of the failed item.
    pub profile_id: String,
    /// Numeric result code, when the failure came from a response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<i64>,
    /// Raw failure message.
    pub message: String,
    pub category: ErrorCategory,
    pub severity: Severity,
    /// Whether resubmitting this item may succeed.
    pub retryable: bool,
    /// Attempts consumed, including the automatic retries.
    pub attempts: u32,
    /// Human-readable description of the failure class.
    pub explanation: String,
    /// Ordered remediation steps.
    pub troubleshooting: Vec<String>,
}

impl FailureInfo {
    pub fn from_failure<I: WorkItem>(failure: &BatchFailure<I>) -> Self {
        let error = &failure.error;
        Self {
            profile_id: failure.item.id().to_string(),
            code: error.signal.code(),
            message: error.signal.message().to_string(),
            category: error.classification.category,
            severity: error.classification.severity,
            retryable: error.classification.retryable,
            attempts: error.attempts,
            explanation: error.classification.explain(),
            troubleshooting: troubleshooting_steps(&error.classification, &error.signal),
        }
    }

    pub fn from_failures<I: WorkItem, T>(result: &BatchResult<I, T>) -> Vec<Self> {
        result.failures.iter().map(Self::from_failure).collect()
    }
}

/// Markdown analysis of a batch's failures; `None` for a clean batch.
pub fn failure_analysis<I: WorkItem, T>(result: &BatchResult<I, T>) -> Option<String> {
    if result.failures.is_empty() {
        return None;
    }
    Some(report::render_analysis(&crate::batch::analyze(
        &result.failures,
    )))
}

/// Proxy settings as accepted over the tool boundary.
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema)]
pub struct ProxyArg {
    /// Proxy protocol: "http", "https", or "socks5".
    pub kind: String,
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl From<ProxyArg> for ProxyConfig {
    fn from(arg: ProxyArg) -> Self {
        Self {
            kind: arg.kind,
            host: arg.host,
            port: arg.port,
            username: arg.username,
            password: arg.password,
        }
    }
}

/// JSON schema of a request type, in the object form the tool catalog
/// expects.
fn input_schema<T: JsonSchema>() -> Arc<JsonObject> {
    let schema = schemars::schema_for!(T);
    match serde_json::to_value(schema) {
        Ok(Value::Object(map)) => Arc::new(map),
        _ => Arc::new(JsonObject::new()),
    }
}

/// The fixed tool catalog. Names here are the only names `call_tool`
/// dispatches on.
pub fn catalog() -> ListToolsResult {
    ListToolsResult {
        tools: vec![
            Tool::new(
                "open_profiles",
                "Open the browsers for a batch of profiles and return their DevTools endpoints",
                input_schema::<OpenProfilesRequest>(),
            ),
            Tool::new(
                "close_profiles",
                "Close the browsers for a batch of profiles",
                input_schema::<CloseProfilesRequest>(),
            ),
            Tool::new(
                "create_profiles",
                "Create a batch of new browser profiles",
                input_schema::<CreateProfilesRequest>(),
            ),
            Tool::new(
                "update_profile",
                "Update the settings of an existing profile",
                input_schema::<UpdateProfileRequest>(),
            ),
            Tool::new(
                "delete_profiles",
                "Delete a batch of profiles",
                input_schema::<DeleteProfilesRequest>(),
            ),
        ],
        next_cursor: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{classify, ErrorSignal};
    use crate::retry::OperationError;

    fn failure(id: &str, signal: ErrorSignal, attempts: u32) -> BatchFailure<String> {
        BatchFailure {
            item: id.to_string(),
            error: OperationError {
                classification: classify(&signal),
                signal,
                attempts,
            },
        }
    }

    #[test]
    fn test_catalog_lists_all_lifecycle_tools() {
        let catalog = catalog();
        let names: Vec<_> = catalog.tools.iter().map(|t| t.name.as_ref()).collect();
        assert_eq!(
            names,
            vec![
                "open_profiles",
                "close_profiles",
                "create_profiles",
                "update_profile",
                "delete_profiles"
            ]
        );
    }

    #[test]
    fn test_catalog_schemas_are_objects() {
        for tool in catalog().tools {
            assert!(
                !tool.input_schema.is_empty(),
                "tool {} has an empty schema",
                tool.name
            );
        }
    }

    #[test]
    fn test_failure_info_from_failure() {
        let info = FailureInfo::from_failure(&failure(
            "p7",
            ErrorSignal::coded(409, "额度不足"),
            1,
        ));
        assert_eq!(info.profile_id, "p7");
        assert_eq!(info.code, Some(409));
        assert_eq!(info.category, ErrorCategory::Resource);
        assert!(!info.retryable);
        assert!(!info.troubleshooting.is_empty());
    }

    #[test]
    fn test_failure_info_serializes_category_as_kebab_case() {
        let info = FailureInfo::from_failure(&failure(
            "p1",
            ErrorSignal::coded(10001, "browser launch failed"),
            2,
        ));
        let json = serde_json::to_string(&info).unwrap();
        assert!(json.contains("\"browser-lifecycle\""));
        assert!(json.contains("\"attempts\":2"));
    }

    #[test]
    fn test_failure_info_transport_has_no_code() {
        let info = FailureInfo::from_failure(&failure(
            "p1",
            ErrorSignal::transport("connection refused"),
            4,
        ));
        assert_eq!(info.code, None);
        let json = serde_json::to_string(&info).unwrap();
        assert!(!json.contains("\"code\""));
    }

    #[test]
    fn test_proxy_arg_conversion() {
        let arg = ProxyArg {
            kind: "socks5".to_string(),
            host: "10.0.0.1".to_string(),
            port: 1080,
            username: Some("u".to_string()),
            password: None,
        };
        let config: ProxyConfig = arg.into();
        assert_eq!(config.kind, "socks5");
        assert_eq!(config.port, 1080);
        assert_eq!(config.username.as_deref(), Some("u"));
    }
}
