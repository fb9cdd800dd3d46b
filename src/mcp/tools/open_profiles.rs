//! The open_profiles tool.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::client::{ProfileClient, ProfileService};
use crate::report;

use super::{failure_analysis, FailureInfo};

/// Request parameters for open_profiles.
#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct OpenProfilesRequest {
    /// Identifiers of the profiles to open.
    #[schemars(description = "Identifiers of the profiles to open")]
    pub profile_ids: Vec<String>,
}

/// Connection details for one opened profile.
#[derive(Debug, Clone, Serialize)]
pub struct OpenedProfileInfo {
    pub profile_id: String,
    /// DevTools websocket endpoint for automation clients.
    pub ws_endpoint: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug_port: Option<u16>,
}

/// Response from open_profiles. Partial failure is normal: callers must
/// check `failure_count` before assuming every profile opened.
#[derive(Debug, Serialize)]
pub struct OpenProfilesResponse {
    pub total: usize,
    pub success_count: usize,
    pub failure_count: usize,
    pub opened: Vec<OpenedProfileInfo>,
    pub failed: Vec<FailureInfo>,
    pub summary: String,
    /// Markdown failure analysis, present when anything failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<String>,
}

/// Opens every requested profile as one batch.
pub async fn handle<S: ProfileService>(
    client: &ProfileClient<S>,
    request: OpenProfilesRequest,
) -> OpenProfilesResponse {
    let result = client.open_profiles(request.profile_ids).await;

    OpenProfilesResponse {
        total: result.total(),
        success_count: result.success_count(),
        failure_count: result.failure_count(),
        opened: result
            .successes
            .iter()
            .map(|s| OpenedProfileInfo {
                profile_id: s.result.profile_id.clone(),
                ws_endpoint: s.result.ws_endpoint.clone(),
                debug_port: s.result.debug_port,
            })
            .collect(),
        failed: FailureInfo::from_failures(&result),
        summary: report::render_batch_summary("Opened", &result),
        analysis: failure_analysis(&result),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_deserialization() {
        let request: OpenProfilesRequest =
            serde_json::from_str(r#"{"profile_ids": ["a", "b"]}"#).unwrap();
        assert_eq!(request.profile_ids, vec!["a", "b"]);
    }

    #[test]
    fn test_response_omits_absent_analysis() {
        let response = OpenProfilesResponse {
            total: 1,
            success_count: 1,
            failure_count: 0,
            opened: vec![OpenedProfileInfo {
                profile_id: "p1".to_string(),
                ws_endpoint: "ws://127.0.0.1:9222".to_string(),
                debug_port: None,
            }],
            failed: vec![],
            summary: "Opened 1 of 1 profile(s); 0 failed".to_string(),
            analysis: None,
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(!json.contains("analysis"));
        assert!(!json.contains("debug_port"));
        assert!(json.contains("\"ws_endpoint\""));
    }
}
