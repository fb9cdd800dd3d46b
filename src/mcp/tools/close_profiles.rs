//! The close_profiles tool.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::client::{ProfileClient, ProfileService};
use crate::report;

use super::{failure_analysis, FailureInfo};

/// Request parameters for close_profiles.
#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct CloseProfilesRequest {
    /// Identifiers of the profiles to close.
    #[schemars(description = "Identifiers of the profiles to close")]
    pub profile_ids: Vec<String>,
}

/// Response from close_profiles.
#[derive(Debug, Serialize)]
pub struct CloseProfilesResponse {
    pub total: usize,
    pub success_count: usize,
    pub failure_count: usize,
    /// Identifiers that closed cleanly.
    pub closed: Vec<String>,
    pub failed: Vec<FailureInfo>,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<String>,
}

/// Closes every requested profile as one batch.
pub async fn handle<S: ProfileService>(
    client: &ProfileClient<S>,
    request: CloseProfilesRequest,
) -> CloseProfilesResponse {
    let result = client.close_profiles(request.profile_ids).await;

    CloseProfilesResponse {
        total: result.total(),
        success_count: result.success_count(),
        failure_count: result.failure_count(),
        closed: result.successes.iter().map(|s| s.item.clone()).collect(),
        failed: FailureInfo::from_failures(&result),
        summary: report::render_batch_summary("Closed", &result),
        analysis: failure_analysis(&result),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_deserialization() {
        let request: CloseProfilesRequest =
            serde_json::from_str(r#"{"profile_ids": ["p1"]}"#).unwrap();
        assert_eq!(request.profile_ids, vec!["p1"]);
    }

    #[test]
    fn test_empty_request_is_valid() {
        let request: CloseProfilesRequest =
            serde_json::from_str(r#"{"profile_ids": []}"#).unwrap();
        assert!(request.profile_ids.is_empty());
    }
}
