//! The delete_profiles tool.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::client::{ProfileClient, ProfileService};
use crate::report;

use super::{failure_analysis, FailureInfo};

/// Request parameters for delete_profiles.
#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct DeleteProfilesRequest {
    /// Identifiers of the profiles to delete.
    #[schemars(description = "Identifiers of the profiles to delete")]
    pub profile_ids: Vec<String>,
}

/// Response from delete_profiles.
#[derive(Debug, Serialize)]
pub struct DeleteProfilesResponse {
    pub total: usize,
    pub success_count: usize,
    pub failure_count: usize,
    /// Identifiers that were deleted.
    pub deleted: Vec<String>,
    pub failed: Vec<FailureInfo>,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<String>,
}

/// Deletes every requested profile as one batch.
pub async fn handle<S: ProfileService>(
    client: &ProfileClient<S>,
    request: DeleteProfilesRequest,
) -> DeleteProfilesResponse {
    let result = client.delete_profiles(request.profile_ids).await;

    DeleteProfilesResponse {
        total: result.total(),
        success_count: result.success_count(),
        failure_count: result.failure_count(),
        deleted: result.successes.iter().map(|s| s.item.clone()).collect(),
        failed: FailureInfo::from_failures(&result),
        summary: report::render_batch_summary("Deleted", &result),
        analysis: failure_analysis(&result),
    }
}
