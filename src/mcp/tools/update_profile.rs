//! The update_profile tool.
//!
//! Updates touch one profile at a time, so this tool skips the batch
//! machinery and wraps the single call in the retry coordinator directly.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::client::{ProfileClient, ProfileService, ProfileUpdate};
use crate::retry::run_with_retry;

use super::{FailureInfo, ProxyArg};

/// Request parameters for update_profile.
#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct UpdateProfileRequest {
    /// Identifier of the profile to update.
    pub profile_id: String,
    /// New display name.
    #[serde(default)]
    pub name: Option<String>,
    /// New group.
    #[serde(default)]
    pub group_id: Option<String>,
    /// New proxy settings.
    #[serde(default)]
    pub proxy: Option<ProxyArg>,
    /// New note.
    #[serde(default)]
    pub remark: Option<String>,
}

/// Response from update_profile.
#[derive(Debug, Serialize)]
pub struct UpdateProfileResponse {
    pub success: bool,
    pub profile_id: String,
    pub message: String,
    /// Failure details when the update did not go through.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<FailureInfo>,
}

/// Applies the update, retrying per classification.
pub async fn handle<S: ProfileService>(
    client: &ProfileClient<S>,
    request: UpdateProfileRequest,
) -> UpdateProfileResponse {
    let update = ProfileUpdate {
        name: request.name,
        group_id: request.group_id,
        proxy: request.proxy.map(Into::into),
        remark: request.remark,
    };
    let profile_id = request.profile_id;

    let op = |id: String| {
        let update = update.clone();
        async move { client.update_profile(&id, &update).await }
    };

    match run_with_retry(&profile_id, &op).await {
        Ok(()) => UpdateProfileResponse {
            success: true,
            message: format!("Updated profile '{}'", profile_id),
            profile_id,
            error: None,
        },
        Err(error) => {
            let failure = crate::batch::BatchFailure {
                item: profile_id.clone(),
                error,
            };
            UpdateProfileResponse {
                success: false,
                message: format!("Failed to update profile '{}'", profile_id),
                profile_id,
                error: Some(FailureInfo::from_failure(&failure)),
            }
        }
    }
}
