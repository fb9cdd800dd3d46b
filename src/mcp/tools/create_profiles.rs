//! The create_profiles tool.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::client::{ProfileClient, ProfileService, ProfileSpec};
use crate::report;

use super::{failure_analysis, FailureInfo, ProxyArg};

/// Parameters for one new profile.
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct NewProfile {
    /// Display name; also identifies the item in the batch result.
    #[schemars(description = "Display name for the new profile")]
    pub name: String,
    /// Group to place the profile in.
    #[serde(default)]
    pub group_id: Option<String>,
    /// Proxy for the profile's traffic.
    #[serde(default)]
    pub proxy: Option<ProxyArg>,
    /// Free-form note attached to the profile.
    #[serde(default)]
    pub remark: Option<String>,
}

impl From<NewProfile> for ProfileSpec {
    fn from(arg: NewProfile) -> Self {
        Self {
            name: arg.name,
            group_id: arg.group_id,
            proxy: arg.proxy.map(Into::into),
            remark: arg.remark,
        }
    }
}

/// Request parameters for create_profiles.
#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct CreateProfilesRequest {
    /// The profiles to create.
    pub profiles: Vec<NewProfile>,
}

/// One created profile: the requested name and the id the service assigned.
#[derive(Debug, Clone, Serialize)]
pub struct CreatedProfileInfo {
    pub name: String,
    pub profile_id: String,
}

/// Response from create_profiles.
#[derive(Debug, Serialize)]
pub struct CreateProfilesResponse {
    pub total: usize,
    pub success_count: usize,
    pub failure_count: usize,
    pub created: Vec<CreatedProfileInfo>,
    pub failed: Vec<FailureInfo>,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<String>,
}

/// Creates every requested profile as one batch.
pub async fn handle<S: ProfileService>(
    client: &ProfileClient<S>,
    request: CreateProfilesRequest,
) -> CreateProfilesResponse {
    let specs: Vec<ProfileSpec> = request.profiles.into_iter().map(Into::into).collect();
    let result = client.create_profiles(specs).await;

    CreateProfilesResponse {
        total: result.total(),
        success_count: result.success_count(),
        failure_count: result.failure_count(),
        created: result
            .successes
            .iter()
            .map(|s| CreatedProfileInfo {
                name: s.item.name.clone(),
                profile_id: s.result.clone(),
            })
            .collect(),
        failed: FailureInfo::from_failures(&result),
        summary: report::render_batch_summary("Created", &result),
        analysis: failure_analysis(&result),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_with_proxy() {
        let json = r#"{
            "profiles": [
                {
                    "name": "scraper-1",
                    "group_id": "g1",
                    "proxy": {"kind": "socks5", "host": "10.0.0.1", "port": 1080}
                }
            ]
        }"#;
        let request: CreateProfilesRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.profiles.len(), 1);
        let spec: ProfileSpec = request.profiles[0].clone().into();
        assert_eq!(spec.name, "scraper-1");
        assert_eq!(spec.proxy.as_ref().unwrap().port, 1080);
        assert!(spec.remark.is_none());
    }

    #[test]
    fn test_minimal_profile() {
        let request: CreateProfilesRequest =
            serde_json::from_str(r#"{"profiles": [{"name": "bare"}]}"#).unwrap();
        let spec: ProfileSpec = request.profiles[0].clone().into();
        assert_eq!(spec.name, "bare");
        assert!(spec.group_id.is_none());
        assert!(spec.proxy.is_none());
    }
}
