use crate::error::{ConfigError, FetchError};
use crate::fetch::Fetch;
use crate::http::HttpClient;
use crate::source::TargetEntity;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::trace;

/// Twitter profile lookup by username, through the data API proxy at `base`.
pub struct ProfileApi {
    client: HttpClient,
    base: String,
}

impl ProfileApi {
    pub fn new(base: impl Into<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            client: crate::std_client_build()?,
            base: base.into(),
        })
    }
}

#[async_trait]
impl Fetch for ProfileApi {
    async fn fetch(&self, entity: &TargetEntity) -> Result<Value, FetchError> {
        let url = format!(
            "{}/Twitter/get_user_profile_by_username",
            self.base.trim_end_matches('/')
        );
        trace!("fetching profile for @{}", entity.id);

        let response = self
            .client
            .get(url)
            .query(&[("username", entity.id.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

/// The profile fields worth keeping, flattened out of the nested API document.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Profile {
    pub username: String,
    pub name: String,
    pub description: String,
    pub followers: u64,
    pub verified: bool,
    pub created_at: String,
}

impl Profile {
    /// Reads `result.data.user.result`; `None` when the document holds no user.
    ///
    /// Missing or null leaf fields fall back to empty / zero / false.
    pub fn from_payload(payload: &Value) -> Option<Self> {
        let document = ProfileDocument::deserialize(payload).ok()?;
        let user = document.result?.data?.user?.result?;
        let legacy = user.legacy.unwrap_or_default();

        Some(Self {
            username: legacy.screen_name.unwrap_or_default(),
            name: legacy.name.unwrap_or_default(),
            description: legacy.description.unwrap_or_default(),
            followers: legacy.followers_count.unwrap_or_default(),
            verified: legacy.verified.unwrap_or_default()
                || user.is_blue_verified.unwrap_or_default(),
            created_at: legacy.created_at.unwrap_or_default(),
        })
    }
}

// de
// ----------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ProfileDocument {
    result: Option<ProfileResult>,
}

#[derive(Debug, Deserialize)]
struct ProfileResult {
    data: Option<ProfileData>,
}

#[derive(Debug, Deserialize)]
struct ProfileData {
    user: Option<UserEnvelope>,
}

#[derive(Debug, Deserialize)]
struct UserEnvelope {
    result: Option<User>,
}

#[derive(Debug, Deserialize)]
struct User {
    is_blue_verified: Option<bool>,
    legacy: Option<Legacy>,
}

// the proxy sends null as often as it omits a field
#[derive(Debug, Default, Deserialize)]
struct Legacy {
    screen_name: Option<String>,
    name: Option<String>,
    description: Option<String>,
    followers_count: Option<u64>,
    verified: Option<bool>,
    created_at: Option<String>,
}

//////////////////////////////////////////////////////////////
// -- TESTS --
//////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn flattens_nested_user() {
        let payload = json!({
            "result": { "data": { "user": { "result": {
                "is_blue_verified": true,
                "legacy": {
                    "screen_name": "KobeissiLetter",
                    "name": "The Kobeissi Letter",
                    "description": "Macro research & commentary",
                    "followers_count": 1_200_000,
                    "verified": false,
                    "created_at": "Mon Apr 01 00:00:00 +0000 2019"
                }
            } } } }
        });

        let profile = Profile::from_payload(&payload).expect("profile");
        assert_eq!(profile.username, "KobeissiLetter");
        assert_eq!(profile.followers, 1_200_000);
        assert!(profile.verified, "blue verification counts as verified");
        assert_eq!(profile.created_at, "Mon Apr 01 00:00:00 +0000 2019");
    }

    #[test]
    fn missing_user_is_none() {
        assert!(Profile::from_payload(&json!({})).is_none());
        assert!(Profile::from_payload(&json!({ "result": { "data": { "user": {} } } })).is_none());
        let null_user = json!({ "result": { "data": { "user": { "result": null } } } });
        assert!(Profile::from_payload(&null_user).is_none());
    }

    #[test]
    fn null_fields_default() {
        let payload = json!({ "result": { "data": { "user": { "result": {
            "is_blue_verified": null,
            "legacy": {
                "screen_name": "bigfund",
                "name": null,
                "description": null,
                "followers_count": 250_000,
                "verified": null,
                "created_at": null
            }
        } } } } });

        let profile = Profile::from_payload(&payload).expect("profile");
        assert_eq!(profile.username, "bigfund");
        assert_eq!(profile.followers, 250_000);
        assert_eq!(profile.description, "");
        assert!(!profile.verified);
    }

    #[test]
    fn missing_fields_default() {
        let payload = json!({ "result": { "data": { "user": { "result": { "legacy": {} } } } } });
        assert_eq!(Profile::from_payload(&payload), Some(Profile::default()));
    }
}
