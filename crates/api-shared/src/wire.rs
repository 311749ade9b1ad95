//! JSON request and response bodies of the persistence API.
//!
//! Field names are camelCase on the wire to match the story documents themselves.

use serde::{Deserialize, Serialize};
use storyforge_core::{Story, StoryMeta};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub status: String,
}

/// Body of every mutation that has nothing else to report.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SuccessRes {
    pub success: bool,
}

impl SuccessRes {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

/// Body of every non-2xx response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    pub error: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ListStoriesRes {
    pub stories: Vec<StoryMeta>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GetStoryRes {
    pub story: Story,
}

/// Account creation request.
///
/// Fields default to empty so a missing field reaches validation and gets the API's own 400
/// body instead of a deserializer rejection.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SignupReq {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub name: String,
}

impl SignupReq {
    /// True when any of the three fields is blank.
    pub fn is_incomplete(&self) -> bool {
        [&self.email, &self.password, &self.name]
            .iter()
            .any(|field| field.trim().is_empty())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserRes {
    pub user: User,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SignInReq {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionRes {
    pub access_token: String,
    pub user: User,
}
