use serde::{Deserialize, Serialize};

use super::{identified, Identity, ObjectRef, Syncable};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(flatten)]
    pub identity: Identity,
    #[serde(default)]
    pub birthday: Option<String>,
    #[serde(default)]
    pub education: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub job_title: Option<String>,
    #[serde(default)]
    pub surname: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub introduction: Option<String>,
    #[serde(default)]
    pub employer: Option<String>,
    #[serde(default)]
    pub interests: Option<String>,
    #[serde(default)]
    pub languages: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub nationality: Option<String>,
    #[serde(default)]
    pub user_credentials: Option<UserCredentials>,
    /// Units the user may capture data for
    #[serde(default)]
    pub organisation_units: Vec<ObjectRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCredentials {
    #[serde(flatten)]
    pub identity: Identity,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub user_roles: Vec<UserRole>,
}

/// Role granted through a user's credentials; roles are shared between users.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserRole {
    #[serde(flatten)]
    pub identity: Identity,
}

identified!(User, UserCredentials, UserRole);
