use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    auth::repo_types::{Profile, User},
    formats::iso_date,
};

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(with = "iso_date::option")]
    pub date_of_birth: Option<Date>,
    pub is_verified: bool,
}

impl ProfileResponse {
    pub fn new(user: &User, profile: &Profile) -> Self {
        Self {
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            date_of_birth: profile.date_of_birth,
            is_verified: profile.is_verified,
        }
    }
}

/// Any subset of the editable fields; absent fields stay as they are.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfileRequest {
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub date_of_birth: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProfileUpdated {
    pub message: &'static str,
    pub user: ProfileResponse,
}
