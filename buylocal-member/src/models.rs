use buylocal_core::Entity;
use buylocal_shared::Masked;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How the member signed in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthType {
    #[default]
    Anonymous,
    OnlineBanking,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Profile {
    pub name: String,
    pub email: Masked<String>,
    pub zip: String,
    pub member_number: Masked<String>,
    pub image_url: Option<String>,
}

/// A credit-union member browsing offers.
///
/// Likes, favorites, shares and rewards point back at the member through
/// `member_id`; the member does not embed them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Member {
    pub id: i64,
    pub username: String,
    pub institution_id: i64,
    pub auth_type: AuthType,
    pub profile: Option<Profile>,
}

impl Member {
    pub fn new(username: impl Into<String>, institution_id: i64, auth_type: AuthType) -> Self {
        Self {
            id: 0,
            username: username.into(),
            institution_id,
            auth_type,
            profile: None,
        }
    }

    /// A not-yet-persisted anonymous member with a random username.
    pub fn anonymous(institution_id: i64) -> Self {
        Self::new(Uuid::new_v4().to_string(), institution_id, AuthType::Anonymous)
    }

    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.profile = Some(profile);
        self
    }

    pub fn is_anonymous(&self) -> bool {
        self.auth_type == AuthType::Anonymous
    }
}

impl Entity for Member {
    const KIND: &'static str = "member";

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }
}
