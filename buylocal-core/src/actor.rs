use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Admin,
    #[default]
    Merchant,
    InstitutionStaff,
}

/// The back-office user performing an offer operation. Recorded in logs only;
/// no operation grants extra rights based on the role.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct User {
    pub user_id: i64,
    pub username: String,
    pub role: UserRole,
}

impl User {
    pub fn new(user_id: i64, username: impl Into<String>, role: UserRole) -> Self {
        Self {
            user_id,
            username: username.into(),
            role,
        }
    }
}
