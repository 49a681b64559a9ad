use validator::Validate;

use crate::domain::entity::profile::UserProfile;

// ╔════════════════════════════╗
// ║     Current Profile        ║
// ╚════════════════════════════╝

#[derive(Debug)]
pub struct GetCurrentProfileInput {
    pub access_token: String,
    pub session_key: String,
    pub force_refresh: bool,
}

#[derive(Debug)]
pub struct GetCurrentProfileOutput {
    /// `None` while the profile is unavailable; callers retry later.
    pub profile: Option<UserProfile>,
}

// ╔════════════════════════════╗
// ║      Update Profile        ║
// ╚════════════════════════════╝

#[derive(Debug, Validate)]
pub struct UpdateProfileInput {
    pub user_id: String,
    pub session_key: String,

    #[validate(length(min = 1, max = 100, message = "full name must be between 1 and 100 characters"))]
    pub full_name: Option<String>,

    #[validate(length(min = 1, max = 2048, message = "avatar url must be between 1 and 2048 characters"))]
    pub avatar_url: Option<String>,
}

#[derive(Debug)]
pub struct UpdateProfileOutput {
    pub profile: UserProfile,
}
