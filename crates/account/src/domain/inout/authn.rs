use validator::Validate;

use crate::domain::entity::profile::UserProfile;

// ╔════════════════════════════╗
// ║         Login              ║
// ╚════════════════════════════╝

#[derive(Debug, Validate)]
pub struct LoginInput {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "must be at least 6 characters long"))]
    pub password: String,
}

#[derive(Debug)]
pub struct LoginOutput {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub profile: Option<UserProfile>,
}

// ╔════════════════════════════╗
// ║       OAuth Login          ║
// ╚════════════════════════════╝

#[derive(Debug, Validate)]
pub struct OAuthLoginInput {
    #[validate(length(min = 1, message = "provider cannot be empty"))]
    pub provider: String,
    pub redirect_to: Option<String>,
}

#[derive(Debug)]
pub struct OAuthLoginOutput {
    pub auth_url: String,
}

// ╔════════════════════════════╗
// ║          Logout            ║
// ╚════════════════════════════╝

#[derive(Debug)]
pub struct LogoutInput {
    pub access_token: String,
    pub session_key: String,
}

#[derive(Debug)]
pub struct LogoutOutput {
    pub success: bool,
}
