use serde::{Deserialize, Serialize};

use super::profile::ProfileResponse;

// ╔════════════════════════════╗
// ║         Login              ║
// ╚════════════════════════════╝

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    /// Null when the profile row could not be provisioned yet.
    pub profile: Option<ProfileResponse>,
}

// ╔════════════════════════════╗
// ║       OAuth Login          ║
// ╚════════════════════════════╝

#[derive(Deserialize, Default)]
pub struct OAuthLoginQuery {
    pub redirect_to: Option<String>,
}

// ╔════════════════════════════╗
// ║          Logout            ║
// ╚════════════════════════════╝

#[derive(Serialize)]
pub struct LogoutResponse {
    pub success: bool,
}
