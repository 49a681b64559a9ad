use app_core::extractors::{AppJson, AppQuery};
use app_core::response::Response;
use app_core::session::SessionContext;
use axum::debug_handler;
use axum::extract::State;
use axum::response::IntoResponse;

use crate::domain::inout::prelude::*;
use crate::inbound::model::prelude::*;
use crate::inbound::state::AccountState;

const PROFILE_UNAVAILABLE_MSG: &str = "Profile unavailable, try again later";

#[debug_handler]
pub async fn get_profile(
    State(state): State<AccountState>,
    session: SessionContext,
    AppQuery(query): AppQuery<GetProfileQuery>,
) -> impl IntoResponse {
    state
        .profile
        .current_profile(GetCurrentProfileInput {
            session_key: session.claims.session_key().to_string(),
            access_token: session.access_token,
            force_refresh: query.force_refresh,
        })
        .await
        .map(|output| match output.profile {
            Some(profile) => Response::from(Some(ProfileResponse::from(profile))),
            None => Response::with_message(None, PROFILE_UNAVAILABLE_MSG),
        })
}

#[debug_handler]
pub async fn update_profile(
    State(state): State<AccountState>,
    session: SessionContext,
    AppJson(req): AppJson<UpdateProfileRequest>,
) -> impl IntoResponse {
    state
        .profile
        .update_profile(UpdateProfileInput {
            session_key: session.claims.session_key().to_string(),
            user_id: session.claims.sub,
            full_name: req.full_name,
            avatar_url: req.avatar_url,
        })
        .await
        .map(|output| ProfileResponse::from(output.profile))
        .map(Response::from)
}
