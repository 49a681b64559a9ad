use app_core::extractors::{AppJson, AppPath, AppQuery};
use app_core::response::Response;
use app_core::session::SessionContext;
use axum::debug_handler;
use axum::extract::State;
use axum::response::{IntoResponse, Redirect};

use crate::domain::inout::prelude::*;
use crate::inbound::model::prelude::*;
use crate::inbound::state::AccountState;

#[debug_handler]
pub async fn login(State(state): State<AccountState>, AppJson(req): AppJson<LoginRequest>) -> impl IntoResponse {
    state
        .authn
        .login(LoginInput { email: req.email, password: req.password })
        .await
        .map(|output| LoginResponse {
            access_token: output.access_token,
            refresh_token: output.refresh_token,
            expires_in: output.expires_in,
            profile: output.profile.map(ProfileResponse::from),
        })
        .map(Response::from)
}

#[debug_handler]
pub async fn oauth_login(
    State(state): State<AccountState>,
    AppPath(provider): AppPath<String>,
    AppQuery(query): AppQuery<OAuthLoginQuery>,
) -> impl IntoResponse {
    let redirect_to = query.redirect_to.or_else(|| state.config.get::<String>("auth.redirect_to").ok());

    state
        .authn
        .oauth_login(OAuthLoginInput { provider, redirect_to })
        .await
        .map(|output| Redirect::to(&output.auth_url))
}

#[debug_handler]
pub async fn logout(State(state): State<AccountState>, session: SessionContext) -> impl IntoResponse {
    state
        .authn
        .logout(LogoutInput {
            session_key: session.claims.session_key().to_string(),
            access_token: session.access_token,
        })
        .await
        .map(|output| LogoutResponse { success: output.success })
        .map(Response::from)
}
