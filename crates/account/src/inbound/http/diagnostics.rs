use app_core::extractors::BearerToken;
use app_core::response::Response;
use app_core::session::SessionContext;
use axum::debug_handler;
use axum::extract::State;
use axum::response::IntoResponse;

use crate::domain::inout::prelude::*;
use crate::inbound::model::prelude::*;
use crate::inbound::state::AccountState;

/// Runs without a session on purpose: a missing session is the first thing
/// the diagnosis reports.
#[debug_handler]
pub async fn diagnose(State(state): State<AccountState>, BearerToken(token): BearerToken) -> impl IntoResponse {
    state
        .diagnostics
        .diagnose(DiagnoseInput { access_token: token })
        .await
        .map(DiagnosisResponse::from)
        .map(Response::from)
}

#[debug_handler]
pub async fn repair(State(state): State<AccountState>, session: SessionContext) -> impl IntoResponse {
    state
        .diagnostics
        .repair(RepairInput { access_token: Some(session.access_token) })
        .await
        .map(|report| {
            let message = if report.success { "Account repaired" } else { "Account repair failed" };
            Response::with_message(RepairResponse::from(report), message)
        })
}
