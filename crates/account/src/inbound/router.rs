use std::sync::Arc;

use app_core::middleware::require_session;
use app_core::session::SessionVerifier;
use axum::routing::{get, post};
use axum::{Router, middleware};

use crate::inbound::http::authn::*;
use crate::inbound::http::diagnostics::*;
use crate::inbound::http::profile::*;
use crate::inbound::state::AccountState;

pub fn create_router(state: AccountState, verifier: Arc<dyn SessionVerifier>) -> Router {
    let protected_routes = Router::new()
        // profile scope
        .route("/me", get(get_profile).patch(update_profile))
        .route("/me/repair", post(repair))
        // authentication scope
        .route("/auth/logout", post(logout))
        .route_layer(middleware::from_fn_with_state(verifier, require_session));

    let public_routes = Router::new()
        // authentication scope
        .route("/auth/login", post(login))
        .route("/auth/social/{provider}", get(oauth_login))
        // diagnostics scope
        .route("/me/diagnostics", get(diagnose));

    Router::new().merge(public_routes).merge(protected_routes).with_state(state)
}

#[cfg(test)]
mod tests {
    use app_core::config::test_utils::TestConfigBuilder;
    use app_core::error::AppError;
    use app_core::session::{Claims, MockSessionVerifier, SessionError};
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use chrono::Utc;
    use mockall::predicate::*;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::domain::entity::diagnosis::{Checklist, Diagnosis, DiagnosticStep, StepStatus};
    use crate::domain::entity::profile::{Role, UserProfile};
    use crate::domain::inout::prelude::*;
    use crate::usecase::authn::MockAuthnUseCase;
    use crate::usecase::diagnostics::MockDiagnosticsUseCase;
    use crate::usecase::profile::MockProfileUseCase;

    const TOKEN: &str = "valid.jwt.token";

    struct Mocks {
        authn: MockAuthnUseCase,
        profile: MockProfileUseCase,
        diagnostics: MockDiagnosticsUseCase,
    }

    impl Mocks {
        fn new() -> Self {
            Self {
                authn: MockAuthnUseCase::new(),
                profile: MockProfileUseCase::new(),
                diagnostics: MockDiagnosticsUseCase::new(),
            }
        }

        fn into_router(self) -> Router {
            let config = Arc::new(TestConfigBuilder::new().with("auth.redirect_to", "https://zonehub.gg/home").build());
            let state =
                AccountState::new(config, Arc::new(self.authn), Arc::new(self.profile), Arc::new(self.diagnostics));

            let mut verifier = MockSessionVerifier::new();
            verifier.expect_verify().returning(|token| {
                if token == TOKEN {
                    Ok(Claims {
                        sub: "u1".to_string(),
                        aud: "authenticated".to_string(),
                        exp: 9_999_999_999,
                        iat: 0,
                        email: Some("a@b.com".to_string()),
                        session_id: Some("sess-1".to_string()),
                        role: None,
                    })
                } else {
                    Err(SessionError::InvalidToken)
                }
            });

            create_router(state, Arc::new(verifier))
        }
    }

    fn profile() -> UserProfile {
        let now = Utc::now();
        UserProfile {
            id: "u1".to_string(),
            email: "a@b.com".to_string(),
            full_name: Some("a".to_string()),
            avatar_url: Some("/placeholder.svg".to_string()),
            role: Role::Member,
            created_at: now,
            updated_at: now,
        }
    }

    fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_get_profile_requires_session() {
        let mut mocks = Mocks::new();
        mocks.profile.expect_current_profile().never();

        let response = mocks.into_router().oneshot(request("GET", "/me", None, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_get_profile_invalid_token() {
        let response = Mocks::new().into_router().oneshot(request("GET", "/me", Some("forged"), None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_get_profile_success() {
        let mut mocks = Mocks::new();
        mocks
            .profile
            .expect_current_profile()
            .withf(|input| input.access_token == TOKEN && input.session_key == "sess-1" && input.force_refresh)
            .times(1)
            .returning(|_| Box::pin(async move { Ok(GetCurrentProfileOutput { profile: Some(profile()) }) }));

        let response = mocks
            .into_router()
            .oneshot(request("GET", "/me?force_refresh=true", Some(TOKEN), None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["data"]["id"], "u1");
        assert_eq!(json["data"]["role"], "member");
        assert_eq!(json["data"]["avatar_url"], "/placeholder.svg");
    }

    #[tokio::test]
    async fn test_get_profile_unavailable() {
        let mut mocks = Mocks::new();
        mocks
            .profile
            .expect_current_profile()
            .returning(|_| Box::pin(async move { Ok(GetCurrentProfileOutput { profile: None }) }));

        let response = mocks.into_router().oneshot(request("GET", "/me", Some(TOKEN), None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert!(json["data"].is_null());
        assert_eq!(json["message"], "Profile unavailable, try again later");
    }

    #[tokio::test]
    async fn test_update_profile() {
        let mut mocks = Mocks::new();
        mocks
            .profile
            .expect_update_profile()
            .withf(|input| input.user_id == "u1" && input.full_name.as_deref() == Some("Ace"))
            .times(1)
            .returning(|_| {
                Box::pin(async move {
                    let mut updated = profile();
                    updated.full_name = Some("Ace".to_string());
                    Ok(UpdateProfileOutput { profile: updated })
                })
            });

        let response = mocks
            .into_router()
            .oneshot(request("PATCH", "/me", Some(TOKEN), Some(json!({ "full_name": "Ace" }))))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["data"]["full_name"], "Ace");
    }

    #[tokio::test]
    async fn test_login() {
        let mut mocks = Mocks::new();
        mocks.authn.expect_login().times(1).returning(|_| {
            Box::pin(async move {
                Ok(LoginOutput {
                    access_token: "access".to_string(),
                    refresh_token: "refresh".to_string(),
                    expires_in: 3600,
                    profile: None,
                })
            })
        });

        let response = mocks
            .into_router()
            .oneshot(request(
                "POST",
                "/auth/login",
                None,
                Some(json!({ "email": "a@b.com", "password": "secret123" })),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["data"]["access_token"], "access");
        assert!(json["data"]["profile"].is_null());
    }

    #[tokio::test]
    async fn test_oauth_login_redirects() {
        let mut mocks = Mocks::new();
        mocks
            .authn
            .expect_oauth_login()
            .withf(|input| {
                input.provider == "discord" && input.redirect_to.as_deref() == Some("https://zonehub.gg/home")
            })
            .returning(|_| {
                Box::pin(async move {
                    Ok(OAuthLoginOutput { auth_url: "https://xyz.supabase.co/auth/v1/authorize".to_string() })
                })
            });

        let response =
            mocks.into_router().oneshot(request("GET", "/auth/social/discord", None, None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "https://xyz.supabase.co/auth/v1/authorize");
    }

    #[tokio::test]
    async fn test_logout() {
        let mut mocks = Mocks::new();
        mocks
            .authn
            .expect_logout()
            .withf(|input| input.access_token == TOKEN && input.session_key == "sess-1")
            .times(1)
            .returning(|_| Box::pin(async move { Ok(LogoutOutput { success: true }) }));

        let response = mocks.into_router().oneshot(request("POST", "/auth/logout", Some(TOKEN), None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["data"]["success"], true);
    }

    #[tokio::test]
    async fn test_diagnose_without_session() {
        let mut mocks = Mocks::new();
        mocks
            .diagnostics
            .expect_diagnose()
            .withf(|input| input.access_token.is_none())
            .times(1)
            .returning(|_| {
                Box::pin(async move {
                    let mut steps = Checklist::new(&DiagnosticStep::ALL);
                    steps.finish(DiagnosticStep::Session, StepStatus::Error, "No active session");
                    Ok(Diagnosis {
                        identity: None,
                        profile: None,
                        conflict_detected: false,
                        error: Some("You are not logged in".to_string()),
                        suggestion: None,
                        steps: steps.into_reports(),
                    })
                })
            });

        let response = mocks.into_router().oneshot(request("GET", "/me/diagnostics", None, None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["data"]["conflict_detected"], false);
        assert_eq!(json["data"]["steps"][0]["name"], "Check session");
        assert_eq!(json["data"]["steps"][0]["status"], "error");
        assert_eq!(json["data"]["steps"][1]["status"], "idle");
    }

    #[tokio::test]
    async fn test_repair_without_conflict() {
        let mut mocks = Mocks::new();
        mocks
            .diagnostics
            .expect_repair()
            .with(always())
            .returning(|_| Box::pin(async move { Err(AppError::ValidationStr("No conflict detected".to_string())) }));

        let response = mocks.into_router().oneshot(request("POST", "/me/repair", Some(TOKEN), None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_repair_requires_session() {
        let mut mocks = Mocks::new();
        mocks.diagnostics.expect_repair().never();

        let response = mocks.into_router().oneshot(request("POST", "/me/repair", None, None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
