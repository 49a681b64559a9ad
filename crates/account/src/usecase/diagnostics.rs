use std::sync::Arc;

use app_core::error::AppError;
use app_core::store::StoreError;
use async_trait::async_trait;

use super::profile::ProfileUseCase;
use crate::domain::entity::diagnosis::{Checklist, Diagnosis, DiagnosticStep, RepairReport, RepairStep, StepStatus};
use crate::domain::entity::identity::{Identity, Session};
use crate::domain::inout::prelude::*;
use crate::outbound::provider::AuthProvider;
use crate::outbound::repository::ProfileRepository;

const NOT_LOGGED_IN_MSG: &str = "You are not logged in";
const NOT_LOGGED_IN_HINT: &str = "Sign in and run the diagnosis again.";
const NO_AUTH_USER_MSG: &str = "Could not load your account from the auth provider";
const NO_AUTH_USER_HINT: &str = "Sign out, sign in again, and rerun the diagnosis.";
const REPAIR_HINT: &str = "Run the repair to recreate your profile from your account data.";
const RETRY_HINT: &str = "The profile store is unavailable. Try again in a few minutes.";
const NO_CONFLICT_MSG: &str = "No conflict detected, nothing to repair";

#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait DiagnosticsUseCase: Send + Sync {
    async fn diagnose(&self, input: DiagnoseInput) -> Result<Diagnosis, AppError>;
    /// Deletes and recreates the profile row. Allowed only while a diagnosis
    /// reports a conflict; customised profile fields are reset.
    async fn repair(&self, input: RepairInput) -> Result<RepairReport, AppError>;
}

pub struct DiagnosticsService {
    auth: Arc<dyn AuthProvider>,
    repo: Arc<dyn ProfileRepository>,
    profile: Arc<dyn ProfileUseCase>,
}

impl DiagnosticsService {
    pub fn new(auth: Arc<dyn AuthProvider>, repo: Arc<dyn ProfileRepository>, profile: Arc<dyn ProfileUseCase>) -> Self {
        Self { auth, repo, profile }
    }

    async fn run_diagnosis(&self, access_token: Option<&str>) -> (Diagnosis, Option<Session>) {
        let mut steps = Checklist::new(&DiagnosticStep::ALL);
        let mut diagnosis = Diagnosis {
            identity: None,
            profile: None,
            conflict_detected: false,
            error: None,
            suggestion: None,
            steps: Vec::new(),
        };

        // 1. Session
        steps.start(DiagnosticStep::Session);
        let session = match access_token {
            Some(token) => self.auth.get_session(token).await.unwrap_or_else(|err| {
                tracing::warn!(error = %err, "Session check failed");
                None
            }),
            None => None,
        };
        let (Some(token), Some(session)) = (access_token, session) else {
            steps.finish(DiagnosticStep::Session, StepStatus::Error, "No active session");
            diagnosis.error = Some(NOT_LOGGED_IN_MSG.to_string());
            diagnosis.suggestion = Some(NOT_LOGGED_IN_HINT.to_string());
            diagnosis.steps = steps.into_reports();
            return (diagnosis, None);
        };
        steps.finish(
            DiagnosticStep::Session,
            StepStatus::Success,
            format!("Session active until {}", session.expires_at.to_rfc3339()),
        );

        // 2. Auth identity
        steps.start(DiagnosticStep::AuthIdentity);
        let identity = match self.auth.get_user(token).await {
            Ok(Some(identity)) => identity,
            Ok(None) => {
                steps.finish(DiagnosticStep::AuthIdentity, StepStatus::Error, "Auth user not found");
                return Self::abort(diagnosis, steps, NO_AUTH_USER_MSG.to_string(), NO_AUTH_USER_HINT);
            },
            Err(err) => {
                steps.finish(DiagnosticStep::AuthIdentity, StepStatus::Error, format!("Auth user lookup failed: {err}"));
                return Self::abort(diagnosis, steps, NO_AUTH_USER_MSG.to_string(), NO_AUTH_USER_HINT);
            },
        };
        steps.finish(DiagnosticStep::AuthIdentity, StepStatus::Success, format!("Auth user {}", identity.id));

        // 3. Profile row
        steps.start(DiagnosticStep::ProfileRow);
        match self.repo.find_by_id(&identity.id).await {
            Ok(Some(profile)) => {
                steps.finish(DiagnosticStep::ProfileRow, StepStatus::Success, "Profile row found");
                diagnosis.profile = Some(profile);
            },
            Ok(None) | Err(StoreError::NotFound(_)) => {
                steps.finish(DiagnosticStep::ProfileRow, StepStatus::Warning, "No profile row for this account");
                diagnosis.conflict_detected = true;
                diagnosis.suggestion = Some(REPAIR_HINT.to_string());
            },
            Err(err) => {
                steps.finish(DiagnosticStep::ProfileRow, StepStatus::Error, format!("Profile lookup failed: {err}"));
                diagnosis.error = Some(format!("Profile lookup failed: {err}"));
                diagnosis.suggestion = Some(RETRY_HINT.to_string());
            },
        }

        // 4. Consistency
        if let Some(profile) = &diagnosis.profile {
            steps.start(DiagnosticStep::Consistency);
            let auth_email = identity.email_or_empty();
            if profile.email != auth_email {
                steps.finish(
                    DiagnosticStep::Consistency,
                    StepStatus::Warning,
                    format!("Profile email {} differs from account email {}", profile.email, auth_email),
                );
                diagnosis.conflict_detected = true;
                diagnosis.suggestion = Some(REPAIR_HINT.to_string());
            } else {
                steps.finish(DiagnosticStep::Consistency, StepStatus::Success, "Profile matches account");
            }
        }

        tracing::info!(
            user_id = identity.id,
            conflict_detected = diagnosis.conflict_detected,
            has_profile = diagnosis.profile.is_some(),
            "Account diagnosis finished"
        );

        diagnosis.identity = Some(identity);
        diagnosis.steps = steps.into_reports();
        (diagnosis, Some(session))
    }

    fn abort(
        mut diagnosis: Diagnosis,
        steps: Checklist<DiagnosticStep>,
        error: String,
        suggestion: &str,
    ) -> (Diagnosis, Option<Session>) {
        diagnosis.error = Some(error);
        diagnosis.suggestion = Some(suggestion.to_string());
        diagnosis.steps = steps.into_reports();
        (diagnosis, None)
    }

    async fn run_repair(&self, identity: &Identity) -> RepairReport {
        let mut steps = Checklist::new(&RepairStep::ALL);

        steps.start(RepairStep::DeleteRow);
        if let Err(err) = self.repo.delete(&identity.id).await {
            tracing::error!(user_id = identity.id, error = %err, "Repair could not delete profile row");
            steps.finish(RepairStep::DeleteRow, StepStatus::Error, format!("Delete failed: {err}"));
            return Self::failed(steps, format!("Could not delete the profile row: {err}"));
        }
        steps.finish(RepairStep::DeleteRow, StepStatus::Success, "Profile row deleted");

        steps.start(RepairStep::RecreateRow);
        if self.profile.ensure_profile(identity).await.is_none() {
            steps.finish(RepairStep::RecreateRow, StepStatus::Error, "Profile row could not be created");
            return Self::failed(steps, "Could not recreate the profile row".to_string());
        }
        steps.finish(RepairStep::RecreateRow, StepStatus::Success, "Profile row recreated");

        steps.start(RepairStep::VerifyRow);
        match self.repo.find_by_id(&identity.id).await {
            Ok(Some(profile)) if profile.matches(identity) => {
                steps.finish(RepairStep::VerifyRow, StepStatus::Success, "Profile row verified");
                tracing::info!(user_id = identity.id, "Account repaired");
                RepairReport { success: true, profile: Some(profile), error: None, steps: steps.into_reports() }
            },
            Ok(Some(_)) => {
                steps.finish(RepairStep::VerifyRow, StepStatus::Error, "Profile row does not match account");
                Self::failed(steps, "Recreated profile does not match your account".to_string())
            },
            Ok(None) => {
                steps.finish(RepairStep::VerifyRow, StepStatus::Error, "Profile row missing after recreate");
                Self::failed(steps, "Recreated profile could not be found".to_string())
            },
            Err(err) => {
                steps.finish(RepairStep::VerifyRow, StepStatus::Error, format!("Verify failed: {err}"));
                Self::failed(steps, format!("Could not verify the profile row: {err}"))
            },
        }
    }

    fn failed(steps: Checklist<RepairStep>, error: String) -> RepairReport {
        tracing::warn!("Account repair failed: {}", error);
        RepairReport { success: false, profile: None, error: Some(error), steps: steps.into_reports() }
    }
}

#[async_trait]
impl DiagnosticsUseCase for DiagnosticsService {
    async fn diagnose(&self, input: DiagnoseInput) -> Result<Diagnosis, AppError> {
        let (diagnosis, _) = self.run_diagnosis(input.access_token.as_deref()).await;
        Ok(diagnosis)
    }

    async fn repair(&self, input: RepairInput) -> Result<RepairReport, AppError> {
        let (diagnosis, session) = self.run_diagnosis(input.access_token.as_deref()).await;

        let (true, Some(identity), Some(session)) = (diagnosis.conflict_detected, diagnosis.identity, session) else {
            return Err(AppError::ValidationStr(NO_CONFLICT_MSG.to_string()));
        };

        let report = self.run_repair(&identity).await;
        self.profile.forget_session(&session.session_key).await;

        Ok(report)
    }
}
