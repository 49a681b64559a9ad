use serde::Serialize;
use serde_json::Value;

use super::profile::ProfileResponse;
use crate::domain::entity::diagnosis::{Diagnosis, DiagnosticStep, RepairReport, RepairStep, StepReport};
use crate::domain::entity::identity::Identity;

#[derive(Debug, Serialize)]
pub struct StepResponse {
    pub name: &'static str,
    pub status: String,
    pub message: Option<String>,
}

impl From<StepReport<DiagnosticStep>> for StepResponse {
    fn from(report: StepReport<DiagnosticStep>) -> Self {
        Self { name: report.step.title(), status: report.status.to_string(), message: report.message }
    }
}

impl From<StepReport<RepairStep>> for StepResponse {
    fn from(report: StepReport<RepairStep>) -> Self {
        Self { name: report.step.title(), status: report.status.to_string(), message: report.message }
    }
}

#[derive(Debug, Serialize)]
pub struct AuthUserResponse {
    pub id: String,
    pub email: Option<String>,
    pub user_metadata: Value,
}

impl From<Identity> for AuthUserResponse {
    fn from(identity: Identity) -> Self {
        Self { id: identity.id, email: identity.email, user_metadata: identity.metadata }
    }
}

// ╔════════════════════════════╗
// ║        Diagnose            ║
// ╚════════════════════════════╝

#[derive(Debug, Serialize)]
pub struct DiagnosisResponse {
    pub auth_user: Option<AuthUserResponse>,
    pub profile: Option<ProfileResponse>,
    pub conflict_detected: bool,
    pub error: Option<String>,
    pub suggestion: Option<String>,
    pub steps: Vec<StepResponse>,
}

impl From<Diagnosis> for DiagnosisResponse {
    fn from(diagnosis: Diagnosis) -> Self {
        Self {
            auth_user: diagnosis.identity.map(AuthUserResponse::from),
            profile: diagnosis.profile.map(ProfileResponse::from),
            conflict_detected: diagnosis.conflict_detected,
            error: diagnosis.error,
            suggestion: diagnosis.suggestion,
            steps: diagnosis.steps.into_iter().map(StepResponse::from).collect(),
        }
    }
}

// ╔════════════════════════════╗
// ║         Repair             ║
// ╚════════════════════════════╝

#[derive(Debug, Serialize)]
pub struct RepairResponse {
    pub success: bool,
    pub profile: Option<ProfileResponse>,
    pub error: Option<String>,
    pub steps: Vec<StepResponse>,
}

impl From<RepairReport> for RepairResponse {
    fn from(report: RepairReport) -> Self {
        Self {
            success: report.success,
            profile: report.profile.map(ProfileResponse::from),
            error: report.error,
            steps: report.steps.into_iter().map(StepResponse::from).collect(),
        }
    }
}
