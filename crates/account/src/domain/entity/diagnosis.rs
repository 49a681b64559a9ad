use std::fmt;

use super::identity::Identity;
use super::profile::UserProfile;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StepStatus {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
    Warning,
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StepStatus::Idle => "idle",
            StepStatus::Loading => "loading",
            StepStatus::Success => "success",
            StepStatus::Error => "error",
            StepStatus::Warning => "warning",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticStep {
    Session,
    AuthIdentity,
    ProfileRow,
    Consistency,
}

impl DiagnosticStep {
    pub const ALL: [DiagnosticStep; 4] =
        [DiagnosticStep::Session, DiagnosticStep::AuthIdentity, DiagnosticStep::ProfileRow, DiagnosticStep::Consistency];

    pub fn title(&self) -> &'static str {
        match self {
            DiagnosticStep::Session => "Check session",
            DiagnosticStep::AuthIdentity => "Check auth user",
            DiagnosticStep::ProfileRow => "Check profile row",
            DiagnosticStep::Consistency => "Check data consistency",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepairStep {
    DeleteRow,
    RecreateRow,
    VerifyRow,
}

impl RepairStep {
    pub const ALL: [RepairStep; 3] = [RepairStep::DeleteRow, RepairStep::RecreateRow, RepairStep::VerifyRow];

    pub fn title(&self) -> &'static str {
        match self {
            RepairStep::DeleteRow => "Delete conflicting profile",
            RepairStep::RecreateRow => "Recreate profile",
            RepairStep::VerifyRow => "Verify profile",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport<S> {
    pub step: S,
    pub status: StepStatus,
    pub message: Option<String>,
}

/// Ordered step states of a diagnosis or repair run.
///
/// Every step starts `Idle`; steps never reached stay that way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checklist<S> {
    reports: Vec<StepReport<S>>,
}

impl<S: Copy + PartialEq + fmt::Debug> Checklist<S> {
    pub fn new(steps: &[S]) -> Self {
        let reports =
            steps.iter().map(|step| StepReport { step: *step, status: StepStatus::Idle, message: None }).collect();
        Self { reports }
    }

    pub fn start(&mut self, step: S) {
        self.set(step, StepStatus::Loading, None);
    }

    pub fn finish(&mut self, step: S, status: StepStatus, message: impl Into<String>) {
        self.set(step, status, Some(message.into()));
    }

    pub fn status(&self, step: S) -> StepStatus {
        self.reports.iter().find(|r| r.step == step).map(|r| r.status).unwrap_or_default()
    }

    pub fn into_reports(self) -> Vec<StepReport<S>> {
        self.reports
    }

    fn set(&mut self, step: S, status: StepStatus, message: Option<String>) {
        if let Some(report) = self.reports.iter_mut().find(|r| r.step == step) {
            tracing::debug!(step = ?step, status = %status, "Step updated");
            report.status = status;
            report.message = message;
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Diagnosis {
    pub identity: Option<Identity>,
    pub profile: Option<UserProfile>,
    pub conflict_detected: bool,
    pub error: Option<String>,
    pub suggestion: Option<String>,
    pub steps: Vec<StepReport<DiagnosticStep>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RepairReport {
    pub success: bool,
    pub profile: Option<UserProfile>,
    pub error: Option<String>,
    pub steps: Vec<StepReport<RepairStep>>,
}
