use std::sync::Arc;

use app_core::config::Config;

use crate::usecase::authn::AuthnUseCase;
use crate::usecase::diagnostics::DiagnosticsUseCase;
use crate::usecase::profile::ProfileUseCase;

#[derive(Clone)]
pub struct AccountState {
    pub config: Arc<Config>,
    pub authn: Arc<dyn AuthnUseCase>,
    pub profile: Arc<dyn ProfileUseCase>,
    pub diagnostics: Arc<dyn DiagnosticsUseCase>,
}

impl AccountState {
    pub fn new(
        config: Arc<Config>,
        authn: Arc<dyn AuthnUseCase>,
        profile: Arc<dyn ProfileUseCase>,
        diagnostics: Arc<dyn DiagnosticsUseCase>,
    ) -> Self {
        Self { config, authn, profile, diagnostics }
    }
}

#[cfg(test)]
mod tests {
    use app_core::config::test_utils::TestConfigBuilder;

    use super::*;
    use crate::usecase::authn::MockAuthnUseCase;
    use crate::usecase::diagnostics::MockDiagnosticsUseCase;
    use crate::usecase::profile::MockProfileUseCase;

    #[test]
    fn test_account_state_new() {
        let authn: Arc<dyn AuthnUseCase> = Arc::new(MockAuthnUseCase::new());
        let profile: Arc<dyn ProfileUseCase> = Arc::new(MockProfileUseCase::new());
        let diagnostics: Arc<dyn DiagnosticsUseCase> = Arc::new(MockDiagnosticsUseCase::new());

        let config = Arc::new(TestConfigBuilder::new().with("auth.redirect_to", "https://zonehub.gg").build());

        let state = AccountState::new(config, authn.clone(), profile.clone(), diagnostics.clone());

        assert!(Arc::ptr_eq(&state.authn, &authn));
        assert!(Arc::ptr_eq(&state.profile, &profile));
        assert!(Arc::ptr_eq(&state.diagnostics, &diagnostics));
        assert_eq!(state.config.get::<String>("auth.redirect_to").unwrap(), "https://zonehub.gg");
    }
}
