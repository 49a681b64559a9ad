pub mod authn;
pub mod diagnostics;
pub mod profile;
