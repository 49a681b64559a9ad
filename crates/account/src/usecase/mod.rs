pub mod authn;
pub mod cache;
pub mod diagnostics;
pub mod profile;
