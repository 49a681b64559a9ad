pub mod authn;
pub mod diagnostics;
pub mod profile;

pub mod prelude {
    pub use super::authn::*;
    pub use super::diagnostics::*;
    pub use super::profile::*;
}
