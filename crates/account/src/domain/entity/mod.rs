pub mod diagnosis;
pub mod identity;
pub mod profile;
