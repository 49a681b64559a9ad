pub mod entity;
#[cfg(test)]
pub mod memory;
pub mod orm;
pub mod provider;
pub mod repository;
