pub mod entity;
pub mod inout;
