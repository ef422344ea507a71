pub mod arith;
pub mod check_spec;
pub mod drill;
pub mod init;
pub mod notes;
pub mod tables;
pub mod validate;
