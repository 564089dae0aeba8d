pub mod analyze;
pub mod config;
pub mod details;
pub mod permissions;
pub mod registry;
