//! CLI command implementations

pub mod config;
pub mod doctor;
pub mod handles;
pub mod run;
pub mod status;
pub mod subscribe;
