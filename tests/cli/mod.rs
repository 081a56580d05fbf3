//! CLI Integration Test Modules

pub mod argument_parsing;
pub mod state_file;
