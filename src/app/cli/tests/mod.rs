//! Tests for the CLI module
//!
//! Argument parsing, configuration loading and output rendering.

pub mod config_tests;
