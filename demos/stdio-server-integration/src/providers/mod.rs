//! Provider Setup and Management
//!
//! This module handles the creation and configuration of all MCP providers.

pub mod setup;

pub use setup::create_test_environment;
