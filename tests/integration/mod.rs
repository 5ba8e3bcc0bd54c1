//! Integration tests for the context synchronization client

mod config_integration;
mod context_registry;
mod policy_validation;
mod session_sync;
mod test_utils;
