//! Integration tests for the HoodFan control core.
//!
//! Runs on the host target with mock adapters only.

mod app_service_tests;
mod mock_hw;
mod settings_tests;
