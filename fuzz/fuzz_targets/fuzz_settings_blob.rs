//! Fuzz target: persisted settings blob
//!
//! Writes arbitrary bytes into the settings slot of the host NVS backend
//! and loads them back.  Verifies:
//! - No panics on corrupted or truncated blobs
//! - Anything that loads successfully passes validation and re-saves
//!
//! cargo fuzz run fuzz_settings_blob

#![no_main]

use hoodfan::adapters::nvs::NvsAdapter;
use hoodfan::app::ports::{ConfigPort, StoragePort};
use hoodfan::config::validate_config;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut nvs = NvsAdapter::new();
    if nvs.write("hoodfan", "settings", data).is_err() {
        return;
    }
    if let Ok(cfg) = nvs.load() {
        assert!(validate_config(&cfg).is_ok());
        assert!(nvs.save(&cfg).is_ok());
        assert_eq!(nvs.load().ok(), Some(cfg));
    }
});
