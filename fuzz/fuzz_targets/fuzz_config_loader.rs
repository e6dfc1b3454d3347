#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Parse and validation errors are fine; panics are not.
    if let Ok(cfg) = toml::from_str::<trainsign_config::Config>(data) {
        if cfg.validate().is_ok() {
            // A config that validates must resolve its own default line.
            assert!(cfg.line(&cfg.default_line).is_some());
        }
    }
});
