#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Parsing, validation and epoch parsing may reject input but never panic.
    if let Ok(cfg) = feeder_config::load_toml(data) {
        let _ = cfg.validate();
        let _ = cfg.clock.fallback_epoch();
    }
    let _ = feeder_config::parse_datetime(data);
});
