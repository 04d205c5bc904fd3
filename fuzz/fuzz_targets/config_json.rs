#![no_main]

use libfuzzer_sys::fuzz_target;
use rampart::config::types::ConfigFile;

fuzz_target!(|data: &[u8]| {
    let parsed: Option<ConfigFile> = serde_json::from_slice(data).ok();
    if rampart::fuzzing::apply_config_from_json(data).is_ok()
        && let Some(start_vus) = parsed.and_then(|config| config.start_vus)
    {
        debug_assert!(start_vus >= 0);
    }
});
