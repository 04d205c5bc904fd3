#![no_main]

use libfuzzer_sys::fuzz_target;
use rampart::config::types::ConfigFile;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        let parsed: Option<ConfigFile> = toml::from_str(input).ok();
        if rampart::fuzzing::apply_config_from_toml(input).is_ok()
            && let Some(stages) = parsed.and_then(|config| config.stages)
        {
            for stage in &stages {
                debug_assert!(stage.target >= 0);
            }
        }
    }
});
