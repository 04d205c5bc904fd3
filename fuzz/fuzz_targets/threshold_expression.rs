#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        if let Ok(expr) = rampart::fuzzing::parse_threshold_expression_input(input) {
            debug_assert!(!expr.source().is_empty());
        }
        let _ = rampart::fuzzing::parse_threshold_arg_input(input);
    }
});
