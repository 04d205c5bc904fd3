#![no_main]

use std::time::Duration;

use libfuzzer_sys::fuzz_target;
use rampart::scheduler::Stage;

fuzz_target!(|data: (u16, Vec<(u32, u16, bool)>, u64)| {
    let (start, raw_stages, elapsed_ms) = data;
    let stages: Vec<Stage> = raw_stages
        .into_iter()
        .map(|(duration_ms, target, hold)| Stage {
            duration: Duration::from_millis(u64::from(duration_ms)),
            target: u64::from(target),
            hold,
        })
        .collect();
    let peak = stages
        .iter()
        .map(|stage| stage.target)
        .fold(u64::from(start), u64::max);
    let (running, stopping) = rampart::fuzzing::profile_targets(
        u64::from(start),
        stages,
        Duration::from_millis(elapsed_ms),
    );
    debug_assert!(running <= peak);
    debug_assert_eq!(stopping, 0);
});
