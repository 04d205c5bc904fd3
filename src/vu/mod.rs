//! Virtual users: per-user request context, the iteration loop, and the pool
//! the scheduler spawns into and retires from.
mod context;
mod executor;
mod pool;

#[cfg(test)]
mod tests;

pub use context::{RunContext, SCENARIO_TAG, STEP_TAG, VuContext};
pub use executor::VirtualUser;
pub use pool::{VuPool, VuStats};
