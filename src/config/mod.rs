//! Configuration loading, merging with CLI flags, and validation.
mod apply;
mod loader;
mod parse;
mod run_config;
pub mod types;


pub use apply::apply_config;
pub use loader::{DEFAULT_CONFIG_FILES, load_config};
pub use run_config::RunConfig;

#[cfg(test)]
pub(crate) use loader::load_config_file;
pub(crate) use parse::{parse_duration_or_zero, parse_duration_value};
