//! CLI argument types and parsing helpers.
mod cli;
mod defaults;
pub(crate) mod parsers;
mod types;

#[cfg(test)]
mod test_support;

pub use cli::RunArgs;
pub use defaults::{
    DEFAULT_BASE_URL, DEFAULT_TOKEN_PATH, default_stages, default_thresholds,
};
pub use types::OutputFormat;

pub(crate) use parsers::parse_header;
#[cfg(test)]
pub(crate) use test_support::parse_test_args;
