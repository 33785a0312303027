/// TOML configuration loading and validation.
pub mod config;
/// Tracing subscriber setup.
pub mod logging;
