//! Configuration management: defaults, validation, loading from the environment.

pub mod defaults;
pub mod merge_config;
pub mod validation;

pub use merge_config::MergeConfig;
