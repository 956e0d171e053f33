/// The `config` module provides the site configuration
pub mod config;

/// The `error` module provides error handling
pub mod error;

/// The `traits` module provides the seams between modules
pub mod traits;
