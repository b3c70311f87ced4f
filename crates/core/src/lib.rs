//! Core utilities for the Ders Planlayıcı Android tooling
//!
//! This crate provides shared functionality used by the Android tools:
//!
//! - **Error handling**: Structured errors with codes, context, and recovery suggestions
//! - **Properties files**: The `key=value` format Gradle reads credentials from
//! - **Configuration**: TOML-based tool configuration with defaults
//! - **Validation**: Collecting validator for configuration values
//! - **Process execution**: Running the Gradle wrapper and JDK tools
//!
//! # Example
//!
//! ```rust,no_run
//! use dersplan_core::config::Config;
//! use dersplan_core::properties::Properties;
//!
//! let config = Config::load(None).expect("invalid configuration");
//! let path = config.schema.android.key_properties_path();
//! match Properties::load(&path, config.schema.android.malformed_lines) {
//!     Ok(Some(props)) => println!("{} entries", props.len()),
//!     Ok(None) => println!("no credentials file"),
//!     Err(e) => eprintln!("{}", e),
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod process;
pub mod properties;
pub mod validation;

pub use error::{Error, ErrorCode, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::{exit_codes, Error, ErrorCode, Result};
    pub use crate::properties::{MalformedLinePolicy, Properties};
    pub use crate::validation::{ValidationResult, Validator};
}
