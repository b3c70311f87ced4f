//! Configuration loading and schema definitions
//!
//! Tool configuration for the Android project: layout, signing settings and
//! application build values.

mod loader;
mod schema;

pub use loader::Config;
pub use schema::*;
