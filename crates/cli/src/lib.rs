//! Terminal helpers for the Ders Planlayıcı Android tooling
//!
//! - Status messages
//! - Key/value listings with masked secrets
//! - Spinners for long-running Gradle tasks

#![warn(missing_docs)]

pub mod output;
pub mod progress;
