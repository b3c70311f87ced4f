//! Android build tools for Ders Planlayıcı
//!
//! This crate provides Android-specific functionality:
//! - Release signing credentials from `key.properties`
//! - `key.properties` generation and key store inspection
//! - Version control checks for the credentials file
//! - Build configuration validation and `build.gradle.kts` rendering
//! - Gradle build system integration

#![warn(missing_docs)]

pub mod build_config;
pub mod gradle;
pub mod key_properties;
pub mod keystore;
pub mod signing;
pub mod vcs;

pub use signing::{load_signing_credentials, SigningConfig, SigningCredentials};
