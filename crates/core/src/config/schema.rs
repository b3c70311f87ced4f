//! Configuration schema definitions
//!
//! Defaults reproduce the lesson planner's Android build script, so an empty
//! or missing config file describes the shipped app.

use crate::properties::MalformedLinePolicy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration schema
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigSchema {
    #[serde(default)]
    pub android: AndroidConfig,

    #[serde(default)]
    pub app: AppConfig,
}

/// Android project layout and signing settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AndroidConfig {
    /// Android project directory (the Gradle root project)
    #[serde(default = "default_project_dir")]
    pub project_dir: PathBuf,

    /// Application module inside the project directory
    #[serde(default = "default_app_module")]
    pub app_module: String,

    /// Signing credentials file, relative to the project directory
    #[serde(default = "default_key_properties")]
    pub key_properties: String,

    /// Handling of malformed lines in the credentials file
    #[serde(default)]
    pub malformed_lines: MalformedLinePolicy,

    /// Treat a credentials file missing from .gitignore as an error
    #[serde(default = "default_true")]
    pub require_gitignore: bool,
}

impl Default for AndroidConfig {
    fn default() -> Self {
        Self {
            project_dir: default_project_dir(),
            app_module: default_app_module(),
            key_properties: default_key_properties(),
            malformed_lines: MalformedLinePolicy::default(),
            require_gitignore: true,
        }
    }
}

impl AndroidConfig {
    /// Path of the credentials file
    pub fn key_properties_path(&self) -> PathBuf {
        self.project_dir.join(&self.key_properties)
    }

    /// Path of the application module
    pub fn app_module_dir(&self) -> PathBuf {
        self.project_dir.join(&self.app_module)
    }
}

fn default_project_dir() -> PathBuf {
    PathBuf::from("android")
}

fn default_app_module() -> String {
    "app".to_string()
}

fn default_key_properties() -> String {
    "key.properties".to_string()
}

fn default_true() -> bool {
    true
}

/// Application build settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_application_id")]
    pub namespace: String,

    #[serde(default = "default_application_id")]
    pub application_id: String,

    #[serde(default = "default_sdk")]
    pub compile_sdk: u32,

    #[serde(default = "default_ndk_version")]
    pub ndk_version: String,

    #[serde(default = "default_min_sdk")]
    pub min_sdk: u32,

    #[serde(default = "default_sdk")]
    pub target_sdk: u32,

    #[serde(default = "default_version_code")]
    pub version_code: u32,

    #[serde(default = "default_version_name")]
    pub version_name: String,

    #[serde(default = "default_true")]
    pub multi_dex_enabled: bool,

    /// Java source/target compatibility and Kotlin JVM target
    #[serde(default = "default_java_version")]
    pub java_version: u8,

    #[serde(default = "default_true")]
    pub core_library_desugaring: bool,

    /// Flutter source directory, relative to the app module
    #[serde(default = "default_flutter_source")]
    pub flutter_source: String,

    #[serde(default)]
    pub release: ReleaseConfig,

    #[serde(default = "default_dependencies")]
    pub dependencies: Vec<DependencyConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            namespace: default_application_id(),
            application_id: default_application_id(),
            compile_sdk: default_sdk(),
            ndk_version: default_ndk_version(),
            min_sdk: default_min_sdk(),
            target_sdk: default_sdk(),
            version_code: default_version_code(),
            version_name: default_version_name(),
            multi_dex_enabled: true,
            java_version: default_java_version(),
            core_library_desugaring: true,
            flutter_source: default_flutter_source(),
            release: ReleaseConfig::default(),
            dependencies: default_dependencies(),
        }
    }
}

fn default_application_id() -> String {
    "com.raijumounun.dersplanlayici".to_string()
}

fn default_sdk() -> u32 {
    35
}

fn default_ndk_version() -> String {
    "27.0.12077973".to_string()
}

fn default_min_sdk() -> u32 {
    21
}

fn default_version_code() -> u32 {
    1
}

fn default_version_name() -> String {
    "1.0.0".to_string()
}

fn default_java_version() -> u8 {
    11
}

fn default_flutter_source() -> String {
    "../..".to_string()
}

fn default_dependencies() -> Vec<DependencyConfig> {
    vec![
        DependencyConfig::new("implementation", "androidx.window:window:1.0.0"),
        DependencyConfig::new("implementation", "androidx.window:window-java:1.0.0"),
        DependencyConfig::new(
            "coreLibraryDesugaring",
            "com.android.tools:desugar_jdk_libs:2.1.4",
        ),
    ]
}

/// Release build type settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseConfig {
    #[serde(default = "default_true")]
    pub minify_enabled: bool,

    #[serde(default = "default_proguard_files")]
    pub proguard_files: Vec<String>,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self {
            minify_enabled: true,
            proguard_files: default_proguard_files(),
        }
    }
}

fn default_proguard_files() -> Vec<String> {
    vec![
        "proguard-android-optimize.txt".to_string(),
        "proguard-rules.pro".to_string(),
    ]
}

/// A Gradle dependency declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyConfig {
    /// Gradle configuration, e.g. `implementation`
    pub configuration: String,
    /// Maven coordinates `group:artifact:version`
    pub notation: String,
}

impl DependencyConfig {
    pub fn new(configuration: impl Into<String>, notation: impl Into<String>) -> Self {
        Self {
            configuration: configuration.into(),
            notation: notation.into(),
        }
    }
}
