//! Gradle build system integration
//!
//! Provides wrappers for the Gradle tasks used to package the app. Release
//! tasks resolve signing first so a missing or incomplete `key.properties`
//! is reported before Gradle starts.

use crate::signing::{load_signing_credentials, preflight_release};
use dersplan_core::config::AndroidConfig;
use dersplan_core::error::{Error, ErrorCode, Result};
use dersplan_core::process::{run_command_in_dir, CommandResult};
use std::fmt;
use std::path::{Path, PathBuf};

/// Build variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildType {
    /// Debug-signed development build
    Debug,
    /// Distributable build signed with the `release` config
    Release,
}

impl fmt::Display for BuildType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Debug => write!(f, "debug"),
            Self::Release => write!(f, "release"),
        }
    }
}

/// Packaged output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Artifact {
    /// APK via `assemble*`
    Apk,
    /// App bundle (AAB) via `bundle*`
    Bundle,
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Apk => write!(f, "APK"),
            Self::Bundle => write!(f, "bundle"),
        }
    }
}

/// Gradle task name for a variant and artifact
pub fn task_name(build_type: BuildType, artifact: Artifact) -> &'static str {
    match (artifact, build_type) {
        (Artifact::Apk, BuildType::Debug) => "assembleDebug",
        (Artifact::Apk, BuildType::Release) => "assembleRelease",
        (Artifact::Bundle, BuildType::Debug) => "bundleDebug",
        (Artifact::Bundle, BuildType::Release) => "bundleRelease",
    }
}

/// Path of the Gradle wrapper script in a project
pub fn wrapper_path(project_dir: &Path) -> PathBuf {
    if cfg!(windows) {
        project_dir.join("gradlew.bat")
    } else {
        project_dir.join("gradlew")
    }
}

/// Whether the project has a Gradle wrapper
pub fn has_wrapper(project_dir: &Path) -> bool {
    wrapper_path(project_dir).is_file()
}

/// Run a Gradle task
pub fn run_task(project_dir: &Path, task: &str) -> Result<CommandResult> {
    if !has_wrapper(project_dir) {
        return Err(Error::new(
            ErrorCode::CommandNotFound,
            format!("Gradle wrapper not found in {}", project_dir.display()),
        )
        .with_suggestion("Run `flutter build apk` once to generate the Android wrapper"));
    }

    // The child runs in `project_dir`, so a relative program path would resolve twice.
    let wrapper = std::path::absolute(wrapper_path(project_dir))?;

    tracing::info!(task, wrapper = %wrapper.display(), "running gradle task");
    run_command_in_dir(&wrapper.to_string_lossy(), &[task], project_dir)
}

/// Build the app, resolving release signing first for release variants
pub fn build(
    android: &AndroidConfig,
    build_type: BuildType,
    artifact: Artifact,
) -> Result<CommandResult> {
    if build_type == BuildType::Release {
        let credentials =
            load_signing_credentials(&android.key_properties_path(), android.malformed_lines)?;
        preflight_release(&credentials, &android.app_module_dir())?;
    }

    run_task(&android.project_dir, task_name(build_type, artifact))
}

/// Clean build artifacts
pub fn clean(project_dir: &Path) -> Result<CommandResult> {
    run_task(project_dir, "clean")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_names() {
        assert_eq!(task_name(BuildType::Debug, Artifact::Apk), "assembleDebug");
        assert_eq!(task_name(BuildType::Release, Artifact::Apk), "assembleRelease");
        assert_eq!(task_name(BuildType::Debug, Artifact::Bundle), "bundleDebug");
        assert_eq!(task_name(BuildType::Release, Artifact::Bundle), "bundleRelease");
    }

    #[test]
    fn test_gradle_wrapper_path() {
        let path = wrapper_path(Path::new("android"));
        assert!(path.starts_with("android"));
        assert!(path.to_string_lossy().contains("gradlew"));
    }

    #[test]
    fn test_run_task_without_wrapper() {
        let dir = tempfile::tempdir().unwrap();
        let err = run_task(dir.path(), "clean").unwrap_err();
        assert_eq!(err.code, ErrorCode::CommandNotFound);
    }

    #[cfg(unix)]
    #[test]
    fn test_run_task_invokes_project_wrapper() {
        use std::os::unix::fs::PermissionsExt;

        let root = tempfile::tempdir().unwrap();
        let project = root.path().join("android");
        std::fs::create_dir(&project).unwrap();
        let wrapper = wrapper_path(&project);
        std::fs::write(&wrapper, "#!/bin/sh\necho \"task $1 in $(pwd)\"\n").unwrap();
        std::fs::set_permissions(&wrapper, std::fs::Permissions::from_mode(0o755)).unwrap();

        let result = run_task(&project, "assembleDebug").unwrap();
        assert!(result.success);
        assert!(result.stdout.contains("task assembleDebug in"));
        assert!(result.stdout.trim_end().ends_with("android"));
    }

    #[test]
    fn test_release_build_fails_before_gradle_without_credentials() {
        let dir = tempfile::tempdir().unwrap();
        let android = AndroidConfig {
            project_dir: dir.path().to_path_buf(),
            ..AndroidConfig::default()
        };

        let err = build(&android, BuildType::Release, Artifact::Bundle).unwrap_err();
        assert_eq!(err.code, ErrorCode::IncompleteCredentials);
    }

    #[test]
    fn test_debug_build_skips_signing() {
        let dir = tempfile::tempdir().unwrap();
        let android = AndroidConfig {
            project_dir: dir.path().to_path_buf(),
            ..AndroidConfig::default()
        };

        // No wrapper, so it fails at Gradle, not at signing.
        let err = build(&android, BuildType::Debug, Artifact::Apk).unwrap_err();
        assert_eq!(err.code, ErrorCode::CommandNotFound);
    }
}
