//! Configuration file loading

use super::schema::ConfigSchema;
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Configuration wrapper
#[derive(Debug, Clone)]
pub struct Config {
    pub schema: ConfigSchema,
    pub path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file path or use defaults.
    ///
    /// An explicit path must exist; without one the standard locations are
    /// searched and defaults apply when nothing is found.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) if !p.exists() => return Err(Error::config_not_found(p)),
            Some(p) => Some(p.to_path_buf()),
            None => find_config_file(Path::new(".")),
        };

        let schema = if let Some(ref p) = config_path {
            load_config_file(p)?
        } else {
            ConfigSchema::default()
        };

        tracing::debug!(
            path = ?config_path.as_ref().map(|p| p.display().to_string()),
            "configuration loaded"
        );

        Ok(Self {
            schema,
            path: config_path,
        })
    }

    /// Load with defaults only (no file)
    pub fn default() -> Self {
        Self {
            schema: ConfigSchema::default(),
            path: None,
        }
    }

    /// Serialize the effective configuration as TOML
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(&self.schema)?)
    }
}

/// Find configuration file in standard locations under `root`
fn find_config_file(root: &Path) -> Option<PathBuf> {
    let candidates = [".dersplan.toml", "dersplan.toml", ".config/dersplan.toml"];

    candidates
        .iter()
        .map(|candidate| root.join(candidate))
        .find(|path| path.exists())
}

/// Load and parse a TOML configuration file
fn load_config_file(path: &Path) -> Result<ConfigSchema> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::config(format!("Failed to read config file {}: {}", path.display(), e))
            .with_source(e)
    })?;

    toml::from_str(&content).map_err(|e| {
        Error::from(e).with_context(format!("While parsing {}", path.display()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::properties::MalformedLinePolicy;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.path.is_none());
        assert_eq!(config.schema.app.compile_sdk, 35);
        assert_eq!(config.schema.app.min_sdk, 21);
        assert_eq!(
            config.schema.android.key_properties_path(),
            PathBuf::from("android/key.properties")
        );
    }

    #[test]
    fn test_config_explicit_missing_file() {
        let err = Config::load(Some(Path::new("/nonexistent/dersplan.toml"))).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigNotFound);
    }

    #[test]
    fn test_config_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dersplan.toml");
        std::fs::write(
            &path,
            "[android]\nproject_dir = \"mobile/android\"\nmalformed_lines = \"fail\"\n\n[app]\nversion_code = 7\n",
        )
        .unwrap();

        let config = Config::load(Some(path.as_path())).unwrap();
        assert_eq!(config.schema.android.project_dir, PathBuf::from("mobile/android"));
        assert_eq!(config.schema.android.malformed_lines, MalformedLinePolicy::Fail);
        assert_eq!(config.schema.android.app_module, "app");
        assert_eq!(config.schema.app.version_code, 7);
        assert_eq!(config.schema.app.version_name, "1.0.0");
        assert_eq!(config.schema.app.dependencies.len(), 3);
    }

    #[test]
    fn test_config_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dersplan.toml");
        std::fs::write(&path, "[app\nversion_code = ").unwrap();

        let err = Config::load(Some(path.as_path())).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigParseError);
        assert!(err.context.is_some());
    }

    #[test]
    fn test_find_config_file_order() {
        let dir = tempfile::tempdir().unwrap();
        assert!(find_config_file(dir.path()).is_none());

        std::fs::write(dir.path().join("dersplan.toml"), "").unwrap();
        std::fs::write(dir.path().join(".dersplan.toml"), "").unwrap();
        assert_eq!(
            find_config_file(dir.path()),
            Some(dir.path().join(".dersplan.toml"))
        );
    }

    #[test]
    fn test_to_toml_round_trips() {
        let config = Config::default();
        let text = config.to_toml().unwrap();
        let parsed: ConfigSchema = toml::from_str(&text).unwrap();
        assert_eq!(parsed.app, config.schema.app);
    }
}
