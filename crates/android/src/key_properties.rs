//! `key.properties` generation
//!
//! Writes the credentials file that the release signing config is loaded
//! from. Only complete credentials are written.

use crate::signing::{SigningCredentials, KEY_ALIAS, KEY_PASSWORD, STORE_FILE, STORE_PASSWORD};
use dersplan_core::error::{Error, Result};
use dersplan_core::properties::encode_latin1;
use std::io::Write;
use std::path::Path;

/// Render credentials as `key.properties` content.
pub fn render_key_properties(credentials: &SigningCredentials) -> Result<String> {
    let missing = credentials.missing_keys();
    if !missing.is_empty() {
        return Err(Error::incomplete_credentials(&missing));
    }

    let mut content = String::new();
    for key in [STORE_PASSWORD, KEY_PASSWORD, KEY_ALIAS, STORE_FILE] {
        let value = credentials.get(key).unwrap_or_default();
        if value.contains(['\n', '\r']) {
            return Err(Error::validation(format!("{} must be a single line", key)));
        }
        if let Err(c) = encode_latin1(value) {
            return Err(Error::validation(format!(
                "{} contains '{}', which Gradle cannot read from key.properties (ISO-8859-1 only)",
                key, c
            )));
        }
        content.push_str(key);
        content.push('=');
        content.push_str(value);
        content.push('\n');
    }
    Ok(content)
}

/// Write `key.properties`, refusing to replace an existing file unless `force`.
pub fn write_key_properties(
    path: &Path,
    credentials: &SigningCredentials,
    force: bool,
) -> Result<()> {
    let content = render_key_properties(credentials)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.is_dir() {
            return Err(Error::new(
                dersplan_core::ErrorCode::DirectoryNotFound,
                format!("Android project directory not found: {}", parent.display()),
            )
            .with_suggestion("Run from the Flutter project root or pass --project-dir"));
        }
    }

    if path.exists() && !force {
        return Err(Error::file_exists(path));
    }

    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options
        .open(path)
        .map_err(|e| Error::from(e).with_context(format!("While writing {}", path.display())))?;
    let bytes = encode_latin1(&content)
        .map_err(|c| Error::validation(format!("Cannot encode '{}' as ISO-8859-1", c)))?;
    file.write_all(&bytes)?;

    tracing::debug!(path = %path.display(), "wrote key.properties");
    Ok(())
}

/// Remove `key.properties` if present. Returns whether a file was removed.
pub fn remove_key_properties(path: &Path) -> Result<bool> {
    if !path.exists() {
        return Ok(false);
    }
    std::fs::remove_file(path)
        .map_err(|e| Error::from(e).with_context(format!("While removing {}", path.display())))?;
    tracing::debug!(path = %path.display(), "removed key.properties");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signing::load_signing_credentials;
    use dersplan_core::error::ErrorCode;
    use dersplan_core::properties::MalformedLinePolicy;

    fn credentials() -> SigningCredentials {
        SigningCredentials::new("upload", "keypass", "/path/to/keystore.jks", "storepass")
    }

    #[test]
    fn test_render_key_properties() {
        let content = render_key_properties(&credentials()).unwrap();

        assert!(content.contains("storePassword=storepass\n"));
        assert!(content.contains("keyPassword=keypass\n"));
        assert!(content.contains("keyAlias=upload\n"));
        assert!(content.contains("storeFile=/path/to/keystore.jks\n"));
    }

    #[test]
    fn test_render_rejects_incomplete_credentials() {
        let err = render_key_properties(&SigningCredentials::default()).unwrap_err();
        assert_eq!(err.code, ErrorCode::IncompleteCredentials);
    }

    #[test]
    fn test_render_rejects_multiline_values() {
        let creds = SigningCredentials::new("upload", "a\nkeyAlias=evil", "s.jks", "s");
        let err = render_key_properties(&creds).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[test]
    fn test_written_file_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("key.properties");

        write_key_properties(&path, &credentials(), false).unwrap();
        let loaded = load_signing_credentials(&path, MalformedLinePolicy::Fail).unwrap();
        assert_eq!(loaded, credentials());
    }

    #[test]
    fn test_latin1_password_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("key.properties");
        let creds = SigningCredentials::new("upload", "caf\u{e9}", "upload.jks", "caf\u{e9}");

        write_key_properties(&path, &creds, false).unwrap();
        assert!(std::fs::read(&path).unwrap().windows(4).any(|w| w == b"caf\xE9"));
        let loaded = load_signing_credentials(&path, MalformedLinePolicy::Fail).unwrap();
        assert_eq!(loaded, creds);
    }

    #[test]
    fn test_render_rejects_characters_outside_latin1() {
        let creds = SigningCredentials::new("upload", "\u{20ac}uro", "upload.jks", "s");
        let err = render_key_properties(&creds).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(err.message.contains("keyPassword"));
    }

    #[test]
    fn test_write_refuses_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("key.properties");
        std::fs::write(&path, "keyAlias=old\n").unwrap();

        let err = write_key_properties(&path, &credentials(), false).unwrap_err();
        assert_eq!(err.code, ErrorCode::FileExists);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "keyAlias=old\n");

        write_key_properties(&path, &credentials(), true).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("keyAlias=upload"));
    }

    #[test]
    fn test_write_requires_project_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("android").join("key.properties");
        let err = write_key_properties(&path, &credentials(), false).unwrap_err();
        assert_eq!(err.code, ErrorCode::DirectoryNotFound);
    }

    #[cfg(unix)]
    #[test]
    fn test_written_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("key.properties");
        write_key_properties(&path, &credentials(), false).unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o077, 0);
    }

    #[test]
    fn test_remove_key_properties() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("key.properties");
        assert!(!remove_key_properties(&path).unwrap());

        write_key_properties(&path, &credentials(), false).unwrap();
        assert!(remove_key_properties(&path).unwrap());
        assert!(!path.exists());
    }
}
