//! Release signing credentials
//!
//! Gradle reads the upload key for release builds from `key.properties` in
//! the Android root project. The file is kept out of version control, so it
//! is routinely absent on developer machines and CI runners that only build
//! debug variants. Loading therefore never fails on a missing file; the
//! credentials simply stay unset until something needs a release signing
//! config, at which point incomplete credentials are a configuration error.

use dersplan_core::error::{Error, ErrorCode, Result};
use dersplan_core::properties::{MalformedLinePolicy, Properties};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Property holding the key alias
pub const KEY_ALIAS: &str = "keyAlias";
/// Property holding the key password
pub const KEY_PASSWORD: &str = "keyPassword";
/// Property holding the key store path
pub const STORE_FILE: &str = "storeFile";
/// Property holding the key store password
pub const STORE_PASSWORD: &str = "storePassword";

/// Recognized keys in canonical order
pub const RECOGNIZED_KEYS: [&str; 4] = [KEY_ALIAS, KEY_PASSWORD, STORE_FILE, STORE_PASSWORD];

/// Name of the signing config the release build type references
pub const RELEASE_SIGNING_CONFIG: &str = "release";

/// Credentials read from `key.properties`. Every field is optional.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SigningCredentials {
    /// `keyAlias`
    pub key_alias: Option<String>,
    /// `keyPassword`
    pub key_password: Option<String>,
    /// `storeFile`, as written in the file
    pub store_file: Option<String>,
    /// `storePassword`
    pub store_password: Option<String>,
}

impl SigningCredentials {
    /// Credentials with every field set
    pub fn new(
        key_alias: impl Into<String>,
        key_password: impl Into<String>,
        store_file: impl Into<String>,
        store_password: impl Into<String>,
    ) -> Self {
        Self {
            key_alias: Some(key_alias.into()),
            key_password: Some(key_password.into()),
            store_file: Some(store_file.into()),
            store_password: Some(store_password.into()),
        }
    }

    /// Pick the recognized keys out of parsed properties; others are ignored
    pub fn from_properties(props: &Properties) -> Self {
        let take = |key: &str| props.get(key).map(str::to_string);
        Self {
            key_alias: take(KEY_ALIAS),
            key_password: take(KEY_PASSWORD),
            store_file: take(STORE_FILE),
            store_password: take(STORE_PASSWORD),
        }
    }

    /// Look up a field by its property name
    pub fn get(&self, key: &str) -> Option<&str> {
        match key {
            KEY_ALIAS => self.key_alias.as_deref(),
            KEY_PASSWORD => self.key_password.as_deref(),
            STORE_FILE => self.store_file.as_deref(),
            STORE_PASSWORD => self.store_password.as_deref(),
            _ => None,
        }
    }

    /// No field is set
    pub fn is_empty(&self) -> bool {
        RECOGNIZED_KEYS.iter().all(|key| self.get(key).is_none())
    }

    /// Recognized keys that are unset or blank, in canonical order
    pub fn missing_keys(&self) -> Vec<&'static str> {
        RECOGNIZED_KEYS
            .iter()
            .copied()
            .filter(|key| self.get(key).map_or(true, |v| v.trim().is_empty()))
            .collect()
    }

    /// Every field is set to a non-blank value
    pub fn is_complete(&self) -> bool {
        self.missing_keys().is_empty()
    }

    /// Build the `release` signing config.
    ///
    /// A relative `storeFile` resolves against `module_dir`, the directory of
    /// the app module whose build script declares the signing config.
    pub fn to_signing_config(&self, module_dir: &Path) -> Result<SigningConfig> {
        let missing = self.missing_keys();
        if !missing.is_empty() {
            return Err(Error::incomplete_credentials(&missing));
        }

        let (Some(key_alias), Some(key_password), Some(store_file), Some(store_password)) = (
            &self.key_alias,
            &self.key_password,
            &self.store_file,
            &self.store_password,
        ) else {
            return Err(Error::incomplete_credentials(&missing));
        };

        Ok(SigningConfig {
            name: RELEASE_SIGNING_CONFIG.to_string(),
            key_alias: key_alias.clone(),
            key_password: key_password.clone(),
            store_file: resolve_store_file(module_dir, store_file),
            store_password: store_password.clone(),
        })
    }

    /// Masked view safe to print or serialize
    pub fn summary(&self) -> CredentialsSummary {
        CredentialsSummary {
            key_alias: self.key_alias.clone(),
            key_password: self.key_password.as_deref().map(mask),
            store_file: self.store_file.clone(),
            store_password: self.store_password.as_deref().map(mask),
            complete: self.is_complete(),
            missing: self.missing_keys(),
        }
    }
}

impl fmt::Debug for SigningCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningCredentials")
            .field("key_alias", &self.key_alias)
            .field("key_password", &self.key_password.as_deref().map(mask))
            .field("store_file", &self.store_file)
            .field("store_password", &self.store_password.as_deref().map(mask))
            .finish()
    }
}

/// Printable credentials with passwords masked
#[derive(Debug, Clone, Serialize)]
pub struct CredentialsSummary {
    /// Key alias, shown as is
    pub key_alias: Option<String>,
    /// Masked key password
    pub key_password: Option<String>,
    /// Key store path, shown as is
    pub store_file: Option<String>,
    /// Masked store password
    pub store_password: Option<String>,
    /// All four values present
    pub complete: bool,
    /// Property names that are unset or blank
    pub missing: Vec<&'static str>,
}

/// Replace a secret with a fixed-width marker
pub fn mask(secret: &str) -> String {
    if secret.is_empty() {
        "(empty)".to_string()
    } else {
        "********".to_string()
    }
}

fn resolve_store_file(module_dir: &Path, store_file: &str) -> PathBuf {
    let path = Path::new(store_file);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        module_dir.join(path)
    }
}

/// Load credentials from a `key.properties` file.
///
/// A missing file yields empty credentials, not an error.
pub fn load_signing_credentials(
    path: &Path,
    policy: MalformedLinePolicy,
) -> Result<SigningCredentials> {
    let Some(props) = Properties::load(path, policy)? else {
        tracing::debug!(path = %path.display(), "no signing credentials file, using empty credentials");
        return Ok(SigningCredentials::default());
    };

    let credentials = SigningCredentials::from_properties(&props);
    tracing::debug!(
        path = %path.display(),
        complete = credentials.is_complete(),
        ignored = props.iter().filter(|(k, _)| !RECOGNIZED_KEYS.contains(k)).count(),
        "loaded signing credentials"
    );
    Ok(credentials)
}

/// A resolved signing configuration handed to the packaging step
#[derive(Clone, PartialEq, Eq)]
pub struct SigningConfig {
    /// Config name referenced by the build type
    pub name: String,
    /// Alias of the signing key
    pub key_alias: String,
    /// Password of the signing key
    pub key_password: String,
    /// Resolved key store path
    pub store_file: PathBuf,
    /// Password of the key store
    pub store_password: String,
}

impl fmt::Debug for SigningConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningConfig")
            .field("name", &self.name)
            .field("key_alias", &self.key_alias)
            .field("key_password", &mask(&self.key_password))
            .field("store_file", &self.store_file)
            .field("store_password", &mask(&self.store_password))
            .finish()
    }
}

/// Resolve release signing before packaging.
///
/// The release build type always references the `release` signing config,
/// so this fails when the credentials are incomplete or the key store file
/// is missing.
pub fn preflight_release(
    credentials: &SigningCredentials,
    module_dir: &Path,
) -> Result<SigningConfig> {
    let config = credentials.to_signing_config(module_dir)?;

    if !config.store_file.is_file() {
        return Err(Error::new(
            ErrorCode::KeystoreNotFound,
            format!("Key store not found: {}", config.store_file.display()),
        )
        .with_context(format!("{} is resolved relative to {}", STORE_FILE, module_dir.display()))
        .with_suggestion("Point storeFile at an existing .jks or .keystore file"));
    }

    tracing::debug!(store_file = %config.store_file.display(), "release signing resolved");
    Ok(config)
}
