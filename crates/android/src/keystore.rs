//! Key store inspection

use dersplan_core::error::{Error, Result};
use serde::Serialize;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Key store container format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum KeystoreType {
    /// Java KeyStore
    Jks,
    /// PKCS#12
    Pkcs12,
}

impl std::fmt::Display for KeystoreType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Jks => write!(f, "JKS"),
            Self::Pkcs12 => write!(f, "PKCS12"),
        }
    }
}

const JKS_MAGIC: [u8; 4] = [0xFE, 0xED, 0xFE, 0xED];

/// Detect the key store type from its leading bytes.
///
/// JKS files start with `FEEDFEED`; anything else is treated as PKCS12,
/// which keytool uses by default since JDK 9.
pub fn detect_keystore_type(data: &[u8]) -> KeystoreType {
    if data.starts_with(&JKS_MAGIC) {
        KeystoreType::Jks
    } else {
        KeystoreType::Pkcs12
    }
}

/// What is known about a key store file without opening it with keytool
#[derive(Debug, Clone, Serialize)]
pub struct KeystoreInfo {
    /// Inspected file
    pub path: PathBuf,
    /// Format detected from the header
    pub keystore_type: KeystoreType,
    /// File size
    pub size_bytes: u64,
}

/// Inspect a key store file
pub fn inspect_keystore(path: &Path) -> Result<KeystoreInfo> {
    if !path.is_file() {
        return Err(Error::new(
            dersplan_core::ErrorCode::KeystoreNotFound,
            format!("Key store not found: {}", path.display()),
        ));
    }

    let mut file = std::fs::File::open(path)?;
    let size_bytes = file.metadata()?.len();
    if size_bytes == 0 {
        return Err(Error::signing(format!("Key store is empty: {}", path.display())));
    }

    let mut header = Vec::with_capacity(JKS_MAGIC.len());
    file.by_ref().take(JKS_MAGIC.len() as u64).read_to_end(&mut header)?;

    Ok(KeystoreInfo {
        path: path.to_path_buf(),
        keystore_type: detect_keystore_type(&header),
        size_bytes,
    })
}
