//! Key pair artifacts on disk
//!
//! A key directory holds `private.pem` (unencrypted PKCS#8) and
//! `public.pem` (SubjectPublicKeyInfo). The store only reads and writes the
//! files; it does no rotation, expiry or encryption.

use std::fs::{self, OpenOptions};
use std::io::Write;
#[cfg(unix)]
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
use std::path::{Path, PathBuf};

use powsig_core::{
    private_key_from_pem, public_key_from_pem, KeyError, KeyPair, RsaPrivateKey, RsaPublicKey,
    PRIVATE_KEY_FILE, PUBLIC_KEY_FILE,
};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum KeyStoreError {
    #[error("Failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Key file already exists at {}", .0.display())]
    AlreadyExists(PathBuf),

    #[error(transparent)]
    Key(#[from] KeyError),
}

/// A directory containing one key pair
#[derive(Debug, Clone)]
pub struct KeyStore {
    dir: PathBuf,
}

impl KeyStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn private_key_path(&self) -> PathBuf {
        self.dir.join(PRIVATE_KEY_FILE)
    }

    pub fn public_key_path(&self) -> PathBuf {
        self.dir.join(PUBLIC_KEY_FILE)
    }

    /// True if either artifact is present
    pub fn exists(&self) -> bool {
        self.private_key_path().exists() || self.public_key_path().exists()
    }

    /// Write both artifacts, creating the directory if needed.
    ///
    /// Refuses to replace existing files unless `overwrite` is set.
    pub fn save(&self, keys: &KeyPair, overwrite: bool) -> Result<(), KeyStoreError> {
        let private_path = self.private_key_path();
        let public_path = self.public_key_path();

        if !overwrite {
            for path in [&private_path, &public_path] {
                if path.exists() {
                    return Err(KeyStoreError::AlreadyExists(path.clone()));
                }
            }
        }

        self.ensure_dir()?;

        write_private_file(&private_path, &keys.private_key_pem()?)?;
        write_file(&public_path, &keys.public_key_pem()?)?;

        info!(dir = %self.dir.display(), "saved key pair");
        Ok(())
    }

    /// Create the key directory if it does not exist yet.
    pub fn ensure_dir(&self) -> Result<(), KeyStoreError> {
        fs::create_dir_all(&self.dir).map_err(|source| KeyStoreError::Io {
            path: self.dir.clone(),
            source,
        })
    }

    /// Load the private key and derive the public half from it.
    pub fn load_key_pair(&self) -> Result<KeyPair, KeyStoreError> {
        Ok(KeyPair::from_private_key(self.load_private_key()?))
    }

    pub fn load_private_key(&self) -> Result<RsaPrivateKey, KeyStoreError> {
        let pem = read_file(&self.private_key_path())?;
        Ok(private_key_from_pem(&pem)?)
    }

    pub fn load_public_key(&self) -> Result<RsaPublicKey, KeyStoreError> {
        let pem = read_file(&self.public_key_path())?;
        Ok(public_key_from_pem(&pem)?)
    }
}

fn read_file(path: &Path) -> Result<String, KeyStoreError> {
    fs::read_to_string(path).map_err(|source| KeyStoreError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write_file(path: &Path, contents: &str) -> Result<(), KeyStoreError> {
    fs::write(path, contents).map_err(|source| KeyStoreError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Write the private key readable by the owner only.
fn write_private_file(path: &Path, contents: &str) -> Result<(), KeyStoreError> {
    let io_err = |source| KeyStoreError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(0o600);

    let mut file = options.open(path).map_err(io_err)?;
    // `mode` only applies on creation; tighten a file that already existed
    #[cfg(unix)]
    file.set_permissions(fs::Permissions::from_mode(0o600))
        .map_err(io_err)?;
    file.write_all(contents.as_bytes()).map_err(io_err)
}

/// Get the default key directory
#[cfg(feature = "cli")]
pub fn default_key_dir() -> PathBuf {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".powsig")
}

/// Ensure the default key directory exists
#[cfg(feature = "cli")]
pub fn ensure_key_dir() -> Result<PathBuf, KeyStoreError> {
    let dir = default_key_dir();
    KeyStore::new(&dir).ensure_dir()?;
    Ok(dir)
}
