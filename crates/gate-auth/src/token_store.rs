use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use gate_config::{StoreBackend, StoreConfig};

use crate::error::AuthError;

const CREDENTIALS_DIR_NAME: &str = "credentials";

/// The two credential slots a session uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialKind {
    Access,
    Refresh,
}

impl CredentialKind {
    pub const ALL: [Self; 2] = [Self::Access, Self::Refresh];

    /// Storage key of the slot.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Access => "access_token",
            Self::Refresh => "refresh_token",
        }
    }
}

/// Key/value storage for the access and refresh credentials.
///
/// Empty values read back as absent.
pub trait CredentialStore {
    /// # Errors
    ///
    /// Returns `AuthError::TokenStore` if the backend cannot be read.
    fn get(&self, kind: CredentialKind) -> Result<Option<String>, AuthError>;

    /// # Errors
    ///
    /// Returns `AuthError::TokenStore` if the backend cannot be written.
    fn set(&self, kind: CredentialKind, value: &str) -> Result<(), AuthError>;

    /// Removing an absent credential is not an error.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenStore` if the backend cannot be written.
    fn remove(&self, kind: CredentialKind) -> Result<(), AuthError>;

    /// Short name of the backend, for status display.
    fn backend_name(&self) -> &'static str;
}

impl<T: CredentialStore + ?Sized> CredentialStore for Box<T> {
    fn get(&self, kind: CredentialKind) -> Result<Option<String>, AuthError> {
        (**self).get(kind)
    }

    fn set(&self, kind: CredentialKind, value: &str) -> Result<(), AuthError> {
        (**self).set(kind, value)
    }

    fn remove(&self, kind: CredentialKind) -> Result<(), AuthError> {
        (**self).remove(kind)
    }

    fn backend_name(&self) -> &'static str {
        (**self).backend_name()
    }
}

/// Build the store selected by the configuration.
///
/// # Errors
///
/// Returns `AuthError::TokenStore` if no credentials directory can be resolved.
pub fn open(config: &StoreConfig) -> Result<Box<dyn CredentialStore>, AuthError> {
    let files = || -> Result<FileStore, AuthError> {
        let dir = match &config.credentials_dir {
            Some(dir) => dir.clone(),
            None => default_credentials_dir()?,
        };
        Ok(FileStore::new(dir))
    };

    Ok(match config.backend {
        StoreBackend::Keyring => Box::new(KeyringStore::new(config.keyring_service.clone(), files()?)),
        StoreBackend::File => Box::new(files()?),
        StoreBackend::Memory => Box::new(MemoryStore::new()),
    })
}

/// Clear both credential slots.
///
/// # Errors
///
/// Returns the first backend error encountered.
pub fn clear(store: &dyn CredentialStore) -> Result<(), AuthError> {
    for kind in CredentialKind::ALL {
        store.remove(kind)?;
    }
    Ok(())
}

/// `~/.gatehouse/credentials`.
///
/// # Errors
///
/// Returns `AuthError::TokenStore` if the home directory cannot be found.
pub fn default_credentials_dir() -> Result<PathBuf, AuthError> {
    dirs::home_dir()
        .map(|h| h.join(".gatehouse").join(CREDENTIALS_DIR_NAME))
        .ok_or_else(|| {
            AuthError::TokenStore("home directory not found; cannot store credentials".into())
        })
}

// --- Memory ---

/// In-process store; nothing outlives the value.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: Mutex<HashMap<CredentialKind, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a slot, for tests and embedding.
    #[must_use]
    pub fn with(self, kind: CredentialKind, value: &str) -> Self {
        if let Ok(mut slots) = self.slots.lock() {
            slots.insert(kind, value.to_string());
        }
        self
    }

    fn slots(&self) -> Result<std::sync::MutexGuard<'_, HashMap<CredentialKind, String>>, AuthError> {
        self.slots
            .lock()
            .map_err(|_| AuthError::TokenStore("memory store lock poisoned".into()))
    }
}

impl CredentialStore for MemoryStore {
    fn get(&self, kind: CredentialKind) -> Result<Option<String>, AuthError> {
        Ok(self.slots()?.get(&kind).filter(|v| !v.is_empty()).cloned())
    }

    fn set(&self, kind: CredentialKind, value: &str) -> Result<(), AuthError> {
        self.slots()?.insert(kind, value.to_string());
        Ok(())
    }

    fn remove(&self, kind: CredentialKind) -> Result<(), AuthError> {
        self.slots()?.remove(&kind);
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

// --- File ---

/// One file per credential under `dir`. Directory is `0700` and files `0600` on unix.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    #[must_use]
    pub const fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    #[must_use]
    pub fn path(&self, kind: CredentialKind) -> PathBuf {
        self.dir.join(kind.name())
    }
}

impl CredentialStore for FileStore {
    fn get(&self, kind: CredentialKind) -> Result<Option<String>, AuthError> {
        let path = self.path(kind);
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value.trim().to_string()).filter(|v| !v.is_empty())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AuthError::TokenStore(format!(
                "read {}: {e}",
                path.display()
            ))),
        }
    }

    fn set(&self, kind: CredentialKind, value: &str) -> Result<(), AuthError> {
        fs::create_dir_all(&self.dir).map_err(|e| {
            AuthError::TokenStore(format!("mkdir {}: {e}", self.dir.display()))
        })?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Err(e) = fs::set_permissions(&self.dir, fs::Permissions::from_mode(0o700)) {
                tracing::warn!("failed to chmod 0700 {}: {e}", self.dir.display());
            }
        }

        let path = self.path(kind);
        fs::write(&path, value)
            .map_err(|e| AuthError::TokenStore(format!("write {}: {e}", path.display())))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o600)).map_err(|e| {
                AuthError::TokenStore(format!("chmod {}: {e}", path.display()))
            })?;
        }

        Ok(())
    }

    fn remove(&self, kind: CredentialKind) -> Result<(), AuthError> {
        let path = self.path(kind);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AuthError::TokenStore(format!(
                "failed to delete {}: {e}",
                path.display()
            ))),
        }
    }

    fn backend_name(&self) -> &'static str {
        "file"
    }
}

// --- Keyring ---

/// OS keychain store. Falls back to a [`FileStore`] when the keychain is unavailable.
#[derive(Debug, Clone)]
pub struct KeyringStore {
    service: String,
    fallback: FileStore,
}

impl KeyringStore {
    #[must_use]
    pub const fn new(service: String, fallback: FileStore) -> Self {
        Self { service, fallback }
    }

    fn entry(&self, kind: CredentialKind) -> Result<keyring::Entry, AuthError> {
        keyring::Entry::new(&self.service, kind.name())
            .map_err(|e| AuthError::Keyring(e.to_string()))
    }
}

impl CredentialStore for KeyringStore {
    fn get(&self, kind: CredentialKind) -> Result<Option<String>, AuthError> {
        match self.entry(kind).map(|entry| entry.get_password()) {
            Ok(Ok(value)) if !value.is_empty() => Ok(Some(value)),
            Ok(Ok(_) | Err(keyring::Error::NoEntry)) => self.fallback.get(kind),
            Ok(Err(error)) => {
                tracing::warn!(%error, slot = kind.name(), "keyring read failed; trying file");
                self.fallback.get(kind)
            }
            Err(error) => {
                tracing::warn!(%error, "keyring unavailable; trying file");
                self.fallback.get(kind)
            }
        }
    }

    fn set(&self, kind: CredentialKind, value: &str) -> Result<(), AuthError> {
        match self.entry(kind) {
            Ok(entry) => match entry.set_password(value) {
                Ok(()) => Ok(()),
                Err(error) => {
                    tracing::warn!(%error, "keyring store failed; falling back to file");
                    self.fallback.set(kind, value)
                }
            },
            Err(error) => {
                tracing::warn!(%error, "keyring unavailable; falling back to file");
                self.fallback.set(kind, value)
            }
        }
    }

    fn remove(&self, kind: CredentialKind) -> Result<(), AuthError> {
        let fallback = self.fallback.remove(kind);
        // An unreachable keyring is never read either, so only the file copy matters then.
        if let Ok(entry) = self.entry(kind) {
            keyring_deleted(entry.delete_credential())?;
        }
        fallback
    }

    fn backend_name(&self) -> &'static str {
        "keyring"
    }
}

/// A missing entry counts as deleted; any other failure would leave the credential readable.
fn keyring_deleted(result: Result<(), keyring::Error>) -> Result<(), AuthError> {
    match result {
        Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
        Err(error) => Err(AuthError::Keyring(error.to_string())),
    }
}
