//! Storage layer for taskdeck state.
//!
//! All session state lives under a `.taskdeck/` directory next to the
//! project's `.taskdeck.toml`:
//!
//! ```text
//! .taskdeck/
//!   tasks.csv        # local mirror of the task table
//!   roles.csv        # role table (static policy, refreshable from remote)
//!   user             # persisted identity for this checkout
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::MirrorConfig;
use crate::error::{Error, Result};
use crate::lock::write_atomic;
use crate::mirror;

/// Name of the state directory
pub const STATE_DIR: &str = ".taskdeck";

/// Name of the config file at the project root
pub const CONFIG_FILE: &str = ".taskdeck.toml";

const USER_FILENAME: &str = "user";

/// Storage manager for taskdeck state
#[derive(Debug, Clone)]
pub struct Storage {
    /// Project root (where `.taskdeck.toml` lives)
    root: PathBuf,
    mirror_file: String,
    roles_file: String,
}

impl Storage {
    pub fn new(root: PathBuf, mirror: &MirrorConfig) -> Self {
        Self {
            root,
            mirror_file: mirror.file.clone(),
            roles_file: mirror.roles_file.clone(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path to the `.taskdeck/` state directory
    pub fn state_dir(&self) -> PathBuf {
        self.root.join(STATE_DIR)
    }

    /// Path to the task mirror file
    pub fn mirror_path(&self) -> PathBuf {
        self.state_dir().join(&self.mirror_file)
    }

    /// Path to the roles file
    pub fn roles_path(&self) -> PathBuf {
        self.state_dir().join(&self.roles_file)
    }

    /// Path to the persisted identity file
    pub fn user_file(&self) -> PathBuf {
        self.state_dir().join(USER_FILENAME)
    }

    /// Path to the config file for a project root
    pub fn config_path(root: &Path) -> PathBuf {
        root.join(CONFIG_FILE)
    }

    /// Create the state directory and a schema-only mirror if absent.
    /// Returns (created_dir, created_mirror).
    pub fn init(&self) -> Result<(bool, bool)> {
        let dir = self.state_dir();
        let created_dir = if dir.exists() {
            if !dir.is_dir() {
                return Err(Error::OperationFailed(format!(
                    "expected directory at {}",
                    dir.display()
                )));
            }
            false
        } else {
            fs::create_dir_all(&dir)?;
            true
        };

        let created_mirror = mirror::ensure_table_file(&self.mirror_path())?;
        Ok((created_dir, created_mirror))
    }

    pub fn is_initialized(&self) -> bool {
        self.state_dir().exists()
    }

    /// Require an initialized state dir, for commands that read/write state.
    pub fn ensure_initialized(&self) -> Result<()> {
        if self.is_initialized() {
            Ok(())
        } else {
            Err(Error::NotInitialized(self.root.clone()))
        }
    }

    // =========================================================================
    // Identity persistence
    // =========================================================================

    /// Read the persisted user identity for this checkout
    pub fn read_user(&self) -> Option<String> {
        let raw = fs::read_to_string(self.user_file()).ok()?;
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    /// Write the user identity for this checkout
    pub fn write_user(&self, email: &str) -> Result<()> {
        let email = email.trim();
        if email.is_empty() {
            return Err(Error::InvalidArgument(
                "user email cannot be empty".to_string(),
            ));
        }
        fs::create_dir_all(self.state_dir())?;
        write_atomic(self.user_file(), format!("{email}\n").as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn storage(temp: &TempDir) -> Storage {
        Storage::new(temp.path().to_path_buf(), &MirrorConfig::default())
    }

    #[test]
    fn paths_follow_config() {
        let temp = TempDir::new().unwrap();
        let custom = MirrorConfig {
            file: "backlog.csv".to_string(),
            roles_file: "people.csv".to_string(),
        };
        let storage = Storage::new(temp.path().to_path_buf(), &custom);

        assert_eq!(storage.state_dir(), temp.path().join(".taskdeck"));
        assert_eq!(
            storage.mirror_path(),
            temp.path().join(".taskdeck/backlog.csv")
        );
        assert_eq!(
            storage.roles_path(),
            temp.path().join(".taskdeck/people.csv")
        );
    }

    #[test]
    fn init_creates_dir_and_schema_mirror() {
        let temp = TempDir::new().unwrap();
        let storage = storage(&temp);

        assert!(!storage.is_initialized());
        let (created_dir, created_mirror) = storage.init().unwrap();
        assert!(created_dir);
        assert!(created_mirror);
        assert!(storage.mirror_path().exists());

        let (created_dir, created_mirror) = storage.init().unwrap();
        assert!(!created_dir);
        assert!(!created_mirror);
    }

    #[test]
    fn ensure_initialized_errors_before_init() {
        let temp = TempDir::new().unwrap();
        let storage = storage(&temp);

        assert!(matches!(
            storage.ensure_initialized(),
            Err(Error::NotInitialized(_))
        ));
        storage.init().unwrap();
        storage.ensure_initialized().unwrap();
    }

    #[test]
    fn user_persistence_round_trips() {
        let temp = TempDir::new().unwrap();
        let storage = storage(&temp);

        assert!(storage.read_user().is_none());
        storage.write_user("alice@example.com").unwrap();
        assert_eq!(storage.read_user().as_deref(), Some("alice@example.com"));
    }

    #[test]
    fn blank_user_rejected() {
        let temp = TempDir::new().unwrap();
        let storage = storage(&temp);
        assert!(storage.write_user("   ").is_err());
    }
}
