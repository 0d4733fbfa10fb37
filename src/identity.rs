//! User identity resolution.
//!
//! The OAuth flow itself is external; an authenticated email reaches the
//! session through this ladder:
//! 1) CLI --user (explicit)
//! 2) TASKDECK_USER environment variable
//! 3) Persisted checkout value in .taskdeck/user
//! 4) Config default (identity.default) or "unknown"

use serde::Serialize;

use crate::config::Config;
use crate::roles::RoleRecord;
use crate::storage::Storage;

/// The acting user: email key plus display name.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Identity {
    pub email: String,
    pub name: String,
}

impl Identity {
    /// Build an identity from an email and the matching role row, falling
    /// back to the email's local part when the role carries no name.
    pub fn resolve(email: &str, role: Option<&RoleRecord>) -> Identity {
        let email = email.trim().to_lowercase();
        let name = role
            .map(|role| role.name.trim())
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| {
                email
                    .split('@')
                    .next()
                    .unwrap_or(email.as_str())
                    .to_string()
            });
        Identity { email, name }
    }
}

/// Resolve the current user email using CLI, environment, persisted value,
/// and config, in that order.
pub fn resolve_email(storage: &Storage, cli_user: Option<&str>, config: &Config) -> String {
    if let Some(user) = non_empty(cli_user) {
        return user.to_string();
    }

    if let Ok(env_user) = std::env::var("TASKDECK_USER") {
        if let Some(user) = non_empty(Some(env_user.as_str())) {
            return user.to_string();
        }
    }

    if let Some(user) = storage.read_user() {
        return user;
    }

    config.identity.default.clone()
}

fn non_empty(input: Option<&str>) -> Option<&str> {
    input.and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MirrorConfig;
    use crate::record::RawRow;

    fn storage(temp: &tempfile::TempDir) -> Storage {
        Storage::new(temp.path().to_path_buf(), &MirrorConfig::default())
    }

    #[test]
    fn cli_user_wins() {
        let temp = tempfile::tempdir().expect("tempdir");
        let storage = storage(&temp);
        storage.write_user("persisted@example.com").expect("write");

        let email = resolve_email(&storage, Some("cli@example.com"), &Config::default());
        assert_eq!(email, "cli@example.com");
    }

    #[test]
    fn persisted_user_beats_config_default() {
        let temp = tempfile::tempdir().expect("tempdir");
        let storage = storage(&temp);
        storage.write_user("persisted@example.com").expect("write");

        let email = resolve_email(&storage, None, &Config::default());
        assert_eq!(email, "persisted@example.com");
    }

    #[test]
    fn falls_back_to_config_default() {
        let temp = tempfile::tempdir().expect("tempdir");
        let storage = storage(&temp);

        let email = resolve_email(&storage, None, &Config::default());
        assert_eq!(email, "unknown");
    }

    #[test]
    fn identity_name_comes_from_role() {
        let mut raw = RawRow::new();
        raw.insert("Email".to_string(), "alice@example.com".to_string());
        raw.insert("Name".to_string(), "Alice Doe".to_string());
        let role = RoleRecord::from_raw(&raw).expect("role");

        let identity = Identity::resolve("Alice@Example.com", Some(&role));
        assert_eq!(identity.email, "alice@example.com");
        assert_eq!(identity.name, "Alice Doe");
    }

    #[test]
    fn identity_name_falls_back_to_local_part() {
        let identity = Identity::resolve("bob@example.com", None);
        assert_eq!(identity.name, "bob");
    }
}
