//! User accounts and login verification.
//!
//! Accounts live in `<data_dir>/users.json` with bcrypt password hashes. The
//! demo seed covers the four sample users.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{OrbitError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAccount {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// Account fields safe to hand to clients.
#[derive(Debug, Clone, Serialize)]
pub struct PublicUser {
    pub user_id: String,
    pub name: String,
    pub email: String,
}

impl From<&UserAccount> for PublicUser {
    fn from(account: &UserAccount) -> Self {
        Self {
            user_id: account.user_id.clone(),
            name: account.name.clone(),
            email: account.email.clone(),
        }
    }
}

pub struct UserDirectory {
    users: Vec<UserAccount>,
}

impl UserDirectory {
    /// Load accounts from `<dir>/users.json`. A missing file yields an empty
    /// directory; run the seed command to create the demo accounts.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let path = dir.as_ref().join("users.json");
        if !path.exists() {
            warn!(path = %path.display(), "users.json not found, starting with no accounts");
            return Ok(Self { users: Vec::new() });
        }
        let contents = std::fs::read_to_string(&path)?;
        let users: Vec<UserAccount> = serde_json::from_str(&contents)?;
        info!(users = users.len(), "user directory loaded");
        Ok(Self { users })
    }

    pub fn from_accounts(users: Vec<UserAccount>) -> Self {
        Self { users }
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn find_by_email(&self, email: &str) -> Option<&UserAccount> {
        self.users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
    }

    /// Verify credentials. Unknown emails and wrong passwords both come back
    /// as `Auth` errors with the same message.
    pub fn authenticate(&self, email: &str, password: &str) -> Result<PublicUser> {
        let account = self
            .find_by_email(email)
            .ok_or_else(|| OrbitError::Auth("invalid email or password".to_string()))?;

        let valid = bcrypt::verify(password, &account.password_hash)
            .map_err(|e| OrbitError::Auth(format!("password verification failed: {e}")))?;
        if !valid {
            return Err(OrbitError::Auth("invalid email or password".to_string()));
        }
        Ok(PublicUser::from(account))
    }
}

/// Write the demo accounts to `<dir>/users.json`. Existing files are left
/// alone.
pub fn seed_users(dir: impl AsRef<Path>) -> Result<usize> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)?;
    let path = dir.join("users.json");
    if path.exists() {
        info!(path = %path.display(), "users.json already exists, skipping seed");
        return Ok(0);
    }

    let demo: &[(&str, &str, &str, &str)] = &[
        ("U001", "Abhinav Kumar", "abhinav@example.com", "demo123"),
        ("U002", "Test User", "test@example.com", "test123"),
        ("U003", "Sneha Reddy", "sneha.reddy@workmail.com", "sneha123"),
        ("U004", "Rohan Sharma", "rohan.s@gmail.com", "rohan123"),
    ];

    let mut users = Vec::with_capacity(demo.len());
    for (user_id, name, email, password) in demo {
        let password_hash = bcrypt::hash(password, bcrypt::DEFAULT_COST)
            .map_err(|e| OrbitError::Auth(format!("hashing failed: {e}")))?;
        users.push(UserAccount {
            user_id: user_id.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            password_hash,
        });
    }

    std::fs::write(&path, serde_json::to_string_pretty(&users)?)?;
    info!(users = users.len(), path = %path.display(), "seeded demo users");
    Ok(users.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> UserDirectory {
        let hash = bcrypt::hash("demo123", 4).unwrap();
        UserDirectory::from_accounts(vec![UserAccount {
            user_id: "U001".to_string(),
            name: "Abhinav Kumar".to_string(),
            email: "abhinav@example.com".to_string(),
            password_hash: hash,
        }])
    }

    #[test]
    fn test_authenticate_success() {
        let user = directory()
            .authenticate("abhinav@example.com", "demo123")
            .unwrap();
        assert_eq!(user.user_id, "U001");
    }

    #[test]
    fn test_authenticate_is_case_insensitive_on_email() {
        assert!(directory()
            .authenticate("Abhinav@Example.com", "demo123")
            .is_ok());
    }

    #[test]
    fn test_authenticate_wrong_password() {
        let err = directory()
            .authenticate("abhinav@example.com", "nope")
            .unwrap_err();
        assert!(matches!(err, OrbitError::Auth(_)));
    }

    #[test]
    fn test_authenticate_unknown_email() {
        let err = directory().authenticate("ghost@example.com", "demo123").unwrap_err();
        // Same message for unknown email and bad password.
        assert_eq!(err.to_string(), "Auth error: invalid email or password");
    }

    #[test]
    fn test_seed_then_load_and_login() {
        let dir = tempfile::tempdir().unwrap();
        let count = seed_users(dir.path()).unwrap();
        assert_eq!(count, 4);
        // Second seed is a no-op.
        assert_eq!(seed_users(dir.path()).unwrap(), 0);

        let directory = UserDirectory::load(dir.path()).unwrap();
        assert_eq!(directory.len(), 4);
        let user = directory.authenticate("test@example.com", "test123").unwrap();
        assert_eq!(user.user_id, "U002");
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let directory = UserDirectory::load(dir.path()).unwrap();
        assert!(directory.is_empty());
    }
}
