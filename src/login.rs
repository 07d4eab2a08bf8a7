/*!
 * Login validation for mutating requests.
 *
 * Credentials come from configuration as a user name and the hex SHA-256
 * digest of the password. Submitted passwords are hashed and compared to
 * the stored digest.
 */

use async_trait::async_trait;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt::Debug;

use crate::app_config::UserCredentials;
use crate::errors::AuthError;

/// Proof of a successful login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginGrant {
    pub user: String,
}

/// Decides whether a user/password pair may mutate data
#[async_trait]
pub trait LoginValidator: Send + Sync + Debug {
    /// Validate a credential pair
    async fn validate(&self, user: &str, pass: &str) -> Result<LoginGrant, AuthError>;
}

/// Hex-encoded SHA-256 digest of a password
pub fn hash_password(pass: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(pass.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Validator over a fixed set of configured users
#[derive(Debug, Clone, Default)]
pub struct SimpleLoginValidator {
    // user -> lowercase hex digest
    users: HashMap<String, String>,
}

impl SimpleLoginValidator {
    /// Build from configured credentials
    pub fn new(credentials: &[UserCredentials]) -> Self {
        let users = credentials
            .iter()
            .map(|c| (c.user.clone(), c.pass_sha256.trim().to_lowercase()))
            .collect();
        Self { users }
    }

    /// Add a user with a plain text password
    pub fn with_user(mut self, user: impl Into<String>, pass: &str) -> Self {
        self.users.insert(user.into(), hash_password(pass));
        self
    }

    /// Number of known users
    pub fn user_count(&self) -> usize {
        self.users.len()
    }
}

#[async_trait]
impl LoginValidator for SimpleLoginValidator {
    async fn validate(&self, user: &str, pass: &str) -> Result<LoginGrant, AuthError> {
        if user.is_empty() || pass.is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        match self.users.get(user) {
            Some(digest) if *digest == hash_password(pass) => {
                debug!("Login accepted for user '{}'", user);
                Ok(LoginGrant {
                    user: user.to_string(),
                })
            }
            _ => {
                warn!("Login rejected for user '{}'", user);
                Err(AuthError::InvalidCredentials(user.to_string()))
            }
        }
    }
}
