use std::fmt::{Display, Formatter, Result as FmtResult};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DriveError, DriveResult};

/// The authenticated user's handle; the ownership partition key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    /// Build an identity from a user name. Blank handles are never an identity.
    pub fn new(user_name: impl Into<String>) -> DriveResult<Self> {
        let user_name = user_name.into();
        let trimmed = user_name.trim();
        if trimmed.is_empty() {
            return Err(DriveError::AuthenticationRequired);
        }
        Ok(Identity(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Identity {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for Identity {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

/// Credential row owned by the authentication oracle.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct UserAccount {
    pub user_name: String,
    /// Lowercase hex SHA-256 digest of the secret
    #[serde(skip_serializing)]
    pub password_digest: String,
    pub created_at: DateTime<Utc>,
}

impl UserAccount {
    pub fn identity(&self) -> DriveResult<Identity> {
        Identity::new(self.user_name.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_rejects_blank() {
        assert!(matches!(
            Identity::new(""),
            Err(DriveError::AuthenticationRequired)
        ));
        assert!(matches!(
            Identity::new("   "),
            Err(DriveError::AuthenticationRequired)
        ));
    }

    #[test]
    fn test_identity_trims() {
        let identity = Identity::new("  alice ").unwrap();
        assert_eq!(identity.as_str(), "alice");
        assert_eq!(identity.to_string(), "alice");
    }
}
