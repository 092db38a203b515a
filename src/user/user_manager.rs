use super::auth::{AuthToken, AuthTokenValue, PasswordCredentials};
use super::user_store::UserStore;
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

const MIN_PASSWORD_LENGTH: usize = 6;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),
    #[error("A user with this email already exists")]
    EmailTaken,
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("{0}")]
    Backend(String),
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        AuthError::Backend(err.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct SessionUser {
    pub user_id: usize,
    pub email: String,
}

pub struct UserManager {
    user_store: Arc<dyn UserStore>,
}

impl UserManager {
    pub fn new(user_store: Arc<dyn UserStore>) -> Self {
        Self { user_store }
    }

    fn validate_password(password: &str) -> Result<(), AuthError> {
        if password.len() < MIN_PASSWORD_LENGTH {
            return Err(AuthError::Validation(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            )));
        }
        Ok(())
    }

    /// Creates a user with password credentials. Emails are normalized to
    /// lowercase so sign-in is case-insensitive.
    pub fn sign_up(&self, email: &str, password: &str) -> Result<usize, AuthError> {
        let email = email.trim().to_lowercase();
        if email.is_empty() || !email.contains('@') {
            return Err(AuthError::Validation(
                "A valid email address is required".to_string(),
            ));
        }
        Self::validate_password(password)?;

        if self.user_store.get_user_id(&email)?.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let user_id = self.user_store.create_user(&email)?;
        self.user_store
            .set_password_credentials(PasswordCredentials::from_plain(user_id, password)?)?;
        Ok(user_id)
    }

    /// Verifies the credentials and issues a new session token.
    pub fn sign_in(&self, email: &str, password: &str) -> Result<AuthToken, AuthError> {
        let email = email.trim().to_lowercase();
        let user_id = self
            .user_store
            .get_user_id(&email)?
            .ok_or(AuthError::InvalidCredentials)?;
        let credentials = self
            .user_store
            .get_password_credentials(user_id)?
            .ok_or(AuthError::InvalidCredentials)?;
        if !credentials.verify(password)? {
            return Err(AuthError::InvalidCredentials);
        }

        let token = AuthToken::new_for_user(user_id);
        self.user_store.add_auth_token(token.clone())?;
        Ok(token)
    }

    /// Invalidates a session token. Reports whether the token existed.
    pub fn sign_out(&self, token: &AuthTokenValue) -> Result<bool, AuthError> {
        Ok(self.user_store.delete_auth_token(token)?)
    }

    /// Resolves a session token to its user. Store errors resolve to `None`
    /// since an unverifiable session is no session.
    pub fn resolve_session(&self, token: &AuthTokenValue) -> Option<SessionUser> {
        let stored = match self.user_store.get_auth_token(token) {
            Ok(stored) => stored?,
            Err(err) => {
                warn!("Could not look up auth token: {}", err);
                return None;
            }
        };
        if let Err(err) = self.user_store.touch_auth_token(token) {
            warn!("Could not update token last-used timestamp: {}", err);
        }
        let email = match self.user_store.get_user_email(stored.user_id) {
            Ok(email) => email?,
            Err(err) => {
                warn!("Could not look up user {}: {}", stored.user_id, err);
                return None;
            }
        };
        Some(SessionUser {
            user_id: stored.user_id,
            email,
        })
    }

    /// Replaces the user's password after verifying the current one.
    pub fn change_password(
        &self,
        user_id: usize,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        Self::validate_password(new_password)?;
        let credentials = self
            .user_store
            .get_password_credentials(user_id)?
            .ok_or(AuthError::InvalidCredentials)?;
        if !credentials.verify(current_password)? {
            return Err(AuthError::InvalidCredentials);
        }
        self.user_store
            .set_password_credentials(PasswordCredentials::from_plain(user_id, new_password)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::SqliteUserStore;
    use tempfile::TempDir;

    fn create_test_manager() -> (UserManager, TempDir) {
        let tmp = TempDir::new().unwrap();
        let store = Arc::new(SqliteUserStore::new(tmp.path().join("user.db")).unwrap());
        (UserManager::new(store), tmp)
    }

    #[test]
    fn sign_up_then_sign_in_resolves_a_session() {
        let (manager, _tmp) = create_test_manager();
        let user_id = manager.sign_up("Dana@Example.com", "s3cret-password").unwrap();

        // Email matching is case-insensitive.
        let token = manager.sign_in("dana@example.COM", "s3cret-password").unwrap();
        let session = manager.resolve_session(&token.value).unwrap();
        assert_eq!(session.user_id, user_id);
        assert_eq!(session.email, "dana@example.com");
    }

    #[test]
    fn wrong_password_is_rejected() {
        let (manager, _tmp) = create_test_manager();
        manager.sign_up("dana@example.com", "s3cret-password").unwrap();
        assert!(matches!(
            manager.sign_in("dana@example.com", "wrong"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn duplicate_email_is_rejected() {
        let (manager, _tmp) = create_test_manager();
        manager.sign_up("dana@example.com", "s3cret-password").unwrap();
        assert!(matches!(
            manager.sign_up("DANA@example.com", "another-password"),
            Err(AuthError::EmailTaken)
        ));
    }

    #[test]
    fn invalid_signup_fields_are_rejected() {
        let (manager, _tmp) = create_test_manager();
        assert!(matches!(
            manager.sign_up("not-an-email", "s3cret-password"),
            Err(AuthError::Validation(_))
        ));
        assert!(matches!(
            manager.sign_up("dana@example.com", "short"),
            Err(AuthError::Validation(_))
        ));
    }

    #[test]
    fn sign_out_invalidates_the_session() {
        let (manager, _tmp) = create_test_manager();
        manager.sign_up("dana@example.com", "s3cret-password").unwrap();
        let token = manager.sign_in("dana@example.com", "s3cret-password").unwrap();

        assert!(manager.sign_out(&token.value).unwrap());
        assert!(manager.resolve_session(&token.value).is_none());
        assert!(!manager.sign_out(&token.value).unwrap());
    }

    #[test]
    fn change_password_requires_the_current_one() {
        let (manager, _tmp) = create_test_manager();
        let user_id = manager.sign_up("dana@example.com", "s3cret-password").unwrap();

        assert!(matches!(
            manager.change_password(user_id, "wrong", "new-password"),
            Err(AuthError::InvalidCredentials)
        ));

        manager
            .change_password(user_id, "s3cret-password", "new-password")
            .unwrap();
        assert!(manager.sign_in("dana@example.com", "new-password").is_ok());
        assert!(manager.sign_in("dana@example.com", "s3cret-password").is_err());
    }
}
