use super::auth::{AuthToken, AuthTokenValue, PasswordCredentials};
use anyhow::Result;

/// Storage backend for users, their password credentials and session tokens.
pub trait UserStore: Send + Sync {
    /// Creates a new user and returns its id. Fails on a duplicate email.
    fn create_user(&self, email: &str) -> Result<usize>;

    /// Returns the user id for an email, or Ok(None) if no such user exists.
    fn get_user_id(&self, email: &str) -> Result<Option<usize>>;

    /// Returns the email for a user id, or Ok(None) if no such user exists.
    fn get_user_email(&self, user_id: usize) -> Result<Option<String>>;

    /// Returns the user's password credentials, if any were set.
    fn get_password_credentials(&self, user_id: usize) -> Result<Option<PasswordCredentials>>;

    /// Creates or replaces the user's password credentials.
    fn set_password_credentials(&self, credentials: PasswordCredentials) -> Result<()>;

    /// Stores a new session token.
    fn add_auth_token(&self, token: AuthToken) -> Result<()>;

    /// Returns the stored token for a value, or Ok(None) if unknown.
    fn get_auth_token(&self, value: &AuthTokenValue) -> Result<Option<AuthToken>>;

    /// Deletes a token; reports whether it existed.
    fn delete_auth_token(&self, value: &AuthTokenValue) -> Result<bool>;

    /// Updates the token's last-used timestamp to now.
    fn touch_auth_token(&self, value: &AuthTokenValue) -> Result<()>;
}
