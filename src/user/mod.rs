mod auth;
mod sqlite_user_store;
mod user_manager;
mod user_store;

pub use auth::{AuthToken, AuthTokenValue, PasswordCredentials, PasswordHasherKind};
pub use sqlite_user_store::SqliteUserStore;
pub use user_manager::{AuthError, SessionUser, UserManager};
pub use user_store::UserStore;
