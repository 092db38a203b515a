use super::ServerConfig;
use crate::library::LibraryManager;
use crate::user::UserManager;
use axum::extract::FromRef;
use std::sync::Arc;
use std::time::Instant;

pub type GuardedLibraryManager = Arc<LibraryManager>;
pub type GuardedUserManager = Arc<UserManager>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub library_manager: GuardedLibraryManager,
    pub user_manager: GuardedUserManager,
}

impl FromRef<ServerState> for GuardedLibraryManager {
    fn from_ref(input: &ServerState) -> Self {
        input.library_manager.clone()
    }
}

impl FromRef<ServerState> for GuardedUserManager {
    fn from_ref(input: &ServerState) -> Self {
        input.user_manager.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
