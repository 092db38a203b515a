mod http_layers;
mod server;
mod session;
mod state;

pub use http_layers::{log_requests, RequestsLoggingLevel};
pub use server::{make_app, run_server};
pub use session::Session;
pub use state::ServerState;

#[derive(Clone, Debug, Default)]
pub struct ServerConfig {
    pub port: u16,
    pub requests_logging_level: RequestsLoggingLevel,
    pub frontend_dir_path: Option<String>,
}
