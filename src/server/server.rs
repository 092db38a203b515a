use anyhow::Result;
use std::time::{Duration, Instant};

use tracing::{error, info};

use crate::library::{AddSingerOutcome, LibraryError, SingerGroup};
use crate::library_store::SingerWithSongs;
use crate::user::AuthError;
use tower_http::services::ServeDir;

use axum::{
    body::Body,
    extract::{Path, State},
    http::{response, HeaderValue, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::session::COOKIE_SESSION_TOKEN_KEY;
use super::state::*;
use super::{log_requests, ServerConfig, Session};

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub session_token: Option<String>,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

#[derive(Deserialize, Debug)]
struct CredentialsBody {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, Debug)]
struct ChangePasswordBody {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Deserialize, Debug)]
struct AddSingerBody {
    pub singer_name: String,
    pub song_title: String,
}

#[derive(Deserialize, Debug)]
struct AddSongBody {
    pub title: String,
}

#[derive(Serialize)]
struct SignupSuccessResponse {
    user_id: usize,
}

#[derive(Serialize)]
struct LoginSuccessResponse {
    token: String,
}

#[derive(Serialize)]
struct MeResponse {
    user_id: usize,
    email: String,
}

#[derive(Serialize)]
struct AddSingerResponse {
    singer: SingerWithSongs,
    merged: bool,
}

#[derive(Serialize)]
struct LibraryView {
    groups: Vec<SingerGroup>,
    selected_singer_id: Option<usize>,
}

#[derive(Serialize)]
struct KaraokeLinkResponse {
    url: String,
}

fn auth_error_response(err: AuthError) -> Response {
    let status = match &err {
        AuthError::Validation(_) => StatusCode::BAD_REQUEST,
        AuthError::EmailTaken => StatusCode::CONFLICT,
        AuthError::InvalidCredentials => StatusCode::FORBIDDEN,
        AuthError::Backend(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, err.to_string()).into_response()
}

fn library_error_response(err: LibraryError) -> Response {
    let status = match &err {
        LibraryError::Validation(_) => StatusCode::BAD_REQUEST,
        LibraryError::NotFound(_) => StatusCode::NOT_FOUND,
        LibraryError::Backend(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, err.to_string()).into_response()
}

async fn home(session: Option<Session>, State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        session_token: session.map(|s| s.token.0),
    };
    Json(stats)
}

async fn signup(
    State(user_manager): State<GuardedUserManager>,
    Json(body): Json<CredentialsBody>,
) -> Response {
    match user_manager.sign_up(&body.email, &body.password) {
        Ok(user_id) => (
            StatusCode::CREATED,
            Json(SignupSuccessResponse { user_id }),
        )
            .into_response(),
        Err(err) => auth_error_response(err),
    }
}

async fn login(
    State(user_manager): State<GuardedUserManager>,
    Json(body): Json<CredentialsBody>,
) -> Response {
    let auth_token = match user_manager.sign_in(&body.email, &body.password) {
        Ok(auth_token) => auth_token,
        Err(err) => return auth_error_response(err),
    };

    let response_body = LoginSuccessResponse {
        token: auth_token.value.0.clone(),
    };
    let response_body = match serde_json::to_string(&response_body) {
        Ok(response_body) => response_body,
        Err(err) => {
            error!("Error serializing login response: {}", err);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let cookie_value = format!(
        "{}={}; Path=/; HttpOnly",
        COOKIE_SESSION_TOKEN_KEY, auth_token.value.0
    );
    match HeaderValue::from_str(&cookie_value) {
        Ok(cookie_value) => response::Builder::new()
            .status(StatusCode::CREATED)
            .header(axum::http::header::SET_COOKIE, cookie_value)
            .header(
                axum::http::header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            )
            .body(Body::from(response_body))
            .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response()),
        Err(err) => {
            error!("Error building session cookie: {}", err);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn logout(State(state): State<ServerState>, session: Session) -> Response {
    match state.user_manager.sign_out(&session.token) {
        Ok(_) => {
            state.library_manager.evict(session.user_id);
            let cookie_value = format!(
                "{}=; Path=/; HttpOnly; Max-Age=0",
                COOKIE_SESSION_TOKEN_KEY
            );
            response::Builder::new()
                .status(StatusCode::OK)
                .header(axum::http::header::SET_COOKIE, cookie_value)
                .body(Body::empty())
                .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
        }
        Err(err) => auth_error_response(err),
    }
}

async fn me(session: Session) -> Json<MeResponse> {
    Json(MeResponse {
        user_id: session.user_id,
        email: session.email,
    })
}

async fn change_password(
    session: Session,
    State(user_manager): State<GuardedUserManager>,
    Json(body): Json<ChangePasswordBody>,
) -> Response {
    match user_manager.change_password(
        session.user_id,
        &body.current_password,
        &body.new_password,
    ) {
        Ok(()) => StatusCode::OK.into_response(),
        Err(err) => auth_error_response(err),
    }
}

async fn get_library(
    session: Session,
    State(library_manager): State<GuardedLibraryManager>,
) -> Response {
    match library_manager.grouped(session.user_id) {
        Ok((groups, selected_singer_id)) => Json(LibraryView {
            groups,
            selected_singer_id,
        })
        .into_response(),
        Err(err) => library_error_response(err),
    }
}

async fn post_singer(
    session: Session,
    State(library_manager): State<GuardedLibraryManager>,
    Json(body): Json<AddSingerBody>,
) -> Response {
    match library_manager
        .add_singer_with_song(session.user_id, &body.singer_name, &body.song_title)
        .await
    {
        Ok(AddSingerOutcome { singer, merged }) => {
            (StatusCode::CREATED, Json(AddSingerResponse { singer, merged })).into_response()
        }
        Err(err) => library_error_response(err),
    }
}

async fn post_song(
    session: Session,
    State(library_manager): State<GuardedLibraryManager>,
    Path(singer_id): Path<usize>,
    Json(body): Json<AddSongBody>,
) -> Response {
    match library_manager.add_song(session.user_id, singer_id, &body.title) {
        Ok(singer) => (StatusCode::CREATED, Json(singer)).into_response(),
        Err(err) => library_error_response(err),
    }
}

async fn delete_singer(
    session: Session,
    State(library_manager): State<GuardedLibraryManager>,
    Path(singer_id): Path<usize>,
) -> Response {
    match library_manager.delete_singer(session.user_id, singer_id) {
        Ok(()) => StatusCode::OK.into_response(),
        Err(err) => library_error_response(err),
    }
}

async fn delete_song(
    session: Session,
    State(library_manager): State<GuardedLibraryManager>,
    Path(song_id): Path<usize>,
) -> Response {
    match library_manager.delete_song(session.user_id, song_id) {
        Ok(()) => StatusCode::OK.into_response(),
        Err(err) => library_error_response(err),
    }
}

async fn karaoke_link(
    session: Session,
    State(library_manager): State<GuardedLibraryManager>,
    Path(song_id): Path<usize>,
) -> Response {
    match library_manager.karaoke_link(session.user_id, song_id) {
        Ok(url) => Json(KaraokeLinkResponse { url }).into_response(),
        Err(err) => library_error_response(err),
    }
}

pub fn make_app(
    config: ServerConfig,
    library_manager: GuardedLibraryManager,
    user_manager: GuardedUserManager,
) -> Router {
    let state = ServerState {
        config: config.clone(),
        start_time: Instant::now(),
        library_manager,
        user_manager,
    };

    let auth_routes: Router = Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/logout", get(logout))
        .route("/me", get(me))
        .route("/password", put(change_password))
        .with_state(state.clone());

    let library_routes: Router = Router::new()
        .route("/", get(get_library))
        .route("/singers", post(post_singer))
        .route("/singers/{id}", delete(delete_singer))
        .route("/singers/{id}/songs", post(post_song))
        .route("/songs/{id}", delete(delete_song))
        .route("/songs/{id}/karaoke-link", get(karaoke_link))
        .with_state(state.clone());

    let home_router: Router = match &config.frontend_dir_path {
        Some(frontend_path) => {
            let static_files_service =
                ServeDir::new(frontend_path).append_index_html_on_directories(true);
            Router::new().fallback_service(static_files_service)
        }
        None => Router::new()
            .route("/", get(home))
            .with_state(state.clone()),
    };

    let app: Router = home_router
        .nest("/v1/auth", auth_routes)
        .nest("/v1/library", library_routes);

    app.layer(middleware::from_fn_with_state(state, log_requests))
}

pub async fn run_server(
    config: ServerConfig,
    library_manager: GuardedLibraryManager,
    user_manager: GuardedUserManager,
) -> Result<()> {
    let address = format!("127.0.0.1:{}", config.port);
    let app = make_app(config, library_manager, user_manager);

    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!("Listening on {}", address);

    Ok(axum::serve(listener, app).await?)
}
