use super::state::ServerState;
use crate::user::AuthTokenValue;
use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::IntoResponse,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};

pub const COOKIE_SESSION_TOKEN_KEY: &str = "session_token";
pub const HEADER_SESSION_TOKEN_KEY: &str = "Authorization";

/// An authenticated request context, extracted from the session cookie or the
/// Authorization header.
#[derive(Debug)]
pub struct Session {
    pub user_id: usize,
    pub email: String,
    pub token: AuthTokenValue,
}

pub enum ApiError {
    AccessDenied,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        match self {
            ApiError::AccessDenied => (StatusCode::FORBIDDEN, "Access denied").into_response(),
        }
    }
}

async fn extract_session_token(parts: &mut Parts, ctx: &ServerState) -> Option<AuthTokenValue> {
    let from_cookies = CookieJar::from_request_parts(parts, ctx)
        .await
        .ok()
        .and_then(|jar| {
            jar.get(COOKIE_SESSION_TOKEN_KEY)
                .map(Cookie::value)
                .map(|s| s.to_string())
        });
    let from_headers = || {
        parts
            .headers
            .get(HEADER_SESSION_TOKEN_KEY)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string())
    };
    from_cookies.or_else(from_headers).map(AuthTokenValue)
}

async fn extract_session(parts: &mut Parts, ctx: &ServerState) -> Option<Session> {
    let token = extract_session_token(parts, ctx).await?;
    ctx.user_manager.resolve_session(&token).map(|user| Session {
        user_id: user.user_id,
        email: user.email,
        token,
    })
}

impl FromRequestParts<ServerState> for Session {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        ctx: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        extract_session(parts, ctx).await.ok_or(ApiError::AccessDenied)
    }
}

impl FromRequestParts<ServerState> for Option<Session> {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        ctx: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        Ok(extract_session(parts, ctx).await)
    }
}
