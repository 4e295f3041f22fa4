use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::auth::verify_token;
use crate::error::{ApiError, ApiResult};
use crate::{AppState, run_blocking};

/// Extract and validate the session token from the Authorization header.
///
/// The token must verify against the server secret and must still be the one
/// stored on its user: a later login supersedes it.
pub async fn require_auth(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> ApiResult<Response> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(ApiError::Unauthorized)?
        .to_string();

    let claims = verify_token(&state.jwt_secret, &token).map_err(|e| {
        debug!("Rejected session token: {}", e);
        ApiError::Unauthorized
    })?;

    let user_id = claims.sub.clone();
    let stored = run_blocking(&state, move |s| Ok(s.db.get_user_by_id(&user_id)?)).await?;

    match stored.and_then(|user| user.token) {
        Some(current) if current == token => {}
        _ => {
            debug!("Session token for user {} is no longer current", claims.sub);
            return Err(ApiError::Unauthorized);
        }
    }

    Ok(next.run(req).await)
}
