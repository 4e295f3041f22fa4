use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::middleware::require_auth;
use crate::{AppState, auth, conversations, messages, users};

pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/", get(welcome))
        .route("/api/register", post(auth::register))
        .route("/api/login", post(auth::login));

    let protected_routes = Router::new()
        .route("/api/conversation", post(conversations::create_conversation))
        .route("/api/conversations/{user_id}", get(conversations::list_conversations))
        .route("/api/message", post(messages::send_message))
        .route("/api/message/{conversation_id}", get(messages::get_messages))
        .route("/api/users/{user_id}", get(users::list_users))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn welcome() -> &'static str {
    "Welcome"
}
