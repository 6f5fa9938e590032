use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::get_message::get_message;
use super::handlers::list_users::list_users;
use super::handlers::login::login;
use super::handlers::register::register;
use super::middleware::authenticate as auth_middleware;
use crate::domain::session::service::SessionService;
use crate::domain::user::ports::IdentityStore;
use crate::domain::user::service::UserService;

pub struct AppState<S: IdentityStore> {
    pub user_service: Arc<UserService<S>>,
    pub session_service: Arc<SessionService<S>>,
}

impl<S: IdentityStore> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            user_service: Arc::clone(&self.user_service),
            session_service: Arc::clone(&self.session_service),
        }
    }
}

pub fn create_router<S: IdentityStore>(
    user_service: Arc<UserService<S>>,
    session_service: Arc<SessionService<S>>,
) -> Router {
    let state = AppState {
        user_service,
        session_service,
    };

    let public_routes = Router::new()
        .route("/register", post(register::<S>))
        .route("/login", post(login::<S>));

    let protected_routes = Router::new()
        .route("/users", get(list_users::<S>))
        .route("/message", get(get_message))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware::<S>,
        ));

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
