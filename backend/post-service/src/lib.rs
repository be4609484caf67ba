//! Post service
//!
//! HTTP mutation API for posts, likes and comments, account routes, and the
//! WebSocket broadcast hub that fans post changes out to live viewers.

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
pub mod state;
pub mod websocket;

pub use error::{AppError, Result};
pub use state::AppState;

use actix_middleware::{JwtAuthMiddleware, Logging, RequestId};
use actix_web::{
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    web, App,
};

/// Application with every route and the shared middleware stack.
///
/// CORS is added by the binary since it depends on deployment config.
pub fn app(
    state: AppState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .wrap(JwtAuthMiddleware)
        .wrap(Logging)
        .wrap(RequestId::new())
        .app_data(web::Data::new(state))
        .configure(handlers::configure)
}
