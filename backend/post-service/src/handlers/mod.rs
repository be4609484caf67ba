/// HTTP handlers for post-service
///
/// - `posts`: list, read and mutate posts, likes and comments
/// - `auth`: registration, login and profile
///
/// `configure` mounts every route plus `/ws`, `/health` and `/metrics`.
pub mod auth;
pub mod posts;

use crate::error::AppError;
use crate::{metrics, websocket};
use actix_web::{web, HttpResponse};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        AppError::validation("body", &err.to_string()).into()
    }))
    .app_data(
        web::PathConfig::default()
            .error_handler(|_err, _req| AppError::NotFound("Resource not found".to_string()).into()),
    )
    .service(
        web::scope("/posts")
            .route("", web::get().to(posts::list_posts))
            .route("", web::post().to(posts::create_post))
            .route("/{id}", web::get().to(posts::get_post))
            .route("/{id}", web::put().to(posts::update_post))
            .route("/{id}", web::delete().to(posts::delete_post))
            .route("/{id}/like", web::put().to(posts::toggle_like))
            .route("/{id}/comments", web::post().to(posts::add_comment))
            .route(
                "/{id}/comments/{comment_id}",
                web::delete().to(posts::delete_comment),
            ),
    )
    .service(
        web::scope("/auth")
            .route("/register", web::post().to(auth::register))
            .route("/login", web::post().to(auth::login))
            .route("/profile", web::get().to(auth::get_profile))
            .route("/profile", web::put().to(auth::update_profile)),
    )
    .service(websocket::ws_handler)
    .route("/health", web::get().to(|| async { HttpResponse::Ok().body("OK") }))
    .route("/metrics", web::get().to(metrics::serve_metrics));
}
