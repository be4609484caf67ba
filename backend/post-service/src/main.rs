use actix_cors::Cors;
use actix_web::HttpServer;
use post_service::{
    config::Config,
    db::{EntityStore, MemoryStore, PgStore},
    error::AppError,
    logging, AppState,
};
use std::sync::Arc;

fn build_cors(cfg: &Config) -> Cors {
    let cors = if cfg.allows_any_origin() {
        Cors::default().allow_any_origin()
    } else {
        cfg.cors_allowed_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
    };

    cors.allow_any_method()
        .allow_any_header()
        .max_age(3600)
}

#[actix_web::main]
async fn main() -> Result<(), AppError> {
    logging::init_tracing();
    let cfg = Config::from_env()?;

    crypto_core::jwt::initialize_jwt_secret(&cfg.jwt_secret, cfg.jwt_ttl_hours)
        .map_err(|e| AppError::StartServer(format!("jwt: {e}")))?;

    let store: Arc<dyn EntityStore> = match &cfg.database {
        Some(db) => Arc::new(
            PgStore::connect(&db.url, db.max_connections)
                .await
                .map_err(|e| AppError::StartServer(format!("db: {e}")))?,
        ),
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory store; data is lost on restart");
            Arc::new(MemoryStore::new())
        }
    };

    let state = AppState::new(store, cfg);
    let bind_addr = state.config.bind_addr();
    tracing::info!(%bind_addr, env = %state.config.app_env, "starting post-service");

    HttpServer::new(move || {
        let cors = build_cors(&state.config);
        post_service::app(state.clone()).wrap(cors)
    })
    .bind(&bind_addr)
    .map_err(|e| AppError::StartServer(format!("bind: {e}")))?
    .run()
    .await
    .map_err(|e| AppError::StartServer(format!("server: {e}")))
}
