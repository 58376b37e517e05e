use axum::{routing::get, routing::post, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::api::bots as bot_handlers;
use super::api_doc::ApiDoc;
use super::config::CollectorConfig;
use super::engine::UpsertEngine;
use super::store::UnitStore;
use super::ui::handlers as ui_handlers;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn UnitStore>,
    pub engine: UpsertEngine,
}

impl AppState {
    pub fn new(store: Arc<dyn UnitStore>) -> Self {
        AppState {
            engine: UpsertEngine::new(store.clone()),
            store,
        }
    }
}

pub fn router(state: AppState) -> Router {
    // Units report from their own addresses.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(bot_handlers::root))
        .route("/dashboard", get(ui_handlers::dashboard))
        .route("/bot/update", post(bot_handlers::update_bot))
        .route("/bot/get", get(bot_handlers::get_bot))
        .route("/bot/list", get(bot_handlers::list_bots))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_server(config: CollectorConfig) -> std::io::Result<()> {
    let state = AppState::new(config.store.open());
    let app = router(state);

    log::info!("Starting collector on {} ({:?} store)", config.web.bind, config.store);

    let listener = tokio::net::TcpListener::bind(&config.web.bind).await?;
    axum::serve(listener, app).await
}
