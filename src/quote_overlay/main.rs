use anyhow::Context;
use axum::{
    extract::DefaultBodyLimit,
    http::{header::HeaderName, Method},
    routing::{get, post},
    Router,
};
use dotenv::dotenv;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod application;
mod domain;
mod infrastructure;

use application::overlay_service::OverlayService;
use infrastructure::axum_handler::{health_handler, overlay_handler, root_handler, AppState};
use infrastructure::config::AppConfig;
use infrastructure::font::FontSet;
use infrastructure::overlay_renderer::RusttypeOverlayRenderer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_env()?;

    // フォントは起動時に一度だけ読み込み、全リクエストで共有する
    let fonts = FontSet::load(&config.font_dir, &config.quote_font, &config.attribution_font)
        .context("failed to load fonts")?;
    let renderer = Arc::new(RusttypeOverlayRenderer::new(Arc::new(fonts), config.max_image_dimension));
    let overlay_service = Arc::new(
        OverlayService::new(renderer, config.render_defaults.clone()).with_max_text_chars(config.max_text_chars),
    );
    let state = Arc::new(AppState { overlay_service });

    let app = router(state, &config);

    let addr: SocketAddr = config
        .bind_address()
        .parse()
        .with_context(|| format!("invalid bind address {}", config.bind_address()))?;
    info!(%addr, font_dir = %config.font_dir.display(), "starting image overlay service");

    // サーバーの開始
    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down");
        })
        .await?;

    Ok(())
}

fn router(state: Arc<AppState>, config: &AppConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(vec![HeaderName::from_static("content-type")]);

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/overlay", post(overlay_handler))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
