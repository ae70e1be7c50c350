use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::Method;
use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tracing::{info, Level};

mod config;
mod db;
mod domain;
mod rest;
mod storage;

use config::AppConfig;
use domain::assets::{AssetResolver, HttpAssetChecker};
use domain::catalog_service::CatalogService;
use domain::diary_service::DiaryService;
use domain::upload::ImageStore;
use rest::AppState;
use storage::sqlite::SqliteDiaryPostRepository;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    let config = Arc::new(AppConfig::from_env()?);
    info!("Loaded configuration: {:?}", config);

    info!("Setting up database");
    let db = db::DbConnection::new(&config.database_url).await?;

    let repository = SqliteDiaryPostRepository::new(db);
    let image_store = ImageStore::new(config.upload_dir.clone())?;
    let diary = DiaryService::new(Arc::new(repository), image_store);
    let catalog = CatalogService::new(&config)?;
    let checker = HttpAssetChecker::new(&config)?;
    let resolver = AssetResolver::new(Arc::new(checker));

    let state = AppState::new(catalog, resolver, diary, config.clone());

    // Public read-mostly site; the frontend may be served from anywhere
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    let app = Router::new()
        .route("/", get(rest::home))
        .route("/redpandas", get(rest::list_redpandas))
        .route("/redpandas/:name", get(rest::redpanda_detail))
        .route("/pandas/*path", get(rest::asset_redirect))
        .route("/posts", get(rest::list_posts).post(rest::create_post))
        .route("/posts/postables", get(rest::list_postables))
        .nest_service("/uploads", ServeDir::new(&config.upload_dir))
        .layer(cors)
        .with_state(state);

    let addr: SocketAddr = config.listen_addr.parse()?;
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
