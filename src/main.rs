mod config;
mod db;
mod entities;
mod error;
mod models;
mod routes;
mod service;
mod store;

use std::sync::Arc;

use sea_orm::{ConnectOptions, DatabaseConnection};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    config::Config,
    service::MovieService,
    store::{MovieStore, ReferenceStore},
};

pub struct AppState {
    pub movies: MovieService,
    pub references: ReferenceStore,
}

impl AppState {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            movies: MovieService::new(MovieStore::new(db.clone())),
            references: ReferenceStore::new(db),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,movie_catalog=debug,sqlx=warn".to_string()),
        )
        .init();

    let config = Config::from_env()?;

    let mut options = ConnectOptions::new(config.database_url.clone());
    options.max_connections(config.db_max_connections).sqlx_logging(false);
    let db = db::connect_and_migrate(options).await?;

    let state = Arc::new(AppState::new(db));

    let app = routes::router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::new().allow_origin(Any).allow_headers(Any)),
    );

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    tracing::info!(addr = %config.addr, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}
