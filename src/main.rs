use actix_web::{App, HttpServer, web};
use anyhow::Context;
use pantry_app::infrastructure::config::Config;
use pantry_app::infrastructure::database::open_stores;
use pantry_app::infrastructure::logging::init_logging;
use pantry_app::presentation::handlers::AppState;
use pantry_app::presentation::middleware::{RequestIdMiddleware, TimingMiddleware};
use pantry_app::presentation::routes;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let config = Config::from_env().context("failed to load configuration")?;
    let stores = open_stores(config.database_url.as_deref()).await?;
    let state = web::Data::new(AppState::new(stores, &config));
    info!("Application state initialized");

    let bind_addr = config.bind_addr();
    let server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(TimingMiddleware)
            .wrap(RequestIdMiddleware)
            .configure(routes::configure)
    })
    .bind(&bind_addr)
    .with_context(|| format!("failed to bind {}", bind_addr))?;

    info!(address = %bind_addr, "Starting HTTP server");
    server.run().await?;
    Ok(())
}
