use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use feed_csv_scrapper::{
    config::Config,
    api::routes::create_router,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::load()?;
    let server_addr = config.server_addr;
    tracing::info!("This is My News Aggregator Web Scraper Project!!");

    let app = create_router(&config);

    let listener = TcpListener::bind(server_addr).await?;

    tracing::info!("Listening on {}", server_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
