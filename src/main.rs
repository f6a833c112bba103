use clap::{Parser, Subcommand};
use matching_core::api;
use matching_core::state::AppState;
use matching_core::utils::shutdown_token;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// A continuous double-auction matching engine with an HTTP control plane.
#[derive(Parser)]
#[command(name = "matching-engine")]
#[command(author, version, about = "Single-instrument limit order book engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server.
    Server {
        #[arg(long, default_value_t = 8080)]
        port: u16,
        /// Ticker symbols to seed the registry with, comma-separated.
        #[arg(long, default_value = "BTC-USD", value_delimiter = ',')]
        tickers: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let token = shutdown_token();
    let cli = Cli::parse();

    match cli.command {
        Commands::Server { port, tickers } => {
            let state = AppState::new(tickers.clone());
            let app = api::router(state);
            let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;
            tracing::info!(port, tickers = ?tickers, "HTTP server listening");
            axum::serve(listener, app)
                .with_graceful_shutdown(token.cancelled_owned())
                .await?;
        }
    }
    Ok(())
}
