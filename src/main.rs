use lobby_relay::{Config, LobbyRelay, run_with_shutdown};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env file is fine; real deployments set the environment directly
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    let relay = Arc::new(LobbyRelay::new(config)?);

    relay.start_feed_relay()?;
    let mut api = relay.spawn_api_server();

    tokio::select! {
        result = run_with_shutdown(relay.clone()) => {
            result?;
            // Shutdown cancelled the server; wait for in-flight requests
            api.await??;
        }
        joined = &mut api => {
            // The server only returns on its own if it failed to bind or serve
            relay.shutdown().await?;
            joined??;
        }
    }

    Ok(())
}
