use std::sync::Arc;

use tokio::io::BufReader;
use tracing::{debug, info, warn};

use mc_bot_client::config::BotConfig;
use mc_bot_client::replay::replay;
use mc_bot_client::{ChannelTransport, Connection, TransportCommand};

#[tokio::main]
async fn main() {
    let config = match BotConfig::load_or_default("bot.toml") {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load bot.toml: {e}");
            std::process::exit(1);
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    let source = std::env::args().nth(1).unwrap_or_else(|| "-".into());
    let profile = config.account.profile();
    info!(
        "MC-Bot v{} replaying {} as {profile} ({})",
        env!("CARGO_PKG_VERSION"),
        if source == "-" { "stdin" } else { source.as_str() },
        config.server.address
    );

    let (transport, mut outbound) = ChannelTransport::new(config.server.address.clone());
    let mut connection = Connection::with_tick_interval(config.ticker.interval());
    if let Err(e) = connection.attach(Arc::new(transport), profile) {
        eprintln!("Failed to attach: {e}");
        std::process::exit(1);
    }

    // Outbound traffic has no server to go to; log it.
    let session = tokio::spawn(async move {
        while let Some(command) = outbound.recv().await {
            match command {
                TransportCommand::Send(event) => match serde_json::to_string(&event) {
                    Ok(json) => debug!("-> {json}"),
                    Err(e) => warn!("Unserializable {}: {e}", event.name()),
                },
                TransportCommand::Disconnect { reason } => {
                    info!("Session closed: {reason}");
                    break;
                }
            }
        }
    });

    let result = if source == "-" {
        replay(&mut connection, BufReader::new(tokio::io::stdin())).await
    } else {
        match tokio::fs::File::open(&source).await {
            Ok(file) => replay(&mut connection, BufReader::new(file)).await,
            Err(e) => Err(e),
        }
    };
    match result {
        Ok(stats) => info!(
            "Replayed {} events ({} lines skipped)",
            stats.applied, stats.skipped
        ),
        Err(e) => warn!("Replay of {source} failed: {e}"),
    }

    if connection.connected() {
        info!("Replay finished, position ticker running. Press Ctrl+C to stop.");
        tokio::signal::ctrl_c().await.ok();
        info!("Shutdown signal received");
    }
    connection.terminate("Shutting down", None);
    for event in connection.drain_events() {
        info!("{event}");
    }
    let _ = session.await;
    info!("Bot shut down.");
}
