//! Auth bridge - Entry point.

use anyhow::Context;
use auth_bridge::{
    api::{create_router_with_rate_limit, AppState, RateLimitState},
    AppResult, ChatConfirmationSender, Config, ConfirmationListener,
};
use chat_client::{ChatClient, MessageReceiver};
use handshake_store::HandshakeStore;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> AppResult<()> {
    let config = Config::load().context("Failed to load configuration")?;

    init_logging(&config.log.level);

    info!("Starting auth bridge");

    let chat = ChatClient::new(&config.chat.api_url, &config.chat.bot_token)?;

    if chat.health_check().await {
        info!("Chat gateway healthy");
    } else {
        warn!("Chat gateway health check failed at {}", config.chat.api_url);
    }

    let sender = Arc::new(ChatConfirmationSender::new(
        chat.clone(),
        &config.chat.channel_id,
    ));
    let store = HandshakeStore::new(sender, config.handshake.ttl);
    let sweeper = store.spawn_sweeper(config.handshake.sweep_interval);

    let affirmative = config.handshake.affirmative_words();
    info!("Accepting confirmations: {}", affirmative.join(", "));

    let listener = ConfirmationListener::new(
        store.clone(),
        chat.clone(),
        &config.chat.channel_id,
        affirmative,
    )
    .with_history_limit(config.chat.history_limit);

    let receiver = MessageReceiver::new(
        chat.clone(),
        &config.chat.channel_id,
        config.chat.poll_interval,
    );
    let listener_task = tokio::spawn(async move { listener.run(receiver.stream()).await });

    let state = AppState::new(store.clone(), chat);
    let rate_limit = RateLimitState::new(config.rate_limit.per_minute);
    let app = create_router_with_rate_limit(state, rate_limit);

    let addr = SocketAddr::new(
        config.server.listen_addr.parse().unwrap_or([0, 0, 0, 0].into()),
        config.server.port,
    );

    let tcp = TcpListener::bind(addr).await.map_err(|e| {
        error!("Failed to bind to {}: {}", addr, e);
        e
    })?;

    info!("Listening on {}", addr);

    axum::serve(tcp, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down...");
    listener_task.abort();
    sweeper.abort();
    store.clear().await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
