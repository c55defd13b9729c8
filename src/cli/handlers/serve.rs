//! Handler for the `serve` command.

use crate::api;
use crate::cli::OutputFormatter;
use crate::config::Config;
use crate::error::Result;
use crate::events::{ActivityTimeline, EventBus, spawn_ticket_listener};
use crate::service::TicketingService;
use crate::storage::FileStorage;
use std::sync::Arc;
use tracing::info;

/// Run the HTTP API until the process is interrupted.
pub async fn handle_serve(
    mut config: Config,
    host: Option<String>,
    port: Option<u16>,
    output: &OutputFormatter,
) -> Result<()> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    let storage = Arc::new(FileStorage::new(&config.storage.data_dir));
    storage.ensure_directories()?;

    let bus = EventBus::new(config.events.capacity);
    spawn_ticket_listener(bus.clone(), Arc::clone(&storage) as Arc<dyn ActivityTimeline>);

    let service = TicketingService::new(storage, bus);
    let address = config.listen_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!(
        %address,
        data_dir = %config.storage.data_dir.display(),
        "ticketing API listening"
    );
    output.success(&format!("Listening on {address}"));

    axum::serve(listener, api::router(service)).await?;
    Ok(())
}
