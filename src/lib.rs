#[cfg(feature = "client")]
use std::io;

#[cfg(feature = "client")]
use crate::models::config::ClientConfig;
#[cfg(feature = "client")]
use crate::services::contacts::ContactSession;
#[cfg(feature = "client")]
use crate::transport::http::HttpTransport;

#[cfg(feature = "client")]
pub mod console;
pub mod diff;
pub mod domain;
pub mod dto;
pub mod format;
pub mod forms;
pub mod models;
pub mod pagination;
pub mod services;
pub mod transport;

/// Connects to the configured backend and runs the console on stdin/stdout.
#[cfg(feature = "client")]
pub fn run(client_config: ClientConfig) -> io::Result<()> {
    let transport = HttpTransport::new(&client_config.api_url, client_config.request_timeout())
        .map_err(io::Error::other)?;

    log::info!("Using contacts backend at {}", client_config.api_url);

    let mut session = ContactSession::new(
        client_config.list_settings(),
        client_config.image_limits(),
    );

    let stdin = io::stdin();
    console::run(&mut session, &transport, stdin.lock(), io::stdout())
}
