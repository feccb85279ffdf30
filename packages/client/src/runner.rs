//! Client execution logic with reconnection support.

use std::time::Duration;

use hiroba_shared::time::SystemClock;

use crate::{
    domain::{ClientConfig, should_attempt_reconnect, should_exit_immediately},
    error::ClientError,
    session::run_client_session,
    ui::spawn_input_reader,
};

const MAX_RECONNECT_ATTEMPTS: u32 = 5;
const RECONNECT_INTERVAL_SECS: u64 = 5;

/// Run the chat client with reconnection logic
///
/// Returns `Ok(())` when the user exits.
///
/// # Errors
///
/// Returns the last error when the client ID is already in use or when
/// reconnection attempts are exhausted.
pub async fn run_client(config: ClientConfig) -> Result<(), ClientError> {
    let http = reqwest::Client::new();
    let clock = SystemClock;
    let mut input_rx = spawn_input_reader(&config.username);
    let mut reconnect_count = 0;

    loop {
        tracing::info!(
            "Attempting to join {} as '{}' (client id: {})",
            config.server_url,
            config.username,
            config.client_id
        );

        match run_client_session(&config, &http, &mut input_rx, &clock).await {
            Ok(()) => {
                tracing::info!("Client session ended normally");
                return Ok(());
            }
            Err(e) => {
                if should_exit_immediately(&e, reconnect_count) {
                    tracing::error!(
                        "Cannot join with client id '{}' as it is already in use. Exiting.",
                        config.client_id
                    );
                    return Err(e);
                }

                tracing::warn!("{}", e);
                if !should_attempt_reconnect(&e, reconnect_count, MAX_RECONNECT_ATTEMPTS) {
                    tracing::error!(
                        "Failed to reconnect after {} attempts. Exiting.",
                        MAX_RECONNECT_ATTEMPTS
                    );
                    return Err(e);
                }
                reconnect_count += 1;

                println!(
                    "\rConnection lost. Reconnecting in {} seconds... (attempt {}/{})",
                    RECONNECT_INTERVAL_SECS, reconnect_count, MAX_RECONNECT_ATTEMPTS
                );
                tokio::time::sleep(Duration::from_secs(RECONNECT_INTERVAL_SECS)).await;
            }
        }
    }
}
