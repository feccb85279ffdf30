//! Terminal chat client with reconnection support.
//!
//! Joins the relay over WebSocket, prints every broadcast message and sends
//! each line typed at the prompt. Reconnects on disconnection (max 5 attempts
//! with 5 second interval). A client ID that is already joined is rejected by the server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin hiroba-client -- --username alice
//! cargo run --bin hiroba-client -- -n bob -u http://127.0.0.1:8080
//! ```

use clap::Parser;
use uuid::Uuid;

use hiroba_client::{ClientConfig, run_client, ui::prompt_username};
use hiroba_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "hiroba-client")]
#[command(about = "Terminal chat client for the Hiroba broadcast relay", long_about = None)]
struct Args {
    /// Relay server base URL
    #[arg(short = 'u', long, default_value = "http://127.0.0.1:8080")]
    url: String,

    /// Display name attached to sent messages (prompted when omitted)
    #[arg(short = 'n', long)]
    username: Option<String>,

    /// Client ID used to join (defaults to a random UUID)
    #[arg(short = 'c', long)]
    client_id: Option<String>,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_PKG_NAME"), env!("CARGO_BIN_NAME"), "warn");

    let args = Args::parse();

    let username = match args.username.filter(|name| !name.trim().is_empty()) {
        Some(username) => username,
        None => match prompt_username() {
            Some(username) => username,
            None => return,
        },
    };
    let client_id = args
        .client_id
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let config = match ClientConfig::new(&args.url, client_id, username) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    // Run the client
    if let Err(e) = run_client(config).await {
        tracing::error!("Client error: {}", e);
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
