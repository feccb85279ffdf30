//! Terminal chat client for the Hiroba relay server.

pub mod domain;
pub mod error;
mod formatter;
mod runner;
mod session;
pub mod ui;

pub use domain::ClientConfig;
pub use error::ClientError;
pub use runner::run_client;
pub use session::{run_client_session, send_message};
