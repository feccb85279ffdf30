//! Message formatting utilities for client display.

use hiroba_shared::{protocol::ChatMessageDto, time::format_unix_seconds};

const MAGENTA: &str = "\x1b[35m";
const RESET: &str = "\x1b[0m";

/// Message formatter for client display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Format a chat message as `[YYYY-MM-DD HH:MM:SS] username: content`
    ///
    /// Messages whose username equals `own_username` have the username highlighted,
    /// so the user can tell their own echoed messages apart.
    pub fn format_chat_message(message: &ChatMessageDto, own_username: &str) -> String {
        let timestamp_str = format_unix_seconds(message.timestamp);
        let username = if message.username == own_username {
            format!("{MAGENTA}{}{RESET}", message.username)
        } else {
            message.username.clone()
        };
        format!("[{}] {}: {}", timestamp_str, username, message.content)
    }

    /// Format the banner shown after joining
    pub fn format_joined(username: &str, client_id: &str) -> String {
        format!(
            "\nJoined as '{}' (client id: {}). Type messages and press Enter to send. Press Ctrl+C to exit.\n",
            username, client_id
        )
    }

    /// Format a raw text frame that is not a chat message
    pub fn format_raw_message(text: &str) -> String {
        format!("← Received: {}", text)
    }
}
