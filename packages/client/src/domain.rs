//! Domain logic for client-side operations.
//!
//! This module contains pure functions that implement business logic
//! without side effects, making them easy to test.

use hiroba_shared::{
    protocol::{ChatMessageDto, JOIN_PATH, SEND_PATH},
    time::Clock,
};
use reqwest::Url;

use crate::error::ClientError;

/// Connection settings of one client process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the relay server (e.g. `http://127.0.0.1:8080`)
    pub server_url: Url,
    pub client_id: String,
    pub username: String,
}

impl ClientConfig {
    /// Create a config, validating the server URL
    ///
    /// # Errors
    ///
    /// Returns `ClientError::ConnectionError` if `server_url` is not an `http` or `https` URL.
    pub fn new(server_url: &str, client_id: String, username: String) -> Result<Self, ClientError> {
        let server_url = Url::parse(server_url)
            .map_err(|e| ClientError::ConnectionError(format!("Invalid URL '{server_url}': {e}")))?;
        if !matches!(server_url.scheme(), "http" | "https") {
            return Err(ClientError::ConnectionError(format!(
                "Unsupported URL scheme '{}', expected http or https",
                server_url.scheme()
            )));
        }
        Ok(Self {
            server_url,
            client_id,
            username,
        })
    }

    /// WebSocket URL used to join the chat (`ws://host/ws?client_id=<id>`)
    pub fn join_url(&self) -> Url {
        let mut url = self.server_url.clone();
        let scheme = if url.scheme() == "https" { "wss" } else { "ws" };
        // http -> ws and https -> wss are both special schemes, so this cannot fail
        let _ = url.set_scheme(scheme);
        url.set_path(JOIN_PATH);
        url.set_query(None);
        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id);
        url
    }

    /// HTTP URL of the send endpoint
    pub fn send_url(&self) -> Url {
        let mut url = self.server_url.clone();
        url.set_path(SEND_PATH);
        url.set_query(None);
        url
    }
}

/// Maximum number of characters in one message
pub const MAX_MESSAGE_CHARS: usize = 280;

/// Check if the client should exit immediately based on the error type.
///
/// A duplicate client ID is fatal only on the first join. On a reconnect the
/// conflicting session is usually this client's own previous connection, which
/// the server has not noticed is gone yet, so the join is retried.
///
/// # Arguments
///
/// * `error` - The client error to check
/// * `reconnect_count` - The number of reconnection attempts already made
///
/// # Returns
///
/// `true` if the error requires immediate exit, `false` otherwise
pub fn should_exit_immediately(error: &ClientError, reconnect_count: u32) -> bool {
    matches!(error, ClientError::DuplicateClientId(_)) && reconnect_count == 0
}

/// Check if the client should attempt to reconnect.
///
/// # Arguments
///
/// * `error` - The client error that occurred
/// * `current_attempt` - The number of reconnection attempts already made
/// * `max_attempts` - The maximum number of reconnection attempts allowed
///
/// # Returns
///
/// `true` if reconnection should be attempted, `false` otherwise
pub fn should_attempt_reconnect(
    error: &ClientError,
    current_attempt: u32,
    max_attempts: u32,
) -> bool {
    // Don't reconnect if the error requires immediate exit
    if should_exit_immediately(error, current_attempt) {
        return false;
    }

    current_attempt < max_attempts
}

/// Turn a line typed by the user into message content.
///
/// Surrounding whitespace is trimmed and the rest is truncated to
/// `MAX_MESSAGE_CHARS` characters. Returns `None` for blank lines, which are not sent.
pub fn normalize_input(line: &str) -> Option<String> {
    let content = line.trim();
    if content.is_empty() {
        None
    } else {
        Some(content.chars().take(MAX_MESSAGE_CHARS).collect())
    }
}

/// Build the message sent for `content`, stamped with the clock's current time
pub fn build_outgoing_message(
    config: &ClientConfig,
    content: String,
    clock: &dyn Clock,
) -> ChatMessageDto {
    ChatMessageDto {
        client_id: config.client_id.clone(),
        username: config.username.clone(),
        content,
        timestamp: clock.now_unix_seconds(),
    }
}

#[cfg(test)]
mod tests {
    use hiroba_shared::time::FixedClock;

    use super::*;

    fn config(url: &str) -> ClientConfig {
        ClientConfig::new(url, "a1".to_string(), "alice".to_string()).unwrap()
    }

    #[test]
    fn test_should_exit_immediately_with_duplicate_client_id() {
        // テスト項目: DuplicateClientId エラーの場合、即座に終了すべきと判定される
        // given (前提条件):
        let error = ClientError::DuplicateClientId("a1".to_string());

        // when (操作): 初回の join
        let result = should_exit_immediately(&error, 0);

        // then (期待する結果):
        assert!(result);
    }

    #[test]
    fn test_should_not_exit_on_duplicate_client_id_while_reconnecting() {
        // テスト項目: 再接続中の DuplicateClientId は自分の古いセッションが残っているだけなので終了しない
        // given (前提条件):
        let error = ClientError::DuplicateClientId("a1".to_string());

        // when (操作):
        let exit = should_exit_immediately(&error, 1);
        let reconnect = should_attempt_reconnect(&error, 1, 5);

        // then (期待する結果): 再接続を続ける
        assert!(!exit);
        assert!(reconnect);
    }

    #[test]
    fn test_duplicate_client_id_while_reconnecting_stops_at_limit() {
        // テスト項目: 再接続中の DuplicateClientId も再接続回数の上限に従う
        // given (前提条件):
        let error = ClientError::DuplicateClientId("a1".to_string());

        // when (操作):
        let result = should_attempt_reconnect(&error, 5, 5);

        // then (期待する結果):
        assert!(!result);
    }

    #[test]
    fn test_should_exit_immediately_with_connection_error() {
        // テスト項目: ConnectionError の場合、即座に終了すべきではないと判定される
        // given (前提条件):
        let error = ClientError::ConnectionError("network error".to_string());

        // when (操作):
        let result = should_exit_immediately(&error, 0);

        // then (期待する結果):
        assert!(!result);
    }

    #[test]
    fn test_should_attempt_reconnect_with_duplicate_client_id() {
        // テスト項目: DuplicateClientId エラーの場合、再接続すべきではないと判定される
        // given (前提条件):
        let error = ClientError::DuplicateClientId("a1".to_string());

        // when (操作):
        let result = should_attempt_reconnect(&error, 0, 5);

        // then (期待する結果):
        assert!(!result);
    }

    #[test]
    fn test_should_attempt_reconnect_within_limit() {
        // テスト項目: 再接続回数が上限未満の場合、再接続すべきと判定される
        // given (前提条件):
        let error = ClientError::ConnectionError("network error".to_string());

        // when (操作):
        let first = should_attempt_reconnect(&error, 0, 5);
        let last = should_attempt_reconnect(&error, 4, 5);

        // then (期待する結果):
        assert!(first);
        assert!(last);
    }

    #[test]
    fn test_should_attempt_reconnect_at_limit() {
        // テスト項目: 再接続回数が上限に達した場合、再接続すべきではないと判定される
        // given (前提条件):
        let error = ClientError::ConnectionError("network error".to_string());

        // when (操作):
        let result = should_attempt_reconnect(&error, 5, 5);

        // then (期待する結果):
        assert!(!result);
    }

    #[test]
    fn test_normalize_input_skips_blank_lines() {
        // テスト項目: 空行・空白のみの行は送信対象にならない
        // given (前提条件):
        let lines = ["", "   ", "\t"];

        // when (操作):
        let results: Vec<Option<String>> = lines.iter().map(|l| normalize_input(l)).collect();

        // then (期待する結果):
        assert!(results.iter().all(Option::is_none));
    }

    #[test]
    fn test_normalize_input_trims_content() {
        // テスト項目: 前後の空白が取り除かれた内容が送信される
        // given (前提条件):
        let line = "  hello world \n";

        // when (操作):
        let result = normalize_input(line);

        // then (期待する結果):
        assert_eq!(result, Some("hello world".to_string()));
    }

    #[test]
    fn test_normalize_input_truncates_long_lines() {
        // テスト項目: 上限を超える入力は MAX_MESSAGE_CHARS 文字に切り詰められる
        // given (前提条件):
        let line = "a".repeat(MAX_MESSAGE_CHARS + 20);

        // when (操作):
        let result = normalize_input(&line);

        // then (期待する結果):
        assert_eq!(result, Some("a".repeat(MAX_MESSAGE_CHARS)));
    }

    #[test]
    fn test_normalize_input_counts_characters_not_bytes() {
        // テスト項目: 文字数はバイト数ではなく文字単位で数えられる
        // given (前提条件):
        let exact = "あ".repeat(MAX_MESSAGE_CHARS);
        let over = format!("{}い", exact);

        // when (操作):
        let exact_result = normalize_input(&exact);
        let over_result = normalize_input(&over);

        // then (期待する結果):
        assert_eq!(exact_result.as_deref(), Some(exact.as_str()));
        assert_eq!(over_result.as_deref(), Some(exact.as_str()));
    }

    #[test]
    fn test_join_url_from_http_base() {
        // テスト項目: http のベース URL から ws の join URL が組み立てられる
        // given (前提条件):
        let config = config("http://127.0.0.1:8080");

        // when (操作):
        let url = config.join_url();

        // then (期待する結果):
        assert_eq!(url.as_str(), "ws://127.0.0.1:8080/ws?client_id=a1");
    }

    #[test]
    fn test_join_url_from_https_base_escapes_client_id() {
        // テスト項目: https は wss になり、client_id はクエリとしてエスケープされる
        // given (前提条件):
        let config =
            ClientConfig::new("https://chat.example.com/", "a 1&b".to_string(), "alice".to_string())
                .unwrap();

        // when (操作):
        let url = config.join_url();

        // then (期待する結果):
        assert_eq!(url.scheme(), "wss");
        assert_eq!(url.path(), "/ws");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs, vec![("client_id".to_string(), "a 1&b".to_string())]);
    }

    #[test]
    fn test_send_url() {
        // テスト項目: 送信エンドポイントの URL が組み立てられる
        // given (前提条件):
        let config = config("http://localhost:3000");

        // when (操作):
        let url = config.send_url();

        // then (期待する結果):
        assert_eq!(url.as_str(), "http://localhost:3000/api/messages");
    }

    #[test]
    fn test_config_rejects_non_http_url() {
        // テスト項目: http / https 以外の URL は設定エラーになる
        // given (前提条件):
        let urls = ["ws://127.0.0.1:8080", "not a url"];

        for url in urls {
            // when (操作):
            let result = ClientConfig::new(url, "a1".to_string(), "alice".to_string());

            // then (期待する結果):
            assert!(matches!(result, Err(ClientError::ConnectionError(_))));
        }
    }

    #[test]
    fn test_build_outgoing_message_uses_clock() {
        // テスト項目: 送信メッセージに設定の ID・ユーザー名と時計の現在時刻が入る
        // given (前提条件):
        let config = config("http://127.0.0.1:8080");
        let clock = FixedClock::new(1_672_531_200);

        // when (操作):
        let message = build_outgoing_message(&config, "hi".to_string(), &clock);

        // then (期待する結果):
        assert_eq!(
            message,
            ChatMessageDto {
                client_id: "a1".to_string(),
                username: "alice".to_string(),
                content: "hi".to_string(),
                timestamp: 1_672_531_200,
            }
        );
    }
}
