//! 送信ハンドルの実装
//!
//! - `channel`: tokio の unbounded チャンネルを使った実装。
//!   受信側はセッションごとの pusher タスクが保持し、実際のネットワーク送信を行います。

pub mod channel;

pub use channel::ChannelHandle;
