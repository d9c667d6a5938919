//! Push delivery to Telegram and Bark.

pub mod bark;
pub mod dispatch;
pub mod manager;
pub mod provider;
pub mod telegram;

pub use bark::BarkClient;
pub use dispatch::{ChatTargets, DispatchOutcome, PushDispatcher, PushParams, PushStatus};
pub use manager::{BarkManager, TelegramManager};
pub use provider::{
    BatchEntry, FailureKind, MessageId, PUSH_ERROR, ProviderKind, PushFailure, PushOptions,
    PushProvider, PushResult, SelfTestReport,
};
pub use telegram::TelegramClient;
