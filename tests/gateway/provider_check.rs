//! Provider self-tests as run by the `check` command.

use push_gateway::cli::handlers::check::{CheckCommandHandler, CheckStatus};
use push_gateway::services::push::ProviderKind;

use crate::common::{DEVICE_KEY, Providers, settings_with};

#[tokio::test]
async fn telegram_check_calls_get_me() {
    let (settings, telegram, _) = settings_with(Providers::BOTH, 0).await;
    let handler = CheckCommandHandler::new(&settings);

    assert_eq!(
        handler.check(ProviderKind::Telegram, false, true).await,
        CheckStatus::Passed
    );
    // getMe is read-only and not recorded as a send
    assert!(telegram.calls().is_empty());
}

#[tokio::test]
async fn telegram_check_reports_bad_token() {
    let (mut settings, _, _) = settings_with(Providers::BOTH, 0).await;
    settings.providers.telegram.bot_token = "1:wrong".to_string();
    let handler = CheckCommandHandler::new(&settings);

    assert_eq!(
        handler.check(ProviderKind::Telegram, false, true).await,
        CheckStatus::Failed("Unauthorized".to_string())
    );
}

#[tokio::test]
async fn bark_check_sends_notification_only_when_allowed() {
    let (settings, _, bark) = settings_with(Providers::BOTH, 0).await;
    let handler = CheckCommandHandler::new(&settings);

    assert_eq!(
        handler.check(ProviderKind::Bark, false, true).await,
        CheckStatus::Skipped
    );
    assert!(bark.calls().is_empty());

    assert_eq!(
        handler.check(ProviderKind::Bark, true, true).await,
        CheckStatus::Passed
    );
    let calls = bark.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].target, DEVICE_KEY);
    assert_eq!(calls[0].payload["title"], "Configuration test");
}

#[tokio::test]
async fn check_all_succeeds_with_only_one_provider_configured() {
    let (settings, _, _) = settings_with(
        Providers {
            telegram: true,
            bark: false,
        },
        0,
    )
    .await;
    let handler = CheckCommandHandler::new(&settings);

    assert!(handler.execute(None, false).await.is_ok());
    assert!(handler.execute(Some(ProviderKind::Bark), true).await.is_err());
}
