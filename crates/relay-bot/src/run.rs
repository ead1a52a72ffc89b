//! Long-polling loop: fetch updates, answer callbacks, dispatch each
//! event on its own task.

use std::sync::Arc;
use std::time::Duration;

use mistral_client::MistralClient;
use relay_core::Dispatcher;
use session_store::SessionStore;

use crate::telegram::{classify_update, TelegramTransport};

/// Back-off after a failed getUpdates call.
const POLL_RETRY_DELAY: Duration = Duration::from_secs(3);

pub async fn run_bot(bot_token: String, mistral_base_url: String) -> anyhow::Result<()> {
    let transport = Arc::new(TelegramTransport::new(&bot_token));
    let provider = Arc::new(MistralClient::new().with_base_url(mistral_base_url));
    let store = SessionStore::new();
    let dispatcher = Arc::new(Dispatcher::new(transport.clone(), provider, store));

    log::info!("Bot started, long-polling for updates");

    let mut offset = 0i64;
    loop {
        let updates = match transport.get_updates(offset).await {
            Ok(updates) => updates,
            Err(error) => {
                log::warn!("getUpdates failed: {error}");
                tokio::time::sleep(POLL_RETRY_DELAY).await;
                continue;
            }
        };

        for update in updates {
            offset = offset.max(update.update_id + 1);

            // Stop the button spinner before doing any real work.
            if let Some(query) = &update.callback_query {
                if let Err(error) = transport.answer_callback(&query.id).await {
                    log::debug!("answerCallbackQuery failed: {error}");
                }
            }

            match classify_update(&update) {
                Some(inbound) => {
                    let dispatcher = dispatcher.clone();
                    tokio::spawn(async move {
                        dispatcher.handle(inbound).await;
                    });
                }
                None => {
                    log::debug!("ignoring update {} without actionable content", update.update_id)
                }
            }
        }
    }
}
