use clap::Parser;

use relay_bot::logging::init_logging;
use relay_bot::run::run_bot;

#[derive(Parser, Debug, Clone)]
#[command(name = "relay-bot")]
#[command(about = "Telegram bot that relays chat to the Mistral API")]
#[command(version)]
struct Cli {
    /// Telegram bot token
    #[arg(long, env = "TELEGRAM_BOT_TOKEN")]
    bot_token: String,

    /// Mistral API base URL
    #[arg(long, env = "MISTRAL_BASE_URL", default_value = mistral_client::DEFAULT_BASE_URL)]
    mistral_base_url: String,

    /// Enable debug logging
    #[arg(long, env = "DEBUG", default_value = "false")]
    debug: bool,

    /// Log level (overrides debug flag)
    #[arg(long, env = "RUST_LOG")]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    if cli.log_level.is_some() {
        // If RUST_LOG is set, use it
        env_logger::init();
    } else {
        init_logging(cli.debug);
    }

    log::info!("Starting relay bot");
    log::info!("  Mistral base URL: {}", cli.mistral_base_url);
    if cli.debug {
        log::debug!("Debug mode enabled");
    }

    run_bot(cli.bot_token, cli.mistral_base_url).await
}
