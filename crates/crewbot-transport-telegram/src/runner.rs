use crate::bot;
use crate::bot::handlers::Command;
use crate::config::BotSettings;
use crewbot_core::agent::Crew;
use crewbot_core::appointments::{AppointmentStore, JsonFileBackend};
use std::sync::Arc;
use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use tracing::{error, info, warn};

/// Run the Telegram transport runtime.
pub async fn run_bot(settings: Arc<BotSettings>) {
    let store = init_store(&settings).await;

    let crew = Arc::new(Crew::from_settings(settings.agent.as_ref(), store));
    if !crew.is_available() {
        warn!(
            provider = %settings.agent.llm_provider(),
            "LLM provider is not configured (set LLM_API_KEY or OPENAI_API_KEY); every message will fail"
        );
    }
    info!(
        chat_model = %settings.agent.chat_model(),
        router_model = %settings.agent.router_model(),
        "Crew initialized."
    );

    let bot = Bot::new(settings.telegram.telegram_bot_token.clone());
    let handler = setup_handler();

    info!("Bot is running...");

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![crew, settings])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}

async fn init_store(settings: &BotSettings) -> Arc<AppointmentStore<JsonFileBackend>> {
    let path = settings.agent.appointments_file();
    let opened = match JsonFileBackend::open(&path).await {
        Ok(backend) => AppointmentStore::open(backend).await.map_err(|e| e.to_string()),
        Err(e) => Err(e.to_string()),
    };

    match opened {
        Ok(store) => {
            info!(path = %path, "Appointment store initialized.");
            Arc::new(store)
        }
        Err(e) => {
            error!(path = %path, "Failed to open appointment store: {}", e);
            std::process::exit(1);
        }
    }
}

fn setup_handler() -> UpdateHandler<teloxide::RequestError> {
    Update::filter_message()
        .branch(
            dptree::entry()
                .filter_command::<Command>()
                .endpoint(handle_command),
        )
        .branch(
            // Plain text only; unrecognised commands are ignored
            dptree::filter(|msg: Message| msg.text().is_some_and(|t| !t.starts_with('/')))
                .endpoint(handle_text_message),
        )
}

async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
) -> Result<(), teloxide::RequestError> {
    let res = match cmd {
        Command::Start => bot::handlers::start(bot, msg).await,
        Command::Help => bot::handlers::help(bot, msg).await,
    };
    if let Err(e) = res {
        error!("Command error: {}", e);
    }
    respond(())
}

async fn handle_text_message(
    bot: Bot,
    msg: Message,
    crew: Arc<Crew>,
) -> Result<(), teloxide::RequestError> {
    if let Err(e) = bot::handlers::handle_text(bot, msg, crew).await {
        error!("Text handler error: {}", e);
    }
    respond(())
}
