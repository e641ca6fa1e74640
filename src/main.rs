pub mod commands;
pub mod config;
pub mod error;

use std::process;
use std::sync::Arc;

use poise::serenity_prelude::GatewayIntents;
use serenity::async_trait;
use serenity::client::{Client, Context, EventHandler};
use serenity::gateway::GatewayError;
use serenity::model::gateway::Ready;
use serenity::prelude::SerenityError;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::commands::context::UserData;
use crate::commands::hooks;
use crate::commands::timer::formatters::{DefaultTimerFormatter, TimerFormatter};
use crate::commands::timer::manager::TimerManager;
use crate::commands::timer::notifier::{HttpNotifier, Notifier};
use crate::config::Config;
use crate::error::Error;

pub struct Handler {
    prefix: String,
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, _: Context, ready: Ready) {
        info!("Logged in as {} ({})", ready.user.name, ready.user.id);
        info!(
            "Bot is ready and listening for commands with prefix '{}'",
            self.prefix
        );
        info!("Use {}help for a list of commands.", self.prefix);
        info!(
            "Invite link: https://discord.com/api/oauth2/authorize?client_id={}&permissions=8&scope=bot",
            ready.user.id
        );
    }
}

fn report_client_error(err: &SerenityError) {
    match err {
        SerenityError::Gateway(GatewayError::InvalidAuthentication) => error!(
            "CRITICAL: Login failure. Check your bot token, it might be invalid or expired."
        ),
        SerenityError::Gateway(GatewayError::DisallowedGatewayIntents) => error!(
            "CRITICAL: Privileged intents are required. Enable 'Server Members Intent' and \
            'Message Content Intent' in the bot's settings on the Discord Developer Portal."
        ),
        other => error!(
            "CRITICAL: An error occurred while trying to run the bot: {:?}",
            other
        ),
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!("CRITICAL: {}", err);
            process::exit(1);
        }
    };

    let timer_manager = Arc::new(TimerManager::from_config(&config));
    let formatter: Arc<dyn TimerFormatter> = Arc::new(DefaultTimerFormatter::new(&config.prefix));
    let prefix = config.prefix.clone();

    let framework = poise::Framework::<UserData, Error>::builder()
        .options(poise::FrameworkOptions {
            commands: commands::all(),
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: Some(config.prefix.clone()),
                ..Default::default()
            },
            pre_command: |ctx| Box::pin(hooks::log_command(ctx)),
            on_error: |error| Box::pin(hooks::on_error(error)),
            ..Default::default()
        })
        .setup(move |ctx, _ready, _framework| {
            Box::pin(async move {
                let notifier: Arc<dyn Notifier> = Arc::new(HttpNotifier::new(ctx.http.clone()));
                Ok(UserData {
                    timer_manager,
                    notifier,
                    formatter,
                    prefix,
                })
            })
        })
        .build();

    let intents = GatewayIntents::non_privileged()
        | GatewayIntents::MESSAGE_CONTENT
        | GatewayIntents::GUILD_MEMBERS;
    let handler = Handler {
        prefix: config.prefix.clone(),
    };
    let mut client = match Client::builder(&config.token, intents)
        .event_handler(handler)
        .framework(framework)
        .await
    {
        Ok(client) => client,
        Err(why) => {
            report_client_error(&why);
            process::exit(1);
        }
    };

    if let Err(why) = client.start().await {
        report_client_error(&why);
        process::exit(1);
    }
}
