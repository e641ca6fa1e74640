use poise::serenity_prelude::Mentionable;

use crate::commands::context::Context;
use crate::error::Result;

/// Says hello.
#[poise::command(prefix_command)]
pub async fn hello(ctx: Context<'_>) -> Result<()> {
    ctx.say(format!("Hello, {}! 👋", ctx.author().mention()))
        .await?;
    Ok(())
}

/// Shows the current latency of the bot.
#[poise::command(prefix_command)]
pub async fn ping(ctx: Context<'_>) -> Result<()> {
    let latency = ctx.ping().await;
    ctx.say(format!("🏓 Pong! Latency: {}ms", latency.as_millis()))
        .await?;
    Ok(())
}
