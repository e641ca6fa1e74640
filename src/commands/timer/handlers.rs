use tracing::{debug, warn};

use crate::commands::context::{Context, UserData};
use crate::commands::timer::models::{ChannelRef, Participant};
use crate::commands::timer::notifier::deliver;
use crate::config::StopPolicy;
use crate::error::{Error, Result};

async fn current_channel(ctx: Context<'_>) -> ChannelRef {
    let channel_id = ctx.channel_id();
    let name = match channel_id.name(ctx.serenity_context()).await {
        Ok(name) => Some(name),
        Err(err) => {
            debug!("Can't resolve the name of channel {}: {}", channel_id, err.to_string());
            None
        }
    };
    ChannelRef::new(channel_id.get(), name)
}

async fn author_can_manage_guild(ctx: Context<'_>) -> bool {
    let member = match ctx.author_member().await {
        Some(member) => member,
        None => return false,
    };

    match ctx.guild() {
        Some(guild) => guild.member_permissions(&member).manage_guild(),
        None => false,
    }
}

// Turns a rejected timer operation into a reply. Internal errors
// go further to the framework error handler.
fn render_rejection(ctx: Context<'_>, err: Error) -> Result<String> {
    if !err.is_user_facing() {
        return Err(err);
    }

    if let Error::InconsistentState(reason) = &err {
        warn!("Inconsistent timer state: {}", reason);
    }
    Ok(ctx.data().formatter.rejection(&err))
}

// Stops the timer and posts the closing message to the timer's channel.
// A failed delivery is only logged, the timer is already reset by then.
pub async fn stop_and_announce(
    data: &UserData,
    invoker: &Participant,
    channel: &ChannelRef,
    invoker_is_admin: bool,
) -> Result<()> {
    let announcement = data
        .timer_manager
        .stop(invoker, channel, invoker_is_admin)?;
    let content = data.formatter.announcement(&announcement);
    deliver(data.notifier.as_ref(), &announcement.channel, &content).await;
    Ok(())
}

/// Starts a timer for a specified number of minutes.
///
/// The starter joins automatically. Usage: `start <minutes>`
#[poise::command(prefix_command, category = "Timer")]
pub async fn start(
    ctx: Context<'_>,
    #[description = "Timer duration in minutes"] minutes: i64,
) -> Result<()> {
    let data = ctx.data();
    let initiator = Participant::from(ctx.author());
    let channel = current_channel(ctx).await;
    let scheduler = data.tick_scheduler();

    let response = match data
        .timer_manager
        .start(&initiator, &channel, minutes, &scheduler)
    {
        Ok(snapshot) => data.formatter.started(&snapshot),
        Err(err) => render_rejection(ctx, err)?,
    };

    ctx.say(response).await?;
    Ok(())
}

/// Joins the current timer session if active in this channel.
#[poise::command(prefix_command, category = "Timer")]
pub async fn join(ctx: Context<'_>) -> Result<()> {
    let data = ctx.data();
    let user = Participant::from(ctx.author());
    let channel = current_channel(ctx).await;

    let response = match data.timer_manager.join(&user, &channel) {
        Ok(outcome) => data.formatter.joined(&outcome),
        Err(err) => render_rejection(ctx, err)?,
    };

    ctx.say(response).await?;
    Ok(())
}

/// Shows the time remaining on the current timer.
#[poise::command(prefix_command, aliases("timeleft", "tr"), category = "Timer")]
pub async fn timeremaining(ctx: Context<'_>) -> Result<()> {
    let data = ctx.data();
    let channel = current_channel(ctx).await;

    let report = data.timer_manager.time_remaining(&channel)?;
    ctx.say(data.formatter.time_report(&report)).await?;
    Ok(())
}

/// Stops the current active timer.
#[poise::command(prefix_command, category = "Timer")]
pub async fn stop(ctx: Context<'_>) -> Result<()> {
    let data = ctx.data();
    let invoker = Participant::from(ctx.author());
    let channel = current_channel(ctx).await;
    let invoker_is_admin = match data.timer_manager.stop_policy() {
        StopPolicy::Anyone => false,
        StopPolicy::StarterOrAdmin => author_can_manage_guild(ctx).await,
    };

    if let Err(err) = stop_and_announce(data, &invoker, &channel, invoker_is_admin).await {
        let response = render_rejection(ctx, err)?;
        ctx.say(response).await?;
    }

    Ok(())
}
