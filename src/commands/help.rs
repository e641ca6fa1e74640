use poise::builtins::HelpConfiguration;

use crate::commands::context::Context;
use crate::error::Result;

/// Shows the list of commands, or the details about one of them.
#[poise::command(prefix_command, track_edits)]
pub async fn help(
    ctx: Context<'_>,
    #[description = "Specific command to show help about"]
    #[rest]
    command: Option<String>,
) -> Result<()> {
    let extra_text = format!(
        "Type {}help <command> for more info on a command.",
        ctx.data().prefix
    );
    let configuration = HelpConfiguration {
        extra_text_at_bottom: &extra_text,
        ..Default::default()
    };

    poise::builtins::help(ctx, command.as_deref(), configuration).await?;
    Ok(())
}
