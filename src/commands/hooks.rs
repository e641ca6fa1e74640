use poise::FrameworkError;
use tracing::{debug, error, info};

use crate::commands::context::{Context, UserData};
use crate::error::Error;

pub async fn log_command(ctx: Context<'_>) {
    info!(
        "Got command '{}' by user '{}'",
        ctx.command().qualified_name,
        ctx.author().name
    );
}

pub async fn on_error(error: FrameworkError<'_, UserData, Error>) {
    match error {
        FrameworkError::ArgumentParse {
            error, input, ctx, ..
        } => {
            let command = ctx.command();
            let parameters = command
                .parameters
                .iter()
                .map(|parameter| format!("`{}`", parameter.name))
                .collect::<Vec<String>>()
                .join(", ");
            let usage = format!(
                "Use `{}help {}` for usage details.",
                ctx.data().prefix,
                command.qualified_name
            );
            let response = match input {
                None => format!("Oops! You missed an argument: {}. {}", parameters, usage),
                Some(input) => format!(
                    "Hmm, that's not quite right. The argument you provided for {} (`{}`) \
                    seems to be the wrong type. {}",
                    parameters, input, usage
                ),
            };

            debug!(
                "Can't parse arguments of '{}': {}",
                command.qualified_name,
                error.to_string()
            );
            if let Err(err) = ctx.say(response).await {
                error!("Can't send the message to the channel: {}", err.to_string());
            }
        }
        FrameworkError::UnknownCommand { msg_content, .. } => {
            info!("Command not found: {}", msg_content);
        }
        FrameworkError::Command { error, ctx, .. } => {
            let command = &ctx.command().qualified_name;
            error!(
                "An error occurred in command '{}': {}",
                command,
                error.to_string()
            );

            let response = format!(
                "An internal error occurred while running `{}`. \
                The developers have been alerted (check the console!).",
                command
            );
            if let Err(err) = ctx.say(response).await {
                error!("Can't send the message to the channel: {}", err.to_string());
            }
        }
        other => {
            if let Err(err) = poise::builtins::on_error(other).await {
                error!("An unexpected error occurred: {}", err.to_string());
            }
        }
    }
}
