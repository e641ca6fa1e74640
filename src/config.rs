use std::env;

use crate::error::{Error, Result};

pub const DEFAULT_COMMAND_PREFIX: &str = "!";
pub const DEFAULT_MAX_TIMER_MINUTES: i64 = 120;
// One week is the longest countdown that can be configured.
pub const MAX_CONFIGURABLE_TIMER_MINUTES: i64 = 7 * 24 * 60;

/// Who is allowed to stop a running timer.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum StopPolicy {
    Anyone,
    StarterOrAdmin,
}

impl StopPolicy {
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "anyone" => Ok(StopPolicy::Anyone),
            "starter" => Ok(StopPolicy::StarterOrAdmin),
            other => Err(Error::Config(format!(
                "Unknown TIMER_STOP_POLICY value `{}`. Expected `anyone` or `starter`.",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub token: String,
    pub prefix: String,
    pub max_timer_minutes: i64,
    pub stop_policy: StopPolicy,
}

impl Config {
    // Reads the bot settings from the environment. The `.env` file is optional.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = lookup("DISCORD_TOKEN")
            .or_else(|| lookup("TOKEN"))
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| {
                Error::Config(
                    "Discord bot token not found. Set DISCORD_TOKEN in the .env file \
                    or as an environment variable."
                        .to_string(),
                )
            })?;

        let prefix = lookup("COMMAND_PREFIX")
            .filter(|prefix| !prefix.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_COMMAND_PREFIX.to_string());

        let max_timer_minutes = match lookup("TIMER_MAX_MINUTES") {
            Some(value) => match value.trim().parse::<i64>() {
                Ok(minutes) if minutes > 0 && minutes <= MAX_CONFIGURABLE_TIMER_MINUTES => minutes,
                _ => {
                    let message = format!(
                        "TIMER_MAX_MINUTES must be an integer between 1 and {}, got `{}`.",
                        MAX_CONFIGURABLE_TIMER_MINUTES, value
                    );
                    return Err(Error::Config(message));
                }
            },
            None => DEFAULT_MAX_TIMER_MINUTES,
        };

        let stop_policy = match lookup("TIMER_STOP_POLICY") {
            Some(value) => StopPolicy::parse(&value)?,
            None => StopPolicy::Anyone,
        };

        Ok(Config {
            token,
            prefix,
            max_timer_minutes,
            stop_policy,
        })
    }
}
