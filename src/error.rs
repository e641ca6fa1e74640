use std::result;
use std::sync::PoisonError;

use serenity::prelude::SerenityError;
use thiserror::Error as ThisError;

use crate::commands::timer::models::ChannelRef;

pub type Result<T> = result::Result<T, Error>;

#[derive(Debug, Clone, Eq, PartialEq, ThisError)]
pub enum Error {
    #[error("{0}")]
    SerenityError(String),
    #[error("{0}")]
    Mutex(String),
    #[error("{0}")]
    Config(String),
    #[error("{0}")]
    Timer(TimerError),
    #[error("{0}")]
    InconsistentState(String),
    #[error("{0}")]
    Scheduler(String),
}

impl Error {
    // Rejections that are answered with a plain reply instead of
    // going through the framework error handler.
    pub fn is_user_facing(&self) -> bool {
        matches!(self, Error::Timer(_) | Error::InconsistentState(_))
    }
}

/// User input errors raised by the timer operations. None of them changes the session.
#[derive(Debug, Clone, Eq, PartialEq, ThisError)]
pub enum TimerError {
    #[error("A timer is already in progress with {remaining_seconds}s left.")]
    AlreadyRunning {
        remaining_seconds: u64,
        channel: Option<ChannelRef>,
    },
    #[error("The duration must be positive.")]
    NonPositiveDuration,
    #[error("The duration exceeds the maximum of {max_minutes} minutes.")]
    DurationTooLong { max_minutes: i64 },
    #[error("No timer is currently running.")]
    NotRunning,
    #[error("The timer is bound to another channel.")]
    WrongChannel { channel: ChannelRef },
    #[error("No timer is currently running to stop.")]
    NothingToStop,
    #[error("Only the starter or an admin can stop the timer.")]
    NotPermitted { starter_id: u64 },
}

impl From<TimerError> for Error {
    fn from(err: TimerError) -> Error {
        Error::Timer(err)
    }
}

impl From<SerenityError> for Error {
    fn from(err: SerenityError) -> Error {
        let description = err.to_string();
        Error::SerenityError(description)
    }
}

impl<T> From<PoisonError<T>> for Error {
    fn from(err: PoisonError<T>) -> Error {
        let description = format!("The timer session lock is poisoned: {}", err);
        Error::Mutex(description)
    }
}
