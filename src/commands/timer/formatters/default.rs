// Texts of every timer message shown in Discord channels
use crate::commands::timer::formatters::base::TimerFormatter;
use crate::commands::timer::models::{
    Announcement, AnnouncementKind, JoinOutcome, TimeReport, TimerSnapshot,
};
use crate::commands::timer::util::{format_time, mentions};
use crate::error::{Error, TimerError};

pub struct DefaultTimerFormatter {
    prefix: String,
}

impl DefaultTimerFormatter {
    pub fn new(prefix: &str) -> Self {
        DefaultTimerFormatter {
            prefix: prefix.to_string(),
        }
    }

    fn seconds(&self, value: u64) -> String {
        format_time(i64::try_from(value).unwrap_or(i64::MAX))
    }

    fn participants_or_nobody(&self, announcement: &Announcement) -> String {
        match announcement.participants.is_empty() {
            true => "No one had joined.".to_string(),
            false => mentions(&announcement.participants),
        }
    }
}

impl TimerFormatter for DefaultTimerFormatter {
    fn started(&self, snapshot: &TimerSnapshot) -> String {
        format!(
            "⏳ Timer started by {} for **{} minute(s)** ({}).\n\
            You've been automatically joined!\n\
            Others can join with `{prefix}join`.\n\
            Use `{prefix}timeremaining` to check time or `{prefix}stop` to end early.",
            snapshot.starter.mention(),
            snapshot.minutes,
            self.seconds(snapshot.remaining_seconds),
            prefix = self.prefix,
        )
    }

    fn joined(&self, outcome: &JoinOutcome) -> String {
        match outcome {
            JoinOutcome::Joined { participant, total } => format!(
                "{} has joined the timer! ({} total participant(s)).",
                participant.mention(),
                total
            ),
            JoinOutcome::AlreadyJoined { participant } => {
                format!("{}, you've already joined the timer!", participant.mention())
            }
        }
    }

    fn time_report(&self, report: &TimeReport) -> String {
        match report {
            TimeReport::Idle => "No timer is currently running.".to_string(),
            TimeReport::InChannel { remaining_seconds } => {
                format!("⏳ Time remaining: **{}**", self.seconds(*remaining_seconds))
            }
            TimeReport::Elsewhere {
                channel,
                remaining_seconds,
            } => format!(
                "A timer is currently active in **{}** with **{}** remaining.",
                channel.display_name(),
                self.seconds(*remaining_seconds)
            ),
        }
    }

    fn announcement(&self, announcement: &Announcement) -> String {
        match &announcement.kind {
            AnnouncementKind::Finished => match announcement.participants.is_empty() {
                true => "⏰ Timer ended! No one had joined.".to_string(),
                false => format!(
                    "⏰ Timer ended! {} Time's up!",
                    mentions(&announcement.participants)
                ),
            },
            AnnouncementKind::Stopped { by } => format!(
                "⏱️ Timer stopped by {}. {}",
                by.mention(),
                self.participants_or_nobody(announcement)
            ),
            AnnouncementKind::StoppedWithLostChannel { by } => format!(
                "⏱️ Timer stopped by {}. (Timer channel context was lost).",
                by.mention()
            ),
        }
    }

    fn interrupted(&self) -> String {
        "⚠️ The timer encountered an unexpected issue and has been stopped.".to_string()
    }

    fn rejection(&self, error: &Error) -> String {
        let timer_error = match error {
            Error::Timer(timer_error) => timer_error,
            Error::InconsistentState(_) => {
                return format!(
                    "Error: The timer task seems to be already running. This might indicate \
                    an inconsistent state. Please try `{prefix}stop` and then `{prefix}start` again.",
                    prefix = self.prefix
                );
            }
            other => return other.to_string(),
        };

        match timer_error {
            TimerError::AlreadyRunning {
                remaining_seconds,
                channel,
            } => format!(
                "A timer is already in progress with **{}** left (started in {}).\n\
                Use `{}stop` to end it first.",
                self.seconds(*remaining_seconds),
                channel
                    .as_ref()
                    .map(|channel| channel.display_name())
                    .unwrap_or_else(|| "an unknown channel".to_string()),
                self.prefix
            ),
            TimerError::NonPositiveDuration => format!(
                "Please provide a positive number of minutes (e.g., `{}start 1`).",
                self.prefix
            ),
            TimerError::DurationTooLong { max_minutes } => format!(
                "The maximum timer duration is {} minutes. Please choose a shorter duration.",
                max_minutes
            ),
            TimerError::NotRunning => format!(
                "No timer is currently running. Start one with `{}start <minutes>`.",
                self.prefix
            ),
            TimerError::WrongChannel { channel } => format!(
                "A timer is running in **{}**. Please use `{}join` in that channel.",
                channel.display_name(),
                self.prefix
            ),
            TimerError::NothingToStop => "No timer is currently running to stop.".to_string(),
            TimerError::NotPermitted { starter_id } => format!(
                "Only <@{}> (who started the timer) or an admin can stop it.",
                starter_id
            ),
        }
    }
}
