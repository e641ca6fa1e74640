use crate::commands::timer::models::{Announcement, JoinOutcome, TimeReport, TimerSnapshot};
use crate::error::Error;

pub trait TimerFormatter: Send + Sync {
    // Reply for the user who has started a new timer.
    fn started(&self, snapshot: &TimerSnapshot) -> String;
    // Reply for the join command.
    fn joined(&self, outcome: &JoinOutcome) -> String;
    // Reply for the time remaining command.
    fn time_report(&self, report: &TimeReport) -> String;
    // Closing message sent to the timer's channel on completion or stop.
    fn announcement(&self, announcement: &Announcement) -> String;
    // Warning sent when the countdown died without finishing.
    fn interrupted(&self) -> String;
    // Actionable reply for a rejected command.
    fn rejection(&self, error: &Error) -> String;
}
