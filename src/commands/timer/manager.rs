use std::sync::{Mutex, PoisonError};

use tracing::{error, info, warn};
use uuid::Uuid;

use crate::commands::timer::models::{
    Announcement, AnnouncementKind, ChannelRef, JoinOutcome, Participant, SECONDS_PER_MINUTE,
    TickOutcome, TimeReport, TimerSession, TimerSnapshot, TimerStatus,
};
use crate::commands::timer::scheduler::TickSchedule;
use crate::config::{Config, DEFAULT_MAX_TIMER_MINUTES, StopPolicy};
use crate::error::{Error, Result, TimerError};

/// Owns the single timer session of the process.
///
/// Every operation finishes its reads and writes under the lock and hands back
/// copies of whatever has to be announced, so no message is ever sent while a
/// half-updated session is visible.
#[derive(Debug)]
#[non_exhaustive]
pub struct TimerManager {
    session: Mutex<TimerSession>,
    max_minutes: i64,
    stop_policy: StopPolicy,
}

impl TimerManager {
    #[cfg(test)]
    pub fn new() -> Self {
        TimerManager::with_limits(DEFAULT_MAX_TIMER_MINUTES, StopPolicy::Anyone)
    }

    pub fn with_limits(max_minutes: i64, stop_policy: StopPolicy) -> Self {
        TimerManager {
            session: Mutex::new(TimerSession::default()),
            max_minutes,
            stop_policy,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        TimerManager::with_limits(config.max_timer_minutes, config.stop_policy)
    }

    pub fn stop_policy(&self) -> StopPolicy {
        self.stop_policy
    }

    pub fn status(&self) -> Result<TimerStatus> {
        let session = self.session.lock()?;
        Ok(TimerStatus::capture(&session))
    }

    pub fn start(
        &self,
        initiator: &Participant,
        channel: &ChannelRef,
        minutes: i64,
        scheduler: &dyn TickSchedule,
    ) -> Result<TimerSnapshot> {
        let mut session = self.session.lock()?;

        if session.running {
            return Err(Error::from(TimerError::AlreadyRunning {
                remaining_seconds: session.remaining_seconds,
                channel: session.channel.clone(),
            }));
        }

        if minutes <= 0 {
            return Err(Error::from(TimerError::NonPositiveDuration));
        }

        let remaining_seconds = match u64::try_from(minutes)
            .ok()
            .filter(|_| minutes <= self.max_minutes)
            .and_then(|minutes| minutes.checked_mul(SECONDS_PER_MINUTE))
        {
            Some(seconds) => seconds,
            None => {
                return Err(Error::from(TimerError::DurationTooLong {
                    max_minutes: self.max_minutes,
                }));
            }
        };

        if session.tick.as_ref().is_some_and(|tick| tick.is_active()) {
            warn!("The tick loop is still active while no timer is running. Resetting the timer state.");
            if let Some(tick) = session.reset() {
                tick.halt();
            }
            let message = "The tick loop was already active before the timer start.".to_string();
            return Err(Error::InconsistentState(message));
        }

        session.reset();
        let session_id = Uuid::new_v4();
        session.id = Some(session_id);
        session.remaining_seconds = remaining_seconds;
        session.participants.push(initiator.clone());
        session.channel = Some(channel.clone());
        session.starter = Some(initiator.clone());
        // Must be visible before the first tick can fire.
        session.running = true;

        match scheduler.schedule(session_id) {
            Ok(tick) => session.tick = Some(tick),
            Err(err) => {
                error!("Can't schedule the timer tick: {}", err.to_string());
                session.reset();
                return Err(err);
            }
        }

        info!(
            "Timer {} started by '{}' for {} minute(s)",
            session_id,
            initiator.get_username(),
            minutes
        );
        Ok(TimerSnapshot::new(
            session_id,
            minutes,
            remaining_seconds,
            initiator,
            channel,
        ))
    }

    pub fn join(&self, user: &Participant, channel: &ChannelRef) -> Result<JoinOutcome> {
        let mut session = self.session.lock()?;

        if !session.running {
            return Err(Error::from(TimerError::NotRunning));
        }

        match &session.channel {
            Some(bound) if !bound.is_same(channel) => {
                return Err(Error::from(TimerError::WrongChannel {
                    channel: bound.clone(),
                }));
            }
            Some(_) => (),
            None => return Err(Error::from(TimerError::NotRunning)),
        }

        if session.has_participant(user) {
            return Ok(JoinOutcome::AlreadyJoined {
                participant: user.clone(),
            });
        }

        session.participants.push(user.clone());
        Ok(JoinOutcome::Joined {
            participant: user.clone(),
            total: session.participants.len(),
        })
    }

    pub fn time_remaining(&self, channel: &ChannelRef) -> Result<TimeReport> {
        let session = self.session.lock()?;

        if !session.running {
            return Ok(TimeReport::Idle);
        }

        let report = match &session.channel {
            Some(bound) if !bound.is_same(channel) => TimeReport::Elsewhere {
                channel: bound.clone(),
                remaining_seconds: session.remaining_seconds,
            },
            _ => TimeReport::InChannel {
                remaining_seconds: session.remaining_seconds,
            },
        };
        Ok(report)
    }

    pub fn stop(
        &self,
        invoker: &Participant,
        invoking_channel: &ChannelRef,
        invoker_is_admin: bool,
    ) -> Result<Announcement> {
        let mut session = self.session.lock()?;

        if !session.running {
            return Err(Error::from(TimerError::NothingToStop));
        }

        if self.stop_policy == StopPolicy::StarterOrAdmin && !invoker_is_admin {
            if let Some(starter) = session.starter.as_ref() {
                if starter.get_user_id() != invoker.get_user_id() {
                    return Err(Error::from(TimerError::NotPermitted {
                        starter_id: starter.get_user_id(),
                    }));
                }
            }
        }

        let channel = session.channel.clone();
        let participants = session.participants.clone();
        let session_id = session.id;

        session.running = false;
        if let Some(tick) = session.reset() {
            tick.halt();
        }
        drop(session);

        info!(
            "Timer {:?} stopped by '{}'",
            session_id,
            invoker.get_username()
        );
        let announcement = match channel {
            Some(channel) => Announcement::new(
                AnnouncementKind::Stopped { by: invoker.clone() },
                channel,
                participants,
            ),
            None => {
                warn!("The timer channel was missing during stop while the timer was running.");
                Announcement::new(
                    AnnouncementKind::StoppedWithLostChannel { by: invoker.clone() },
                    invoking_channel.clone(),
                    participants,
                )
            }
        };
        Ok(announcement)
    }

    // A single firing of the schedule that belongs to `session_id`.
    pub fn tick(&self, session_id: Uuid) -> Result<TickOutcome> {
        let mut session = self.session.lock()?;

        if !session.running || session.id != Some(session_id) {
            return Ok(TickOutcome::Halted);
        }

        session.remaining_seconds = session.remaining_seconds.saturating_sub(1);
        if session.remaining_seconds > 0 {
            return Ok(TickOutcome::Continue {
                remaining_seconds: session.remaining_seconds,
            });
        }

        let channel = session.channel.clone();
        let participants = session.participants.clone();

        // The caller is the schedule itself and exits on `Finished`,
        // so the handle is dropped instead of aborted.
        session.running = false;
        drop(session.reset());
        drop(session);

        match channel {
            Some(channel) => Ok(TickOutcome::Finished(Announcement::new(
                AnnouncementKind::Finished,
                channel,
                participants,
            ))),
            None => {
                warn!("Timer {} finished without a bound channel.", session_id);
                Ok(TickOutcome::Halted)
            }
        }
    }

    // Runs after the schedule of `session_id` has exited for any reason. Returns
    // the channel to warn when the session was still running at that point.
    pub fn recover(&self, session_id: Uuid) -> Option<ChannelRef> {
        let mut session = self
            .session
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if !session.running || session.id != Some(session_id) {
            return None;
        }

        error!(
            "CRITICAL: The tick loop of timer {} stopped unexpectedly while the timer was running. Resetting the timer state.",
            session_id
        );
        let channel = session.channel.clone();
        session.running = false;
        if let Some(tick) = session.reset() {
            tick.halt();
        }
        drop(session);
        self.session.clear_poison();

        channel
    }
}
