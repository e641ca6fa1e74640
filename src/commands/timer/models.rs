use serenity::model::user::User as DiscordUser;
use uuid::Uuid;

use crate::commands::timer::scheduler::TickHandle;

pub const SECONDS_PER_MINUTE: u64 = 60;

#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Participant {
    user_id: u64,
    username: String,
}

impl Participant {
    pub fn new(user_id: u64, username: &str) -> Self {
        Participant {
            user_id,
            username: username.to_string(),
        }
    }

    // Returns a unique identifier in Discord
    pub fn get_user_id(&self) -> u64 {
        self.user_id
    }

    // Returns a username in the Discord room
    pub fn get_username(&self) -> String {
        self.username.clone()
    }

    // Returns a text that pings the user in the channel
    pub fn mention(&self) -> String {
        format!("<@{}>", self.user_id)
    }
}

impl From<&DiscordUser> for Participant {
    fn from(discord_user: &DiscordUser) -> Self {
        Participant {
            user_id: discord_user.id.get(),
            username: discord_user.name.clone(),
        }
    }
}

/// A messaging channel the timer can be bound to.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ChannelRef {
    channel_id: u64,
    name: Option<String>,
}

impl ChannelRef {
    pub fn new(channel_id: u64, name: Option<String>) -> Self {
        ChannelRef { channel_id, name }
    }

    pub fn get_channel_id(&self) -> u64 {
        self.channel_id
    }

    // Channels are identified by id only, the name is a display hint.
    pub fn is_same(&self, other: &ChannelRef) -> bool {
        self.channel_id == other.channel_id
    }

    // Falls back to the channel mention when the name couldn't be resolved.
    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) => format!("#{}", name),
            None => format!("<#{}>", self.channel_id),
        }
    }
}

/// The process-wide timer state. `Default` is the idle state.
#[derive(Debug, Default)]
pub struct TimerSession {
    pub(crate) id: Option<Uuid>,
    pub(crate) running: bool,
    pub(crate) remaining_seconds: u64,
    pub(crate) participants: Vec<Participant>,
    pub(crate) channel: Option<ChannelRef>,
    pub(crate) starter: Option<Participant>,
    pub(crate) tick: Option<TickHandle>,
}

impl TimerSession {
    // Checks that nothing from a previous session lingers.
    #[cfg(test)]
    pub fn is_idle(&self) -> bool {
        !self.running
            && self.id.is_none()
            && self.remaining_seconds == 0
            && self.participants.is_empty()
            && self.channel.is_none()
            && self.starter.is_none()
            && self.tick.is_none()
    }

    pub fn has_participant(&self, user: &Participant) -> bool {
        self.participants
            .iter()
            .any(|participant| participant.get_user_id() == user.get_user_id())
    }

    // Zeroes every field. The detached tick handle is given back to the caller,
    // which decides whether the schedule has to be halted.
    pub fn reset(&mut self) -> Option<TickHandle> {
        std::mem::take(self).tick
    }
}

/// Outcome of a successful `start`.
#[readonly::make]
#[derive(Debug, Clone)]
pub struct TimerSnapshot {
    pub session_id: Uuid,
    pub minutes: i64,
    pub remaining_seconds: u64,
    pub starter: Participant,
    pub channel: ChannelRef,
}

impl TimerSnapshot {
    pub fn new(
        session_id: Uuid,
        minutes: i64,
        remaining_seconds: u64,
        starter: &Participant,
        channel: &ChannelRef,
    ) -> Self {
        TimerSnapshot {
            session_id,
            minutes,
            remaining_seconds,
            starter: starter.clone(),
            channel: channel.clone(),
        }
    }
}

/// A read-only copy of the whole session, taken under the lock.
#[readonly::make]
#[derive(Debug, Clone)]
pub struct TimerStatus {
    pub running: bool,
    pub remaining_seconds: u64,
    pub participants: Vec<Participant>,
    pub channel: Option<ChannelRef>,
    pub starter: Option<Participant>,
    pub tick_scheduled: bool,
}

impl TimerStatus {
    pub fn capture(session: &TimerSession) -> Self {
        TimerStatus {
            running: session.running,
            remaining_seconds: session.remaining_seconds,
            participants: session.participants.clone(),
            channel: session.channel.clone(),
            starter: session.starter.clone(),
            tick_scheduled: session.tick.is_some(),
        }
    }

    pub fn is_idle(&self) -> bool {
        !self.running
            && self.remaining_seconds == 0
            && self.participants.is_empty()
            && self.channel.is_none()
            && self.starter.is_none()
            && !self.tick_scheduled
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum JoinOutcome {
    Joined { participant: Participant, total: usize },
    AlreadyJoined { participant: Participant },
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum TimeReport {
    Idle,
    InChannel { remaining_seconds: u64 },
    Elsewhere { channel: ChannelRef, remaining_seconds: u64 },
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum AnnouncementKind {
    // The countdown reached zero.
    Finished,
    // Somebody used the stop command.
    Stopped { by: Participant },
    // Stopped, but the session had no bound channel and the message
    // goes to the channel where stop was invoked.
    StoppedWithLostChannel { by: Participant },
}

/// A closing message captured from the session before it was reset.
#[readonly::make]
#[derive(Debug, Clone)]
pub struct Announcement {
    pub kind: AnnouncementKind,
    pub channel: ChannelRef,
    pub participants: Vec<Participant>,
}

impl Announcement {
    pub fn new(kind: AnnouncementKind, channel: ChannelRef, participants: Vec<Participant>) -> Self {
        Announcement {
            kind,
            channel,
            participants,
        }
    }
}

#[derive(Debug)]
pub enum TickOutcome {
    // The session is gone or belongs to another schedule, stop firing.
    Halted,
    Continue { remaining_seconds: u64 },
    Finished(Announcement),
}
