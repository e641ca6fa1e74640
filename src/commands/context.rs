use std::sync::Arc;

use poise::Context as PoiseContext;

use crate::commands::timer::formatters::TimerFormatter;
use crate::commands::timer::manager::TimerManager;
use crate::commands::timer::notifier::Notifier;
use crate::commands::timer::scheduler::TickScheduler;

// User data, which is stored and accessible in all command invocations
pub struct UserData {
    pub timer_manager: Arc<TimerManager>,
    pub notifier: Arc<dyn Notifier>,
    pub formatter: Arc<dyn TimerFormatter>,
    pub prefix: String,
}

impl UserData {
    // Builds the schedule that drives the countdown of a newly started timer.
    pub fn tick_scheduler(&self) -> TickScheduler {
        TickScheduler::new(
            self.timer_manager.clone(),
            self.notifier.clone(),
            self.formatter.clone(),
        )
    }
}

// Generic context available across Poise commands
pub type Context<'a> = PoiseContext<'a, UserData, crate::error::Error>;
