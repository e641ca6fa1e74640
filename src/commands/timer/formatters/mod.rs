pub mod base;
pub mod default;

pub use crate::commands::timer::formatters::base::TimerFormatter;
pub use crate::commands::timer::formatters::default::DefaultTimerFormatter;
