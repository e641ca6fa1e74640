pub mod formatters;
pub mod handlers;
pub mod manager;
pub mod models;
pub mod notifier;
pub mod scheduler;
pub mod util;

pub use crate::commands::timer::handlers::{
    // Timer lifecycle
    start,
    stop,

    // Interaction with the running timer
    join,
    timeremaining,
};
