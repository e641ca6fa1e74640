pub mod context;
pub mod general;
pub mod help;
pub mod hooks;
pub mod timer;

use crate::commands::context::UserData;
use crate::error::Error;

// Every command registered in the framework
pub fn all() -> Vec<poise::Command<UserData, Error>> {
    vec![
        general::hello(),
        general::ping(),
        help::help(),
        timer::start(),
        timer::join(),
        timer::timeremaining(),
        timer::stop(),
    ]
}
