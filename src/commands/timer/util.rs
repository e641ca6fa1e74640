use crate::commands::timer::models::Participant;

// Converts seconds into `MM:SS`, or `HH:MM:SS` when at least one hour is left.
pub fn format_time(seconds: i64) -> String {
    let seconds = seconds.max(0);
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    match hours > 0 {
        true => format!("{:02}:{:02}:{:02}", hours, minutes, secs),
        false => format!("{:02}:{:02}", minutes, secs),
    }
}

// Joins participant mentions into a single line.
pub fn mentions(participants: &[Participant]) -> String {
    participants
        .iter()
        .map(|participant| participant.mention())
        .collect::<Vec<String>>()
        .join(" ")
}
