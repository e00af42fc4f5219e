/// Log formatting and output with ANSI colors
///
/// Console-only: timestamp prefix, colored tag, colored level, message.
use super::levels::LogLevel;
use super::tags::LogTag;
use chrono::Local;
use colored::*;

/// Width reserved for the tag column so messages line up
const TAG_WIDTH: usize = 8;

pub fn format_and_log(tag: LogTag, level: LogLevel, message: &str) {
    let time = Local::now().format("%H:%M:%S").to_string();
    let tag_str = format_tag(tag);
    let level_str = format_level(level);

    println!("{} [{}] [{}] {}", time.dimmed(), tag_str, level_str, message);
}

fn format_tag(tag: LogTag) -> ColoredString {
    let padded = format!("{:width$}", tag.as_str(), width = TAG_WIDTH);
    match tag {
        LogTag::Cache => padded.cyan(),
        LogTag::Coordinator => padded.magenta(),
        LogTag::Sources => padded.blue(),
        LogTag::Refresher => padded.green(),
        LogTag::System => padded.white(),
    }
}

fn format_level(level: LogLevel) -> ColoredString {
    match level {
        LogLevel::Error => level.as_str().red().bold(),
        LogLevel::Warning => level.as_str().yellow(),
        LogLevel::Info => level.as_str().normal(),
        LogLevel::Debug => level.as_str().dimmed(),
    }
}
