//! Colored CLI display utilities for watcher output.
//!
//! This module provides functions for printing colored, formatted event
//! lines to the terminal, or JSON lines when requested.

use std::io::{self, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use owo_colors::OwoColorize;

use crate::watcher::{ChangeKind, Event, WatchMessage, WatchPayload, WatchedObject};

/// Maximum length for truncated paths.
const DEFAULT_MAX_LEN: usize = 80;

/// Format a timestamp in the same format as tracing.
fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()
}

/// Truncate a path for display, keeping its tail, which carries the file name.
#[must_use]
pub fn truncate_path(path: &Path, max_len: usize, raw_mode: bool) -> String {
    let s = path.display().to_string();
    let len = s.chars().count();
    if raw_mode || len <= max_len {
        return s;
    }
    if max_len <= 3 {
        return "...".to_string();
    }
    let tail: String = s.chars().skip(len - (max_len - 3)).collect();
    format!("...{tail}")
}

/// Paths of an event, as printed after its tag.
#[must_use]
pub fn describe_event(event: &Event, raw_mode: bool) -> String {
    match event {
        Event::Change { path, .. } => truncate_path(path, DEFAULT_MAX_LEN, raw_mode),
        Event::Rename { old_path, new_path } => format!(
            "{} -> {}",
            truncate_path(old_path, DEFAULT_MAX_LEN, raw_mode),
            truncate_path(new_path, DEFAULT_MAX_LEN, raw_mode)
        ),
    }
}

/// Print the start of a watch.
pub fn print_watch_start(object: &WatchedObject) {
    let scope = match (object.is_directory(), object.recursive()) {
        (true, true) => "directory, recursive",
        (true, false) => "directory",
        (false, _) => "file",
    };
    println!(
        "{} {} {} ({}) events={}",
        format_timestamp(&Utc::now()).dimmed(),
        "[WATCH]".blue().bold(),
        object.path().display().cyan(),
        scope.dimmed(),
        object.mask()
    );
    let _ = io::stdout().flush();
}

/// Print one worker message as a colored line.
pub fn print_message(message: &WatchMessage, raw_mode: bool) {
    let ts = format_timestamp(&message.at);
    match &message.payload {
        WatchPayload::Event(event) => {
            let tag = match event {
                Event::Change {
                    kind: ChangeKind::Added,
                    ..
                } => "[ADDED]".green().bold().to_string(),
                Event::Change {
                    kind: ChangeKind::Removed,
                    ..
                } => "[REMOVED]".red().bold().to_string(),
                Event::Change {
                    kind: ChangeKind::Modified,
                    ..
                } => "[MODIFIED]".yellow().bold().to_string(),
                Event::Rename { .. } => "[RENAMED]".magenta().bold().to_string(),
            };
            println!("{} {} {}", ts.dimmed(), tag, describe_event(event, raw_mode));
        }
        WatchPayload::Error(error) => {
            println!("{} {} {}", ts.dimmed(), "[ERROR]".red().bold(), error.red());
        }
    }
    let _ = io::stdout().flush();
}

/// Print one worker message as a JSON line.
pub fn print_json(message: &WatchMessage) {
    match serde_json::to_string(message) {
        Ok(line) => println!("{line}"),
        Err(e) => tracing::warn!(error = %e, "Failed to serialize message"),
    }
    let _ = io::stdout().flush();
}

/// Print an error message.
pub fn print_error(message: &str) {
    eprintln!("{} {}", "[ERROR]".red().bold(), message);
}
