//! Filesystem Watcher - watch files and directories and report changes as a typed event stream.

pub mod config;
pub mod display;
pub mod manager;
pub mod watcher;
