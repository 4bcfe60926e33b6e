//! Object-management layer: owns the workers of every watched object.

mod status;
mod watch_manager;

pub use status::*;
pub use watch_manager::*;
