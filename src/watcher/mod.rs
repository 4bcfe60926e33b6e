//! Watch worker core.
//!
//! Issues change-notification requests against the OS for one watched
//! object, decodes raw records into [`Event`]s, correlates two-part
//! renames, filters by interest mask and file identity, and forwards the
//! result to an [`EventSink`].

mod decoder;
mod error;
mod event;
mod filter;
mod mask;
mod object;
mod sink;
mod source;
mod state;
mod worker;

pub use decoder::Decoder;
pub use error::{ErrorKind, WatchError};
pub use event::{ChangeKind, Event, RawRecord};
pub use filter::{is_relevant, is_wanted, names_match};
pub use mask::{EventKind, EventMask, Interest};
pub use object::{WatchId, WatchedObject};
pub use sink::{ChannelSink, EventSink, WatchMessage, WatchPayload};
pub use source::{raw_kind, ManualSource, ManualSourceHandle, NotificationSource, NotifySource};
pub use state::{SharedState, WorkerState};
pub use worker::{start, start_with_source, WorkerHandle};
