pub mod config;
pub mod dom;
pub mod error;
pub mod event_log;
pub mod host;
pub mod selectors;
pub mod snapshot;
pub mod watcher;

pub use dom::{Document, MutationRecord, Node};
pub use error::SongwatchError;
pub use host::NotifyHost;
pub use selectors::SelectorTable;
pub use snapshot::TrackSnapshot;
pub use watcher::{AttachOutcome, BatchReport, TrackWatcher};
