// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod client;
pub mod config;
pub mod extract;
pub mod feed;
pub mod keywords;
pub mod locate;
pub mod pipeline;
pub mod seen;
pub mod source;
pub mod text;

// ---- Re-exports for stable public API ----
pub use crate::config::{FeedMode, SourceKind, WatchConfig};
pub use crate::feed::{ChannelMeta, FeedItem};
pub use crate::pipeline::{run_once, RunSummary};
pub use crate::seen::SeenStore;
pub use crate::source::{FilingReference, FormType};
