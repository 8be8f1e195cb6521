//! Foreground share consumer.
//!
//! A share can reach the page three ways: a live message from the background agent, the
//! durable `sharedUrl`/`sharedText` slots written before the page was ready, or the page
//! query string. [`ShareInbox`] funnels all of them into one idempotent acceptance step so
//! each share updates visible state at most once.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod consumer;
pub mod hook;
pub mod inbox;
pub mod live;
pub mod pending;
pub mod query;

pub use consumer::{consume_on_mount, MountOutcome};
pub use hook::{install_share_listener, use_share_inbox};
pub use inbox::{AcceptedShare, ShareInbox, ShareSource, DUPLICATE_WINDOW_MS};
pub use live::{dispatch_live_message, subscribe, unsubscribe, LiveRouting};
pub use pending::{stash_pending_share, take_pending_share};
pub use query::{share_from_search, strip_share_params};
