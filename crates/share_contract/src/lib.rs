//! Shared contract types between the background agent and the foreground application.
//!
//! Covers the share payload value object, the relay wire messages, share-target request
//! classification, and the effective-input rules applied when a share is received.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod intake;
pub mod message;
pub mod payload;
pub mod resolve;

pub use intake::{
    classify_share_request, extract_share_payload, is_share_target, parse_request_url,
    ShareSignals, SHARE_SUCCESS_PARAM, SHARE_TARGET_MARKER, TEXT_PARAM, TITLE_PARAM, URL_PARAM,
};
pub use message::{RelayMessage, SHARE_READY_MESSAGE_TYPE, SHARE_TARGET_MESSAGE_TYPE};
pub use payload::SharePayload;
pub use resolve::{extract_first_http_url, resolve_effective_input, EffectiveShareInput};
