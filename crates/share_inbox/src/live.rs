//! Page-wide routing of live share messages.
//!
//! One agent-message listener is attached per page. It hands shares to the mounted consumer
//! when there is one and otherwise tells the caller to stash them for the next mount.

use std::{cell::RefCell, rc::Rc};

use serde_json::Value;
use share_contract::{RelayMessage, SharePayload};

/// What to do with one incoming agent message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiveRouting {
    /// Handed to the mounted consumer.
    Delivered,
    /// No consumer is mounted; persist the payload for the next mount.
    Stash(SharePayload),
    /// Not a share message, or a share with nothing in it.
    Ignore,
}

type ShareHandler = Rc<dyn Fn(SharePayload)>;

#[derive(Default)]
struct ListenerState {
    installed: bool,
    next_token: u64,
    subscriber: Option<(u64, ShareHandler)>,
}

thread_local! {
    static LISTENER: RefCell<ListenerState> = RefCell::new(ListenerState::default());
}

/// Registers the consumer that receives live shares, replacing any previous one.
///
/// Returns a token for [`unsubscribe`].
pub fn subscribe(handler: ShareHandler) -> u64 {
    LISTENER.with(|state| {
        let mut state = state.borrow_mut();
        state.next_token += 1;
        let token = state.next_token;
        state.subscriber = Some((token, handler));
        token
    })
}

/// Removes the consumer registered under `token`. Stale tokens are ignored.
pub fn unsubscribe(token: u64) {
    LISTENER.with(|state| {
        let mut state = state.borrow_mut();
        if matches!(state.subscriber, Some((current, _)) if current == token) {
            state.subscriber = None;
        }
    });
}

/// Routes one message posted by the agent.
pub fn dispatch_live_message(message: &Value) -> LiveRouting {
    let Some(payload) = RelayMessage::from_value(message).and_then(RelayMessage::into_share_payload)
    else {
        return LiveRouting::Ignore;
    };
    if payload.is_blank() {
        return LiveRouting::Ignore;
    }
    let handler = LISTENER.with(|state| {
        state
            .borrow()
            .subscriber
            .as_ref()
            .map(|(_, handler)| Rc::clone(handler))
    });
    match handler {
        Some(handler) => {
            handler(payload);
            LiveRouting::Delivered
        }
        None => LiveRouting::Stash(payload),
    }
}

/// Marks the page listener as installed. Returns `false` when it already was.
pub(crate) fn claim_listener_slot() -> bool {
    LISTENER.with(|state| {
        let mut state = state.borrow_mut();
        !std::mem::replace(&mut state.installed, true)
    })
}
