//! Leptos wiring for the share consumer.

use std::{cell::RefCell, rc::Rc};

use leptos::{create_signal, logging, on_cleanup, spawn_local, ReadSignal, SignalSet};
use platform_host::unix_time_ms_now;
use platform_host_web::{
    listen_for_agent_messages, page_allows_agent, page_location, post_to_agent,
    replace_page_url, slot_store,
};
use share_contract::RelayMessage;

use crate::{
    consume_on_mount, dispatch_live_message, live, stash_pending_share, AcceptedShare,
    LiveRouting, ShareInbox, ShareSource,
};

/// Attaches the page-wide agent message listener. Later calls are no-ops.
///
/// Shares that arrive while no consumer is mounted are written to the pending slots.
pub fn install_share_listener() {
    if !live::claim_listener_slot() {
        return;
    }
    let attached = listen_for_agent_messages(|message| {
        if let LiveRouting::Stash(payload) = dispatch_live_message(&message) {
            spawn_local(async move {
                if let Err(err) = stash_pending_share(&slot_store(), &payload).await {
                    logging::warn!("stashing share for later failed: {err}");
                }
            });
        }
    });
    if let Err(err) = attached {
        logging::log!("share listener not attached: {err}");
    }
}

async fn announce_ready() {
    let message = match RelayMessage::ClientReady.to_value() {
        Ok(message) => message,
        Err(err) => {
            logging::error!("encoding ready signal failed: {err}");
            return;
        }
    };
    if let Err(err) = post_to_agent(&message).await {
        logging::log!("ready signal not sent: {err}");
    }
}

/// Consumes shares for the calling component and returns the most recently accepted one.
///
/// On mount the pending slots and the page query are drained, share parameters are removed
/// from the address bar, and, on pages that run the agent, the agent is told this page can
/// receive messages. Live shares are accepted for as long as the component stays mounted.
pub fn use_share_inbox() -> ReadSignal<Option<AcceptedShare>> {
    install_share_listener();
    let (latest, set_latest) = create_signal(None::<AcceptedShare>);
    let inbox = Rc::new(RefCell::new(ShareInbox::default()));

    let live_inbox = Rc::clone(&inbox);
    let token = live::subscribe(Rc::new(move |payload| {
        let accepted =
            live_inbox
                .borrow_mut()
                .accept(payload, ShareSource::LiveMessage, unix_time_ms_now());
        if let Some(share) = accepted {
            set_latest.set(Some(share));
        }
    }));
    on_cleanup(move || live::unsubscribe(token));

    spawn_local(async move {
        let location = page_location().unwrap_or_default();
        let outcome = consume_on_mount(
            &inbox,
            &slot_store(),
            &location.pathname,
            &location.search,
            unix_time_ms_now(),
        )
        .await;
        if let Some(cleaned) = outcome.cleaned_url {
            if let Err(err) = replace_page_url(&cleaned) {
                logging::warn!("clearing share parameters failed: {err}");
            }
        }
        if let Some(share) = outcome.accepted.into_iter().last() {
            set_latest.set(Some(share));
        }
        if page_allows_agent() {
            announce_ready().await;
        }
    });

    latest
}
