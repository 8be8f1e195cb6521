//! Agent registration for the foreground page.

use std::rc::Rc;

use leptos::{logging, spawn_local};
use platform_host_web::{
    agent_supported, is_framed, page_location, register_agent, should_register,
    unregister_agent,
};

/// Loader script shipped by `agent_worker` as `sw.js`; it boots the agent in its worker
/// scope.
pub const AGENT_SCRIPT_URL: &str = "/sw.js";

/// What a newly installed agent version means for the open page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateNotice {
    /// An older version still controls the page; a refresh picks up the new content.
    NewContentAvailable,
    /// First install; the shell now works offline.
    ContentCached,
}

impl UpdateNotice {
    /// Classifies an install by whether the page already had a controlling agent.
    pub const fn from_controller(controlled: bool) -> Self {
        if controlled {
            Self::NewContentAvailable
        } else {
            Self::ContentCached
        }
    }

    /// Console message for the notice.
    pub const fn message(self) -> &'static str {
        match self {
            Self::NewContentAvailable => "New content is available; refresh to update.",
            Self::ContentCached => "Content is cached for offline use.",
        }
    }
}

/// Registers or unregisters the agent depending on where the page runs.
pub fn start_agent_registration() {
    if !agent_supported() {
        logging::log!("service workers unsupported; running online only");
        return;
    }
    let hostname = page_location().map(|location| location.hostname).unwrap_or_default();
    let register = should_register(&hostname, is_framed());

    spawn_local(async move {
        if !register {
            match unregister_agent().await {
                Ok(()) => logging::log!("agent disabled on local or framed page"),
                Err(err) => logging::warn!("unregistering agent failed: {err}"),
            }
            return;
        }
        let on_installed = Rc::new(|controlled: bool| {
            logging::log!("{}", UpdateNotice::from_controller(controlled).message());
        });
        match register_agent(AGENT_SCRIPT_URL, on_installed).await {
            Ok(()) => logging::log!("agent registered from {AGENT_SCRIPT_URL}"),
            Err(err) => logging::error!("agent registration failed: {err}"),
        }
    });
}
