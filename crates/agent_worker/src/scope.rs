//! Decisions the worker makes before handing an event to the agent.

use leptos::logging;
use offline_agent::{AgentConfig, WorkerPhase};
use platform_host::{FetchRequest, FetchResponse, STATUS_FOUND};
use share_contract::{classify_share_request, parse_request_url};

/// Configuration compiled into the worker.
pub const BUNDLED_CONFIG: &str = include_str!("../agent.toml");

/// Parses `raw`, falling back to the built-in defaults when it is invalid.
pub fn load_config(raw: &str) -> AgentConfig {
    AgentConfig::from_toml_str(raw).unwrap_or_else(|err| {
        logging::error!("bundled agent config rejected, using defaults: {err}");
        AgentConfig::default()
    })
}

/// Which registration slots held a worker when this script started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RegistrationSlots {
    /// `registration.installing` is set.
    pub installing: bool,
    /// `registration.waiting` is set.
    pub waiting: bool,
    /// `registration.active` is set.
    pub active: bool,
}

/// Picks the agent phase a restarted worker resumes in.
///
/// `state` is this worker's own `serviceWorker.state`. A worker stopped while activating
/// restarts as installed so the pending activate event still applies. Engines that do not
/// expose the state fall back to the registration slots.
pub fn resume_phase(state: &str, slots: RegistrationSlots) -> WorkerPhase {
    match state {
        "installed" | "activating" => WorkerPhase::Installed,
        "activated" => WorkerPhase::Active,
        "parsed" | "installing" | "redundant" => WorkerPhase::Uninstalled,
        _ => phase_from_slots(slots),
    }
}

fn phase_from_slots(slots: RegistrationSlots) -> WorkerPhase {
    // An install in progress may be this script, and it must still accept the install event.
    if slots.installing {
        WorkerPhase::Uninstalled
    } else if slots.waiting {
        WorkerPhase::Installed
    } else if slots.active {
        WorkerPhase::Active
    } else {
        WorkerPhase::Uninstalled
    }
}

/// Returns whether the agent should see `request` at all.
///
/// Cross-origin requests and non-`GET` requests that are not shares stay with the browser:
/// neither is ever cached, and forwarding them through the agent would lose the request
/// body and mode.
pub fn is_interceptable(request: &FetchRequest, scope_origin: &str) -> bool {
    let Some(url) = parse_request_url(&request.url) else {
        return false;
    };
    if url.origin().ascii_serialization() != scope_origin {
        return false;
    }
    request.is_get() || classify_share_request(&request.url).is_some()
}

/// Returns the `Location` of a redirect built by [`FetchResponse::redirect`].
pub fn redirect_target(response: &FetchResponse) -> Option<&str> {
    (response.status == STATUS_FOUND)
        .then(|| response.header("Location"))
        .flatten()
}
