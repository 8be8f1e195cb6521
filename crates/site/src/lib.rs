mod registration;
mod web_app;

pub use registration::{start_agent_registration, UpdateNotice, AGENT_SCRIPT_URL};
pub use web_app::SiteApp;

#[cfg(all(feature = "csr", target_arch = "wasm32"))]
pub fn mount() {
    console_error_panic_hook::set_once();
    start_agent_registration();
    leptos::mount_to_body(|| leptos::view! { <SiteApp /> })
}
