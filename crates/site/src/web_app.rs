use leptos::*;
use share_inbox::{use_share_inbox, AcceptedShare, ShareSource};

#[component]
pub fn SiteApp() -> impl IntoView {
    let latest = use_share_inbox();

    view! {
        <main class="site-root">
            <h1>"Link Share"</h1>
            {move || match latest.get() {
                Some(share) => view! { <SharedLink share=share /> }.into_view(),
                None => view! {
                    <p class="share-empty">"Share a link to this app to open it here."</p>
                }
                .into_view(),
            }}
        </main>
    }
}

#[component]
fn SharedLink(share: AcceptedShare) -> impl IntoView {
    let label = source_label(share.source);
    let input = share.input.as_str().to_string();
    let title = (!share.payload.title.is_empty()).then(|| share.payload.title.clone());

    view! {
        <section class="shared-link">
            <p class="shared-source">{label}</p>
            {title.map(|title| view! { <h2>{title}</h2> })}
            <p class="shared-input">{input}</p>
        </section>
    }
}

fn source_label(source: ShareSource) -> &'static str {
    match source {
        ShareSource::LiveMessage => "Shared just now",
        ShareSource::PendingSlot => "Shared while the app was closed",
        ShareSource::QueryParams => "Shared from the link",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_source_has_a_distinct_label() {
        let labels = [
            source_label(ShareSource::LiveMessage),
            source_label(ShareSource::PendingSlot),
            source_label(ShareSource::QueryParams),
        ];
        assert_ne!(labels[0], labels[1]);
        assert_ne!(labels[1], labels[2]);
        assert_ne!(labels[0], labels[2]);
    }
}
