//! Share delivery to foreground windows.
//!
//! An existing window is focused and messaged right away. Otherwise a new window is opened
//! and the message waits for that window's ready signal (or a fixed delay) before it is sent.
//! Failures along the way are logged; a share request is always answered with a redirect.

use std::{
    cell::RefCell,
    collections::{HashMap, VecDeque},
    rc::Rc,
};

use futures::{
    channel::oneshot,
    future::{select, Either},
};
use leptos::logging;
use platform_host::{ClientId, ClientRegistry, DelayTimer};
use serde_json::Value;
use share_contract::{RelayMessage, SharePayload};

use crate::{DeferredWork, DeliveryMode};

const EARLY_READY_CAPACITY: usize = 16;

#[derive(Default)]
struct ReadyState {
    waiters: HashMap<ClientId, oneshot::Sender<()>>,
    early: VecDeque<ClientId>,
}

impl ReadyState {
    /// Drops waiters whose delivery was dropped before the signal arrived.
    fn prune_abandoned(&mut self) {
        self.waiters.retain(|_, waiter| !waiter.is_canceled());
    }
}

/// Ready signals received from foreground windows, matched against pending deliveries.
///
/// A signal that arrives before its delivery starts waiting is buffered, so the window does
/// not have to win a race against `open_window` resolving.
#[derive(Clone, Default)]
pub struct ReadySignals {
    inner: Rc<RefCell<ReadyState>>,
}

impl ReadySignals {
    /// Records that `client` attached its message listener.
    pub fn notify_ready(&self, client: &ClientId) {
        let mut state = self.inner.borrow_mut();
        state.prune_abandoned();
        if let Some(waiter) = state.waiters.remove(client) {
            let _ = waiter.send(());
            return;
        }
        if state.early.contains(client) {
            return;
        }
        if state.early.len() == EARLY_READY_CAPACITY {
            state.early.pop_front();
        }
        state.early.push_back(client.clone());
    }

    /// Returns a receiver that completes once `client` signals readiness.
    pub fn wait_for(&self, client: &ClientId) -> oneshot::Receiver<()> {
        let (sender, receiver) = oneshot::channel();
        let mut state = self.inner.borrow_mut();
        state.prune_abandoned();
        if let Some(position) = state.early.iter().position(|early| early == client) {
            state.early.remove(position);
            let _ = sender.send(());
        } else {
            state.waiters.insert(client.clone(), sender);
        }
        receiver
    }

    /// Drops any pending wait for `client`.
    pub fn forget(&self, client: &ClientId) {
        self.inner.borrow_mut().waiters.remove(client);
    }

    /// Number of deliveries currently waiting on a signal.
    pub fn pending_waiters(&self) -> usize {
        let mut state = self.inner.borrow_mut();
        state.prune_abandoned();
        state.waiters.len()
    }
}

/// Which path a share took.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryRoute {
    /// The first existing window was focused and messaged.
    FocusedExisting(ClientId),
    /// A new window was opened; the message is sent by the deferred work.
    OpenedNew(ClientId),
    /// No window exists and none could be opened.
    NoWindow,
}

/// Outcome of [`ClientDeliveryRouter::route`].
pub struct RoutedDelivery {
    /// Path taken.
    pub route: DeliveryRoute,
    /// Pending delivery to a freshly opened window.
    pub deferred: Option<DeferredWork>,
}

impl RoutedDelivery {
    fn settled(route: DeliveryRoute) -> Self {
        Self {
            route,
            deferred: None,
        }
    }
}

/// Routes share payloads to foreground windows.
#[derive(Clone)]
pub struct ClientDeliveryRouter {
    clients: Rc<dyn ClientRegistry>,
    timer: Rc<dyn DelayTimer>,
    ready: ReadySignals,
    entry_url: String,
    mode: DeliveryMode,
}

impl ClientDeliveryRouter {
    /// Creates a router opening new windows at `entry_url`.
    pub fn new(
        clients: Rc<dyn ClientRegistry>,
        timer: Rc<dyn DelayTimer>,
        ready: ReadySignals,
        entry_url: impl Into<String>,
        mode: DeliveryMode,
    ) -> Self {
        Self {
            clients,
            timer,
            ready,
            entry_url: entry_url.into(),
            mode,
        }
    }

    /// Delivers `payload` to the first window, or opens one and schedules delivery.
    pub async fn route(&self, payload: SharePayload) -> RoutedDelivery {
        let message = match RelayMessage::ShareTarget(payload).to_value() {
            Ok(message) => message,
            Err(err) => {
                logging::error!("encoding share message failed: {err}");
                return RoutedDelivery::settled(DeliveryRoute::NoWindow);
            }
        };

        let windows = match self.clients.window_clients(true).await {
            Ok(windows) => windows,
            Err(err) => {
                logging::warn!("listing window clients failed: {err}");
                Vec::new()
            }
        };

        if let Some(window) = windows.into_iter().next() {
            if let Err(err) = self.clients.focus(&window.id).await {
                logging::warn!("focusing {} failed: {err}", window.id);
            }
            post_best_effort(self.clients.as_ref(), &window.id, &message).await;
            return RoutedDelivery::settled(DeliveryRoute::FocusedExisting(window.id));
        }

        match self.clients.open_window(&self.entry_url).await {
            Ok(Some(client)) => {
                let deferred = self.deliver_when_ready(client.clone(), message);
                RoutedDelivery {
                    route: DeliveryRoute::OpenedNew(client),
                    deferred: Some(deferred),
                }
            }
            Ok(None) => {
                logging::warn!("platform declined to open {}", self.entry_url);
                RoutedDelivery::settled(DeliveryRoute::NoWindow)
            }
            Err(err) => {
                logging::warn!("opening {} failed: {err}", self.entry_url);
                RoutedDelivery::settled(DeliveryRoute::NoWindow)
            }
        }
    }

    fn deliver_when_ready(&self, client: ClientId, message: Value) -> DeferredWork {
        let clients = Rc::clone(&self.clients);
        let timer = Rc::clone(&self.timer);
        match self.mode {
            DeliveryMode::FixedDelay { delay_ms } => Box::pin(async move {
                timer.sleep(delay_ms).await;
                post_best_effort(clients.as_ref(), &client, &message).await;
            }),
            DeliveryMode::ReadyHandshake { timeout_ms } => {
                let ready = self.ready.wait_for(&client);
                let signals = self.ready.clone();
                Box::pin(async move {
                    match select(ready, timer.sleep(timeout_ms)).await {
                        Either::Left(_) => {}
                        Either::Right(_) => {
                            logging::warn!(
                                "{client} sent no ready signal within {timeout_ms}ms; delivering anyway"
                            );
                            signals.forget(&client);
                        }
                    }
                    post_best_effort(clients.as_ref(), &client, &message).await;
                })
            }
        }
    }
}

async fn post_best_effort(clients: &dyn ClientRegistry, client: &ClientId, message: &Value) {
    if let Err(err) = clients.post_message(client, message).await {
        logging::warn!("posting share to {client} failed: {err}");
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;
    use platform_host::{MemoryClientRegistry, MemoryDelayTimer};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    struct Fixture {
        clients: MemoryClientRegistry,
        timer: MemoryDelayTimer,
        ready: ReadySignals,
        router: ClientDeliveryRouter,
    }

    fn fixture(mode: DeliveryMode) -> Fixture {
        let clients = MemoryClientRegistry::default();
        let timer = MemoryDelayTimer::default();
        let ready = ReadySignals::default();
        let router = ClientDeliveryRouter::new(
            Rc::new(clients.clone()),
            Rc::new(timer.clone()),
            ready.clone(),
            "/?share-target=true",
            mode,
        );
        Fixture {
            clients,
            timer,
            ready,
            router,
        }
    }

    fn payload() -> SharePayload {
        SharePayload::new("Foo", "", "https://example.com/item")
    }

    fn expected_message() -> Value {
        json!({
            "type": "SHARE_TARGET",
            "title": "Foo",
            "text": "",
            "url": "https://example.com/item",
        })
    }

    #[test]
    fn early_ready_signal_is_buffered_until_waited_for() {
        let signals = ReadySignals::default();
        let client = ClientId("window-1".to_string());
        signals.notify_ready(&client);
        let mut receiver = signals.wait_for(&client);
        assert_eq!(receiver.try_recv(), Ok(Some(())));
        assert_eq!(signals.pending_waiters(), 0);
    }

    #[test]
    fn existing_window_is_focused_and_messaged_once() {
        let fx = fixture(DeliveryMode::FixedDelay { delay_ms: 1000 });
        let first = fx.clients.add_window("/", true);
        fx.clients.add_window("/other", true);

        let routed = block_on(fx.router.route(payload()));
        assert_eq!(routed.route, DeliveryRoute::FocusedExisting(first.clone()));
        assert!(routed.deferred.is_none());
        assert_eq!(fx.clients.focused(), vec![first.clone()]);
        assert_eq!(fx.clients.posted(), vec![(first, expected_message())]);
        assert!(fx.clients.opened_urls().is_empty());
    }

    #[test]
    fn fixed_delay_posts_after_sleeping() {
        let fx = fixture(DeliveryMode::FixedDelay { delay_ms: 1000 });
        let routed = block_on(fx.router.route(payload()));
        let DeliveryRoute::OpenedNew(opened) = routed.route.clone() else {
            panic!("expected a new window, got {:?}", routed.route);
        };
        assert_eq!(fx.clients.opened_urls(), vec!["/?share-target=true".to_string()]);
        assert!(fx.clients.posted().is_empty());

        block_on(routed.deferred.expect("deferred delivery"));
        assert_eq!(fx.timer.requested_delays(), vec![1000]);
        assert_eq!(fx.clients.posted(), vec![(opened, expected_message())]);
    }

    #[test]
    fn handshake_posts_once_after_ready() {
        let fx = fixture(DeliveryMode::ReadyHandshake { timeout_ms: 5_000 });
        let routed = block_on(fx.router.route(payload()));
        let DeliveryRoute::OpenedNew(opened) = routed.route.clone() else {
            panic!("expected a new window");
        };
        assert_eq!(fx.ready.pending_waiters(), 1);

        fx.ready.notify_ready(&opened);
        block_on(routed.deferred.expect("deferred delivery"));
        assert_eq!(fx.clients.posted(), vec![(opened, expected_message())]);
        assert_eq!(fx.ready.pending_waiters(), 0);
    }

    #[test]
    fn handshake_timeout_posts_once_and_drops_waiter() {
        let fx = fixture(DeliveryMode::ReadyHandshake { timeout_ms: 5_000 });
        let routed = block_on(fx.router.route(payload()));
        let DeliveryRoute::OpenedNew(opened) = routed.route.clone() else {
            panic!("expected a new window");
        };

        block_on(routed.deferred.expect("deferred delivery"));
        assert_eq!(fx.timer.requested_delays(), vec![5_000]);
        assert_eq!(fx.clients.posted(), vec![(opened, expected_message())]);
        assert_eq!(fx.ready.pending_waiters(), 0);
    }

    #[test]
    fn dropped_delivery_does_not_leave_a_waiter_behind() {
        let fx = fixture(DeliveryMode::ReadyHandshake { timeout_ms: 5_000 });
        let routed = block_on(fx.router.route(payload()));
        assert_eq!(fx.ready.pending_waiters(), 1);

        drop(routed);
        assert_eq!(fx.ready.pending_waiters(), 0);
        assert!(fx.clients.posted().is_empty());
    }

    #[test]
    fn title_only_share_is_still_delivered() {
        let title_only = SharePayload::new("Only a title", "", "");
        let expected = json!({
            "type": "SHARE_TARGET",
            "title": "Only a title",
            "text": "",
            "url": "",
        });

        let fx = fixture(DeliveryMode::FixedDelay { delay_ms: 1000 });
        let existing = fx.clients.add_window("/", true);
        let routed = block_on(fx.router.route(title_only.clone()));
        assert_eq!(routed.route, DeliveryRoute::FocusedExisting(existing.clone()));
        assert_eq!(fx.clients.focused(), vec![existing.clone()]);
        assert_eq!(fx.clients.posted(), vec![(existing, expected.clone())]);

        let fx = fixture(DeliveryMode::FixedDelay { delay_ms: 1000 });
        let routed = block_on(fx.router.route(title_only));
        let DeliveryRoute::OpenedNew(opened) = routed.route.clone() else {
            panic!("expected a new window, got {:?}", routed.route);
        };
        block_on(routed.deferred.expect("deferred delivery"));
        assert_eq!(fx.clients.opened_urls(), vec!["/?share-target=true".to_string()]);
        assert_eq!(fx.clients.posted(), vec![(opened, expected)]);
    }

    #[test]
    fn refused_window_delivers_nothing() {
        let fx = fixture(DeliveryMode::default());
        fx.clients.refuse_open_window(true);
        let routed = block_on(fx.router.route(payload()));
        assert_eq!(routed.route, DeliveryRoute::NoWindow);
        assert!(routed.deferred.is_none());
        assert!(fx.clients.posted().is_empty());
    }

    #[test]
    fn vanished_window_does_not_panic() {
        let fx = fixture(DeliveryMode::FixedDelay { delay_ms: 10 });
        let routed = block_on(fx.router.route(payload()));
        let DeliveryRoute::OpenedNew(opened) = routed.route.clone() else {
            panic!("expected a new window");
        };
        fx.clients.close_window(&opened);
        block_on(routed.deferred.expect("deferred delivery"));
        assert!(fx.clients.posted().is_empty());
    }
}
