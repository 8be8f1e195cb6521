//! Foreground window-client contracts used by the share delivery router.

use std::{cell::RefCell, fmt, future::Future, pin::Pin, rc::Rc};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Object-safe boxed future used by [`ClientRegistry`].
pub type ClientFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
/// Platform-assigned id of a foreground window client.
pub struct ClientId(pub String);

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Snapshot of a window client at enumeration time.
///
/// The agent does not own the window; it may close before the id is used again.
pub struct ClientInfo {
    /// Client id usable with [`ClientRegistry::focus`] and [`ClientRegistry::post_message`].
    pub id: ClientId,
    /// URL the client currently shows.
    pub url: String,
    /// Whether the agent already controls the client.
    pub controlled: bool,
}

/// Host service for enumerating, focusing, messaging, and opening foreground windows.
pub trait ClientRegistry {
    /// Lists window clients in platform order, optionally including uncontrolled ones.
    fn window_clients<'a>(
        &'a self,
        include_uncontrolled: bool,
    ) -> ClientFuture<'a, Result<Vec<ClientInfo>, String>>;

    /// Brings a window client to the foreground.
    fn focus<'a>(&'a self, client: &'a ClientId) -> ClientFuture<'a, Result<(), String>>;

    /// Posts a structured message to a window client.
    fn post_message<'a>(
        &'a self,
        client: &'a ClientId,
        message: &'a Value,
    ) -> ClientFuture<'a, Result<(), String>>;

    /// Opens a new window at `url`. `Ok(None)` means the platform declined to open one.
    fn open_window<'a>(
        &'a self,
        url: &'a str,
    ) -> ClientFuture<'a, Result<Option<ClientId>, String>>;
}

#[derive(Debug, Default)]
struct MemoryClientsState {
    windows: Vec<ClientInfo>,
    focused: Vec<ClientId>,
    posted: Vec<(ClientId, Value)>,
    opened: Vec<String>,
    refuse_open: bool,
    next_id: u32,
}

impl MemoryClientsState {
    fn allocate_id(&mut self) -> ClientId {
        self.next_id += 1;
        ClientId(format!("window-{}", self.next_id))
    }
}

#[derive(Debug, Clone, Default)]
/// In-memory window registry that records focus, message, and open calls.
pub struct MemoryClientRegistry {
    inner: Rc<RefCell<MemoryClientsState>>,
}

impl MemoryClientRegistry {
    /// Adds an already-open window and returns its id.
    pub fn add_window(&self, url: impl Into<String>, controlled: bool) -> ClientId {
        let mut state = self.inner.borrow_mut();
        let id = state.allocate_id();
        state.windows.push(ClientInfo {
            id: id.clone(),
            url: url.into(),
            controlled,
        });
        id
    }

    /// Closes a window; later focus/post calls for it fail.
    pub fn close_window(&self, client: &ClientId) {
        self.inner.borrow_mut().windows.retain(|w| &w.id != client);
    }

    /// Makes subsequent [`ClientRegistry::open_window`] calls resolve to `Ok(None)`.
    pub fn refuse_open_window(&self, refuse: bool) {
        self.inner.borrow_mut().refuse_open = refuse;
    }

    /// Clients focused so far, in order.
    pub fn focused(&self) -> Vec<ClientId> {
        self.inner.borrow().focused.clone()
    }

    /// Messages delivered so far, in order.
    pub fn posted(&self) -> Vec<(ClientId, Value)> {
        self.inner.borrow().posted.clone()
    }

    /// URLs passed to [`ClientRegistry::open_window`], in order.
    pub fn opened_urls(&self) -> Vec<String> {
        self.inner.borrow().opened.clone()
    }

    fn ensure_present(&self, client: &ClientId) -> Result<(), String> {
        if self.inner.borrow().windows.iter().any(|w| &w.id == client) {
            Ok(())
        } else {
            Err(format!("client {client} is gone"))
        }
    }
}

impl ClientRegistry for MemoryClientRegistry {
    fn window_clients<'a>(
        &'a self,
        include_uncontrolled: bool,
    ) -> ClientFuture<'a, Result<Vec<ClientInfo>, String>> {
        Box::pin(async move {
            Ok(self
                .inner
                .borrow()
                .windows
                .iter()
                .filter(|w| include_uncontrolled || w.controlled)
                .cloned()
                .collect())
        })
    }

    fn focus<'a>(&'a self, client: &'a ClientId) -> ClientFuture<'a, Result<(), String>> {
        Box::pin(async move {
            self.ensure_present(client)?;
            self.inner.borrow_mut().focused.push(client.clone());
            Ok(())
        })
    }

    fn post_message<'a>(
        &'a self,
        client: &'a ClientId,
        message: &'a Value,
    ) -> ClientFuture<'a, Result<(), String>> {
        Box::pin(async move {
            self.ensure_present(client)?;
            self.inner
                .borrow_mut()
                .posted
                .push((client.clone(), message.clone()));
            Ok(())
        })
    }

    fn open_window<'a>(
        &'a self,
        url: &'a str,
    ) -> ClientFuture<'a, Result<Option<ClientId>, String>> {
        Box::pin(async move {
            let mut state = self.inner.borrow_mut();
            state.opened.push(url.to_string());
            if state.refuse_open {
                return Ok(None);
            }
            let id = state.allocate_id();
            state.windows.push(ClientInfo {
                id: id.clone(),
                url: url.to_string(),
                controlled: true,
            });
            Ok(Some(id))
        })
    }
}
