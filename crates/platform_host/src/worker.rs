//! Background-agent lifecycle controls exposed by the host platform.

use std::{cell::Cell, future::Future, pin::Pin, rc::Rc};

/// Object-safe boxed future used by [`WorkerControl`].
pub type WorkerControlFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Host hooks the agent calls at lifecycle checkpoints.
pub trait WorkerControl {
    /// Asks the platform to activate this agent without waiting for old clients to close.
    fn skip_waiting<'a>(&'a self) -> WorkerControlFuture<'a, Result<(), String>>;

    /// Takes control of every open client in scope without a reload.
    fn claim_clients<'a>(&'a self) -> WorkerControlFuture<'a, Result<(), String>>;
}

#[derive(Debug, Clone, Default)]
/// Counting adapter for tests.
pub struct MemoryWorkerControl {
    skip_waiting_calls: Rc<Cell<u32>>,
    claim_calls: Rc<Cell<u32>>,
}

impl MemoryWorkerControl {
    /// Number of skip-waiting requests so far.
    pub fn skip_waiting_calls(&self) -> u32 {
        self.skip_waiting_calls.get()
    }

    /// Number of claim requests so far.
    pub fn claim_calls(&self) -> u32 {
        self.claim_calls.get()
    }
}

impl WorkerControl for MemoryWorkerControl {
    fn skip_waiting<'a>(&'a self) -> WorkerControlFuture<'a, Result<(), String>> {
        Box::pin(async move {
            self.skip_waiting_calls.set(self.skip_waiting_calls.get() + 1);
            Ok(())
        })
    }

    fn claim_clients<'a>(&'a self) -> WorkerControlFuture<'a, Result<(), String>> {
        Box::pin(async move {
            self.claim_calls.set(self.claim_calls.get() + 1);
            Ok(())
        })
    }
}
