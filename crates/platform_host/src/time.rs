//! Clock and timer helpers shared across host contracts and adapters.

use std::{cell::RefCell, future::Future, pin::Pin, rc::Rc};
#[cfg(not(target_arch = "wasm32"))]
use std::time::{SystemTime, UNIX_EPOCH};

/// Object-safe boxed future used by [`DelayTimer`].
pub type TimerFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Returns the current unix timestamp in milliseconds.
pub fn unix_time_ms_now() -> u64 {
    #[cfg(target_arch = "wasm32")]
    {
        js_sys::Date::now().max(0.0) as u64
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }
}

/// Host timer service.
pub trait DelayTimer {
    /// Resolves after roughly `millis` milliseconds.
    fn sleep<'a>(&'a self, millis: u32) -> TimerFuture<'a, ()>;
}

#[derive(Debug, Clone, Default)]
/// Timer that resolves immediately and records every requested delay.
pub struct MemoryDelayTimer {
    requested: Rc<RefCell<Vec<u32>>>,
}

impl MemoryDelayTimer {
    /// Delays requested so far, in order.
    pub fn requested_delays(&self) -> Vec<u32> {
        self.requested.borrow().clone()
    }
}

impl DelayTimer for MemoryDelayTimer {
    fn sleep<'a>(&'a self, millis: u32) -> TimerFuture<'a, ()> {
        self.requested.borrow_mut().push(millis);
        Box::pin(async {})
    }
}
