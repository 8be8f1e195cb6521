use platform_host::{DelayTimer, TimerFuture};

#[derive(Debug, Clone, Copy, Default)]
/// `setTimeout`-backed timer usable from both window and worker scopes.
pub struct WebDelayTimer;

impl DelayTimer for WebDelayTimer {
    fn sleep<'a>(&'a self, millis: u32) -> TimerFuture<'a, ()> {
        Box::pin(async move {
            #[cfg(target_arch = "wasm32")]
            {
                let mut scheduled = Ok(0);
                let promise = js_sys::Promise::new(&mut |resolve, _reject| {
                    scheduled = crate::interop::set_timeout(&resolve, millis);
                });
                // Without a timer the delay is skipped rather than awaited forever.
                if scheduled.is_err() {
                    return;
                }
                let _ = wasm_bindgen_futures::JsFuture::from(promise).await;
            }

            #[cfg(not(target_arch = "wasm32"))]
            {
                let _ = millis;
            }
        })
    }
}
