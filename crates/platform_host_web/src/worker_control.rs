use platform_host::{WorkerControl, WorkerControlFuture};

#[derive(Debug, Clone, Copy, Default)]
/// Lifecycle hooks of the running service worker (`skipWaiting`, `clients.claim`).
pub struct WebWorkerControl;

impl WorkerControl for WebWorkerControl {
    fn skip_waiting<'a>(&'a self) -> WorkerControlFuture<'a, Result<(), String>> {
        Box::pin(async move {
            #[cfg(target_arch = "wasm32")]
            {
                let promise = crate::interop::worker_scope()?
                    .skip_waiting()
                    .map_err(|err| crate::interop::js_error("skipWaiting failed", err))?;
                crate::interop::await_promise(promise, "skipWaiting failed")
                    .await
                    .map(|_| ())
            }

            #[cfg(not(target_arch = "wasm32"))]
            {
                Ok(())
            }
        })
    }

    fn claim_clients<'a>(&'a self) -> WorkerControlFuture<'a, Result<(), String>> {
        Box::pin(async move {
            #[cfg(target_arch = "wasm32")]
            {
                let clients = crate::interop::worker_scope()?.clients();
                crate::interop::await_promise(clients.claim(), "clients.claim failed")
                    .await
                    .map(|_| ())
            }

            #[cfg(not(target_arch = "wasm32"))]
            {
                Ok(())
            }
        })
    }
}
