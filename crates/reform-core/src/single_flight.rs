//! At most one outstanding request.
//!
//! [`LastRequest`] wraps a stream of futures so that only the most recent one
//! is live. Starting a new run aborts the previous one if it has not finished
//! yet; the aborted run resolves to `Ok(None)` instead of an error, while any
//! error produced by the wrapped future itself is passed through.
//!
//! ```rust
//! use reform_core::LastRequest;
//!
//! let last = LastRequest::new();
//! let stale = last.run(async { Ok::<_, ()>("stale") });
//! let fresh = last.run(async { Ok::<_, ()>("fresh") });
//!
//! assert_eq!(pollster::block_on(stale), Ok(None));
//! assert_eq!(pollster::block_on(fresh), Ok(Some("fresh")));
//! ```

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures_util::future::{AbortHandle, Abortable, Aborted};
use parking_lot::Mutex;

type CancelHook = Arc<dyn Fn() + Send + Sync>;

struct InFlight {
    handle: AbortHandle,
    done: Arc<AtomicBool>,
}

#[derive(Clone, Default)]
pub struct LastRequest {
    current: Arc<Mutex<Option<InFlight>>>,
    on_cancel: Option<CancelHook>,
}

impl LastRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// `f` runs each time an unfinished run is superseded.
    pub fn with_on_cancel(f: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            current: Arc::default(),
            on_cancel: Some(Arc::new(f)),
        }
    }

    pub fn run<F, T, E>(&self, fut: F) -> impl Future<Output = Result<Option<T>, E>> + use<F, T, E>
    where
        F: Future<Output = Result<T, E>>,
    {
        let (handle, registration) = AbortHandle::new_pair();
        let done = Arc::new(AtomicBool::new(false));

        let previous = self.current.lock().replace(InFlight {
            handle,
            done: done.clone(),
        });
        if let Some(prev) = previous
            && !prev.done.load(Ordering::Acquire)
        {
            log::debug!("last_request: superseding unfinished request");
            prev.handle.abort();
            if let Some(hook) = &self.on_cancel {
                hook();
            }
        }

        let fut = Abortable::new(fut, registration);
        async move {
            let out = fut.await;
            done.store(true, Ordering::Release);
            match out {
                Ok(Ok(v)) => Ok(Some(v)),
                Ok(Err(e)) => Err(e),
                Err(Aborted) => Ok(None),
            }
        }
    }

    /// Abort the current run, if any.
    pub fn cancel(&self) {
        let previous = self.current.lock().take();
        if let Some(prev) = previous
            && !prev.done.load(Ordering::Acquire)
        {
            prev.handle.abort();
            if let Some(hook) = &self.on_cancel {
                hook();
            }
        }
    }
}
