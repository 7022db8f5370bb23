use std::cell::RefCell;
use std::rc::Rc;

use crate::reactive::{ObserverId, Reactor, Topic};
use crate::scope::Scope;

/// Cleanup handle. Clones share the same cleanup.
#[derive(Clone)]
pub struct Dispose(Rc<RefCell<Option<Box<dyn FnOnce()>>>>);

impl Dispose {
    pub fn new(f: impl FnOnce() + 'static) -> Self {
        Self(Rc::new(RefCell::new(Some(Box::new(f)))))
    }

    /// Disposer that removes `id` from `reactor`.
    pub fn observer<K: Topic>(reactor: &Reactor<K>, id: ObserverId) -> Self {
        let reactor = reactor.clone();
        Self::new(move || reactor.remove(id))
    }

    /// Runs at most once (safe to call multiple times).
    pub fn run(&self) {
        let f = self.0.borrow_mut().take();
        if let Some(f) = f {
            f()
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.0.borrow().is_none()
    }

    /// Also run this cleanup when `scope` is disposed.
    pub fn bind_to(self, scope: &Scope) -> Self {
        let d = self.clone();
        scope.add_disposer(move || d.run());
        self
    }
}

impl std::fmt::Debug for Dispose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispose")
            .field("disposed", &self.is_disposed())
            .finish()
    }
}
