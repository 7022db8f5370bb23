use std::cell::RefCell;
use std::rc::Rc;

use crate::reactive::{ObserverId, Reactor, Topic, Tracker};

/// Lazily computed, cached value.
///
/// The cache is dropped by [`Derived::invalidate`]; [`Derived::watched`] wires
/// that to a [`Reactor`] so the value is recomputed on the next read after any
/// of its declared topics is notified.
pub struct Derived<T: Clone + 'static>(Rc<DerivedInner<T>>);

struct DerivedInner<T> {
    compute: Box<dyn Fn() -> T>,
    cached: RefCell<Option<T>>,
}

impl<T: Clone + 'static> Clone for Derived<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T: Clone + 'static> Derived<T> {
    pub fn new(compute: impl Fn() -> T + 'static) -> Self {
        Self(Rc::new(DerivedInner {
            compute: Box::new(compute),
            cached: RefCell::new(None),
        }))
    }

    /// Create a derived value invalidated by `deps`. The returned observer must
    /// be removed from `reactor` when the value is no longer needed.
    pub fn watched<K: Topic>(
        reactor: &Reactor<K>,
        deps: impl Fn(&mut Tracker<K>) + 'static,
        compute: impl Fn() -> T + 'static,
    ) -> (Self, ObserverId) {
        let derived = Self::new(compute);
        let weak = Rc::downgrade(&derived.0);
        let id = reactor.watch(deps, move || {
            if let Some(inner) = weak.upgrade() {
                inner.cached.borrow_mut().take();
            }
        });
        (derived, id)
    }

    pub fn invalidate(&self) {
        self.0.cached.borrow_mut().take();
    }

    pub fn is_cached(&self) -> bool {
        self.0.cached.borrow().is_some()
    }

    pub fn get(&self) -> T {
        if let Some(v) = self.0.cached.borrow().as_ref() {
            return v.clone();
        }
        let v = (self.0.compute)();
        *self.0.cached.borrow_mut() = Some(v.clone());
        v
    }
}
