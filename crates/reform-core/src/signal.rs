use std::cell::RefCell;
use std::rc::Rc;

use slotmap::SlotMap;

slotmap::new_key_type! {
    /// Handle returned by [`Signal::subscribe`].
    pub struct SubId;
}

/// Observable value handle. Clones share the same value.
#[derive(Clone)]
pub struct Signal<T: 'static>(Rc<RefCell<Inner<T>>>);

struct Inner<T> {
    value: T,
    subs: SlotMap<SubId, Rc<dyn Fn(&T)>>,
}

impl<T: 'static> Signal<T> {
    pub fn new(value: T) -> Self {
        Self(Rc::new(RefCell::new(Inner {
            value,
            subs: SlotMap::with_key(),
        })))
    }

    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.0.borrow().value.clone()
    }

    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.0.borrow().value)
    }

    /// Subscribers may read the signal but must not write to it.
    pub fn set(&self, v: T) {
        self.0.borrow_mut().value = v;
        self.emit();
    }

    pub fn update<F: FnOnce(&mut T)>(&self, f: F) {
        f(&mut self.0.borrow_mut().value);
        self.emit();
    }

    pub fn subscribe(&self, f: impl Fn(&T) + 'static) -> SubId {
        self.0.borrow_mut().subs.insert(Rc::new(f))
    }

    /// Freed slots are reused; a stale id never removes a newer subscriber.
    pub fn unsubscribe(&self, id: SubId) {
        self.0.borrow_mut().subs.remove(id);
    }

    pub fn subscriber_count(&self) -> usize {
        self.0.borrow().subs.len()
    }

    #[cfg(test)]
    pub(crate) fn subscriber_slots(&self) -> usize {
        self.0.borrow().subs.capacity()
    }

    fn emit(&self) {
        // snapshot so subscribers can (un)subscribe while being notified
        let subs: Vec<Rc<dyn Fn(&T)>> = self.0.borrow().subs.values().cloned().collect();
        for s in subs {
            let inner = self.0.borrow();
            s(&inner.value);
        }
    }
}

pub fn signal<T: 'static>(t: T) -> Signal<T> {
    Signal::new(t)
}

/// Either a fixed value or a live [`Signal`].
#[derive(Clone)]
pub enum MaybeSignal<T: 'static> {
    Static(T),
    Dynamic(Signal<T>),
}

impl<T: Clone + 'static> MaybeSignal<T> {
    pub fn get(&self) -> T {
        match self {
            MaybeSignal::Static(v) => v.clone(),
            MaybeSignal::Dynamic(s) => s.get(),
        }
    }

    pub fn as_signal(&self) -> Option<&Signal<T>> {
        match self {
            MaybeSignal::Static(_) => None,
            MaybeSignal::Dynamic(s) => Some(s),
        }
    }
}

impl From<&str> for MaybeSignal<String> {
    fn from(v: &str) -> Self {
        MaybeSignal::Static(v.to_owned())
    }
}

impl From<String> for MaybeSignal<String> {
    fn from(v: String) -> Self {
        MaybeSignal::Static(v)
    }
}

impl<T: 'static> From<Signal<T>> for MaybeSignal<T> {
    fn from(s: Signal<T>) -> Self {
        MaybeSignal::Dynamic(s)
    }
}
