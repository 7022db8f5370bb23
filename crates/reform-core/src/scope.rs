use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Ownership boundary for cleanups.
///
/// Everything a field binding registers in the shared graph is recorded here
/// and torn down together, either by an explicit [`Scope::dispose`] or when
/// the last handle is dropped.
pub struct Scope {
    inner: Rc<ScopeInner>,
}

struct ScopeInner {
    disposers: RefCell<Vec<Box<dyn FnOnce()>>>,
    children: RefCell<Vec<Scope>>,
    disposed: Cell<bool>,
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}

impl Scope {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(ScopeInner {
                disposers: RefCell::new(Vec::new()),
                children: RefCell::new(Vec::new()),
                disposed: Cell::new(false),
            }),
        }
    }

    /// Disposers added after disposal run immediately.
    pub fn add_disposer(&self, disposer: impl FnOnce() + 'static) {
        if self.inner.disposed.get() {
            disposer();
            return;
        }
        self.inner.disposers.borrow_mut().push(Box::new(disposer));
    }

    pub fn child(&self) -> Scope {
        let child = Scope::new();
        if self.inner.disposed.get() {
            child.inner.disposed.set(true);
        } else {
            let mut children = self.inner.children.borrow_mut();
            children.retain(|c| !c.is_disposed());
            children.push(child.clone());
        }
        child
    }

    #[cfg(test)]
    pub(crate) fn child_count(&self) -> usize {
        self.inner.children.borrow().len()
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.get()
    }

    pub fn dispose(&self) {
        self.inner.dispose();
    }
}

impl ScopeInner {
    fn dispose(&self) {
        self.disposed.set(true);

        // children first
        let children = std::mem::take(&mut *self.children.borrow_mut());
        for child in children {
            child.dispose();
        }

        let disposers = std::mem::take(&mut *self.disposers.borrow_mut());
        for disposer in disposers {
            disposer();
        }
    }
}

impl Clone for Scope {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl Drop for ScopeInner {
    fn drop(&mut self) {
        self.dispose();
    }
}
