//! # Reactor, Signals, and Derived values
//!
//! `reform-core` is the host substrate the form engine runs on. It is small
//! on purpose and fully explicit: nothing is tracked through thread-locals.
//!
//! - `Reactor<K>`: dependency graph of watchers keyed by topics `K`.
//! - `Signal<T>`: observable value with plain subscriptions.
//! - `Derived<T>`: cached value invalidated by reactor topics.
//! - `Scope` / `Dispose`: cleanup ownership.
//! - `LastRequest`: single-flight wrapper around futures.
//!
//! ## Watchers
//!
//! A watcher declares its topics up front and is re-run when the owner of the
//! state notifies one of them:
//!
//! ```rust
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use reform_core::*;
//!
//! let reactor: Reactor<&'static str> = Reactor::new();
//! let hits = Rc::new(Cell::new(0));
//!
//! let id = reactor.watch(|t| t.track("count"), {
//!     let hits = hits.clone();
//!     move || hits.set(hits.get() + 1)
//! });
//!
//! reactor.notify(&"other");
//! reactor.notify(&"count");
//! assert_eq!(hits.get(), 1);
//!
//! reactor.remove(id);
//! reactor.notify(&"count");
//! assert_eq!(hits.get(), 1);
//! ```
//!
//! ## Derived values
//!
//! ```rust
//! use reform_core::*;
//!
//! let reactor: Reactor<&'static str> = Reactor::new();
//! let source = signal(2);
//!
//! let (double, _id) = Derived::watched(&reactor, |t| t.track("source"), {
//!     let source = source.clone();
//!     move || source.get() * 2
//! });
//!
//! assert_eq!(double.get(), 4);
//! source.set(5);
//! assert_eq!(double.get(), 4); // nobody notified yet
//! reactor.notify(&"source");
//! assert_eq!(double.get(), 10);
//! ```
//!
//! ## Scopes
//!
//! A `Scope` collects cleanups. Bindings put their watcher removals in a
//! scope so that dropping the binding detaches it from the graph.

pub mod effects;
pub mod prelude;
pub mod reactive;
pub mod scope;
pub mod signal;
pub mod single_flight;
pub mod state;

pub use effects::*;
pub use reactive::*;
pub use scope::*;
pub use signal::*;
pub use single_flight::*;
pub use state::*;
