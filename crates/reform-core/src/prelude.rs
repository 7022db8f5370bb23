pub use crate::effects::Dispose;
pub use crate::reactive::{ObserverId, Reactor, Topic, Tracker};
pub use crate::scope::Scope;
pub use crate::signal::{MaybeSignal, Signal, signal};
pub use crate::single_flight::LastRequest;
pub use crate::state::Derived;
