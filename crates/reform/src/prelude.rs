pub use crate::binding::{FieldBinding, FieldFlags, InputListeners, InputProps};
pub use crate::focus::{FocusStrategy, NoFocus};
pub use crate::form::Form;
pub use crate::input::{FieldInput, InputEvent};
pub use crate::options::{FieldOptions, Projection, ValuePolicy};
pub use crate::store::{ErrorEntry, ErrorMap, FormStore, FormTopic, Validator};
pub use reform_core::{Dispose, MaybeSignal, Scope, Signal, signal};
