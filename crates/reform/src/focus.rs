/// Moves input focus to the element a field is rendered into.
///
/// The engine only ever calls [`FocusStrategy::focus`]; locating the element
/// is up to the host UI layer. Any `Fn()` closure is a strategy.
pub trait FocusStrategy {
    fn focus(&self);
}

impl<F> FocusStrategy for F
where
    F: Fn(),
{
    fn focus(&self) {
        self()
    }
}

/// Strategy for hosts without focusable elements.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoFocus;

impl FocusStrategy for NoFocus {
    fn focus(&self) {}
}
