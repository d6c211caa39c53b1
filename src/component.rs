//! The render contract of presentation components.

use crate::props::Props;

/// A presentation component: renders its output from a props record.
///
/// Any `Fn(Props) -> O` is a component, so plain functions and closures can
/// be wrapped by [`connect`](crate::connect()).
pub trait Component {
    type Output;

    fn render(&self, props: Props) -> Self::Output;
}

impl<F, O> Component for F
where
    F: Fn(Props) -> O,
{
    type Output = O;

    fn render(&self, props: Props) -> O {
        self(props)
    }
}
