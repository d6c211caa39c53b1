//! Connecting presentation components to state managers.
//!
//! [`connect()`] combines the state and dispatch of several named managers and
//! runs them through a [`PropPipeline`] to produce the props of a wrapped
//! component.

mod combined;
mod connect;
mod pipeline;

pub use combined::{CombinedDispatch, CombinedState, Managers};
pub use connect::{connect, Connected, Connector};
pub use pipeline::{MapDispatchToProps, MapStateToProps, MergeProps, PropPipeline};
