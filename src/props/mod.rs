//! Props records passed to components.
//!
//! A [`Props`] record maps prop names to data values or callbacks, and
//! supports the shallow, later-wins merge used by the connect layer.

mod props;

pub use props::{Callback, Prop, PropValue, Props};
