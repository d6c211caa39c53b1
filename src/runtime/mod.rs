//! Runtime support for provider scoping.
//!
//! This module provides the render-time scope stack through which mounted
//! providers become visible to the accessors of their descendants.

mod context;

pub(crate) use context::{RenderScope, ScopedInstance};
