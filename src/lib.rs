//! # Scoped Store
//!
//! Reducer-driven state managers scoped to provider subtrees, and a
//! `connect` layer that derives component props from them.
//!
//! ## State managers
//!
//! - `StateManager<S, A>` - A reducer and an initial state
//! - `Provider<S, A>` - One mounted, independent state instance
//! - `use_state` / `use_dispatch` / `use_selector` - Accessors that resolve
//!   the nearest enclosing provider, failing with `Error::MissingProvider`
//!   when there is none
//!
//! ## Connect
//!
//! - `connect(managers)` - Combine the state and dispatch of named managers
//! - `map_state_to_props` / `map_dispatch_to_props` / `merge_props` - The
//!   optional stages deriving the final props
//! - `Connected<C>` - The wrapped component
//!
//! ## Example
//!
//! ```
//! use scoped_store::{connect, create_state_manager, Managers, Props};
//!
//! let likes = create_state_manager(|count: &u32, by: u32| count + by, 0);
//! let badge = connect(Managers::new().with("likes", &likes))
//!     .map_state_to_props(|state, _| {
//!         Props::new().with("label", format!("{} likes", state.get::<u32>("likes").unwrap()))
//!     })
//!     .wrap(|props: Props| props.str("label").unwrap_or_default().to_string());
//!
//! let provider = likes.provider();
//! provider.dispatcher().dispatch(2);
//! assert_eq!(provider.scope(|| badge.render(Props::new())).unwrap(), "2 likes");
//! ```

pub mod component;
pub mod connect;
pub mod error;
pub mod manager;
pub mod props;
pub(crate) mod runtime;

// Re-export main types for convenience
pub use component::Component;
pub use connect::{
    connect, CombinedDispatch, CombinedState, Connected, Connector, Managers, PropPipeline,
};
pub use error::{Error, Result};
pub use manager::{
    create_state_manager, ContextValue, Dispatch, ManagerId, Provider, StateManager, Subscription,
};
pub use props::{Callback, Prop, PropValue, Props};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_works() {
        // Basic smoke test
        let counter = create_state_manager(|n: &i32, by: i32| n + by, 0);
        let provider = counter.provider();
        provider.scope(|| {
            assert_eq!(*counter.use_state().unwrap(), 0);
            counter.use_dispatch().unwrap().dispatch(42);
            assert_eq!(*counter.use_state().unwrap(), 42);
        });
    }
}
