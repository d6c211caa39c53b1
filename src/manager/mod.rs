//! Reducer-driven state managers and their providers.
//!
//! A [`StateManager`] pairs a reducer with an initial state. Each
//! [`Provider`] mounted from it owns one independent state instance, and
//! components rendered inside the provider's scope read and update that
//! instance through the manager's accessors.

mod dispatch;
mod manager;
mod provider;

pub use dispatch::Dispatch;
pub use manager::{create_state_manager, ContextValue, ManagerId, Reducer, StateManager};
pub use provider::{Provider, Subscription};
