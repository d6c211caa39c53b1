//! Error types for state manager access.

use crate::manager::ManagerId;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised by the state manager accessors.
///
/// The only failure this crate introduces is reading a manager from a
/// component that is not rendered inside one of that manager's providers.
/// That is a wiring defect, so it is surfaced instead of falling back to a
/// default state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(
        "no provider found in scope for state manager {}; wrap the component in the manager's provider",
        describe(.manager, .name)
    )]
    MissingProvider {
        manager: ManagerId,
        name: Option<Arc<str>>,
    },
}

impl Error {
    /// The identity of the manager whose provider was missing.
    pub fn manager(&self) -> ManagerId {
        match self {
            Error::MissingProvider { manager, .. } => *manager,
        }
    }
}

fn describe(manager: &ManagerId, name: &Option<Arc<str>>) -> String {
    match name {
        Some(name) => format!("`{name}` ({manager})"),
        None => manager.to_string(),
    }
}

/// Result type alias for accessor operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_names_the_manager() {
        let err = Error::MissingProvider {
            manager: ManagerId::from_raw(7),
            name: Some(Arc::from("likes")),
        };
        let message = err.to_string();
        assert!(message.contains("`likes`"));
        assert!(message.contains("#7"));
        assert_eq!(err.manager(), ManagerId::from_raw(7));
    }

    #[test]
    fn message_without_name_uses_id() {
        let err = Error::MissingProvider {
            manager: ManagerId::from_raw(3),
            name: None,
        };
        assert!(err.to_string().contains("state manager #3;"));
    }
}
