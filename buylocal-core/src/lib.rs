pub mod actor;
pub mod clock;
pub mod notification;
pub mod repository;

pub use actor::{User, UserRole};
pub use clock::{Clock, FixedClock, SystemClock};
pub use notification::{LogNotifier, Notifier};
pub use repository::{Entity, Repository, SoftDelete};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: i64 },
    #[error("{entity} already exists: {id}")]
    Conflict { entity: &'static str, id: i64 },
    #[error("Validation failed: {0}")]
    ValidationError(String),
    #[error("Storage failure: {0}")]
    Storage(String),
    #[error("Notification failed: {0}")]
    Notification(String),
}

pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_names_entity() {
        let err = CoreError::NotFound {
            entity: "offer",
            id: 42,
        };
        assert_eq!(err.to_string(), "offer not found: 42");

        let err = CoreError::Conflict {
            entity: "reward",
            id: 3,
        };
        assert_eq!(err.to_string(), "reward already exists: 3");
    }
}
