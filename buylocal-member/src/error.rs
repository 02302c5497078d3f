use buylocal_core::CoreError;

#[derive(Debug, thiserror::Error)]
pub enum MemberError {
    #[error("Member not found: {0}")]
    NotFound(i64),

    #[error("Invalid member: {0}")]
    Validation(String),

    #[error(transparent)]
    Collaborator(#[from] CoreError),
}

pub type Result<T> = std::result::Result<T, MemberError>;
