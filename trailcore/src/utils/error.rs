use strum::EnumIs;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, EnumIs, Error)]
pub enum ChangeError {
    /// A collaborator required by the operation was not supplied.
    #[error("Invalid argument: `{argument}` is required by `{operation}` but was not provided.")]
    InvalidArgument {
        argument: &'static str,
        operation: &'static str,
    },
}

pub type ChangeResult<T> = Result<T, ChangeError>;
