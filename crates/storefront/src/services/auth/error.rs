//! Account operation error types.

use thiserror::Error;

use crate::api::ApiError;
use crate::store::StoreError;
use crate::validation::FieldErrors;

/// Errors that can occur during account operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Form input failed local validation.
    #[error("{0}")]
    Validation(FieldErrors),

    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] unishop_core::EmailError),

    /// The operation needs a signed-in user.
    #[error("not signed in")]
    NotAuthenticated,

    /// A profile update with no fields set.
    #[error("nothing to update")]
    EmptyUpdate,

    /// The backend accepted the request but issued no usable token.
    #[error("backend returned an empty access token")]
    EmptyToken,

    /// Backend request failed or was rejected.
    #[error("api error: {0}")]
    Api(#[from] ApiError),

    /// The session could not be persisted.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}
