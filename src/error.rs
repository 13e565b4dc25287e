use thiserror::Error;

use crate::mx::Error as MxError;

/// Contract or configuration problems. Anything that can go wrong with the
/// probed address itself is reported through
/// [`VerificationResult`](crate::VerificationResult) instead.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("email param is mandatory")]
    MissingEmail,
    #[error(transparent)]
    Mx(#[from] MxError),
}
