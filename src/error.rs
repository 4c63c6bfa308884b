use alloc::collections::TryReserveError;

/// Errors reported by insertions and fallible constructors.
///
/// A missing key on lookup is not an error; lookups return `Option`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PutError {
    /// The key or the value handle was absent.
    #[error("key and value must both be present")]
    InvalidArgument,
    /// A key buffer or slot array could not be allocated. The table is left
    /// exactly as it was before the call.
    #[error("allocation failed")]
    AllocationFailure,
}

impl From<TryReserveError> for PutError {
    fn from(_: TryReserveError) -> Self {
        PutError::AllocationFailure
    }
}
