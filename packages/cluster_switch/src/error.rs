use thiserror::Error;

/// Errors that can occur while performing a cluster switch.
///
/// Both variants are recoverable from the caller's point of view: the switch is guaranteed to
/// have left the current cluster unchanged, so a caller that wants a retry simply re-invokes.
/// An observed divergence between hardware and software cluster state is not represented here;
/// that condition has no safe continuation and panics instead.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SwitchError {
    /// The power-efficient cluster is disabled by fuses on this part and cannot be a switch
    /// destination. Returned without side effects.
    #[error("the slow cluster is fuse-disabled on this part and cannot be a switch destination")]
    SlowClusterUnavailable,

    /// The request/response exchange with the power management firmware did not complete.
    /// The switch was aborted before any state change.
    #[error("the cluster switch exchange with the power management firmware did not complete")]
    FirmwareFault,
}

/// A specialized `Result` type for switch operations, returning the crate's
/// [`SwitchError`] type as the error value.
pub(crate) type Result<T> = std::result::Result<T, SwitchError>;

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::fmt::Debug;

    use static_assertions::assert_impl_all;

    use super::*;

    assert_impl_all!(SwitchError: Send, Sync, Debug);

    #[test]
    fn firmware_fault_is_error() {
        let result: Result<()> = Err(SwitchError::FirmwareFault);
        assert!(result.is_err());
    }
}
