use std::time::Duration;

use bitflags::bitflags;

use crate::Cluster;

bitflags! {
    /// Caller-supplied flag word selecting the destination cluster of a switch.
    ///
    /// The two request flags are mutually exclusive. A request carrying neither flag, or
    /// carrying both, does not select a destination and resolves to a no-switch success.
    /// All other bits are reserved for the caller and are ignored here.
    #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
    pub struct SwitchFlags: u32 {
        /// Request migration to the high-performance cluster.
        const REQUEST_FAST_CLUSTER = 1 << 0;

        /// Request migration to the power-efficient cluster.
        const REQUEST_SLOW_CLUSTER = 1 << 1;

        /// The bits that participate in destination selection.
        const CLUSTER_REQUEST_MASK = Self::REQUEST_FAST_CLUSTER.bits()
            | Self::REQUEST_SLOW_CLUSTER.bits();
    }
}

/// One cluster switch request, immutable once constructed and consumed by a single
/// [`perform_switch()`][crate::ClusterSwitcher::perform_switch] call.
///
/// # Example
///
/// ```
/// use std::time::Duration;
///
/// use cluster_switch::{Cluster, SwitchFlags, SwitchRequest};
///
/// let request = SwitchRequest::new(SwitchFlags::REQUEST_SLOW_CLUSTER)
///     .with_residency_hint(Duration::from_millis(50));
///
/// assert_eq!(request.target(), Some(Cluster::Slow));
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SwitchRequest {
    flags: SwitchFlags,
    residency_hint: Option<Duration>,
}

impl SwitchRequest {
    /// Creates a request from a caller flag word.
    #[must_use]
    pub const fn new(flags: SwitchFlags) -> Self {
        Self {
            flags,
            residency_hint: None,
        }
    }

    /// A request targeting the high-performance cluster.
    #[must_use]
    pub const fn fast() -> Self {
        Self::new(SwitchFlags::REQUEST_FAST_CLUSTER)
    }

    /// A request targeting the power-efficient cluster.
    #[must_use]
    pub const fn slow() -> Self {
        Self::new(SwitchFlags::REQUEST_SLOW_CLUSTER)
    }

    /// Attaches a hint of how long the caller expects to stay on the destination cluster.
    ///
    /// The hint is advisory. It is carried into the switch trace events for the benefit of
    /// power tooling and plays no part in the switch itself.
    #[must_use]
    pub const fn with_residency_hint(mut self, hint: Duration) -> Self {
        self.residency_hint = Some(hint);
        self
    }

    /// The flag word this request was constructed from.
    #[must_use]
    #[inline]
    pub const fn flags(&self) -> SwitchFlags {
        self.flags
    }

    /// The advisory residency hint, if one was attached.
    #[must_use]
    #[inline]
    pub const fn residency_hint(&self) -> Option<Duration> {
        self.residency_hint
    }

    /// Resolves the flag word to a destination cluster.
    ///
    /// Returns `None` when no destination is selected: neither request flag present, or both
    /// present (they are mutually exclusive and cancel out).
    #[must_use]
    pub fn target(&self) -> Option<Cluster> {
        let requested = self.flags.intersection(SwitchFlags::CLUSTER_REQUEST_MASK);

        if requested == SwitchFlags::REQUEST_FAST_CLUSTER {
            Some(Cluster::Fast)
        } else if requested == SwitchFlags::REQUEST_SLOW_CLUSTER {
            Some(Cluster::Slow)
        } else {
            None
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn fast_flag_targets_fast_cluster() {
        assert_eq!(SwitchRequest::fast().target(), Some(Cluster::Fast));
    }

    #[test]
    fn slow_flag_targets_slow_cluster() {
        assert_eq!(SwitchRequest::slow().target(), Some(Cluster::Slow));
    }

    #[test]
    fn empty_flags_target_nothing() {
        let request = SwitchRequest::new(SwitchFlags::empty());

        assert_eq!(request.target(), None);
    }

    #[test]
    fn both_request_flags_cancel_out() {
        let request = SwitchRequest::new(
            SwitchFlags::REQUEST_FAST_CLUSTER | SwitchFlags::REQUEST_SLOW_CLUSTER,
        );

        assert_eq!(request.target(), None);
    }

    #[test]
    fn reserved_bits_are_ignored() {
        let flags = SwitchFlags::from_bits_retain(1 << 7) | SwitchFlags::REQUEST_SLOW_CLUSTER;
        let request = SwitchRequest::new(flags);

        assert_eq!(request.target(), Some(Cluster::Slow));
    }

    #[test]
    fn residency_hint_is_carried() {
        let request = SwitchRequest::fast().with_residency_hint(Duration::from_micros(250));

        assert_eq!(request.residency_hint(), Some(Duration::from_micros(250)));
        assert_eq!(SwitchRequest::fast().residency_hint(), None);
    }
}
