//! Encoding of the processor-architecture suspend argument.
//!
//! The suspend call takes a single 32-bit power state word: the state type occupies bits
//! 31:30 and the platform-specific state identifier occupies the low bits. The cluster switch
//! uses two power-down states: state 30 retains a single core, state 31 retains the whole
//! cluster and is the trigger the firmware uses to perform the physical cluster handoff.

/// Power state type for states that power the affected topology node down.
const POWER_STATE_TYPE_POWER_DOWN: u32 = 1;

/// Platform state identifier for core-level power-down retention.
const CORE_RETENTION_STATE_ID: u32 = 30;

/// Platform state identifier for cluster-level power-down retention.
const CLUSTER_RETENTION_STATE_ID: u32 = 31;

/// A power state word accepted by the suspend call.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(crate) struct PowerState(u32);

impl PowerState {
    /// Core-level power-down with state 30 retention. Parks one core.
    pub(crate) const CORE_RETENTION: Self = Self::power_down(CORE_RETENTION_STATE_ID);

    /// Cluster-level power-down with state 31 retention. Entering this state from the last
    /// running core completes the cluster handoff.
    pub(crate) const CLUSTER_RETENTION: Self = Self::power_down(CLUSTER_RETENTION_STATE_ID);

    const fn power_down(state_id: u32) -> Self {
        Self((POWER_STATE_TYPE_POWER_DOWN << 30) | state_id)
    }

    /// The raw 32-bit argument passed to the suspend call.
    #[must_use]
    #[inline]
    pub(crate) const fn as_arg(self) -> u32 {
        self.0
    }

    /// Whether this state powers down the whole cluster rather than a single core.
    #[must_use]
    #[inline]
    pub(crate) const fn is_cluster_level(self) -> bool {
        (self.as_arg() & 0x3f) == CLUSTER_RETENTION_STATE_ID
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn core_retention_encoding() {
        assert_eq!(PowerState::CORE_RETENTION.as_arg(), (1 << 30) | 30);
        assert!(!PowerState::CORE_RETENTION.is_cluster_level());
    }

    #[test]
    fn cluster_retention_encoding() {
        assert_eq!(PowerState::CLUSTER_RETENTION.as_arg(), (1 << 30) | 31);
        assert!(PowerState::CLUSTER_RETENTION.is_cluster_level());
    }
}
