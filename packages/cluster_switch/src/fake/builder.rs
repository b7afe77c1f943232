//! Builder for configuring a fake SoC.

use std::num::NonZero;

use crate::cpu_mask::LOGICAL_CPU_SLOTS;
use crate::{Cluster, CpuId, CpuMask};

/// Builder for configuring a [`FakeSoc`][crate::fake::FakeSoc].
///
/// The default configuration mirrors an unrestricted part: four logical CPUs with identity
/// physical numbering, the switch initiated from CPU 0, boot on the fast cluster, the slow
/// cluster fuse unblown, and a firmware that reports every configured CPU resident after a
/// switch.
///
/// # Example
///
/// ```
/// use cluster_switch::Cluster;
/// use cluster_switch::fake::{FakeSoc, SocBuilder};
/// use new_zealand::nz;
///
/// let soc = FakeSoc::new(
///     SocBuilder::new()
///         .cpu_count(nz!(2))
///         .caller_cpu(1)
///         .boot_cluster(Cluster::Slow),
/// );
/// ```
#[derive(Clone, Debug)]
pub struct SocBuilder {
    pub(crate) cpu_count: NonZero<u32>,
    pub(crate) caller_cpu: CpuId,
    pub(crate) boot_cluster: Cluster,
    pub(crate) slow_cluster_fuse_blown: bool,
    pub(crate) firmware_resident_mask: Option<CpuMask>,
    pub(crate) firmware_exchange_fails: bool,
    pub(crate) physical_cpu_map: Option<Vec<CpuId>>,
}

impl Default for SocBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SocBuilder {
    /// Creates a builder with the unrestricted default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cpu_count: NonZero::new(LOGICAL_CPU_SLOTS).expect("slot count is nonzero"),
            caller_cpu: 0,
            boot_cluster: Cluster::Fast,
            slow_cluster_fuse_blown: false,
            firmware_resident_mask: None,
            firmware_exchange_fails: false,
            physical_cpu_map: None,
        }
    }

    /// Sets how many logical CPUs the part exposes, at most the protocol's slot count.
    #[must_use]
    pub fn cpu_count(mut self, count: NonZero<u32>) -> Self {
        assert!(
            count.get() <= LOGICAL_CPU_SLOTS,
            "a part exposes at most {LOGICAL_CPU_SLOTS} logical CPUs"
        );
        self.cpu_count = count;
        self
    }

    /// Sets the logical CPU that threads outside any remote park task execute on.
    ///
    /// This is the CPU that initiates switches in tests.
    #[must_use]
    pub fn caller_cpu(mut self, cpu: CpuId) -> Self {
        self.caller_cpu = cpu;
        self
    }

    /// Sets the cluster hosting the CPUs when the part comes out of reset.
    #[must_use]
    pub fn boot_cluster(mut self, cluster: Cluster) -> Self {
        self.boot_cluster = cluster;
        self
    }

    /// Marks the slow cluster as fuse-disabled, as on restricted parts.
    #[must_use]
    pub fn blow_slow_cluster_fuse(mut self) -> Self {
        self.slow_cluster_fuse_blown = true;
        self
    }

    /// Scripts the resident mask the firmware reports after a switch.
    ///
    /// Defaults to every configured CPU resident.
    #[must_use]
    pub fn firmware_resident_mask(mut self, mask: CpuMask) -> Self {
        self.firmware_resident_mask = Some(mask);
        self
    }

    /// Makes every firmware mailbox exchange fail, simulating a communication fault.
    #[must_use]
    pub fn fail_firmware_exchange(mut self) -> Self {
        self.firmware_exchange_fails = true;
        self
    }

    /// Sets the logical-to-physical CPU identifier mapping, one entry per logical CPU.
    ///
    /// Defaults to identity.
    #[must_use]
    pub fn physical_cpu_map(mut self, map: Vec<CpuId>) -> Self {
        self.physical_cpu_map = Some(map);
        self
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use new_zealand::nz;

    use super::*;

    #[test]
    fn default_equals_new() {
        let default_builder = SocBuilder::default();
        let new_builder = SocBuilder::new();

        assert_eq!(default_builder.cpu_count, new_builder.cpu_count);
        assert_eq!(default_builder.caller_cpu, new_builder.caller_cpu);
        assert_eq!(default_builder.boot_cluster, new_builder.boot_cluster);
    }

    #[test]
    fn defaults_describe_an_unrestricted_part() {
        let builder = SocBuilder::new();

        assert_eq!(builder.cpu_count.get(), LOGICAL_CPU_SLOTS);
        assert_eq!(builder.caller_cpu, 0);
        assert_eq!(builder.boot_cluster, Cluster::Fast);
        assert!(!builder.slow_cluster_fuse_blown);
        assert!(!builder.firmware_exchange_fails);
        assert!(builder.firmware_resident_mask.is_none());
        assert!(builder.physical_cpu_map.is_none());
    }

    #[test]
    #[should_panic]
    fn cpu_count_beyond_the_slot_range_panics() {
        drop(SocBuilder::new().cpu_count(nz!(5)));
    }
}
