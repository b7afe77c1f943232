/// Identifies a specific logical or physical CPU.
///
/// Logical identifiers are the slot numbers the scheduler works with; physical identifiers are
/// the values the interconnect uses to address a core. The two are related by a fixed mapping
/// that the platform layer resolves when a firmware request is assembled.
pub type CpuId = u32;

/// Differentiates the two CPU clusters of the SoC.
///
/// The idea behind this classification is that the slower cluster tends to be more
/// energy-efficient, so callers switch to the fast cluster to get processing done quickly and
/// to the slow cluster to conserve energy.
///
/// Exactly one cluster hosts all logical CPUs at any instant. Migrating between the two is a
/// whole-system operation performed by [`ClusterSwitcher`][crate::ClusterSwitcher].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[expect(
    clippy::exhaustive_enums,
    reason = "mirroring the two-cluster structure of the silicon"
)]
pub enum Cluster {
    /// The high-performance cluster, active out of reset.
    Fast,

    /// The power-efficient cluster. May be permanently disabled by fuses on some parts.
    Slow,
}
