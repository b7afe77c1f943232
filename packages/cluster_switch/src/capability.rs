//! Start-up probe answering whether the slow cluster is usable on this part.

use crate::pal::{Platform, PlatformFacade};

/// Fuse block offset of the SKU direct configuration word.
pub(crate) const SKU_DIRECT_CONFIG: u32 = 0x1f4;

/// Bit of the SKU word that, when set, marks the slow cluster as disabled.
pub(crate) const DISABLE_SLOW_CLUSTER_BIT: u32 = 5;

/// Reads the SKU fuses and reports whether the slow cluster is usable.
///
/// The fuse bit carries inverted sense: set means disabled. Called once when a switcher
/// instance is constructed; the result is immutable for the process lifetime because fuses
/// are a read-only hardware fact.
#[must_use]
pub(crate) fn probe_slow_cluster_support(pal: &PlatformFacade) -> bool {
    let slow_cluster_disabled = (pal.read_fuse(SKU_DIRECT_CONFIG) >> DISABLE_SLOW_CLUSTER_BIT) & 1;

    slow_cluster_disabled == 0
}
