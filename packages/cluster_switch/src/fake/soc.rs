//! Public handle to a fake SoC.

use std::borrow::Borrow;
use std::sync::Arc;

use crate::CpuId;
use crate::fake::{FakeSocPlatform, SocBuilder};

/// A simulated two-cluster SoC for testing.
///
/// Pass the handle to [`ClusterSwitcher::fake()`][crate::ClusterSwitcher::fake] to drive the
/// switch machinery against it, then inspect what the machinery asked the hardware to do.
/// Each instance maintains its own state, so fakes can coexist in parallel tests without
/// interference. Clones share the underlying SoC.
///
/// # Example
///
/// ```
/// use cluster_switch::fake::{FakeSoc, SocBuilder};
/// use cluster_switch::{ClusterSwitcher, SwitchRequest};
///
/// let soc = FakeSoc::new(SocBuilder::new());
/// let switcher = ClusterSwitcher::fake(&soc);
///
/// switcher.perform_switch(SwitchRequest::slow()).unwrap();
///
/// soc.settle();
/// assert_eq!(soc.cluster_transitions(), 1);
/// ```
#[derive(Clone, Debug)]
pub struct FakeSoc {
    platform: Arc<FakeSocPlatform>,
}

impl FakeSoc {
    /// Creates a fake SoC from a builder.
    #[must_use]
    pub fn new(builder: impl Borrow<SocBuilder>) -> Self {
        Self {
            platform: Arc::new(FakeSocPlatform::from_builder(builder.borrow())),
        }
    }

    pub(crate) fn platform(&self) -> Arc<FakeSocPlatform> {
        Arc::clone(&self.platform)
    }

    /// Blocks until every dispatched remote park task has finished.
    ///
    /// Remote dispatch is fire-and-forget, so recordings of remote activity are racy until the
    /// tasks drain. Call this before asserting on [`parked_cpus()`][Self::parked_cpus].
    pub fn settle(&self) {
        self.platform.drain_remote();
    }

    /// The logical CPUs that received a remote park task, in dispatch order.
    #[must_use]
    pub fn quiesced_cpus(&self) -> Vec<CpuId> {
        self.platform.quiesce_dispatches()
    }

    /// The logical CPUs that actually entered core-level retention.
    #[must_use]
    pub fn parked_cpus(&self) -> Vec<CpuId> {
        self.platform.core_retentions()
    }

    /// How many cluster-level handoffs the hardware completed.
    #[must_use]
    pub fn cluster_transitions(&self) -> usize {
        self.platform.cluster_transitions()
    }

    /// How many request frames reached the firmware mailbox.
    #[must_use]
    pub fn firmware_exchanges(&self) -> usize {
        self.platform.mailbox_exchanges()
    }
}

impl Default for FakeSoc {
    fn default() -> Self {
        Self::new(SocBuilder::new())
    }
}
