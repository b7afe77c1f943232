//! Remote parking of every logical CPU other than the one driving a switch.

use std::sync::Arc;

use tracing::trace;

use crate::cluster_cell::ClusterCell;
use crate::firmware::FirmwareResponse;
use crate::pal::{Platform, PlatformFacade};
use crate::power_state::PowerState;
use crate::{Cluster, CpuId};

/// Dispatches one-shot park tasks to the CPUs that must quiesce for a switch.
///
/// Dispatch is fire-and-forget: the initiating CPU does not wait for the remote tasks before
/// entering its own cluster-level suspend. The firmware rendezvouses all cores at the cluster
/// power-down boundary, so software-level completion tracking would only lengthen the window
/// between dispatch and handoff.
#[derive(Debug)]
pub(crate) struct QuiesceDispatcher {
    pal: PlatformFacade,
    current: Arc<ClusterCell>,
}

impl QuiesceDispatcher {
    #[must_use]
    pub(crate) fn new(pal: PlatformFacade, current: Arc<ClusterCell>) -> Self {
        Self { pal, current }
    }

    /// Parks every CPU in the firmware's resident set except the initiating one.
    pub(crate) fn park_remote_cores(
        &self,
        response: &FirmwareResponse,
        initiating_cpu: CpuId,
        target: Cluster,
    ) {
        let mut remote = response.resident();
        remote.remove(initiating_cpu);

        trace!(
            cpus = %cpulist::emit(remote.iter()),
            ?target,
            "parking remote cores for cluster switch"
        );

        for cpu in remote.iter() {
            let pal = self.pal.clone();
            let current = Arc::clone(&self.current);

            self.pal
                .dispatch_on_cpu(cpu, Box::new(move || park_core(&pal, &current, target)));
        }
    }
}

/// Body of the one-shot remote task: retire the executing core into core-level retention.
///
/// The cluster cell read is a best-effort snapshot used only to skip redundant parking; the
/// firmware rendezvous remains authoritative for the handoff itself.
fn park_core(pal: &PlatformFacade, current: &ClusterCell, target: Cluster) {
    if current.load() == target {
        return;
    }

    let saved = pal.interrupts_save();

    pal.pm_notify_enter();
    pal.suspend_current_cpu(PowerState::CORE_RETENTION);
    pal.pm_notify_exit();

    pal.interrupts_restore(saved);
}
