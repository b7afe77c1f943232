//! The initiating CPU's own retirement into cluster-level retention.

use crate::pal::{Platform, PlatformFacade};
use crate::power_state::PowerState;

/// Suspends the calling CPU into cluster-level retention, completing the physical handoff.
///
/// Callers have preemption disabled and interrupts saved and disabled; the sequence is not
/// safely resumable if preempted mid-way. The call returns only after the hardware finishes
/// the handoff and resumes this CPU in the destination cluster.
pub(crate) fn shutdown_current_cluster(pal: &PlatformFacade) {
    pal.pm_notify_enter();

    pal.suspend_current_cpu(PowerState::CLUSTER_RETENTION);

    pal.pm_notify_exit();
}
