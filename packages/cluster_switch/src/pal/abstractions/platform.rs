use std::fmt::Debug;

use thiserror::Error;

use crate::power_state::PowerState;
use crate::{Cluster, CpuId};

/// Byte length of one firmware mailbox frame, request and response alike.
pub(crate) const MAILBOX_FRAME_LEN: usize = 4;

/// Identifies the kind of message carried by a firmware mailbox frame.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(crate) struct MessageKind(pub(crate) u32);

impl MessageKind {
    /// Request the firmware to migrate all logical CPUs to the other cluster.
    ///
    /// Payload: little-endian 32-bit physical identifier of the initiating CPU.
    /// Response: little-endian 32-bit bitmask of logical CPU slots resident post-switch.
    pub(crate) const SWITCH_CLUSTER: Self = Self(27);
}

/// The atomic mailbox exchange did not complete.
#[derive(Debug, Error)]
#[error("atomic mailbox exchange with the power management firmware did not complete")]
pub(crate) struct ExchangeError;

/// Saved interrupt enable state, returned by [`Platform::interrupts_save()`] and consumed by
/// [`Platform::interrupts_restore()`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct InterruptState(pub(crate) u32);

/// A one-shot task dispatched for execution on a specific remote CPU.
pub(crate) type RemoteWork = Box<dyn FnOnce() + Send + 'static>;

/// The hardware endpoints the cluster switch depends on.
///
/// Every method models an operation of the underlying silicon or its firmware. Implementations
/// are the in-process SoC model (build target), the configurable fake behind the `test-util`
/// feature, and a mock for unit tests.
pub(crate) trait Platform: Debug + Send + Sync + 'static {
    /// Reads one 32-bit word from the fuse block at the given byte offset.
    ///
    /// Fuse reads cannot fail; the fuse block is always accessible once the chip runs code.
    fn read_fuse(&self, offset: u32) -> u32;

    /// The logical identifier of the CPU executing the calling thread.
    fn current_cpu(&self) -> CpuId;

    /// Resolves a logical CPU identifier to the physical identifier the interconnect uses.
    fn physical_cpu_id(&self, logical: CpuId) -> CpuId;

    /// The cluster that hosted the logical CPUs when the chip came out of reset.
    fn boot_cluster(&self) -> Cluster;

    /// Performs one atomic request/response exchange with the power management firmware.
    ///
    /// The exchange runs with interrupts disabled and cannot be preempted or interrupted
    /// mid-way. It either completes with a full response frame or fails as a unit.
    fn mailbox_exchange_atomic(
        &self,
        kind: MessageKind,
        request: [u8; MAILBOX_FRAME_LEN],
    ) -> Result<[u8; MAILBOX_FRAME_LEN], ExchangeError>;

    /// Enqueues a one-shot task for execution on the given remote CPU.
    ///
    /// The enqueue is non-blocking and the task runs asynchronously. No completion signal is
    /// observable to the dispatcher; callers that need a rendezvous must obtain it from the
    /// hardware or firmware layer, not from this method.
    fn dispatch_on_cpu(&self, cpu: CpuId, work: RemoteWork);

    /// Suspends the calling CPU into the given power state.
    ///
    /// Returns once the hardware resumes the CPU. For cluster-level states the return happens
    /// on the destination cluster, after the firmware has completed the handoff. Callers have
    /// interrupts disabled around this call.
    fn suspend_current_cpu(&self, state: PowerState);

    /// Announces to the power management subsystem that the calling CPU is about to idle.
    fn pm_notify_enter(&self);

    /// Announces to the power management subsystem that the calling CPU left idle.
    fn pm_notify_exit(&self);

    /// Disables local interrupts on the calling CPU, returning the previous state.
    fn interrupts_save(&self) -> InterruptState;

    /// Restores the local interrupt state saved by [`interrupts_save()`][Self::interrupts_save].
    fn interrupts_restore(&self, saved: InterruptState);

    /// Disables preemption of the calling thread.
    fn preemption_disable(&self);

    /// Re-enables preemption of the calling thread.
    fn preemption_enable(&self);
}
