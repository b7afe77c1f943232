use std::cell::Cell;
use std::thread;

use crate::cpu_mask::LOGICAL_CPU_SLOTS;
use crate::pal::{ExchangeError, InterruptState, MAILBOX_FRAME_LEN, MessageKind, Platform, RemoteWork};
use crate::power_state::PowerState;
use crate::{Cluster, CpuId};

thread_local! {
    /// The logical CPU assigned to the current thread.
    ///
    /// Computed from the thread ID on first access and stable for the thread's lifetime. This
    /// simulates a thread executing on a specific core even though the model performs no
    /// actual placement.
    static THREAD_CPU: Cell<Option<CpuId>> = const { Cell::new(None) };

    /// Nesting depth of interrupt-disabled sections on the current thread.
    static IRQ_DEPTH: Cell<u32> = const { Cell::new(0) };

    /// Nesting depth of preemption-disabled sections on the current thread.
    static PREEMPT_DEPTH: Cell<u32> = const { Cell::new(0) };

    /// Nesting depth of power management idle notifications on the current thread.
    static PM_DEPTH: Cell<u32> = const { Cell::new(0) };
}

/// In-process model of the two-cluster SoC, used as the build-target platform.
///
/// The model provides functional degradation rather than hardware access:
///
/// - Four logical CPU slots; each thread gets a stable slot derived from its thread ID
/// - All fuses read as unblown, so the slow cluster is usable
/// - The firmware mailbox answers a switch request with all slots resident
/// - Remote dispatch runs the task on a detached thread with no completion signal
/// - Suspends return immediately; cluster handoffs complete instantly
/// - Interrupt, preemption and idle notification state is tracked per thread so sequencing
///   mistakes trip debug assertions
///
/// Binding to actual silicon replaces this module behind the same trait.
#[derive(Debug)]
pub(crate) struct SimulatedSoc;

/// Singleton instance of [`SimulatedSoc`], used by public API types to hook up to the
/// build-target platform.
pub(crate) static BUILD_TARGET_PLATFORM: SimulatedSoc = SimulatedSoc;

impl SimulatedSoc {
    fn thread_cpu() -> CpuId {
        THREAD_CPU.with(|cached| {
            if let Some(cpu) = cached.get() {
                return cpu;
            }

            // Distribute threads across the slots with a stable hash of the thread ID.
            let thread_id_hash = {
                use std::collections::hash_map::DefaultHasher;
                use std::hash::{Hash, Hasher};

                let mut hasher = DefaultHasher::new();
                thread::current().id().hash(&mut hasher);
                hasher.finish()
            };

            #[expect(
                clippy::cast_possible_truncation,
                reason = "result of modulo is guaranteed to be less than the slot count"
            )]
            let cpu = (thread_id_hash % u64::from(LOGICAL_CPU_SLOTS)) as CpuId;

            cached.set(Some(cpu));
            cpu
        })
    }
}

impl Platform for SimulatedSoc {
    fn read_fuse(&self, _offset: u32) -> u32 {
        // No fuse is blown on the model; every optional hardware block is usable.
        0
    }

    fn current_cpu(&self) -> CpuId {
        Self::thread_cpu()
    }

    fn physical_cpu_id(&self, logical: CpuId) -> CpuId {
        // The model's interconnect numbers cores the way the scheduler does.
        logical
    }

    fn boot_cluster(&self) -> Cluster {
        Cluster::Fast
    }

    fn mailbox_exchange_atomic(
        &self,
        kind: MessageKind,
        _request: [u8; MAILBOX_FRAME_LEN],
    ) -> Result<[u8; MAILBOX_FRAME_LEN], ExchangeError> {
        if kind != MessageKind::SWITCH_CLUSTER {
            return Err(ExchangeError);
        }

        // All slots come up resident in the destination cluster.
        let resident: u32 = (1 << LOGICAL_CPU_SLOTS) - 1;
        Ok(resident.to_le_bytes())
    }

    fn dispatch_on_cpu(&self, cpu: CpuId, work: RemoteWork) {
        let spawned = thread::Builder::new()
            .name(format!("remote-cpu-{cpu}"))
            .spawn(work)
            .expect("spawning a remote task thread failed");

        // Detached; the dispatch contract offers no completion signal.
        drop(spawned);
    }

    fn suspend_current_cpu(&self, state: PowerState) {
        debug_assert!(
            IRQ_DEPTH.with(Cell::get) > 0,
            "suspend entered with interrupts enabled"
        );

        if state.is_cluster_level() {
            debug_assert!(
                PREEMPT_DEPTH.with(Cell::get) > 0,
                "cluster handoff entered with preemption enabled"
            );
        }

        // The model resumes instantly; a cluster handoff has no observable latency here.
    }

    fn pm_notify_enter(&self) {
        PM_DEPTH.with(|depth| depth.set(depth.get().wrapping_add(1)));
    }

    fn pm_notify_exit(&self) {
        PM_DEPTH.with(|depth| {
            debug_assert!(depth.get() > 0, "unbalanced idle notification exit");
            depth.set(depth.get().wrapping_sub(1));
        });
    }

    fn interrupts_save(&self) -> InterruptState {
        IRQ_DEPTH.with(|depth| {
            let saved = depth.get();
            depth.set(saved.wrapping_add(1));
            InterruptState(saved)
        })
    }

    fn interrupts_restore(&self, saved: InterruptState) {
        IRQ_DEPTH.with(|depth| {
            debug_assert!(depth.get() > 0, "unbalanced interrupt restore");
            depth.set(saved.0);
        });
    }

    fn preemption_disable(&self) {
        PREEMPT_DEPTH.with(|depth| depth.set(depth.get().wrapping_add(1)));
    }

    fn preemption_enable(&self) {
        PREEMPT_DEPTH.with(|depth| {
            debug_assert!(depth.get() > 0, "unbalanced preemption enable");
            depth.set(depth.get().wrapping_sub(1));
        });
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::sync::mpsc;
    use std::time::Duration;

    use super::*;

    #[test]
    fn thread_cpu_is_stable_and_in_range() {
        let platform = &BUILD_TARGET_PLATFORM;

        let first = platform.current_cpu();
        let second = platform.current_cpu();

        assert_eq!(first, second);
        assert!(first < LOGICAL_CPU_SLOTS);
    }

    #[test]
    fn fuses_read_unblown() {
        assert_eq!(BUILD_TARGET_PLATFORM.read_fuse(0x1f4), 0);
    }

    #[test]
    fn switch_request_reports_all_slots_resident() {
        let reply = BUILD_TARGET_PLATFORM
            .mailbox_exchange_atomic(MessageKind::SWITCH_CLUSTER, 0u32.to_le_bytes())
            .unwrap();

        assert_eq!(u32::from_le_bytes(reply), 0b1111);
    }

    #[test]
    fn unknown_message_kind_fails_the_exchange() {
        // There is exactly one defined message kind; anything else cannot complete.
        let result =
            BUILD_TARGET_PLATFORM.mailbox_exchange_atomic(MessageKind(99), 0u32.to_le_bytes());

        assert!(result.is_err());
    }

    #[test]
    fn dispatched_work_eventually_runs() {
        let (sender, receiver) = mpsc::channel();

        BUILD_TARGET_PLATFORM.dispatch_on_cpu(
            1,
            Box::new(move || {
                sender.send(42).unwrap();
            }),
        );

        assert_eq!(receiver.recv_timeout(Duration::from_secs(10)).unwrap(), 42);
    }

    #[test]
    fn interrupt_state_nests_and_restores() {
        let platform = &BUILD_TARGET_PLATFORM;

        let outer = platform.interrupts_save();
        let inner = platform.interrupts_save();

        assert_ne!(outer, inner);

        platform.interrupts_restore(inner);
        platform.interrupts_restore(outer);

        assert_eq!(IRQ_DEPTH.with(Cell::get), 0);
    }

    #[test]
    fn suspend_inside_disabled_sections_is_accepted() {
        let platform = &BUILD_TARGET_PLATFORM;

        platform.preemption_disable();
        let saved = platform.interrupts_save();

        platform.pm_notify_enter();
        platform.suspend_current_cpu(PowerState::CORE_RETENTION);
        platform.suspend_current_cpu(PowerState::CLUSTER_RETENTION);
        platform.pm_notify_exit();

        platform.interrupts_restore(saved);
        platform.preemption_enable();
    }
}
