//! Fake SoC backend implementation.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, ThreadId};
use std::time::Duration;

use crate::capability::{DISABLE_SLOW_CLUSTER_BIT, SKU_DIRECT_CONFIG};
use crate::fake::SocBuilder;
use crate::pal::{ExchangeError, InterruptState, MAILBOX_FRAME_LEN, MessageKind, Platform, RemoteWork};
use crate::power_state::PowerState;
use crate::{Cluster, CpuId};

/// How long a drain may take before the fake declares the test wedged.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Per-thread execution state of the fake SoC.
#[derive(Clone, Copy, Debug, Default)]
struct FakeThreadState {
    /// The logical CPU this thread simulates, when it runs a remote park task.
    current_cpu: Option<CpuId>,

    /// Nesting depth of interrupt-disabled sections.
    irq_depth: u32,

    /// Nesting depth of preemption-disabled sections.
    preempt_depth: u32,
}

/// State shared between the fake platform and the threads running its remote tasks.
#[derive(Debug, Default)]
struct FakeShared {
    /// Number of dispatched remote tasks that have not finished yet.
    remote_in_flight: Mutex<usize>,

    /// Signalled whenever `remote_in_flight` drops to zero.
    remote_drained: Condvar,

    /// Logical CPUs that received a remote park task, in dispatch order.
    quiesce_dispatches: Mutex<Vec<CpuId>>,

    /// Logical CPUs that actually entered core-level retention.
    core_retentions: Mutex<Vec<CpuId>>,

    /// Completed cluster-level handoffs.
    cluster_transitions: AtomicUsize,

    /// Request frames that reached the firmware mailbox.
    mailbox_requests: Mutex<Vec<[u8; MAILBOX_FRAME_LEN]>>,

    /// Per-thread state, keyed by thread.
    thread_states: Mutex<HashMap<ThreadId, FakeThreadState>>,
}

impl FakeShared {
    fn with_thread_state<R>(&self, f: impl FnOnce(&mut FakeThreadState) -> R) -> R {
        let mut states = self
            .thread_states
            .lock()
            .expect("fake thread state registry should never be poisoned");

        f(states.entry(thread::current().id()).or_default())
    }

    fn finish_remote(&self) {
        let mut in_flight = self
            .remote_in_flight
            .lock()
            .expect("remote task counter should never be poisoned");

        *in_flight = in_flight
            .checked_sub(1)
            .expect("finished a remote task that was never dispatched");

        if *in_flight == 0 {
            self.remote_drained.notify_all();
        }
    }

    fn drain_remote(&self) {
        let in_flight = self
            .remote_in_flight
            .lock()
            .expect("remote task counter should never be poisoned");

        let (_in_flight, timeout) = self
            .remote_drained
            .wait_timeout_while(in_flight, DRAIN_TIMEOUT, |count| *count > 0)
            .expect("remote task counter should never be poisoned");

        assert!(!timeout.timed_out(), "remote park tasks did not drain");
    }
}

/// Fake platform simulating a configurable two-cluster SoC.
///
/// Remote dispatch runs each task on its own thread, tagged with the target CPU, so the fake
/// observes which simulated CPU performs each operation. Cluster-level suspend implements the
/// firmware rendezvous contract: it drains previously dispatched remote tasks before
/// completing the handoff, the way the hardware gathers all cores at the cluster power-down
/// boundary.
#[derive(Debug)]
pub(crate) struct FakeSocPlatform {
    cpu_count: u32,
    caller_cpu: CpuId,
    boot_cluster: Cluster,
    sku_direct_config: u32,
    resident_word: u32,
    exchange_fails: bool,
    physical_cpu_map: Option<Vec<CpuId>>,

    shared: Arc<FakeShared>,
}

impl FakeSocPlatform {
    /// Creates a new fake SoC backend from a builder.
    pub(crate) fn from_builder(builder: &SocBuilder) -> Self {
        let cpu_count = builder.cpu_count.get();

        assert!(
            builder.caller_cpu < cpu_count,
            "caller CPU {} does not exist on a part with {cpu_count} CPUs",
            builder.caller_cpu
        );

        if let Some(map) = &builder.physical_cpu_map {
            assert_eq!(
                map.len(),
                cpu_count as usize,
                "physical CPU map must have one entry per logical CPU"
            );
        }

        let all_cpus_resident = (1_u32 << cpu_count) - 1;
        let resident_word = builder
            .firmware_resident_mask
            .map_or(all_cpus_resident, |mask| mask.bits());

        let sku_direct_config = if builder.slow_cluster_fuse_blown {
            1 << DISABLE_SLOW_CLUSTER_BIT
        } else {
            0
        };

        Self {
            cpu_count,
            caller_cpu: builder.caller_cpu,
            boot_cluster: builder.boot_cluster,
            sku_direct_config,
            resident_word,
            exchange_fails: builder.firmware_exchange_fails,
            physical_cpu_map: builder.physical_cpu_map.clone(),
            shared: Arc::new(FakeShared::default()),
        }
    }

    /// Blocks until every dispatched remote task has finished.
    pub(crate) fn drain_remote(&self) {
        self.shared.drain_remote();
    }

    pub(crate) fn quiesce_dispatches(&self) -> Vec<CpuId> {
        self.shared
            .quiesce_dispatches
            .lock()
            .expect("fake recording should never be poisoned")
            .clone()
    }

    pub(crate) fn core_retentions(&self) -> Vec<CpuId> {
        self.shared
            .core_retentions
            .lock()
            .expect("fake recording should never be poisoned")
            .clone()
    }

    pub(crate) fn cluster_transitions(&self) -> usize {
        self.shared.cluster_transitions.load(Ordering::SeqCst)
    }

    pub(crate) fn mailbox_exchanges(&self) -> usize {
        self.shared
            .mailbox_requests
            .lock()
            .expect("fake recording should never be poisoned")
            .len()
    }
}

impl Platform for FakeSocPlatform {
    fn read_fuse(&self, offset: u32) -> u32 {
        if offset == SKU_DIRECT_CONFIG {
            self.sku_direct_config
        } else {
            0
        }
    }

    fn current_cpu(&self) -> CpuId {
        self.shared
            .with_thread_state(|state| state.current_cpu)
            .unwrap_or(self.caller_cpu)
    }

    fn physical_cpu_id(&self, logical: CpuId) -> CpuId {
        self.physical_cpu_map
            .as_ref()
            .and_then(|map| map.get(logical as usize).copied())
            .unwrap_or(logical)
    }

    fn boot_cluster(&self) -> Cluster {
        self.boot_cluster
    }

    fn mailbox_exchange_atomic(
        &self,
        kind: MessageKind,
        request: [u8; MAILBOX_FRAME_LEN],
    ) -> Result<[u8; MAILBOX_FRAME_LEN], ExchangeError> {
        assert_eq!(
            kind,
            MessageKind::SWITCH_CLUSTER,
            "the fake firmware understands only cluster switch requests"
        );

        self.shared
            .mailbox_requests
            .lock()
            .expect("fake recording should never be poisoned")
            .push(request);

        if self.exchange_fails {
            return Err(ExchangeError);
        }

        Ok(self.resident_word.to_le_bytes())
    }

    fn dispatch_on_cpu(&self, cpu: CpuId, work: RemoteWork) {
        assert!(
            cpu < self.cpu_count,
            "dispatched to CPU {cpu} on a part with {} CPUs",
            self.cpu_count
        );

        self.shared
            .quiesce_dispatches
            .lock()
            .expect("fake recording should never be poisoned")
            .push(cpu);

        *self
            .shared
            .remote_in_flight
            .lock()
            .expect("remote task counter should never be poisoned") += 1;

        let shared = Arc::clone(&self.shared);

        let spawned = thread::Builder::new()
            .name(format!("fake-remote-cpu-{cpu}"))
            .spawn(move || {
                shared.with_thread_state(|state| state.current_cpu = Some(cpu));

                work();

                shared.finish_remote();
            })
            .expect("spawning a fake remote task thread failed");

        // Detached; the dispatch contract offers no completion signal. Tests that need one
        // use `drain_remote()`.
        drop(spawned);
    }

    fn suspend_current_cpu(&self, state: PowerState) {
        let (cpu, irq_depth, preempt_depth) = self.shared.with_thread_state(|thread_state| {
            (
                thread_state.current_cpu,
                thread_state.irq_depth,
                thread_state.preempt_depth,
            )
        });

        assert!(irq_depth > 0, "suspend entered with interrupts enabled");

        if state.is_cluster_level() {
            assert!(
                preempt_depth > 0,
                "cluster handoff entered with preemption enabled"
            );

            // The firmware gathers every core at the cluster power-down boundary before it
            // performs the handoff. The fake realizes that rendezvous by draining the
            // remote park tasks dispatched so far.
            self.shared.drain_remote();

            self.shared.cluster_transitions.fetch_add(1, Ordering::SeqCst);
        } else {
            self.shared
                .core_retentions
                .lock()
                .expect("fake recording should never be poisoned")
                .push(cpu.unwrap_or(self.caller_cpu));
        }
    }

    fn pm_notify_enter(&self) {}

    fn pm_notify_exit(&self) {}

    fn interrupts_save(&self) -> InterruptState {
        self.shared.with_thread_state(|state| {
            let saved = state.irq_depth;
            state.irq_depth = saved.wrapping_add(1);
            InterruptState(saved)
        })
    }

    fn interrupts_restore(&self, saved: InterruptState) {
        self.shared.with_thread_state(|state| {
            assert!(state.irq_depth > 0, "unbalanced interrupt restore");
            state.irq_depth = saved.0;
        });
    }

    fn preemption_disable(&self) {
        self.shared
            .with_thread_state(|state| state.preempt_depth = state.preempt_depth.wrapping_add(1));
    }

    fn preemption_enable(&self) {
        self.shared.with_thread_state(|state| {
            assert!(state.preempt_depth > 0, "unbalanced preemption enable");
            state.preempt_depth = state.preempt_depth.wrapping_sub(1);
        });
    }
}
