#![expect(clippy::same_name_method, reason = "mock magic")]

use mockall::mock;

use crate::pal::{ExchangeError, InterruptState, MAILBOX_FRAME_LEN, MessageKind, Platform, RemoteWork};
use crate::power_state::PowerState;
use crate::{Cluster, CpuId};

// Mockall cannot express the boxed one-shot task parameter of `dispatch_on_cpu`, so we mock a
// similar-enough method that it does know how to handle and call it from a manual trait
// implementation that drops the task. Dropping is legal here: the dispatch contract offers no
// completion guarantee, so a task that never ran is indistinguishable to the dispatcher.
mock! {
    #[derive(Debug)]
    pub Platform {
        pub fn read_fuse(&self, offset: u32) -> u32;
        pub fn current_cpu(&self) -> CpuId;
        pub fn physical_cpu_id(&self, logical: CpuId) -> CpuId;
        pub fn boot_cluster(&self) -> Cluster;
        pub fn mailbox_exchange_atomic(
            &self,
            kind: MessageKind,
            request: [u8; MAILBOX_FRAME_LEN],
        ) -> Result<[u8; MAILBOX_FRAME_LEN], ExchangeError>;
        pub fn dispatch_on_cpu_core(&self, cpu: CpuId);
        pub fn suspend_current_cpu(&self, state: PowerState);
        pub fn pm_notify_enter(&self);
        pub fn pm_notify_exit(&self);
        pub fn interrupts_save(&self) -> InterruptState;
        pub fn interrupts_restore(&self, saved: InterruptState);
        pub fn preemption_disable(&self);
        pub fn preemption_enable(&self);
    }
}

impl Platform for MockPlatform {
    fn read_fuse(&self, offset: u32) -> u32 {
        self.read_fuse(offset)
    }

    fn current_cpu(&self) -> CpuId {
        self.current_cpu()
    }

    fn physical_cpu_id(&self, logical: CpuId) -> CpuId {
        self.physical_cpu_id(logical)
    }

    fn boot_cluster(&self) -> Cluster {
        self.boot_cluster()
    }

    fn mailbox_exchange_atomic(
        &self,
        kind: MessageKind,
        request: [u8; MAILBOX_FRAME_LEN],
    ) -> Result<[u8; MAILBOX_FRAME_LEN], ExchangeError> {
        self.mailbox_exchange_atomic(kind, request)
    }

    fn dispatch_on_cpu(&self, cpu: CpuId, work: RemoteWork) {
        drop(work);
        self.dispatch_on_cpu_core(cpu);
    }

    fn suspend_current_cpu(&self, state: PowerState) {
        self.suspend_current_cpu(state);
    }

    fn pm_notify_enter(&self) {
        self.pm_notify_enter();
    }

    fn pm_notify_exit(&self) {
        self.pm_notify_exit();
    }

    fn interrupts_save(&self) -> InterruptState {
        self.interrupts_save()
    }

    fn interrupts_restore(&self, saved: InterruptState) {
        self.interrupts_restore(saved);
    }

    fn preemption_disable(&self) {
        self.preemption_disable();
    }

    fn preemption_enable(&self) {
        self.preemption_enable();
    }
}
