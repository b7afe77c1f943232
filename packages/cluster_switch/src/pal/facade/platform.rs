use std::fmt::Debug;
#[cfg(any(test, feature = "test-util"))]
use std::sync::Arc;

#[cfg(any(test, feature = "test-util"))]
use crate::fake::FakeSocPlatform;
#[cfg(test)]
use crate::pal::MockPlatform;
use crate::pal::sim::{BUILD_TARGET_PLATFORM, SimulatedSoc};
use crate::pal::{ExchangeError, InterruptState, MAILBOX_FRAME_LEN, MessageKind, Platform, RemoteWork};
use crate::power_state::PowerState;
use crate::{Cluster, CpuId};

/// Routes platform calls to the selected [`Platform`] implementation.
///
/// Cheaply cloneable; all logic types hold one of these instead of a concrete platform so that
/// tests can substitute fakes and mocks.
#[derive(Clone)]
pub(crate) enum PlatformFacade {
    Sim(&'static SimulatedSoc),

    #[cfg(any(test, feature = "test-util"))]
    Fake(Arc<FakeSocPlatform>),

    #[cfg(test)]
    Mock(Arc<MockPlatform>),
}

impl PlatformFacade {
    pub(crate) fn target() -> Self {
        Self::Sim(&BUILD_TARGET_PLATFORM)
    }

    #[cfg(any(test, feature = "test-util"))]
    pub(crate) fn from_fake(platform: Arc<FakeSocPlatform>) -> Self {
        Self::Fake(platform)
    }

    #[cfg(test)]
    pub(crate) fn from_mock(mock: MockPlatform) -> Self {
        Self::Mock(Arc::new(mock))
    }
}

impl Platform for PlatformFacade {
    fn read_fuse(&self, offset: u32) -> u32 {
        match self {
            Self::Sim(p) => p.read_fuse(offset),
            #[cfg(any(test, feature = "test-util"))]
            Self::Fake(p) => p.read_fuse(offset),
            #[cfg(test)]
            Self::Mock(p) => p.read_fuse(offset),
        }
    }

    fn current_cpu(&self) -> CpuId {
        match self {
            Self::Sim(p) => p.current_cpu(),
            #[cfg(any(test, feature = "test-util"))]
            Self::Fake(p) => p.current_cpu(),
            #[cfg(test)]
            Self::Mock(p) => p.current_cpu(),
        }
    }

    fn physical_cpu_id(&self, logical: CpuId) -> CpuId {
        match self {
            Self::Sim(p) => p.physical_cpu_id(logical),
            #[cfg(any(test, feature = "test-util"))]
            Self::Fake(p) => p.physical_cpu_id(logical),
            #[cfg(test)]
            Self::Mock(p) => p.physical_cpu_id(logical),
        }
    }

    fn boot_cluster(&self) -> Cluster {
        match self {
            Self::Sim(p) => p.boot_cluster(),
            #[cfg(any(test, feature = "test-util"))]
            Self::Fake(p) => p.boot_cluster(),
            #[cfg(test)]
            Self::Mock(p) => p.boot_cluster(),
        }
    }

    fn mailbox_exchange_atomic(
        &self,
        kind: MessageKind,
        request: [u8; MAILBOX_FRAME_LEN],
    ) -> Result<[u8; MAILBOX_FRAME_LEN], ExchangeError> {
        match self {
            Self::Sim(p) => p.mailbox_exchange_atomic(kind, request),
            #[cfg(any(test, feature = "test-util"))]
            Self::Fake(p) => p.mailbox_exchange_atomic(kind, request),
            #[cfg(test)]
            Self::Mock(p) => p.mailbox_exchange_atomic(kind, request),
        }
    }

    fn dispatch_on_cpu(&self, cpu: CpuId, work: RemoteWork) {
        match self {
            Self::Sim(p) => p.dispatch_on_cpu(cpu, work),
            #[cfg(any(test, feature = "test-util"))]
            Self::Fake(p) => p.dispatch_on_cpu(cpu, work),
            #[cfg(test)]
            Self::Mock(p) => p.dispatch_on_cpu(cpu, work),
        }
    }

    fn suspend_current_cpu(&self, state: PowerState) {
        match self {
            Self::Sim(p) => p.suspend_current_cpu(state),
            #[cfg(any(test, feature = "test-util"))]
            Self::Fake(p) => p.suspend_current_cpu(state),
            #[cfg(test)]
            Self::Mock(p) => p.suspend_current_cpu(state),
        }
    }

    fn pm_notify_enter(&self) {
        match self {
            Self::Sim(p) => p.pm_notify_enter(),
            #[cfg(any(test, feature = "test-util"))]
            Self::Fake(p) => p.pm_notify_enter(),
            #[cfg(test)]
            Self::Mock(p) => p.pm_notify_enter(),
        }
    }

    fn pm_notify_exit(&self) {
        match self {
            Self::Sim(p) => p.pm_notify_exit(),
            #[cfg(any(test, feature = "test-util"))]
            Self::Fake(p) => p.pm_notify_exit(),
            #[cfg(test)]
            Self::Mock(p) => p.pm_notify_exit(),
        }
    }

    fn interrupts_save(&self) -> InterruptState {
        match self {
            Self::Sim(p) => p.interrupts_save(),
            #[cfg(any(test, feature = "test-util"))]
            Self::Fake(p) => p.interrupts_save(),
            #[cfg(test)]
            Self::Mock(p) => p.interrupts_save(),
        }
    }

    fn interrupts_restore(&self, saved: InterruptState) {
        match self {
            Self::Sim(p) => p.interrupts_restore(saved),
            #[cfg(any(test, feature = "test-util"))]
            Self::Fake(p) => p.interrupts_restore(saved),
            #[cfg(test)]
            Self::Mock(p) => p.interrupts_restore(saved),
        }
    }

    fn preemption_disable(&self) {
        match self {
            Self::Sim(p) => p.preemption_disable(),
            #[cfg(any(test, feature = "test-util"))]
            Self::Fake(p) => p.preemption_disable(),
            #[cfg(test)]
            Self::Mock(p) => p.preemption_disable(),
        }
    }

    fn preemption_enable(&self) {
        match self {
            Self::Sim(p) => p.preemption_enable(),
            #[cfg(any(test, feature = "test-util"))]
            Self::Fake(p) => p.preemption_enable(),
            #[cfg(test)]
            Self::Mock(p) => p.preemption_enable(),
        }
    }
}

impl Debug for PlatformFacade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sim(inner) => inner.fmt(f),
            #[cfg(any(test, feature = "test-util"))]
            Self::Fake(inner) => inner.fmt(f),
            #[cfg(test)]
            Self::Mock(inner) => inner.fmt(f),
        }
    }
}
