//! Scoped wrappers for the platform's preemption and interrupt controls.
//!
//! The switch sequence must restore both controls on every exit path, including the early
//! return taken when the firmware exchange fails. Guards tie the restore to scope exit.

use crate::pal::{InterruptState, Platform, PlatformFacade};

/// Keeps preemption of the calling thread disabled for the guard's lifetime.
#[derive(Debug)]
pub(crate) struct PreemptionGuard<'a> {
    pal: &'a PlatformFacade,
}

impl<'a> PreemptionGuard<'a> {
    #[must_use]
    pub(crate) fn disable(pal: &'a PlatformFacade) -> Self {
        pal.preemption_disable();
        Self { pal }
    }
}

impl Drop for PreemptionGuard<'_> {
    fn drop(&mut self) {
        self.pal.preemption_enable();
    }
}

/// Keeps local interrupts on the calling CPU disabled for the guard's lifetime.
#[derive(Debug)]
pub(crate) struct InterruptGuard<'a> {
    pal: &'a PlatformFacade,
    saved: InterruptState,
}

impl<'a> InterruptGuard<'a> {
    #[must_use]
    pub(crate) fn disable(pal: &'a PlatformFacade) -> Self {
        let saved = pal.interrupts_save();
        Self { pal, saved }
    }
}

impl Drop for InterruptGuard<'_> {
    fn drop(&mut self) {
        self.pal.interrupts_restore(self.saved);
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use mockall::Sequence;

    use super::*;
    use crate::pal::MockPlatform;

    #[test]
    fn preemption_restored_on_drop() {
        let mut platform = MockPlatform::new();
        let mut seq = Sequence::new();

        platform
            .expect_preemption_disable()
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());
        platform
            .expect_preemption_enable()
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());

        let pal = PlatformFacade::from_mock(platform);

        drop(PreemptionGuard::disable(&pal));
    }

    #[test]
    fn preemption_restored_on_unwind() {
        let mut platform = MockPlatform::new();

        platform.expect_preemption_disable().times(1).return_const(());
        platform.expect_preemption_enable().times(1).return_const(());

        let pal = PlatformFacade::from_mock(platform);

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = PreemptionGuard::disable(&pal);
            panic!("mid-section failure");
        }));

        assert!(result.is_err());
    }

    #[test]
    fn interrupts_restored_with_saved_state() {
        let mut platform = MockPlatform::new();
        let mut seq = Sequence::new();

        platform
            .expect_interrupts_save()
            .times(1)
            .in_sequence(&mut seq)
            .return_const(InterruptState(7));
        platform
            .expect_interrupts_restore()
            .withf(|saved| *saved == InterruptState(7))
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());

        let pal = PlatformFacade::from_mock(platform);

        drop(InterruptGuard::disable(&pal));
    }
}
