use std::any::type_name;
use std::sync::{Arc, OnceLock};

use tracing::{info, trace};

use crate::cluster_cell::ClusterCell;
use crate::error::Result;
use crate::firmware::FirmwareBridge;
use crate::notifier::{SwitchEvent, SwitchNotifier, SwitchPhase};
use crate::pal::{InterruptGuard, Platform, PlatformFacade, PreemptionGuard};
use crate::quiesce::QuiesceDispatcher;
use crate::serializer::SwitchSerializer;
use crate::{Cluster, ObserverToken, SwitchError, SwitchObserver, SwitchRequest, capability, transition};

#[cfg(any(test, feature = "test-util"))]
use crate::fake::FakeSoc;

/// The system-wide switcher singleton, initialized on first access.
static SYSTEM_SWITCHER: OnceLock<ClusterSwitcher> = OnceLock::new();

/// How a successful [`perform_switch()`][ClusterSwitcher::perform_switch] call concluded.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[expect(
    clippy::exhaustive_enums,
    reason = "callers should match every way a switch can succeed"
)]
pub enum SwitchOutcome {
    /// All logical CPUs migrated to the requested cluster.
    Completed,

    /// The requested cluster was already current; nothing happened.
    AlreadyResident,

    /// The request selected no destination cluster; nothing happened.
    NotRequested,
}

/// Coordinates migration of every logical CPU between the fast and slow clusters.
///
/// A switch is an atomic, firmware-mediated operation: the initiating CPU asks the power
/// management firmware which CPUs will be resident after the move, parks every other resident
/// CPU into retention, then retires itself into cluster-level retention, which is the trigger
/// the hardware uses to complete the physical handoff. The CPU resumes in the destination
/// cluster and the switch is reported to registered observers.
///
/// A `ClusterSwitcher` can represent the running system (via
/// [`ClusterSwitcher::system()`]) or a simulated SoC for testing (via
/// [`ClusterSwitcher::fake()`] when the `test-util` feature is enabled). Clones are cheap and
/// equivalent.
///
/// Switching policy is the caller's concern; this type only executes requests.
///
/// # Example
///
/// ```
/// use cluster_switch::{Cluster, ClusterSwitcher, SwitchRequest};
///
/// let switcher = ClusterSwitcher::system();
///
/// if switcher.is_slow_cluster_supported() {
///     switcher
///         .perform_switch(SwitchRequest::slow())
///         .expect("firmware refused the switch");
///
///     assert_eq!(switcher.current_cluster(), Cluster::Slow);
/// }
/// ```
#[derive(Clone)]
pub struct ClusterSwitcher {
    inner: Arc<SwitcherInner>,
}

/// Internal state of a `ClusterSwitcher` instance.
#[derive(Debug)]
struct SwitcherInner {
    /// The platform abstraction layer implementation.
    pal: PlatformFacade,

    /// Whether the slow cluster is usable on this part. Probed once at construction; fuses
    /// never change while the process runs.
    slow_cluster_enabled: bool,

    /// Which cluster currently hosts all logical CPUs.
    current: Arc<ClusterCell>,

    serializer: SwitchSerializer,
    notifier: SwitchNotifier,
    firmware: FirmwareBridge,
    quiesce: QuiesceDispatcher,
}

impl ClusterSwitcher {
    /// Returns a handle to the switcher for the system this process runs on.
    ///
    /// The instance is initialized on first access, which is when the slow cluster capability
    /// fuse is sampled. All clones are equivalent.
    ///
    /// # Example
    ///
    /// ```
    /// use cluster_switch::ClusterSwitcher;
    ///
    /// let switcher = ClusterSwitcher::system();
    ///
    /// println!(
    ///     "current cluster: {:?}, slow cluster usable: {}",
    ///     switcher.current_cluster(),
    ///     switcher.is_slow_cluster_supported()
    /// );
    /// ```
    #[must_use]
    pub fn system() -> &'static Self {
        SYSTEM_SWITCHER.get_or_init(|| {
            let switcher = Self::from_platform(PlatformFacade::target());

            info!(
                slow_cluster_enabled = switcher.inner.slow_cluster_enabled,
                "cluster switch core initialized"
            );

            switcher
        })
    }

    /// Creates a switcher driving a fake SoC.
    ///
    /// Only available when the `test-util` feature is enabled. Each call creates an
    /// independent instance with its own current cluster and observer registry; the fake
    /// handle keeps recording what the instance asks the hardware to do.
    #[cfg(any(test, feature = "test-util"))]
    #[must_use]
    pub fn fake(soc: &FakeSoc) -> Self {
        Self::from_platform(PlatformFacade::from_fake(soc.platform()))
    }

    fn from_platform(pal: PlatformFacade) -> Self {
        let slow_cluster_enabled = capability::probe_slow_cluster_support(&pal);
        let current = Arc::new(ClusterCell::new(pal.boot_cluster()));

        Self {
            inner: Arc::new(SwitcherInner {
                slow_cluster_enabled,
                firmware: FirmwareBridge::new(pal.clone()),
                quiesce: QuiesceDispatcher::new(pal.clone(), Arc::clone(&current)),
                serializer: SwitchSerializer::new(),
                notifier: SwitchNotifier::new(),
                current,
                pal,
            }),
        }
    }

    /// Migrates all logical CPUs to the cluster selected by the request.
    ///
    /// Blocks while another switch is in flight; at most one switch runs system-wide. A
    /// request that selects no destination, or selects the cluster that is already current,
    /// succeeds without doing anything. Once a switch proceeds past those checks it runs to
    /// completion or to a firmware communication failure; there is no way to abort it.
    ///
    /// # Errors
    ///
    /// - [`SwitchError::SlowClusterUnavailable`] when the slow cluster is requested on a part
    ///   whose fuses disable it. Nothing happens.
    /// - [`SwitchError::FirmwareFault`] when the firmware exchange does not complete. The
    ///   switch is abandoned before any CPU moves and the current cluster is unchanged, so
    ///   the caller may simply retry.
    ///
    /// # Panics
    ///
    /// Panics if the process observes itself on the slow cluster while the fuses report that
    /// cluster disabled. Hardware and software state have diverged and no further decision of
    /// this type can be trusted.
    ///
    /// # Example
    ///
    /// ```
    /// use cluster_switch::{Cluster, ClusterSwitcher, SwitchOutcome, SwitchRequest};
    ///
    /// let switcher = ClusterSwitcher::system();
    ///
    /// // Asking for the cluster we are already on is a quiet success.
    /// let outcome = switcher
    ///     .perform_switch(SwitchRequest::fast())
    ///     .expect("switching to the current cluster cannot fail");
    ///
    /// assert_eq!(outcome, SwitchOutcome::AlreadyResident);
    /// ```
    pub fn perform_switch(&self, request: SwitchRequest) -> Result<SwitchOutcome> {
        let Some(target) = request.target() else {
            return Ok(SwitchOutcome::NotRequested);
        };

        if target == Cluster::Slow && !self.inner.slow_cluster_enabled {
            return Err(SwitchError::SlowClusterUnavailable);
        }

        let current = self.inner.current.load();

        assert!(
            !(current == Cluster::Slow && !self.inner.slow_cluster_enabled),
            "executing on the slow cluster while the fuses report it disabled; \
             hardware and software cluster state have diverged"
        );

        if target == current {
            return Ok(SwitchOutcome::AlreadyResident);
        }

        self.inner
            .serializer
            .with_lock(|| self.switch_locked(target, &request))
    }

    /// The switch critical section. Runs with the serializer held.
    fn switch_locked(&self, target: Cluster, request: &SwitchRequest) -> Result<SwitchOutcome> {
        let inner = &self.inner;

        // A caller that slept on the serializer may find its destination already reached by
        // the switch it waited for.
        let current = inner.current.load();
        if target == current {
            return Ok(SwitchOutcome::AlreadyResident);
        }

        trace!(
            ?current,
            ?target,
            residency_hint = ?request.residency_hint(),
            "cluster switch start"
        );

        inner
            .notifier
            .notify(&SwitchEvent::new(SwitchPhase::Pre, target));

        {
            let _preemption = PreemptionGuard::disable(&inner.pal);

            let initiating_cpu = inner.pal.current_cpu();
            let initiating_physical_cpu = inner.pal.physical_cpu_id(initiating_cpu);

            // A failure here propagates without quiesce, transition or post-notify. The
            // guards restore preemption on the way out and the current cluster is untouched.
            let response = inner.firmware.request_switch(initiating_physical_cpu)?;

            inner
                .quiesce
                .park_remote_cores(&response, initiating_cpu, target);

            {
                let _interrupts = InterruptGuard::disable(&inner.pal);
                transition::shutdown_current_cluster(&inner.pal);
            }

            // This CPU resumed in the destination cluster; record the handoff while the
            // serializer is still held.
            inner.current.store(target);
        }

        inner
            .notifier
            .notify(&SwitchEvent::new(SwitchPhase::Post, target));

        trace!(?target, "cluster switch done");

        Ok(SwitchOutcome::Completed)
    }

    /// The cluster currently hosting all logical CPUs.
    ///
    /// Outside a switch critical section this is a best-effort snapshot: a concurrent switch
    /// may change the answer at any time. Use observers, not polling, to coordinate with
    /// switches.
    #[must_use]
    #[inline]
    pub fn current_cluster(&self) -> Cluster {
        self.inner.current.load()
    }

    /// Whether the slow cluster is usable on this part.
    ///
    /// Sampled from fuses once at initialization; the answer never changes while the process
    /// runs. Exposed read-only for operator inspection.
    #[must_use]
    #[inline]
    pub fn is_slow_cluster_supported(&self) -> bool {
        self.inner.slow_cluster_enabled
    }

    /// Adds an observer informed before and after every switch, after all current observers.
    ///
    /// # Example
    ///
    /// ```
    /// use std::sync::Arc;
    /// use std::sync::atomic::{AtomicUsize, Ordering};
    ///
    /// use cluster_switch::{ClusterSwitcher, SwitchEvent, SwitchObserver};
    ///
    /// #[derive(Default)]
    /// struct SwitchCounter(AtomicUsize);
    ///
    /// impl SwitchObserver for SwitchCounter {
    ///     fn on_post_switch(&self, _event: &SwitchEvent) {
    ///         self.0.fetch_add(1, Ordering::Relaxed);
    ///     }
    /// }
    ///
    /// let switcher = ClusterSwitcher::system();
    ///
    /// let counter = Arc::new(SwitchCounter::default());
    /// let token = switcher.register_observer(counter.clone());
    ///
    /// // ... later ...
    ///
    /// assert!(switcher.unregister_observer(token));
    /// ```
    #[cfg_attr(test, mutants::skip)] // Trivial forwarder, tested via the notifier.
    pub fn register_observer(&self, observer: Arc<dyn SwitchObserver>) -> ObserverToken {
        self.inner.notifier.register(observer)
    }

    /// Removes a previously registered observer. Returns whether the token was registered.
    #[cfg_attr(test, mutants::skip)] // Trivial forwarder, tested via the notifier.
    pub fn unregister_observer(&self, token: ObserverToken) -> bool {
        self.inner.notifier.unregister(token)
    }
}

// We have no API contract for the Debug output format.
#[cfg_attr(coverage_nightly, coverage(off))]
impl std::fmt::Debug for ClusterSwitcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(type_name::<Self>())
            .field("current_cluster", &self.inner.current.load())
            .field("slow_cluster_enabled", &self.inner.slow_cluster_enabled)
            .finish()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    use mockall::Sequence;
    use mockall::predicate::eq;
    use new_zealand::nz;
    use static_assertions::assert_impl_all;

    use super::*;
    use crate::fake::SocBuilder;
    use crate::pal::{InterruptState, MockPlatform};
    use crate::power_state::PowerState;
    use crate::{CpuMask, SwitchFlags};

    assert_impl_all!(ClusterSwitcher: Send, Sync, Clone);

    /// Records every event delivered to it.
    #[derive(Debug, Default)]
    struct Recorder {
        events: Mutex<Vec<(SwitchPhase, Cluster)>>,
    }

    impl Recorder {
        fn events(&self) -> Vec<(SwitchPhase, Cluster)> {
            self.events.lock().unwrap().clone()
        }
    }

    impl SwitchObserver for Recorder {
        fn on_pre_switch(&self, event: &SwitchEvent) {
            self.events
                .lock()
                .unwrap()
                .push((SwitchPhase::Pre, event.target()));
        }

        fn on_post_switch(&self, event: &SwitchEvent) {
            self.events
                .lock()
                .unwrap()
                .push((SwitchPhase::Post, event.target()));
        }
    }

    #[test]
    fn system_is_singleton() {
        let first = ClusterSwitcher::system();
        let second = ClusterSwitcher::system();

        assert!(Arc::ptr_eq(&first.inner, &second.inner));
    }

    #[test]
    fn completed_switch_lands_on_target_and_notifies_once() {
        let soc = FakeSoc::default();
        let switcher = ClusterSwitcher::fake(&soc);
        let recorder = Arc::new(Recorder::default());

        _ = switcher.register_observer(recorder.clone());

        assert_eq!(switcher.current_cluster(), Cluster::Fast);

        let outcome = switcher.perform_switch(SwitchRequest::slow()).unwrap();

        assert_eq!(outcome, SwitchOutcome::Completed);
        assert_eq!(switcher.current_cluster(), Cluster::Slow);
        assert_eq!(
            recorder.events(),
            vec![
                (SwitchPhase::Pre, Cluster::Slow),
                (SwitchPhase::Post, Cluster::Slow)
            ]
        );
        assert_eq!(soc.firmware_exchanges(), 1);
        assert_eq!(soc.cluster_transitions(), 1);
    }

    #[test]
    fn quiesce_set_excludes_the_initiating_cpu() {
        let soc = FakeSoc::default();
        let switcher = ClusterSwitcher::fake(&soc);

        switcher.perform_switch(SwitchRequest::slow()).unwrap();

        soc.settle();

        assert_eq!(soc.quiesced_cpus(), vec![1, 2, 3]);

        let mut parked = soc.parked_cpus();
        parked.sort_unstable();
        assert_eq!(parked, vec![1, 2, 3]);
    }

    #[test]
    fn quiesce_set_follows_the_caller_cpu() {
        let soc = FakeSoc::new(SocBuilder::new().caller_cpu(2));
        let switcher = ClusterSwitcher::fake(&soc);

        switcher.perform_switch(SwitchRequest::slow()).unwrap();

        soc.settle();

        assert_eq!(soc.quiesced_cpus(), vec![0, 1, 3]);
    }

    #[test]
    fn quiesce_set_follows_the_scripted_resident_mask() {
        let soc = FakeSoc::new(
            SocBuilder::new().firmware_resident_mask(CpuMask::from_bits(0b0011)),
        );
        let switcher = ClusterSwitcher::fake(&soc);

        switcher.perform_switch(SwitchRequest::slow()).unwrap();

        soc.settle();

        assert_eq!(soc.quiesced_cpus(), vec![1]);
    }

    #[test]
    fn switch_to_current_cluster_is_a_quiet_success() {
        let soc = FakeSoc::default();
        let switcher = ClusterSwitcher::fake(&soc);
        let recorder = Arc::new(Recorder::default());

        _ = switcher.register_observer(recorder.clone());

        let outcome = switcher.perform_switch(SwitchRequest::fast()).unwrap();

        assert_eq!(outcome, SwitchOutcome::AlreadyResident);
        assert_eq!(switcher.current_cluster(), Cluster::Fast);
        assert!(recorder.events().is_empty());
        assert_eq!(soc.firmware_exchanges(), 0);
    }

    #[test]
    fn request_without_destination_is_a_quiet_success() {
        let soc = FakeSoc::default();
        let switcher = ClusterSwitcher::fake(&soc);
        let recorder = Arc::new(Recorder::default());

        _ = switcher.register_observer(recorder.clone());

        let none = SwitchRequest::new(SwitchFlags::empty());
        let both = SwitchRequest::new(
            SwitchFlags::REQUEST_FAST_CLUSTER | SwitchFlags::REQUEST_SLOW_CLUSTER,
        );

        assert_eq!(
            switcher.perform_switch(none).unwrap(),
            SwitchOutcome::NotRequested
        );
        assert_eq!(
            switcher.perform_switch(both).unwrap(),
            SwitchOutcome::NotRequested
        );

        assert!(recorder.events().is_empty());
        assert_eq!(soc.firmware_exchanges(), 0);
    }

    #[test]
    fn slow_request_on_restricted_part_is_rejected() {
        let soc = FakeSoc::new(SocBuilder::new().blow_slow_cluster_fuse());
        let switcher = ClusterSwitcher::fake(&soc);
        let recorder = Arc::new(Recorder::default());

        _ = switcher.register_observer(recorder.clone());

        assert!(!switcher.is_slow_cluster_supported());

        let result = switcher.perform_switch(SwitchRequest::slow());

        assert!(matches!(result, Err(SwitchError::SlowClusterUnavailable)));
        assert_eq!(switcher.current_cluster(), Cluster::Fast);
        assert!(recorder.events().is_empty());
        assert_eq!(soc.firmware_exchanges(), 0);
    }

    #[test]
    fn firmware_fault_rolls_back_without_post_notify() {
        let soc = FakeSoc::new(SocBuilder::new().fail_firmware_exchange());
        let switcher = ClusterSwitcher::fake(&soc);
        let recorder = Arc::new(Recorder::default());

        _ = switcher.register_observer(recorder.clone());

        let result = switcher.perform_switch(SwitchRequest::slow());

        assert!(matches!(result, Err(SwitchError::FirmwareFault)));
        assert_eq!(switcher.current_cluster(), Cluster::Fast);

        // The switch had begun, so the pre-event fired, but nothing after the failure point.
        assert_eq!(recorder.events(), vec![(SwitchPhase::Pre, Cluster::Slow)]);
        assert!(soc.quiesced_cpus().is_empty());
        assert_eq!(soc.cluster_transitions(), 0);

        // The rollback leaves the switcher usable; a retry against healthy firmware works.
        let retry = switcher.perform_switch(SwitchRequest::fast()).unwrap();
        assert_eq!(retry, SwitchOutcome::AlreadyResident);
    }

    #[test]
    #[should_panic(expected = "diverged")]
    fn divergent_cluster_state_is_fatal() {
        let soc = FakeSoc::new(
            SocBuilder::new()
                .blow_slow_cluster_fuse()
                .boot_cluster(Cluster::Slow),
        );
        let switcher = ClusterSwitcher::fake(&soc);

        // Requesting the fast cluster trips the consistency assert: we observe ourselves on
        // a cluster the fuses say cannot be running.
        drop(switcher.perform_switch(SwitchRequest::fast()));
    }

    #[test]
    fn round_trip_returns_to_the_fast_cluster() {
        let soc = FakeSoc::default();
        let switcher = ClusterSwitcher::fake(&soc);
        let recorder = Arc::new(Recorder::default());

        _ = switcher.register_observer(recorder.clone());

        switcher.perform_switch(SwitchRequest::slow()).unwrap();
        switcher.perform_switch(SwitchRequest::fast()).unwrap();

        assert_eq!(switcher.current_cluster(), Cluster::Fast);
        assert_eq!(soc.cluster_transitions(), 2);
        assert_eq!(
            recorder.events(),
            vec![
                (SwitchPhase::Pre, Cluster::Slow),
                (SwitchPhase::Post, Cluster::Slow),
                (SwitchPhase::Pre, Cluster::Fast),
                (SwitchPhase::Post, Cluster::Fast)
            ]
        );
    }

    #[test]
    fn smaller_part_switches_with_fewer_cpus() {
        let soc = FakeSoc::new(SocBuilder::new().cpu_count(nz!(2)));
        let switcher = ClusterSwitcher::fake(&soc);

        switcher.perform_switch(SwitchRequest::slow()).unwrap();

        soc.settle();

        assert_eq!(soc.quiesced_cpus(), vec![1]);
        assert_eq!(soc.cluster_transitions(), 1);
    }

    #[test]
    fn unregistered_observer_stops_receiving_switches() {
        let soc = FakeSoc::default();
        let switcher = ClusterSwitcher::fake(&soc);
        let recorder = Arc::new(Recorder::default());

        let token = switcher.register_observer(recorder.clone());

        switcher.perform_switch(SwitchRequest::slow()).unwrap();

        assert!(switcher.unregister_observer(token));
        assert!(!switcher.unregister_observer(token));

        switcher.perform_switch(SwitchRequest::fast()).unwrap();

        assert_eq!(recorder.events().len(), 2);
    }

    #[test]
    fn concurrent_switches_serialize() {
        /// Tracks how many switches are between their pre and post events at once.
        #[derive(Debug, Default)]
        struct ReentrancyGauge {
            inside: AtomicUsize,
            peak: AtomicUsize,
        }

        impl SwitchObserver for ReentrancyGauge {
            fn on_pre_switch(&self, _event: &SwitchEvent) {
                let now = self.inside.fetch_add(1, Ordering::SeqCst) + 1;
                self.peak.fetch_max(now, Ordering::SeqCst);
            }

            fn on_post_switch(&self, _event: &SwitchEvent) {
                self.inside.fetch_sub(1, Ordering::SeqCst);
            }
        }

        let soc = FakeSoc::default();
        let switcher = ClusterSwitcher::fake(&soc);
        let gauge = Arc::new(ReentrancyGauge::default());

        _ = switcher.register_observer(gauge.clone());

        let threads: Vec<_> = (0..4)
            .map(|_| {
                let switcher = switcher.clone();

                thread::spawn(move || {
                    for round in 0..8 {
                        let request = if round % 2 == 0 {
                            SwitchRequest::slow()
                        } else {
                            SwitchRequest::fast()
                        };

                        switcher.perform_switch(request).unwrap();
                    }
                })
            })
            .collect();

        for thread in threads {
            thread.join().unwrap();
        }

        soc.settle();

        assert_eq!(gauge.peak.load(Ordering::SeqCst), 1);
        assert_eq!(gauge.inside.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn switch_sequence_reaches_the_hardware_in_order() {
        let mut platform = MockPlatform::new();
        let mut seq = Sequence::new();

        // Construction: capability probe and boot cluster snapshot.
        platform.expect_read_fuse().times(1).return_const(0_u32);
        platform
            .expect_boot_cluster()
            .times(1)
            .return_const(Cluster::Fast);

        platform
            .expect_preemption_disable()
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());
        platform
            .expect_current_cpu()
            .times(1)
            .in_sequence(&mut seq)
            .return_const(0_u32);
        platform
            .expect_physical_cpu_id()
            .with(eq(0_u32))
            .times(1)
            .in_sequence(&mut seq)
            .return_const(7_u32);
        platform
            .expect_mailbox_exchange_atomic()
            .withf(|_, request| *request == 7_u32.to_le_bytes())
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(0b0111_u32.to_le_bytes()));
        platform
            .expect_dispatch_on_cpu_core()
            .with(eq(1_u32))
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());
        platform
            .expect_dispatch_on_cpu_core()
            .with(eq(2_u32))
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());
        platform
            .expect_interrupts_save()
            .times(1)
            .in_sequence(&mut seq)
            .return_const(InterruptState(0));
        platform
            .expect_pm_notify_enter()
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());
        platform
            .expect_suspend_current_cpu()
            .with(eq(PowerState::CLUSTER_RETENTION))
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());
        platform
            .expect_pm_notify_exit()
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());
        platform
            .expect_interrupts_restore()
            .with(eq(InterruptState(0)))
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());
        platform
            .expect_preemption_enable()
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());

        let switcher = ClusterSwitcher::from_platform(PlatformFacade::from_mock(platform));

        let outcome = switcher.perform_switch(SwitchRequest::slow()).unwrap();

        assert_eq!(outcome, SwitchOutcome::Completed);
        assert_eq!(switcher.current_cluster(), Cluster::Slow);
    }

    #[test]
    fn firmware_fault_still_restores_preemption() {
        let mut platform = MockPlatform::new();

        platform.expect_read_fuse().return_const(0_u32);
        platform.expect_boot_cluster().return_const(Cluster::Fast);
        platform.expect_current_cpu().return_const(0_u32);
        platform.expect_physical_cpu_id().return_const(0_u32);
        platform
            .expect_mailbox_exchange_atomic()
            .returning(|_, _| Err(crate::pal::ExchangeError));

        platform.expect_preemption_disable().times(1).return_const(());
        platform.expect_preemption_enable().times(1).return_const(());

        let switcher = ClusterSwitcher::from_platform(PlatformFacade::from_mock(platform));

        let result = switcher.perform_switch(SwitchRequest::slow());

        assert!(matches!(result, Err(SwitchError::FirmwareFault)));
        assert_eq!(switcher.current_cluster(), Cluster::Fast);
    }

    #[test]
    fn debug_names_the_type() {
        let soc = FakeSoc::default();
        let switcher = ClusterSwitcher::fake(&soc);

        let output = format!("{switcher:?}");

        assert!(output.contains("ClusterSwitcher"));
    }
}
