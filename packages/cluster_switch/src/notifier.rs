use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tracing::error;

use crate::Cluster;

/// Which edge of a cluster switch an event describes.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[expect(
    clippy::exhaustive_enums,
    reason = "a switch has exactly these two observable edges"
)]
pub enum SwitchPhase {
    /// The switch is about to begin; the previous cluster is still current.
    Pre,

    /// The switch completed; the destination cluster is current.
    Post,
}

/// One cluster switch notification, constructed fresh per switch and passed by reference to
/// every registered observer.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SwitchEvent {
    phase: SwitchPhase,
    target: Cluster,
}

impl SwitchEvent {
    #[must_use]
    pub(crate) fn new(phase: SwitchPhase, target: Cluster) -> Self {
        Self { phase, target }
    }

    /// The edge this event describes.
    #[must_use]
    #[inline]
    pub fn phase(&self) -> SwitchPhase {
        self.phase
    }

    /// The destination cluster of the switch.
    #[must_use]
    #[inline]
    pub fn target(&self) -> Cluster {
        self.target
    }
}

/// Receives cluster switch notifications.
///
/// Observers are informed before and after every switch, synchronously, on the thread driving
/// the switch. They observe; they cannot veto. A panicking observer is logged and the
/// broadcast continues, so one misbehaving subsystem cannot affect the switch outcome or
/// starve later observers.
///
/// Both methods default to doing nothing, so an observer implements only the edges it cares
/// about.
pub trait SwitchObserver: Send + Sync {
    /// Called before the switch begins, while the previous cluster is still current.
    fn on_pre_switch(&self, event: &SwitchEvent) {
        let _ = event;
    }

    /// Called after the switch completed, with all CPUs resident in the destination cluster.
    fn on_post_switch(&self, event: &SwitchEvent) {
        let _ = event;
    }
}

/// Identifies one observer registration, for use with
/// [`unregister_observer()`][crate::ClusterSwitcher::unregister_observer].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[must_use]
pub struct ObserverToken(u64);

/// The ordered observer registry.
///
/// The registry has its own lock, independent of the switch serializer, so registering an
/// observer contends with an in-flight switch only for the duration of a list operation.
/// Broadcasting snapshots the list and invokes observers outside the lock, which also makes
/// it safe for an observer to register or unregister from inside its handler.
#[derive(Default)]
pub(crate) struct SwitchNotifier {
    observers: Mutex<Vec<(ObserverToken, Arc<dyn SwitchObserver>)>>,
    next_token: AtomicU64,
}

// Observers are arbitrary trait objects, so we report only how many are registered.
impl std::fmt::Debug for SwitchNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let observer_count = self
            .observers
            .lock()
            .map(|observers| observers.len())
            .unwrap_or_default();

        f.debug_struct("SwitchNotifier")
            .field("observer_count", &observer_count)
            .finish()
    }
}

impl SwitchNotifier {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Adds an observer at the end of the invocation order.
    pub(crate) fn register(&self, observer: Arc<dyn SwitchObserver>) -> ObserverToken {
        let token = ObserverToken(self.next_token.fetch_add(1, Ordering::Relaxed));

        self.observers
            .lock()
            .expect("observer registry should never be poisoned")
            .push((token, observer));

        token
    }

    /// Removes a previously registered observer. Returns whether the token was registered.
    pub(crate) fn unregister(&self, token: ObserverToken) -> bool {
        let mut observers = self
            .observers
            .lock()
            .expect("observer registry should never be poisoned");

        let before = observers.len();
        observers.retain(|(registered, _)| *registered != token);

        observers.len() != before
    }

    /// Invokes every currently registered observer's matching handler, in registration order.
    pub(crate) fn notify(&self, event: &SwitchEvent) {
        let snapshot: Vec<Arc<dyn SwitchObserver>> = self
            .observers
            .lock()
            .expect("observer registry should never be poisoned")
            .iter()
            .map(|(_, observer)| Arc::clone(observer))
            .collect();

        for observer in snapshot {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| match event.phase() {
                SwitchPhase::Pre => observer.on_pre_switch(event),
                SwitchPhase::Post => observer.on_post_switch(event),
            }));

            if outcome.is_err() {
                error!(
                    phase = ?event.phase(),
                    target = ?event.target(),
                    "switch observer panicked; continuing the broadcast"
                );
            }
        }
    }
}
