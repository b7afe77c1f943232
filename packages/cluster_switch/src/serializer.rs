use std::sync::Mutex;

/// The single global mutual-exclusion point for cluster switches.
///
/// At most one switch is in flight system-wide; a second caller sleeps here until the first
/// completes or fails. The lock is released on every exit path of the critical section,
/// including unwinding ones, through the guard. The switch controller never re-enters the
/// serializer from inside a held critical section.
#[derive(Debug, Default)]
pub(crate) struct SwitchSerializer {
    lock: Mutex<()>,
}

impl SwitchSerializer {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Runs `f` as the sole switch critical section, blocking until the serializer is free.
    pub(crate) fn with_lock<R>(&self, f: impl FnOnce() -> R) -> R {
        let _guard = self
            .lock
            .lock()
            .expect("switch serializer should never be poisoned");

        f()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    use super::*;

    #[test]
    fn returns_the_critical_section_value() {
        let serializer = SwitchSerializer::new();

        assert_eq!(serializer.with_lock(|| 42), 42);
    }

    #[test]
    fn critical_sections_never_overlap() {
        let serializer = Arc::new(SwitchSerializer::new());
        let inside = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let threads: Vec<_> = (0..4)
            .map(|_| {
                let serializer = Arc::clone(&serializer);
                let inside = Arc::clone(&inside);
                let peak = Arc::clone(&peak);

                thread::spawn(move || {
                    for _ in 0..16 {
                        serializer.with_lock(|| {
                            let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                            peak.fetch_max(now, Ordering::SeqCst);

                            thread::sleep(Duration::from_micros(50));

                            inside.fetch_sub(1, Ordering::SeqCst);
                        });
                    }
                })
            })
            .collect();

        for thread in threads {
            thread.join().unwrap();
        }

        assert_eq!(peak.load(Ordering::SeqCst), 1);
    }
}
