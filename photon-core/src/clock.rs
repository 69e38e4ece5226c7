//! Bus-clock change notification
//!
//! Subsystems whose timing depends on the peripheral (APB) clock register
//! here; the clock manager broadcasts immediately before and after every
//! frequency change so subscribers can rescale dividers and timers without
//! the clock manager knowing who they are.
//!
//! The registry is a fixed-capacity, insertion-ordered sequence behind a
//! critical-section mutex. Subscription identity is the (hook, token) pair:
//! the same hook may be registered once per token, and removal presents the
//! same pair again.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use heapless::Vec;

/// Maximum number of live clock-change subscriptions
pub const MAX_CLOCK_SUBSCRIBERS: usize = 8;

/// Phase of a bus-clock frequency change
///
/// Every change is announced twice: once with [`ClockPhase::BeforeChange`]
/// while the old frequency is still in effect, and once with
/// [`ClockPhase::AfterChange`] once the new frequency applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockPhase {
    /// The clock is about to change
    BeforeChange,
    /// The clock just changed
    AfterChange,
}

/// Subscriber hook invoked on each broadcast phase
///
/// Receives the token it was registered with plus the old and new bus
/// frequencies in Hz.
pub type ClockHook = fn(token: usize, phase: ClockPhase, old_hz: u32, new_hz: u32);

/// Errors from subscription management
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NotifyError {
    /// The (hook, token) pair is already registered
    Duplicate,
    /// The registry is at capacity
    RegistryFull,
    /// The (hook, token) pair was never registered
    ///
    /// Caller misuse, not a transient condition; retrying cannot succeed.
    NotFound,
}

#[derive(Clone, Copy)]
struct Subscription {
    hook: ClockHook,
    token: usize,
}

impl Subscription {
    fn matches(&self, token: usize, hook: ClockHook) -> bool {
        // Identity is the (hook address, token) pair
        self.token == token && self.hook as usize == hook as usize
    }
}

/// Registry of bus-clock change subscribers
///
/// `const`-constructible; boards keep a single instance in a `static` and
/// hand it to both the clock manager and the subscribing subsystems.
pub struct BusClockNotifier {
    subs: Mutex<CriticalSectionRawMutex, RefCell<Vec<Subscription, MAX_CLOCK_SUBSCRIBERS>>>,
}

impl Default for BusClockNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl BusClockNotifier {
    /// Create an empty registry
    pub const fn new() -> Self {
        Self {
            subs: Mutex::new(RefCell::new(Vec::new())),
        }
    }

    /// Register a (hook, token) pair
    ///
    /// The subscription is reachable for broadcast as soon as this returns.
    /// Fails without state change if the identical pair is already present
    /// or the registry is full.
    pub fn subscribe(&self, token: usize, hook: ClockHook) -> Result<(), NotifyError> {
        self.subs.lock(|subs| {
            let mut subs = subs.borrow_mut();
            if subs.iter().any(|s| s.matches(token, hook)) {
                #[cfg(feature = "defmt")]
                defmt::error!("duplicate clock subscription, token={}", token);
                return Err(NotifyError::Duplicate);
            }
            if subs.push(Subscription { hook, token }).is_err() {
                #[cfg(feature = "defmt")]
                defmt::error!("clock subscription registry full");
                return Err(NotifyError::RegistryFull);
            }
            Ok(())
        })
    }

    /// Remove a previously registered (hook, token) pair
    ///
    /// Later subscriptions keep their relative broadcast order.
    pub fn unsubscribe(&self, token: usize, hook: ClockHook) -> Result<(), NotifyError> {
        self.subs.lock(|subs| {
            let mut subs = subs.borrow_mut();
            match subs.iter().position(|s| s.matches(token, hook)) {
                Some(idx) => {
                    subs.remove(idx);
                    Ok(())
                }
                None => {
                    #[cfg(feature = "defmt")]
                    defmt::error!("clock subscription not found, token={}", token);
                    Err(NotifyError::NotFound)
                }
            }
        })
    }

    /// Invoke every subscriber once, in subscription order
    ///
    /// The registry is snapshotted under the lock and hooks run outside the
    /// critical section, so no subscriber added or removed mid-broadcast is
    /// half-visible, and a hook that touches the registry only affects the
    /// next broadcast.
    pub fn broadcast(&self, phase: ClockPhase, old_hz: u32, new_hz: u32) {
        let snapshot = self.subs.lock(|subs| subs.borrow().clone());
        for sub in &snapshot {
            (sub.hook)(sub.token, phase, old_hz, new_hz);
        }
    }

    /// Announce a frequency change around the closure that applies it
    ///
    /// Broadcasts [`ClockPhase::BeforeChange`], runs `apply`, then
    /// broadcasts [`ClockPhase::AfterChange`] - the exactly-twice protocol
    /// the clock manager owes its subscribers.
    pub fn notify_change(&self, old_hz: u32, new_hz: u32, apply: impl FnOnce()) {
        self.broadcast(ClockPhase::BeforeChange, old_hz, new_hz);
        apply();
        self.broadcast(ClockPhase::AfterChange, old_hz, new_hz);
    }

    /// Number of live subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.subs.lock(|subs| subs.borrow().len())
    }

    /// Check if the registry has no subscribers
    pub fn is_empty(&self) -> bool {
        self.subscriber_count() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::sync::atomic::{AtomicUsize, Ordering};
    use critical_section::Mutex as CsMutex;
    use proptest::prelude::*;
    use std::vec::Vec as StdVec;

    fn noop(_token: usize, _phase: ClockPhase, _old_hz: u32, _new_hz: u32) {}

    fn noop2(_token: usize, _phase: ClockPhase, _old_hz: u32, _new_hz: u32) {}

    #[test]
    fn test_duplicate_subscription_rejected() {
        let notifier = BusClockNotifier::new();
        assert_eq!(notifier.subscribe(7, noop), Ok(()));
        assert_eq!(notifier.subscribe(7, noop), Err(NotifyError::Duplicate));
        assert_eq!(notifier.subscriber_count(), 1);
    }

    #[test]
    fn test_same_hook_different_token_allowed() {
        let notifier = BusClockNotifier::new();
        assert_eq!(notifier.subscribe(1, noop), Ok(()));
        assert_eq!(notifier.subscribe(2, noop), Ok(()));
        assert_eq!(notifier.subscriber_count(), 2);
    }

    #[test]
    fn test_same_token_different_hook_allowed() {
        let notifier = BusClockNotifier::new();
        assert_eq!(notifier.subscribe(1, noop), Ok(()));
        assert_eq!(notifier.subscribe(1, noop2), Ok(()));
        assert_eq!(notifier.subscriber_count(), 2);
    }

    #[test]
    fn test_unsubscribe_unknown_pair_fails() {
        let notifier = BusClockNotifier::new();
        assert_eq!(notifier.unsubscribe(3, noop), Err(NotifyError::NotFound));

        notifier.subscribe(3, noop).unwrap();
        // Same hook, wrong token is not a match
        assert_eq!(notifier.unsubscribe(4, noop), Err(NotifyError::NotFound));
        assert_eq!(notifier.subscriber_count(), 1);
    }

    #[test]
    fn test_subscribe_unsubscribe_cycle() {
        let notifier = BusClockNotifier::new();
        assert_eq!(notifier.subscribe(9, noop), Ok(()));
        assert_eq!(notifier.subscribe(9, noop), Err(NotifyError::Duplicate));
        assert_eq!(notifier.unsubscribe(9, noop), Ok(()));
        assert_eq!(notifier.unsubscribe(9, noop), Err(NotifyError::NotFound));
        assert!(notifier.is_empty());
    }

    #[test]
    fn test_registry_full() {
        let notifier = BusClockNotifier::new();
        for token in 0..MAX_CLOCK_SUBSCRIBERS {
            assert_eq!(notifier.subscribe(token, noop), Ok(()));
        }
        assert_eq!(
            notifier.subscribe(MAX_CLOCK_SUBSCRIBERS, noop),
            Err(NotifyError::RegistryFull)
        );
        assert_eq!(notifier.subscriber_count(), MAX_CLOCK_SUBSCRIBERS);
    }

    static EMPTY_BROADCAST_CALLS: AtomicUsize = AtomicUsize::new(0);

    fn counting(_token: usize, _phase: ClockPhase, _old_hz: u32, _new_hz: u32) {
        EMPTY_BROADCAST_CALLS.fetch_add(1, Ordering::Relaxed);
    }

    #[test]
    fn test_broadcast_after_full_unsubscribe_invokes_nothing() {
        let notifier = BusClockNotifier::new();
        notifier.subscribe(1, counting).unwrap();
        notifier.subscribe(2, counting).unwrap();
        notifier.unsubscribe(1, counting).unwrap();
        notifier.unsubscribe(2, counting).unwrap();
        assert!(notifier.is_empty());

        notifier.broadcast(ClockPhase::BeforeChange, 80_000_000, 40_000_000);
        assert_eq!(EMPTY_BROADCAST_CALLS.load(Ordering::Relaxed), 0);
    }

    /// Marker for the apply closure in the ordering trace
    const APPLY_MARK: usize = usize::MAX;

    static TRACE: CsMutex<RefCell<StdVec<(usize, ClockPhase)>>> =
        CsMutex::new(RefCell::new(StdVec::new()));

    fn tracing(token: usize, phase: ClockPhase, old_hz: u32, new_hz: u32) {
        assert_eq!((old_hz, new_hz), (80_000_000, 160_000_000));
        critical_section::with(|cs| TRACE.borrow_ref_mut(cs).push((token, phase)));
    }

    #[test]
    fn test_notify_change_ordering() {
        let notifier = BusClockNotifier::new();
        notifier.subscribe(1, tracing).unwrap();
        notifier.subscribe(2, tracing).unwrap();

        notifier.notify_change(80_000_000, 160_000_000, || {
            critical_section::with(|cs| {
                TRACE
                    .borrow_ref_mut(cs)
                    .push((APPLY_MARK, ClockPhase::BeforeChange))
            });
        });

        let trace = critical_section::with(|cs| TRACE.borrow_ref_mut(cs).split_off(0));
        // Each subscriber exactly once per phase, insertion order, with the
        // before phase fully delivered ahead of the change itself.
        assert_eq!(
            trace,
            [
                (1, ClockPhase::BeforeChange),
                (2, ClockPhase::BeforeChange),
                (APPLY_MARK, ClockPhase::BeforeChange),
                (1, ClockPhase::AfterChange),
                (2, ClockPhase::AfterChange),
            ]
        );
    }

    proptest! {
        /// The registry tracks a model set over any subscribe/unsubscribe
        /// sequence.
        #[test]
        fn prop_registry_matches_model(ops in proptest::collection::vec(
            (any::<bool>(), 0usize..12), 0..64,
        )) {
            let notifier = BusClockNotifier::new();
            let mut model: StdVec<usize> = StdVec::new();

            for (add, token) in ops {
                if add {
                    let expect_ok = !model.contains(&token)
                        && model.len() < MAX_CLOCK_SUBSCRIBERS;
                    prop_assert_eq!(notifier.subscribe(token, noop).is_ok(), expect_ok);
                    if expect_ok {
                        model.push(token);
                    }
                } else {
                    let pos = model.iter().position(|&t| t == token);
                    prop_assert_eq!(notifier.unsubscribe(token, noop).is_ok(), pos.is_some());
                    if let Some(pos) = pos {
                        model.remove(pos);
                    }
                }
            }

            prop_assert_eq!(notifier.subscriber_count(), model.len());
        }
    }
}
