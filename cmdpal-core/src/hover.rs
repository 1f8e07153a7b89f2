//! Hover-intent disclosure for tree-shaped menus.
//!
//! Converts raw pointer enter/leave on menu triggers into debounced
//! open/close transitions so a panel does not flicker while the pointer
//! crosses sibling triggers on its way somewhere else.
//!
//! Timers are owned handles stored per trigger, not callbacks. The host loop
//! asks for [`HoverIntent::next_deadline`] to size its poll timeout and calls
//! [`HoverIntent::poll`] to fire whatever has elapsed. Dropping the manager
//! (or calling [`HoverIntent::teardown`]) discards every armed handle, so a
//! timer can never fire against torn-down state.
//!
//! At most one trigger is open per nesting level. Opening a trigger closes
//! whichever sibling was open at that level, along with its open descendants.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::time::{Duration, Instant};

use tracing::trace;

use crate::clock::{Clock, WallClock};

/// Close debounce used when none is configured
pub const DEFAULT_CLOSE_DELAY: Duration = Duration::from_millis(150);

/// Delays applied to pointer transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoverConfig {
    /// Delay between pointer-enter and open; zero opens synchronously
    pub open_delay: Duration,
    /// Delay between pointer-leave and close
    pub close_delay: Duration,
}

impl Default for HoverConfig {
    fn default() -> Self {
        Self {
            open_delay: Duration::ZERO,
            close_delay: DEFAULT_CLOSE_DELAY,
        }
    }
}

/// A single armed deferred transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerHandle {
    id: u64,
    deadline: Instant,
}

impl TimerHandle {
    /// When the timer fires
    pub fn deadline(&self) -> Instant {
        self.deadline
    }
}

/// A completed disclosure transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disclosure<K> {
    Opened(K),
    Closed(K),
}

#[derive(Debug)]
struct Entry<K> {
    parent: Option<K>,
    pending_open: Option<TimerHandle>,
    pending_close: Option<TimerHandle>,
}

impl<K> Entry<K> {
    fn new(parent: Option<K>) -> Self {
        Self {
            parent,
            pending_open: None,
            pending_close: None,
        }
    }

    fn cancel(&mut self) -> bool {
        let had = self.pending_open.is_some() || self.pending_close.is_some();
        self.pending_open = None;
        self.pending_close = None;
        had
    }
}

/// Hover-intent state for one menu tree.
pub struct HoverIntent<K, C = WallClock>
where
    K: Clone + Eq + Hash + fmt::Debug,
    C: Clock,
{
    clock: C,
    config: HoverConfig,
    entries: HashMap<K, Entry<K>>,
    /// Open trigger per level, keyed by the level's parent trigger
    open: HashMap<Option<K>, K>,
    next_id: u64,
}

impl<K> HoverIntent<K, WallClock>
where
    K: Clone + Eq + Hash + fmt::Debug,
{
    /// Manager on the wall clock
    pub fn new(config: HoverConfig) -> Self {
        Self::with_clock(config, WallClock)
    }
}

impl<K, C> HoverIntent<K, C>
where
    K: Clone + Eq + Hash + fmt::Debug,
    C: Clock,
{
    /// Manager on a custom time source
    pub fn with_clock(config: HoverConfig, clock: C) -> Self {
        Self {
            clock,
            config,
            entries: HashMap::new(),
            open: HashMap::new(),
            next_id: 0,
        }
    }

    /// Active delays
    pub fn config(&self) -> HoverConfig {
        self.config
    }

    fn arm(&mut self, delay: Duration) -> TimerHandle {
        self.next_id += 1;
        TimerHandle {
            id: self.next_id,
            deadline: self.clock.now() + delay,
        }
    }

    /// Pointer entered `key`, a trigger whose panel sits under `parent`.
    ///
    /// Pending closes on the trigger, its siblings and its ancestors are
    /// cancelled first; the trigger then opens (immediately unless an open
    /// delay is configured).
    pub fn pointer_enter(&mut self, key: K, parent: Option<K>) -> Vec<Disclosure<K>> {
        match self.entries.get_mut(&key) {
            Some(entry) => entry.parent = parent.clone(),
            None => {
                self.entries.insert(key.clone(), Entry::new(parent.clone()));
            }
        }

        self.cancel_related_closes(&key, &parent);

        if self.is_open(&key) {
            return Vec::new();
        }

        if self.config.open_delay.is_zero() {
            return self.open_now(&key);
        }

        let already_armed = self
            .entries
            .get(&key)
            .is_some_and(|entry| entry.pending_open.is_some());
        if !already_armed {
            let handle = self.arm(self.config.open_delay);
            if let Some(entry) = self.entries.get_mut(&key) {
                entry.pending_open = Some(handle);
            }
            trace!(?key, "hover open armed");
        }
        Vec::new()
    }

    /// Pointer left `key`. An open trigger arms its close timer; a trigger
    /// still waiting to open is abandoned.
    ///
    /// Open ancestors arm their close timers too, since entering `key`
    /// cancelled them. Entering an ancestor or a sibling cancels them again.
    pub fn pointer_leave(&mut self, key: &K) {
        let parent = self.entries.get(key).and_then(|entry| entry.parent.clone());

        if self.is_open(key) {
            let handle = self.arm(self.config.close_delay);
            if let Some(entry) = self.entries.get_mut(key) {
                entry.pending_open = None;
                entry.pending_close = Some(handle);
                trace!(?key, delay_ms = self.config.close_delay.as_millis() as u64, "hover close armed");
            }
        } else if let Some(entry) = self.entries.remove(key) {
            if entry.pending_open.is_some() {
                trace!(?key, "hover open abandoned");
            }
        }

        self.arm_ancestor_closes(parent);
    }

    fn arm_ancestor_closes(&mut self, mut ancestor: Option<K>) {
        while let Some(current) = ancestor {
            if !self.is_open(&current) {
                break;
            }
            let handle = self.arm(self.config.close_delay);
            let Some(entry) = self.entries.get_mut(&current) else {
                break;
            };
            if entry.pending_close.is_none() {
                entry.pending_close = Some(handle);
                trace!(key = ?current, "hover close armed on ancestor");
            }
            ancestor = entry.parent.clone();
        }
    }

    fn cancel_related_closes(&mut self, key: &K, parent: &Option<K>) {
        let mut related: Vec<K> = self
            .entries
            .iter()
            .filter(|(k, entry)| *k == key || entry.parent == *parent)
            .map(|(k, _)| k.clone())
            .collect();

        let mut ancestor = parent.clone();
        while let Some(current) = ancestor {
            ancestor = self.entries.get(&current).and_then(|e| e.parent.clone());
            related.push(current);
        }

        for k in related {
            if let Some(entry) = self.entries.get_mut(&k) {
                if entry.pending_close.take().is_some() {
                    trace!(key = ?k, "hover close cancelled");
                }
            }
        }
    }

    fn open_now(&mut self, key: &K) -> Vec<Disclosure<K>> {
        let mut events = Vec::new();
        let parent = match self.entries.get_mut(key) {
            Some(entry) => {
                entry.cancel();
                entry.parent.clone()
            }
            None => return events,
        };

        if let Some(previous) = self.open.get(&parent).cloned() {
            if previous != *key {
                self.close_now(&previous, &mut events);
            }
        }

        self.open.insert(parent, key.clone());
        trace!(?key, "hover opened");
        events.push(Disclosure::Opened(key.clone()));
        events
    }

    fn close_now(&mut self, key: &K, events: &mut Vec<Disclosure<K>>) {
        if let Some(child) = self.open.get(&Some(key.clone())).cloned() {
            self.close_now(&child, events);
        }

        let parent = self.entries.remove(key).and_then(|entry| entry.parent);
        let was_open = self.open.get(&parent) == Some(key);
        if was_open {
            self.open.remove(&parent);
            trace!(?key, "hover closed");
            events.push(Disclosure::Closed(key.clone()));
        }
    }

    /// Fire every timer whose deadline has passed, in deadline order
    pub fn poll(&mut self) -> Vec<Disclosure<K>> {
        let now = self.clock.now();
        let mut due: Vec<(TimerHandle, K, bool)> = Vec::new();

        for (key, entry) in &self.entries {
            if let Some(handle) = entry.pending_open {
                if handle.deadline <= now {
                    due.push((handle, key.clone(), true));
                }
            }
            if let Some(handle) = entry.pending_close {
                if handle.deadline <= now {
                    due.push((handle, key.clone(), false));
                }
            }
        }
        due.sort_by_key(|(handle, _, _)| (handle.deadline, handle.id));

        let mut events = Vec::new();
        for (handle, key, is_open_timer) in due {
            // An earlier firing in this batch may have replaced or dropped it
            let still_armed = self.entries.get(&key).is_some_and(|entry| {
                if is_open_timer {
                    entry.pending_open == Some(handle)
                } else {
                    entry.pending_close == Some(handle)
                }
            });
            if !still_armed {
                continue;
            }

            if is_open_timer {
                events.extend(self.open_now(&key));
            } else {
                self.close_now(&key, &mut events);
            }
        }
        events
    }

    /// Earliest armed deadline, if any
    pub fn next_deadline(&self) -> Option<Instant> {
        self.entries
            .values()
            .flat_map(|entry| [entry.pending_open, entry.pending_close])
            .flatten()
            .map(|handle| handle.deadline)
            .min()
    }

    /// Cancel any timer armed for `key`. Safe to call repeatedly.
    pub fn cancel(&mut self, key: &K) {
        if let Some(entry) = self.entries.get_mut(key) {
            if entry.cancel() {
                trace!(?key, "hover timers cancelled");
            }
        }
    }

    /// Close `key` (and its open descendants) right away
    pub fn close(&mut self, key: &K) -> Vec<Disclosure<K>> {
        let mut events = Vec::new();
        self.close_now(key, &mut events);
        events
    }

    /// Close every open trigger right away
    pub fn close_all(&mut self) -> Vec<Disclosure<K>> {
        let mut events = Vec::new();
        let roots: Vec<K> = self
            .open
            .iter()
            .filter(|(parent, _)| parent.is_none())
            .map(|(_, key)| key.clone())
            .collect();
        for key in roots {
            self.close_now(&key, &mut events);
        }
        events
    }

    /// Discard all state and every armed handle without emitting transitions
    pub fn teardown(&mut self) {
        let armed = self.armed_count();
        self.entries.clear();
        self.open.clear();
        if armed > 0 {
            trace!(armed, "hover timers dropped on teardown");
        }
    }

    /// Whether `key` is currently open
    pub fn is_open(&self, key: &K) -> bool {
        self.entries
            .get(key)
            .is_some_and(|entry| self.open.get(&entry.parent) == Some(key))
    }

    /// The open trigger at the level under `parent`
    pub fn open_at(&self, parent: Option<&K>) -> Option<&K> {
        self.open.get(&parent.cloned())
    }

    /// Number of armed timer handles
    pub fn armed_count(&self) -> usize {
        self.entries
            .values()
            .map(|entry| {
                usize::from(entry.pending_open.is_some()) + usize::from(entry.pending_close.is_some())
            })
            .sum()
    }
}

impl<K, C> Drop for HoverIntent<K, C>
where
    K: Clone + Eq + Hash + fmt::Debug,
    C: Clock,
{
    fn drop(&mut self) {
        self.teardown();
    }
}
