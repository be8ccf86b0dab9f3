// core/scheduler.rs
//
// One-shot timeline — actions keyed on elapsed-time thresholds.
// Resolved purely by comparing against the clock sampled once per frame;
// there are no timer threads or deferred closures.
//
// Usage:
//   let mut timeline = Scheduler::new();
//   timeline.schedule(8.0, Action::SpawnFog);
//   timeline.poll(elapsed, |_id, action| dispatch(action));

/// Handle to a scheduled event for later control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventId(pub u32);

/// A single one-shot event.
#[derive(Debug, Clone)]
pub struct ScheduledEvent<A> {
    pub id: EventId,
    /// Elapsed time (seconds) at which the event becomes eligible.
    pub trigger_at: f64,
    /// Whether the action has already been delivered.
    pub fired: bool,
    pub action: A,
}

/// Ordered set of one-shot events.
/// Events are kept sorted by `trigger_at`; equal thresholds keep insertion order.
#[derive(Debug, Clone)]
pub struct Scheduler<A> {
    events: Vec<ScheduledEvent<A>>,
    next_id: u32,
}

impl<A> Scheduler<A> {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            next_id: 0,
        }
    }

    /// Add an event. Returns a handle for later control.
    /// An event whose threshold already passed fires on the next poll.
    /// `trigger_at` must not be NaN; it would sort ahead of every finite event.
    pub fn schedule(&mut self, trigger_at: f64, action: A) -> EventId {
        debug_assert!(!trigger_at.is_nan(), "NaN timeline threshold");
        let id = EventId(self.next_id);
        self.next_id += 1;
        let idx = self.events.partition_point(|e| e.trigger_at <= trigger_at);
        self.events.insert(idx, ScheduledEvent {
            id,
            trigger_at,
            fired: false,
            action,
        });
        id
    }

    /// Fire every unfired event with `trigger_at <= elapsed`, in ascending
    /// threshold order. Returns the number of events fired by this call.
    pub fn poll<F>(&mut self, elapsed: f64, mut fire: F) -> usize
    where
        F: FnMut(EventId, &A),
    {
        if elapsed.is_nan() {
            return 0;
        }
        let mut count = 0;
        for event in self.events.iter_mut() {
            if event.trigger_at > elapsed {
                break;
            }
            if event.fired {
                continue;
            }
            event.fired = true;
            fire(event.id, &event.action);
            count += 1;
        }
        count
    }

    /// Remove an event. Returns false if the handle is unknown.
    pub fn cancel(&mut self, id: EventId) -> bool {
        match self.events.iter().position(|e| e.id == id) {
            Some(idx) => {
                self.events.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Re-arm a single event so it can fire again.
    pub fn reset_event(&mut self, id: EventId) -> bool {
        match self.events.iter_mut().find(|e| e.id == id) {
            Some(event) => {
                event.fired = false;
                true
            }
            None => false,
        }
    }

    /// Re-arm every event.
    pub fn reset(&mut self) {
        for event in self.events.iter_mut() {
            event.fired = false;
        }
    }

    /// Whether an event has fired. `None` for unknown handles.
    pub fn is_fired(&self, id: EventId) -> Option<bool> {
        self.get(id).map(|e| e.fired)
    }

    pub fn get(&self, id: EventId) -> Option<&ScheduledEvent<A>> {
        self.events.iter().find(|e| e.id == id)
    }

    /// Iterate over events in firing order.
    pub fn iter(&self) -> impl Iterator<Item = &ScheduledEvent<A>> {
        self.events.iter()
    }

    /// Number of events that have not fired yet.
    pub fn pending(&self) -> usize {
        self.events.iter().filter(|e| !e.fired).count()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl<A> Default for Scheduler<A> {
    fn default() -> Self {
        Self::new()
    }
}
