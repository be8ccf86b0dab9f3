// extensions/fade.rs
//
// Fade system — time-driven interpolation of a scalar into an OpacitySink.
// Transitions are anchored to absolute elapsed time, not accumulated dt, so a
// sample at a given elapsed always yields the same value.
//
// Usage:
//   let mut fades = FadeController::new();
//   let id = fades.start(elapsed, FadeTransition::new(4.0, 1.0, 0.0), Box::new(overlay));
//   fades.sample_all(elapsed);  // once per frame

use std::collections::BTreeMap;

use super::easing::{Easing, ease};
use super::sink::OpacitySink;

/// A single interpolation from `from` to `to` over `duration` seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct FadeTransition {
    /// Elapsed time the fade was armed at. `None` = inactive.
    start_elapsed: Option<f64>,
    /// Duration in seconds. Zero or negative settles on the first sample.
    pub duration: f64,
    pub from: f64,
    pub to: f64,
    pub easing: Easing,
    settled: bool,
}

impl FadeTransition {
    /// Create an inactive transition. Call `start` to arm it.
    pub fn new(duration: f64, from: f64, to: f64) -> Self {
        Self {
            start_elapsed: None,
            duration,
            from,
            to,
            easing: Easing::Linear,
            settled: false,
        }
    }

    /// Fade in from transparent.
    pub fn fade_in(duration: f64) -> Self {
        Self::new(duration, 0.0, 1.0)
    }

    /// Fade out to transparent.
    pub fn fade_out(duration: f64) -> Self {
        Self::new(duration, 1.0, 0.0)
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Arm the transition at the current elapsed time.
    pub fn start(&mut self, now: f64) {
        self.start_elapsed = Some(now);
        self.settled = false;
    }

    /// Disarm. Parameters are kept so the fade can be started again.
    pub fn cancel(&mut self) {
        self.start_elapsed = None;
        self.settled = false;
    }

    pub fn start_elapsed(&self) -> Option<f64> {
        self.start_elapsed
    }

    pub fn is_active(&self) -> bool {
        self.start_elapsed.is_some()
    }

    /// Whether the terminal value has been reached; further samples return `to`.
    pub fn is_settled(&self) -> bool {
        self.settled
    }

    /// Value at `elapsed` without changing state.
    /// Inactive transitions report `from`.
    pub fn value_at(&self, elapsed: f64) -> f64 {
        let start = match self.start_elapsed {
            Some(start) => start,
            None => return self.from,
        };
        if self.settled || self.duration <= 0.0 {
            return self.to;
        }
        let t = (elapsed - start) / self.duration;
        if t >= 1.0 {
            return self.to;
        }
        let (lo, hi) = if self.from <= self.to {
            (self.from, self.to)
        } else {
            (self.to, self.from)
        };
        ease(self.from, self.to, t, self.easing).clamp(lo, hi)
    }

    /// Sample at `elapsed`, settling once the duration has run out.
    pub fn sample(&mut self, elapsed: f64) -> f64 {
        let value = self.value_at(elapsed);
        if let Some(start) = self.start_elapsed {
            if self.duration <= 0.0 || elapsed - start >= self.duration {
                self.settled = true;
            }
        }
        value
    }

    /// Sample and write the value into `sink`.
    pub fn drive(&mut self, elapsed: f64, sink: &mut dyn OpacitySink) -> f64 {
        let value = self.sample(elapsed);
        sink.set_opacity(value);
        value
    }
}

/// Handle to a running fade for later control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FadeId(pub u32);

struct ActiveFade {
    transition: FadeTransition,
    sink: Box<dyn OpacitySink>,
    value: f64,
}

/// Drives any number of independent fades, each into its own sink.
#[derive(Default)]
pub struct FadeController {
    fades: BTreeMap<FadeId, ActiveFade>,
    next_id: u32,
}

impl FadeController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm `transition` at `now` and attach it to `sink`.
    pub fn start(
        &mut self,
        now: f64,
        mut transition: FadeTransition,
        sink: Box<dyn OpacitySink>,
    ) -> FadeId {
        let id = FadeId(self.next_id);
        self.next_id += 1;
        transition.start(now);
        let value = transition.value_at(now);
        self.fades.insert(id, ActiveFade { transition, sink, value });
        id
    }

    /// Sample every fade at `elapsed` and push the values into their sinks.
    /// Settled fades receive their final value and are then dropped.
    /// Returns the number of fades that settled during this call.
    pub fn sample_all(&mut self, elapsed: f64) -> usize {
        let mut settled = 0;
        self.fades.retain(|id, fade| {
            fade.value = fade.transition.drive(elapsed, fade.sink.as_mut());
            if fade.transition.is_settled() {
                log::debug!("fade {:?} settled at {:.3}", id, fade.value);
                settled += 1;
                false
            } else {
                true
            }
        });
        settled
    }

    /// Stop a fade. The sink keeps whatever value it last received.
    pub fn cancel(&mut self, id: FadeId) -> bool {
        self.fades.remove(&id).is_some()
    }

    pub fn get(&self, id: FadeId) -> Option<&FadeTransition> {
        self.fades.get(&id).map(|f| &f.transition)
    }

    /// Last value written by a running fade.
    pub fn value(&self, id: FadeId) -> Option<f64> {
        self.fades.get(&id).map(|f| f.value)
    }

    pub fn contains(&self, id: FadeId) -> bool {
        self.fades.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.fades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fades.is_empty()
    }

    pub fn clear(&mut self) {
        self.fades.clear();
    }
}

impl std::fmt::Debug for FadeController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FadeController")
            .field("active", &self.fades.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}
