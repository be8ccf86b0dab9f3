/// Monotonic simulation clock.
///
/// The render loop supplies raw timestamps (seconds, e.g. `performance.now() / 1000`);
/// the clock turns them into a never-decreasing elapsed time and a per-frame delta.
/// The first sample only establishes the time base and yields a zero delta.
#[derive(Debug, Clone, Default)]
pub struct SimulationClock {
    /// Seconds since the first sample.
    elapsed: f64,
    /// Delta produced by the most recent sample.
    last_delta: f64,
    /// Raw timestamp that maps to elapsed zero. Shifted forward when a step is capped.
    base: Option<f64>,
    /// Raw timestamp of the most recent accepted sample.
    last_sample: Option<f64>,
    /// Upper bound on a single step (e.g. after a backgrounded tab).
    max_delta: Option<f64>,
}

impl SimulationClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clock whose per-sample delta is capped at `max_delta` seconds.
    pub fn with_max_delta(max_delta: f64) -> Self {
        Self {
            max_delta: Some(max_delta),
            ..Self::default()
        }
    }

    /// Sample the external time source. Returns `(elapsed, delta)`.
    ///
    /// Elapsed is measured from the time base rather than summed from deltas,
    /// so a timestamp of `base + 3.0` reads exactly `3.0`. Timestamps that go
    /// backwards (or are not finite) produce a zero delta.
    pub fn sample(&mut self, now: f64) -> (f64, f64) {
        if !now.is_finite() {
            return self.hold();
        }
        let (base, prev) = match (self.base, self.last_sample) {
            (Some(base), Some(prev)) => (base, prev),
            _ => {
                self.base = Some(now - self.elapsed);
                self.last_sample = Some(now);
                return self.hold();
            }
        };
        if now <= prev {
            return self.hold();
        }

        let mut base = base;
        if let Some(cap) = self.max_delta {
            let raw = now - prev;
            if raw > cap {
                base += raw - cap;
            }
        }
        self.base = Some(base);
        self.last_sample = Some(now);

        let elapsed = (now - base).max(self.elapsed);
        self.last_delta = elapsed - self.elapsed;
        self.elapsed = elapsed;
        (self.elapsed, self.last_delta)
    }

    /// Advance by an explicit frame delta (for hosts that only report dt).
    /// Not meant to be mixed with `sample` in the same session.
    pub fn advance(&mut self, dt: f64) -> (f64, f64) {
        let mut dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };
        if let Some(cap) = self.max_delta {
            dt = dt.min(cap);
        }
        self.last_delta = dt;
        self.elapsed += dt;
        (self.elapsed, self.last_delta)
    }

    fn hold(&mut self) -> (f64, f64) {
        self.last_delta = 0.0;
        (self.elapsed, 0.0)
    }

    /// Seconds since the first sample.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Delta of the most recent sample (the integration step).
    pub fn last_delta(&self) -> f64 {
        self.last_delta
    }

    /// Whether the time base has been established.
    pub fn is_started(&self) -> bool {
        self.base.is_some()
    }
}
