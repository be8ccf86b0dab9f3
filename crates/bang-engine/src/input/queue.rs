use crate::api::config::Params;

/// Parameter changes sent by the control panel.
/// Generic over the renderer — only `SetExpansionSpeed` affects the simulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlEvent {
    SetExpansionSpeed(f64),
    SetParticleSize(f64),
    SetBloomStrength(f64),
    SetBloomRadius(f64),
    SetBloomThreshold(f64),
}

impl ControlEvent {
    /// Write the new value into `params`. Negative or non-finite values are
    /// rejected and leave `params` untouched.
    pub fn apply(self, params: &mut Params) -> bool {
        let (slot, value) = match self {
            ControlEvent::SetExpansionSpeed(v) => (&mut params.expansion_speed, v),
            ControlEvent::SetParticleSize(v) => (&mut params.particle_size, v),
            ControlEvent::SetBloomStrength(v) => (&mut params.bloom_strength, v),
            ControlEvent::SetBloomRadius(v) => (&mut params.bloom_radius, v),
            ControlEvent::SetBloomThreshold(v) => (&mut params.bloom_threshold, v),
        };
        if !value.is_finite() || value < 0.0 {
            log::warn!("ignoring {:?}: value must be finite and non-negative", self);
            return false;
        }
        *slot = value;
        true
    }
}

/// A queue of control events.
/// JS writes events into the queue; the session applies and drains them at the start of each tick.
pub struct ControlQueue {
    events: Vec<ControlEvent>,
}

impl ControlQueue {
    pub fn new() -> Self {
        Self {
            events: Vec::with_capacity(16),
        }
    }

    /// Push a new control event (called from JS via wasm-bindgen).
    pub fn push(&mut self, event: ControlEvent) {
        self.events.push(event);
    }

    /// Apply every pending event in arrival order, then clear the queue.
    /// Returns the number of events accepted.
    pub fn apply_all(&mut self, params: &mut Params) -> usize {
        let accepted = self.events.iter().filter(|e| e.apply(params)).count();
        self.events.clear();
        accepted
    }

    /// Iterate over pending events without consuming them.
    pub fn iter(&self) -> impl Iterator<Item = &ControlEvent> {
        self.events.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl Default for ControlQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_and_apply() {
        let mut q = ControlQueue::new();
        let mut params = Params::default();
        q.push(ControlEvent::SetExpansionSpeed(4.0));
        q.push(ControlEvent::SetBloomRadius(0.8));
        assert_eq!(q.len(), 2);

        assert_eq!(q.apply_all(&mut params), 2);
        assert!(q.is_empty());
        assert_eq!(params.expansion_speed, 4.0);
        assert_eq!(params.bloom_radius, 0.8);
    }

    #[test]
    fn later_event_wins() {
        let mut q = ControlQueue::new();
        let mut params = Params::default();
        q.push(ControlEvent::SetParticleSize(0.1));
        q.push(ControlEvent::SetParticleSize(0.2));
        q.apply_all(&mut params);
        assert_eq!(params.particle_size, 0.2);
    }

    #[test]
    fn rejects_invalid_values() {
        let mut params = Params::default();
        assert!(!ControlEvent::SetExpansionSpeed(f64::NAN).apply(&mut params));
        assert!(!ControlEvent::SetBloomStrength(-1.0).apply(&mut params));
        assert_eq!(params, Params::default());
    }
}
