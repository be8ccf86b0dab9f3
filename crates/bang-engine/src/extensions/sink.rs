// extensions/sink.rs
//
// The single scalar-set capability every fade target conforms to.
// The fog material, the overlay image and the camera rig's auto-rotate speed
// are all driven through this trait; fades never see concrete render types.

use std::cell::Cell;
use std::rc::Rc;

/// Anything whose opacity (or other scalar) can be set.
pub trait OpacitySink {
    fn set_opacity(&mut self, value: f64);
}

/// Closures are sinks, which keeps small adapters inline.
impl<F: FnMut(f64)> OpacitySink for F {
    fn set_opacity(&mut self, value: f64) {
        self(value)
    }
}

/// Shared scalar cell. Clones observe the same value, so the collaborator can
/// keep one handle and hand the other to a fade.
#[derive(Debug, Clone, Default)]
pub struct SharedScalar(Rc<Cell<f64>>);

impl SharedScalar {
    pub fn new(initial: f64) -> Self {
        Self(Rc::new(Cell::new(initial)))
    }

    pub fn get(&self) -> f64 {
        self.0.get()
    }

    pub fn set(&self, value: f64) {
        self.0.set(value);
    }
}

impl OpacitySink for SharedScalar {
    fn set_opacity(&mut self, value: f64) {
        self.set(value);
    }
}
