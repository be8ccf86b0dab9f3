// extensions/mod.rs
//
// Fades, easing and the sink capability.
// Decoupled from the particle field and the scheduler — the session wires them together.

pub mod easing;
pub mod fade;
pub mod sink;

pub use easing::{Easing, lerp, ease};
pub use fade::{FadeController, FadeId, FadeTransition};
pub use sink::{OpacitySink, SharedScalar};
