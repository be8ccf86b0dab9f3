pub mod api;
pub mod core;
pub mod components;
pub mod extensions;
pub mod input;
pub mod bridge;
pub mod error;

// Re-export key types at crate root for convenience
pub use api::config::{
    Channel, ChannelLevels, FadeSpec, Params, SessionConfig, TimelineAction, TimelineEvent, default_timeline,
};
pub use api::session::{FrameInfo, SceneHost, Session, SessionState};
pub use components::particle_field::{
    ParticleField, DEFAULT_PARTICLE_COUNT, DEFAULT_SPEED_RANGE, MAX_PARTICLE_COUNT,
};
pub use crate::core::rng::Rng;
pub use crate::core::scheduler::{EventId, ScheduledEvent, Scheduler};
pub use crate::core::time::SimulationClock;
pub use input::queue::{ControlEvent, ControlQueue};
pub use bridge::protocol::{ProtocolLayout, CHANNEL_FLOATS};
pub use error::ConfigError;

// Extensions — fades and the sink capability
pub use extensions::{
    Easing, lerp, ease,
    FadeController, FadeId, FadeTransition,
    OpacitySink, SharedScalar,
};
