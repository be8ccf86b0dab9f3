use serde::{Deserialize, Serialize};

use crate::components::particle_field::{
    DEFAULT_PARTICLE_COUNT, DEFAULT_SPEED_RANGE, MAX_PARTICLE_COUNT,
};
use crate::error::ConfigError;
use crate::extensions::easing::Easing;
use crate::extensions::fade::FadeTransition;

/// Fade-driven outputs the renderer reads each frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    /// Full-screen image overlay.
    Overlay,
    /// Translucent fog sphere around the cloud.
    Fog,
    /// Secondary particle cluster.
    Cluster,
    /// Camera rig auto-rotate speed.
    AutoRotate,
}

impl Channel {
    pub const ALL: [Channel; 4] = [
        Channel::Overlay,
        Channel::Fog,
        Channel::Cluster,
        Channel::AutoRotate,
    ];

    /// Slot of this channel in per-channel arrays.
    pub fn index(self) -> usize {
        match self {
            Channel::Overlay => 0,
            Channel::Fog => 1,
            Channel::Cluster => 2,
            Channel::AutoRotate => 3,
        }
    }
}

/// Channel values before any spawn or fade writes them.
/// The overlay starts visible; everything else starts at zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelLevels {
    pub overlay: f64,
    pub fog: f64,
    pub cluster: f64,
    pub auto_rotate: f64,
}

impl Default for ChannelLevels {
    fn default() -> Self {
        Self {
            overlay: 1.0,
            fog: 0.0,
            cluster: 0.0,
            auto_rotate: 0.0,
        }
    }
}

impl ChannelLevels {
    pub fn get(&self, channel: Channel) -> f64 {
        match channel {
            Channel::Overlay => self.overlay,
            Channel::Fog => self.fog,
            Channel::Cluster => self.cluster,
            Channel::AutoRotate => self.auto_rotate,
        }
    }

    pub fn with(mut self, channel: Channel, value: f64) -> Self {
        match channel {
            Channel::Overlay => self.overlay = value,
            Channel::Fog => self.fog = value,
            Channel::Cluster => self.cluster = value,
            Channel::AutoRotate => self.auto_rotate = value,
        }
        self
    }

    /// Values indexed by `Channel::index()`.
    pub fn to_array(&self) -> [f64; 4] {
        Channel::ALL.map(|c| self.get(c))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for channel in Channel::ALL {
            let value = self.get(channel);
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidLevel { channel, value });
            }
        }
        Ok(())
    }
}

/// Interpolation parameters for one fade.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FadeSpec {
    pub from: f64,
    pub to: f64,
    /// Seconds. Zero or negative jumps straight to `to`.
    pub duration: f64,
    #[serde(default)]
    pub easing: Easing,
}

impl FadeSpec {
    pub fn new(from: f64, to: f64, duration: f64) -> Self {
        Self { from, to, duration, easing: Easing::Linear }
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Build an unarmed transition from these parameters.
    pub fn transition(&self) -> FadeTransition {
        FadeTransition::new(self.duration, self.from, self.to).with_easing(self.easing)
    }

    fn is_valid(&self) -> bool {
        self.from.is_finite() && self.to.is_finite() && !self.duration.is_nan()
    }
}

/// What a timeline event does when its threshold is crossed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TimelineAction {
    /// Ask the renderer to create an element, optionally fading it from the moment it appears.
    Spawn {
        element: Channel,
        #[serde(default)]
        fade: Option<FadeSpec>,
    },
    /// Start a fade on an element the renderer already owns.
    /// Replaces any fade still running on the same channel.
    Fade { channel: Channel, fade: FadeSpec },
}

/// A one-shot timeline entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEvent {
    /// Elapsed seconds at which the action fires.
    pub at: f64,
    pub action: TimelineAction,
}

impl TimelineEvent {
    pub fn spawn(at: f64, element: Channel) -> Self {
        Self { at, action: TimelineAction::Spawn { element, fade: None } }
    }

    pub fn spawn_fading(at: f64, element: Channel, fade: FadeSpec) -> Self {
        Self { at, action: TimelineAction::Spawn { element, fade: Some(fade) } }
    }

    pub fn fade(at: f64, channel: Channel, fade: FadeSpec) -> Self {
        Self { at, action: TimelineAction::Fade { channel, fade } }
    }
}

/// Parameters adjustable at runtime from the control panel.
/// Only `expansion_speed` feeds the simulation; the rest are carried for the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    /// Scale applied to every particle velocity.
    pub expansion_speed: f64,
    /// Point sprite size in world units.
    pub particle_size: f64,
    pub bloom_strength: f64,
    pub bloom_radius: f64,
    pub bloom_threshold: f64,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            expansion_speed: 1.0,
            particle_size: 0.05,
            bloom_strength: 1.5,
            bloom_radius: 0.4,
            bloom_threshold: 0.0,
        }
    }
}

impl Params {
    /// Name/value pairs, in wire order.
    pub fn fields(&self) -> [(&'static str, f64); 5] {
        [
            ("expansion_speed", self.expansion_speed),
            ("particle_size", self.particle_size),
            ("bloom_strength", self.bloom_strength),
            ("bloom_radius", self.bloom_radius),
            ("bloom_threshold", self.bloom_threshold),
        ]
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in self.fields() {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidParam { name, value });
            }
        }
        Ok(())
    }
}

/// Everything needed to build a session. Loaded from JSON at runtime;
/// missing fields fall back to the Big Bang defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Number of particles in the main cloud (fixed for the session).
    pub particle_count: usize,
    /// RNG seed for particle velocities.
    pub seed: u64,
    /// Min/max particle speed magnitude.
    pub speed_range: (f64, f64),
    /// Cap on a single frame's delta, in seconds. `None` = uncapped.
    pub max_frame_delta: Option<f64>,
    /// Where each channel sits until the timeline touches it.
    pub initial_levels: ChannelLevels,
    pub params: Params,
    pub timeline: Vec<TimelineEvent>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            particle_count: DEFAULT_PARTICLE_COUNT,
            seed: 42,
            speed_range: DEFAULT_SPEED_RANGE,
            max_frame_delta: None,
            initial_levels: ChannelLevels::default(),
            params: Params::default(),
            timeline: default_timeline(),
        }
    }
}

/// Overlay fades out after 3s, camera starts orbiting, fog rolls in at 8s,
/// secondary cluster appears at 10s.
pub fn default_timeline() -> Vec<TimelineEvent> {
    vec![
        TimelineEvent::fade(3.0, Channel::AutoRotate, FadeSpec::new(0.0, 1.0, 5.0)),
        TimelineEvent::fade(3.0, Channel::Overlay, FadeSpec::new(1.0, 0.0, 4.0)),
        TimelineEvent::spawn_fading(8.0, Channel::Fog, FadeSpec::new(0.0, 0.3, 5.0)),
        TimelineEvent::spawn(10.0, Channel::Cluster),
    ]
}

impl SessionConfig {
    /// Parse and validate a config from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_timeline(mut self, timeline: Vec<TimelineEvent>) -> Self {
        self.timeline = timeline;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.particle_count == 0 {
            return Err(ConfigError::ZeroParticles);
        }
        if self.particle_count > MAX_PARTICLE_COUNT {
            return Err(ConfigError::TooManyParticles {
                count: self.particle_count,
                max: MAX_PARTICLE_COUNT,
            });
        }
        let (min, max) = self.speed_range;
        if !min.is_finite() || !max.is_finite() || min < 0.0 || min > max {
            return Err(ConfigError::InvalidSpeedRange { min, max });
        }
        if let Some(cap) = self.max_frame_delta {
            if !cap.is_finite() || cap <= 0.0 {
                return Err(ConfigError::InvalidFrameDelta(cap));
            }
        }
        self.initial_levels.validate()?;
        self.params.validate()?;
        for (index, event) in self.timeline.iter().enumerate() {
            if !event.at.is_finite() || event.at < 0.0 {
                return Err(ConfigError::InvalidThreshold { index, at: event.at });
            }
            let (channel, fade) = match &event.action {
                TimelineAction::Spawn { element, fade } => (*element, fade.as_ref()),
                TimelineAction::Fade { channel, fade } => (*channel, Some(fade)),
            };
            if let Some(fade) = fade {
                if !fade.is_valid() {
                    return Err(ConfigError::InvalidFade { index, channel });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = SessionConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.particle_count, 20_000);
        assert_eq!(config.timeline.len(), 4);
    }

    #[test]
    fn parse_partial_config_keeps_defaults() {
        let json = r#"{
            "particle_count": 500,
            "params": { "expansion_speed": 3.0 }
        }"#;
        let config = SessionConfig::from_json(json).unwrap();
        assert_eq!(config.particle_count, 500);
        assert_eq!(config.params.expansion_speed, 3.0);
        assert_eq!(config.params.bloom_strength, 1.5);
        assert_eq!(config.timeline, default_timeline());
    }

    #[test]
    fn parse_timeline() {
        let json = r#"{
            "speed_range": [0.25, 2.0],
            "timeline": [
                { "at": 0.0, "action": { "kind": "fade", "channel": "overlay",
                    "fade": { "from": 0.0, "to": 1.0, "duration": 2.0, "easing": "sine_out" } } },
                { "at": 8.0, "action": { "kind": "spawn", "element": "fog" } },
                { "at": 3.0, "action": { "kind": "fade", "channel": "auto_rotate",
                    "fade": { "from": 0.0, "to": 2.0, "duration": 4.0 } } }
            ]
        }"#;
        let config = SessionConfig::from_json(json).unwrap();
        assert_eq!(config.speed_range, (0.25, 2.0));
        assert_eq!(config.timeline.len(), 3);
        assert_eq!(
            config.timeline[0].action,
            TimelineAction::Fade {
                channel: Channel::Overlay,
                fade: FadeSpec::new(0.0, 1.0, 2.0).with_easing(Easing::SineOut),
            }
        );
        assert_eq!(config.timeline[1], TimelineEvent::spawn(8.0, Channel::Fog));
    }

    #[test]
    fn parse_initial_levels() {
        let json = r#"{ "initial_levels": { "overlay": 0.0, "auto_rotate": 0.5 } }"#;
        let config = SessionConfig::from_json(json).unwrap();
        assert_eq!(config.initial_levels.to_array(), [0.0, 0.0, 0.0, 0.5]);
        assert_eq!(SessionConfig::default().initial_levels.get(Channel::Overlay), 1.0);

        let config = SessionConfig {
            initial_levels: ChannelLevels::default().with(Channel::Fog, f64::NAN),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidLevel { channel: Channel::Fog, .. })
        ));
    }

    #[test]
    fn rejects_bad_json() {
        let err = SessionConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn rejects_zero_particles() {
        let config = SessionConfig { particle_count: 0, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::ZeroParticles)));
    }

    #[test]
    fn rejects_oversized_cloud() {
        let config = SessionConfig { particle_count: MAX_PARTICLE_COUNT + 1, ..Default::default() };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::TooManyParticles { count, .. }) if count == MAX_PARTICLE_COUNT + 1
        ));

        let json = format!(r#"{{ "particle_count": {} }}"#, usize::MAX);
        assert!(matches!(
            SessionConfig::from_json(&json),
            Err(ConfigError::TooManyParticles { .. })
        ));

        let config = SessionConfig { particle_count: MAX_PARTICLE_COUNT, ..Default::default() };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_inverted_speed_range() {
        let config = SessionConfig { speed_range: (1.0, 0.5), ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidSpeedRange { .. })));
    }

    #[test]
    fn rejects_negative_threshold() {
        let config = SessionConfig::default()
            .with_timeline(vec![TimelineEvent::spawn(-1.0, Channel::Cluster)]);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidThreshold { index: 0, .. })
        ));
    }

    #[test]
    fn rejects_non_finite_fade() {
        let config = SessionConfig::default().with_timeline(vec![TimelineEvent::fade(
            1.0,
            Channel::Fog,
            FadeSpec::new(0.0, f64::INFINITY, 1.0),
        )]);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidFade { index: 0, channel: Channel::Fog })
        ));
    }

    #[test]
    fn rejects_negative_param() {
        let mut config = SessionConfig::default();
        config.params.particle_size = -0.1;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("particle_size"));
    }

    #[test]
    fn rejects_zero_frame_cap() {
        let config = SessionConfig { max_frame_delta: Some(0.0), ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidFrameDelta(_))));
    }

    #[test]
    fn channel_indices_are_dense() {
        for (i, channel) in Channel::ALL.iter().enumerate() {
            assert_eq!(channel.index(), i);
        }
    }
}
