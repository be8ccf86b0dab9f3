use bang_engine::bridge::protocol::ProtocolLayout;
use bang_engine::{
    Channel, ChannelLevels, ConfigError, ControlEvent, OpacitySink, SceneHost, Session,
    SessionConfig, SharedScalar, CHANNEL_FLOATS, MAX_PARTICLE_COUNT,
};

/// Scene host backed by plain scalar cells.
///
/// TypeScript owns the real drawables. It reads the spawned mask to know when
/// to build the fog sphere or the secondary cluster, and reads the channel
/// values to set material opacity and the orbit controls' auto-rotate speed.
pub struct ChannelHost {
    values: [SharedScalar; CHANNEL_FLOATS],
    spawned_mask: u32,
}

impl ChannelHost {
    pub fn new(levels: ChannelLevels) -> Self {
        Self {
            values: levels.to_array().map(SharedScalar::new),
            spawned_mask: 0,
        }
    }

    pub fn value(&self, channel: Channel) -> f64 {
        self.values[channel.index()].get()
    }

    /// Current value of every channel, indexed by `Channel::index()`.
    pub fn values(&self) -> [f64; CHANNEL_FLOATS] {
        [
            self.values[0].get(),
            self.values[1].get(),
            self.values[2].get(),
            self.values[3].get(),
        ]
    }

    pub fn spawned_mask(&self) -> u32 {
        self.spawned_mask
    }

    pub fn is_spawned(&self, channel: Channel) -> bool {
        self.spawned_mask & (1 << channel.index()) != 0
    }
}

impl Default for ChannelHost {
    fn default() -> Self {
        Self::new(ChannelLevels::default())
    }
}

impl SceneHost for ChannelHost {
    fn spawn(&mut self, element: Channel) -> Option<Box<dyn OpacitySink>> {
        self.spawned_mask |= 1 << element.index();
        // Fully visible unless a fade takes over this frame
        let cell = self.values[element.index()].clone();
        cell.set(1.0);
        Some(Box::new(cell))
    }

    fn attach(&mut self, channel: Channel) -> Option<Box<dyn OpacitySink>> {
        Some(Box::new(self.values[channel.index()].clone()))
    }
}

/// Wires a `Session` to the browser.
///
/// Each deployable crate keeps one runner in a `thread_local!` (see
/// `export_session!`) and reaches it from free `#[wasm_bindgen]` functions.
pub struct SessionRunner {
    session: Session,
    host: ChannelHost,
    layout: ProtocolLayout,
    /// Flat frame buffer read by TypeScript after every tick.
    frame_buffer: Vec<f32>,
}

impl SessionRunner {
    pub fn new(config: SessionConfig) -> Result<Self, ConfigError> {
        let levels = config.initial_levels;
        let session = Session::new(config)?;
        let count = session.field().len();
        let layout = ProtocolLayout::new(count).ok_or(ConfigError::TooManyParticles {
            count,
            max: MAX_PARTICLE_COUNT,
        })?;
        let frame_buffer = layout.alloc();
        Ok(Self {
            session,
            host: ChannelHost::new(levels),
            layout,
            frame_buffer,
        })
    }

    /// Build from `config`, or from the defaults if `config` is rejected.
    /// The rejection is handed back so the caller can report it.
    pub fn new_or_default(config: SessionConfig) -> Result<(Self, Option<ConfigError>), ConfigError> {
        match Self::new(config) {
            Ok(runner) => Ok((runner, None)),
            Err(e) => Ok((Self::new(SessionConfig::default())?, Some(e))),
        }
    }

    /// Start the session clock and run the zero-time frame, so events at
    /// `t = 0` are already applied in the first buffer TypeScript reads.
    pub fn init(&mut self, now: f64) {
        self.session.start(now);
        self.tick(now);
    }

    /// Replace the running session with a fresh one built from `config`.
    /// On error the current session keeps running.
    pub fn replace_config(&mut self, config: SessionConfig) -> Result<(), ConfigError> {
        *self = Self::new(config)?;
        log::info!("session rebuilt: {} particles", self.layout.particle_count);
        Ok(())
    }

    /// Parse a JSON config and replace the running session with it.
    pub fn load_config(&mut self, json: &str) -> Result<(), ConfigError> {
        let config = SessionConfig::from_json(json)?;
        self.replace_config(config)
    }

    /// Queue a control-panel change for the next tick.
    pub fn push_control(&mut self, event: ControlEvent) {
        self.session.push_control(event);
    }

    /// Run one frame and repack the frame buffer.
    pub fn tick(&mut self, now: f64) {
        self.session.tick(now, &mut self.host);
        self.write_frame();
    }

    fn write_frame(&mut self) {
        self.layout.write_frame(
            &self.session,
            &self.host.values(),
            self.host.spawned_mask(),
            &mut self.frame_buffer,
        );
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn host(&self) -> &ChannelHost {
        &self.host
    }

    // ---- Pointer accessors for frame buffer reads ----

    pub fn frame_ptr(&self) -> *const f32 {
        self.frame_buffer.as_ptr()
    }

    pub fn frame_len(&self) -> u32 {
        self.frame_buffer.len() as u32
    }

    pub fn positions_offset(&self) -> u32 {
        self.layout.positions_offset as u32
    }

    pub fn particle_count(&self) -> u32 {
        self.layout.particle_count as u32
    }

    pub fn elapsed(&self) -> f64 {
        self.session.elapsed()
    }

    /// Channel value by wire index; NaN for an unknown index.
    pub fn channel_value(&self, index: u32) -> f64 {
        Channel::ALL
            .get(index as usize)
            .map(|c| self.host.value(*c))
            .unwrap_or(f64::NAN)
    }

    pub fn spawned_mask(&self) -> u32 {
        self.host.spawned_mask()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bang_engine::bridge::protocol::{HEADER_ELAPSED, HEADER_SPAWNED_MASK};

    fn small() -> SessionConfig {
        SessionConfig {
            particle_count: 16,
            ..SessionConfig::default()
        }
    }

    #[test]
    fn ticks_write_frame_buffer() {
        let mut runner = SessionRunner::new(small()).unwrap();
        runner.init(100.0);
        runner.tick(101.0);

        let buf = &runner.frame_buffer;
        assert_eq!(runner.frame_len() as usize, buf.len());
        assert_eq!(buf[HEADER_ELAPSED], 1.0);
        let positions = &buf[runner.positions_offset() as usize..];
        assert_eq!(positions.len(), 16 * 3);
        assert!(positions.iter().any(|v| *v != 0.0));
    }

    #[test]
    fn overlay_starts_visible_and_fades() {
        let mut runner = SessionRunner::new(small()).unwrap();
        runner.init(0.0);
        assert_eq!(runner.host().value(Channel::Overlay), 1.0);

        for i in 1..=10 {
            runner.tick(i as f64 * 0.5);
        }
        // Default timeline: overlay fades 1 -> 0 over 4s from t = 3
        assert!((runner.host().value(Channel::Overlay) - 0.5).abs() < 1e-9);
        assert_eq!(runner.channel_value(Channel::Overlay.index() as u32), runner.host().value(Channel::Overlay));
        assert!(runner.channel_value(99).is_nan());
    }

    #[test]
    fn spawn_sets_mask_and_full_opacity() {
        let mut runner = SessionRunner::new(small()).unwrap();
        runner.init(0.0);
        runner.tick(11.0);

        assert!(runner.host().is_spawned(Channel::Fog));
        assert!(runner.host().is_spawned(Channel::Cluster));
        assert!(!runner.host().is_spawned(Channel::Overlay));
        // Cluster has no fade, fog starts its fade-in from zero
        assert_eq!(runner.host().value(Channel::Cluster), 1.0);
        assert_eq!(runner.host().value(Channel::Fog), 0.0);
        assert_eq!(runner.frame_buffer[HEADER_SPAWNED_MASK], 0b0110 as f32);
    }

    #[test]
    fn bad_config_keeps_current_session() {
        let mut runner = SessionRunner::new(small()).unwrap();
        runner.init(0.0);
        runner.tick(2.0);

        assert!(runner.load_config(r#"{ "particle_count": 0 }"#).is_err());
        assert_eq!(runner.particle_count(), 16);
        assert_eq!(runner.elapsed(), 2.0);

        runner.load_config(r#"{ "particle_count": 8 }"#).unwrap();
        assert_eq!(runner.particle_count(), 8);
        assert_eq!(runner.elapsed(), 0.0);
    }

    #[test]
    fn oversized_config_is_rejected_not_allocated() {
        let mut runner = SessionRunner::new(small()).unwrap();
        runner.init(0.0);
        runner.tick(1.0);

        let err = runner
            .load_config(r#"{ "particle_count": 9223372036854775807 }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::TooManyParticles { .. }));
        assert!(SessionRunner::new(SessionConfig {
            particle_count: MAX_PARTICLE_COUNT + 1,
            ..small()
        })
        .is_err());

        assert_eq!(runner.particle_count(), 16);
        assert_eq!(runner.elapsed(), 1.0);
    }

    #[test]
    fn rejected_startup_config_runs_defaults() {
        let (runner, rejected) = SessionRunner::new_or_default(small()).unwrap();
        assert!(rejected.is_none());
        assert_eq!(runner.particle_count(), 16);

        let (mut runner, rejected) =
            SessionRunner::new_or_default(SessionConfig { particle_count: 0, ..small() }).unwrap();
        assert!(matches!(rejected, Some(ConfigError::ZeroParticles)));
        assert_eq!(runner.particle_count() as usize, bang_engine::DEFAULT_PARTICLE_COUNT);
        runner.init(0.0);
        runner.tick(1.0);
        assert_eq!(runner.elapsed(), 1.0);
    }

    #[test]
    fn initial_levels_come_from_config() {
        let json = r#"{
            "particle_count": 4,
            "initial_levels": { "overlay": 0.0 },
            "timeline": [
                { "at": 3.0, "action": { "kind": "fade", "channel": "overlay",
                    "fade": { "from": 0.0, "to": 1.0, "duration": 2.0 } } }
            ]
        }"#;
        let mut runner = SessionRunner::new(small()).unwrap();
        runner.load_config(json).unwrap();
        runner.init(0.0);
        assert_eq!(runner.host().value(Channel::Overlay), 0.0);

        runner.tick(2.0);
        assert_eq!(runner.host().value(Channel::Overlay), 0.0);
        runner.tick(4.0);
        assert!((runner.host().value(Channel::Overlay) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn controls_reach_the_session() {
        let mut runner = SessionRunner::new(small()).unwrap();
        runner.init(0.0);
        runner.push_control(ControlEvent::SetExpansionSpeed(3.0));
        runner.tick(0.1);
        assert_eq!(runner.session().params().expansion_speed, 3.0);
    }
}
