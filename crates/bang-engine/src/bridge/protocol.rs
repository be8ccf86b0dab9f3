/// Frame buffer layout shared with the renderer.
/// Must stay in sync with the TypeScript reader.
///
/// Layout (all values in f32 / 4 bytes):
/// ```text
/// [Header: 16 floats]
/// [Channels: 4 floats]            overlay, fog, cluster, auto-rotate
/// [Params: 5 floats]              expansion speed, particle size, bloom strength/radius/threshold
/// [Positions: particle_count × 3] x, y, z per particle
/// ```
///
/// Offsets are written into the header every frame, so the reader never
/// hardcodes them.

use crate::api::config::{Channel, SessionConfig};
use crate::api::session::{Session, SessionState};

/// Number of floats in the header section.
pub const HEADER_FLOATS: usize = 16;

/// Header field indices.
pub const HEADER_FRAME_COUNTER: usize = 0;
pub const HEADER_PROTOCOL_VERSION: usize = 1;
pub const HEADER_STATE: usize = 2;
pub const HEADER_ELAPSED: usize = 3;
pub const HEADER_DELTA: usize = 4;
pub const HEADER_PARTICLE_COUNT: usize = 5;
/// Bit `Channel::index()` set once that element has been spawned.
pub const HEADER_SPAWNED_MASK: usize = 6;
pub const HEADER_CHANNEL_OFFSET: usize = 7;
pub const HEADER_PARAMS_OFFSET: usize = 8;
pub const HEADER_POSITIONS_OFFSET: usize = 9;

/// Protocol version written into the header.
pub const PROTOCOL_VERSION: f32 = 1.0;

/// One float per `Channel`.
pub const CHANNEL_FLOATS: usize = Channel::ALL.len();

/// Number of tunable parameters (wire format — never changes).
pub const PARAM_FLOATS: usize = 5;

/// Floats per particle position: x, y, z (wire format — never changes).
pub const POSITION_FLOATS: usize = 3;

/// Runtime-computed buffer layout.
#[derive(Debug, Clone, PartialEq)]
pub struct ProtocolLayout {
    pub particle_count: usize,

    /// Size of the position section in floats.
    pub position_data_floats: usize,

    /// Offset (in floats) where channel values begin.
    pub channel_offset: usize,
    /// Offset (in floats) where parameters begin.
    pub params_offset: usize,
    /// Offset (in floats) where positions begin.
    pub positions_offset: usize,

    /// Total buffer size in floats.
    pub buffer_total_floats: usize,
    /// Total buffer size in bytes.
    pub buffer_total_bytes: usize,
}

impl ProtocolLayout {
    /// Layout for `particle_count` particles. `None` if the buffer size
    /// overflows `usize`.
    pub fn new(particle_count: usize) -> Option<Self> {
        let position_data_floats = particle_count.checked_mul(POSITION_FLOATS)?;

        let channel_offset = HEADER_FLOATS;
        let params_offset = channel_offset + CHANNEL_FLOATS;
        let positions_offset = params_offset + PARAM_FLOATS;

        let buffer_total_floats = positions_offset.checked_add(position_data_floats)?;
        let buffer_total_bytes = buffer_total_floats.checked_mul(4)?;

        Some(Self {
            particle_count,
            position_data_floats,
            channel_offset,
            params_offset,
            positions_offset,
            buffer_total_floats,
            buffer_total_bytes,
        })
    }

    /// Compute layout from a SessionConfig.
    pub fn from_config(config: &SessionConfig) -> Option<Self> {
        Self::new(config.particle_count)
    }

    /// Allocate a zeroed buffer of the right size.
    pub fn alloc(&self) -> Vec<f32> {
        vec![0.0; self.buffer_total_floats]
    }

    /// Pack the session's current frame into `buf`.
    ///
    /// `channels` holds the values the host's sinks last received, indexed by
    /// `Channel::index()`. Does not allocate.
    pub fn write_frame(
        &self,
        session: &Session,
        channels: &[f64; CHANNEL_FLOATS],
        spawned_mask: u32,
        buf: &mut [f32],
    ) {
        debug_assert!(buf.len() >= self.buffer_total_floats);

        buf[HEADER_FRAME_COUNTER] = session.frame() as f32;
        buf[HEADER_PROTOCOL_VERSION] = PROTOCOL_VERSION;
        buf[HEADER_STATE] = match session.state() {
            SessionState::Uninitialized => 0.0,
            SessionState::Running => 1.0,
        };
        buf[HEADER_ELAPSED] = session.elapsed() as f32;
        buf[HEADER_DELTA] = session.last_delta() as f32;
        buf[HEADER_PARTICLE_COUNT] = self.particle_count as f32;
        buf[HEADER_SPAWNED_MASK] = spawned_mask as f32;
        buf[HEADER_CHANNEL_OFFSET] = self.channel_offset as f32;
        buf[HEADER_PARAMS_OFFSET] = self.params_offset as f32;
        buf[HEADER_POSITIONS_OFFSET] = self.positions_offset as f32;

        for (slot, value) in buf[self.channel_offset..self.params_offset].iter_mut().zip(channels) {
            *slot = *value as f32;
        }
        for (slot, (_, value)) in buf[self.params_offset..self.positions_offset]
            .iter_mut()
            .zip(session.params().fields())
        {
            *slot = value as f32;
        }

        let positions = session.field().positions_flat();
        let end = self.positions_offset + positions.len().min(self.position_data_floats);
        buf[self.positions_offset..end].copy_from_slice(&positions[..end - self.positions_offset]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::session::SceneHost;
    use crate::extensions::sink::OpacitySink;

    struct NullHost;

    impl SceneHost for NullHost {
        fn spawn(&mut self, _element: Channel) -> Option<Box<dyn OpacitySink>> {
            None
        }

        fn attach(&mut self, _channel: Channel) -> Option<Box<dyn OpacitySink>> {
            None
        }
    }

    #[test]
    fn from_default_config_matches_expected_sizes() {
        let layout = ProtocolLayout::from_config(&SessionConfig::default()).unwrap();

        assert_eq!(layout.particle_count, 20_000);
        assert_eq!(layout.position_data_floats, 60_000);
        assert_eq!(layout.channel_offset, 16);
        assert_eq!(layout.params_offset, 20);
        assert_eq!(layout.positions_offset, 25);
        assert_eq!(layout.buffer_total_floats, 25 + 60_000);
        assert_eq!(layout.buffer_total_bytes, (25 + 60_000) * 4);
    }

    #[test]
    fn offsets_are_contiguous() {
        let layout = ProtocolLayout::new(7).unwrap();

        assert_eq!(layout.channel_offset, HEADER_FLOATS);
        assert_eq!(layout.params_offset, layout.channel_offset + CHANNEL_FLOATS);
        assert_eq!(layout.positions_offset, layout.params_offset + PARAM_FLOATS);
        assert_eq!(layout.buffer_total_floats, layout.positions_offset + layout.position_data_floats);
    }

    #[test]
    fn overflowing_count_has_no_layout() {
        assert!(ProtocolLayout::new(usize::MAX).is_none());
        assert!(ProtocolLayout::new(usize::MAX / POSITION_FLOATS).is_none());
    }

    #[test]
    fn write_frame_packs_every_section() {
        let config = SessionConfig {
            particle_count: 3,
            ..SessionConfig::default()
        }
        .with_timeline(Vec::new());
        let layout = ProtocolLayout::from_config(&config).unwrap();
        let mut session = Session::new(config).unwrap();
        session.tick(0.0, &mut NullHost);
        session.tick(2.0, &mut NullHost);

        let mut buf = layout.alloc();
        let channels = [0.25, 0.5, 0.0, 1.0];
        layout.write_frame(&session, &channels, 0b0110, &mut buf);

        assert_eq!(buf[HEADER_FRAME_COUNTER], 2.0);
        assert_eq!(buf[HEADER_PROTOCOL_VERSION], PROTOCOL_VERSION);
        assert_eq!(buf[HEADER_STATE], 1.0);
        assert_eq!(buf[HEADER_ELAPSED], 2.0);
        assert_eq!(buf[HEADER_DELTA], 2.0);
        assert_eq!(buf[HEADER_PARTICLE_COUNT], 3.0);
        assert_eq!(buf[HEADER_SPAWNED_MASK], 6.0);
        assert_eq!(buf[HEADER_POSITIONS_OFFSET], layout.positions_offset as f32);

        assert_eq!(&buf[16..20], &[0.25, 0.5, 0.0, 1.0]);
        assert_eq!(buf[layout.params_offset], 1.0);
        assert_eq!(&buf[layout.positions_offset..], session.field().positions_flat());
    }
}
