use std::collections::{BTreeMap, BTreeSet};

use crate::api::config::{Channel, Params, SessionConfig, TimelineAction};
use crate::components::particle_field::ParticleField;
use crate::core::rng::Rng;
use crate::core::scheduler::{EventId, Scheduler};
use crate::core::time::SimulationClock;
use crate::error::ConfigError;
use crate::extensions::fade::{FadeController, FadeId, FadeTransition};
use crate::extensions::sink::OpacitySink;
use crate::input::queue::{ControlEvent, ControlQueue};

/// The rendering collaborator, as seen from the session.
///
/// The session never touches drawables directly: it asks the host to create
/// them or to hand back a sink for one it already owns. Returning `None`
/// (missing texture, element not ready) only skips the related fade.
pub trait SceneHost {
    /// Create a secondary element. Returns a sink driving its opacity, if it has one.
    fn spawn(&mut self, element: Channel) -> Option<Box<dyn OpacitySink>>;

    /// Sink for an element that already exists (overlay, camera rig).
    fn attach(&mut self, channel: Channel) -> Option<Box<dyn OpacitySink>>;
}

/// Session lifecycle. There is no pause or terminal state; the host tears
/// the session down by dropping it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Running,
}

/// Summary of one frame, returned by `Session::tick`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInfo {
    pub elapsed: f64,
    pub delta: f64,
    /// Timeline events fired this frame.
    pub fired: usize,
    /// Fades that reached their end value this frame.
    pub settled: usize,
    /// Fades still running after this frame.
    pub active_fades: usize,
}

/// One simulation session: owns the clock, the particle field, the timeline
/// and every running fade. Drive it with `tick` once per display refresh.
pub struct Session {
    state: SessionState,
    params: Params,
    clock: SimulationClock,
    field: ParticleField,
    timeline: Scheduler<TimelineAction>,
    fades: FadeController,
    channel_fades: BTreeMap<Channel, FadeId>,
    spawned: BTreeSet<Channel>,
    controls: ControlQueue,
    /// Reused between frames so polling the timeline does not allocate.
    fired: Vec<TimelineAction>,
    frame: u64,
}

impl Session {
    /// Validate `config` and build the session. Nothing runs until the first tick.
    pub fn new(config: SessionConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut rng = Rng::new(config.seed);
        let field = ParticleField::new(config.particle_count, config.speed_range, &mut rng);

        let mut timeline = Scheduler::new();
        for event in config.timeline {
            timeline.schedule(event.at, event.action);
        }

        let clock = match config.max_frame_delta {
            Some(cap) => SimulationClock::with_max_delta(cap),
            None => SimulationClock::new(),
        };

        Ok(Self {
            state: SessionState::Uninitialized,
            params: config.params,
            clock,
            field,
            timeline,
            fades: FadeController::new(),
            channel_fades: BTreeMap::new(),
            spawned: BTreeSet::new(),
            controls: ControlQueue::new(),
            fired: Vec::with_capacity(8),
            frame: 0,
        })
    }

    /// Enter `Running` and take `now` as the time base. No-op once running.
    pub fn start(&mut self, now: f64) {
        if self.state == SessionState::Running {
            return;
        }
        self.clock.sample(now);
        self.enter_running();
    }

    fn enter_running(&mut self) {
        self.state = SessionState::Running;
        log::info!(
            "session running: {} particles, {} timeline events",
            self.field.len(),
            self.timeline.len()
        );
    }

    /// Run one frame against a raw timestamp (seconds from a monotonic source).
    pub fn tick<H: SceneHost + ?Sized>(&mut self, now: f64, host: &mut H) -> FrameInfo {
        self.controls.apply_all(&mut self.params);
        if self.state == SessionState::Uninitialized {
            self.enter_running();
        }
        let (elapsed, delta) = self.clock.sample(now);
        self.run_frame(elapsed, delta, host)
    }

    /// Run one frame for hosts that report a frame delta instead of a timestamp.
    pub fn tick_dt<H: SceneHost + ?Sized>(&mut self, dt: f64, host: &mut H) -> FrameInfo {
        self.controls.apply_all(&mut self.params);
        if self.state == SessionState::Uninitialized {
            self.enter_running();
        }
        let (elapsed, delta) = self.clock.advance(dt);
        self.run_frame(elapsed, delta, host)
    }

    fn run_frame<H: SceneHost + ?Sized>(&mut self, elapsed: f64, delta: f64, host: &mut H) -> FrameInfo {
        self.field.advance(delta, self.params.expansion_speed);

        let mut fired = std::mem::take(&mut self.fired);
        let fired_count = self.timeline.poll(elapsed, |id, action| {
            log::debug!("timeline event {:?} fired at {:.3}s", id, elapsed);
            fired.push(action.clone());
        });
        for action in fired.drain(..) {
            self.dispatch(&action, elapsed, host);
        }
        self.fired = fired;

        let settled = self.fades.sample_all(elapsed);
        if settled > 0 {
            let fades = &self.fades;
            self.channel_fades.retain(|_, id| fades.contains(*id));
        }

        self.frame += 1;
        FrameInfo {
            elapsed,
            delta,
            fired: fired_count,
            settled,
            active_fades: self.fades.len(),
        }
    }

    fn dispatch<H: SceneHost + ?Sized>(&mut self, action: &TimelineAction, elapsed: f64, host: &mut H) {
        match action {
            TimelineAction::Spawn { element, fade } => {
                log::info!("spawning {:?} at {:.2}s", element, elapsed);
                self.spawned.insert(*element);
                let sink = host.spawn(*element);
                if let Some(spec) = fade {
                    match sink {
                        Some(sink) => self.begin_fade(*element, spec.transition(), sink, elapsed),
                        None => log::warn!("host gave no sink for spawned {:?}; fade skipped", element),
                    }
                }
            }
            TimelineAction::Fade { channel, fade } => match host.attach(*channel) {
                Some(sink) => self.begin_fade(*channel, fade.transition(), sink, elapsed),
                None => log::warn!("host gave no sink for {:?}; fade skipped", channel),
            },
        }
    }

    fn begin_fade(&mut self, channel: Channel, transition: FadeTransition, sink: Box<dyn OpacitySink>, now: f64) {
        if let Some(previous) = self.channel_fades.remove(&channel) {
            self.fades.cancel(previous);
        }
        log::debug!(
            "fade on {:?}: {} -> {} over {}s",
            channel, transition.from, transition.to, transition.duration
        );
        let id = self.fades.start(now, transition, sink);
        self.channel_fades.insert(channel, id);
    }

    /// Start a fade on `channel` at the current elapsed time, replacing any
    /// fade already running there. It is first sampled on the next tick.
    pub fn start_fade(&mut self, channel: Channel, transition: FadeTransition, sink: Box<dyn OpacitySink>) {
        let now = self.clock.elapsed();
        self.begin_fade(channel, transition, sink, now);
    }

    /// Stop the fade running on `channel`. The sink keeps its last value.
    pub fn cancel_fade(&mut self, channel: Channel) -> bool {
        match self.channel_fades.remove(&channel) {
            Some(id) => self.fades.cancel(id),
            None => false,
        }
    }

    /// Add a timeline event after construction. `None` if `at` is not finite.
    pub fn schedule(&mut self, at: f64, action: TimelineAction) -> Option<EventId> {
        if !at.is_finite() {
            log::warn!("rejected timeline event with threshold {}", at);
            return None;
        }
        Some(self.timeline.schedule(at, action))
    }

    /// Remove a timeline event before it fires.
    pub fn cancel_event(&mut self, id: EventId) -> bool {
        self.timeline.cancel(id)
    }

    /// Queue a parameter change; applied at the start of the next tick.
    pub fn push_control(&mut self, event: ControlEvent) {
        self.controls.push(event);
    }

    pub fn controls_mut(&mut self) -> &mut ControlQueue {
        &mut self.controls
    }

    /// Last value written on `channel` by a running fade.
    pub fn channel_value(&self, channel: Channel) -> Option<f64> {
        self.channel_fades
            .get(&channel)
            .and_then(|id| self.fades.value(*id))
    }

    /// Whether the timeline has already spawned `element`.
    pub fn is_spawned(&self, element: Channel) -> bool {
        self.spawned.contains(&element)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn elapsed(&self) -> f64 {
        self.clock.elapsed()
    }

    pub fn last_delta(&self) -> f64 {
        self.clock.last_delta()
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut Params {
        &mut self.params
    }

    /// Read-only particle buffer for upload.
    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    pub fn timeline(&self) -> &Scheduler<TimelineAction> {
        &self.timeline
    }

    pub fn fades(&self) -> &FadeController {
        &self.fades
    }
}
