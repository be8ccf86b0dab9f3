//! Timeline presets for the overlay variants the effect has shipped with.
//! Everything except the overlay treatment is shared.

use bang_engine::{Channel, ChannelLevels, Easing, FadeSpec, SessionConfig, TimelineEvent};

/// Seconds before the camera starts orbiting and the overlay starts changing.
const INTRO_SECS: f64 = 3.0;
const FOG_AT: f64 = 8.0;
const CLUSTER_AT: f64 = 10.0;
const OVERLAY_FADE_SECS: f64 = 4.0;

fn shared_events() -> Vec<TimelineEvent> {
    vec![
        TimelineEvent::fade(INTRO_SECS, Channel::AutoRotate, FadeSpec::new(0.0, 1.0, 5.0)),
        TimelineEvent::spawn_fading(
            FOG_AT,
            Channel::Fog,
            FadeSpec::new(0.0, 0.3, 5.0).with_easing(Easing::SineInOut),
        ),
        TimelineEvent::spawn(CLUSTER_AT, Channel::Cluster),
    ]
}

/// Overlay fully visible at launch, fades out after the intro.
pub fn fade_out() -> SessionConfig {
    let mut timeline = shared_events();
    timeline.push(TimelineEvent::fade(
        INTRO_SECS,
        Channel::Overlay,
        FadeSpec::new(1.0, 0.0, OVERLAY_FADE_SECS),
    ));
    SessionConfig::default().with_timeline(timeline)
}

/// Overlay fades in during the intro, then back out.
pub fn fade_in_out() -> SessionConfig {
    let mut timeline = shared_events();
    timeline.push(TimelineEvent::fade(0.0, Channel::Overlay, FadeSpec::new(0.0, 1.0, INTRO_SECS)));
    timeline.push(TimelineEvent::fade(
        INTRO_SECS + 2.0,
        Channel::Overlay,
        FadeSpec::new(1.0, 0.0, OVERLAY_FADE_SECS),
    ));
    SessionConfig {
        initial_levels: ChannelLevels::default().with(Channel::Overlay, 0.0),
        ..SessionConfig::default().with_timeline(timeline)
    }
}

/// Overlay stays as it is for the whole session.
pub fn static_overlay() -> SessionConfig {
    SessionConfig::default().with_timeline(shared_events())
}

/// Look up a preset by name.
pub fn by_name(name: &str) -> Option<SessionConfig> {
    match name {
        "fade_out" => Some(fade_out()),
        "fade_in_out" => Some(fade_in_out()),
        "static_overlay" => Some(static_overlay()),
        _ => None,
    }
}
