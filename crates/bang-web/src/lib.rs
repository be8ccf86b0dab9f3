pub mod runner;

pub use bang_engine;
pub use console_error_panic_hook;
pub use console_log;
pub use log;
pub use runner::{ChannelHost, SessionRunner};

/// Generate all `#[wasm_bindgen]` exports for a session.
///
/// Generates:
/// - `thread_local!` storage for the SessionRunner
/// - `with_runner()` helper function
/// - All wasm-bindgen exports (init, tick, control setters, frame accessors)
///
/// # Usage
///
/// ```ignore
/// use wasm_bindgen::prelude::*;
///
/// bang_web::export_session!(bang_engine::SessionConfig::default(), "big-bang");
/// ```
///
/// TypeScript calls `session_init(performance.now() / 1000)` once, then
/// `session_tick(performance.now() / 1000)` from `requestAnimationFrame`, and
/// reads the frame buffer at `get_frame_ptr()` (layout in
/// `bang_engine::bridge::protocol`).
///
/// # Arguments
///
/// - `$config`: An expression producing the `bang_engine::SessionConfig` to start with.
///   If it fails validation, `session_init` returns false and runs the defaults.
/// - `$name`: A string literal used in log messages
#[macro_export]
macro_rules! export_session {
    ($config:expr, $name:literal) => {
        use std::cell::RefCell;

        thread_local! {
            static RUNNER: RefCell<Option<$crate::SessionRunner>> = RefCell::new(None);
        }

        fn with_runner<R>(f: impl FnOnce(&mut $crate::SessionRunner) -> R) -> R {
            RUNNER.with(|cell| {
                let mut borrow = cell.borrow_mut();
                let runner = borrow.as_mut().expect("Session not initialized. Call session_init() first.");
                f(runner)
            })
        }

        /// Build the session and run its first frame. Returns false if the
        /// config is rejected; the defaults run in its place.
        #[wasm_bindgen]
        pub fn session_init(now: f64) -> bool {
            $crate::console_error_panic_hook::set_once();
            let _ = $crate::console_log::init_with_level($crate::log::Level::Info);

            let (runner, rejected) = match $crate::SessionRunner::new_or_default($config) {
                Ok(built) => built,
                Err(e) => {
                    $crate::log::error!("{}: {}", $name, e);
                    return false;
                }
            };
            if let Some(e) = &rejected {
                $crate::log::error!("{}: {}; running the defaults", $name, e);
            }

            RUNNER.with(|cell| {
                *cell.borrow_mut() = Some(runner);
            });

            with_runner(|r| r.init(now));
            $crate::log::info!("{}: initialized", $name);
            rejected.is_none()
        }

        #[wasm_bindgen]
        pub fn session_tick(now: f64) {
            with_runner(|r| r.tick(now));
        }

        /// Rebuild the session from a JSON config. Returns false (and keeps the
        /// current session) if the config is rejected.
        #[wasm_bindgen]
        pub fn session_load_config(json: &str, now: f64) -> bool {
            with_runner(|r| match r.load_config(json) {
                Ok(()) => {
                    r.init(now);
                    true
                }
                Err(e) => {
                    $crate::log::error!("{}: {}", $name, e);
                    false
                }
            })
        }

        // ---- Control panel ----

        #[wasm_bindgen]
        pub fn session_set_expansion_speed(value: f64) {
            with_runner(|r| r.push_control($crate::bang_engine::ControlEvent::SetExpansionSpeed(value)));
        }

        #[wasm_bindgen]
        pub fn session_set_particle_size(value: f64) {
            with_runner(|r| r.push_control($crate::bang_engine::ControlEvent::SetParticleSize(value)));
        }

        #[wasm_bindgen]
        pub fn session_set_bloom_strength(value: f64) {
            with_runner(|r| r.push_control($crate::bang_engine::ControlEvent::SetBloomStrength(value)));
        }

        #[wasm_bindgen]
        pub fn session_set_bloom_radius(value: f64) {
            with_runner(|r| r.push_control($crate::bang_engine::ControlEvent::SetBloomRadius(value)));
        }

        #[wasm_bindgen]
        pub fn session_set_bloom_threshold(value: f64) {
            with_runner(|r| r.push_control($crate::bang_engine::ControlEvent::SetBloomThreshold(value)));
        }

        // ---- Data accessors ----

        #[wasm_bindgen]
        pub fn get_frame_ptr() -> *const f32 {
            with_runner(|r| r.frame_ptr())
        }

        #[wasm_bindgen]
        pub fn get_frame_len() -> u32 {
            with_runner(|r| r.frame_len())
        }

        #[wasm_bindgen]
        pub fn get_positions_offset() -> u32 {
            with_runner(|r| r.positions_offset())
        }

        #[wasm_bindgen]
        pub fn get_particle_count() -> u32 {
            with_runner(|r| r.particle_count())
        }

        #[wasm_bindgen]
        pub fn get_elapsed() -> f64 {
            with_runner(|r| r.elapsed())
        }

        #[wasm_bindgen]
        pub fn get_channel_value(index: u32) -> f64 {
            with_runner(|r| r.channel_value(index))
        }

        #[wasm_bindgen]
        pub fn get_spawned_mask() -> u32 {
            with_runner(|r| r.spawned_mask())
        }
    };
}
