use wasm_bindgen::prelude::*;
use bang_web::{log, SessionRunner};

pub mod presets;

bang_web::export_session!(presets::fade_out(), "big-bang");

/// Swap to a named preset (`fade_out`, `fade_in_out`, `static_overlay`).
/// Unknown names keep the current session.
#[wasm_bindgen]
pub fn session_use_preset(name: &str, now: f64) -> bool {
    let Some(config) = presets::by_name(name) else {
        log::warn!("big-bang: unknown preset {:?}", name);
        return false;
    };
    with_runner(|r: &mut SessionRunner| match r.replace_config(config) {
        Ok(()) => {
            r.init(now);
            log::info!("big-bang: preset {}", name);
            true
        }
        Err(e) => {
            log::error!("big-bang: {}", e);
            false
        }
    })
}
