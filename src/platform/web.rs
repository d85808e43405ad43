//! Browser bindings
//!
//! JS owns the canvas, the form controls and `requestAnimationFrame`; it
//! calls into `WebRide` once per frame and draws the returned JSON.

use wasm_bindgen::prelude::*;

use super::Driver;
use crate::settings::Settings;
use crate::sim::TrackProfile;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    console_error_panic_hook::set_once();
    // Errors only if a logger is already installed (hot reload)
    let _ = console_log::init_with_level(log::Level::Info);
    log::info!("Coaster Ride (web) starting...");
}

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

#[wasm_bindgen]
pub struct WebRide {
    driver: Driver,
}

#[wasm_bindgen]
impl WebRide {
    /// `settings_json` may be empty for defaults
    #[wasm_bindgen(constructor)]
    pub fn new(settings_json: &str) -> Result<WebRide, JsValue> {
        let settings = if settings_json.trim().is_empty() {
            Settings::default()
        } else {
            Settings::from_json(settings_json).map_err(js_err)?
        };
        let driver = Driver::new(TrackProfile::reference(), &settings).map_err(js_err)?;
        Ok(Self { driver })
    }

    /// Advance by the frame delta in milliseconds; returns the frame as JSON
    pub fn frame(&mut self, delta_ms: f64) -> Result<String, JsValue> {
        let frame = self.driver.frame(delta_ms / 1000.0).map_err(js_err)?;
        serde_json::to_string(&frame).map_err(js_err)
    }

    pub fn set_gravity(&mut self, gravity: f64) -> Result<(), JsValue> {
        self.driver.ride_mut().set_gravity(gravity).map_err(js_err)
    }

    pub fn set_initial_speed(&mut self, initial_speed: f64) -> Result<(), JsValue> {
        self.driver
            .ride_mut()
            .set_initial_speed(initial_speed)
            .map_err(js_err)
    }

    pub fn reset_gravity(&mut self) -> Result<(), JsValue> {
        self.driver.ride_mut().reset_gravity().map_err(js_err)
    }

    pub fn reset_initial_speed(&mut self) -> Result<(), JsValue> {
        self.driver.ride_mut().reset_initial_speed().map_err(js_err)
    }

    pub fn gravity(&self) -> f64 {
        self.driver.ride().params().gravity()
    }

    pub fn initial_speed(&self) -> f64 {
        self.driver.ride().params().initial_speed()
    }

    pub fn set_time_scale(&mut self, time_scale: f64) -> Result<(), JsValue> {
        self.driver.set_time_scale(time_scale).map_err(js_err)
    }

    /// Returns the new paused state
    pub fn toggle_pause(&mut self) -> bool {
        self.driver.toggle_pause()
    }

    pub fn reset(&mut self) {
        self.driver.reset();
    }

    /// Track as flat `[x0, y0, x1, y1, ...]` for drawing
    pub fn track_polyline(&self, step: f64) -> Vec<f64> {
        self.driver
            .ride()
            .track()
            .polyline(step)
            .iter()
            .flat_map(|p| [p.x, p.y])
            .collect()
    }

    /// Equation text for the last launch: `[x(t)/y(t) line, y(x) line]`
    pub fn launch_equations(&self) -> Vec<String> {
        match self.driver.ride().last_launch() {
            Some(launch) => match launch.equation {
                Some(eq) => vec![eq.parametric.to_string(), eq.explicit.to_string()],
                None => {
                    let msg = "Projectile equation unavailable for this launch.".to_string();
                    vec![msg.clone(), msg]
                }
            },
            None => vec![
                "Launch the cart to see x(t) and y(t).".to_string(),
                "Launch the cart to see y(x).".to_string(),
            ],
        }
    }
}
