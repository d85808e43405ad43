//! Coaster Ride entry point
//!
//! Native builds run the ride headless at a fixed frame rate and print each
//! transition. The browser build is driven from JS through `platform::web`.
//!
//! Usage: `coaster-ride [settings.json] [seconds]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    if let Err(e) = native::run() {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is platform::web::wasm_start, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use anyhow::Context;

    use coaster_ride::Settings;
    use coaster_ride::consts::*;
    use coaster_ride::platform::{Driver, Frame};
    use coaster_ride::sim::{RideEvent, TrackProfile};

    const DEFAULT_SECONDS: f64 = 20.0;

    pub fn run() -> anyhow::Result<()> {
        let mut args = std::env::args().skip(1);

        let settings = match args.next() {
            Some(path) => Settings::load(&path).with_context(|| format!("loading {path}"))?,
            None => Settings::default(),
        };
        let seconds: f64 = match args.next() {
            Some(s) => s.parse().with_context(|| format!("invalid duration {s:?}"))?,
            None => DEFAULT_SECONDS,
        };

        let mut driver = Driver::new(TrackProfile::reference(), &settings)?;
        let params = driver.ride().params();
        log::info!(
            "Coaster Ride (native): g = {}, v0 = {}, energy ceiling {:.4} m, {:?}",
            params.gravity(),
            params.initial_speed(),
            params.energy_reference_height(),
            driver.ride().landing_policy()
        );

        let frames = (seconds / SIM_DT).ceil() as u64;
        let mut wall = 0.0;
        for _ in 0..frames {
            wall += SIM_DT;
            let frame = driver.frame(SIM_DT)?;
            for event in &frame.events {
                report(wall, event, &frame);
            }
        }

        let last = driver.ride().snapshot();
        let camera = driver.ride().camera_bounds();
        println!(
            "[{wall:7.2}s] end: {} at ({:.2}, {:.2}), {:.1} km/h, {:.2} Gs, view {:.1} x {:.1} m",
            last.phase.as_str(),
            last.pos.x,
            last.pos.y,
            last.speed_kph,
            last.g_force,
            camera.x_max,
            camera.y_max
        );
        Ok(())
    }

    fn report(wall: f64, event: &RideEvent, frame: &Frame) {
        let s = &frame.snapshot;
        match event {
            RideEvent::Launched(launch) => {
                println!(
                    "[{wall:7.2}s] launch at ({:.2}, {:.2}), v = ({:.2}, {:.2}) m/s after {:.2} m",
                    launch.pos.x, launch.pos.y, launch.vel.x, launch.vel.y, s.arc_length
                );
                match launch.equation {
                    Some(eq) => {
                        println!("           {}", eq.parametric);
                        println!("           {}", eq.explicit);
                    }
                    None => println!("           Projectile equation unavailable for this launch."),
                }
            }
            RideEvent::Landed { x } => {
                println!(
                    "[{wall:7.2}s] landed at x = {x:.2} after {:.2} s, {:.2} m",
                    s.ride_time, s.arc_length
                );
            }
            RideEvent::TeleportStarted => println!("[{wall:7.2}s] returning to start"),
            RideEvent::RideRestarted { ride } => println!("[{wall:7.2}s] ride {ride} begins"),
            RideEvent::Reset => println!("[{wall:7.2}s] reset"),
        }
    }
}
