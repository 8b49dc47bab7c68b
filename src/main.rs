use ballbot_sim::io::csv;
use ballbot_sim::sim::Engine;
use ballbot_sim::state::{SimSettings, MAX_FORCE};

const FRAME_DT: f64 = 1.0 / 60.0;
const FPS: usize = 60;

fn main() {
    // -----------------------------------------------------------------------
    // Scenario: balance, survive a shove, get smashed over, recover
    // -----------------------------------------------------------------------
    let mut engine = Engine::seeded(2024);
    engine.set_settings(SimSettings {
        sensor_noise: true,
        turbulence: true,
        robot_mass: 5.0,
    });

    let params = engine.params();
    let settings = engine.settings();

    println!();
    println!("====================================================================");
    println!("  BALLBOT BALANCE SIMULATION — closed-loop PID");
    println!("====================================================================");
    println!();
    println!("  Configuration");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!(
        "  Kp:            {:>8.1}       Ki:           {:>8.1}",
        params.kp, params.ki
    );
    println!(
        "  Kd:            {:>8.1}       Mass:         {:>8.1} kg",
        params.kd, settings.robot_mass
    );
    println!(
        "  Max force:     {:>8.0} N     Sensor noise: {:>8}",
        MAX_FORCE,
        if settings.sensor_noise { "on" } else { "off" }
    );
    println!(
        "  Frame rate:    {:>8} Hz    Turbulence:   {:>8}",
        FPS,
        if settings.turbulence { "on" } else { "off" }
    );
    println!();

    println!("  Run Log");
    println!("  ──────────────────────────────────────────────────────────────────");

    let mut was_crashed = false;
    let mut crash_count = 0u32;
    let mut max_tilt = engine.state().angle.abs();
    let mut max_force = 0.0_f64;

    // 20 seconds of wall time at 60 fps.
    for frame in 0..(20 * FPS) {
        let wall_t = frame as f64 * FRAME_DT;

        // A polite shove at 5 s, a knockout blow at 12 s.
        if frame == 5 * FPS {
            engine.apply_impulse(300.0);
            println!("  t={:>5.1}s  IMPULSE   +300 N shove", wall_t);
        }
        if frame == 12 * FPS {
            engine.apply_impulse(1500.0);
            println!("  t={:>5.1}s  IMPULSE   +1500 N smash", wall_t);
        }

        engine.frame(FRAME_DT);
        let s = engine.state();

        if s.crashed && !was_crashed {
            crash_count += 1;
            println!(
                "  t={:>5.1}s  CRASH     tilt hit the floor, restart in 2 s",
                wall_t
            );
        }
        if !s.crashed && was_crashed {
            println!(
                "  t={:>5.1}s  RECOVERED fresh start at {:+.3} rad",
                wall_t, s.angle
            );
        }
        was_crashed = s.crashed;

        if !s.crashed {
            max_tilt = max_tilt.max(s.angle.abs());
            max_force = max_force.max(s.effective_force.abs());
        }
    }
    println!();

    // -----------------------------------------------------------------------
    // Summary
    // -----------------------------------------------------------------------
    let s = engine.state();
    println!("  Summary");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!(
        "  Final tilt:    {:>8.3} deg   Final ball pos: {:>7.2} m",
        s.angle.to_degrees(),
        s.ball_position
    );
    println!(
        "  Max tilt:      {:>8.1} deg   Max motor force:{:>7.1} N",
        max_tilt.to_degrees(),
        max_force
    );
    println!(
        "  Crashes:       {:>8}       Sim time:       {:>7.2} s",
        crash_count, s.time
    );
    println!(
        "  Telemetry:     {:>8} samples retained ({} recorded)",
        engine.telemetry().len(),
        engine.telemetry().total()
    );
    println!();

    // -----------------------------------------------------------------------
    // Telemetry table (sampled)
    // -----------------------------------------------------------------------
    println!("  Telemetry");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!(
        "  {:>7}  {:>9}  {:>9}  {:>9}  {:>8}  {:>8}  {:>8}",
        "t (s)", "tilt(deg)", "cmd (N)", "motor(N)", "P", "I", "D"
    );
    println!("  {}", "─".repeat(66));

    let every = (engine.telemetry().len() / 20).max(1);
    for (n, sample) in engine.telemetry().iter().enumerate() {
        if n % every != 0 {
            continue;
        }
        println!(
            "  {:>7.2}  {:>9.2}  {:>9.1}  {:>9.1}  {:>8.1}  {:>8.1}  {:>8.1}",
            sample.time, sample.angle_deg, sample.output, sample.effective,
            sample.p, sample.i, sample.d,
        );
    }
    println!();

    if let Some(path) = std::env::args().nth(1) {
        match csv::write_telemetry_file(&path, engine.telemetry()) {
            Ok(()) => println!("  Telemetry written to {}", path),
            Err(e) => eprintln!("  Failed to write {}: {}", path, e),
        }
        println!();
    }

    println!("====================================================================");
    println!();
}
