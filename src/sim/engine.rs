use std::f64::consts::FRAC_PI_2;

use crate::control::{gains_for_mass, Actuator, Pid, PidOutput, PidParams};
use crate::disturbance::{Injector, NoiseSource, RngNoise};
use crate::physics::{self, Body};
use crate::sim::recovery::RecoveryTimer;
use crate::sim::telemetry::{TelemetryLog, TelemetrySample};
use crate::state::{SimSettings, SimulationState, MAX_ANGLE, MAX_FRAME_DT, RECOVERY_DELAY, SUB_STEPS};

// ---------------------------------------------------------------------------
// Simulation engine: fixed-sub-step balance loop with crash recovery
// ---------------------------------------------------------------------------

/// The balance-loop engine. Owns every piece of mutable simulation state
/// and advances it one rendered frame at a time via [`Engine::frame`].
///
/// Single-writer by construction: every mutation goes through `&mut self`,
/// so parameter writes can never interleave with a sub-step and readers
/// only ever observe the snapshot published at the end of a frame.
pub struct Engine {
    state: SimulationState,
    pid: Pid,
    settings: SimSettings,
    motor: Actuator,
    injector: Injector,
    telemetry: TelemetryLog,
    recovery: RecoveryTimer,
    wall_time: f64, // s, accumulated unclamped frame time
}

impl Engine {
    /// Engine with ambient randomness.
    pub fn new() -> Self {
        Self::with_noise(Box::new(RngNoise::from_entropy()))
    }

    /// Engine with a reproducible randomness stream.
    pub fn seeded(seed: u64) -> Self {
        Self::with_noise(Box::new(RngNoise::seeded(seed)))
    }

    /// Engine with a caller-supplied randomness source (tests inject
    /// deterministic or silent sources here).
    pub fn with_noise(source: Box<dyn NoiseSource + Send>) -> Self {
        let mut injector = Injector::new(source);
        let tilt = injector.initial_tilt();
        Self {
            state: SimulationState { angle: tilt, measured_angle: tilt, ..Default::default() },
            pid: Pid::new(PidParams::default()),
            settings: SimSettings::default(),
            motor: Actuator::default(),
            injector,
            telemetry: TelemetryLog::default(),
            recovery: RecoveryTimer::default(),
            wall_time: 0.0,
        }
    }

    // -- published interface ------------------------------------------------

    /// Latest published snapshot.
    pub fn state(&self) -> SimulationState {
        self.state
    }

    pub fn params(&self) -> PidParams {
        self.pid.params
    }

    pub fn settings(&self) -> SimSettings {
        self.settings
    }

    pub fn telemetry(&self) -> &TelemetryLog {
        &self.telemetry
    }

    /// Replace the controller gains. Not validated; unstable gains are
    /// part of the experiment surface. Integral memory is kept.
    pub fn set_params(&mut self, params: PidParams) {
        self.pid.params = params;
    }

    /// Replace the runtime settings, clamping the mass into range.
    pub fn set_settings(&mut self, settings: SimSettings) {
        self.settings = settings.clamped();
    }

    /// Kick the robot with a one-shot force. Exactly one sub-step of the
    /// next frame sees it. No-op while crashed.
    pub fn apply_impulse(&mut self, newtons: f64) {
        if !self.state.crashed {
            self.injector.request_impulse(newtons);
        }
    }

    /// Restart from a fresh small random tilt: velocities, controller
    /// memory, motor force, and telemetry all cleared; any pending
    /// recovery timer or impulse cancelled. Gains and settings survive.
    pub fn reset(&mut self) {
        self.recovery.cancel();
        self.injector.clear_impulse();
        self.pid.reset();
        self.motor.reset();
        self.telemetry.clear();
        let tilt = self.injector.initial_tilt();
        self.state = SimulationState { angle: tilt, measured_angle: tilt, ..Default::default() };
    }

    /// Derive gains from the current robot mass and restart so the new
    /// gains are judged from a clean state. Returns the applied gains.
    pub fn auto_tune(&mut self) -> PidParams {
        let params = gains_for_mass(self.settings.robot_mass);
        self.pid.params = params;
        self.reset();
        params
    }

    // -- frame driver -------------------------------------------------------

    /// Advance one rendered frame of `wall_dt` seconds.
    ///
    /// The elapsed time is clamped to 50 ms (a stalled caller must not
    /// feed the integrator a giant step) and split into 10 equal
    /// sub-steps: measure, PID, actuator lag, disturbances, integrate,
    /// crash check. While crashed, the state is held and only the
    /// recovery timer is polled.
    pub fn frame(&mut self, wall_dt: f64) {
        self.wall_time += wall_dt.max(0.0);

        if self.state.crashed {
            if self.recovery.due(self.wall_time) {
                self.reset();
            }
            return;
        }

        let dt = wall_dt.clamp(0.0, MAX_FRAME_DT);
        let sub_dt = dt / SUB_STEPS as f64;
        let frame_start = self.state.time;

        let mut body = Body {
            angle: self.state.angle,
            angular_velocity: self.state.angular_velocity,
            ball_position: self.state.ball_position,
            ball_velocity: self.state.ball_velocity,
        };
        let mut out = PidOutput::default();
        let mut measured = self.state.measured_angle;

        for _ in 0..SUB_STEPS {
            measured = body.angle + self.injector.sensor_noise(self.settings.sensor_noise);
            out = self.pid.update(measured, body.angular_velocity, sub_dt);
            let applied = self.motor.drive(out.force, sub_dt);
            let external =
                self.injector.turbulence(self.settings.turbulence) + self.injector.take_impulse();

            physics::step(&mut body, applied, self.settings.robot_mass, external, sub_dt);

            if body.angle.abs() > MAX_ANGLE {
                // Floor hit: freeze the tip-over pose and schedule a restart.
                body.angle = FRAC_PI_2.copysign(body.angle);
                body.angular_velocity = 0.0;
                self.state.crashed = true;
                self.recovery.arm(self.wall_time + RECOVERY_DELAY);
                break;
            }
        }

        self.state.angle = body.angle;
        self.state.angular_velocity = body.angular_velocity;
        self.state.ball_position = body.ball_position;
        self.state.ball_velocity = body.ball_velocity;
        self.state.integral_error = self.pid.integral();
        self.state.last_error = out.error;
        self.state.time = frame_start + dt;
        self.state.control_output = out.force;
        self.state.effective_force = self.motor.force();
        self.state.p_term = out.p;
        self.state.i_term = out.i;
        self.state.d_term = out.d;
        self.state.measured_angle = measured;

        // Decimation: one sample per five 100 Hz ticks, judged on the
        // frame-start clock, skipped on the crash frame.
        if !self.state.crashed && (frame_start * 100.0).floor() as i64 % 5 == 0 {
            self.telemetry.push(TelemetrySample::of(&self.state));
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disturbance::{ScriptedNoise, ZeroNoise};
    use crate::state::MAX_FORCE;

    const FRAME: f64 = 1.0 / 60.0;

    /// Engine starting from a fixed tilt, everything else silent.
    fn tilted_engine(tilt_sample: f64) -> Engine {
        Engine::with_noise(Box::new(ScriptedNoise::new(vec![tilt_sample])))
    }

    #[test]
    fn stabilizes_from_small_tilt_without_disturbance() {
        // sample 0.3 -> initial tilt 0.045 rad (~2.6 deg)
        let mut engine = tilted_engine(0.3);
        assert!(engine.state().angle > 0.0);

        for _ in 0..600 {
            engine.frame(FRAME);
            let s = engine.state();
            assert!(!s.crashed, "Default gains must hold a 2.6 deg tilt");
            assert!(
                s.angle.abs() <= MAX_ANGLE,
                "Tilt {} exceeded the crash threshold mid-run",
                s.angle
            );
        }
        // Ten simulated seconds is plenty to settle.
        assert!(
            engine.state().angle.abs() < 0.01,
            "Tilt should have decayed toward upright, still at {}",
            engine.state().angle
        );
    }

    #[test]
    fn crash_latches_exactly_past_threshold() {
        let mut engine = Engine::with_noise(Box::new(ZeroNoise));
        engine.state.angle = MAX_ANGLE + 1e-6;
        engine.frame(FRAME);

        let s = engine.state();
        assert!(s.crashed, "Tilt past MAX_ANGLE must latch the crash flag");
        assert_eq!(s.angle, FRAC_PI_2, "Crash pose clamps to the +90 deg floor");
        assert_eq!(s.angular_velocity, 0.0, "Crash zeroes the angular rate");

        let mut engine = Engine::with_noise(Box::new(ZeroNoise));
        engine.state.angle = -(MAX_ANGLE + 1e-6);
        engine.frame(FRAME);
        assert_eq!(engine.state().angle, -FRAC_PI_2, "Negative tilt clamps to -90 deg");
    }

    #[test]
    fn time_freezes_while_crashed() {
        let mut engine = Engine::with_noise(Box::new(ZeroNoise));
        engine.state.angle = MAX_ANGLE + 0.01;
        engine.frame(FRAME);
        let t_crash = engine.state().time;
        assert!(t_crash > 0.0);

        // Under two seconds of wall time: still held.
        for _ in 0..30 {
            engine.frame(FRAME);
        }
        assert!(engine.state().crashed);
        assert_eq!(engine.state().time, t_crash, "Timestamp must freeze while crashed");
    }

    #[test]
    fn automatic_reset_fires_after_delay() {
        let mut engine = Engine::with_noise(Box::new(ZeroNoise));
        engine.state.angle = MAX_ANGLE + 0.01;
        engine.frame(FRAME);
        assert!(engine.state().crashed);

        // 150 frames * 1/60 s = 2.5 s of wall time, past the 2 s delay.
        for _ in 0..150 {
            engine.frame(FRAME);
        }
        let s = engine.state();
        assert!(!s.crashed, "Recovery timer should have restarted the run");
        assert!(s.angle.abs() < MAX_ANGLE);
    }

    #[test]
    fn manual_reset_cancels_pending_recovery() {
        let mut engine = Engine::with_noise(Box::new(ZeroNoise));
        engine.state.angle = MAX_ANGLE + 0.01;
        engine.frame(FRAME);
        engine.reset();
        assert!(!engine.recovery.armed(), "Reset must cancel the scheduled recovery");
        assert!(!engine.state().crashed);
        assert_eq!(engine.state().time, 0.0);
    }

    #[test]
    fn reset_clears_telemetry_and_clock() {
        let mut engine = Engine::seeded(7);
        engine.set_settings(SimSettings { sensor_noise: true, turbulence: true, robot_mass: 8.0 });
        for _ in 0..120 {
            engine.frame(FRAME);
        }
        assert!(!engine.telemetry().is_empty());

        engine.reset();
        let s = engine.state();
        assert!(engine.telemetry().is_empty(), "Reset must clear the history");
        assert_eq!(s.time, 0.0);
        assert_eq!(s.integral_error, 0.0);
        assert_eq!(s.effective_force, 0.0);
        assert_eq!(s.ball_velocity, 0.0);
        assert!(!s.crashed);
        assert!(s.angle.abs() <= 0.075, "Fresh tilt stays within the spread");
    }

    #[test]
    fn impulse_hits_exactly_one_sub_step() {
        let mut engine = Engine::with_noise(Box::new(ZeroNoise));
        engine.apply_impulse(300.0);
        engine.frame(FRAME);
        assert!(
            engine.state().angle != 0.0,
            "A 300 N kick must knock a perfectly upright robot over a bit"
        );
        assert_eq!(
            engine.injector.take_impulse(),
            0.0,
            "The kick must be consumed within the frame"
        );
    }

    #[test]
    fn impulse_ignored_while_crashed() {
        let mut engine = Engine::with_noise(Box::new(ZeroNoise));
        engine.state.angle = MAX_ANGLE + 0.01;
        engine.frame(FRAME);
        assert!(engine.state().crashed);

        engine.apply_impulse(300.0);
        assert_eq!(engine.injector.take_impulse(), 0.0, "Kicks bounce off a crashed robot");
    }

    #[test]
    fn auto_tune_is_deterministic_and_resets() {
        let mut engine = Engine::seeded(1);
        engine.set_settings(SimSettings { robot_mass: 10.0, ..Default::default() });
        for _ in 0..60 {
            engine.frame(FRAME);
        }

        let params = engine.auto_tune();
        assert_eq!(params, PidParams { kp: 800.0, ki: 25.0, kd: 150.0 });
        assert_eq!(engine.params(), params);
        assert_eq!(engine.state().time, 0.0, "Auto-tune ends in a full reset");
        assert!(engine.telemetry().is_empty());
    }

    #[test]
    fn control_output_stays_clamped_under_hostile_gains() {
        let mut engine = tilted_engine(0.4);
        engine.set_params(PidParams { kp: 1e8, ki: 1e8, kd: 1e8 });
        for _ in 0..120 {
            engine.frame(FRAME);
            let s = engine.state();
            assert!(
                s.control_output.abs() <= MAX_FORCE,
                "Commanded force {} escaped the ±{} clamp",
                s.control_output,
                MAX_FORCE
            );
            if s.crashed {
                break; // hostile gains crashing is the intended failure surface
            }
        }
    }

    #[test]
    fn mass_setting_is_clamped() {
        let mut engine = Engine::with_noise(Box::new(ZeroNoise));
        engine.set_settings(SimSettings { robot_mass: 1000.0, ..Default::default() });
        assert_eq!(engine.settings().robot_mass, crate::state::MAX_MASS);
    }

    #[test]
    fn long_frame_is_clamped_to_max_dt() {
        let mut engine = Engine::with_noise(Box::new(ZeroNoise));
        engine.frame(1.7); // e.g. the caller was backgrounded
        assert_eq!(
            engine.state().time,
            MAX_FRAME_DT,
            "Simulated time must advance by at most the frame clamp"
        );
        assert!(!engine.state().crashed, "A stalled frame must not destabilize the loop");
    }

    #[test]
    fn telemetry_is_decimated_and_ordered() {
        let mut engine = tilted_engine(0.2);
        for _ in 0..300 {
            engine.frame(FRAME);
        }
        let log = engine.telemetry();
        assert!(!log.is_empty());
        assert!(
            (log.total() as usize) < 300,
            "Telemetry must run at a decimated cadence, got {} samples",
            log.total()
        );
        let times: Vec<f64> = log.iter().map(|s| s.time).collect();
        for pair in times.windows(2) {
            assert!(pair[0] < pair[1], "Sample times must increase: {:?}", pair);
        }
    }
}
