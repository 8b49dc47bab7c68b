use std::f64::consts::PI;

// ---------------------------------------------------------------------------
// Physical constants
// ---------------------------------------------------------------------------

pub const GRAVITY: f64 = 9.81; // m/s^2
pub const ARM_LENGTH: f64 = 0.8; // m — center of mass height above the ball
pub const ANGULAR_DRAG: f64 = 0.1; // 1/s — air resistance + bearing friction
pub const BALL_VELOCITY_DECAY: f64 = 0.995; // per sub-step rolling loss

// ---------------------------------------------------------------------------
// Control and actuation limits
// ---------------------------------------------------------------------------

pub const MAX_FORCE: f64 = 250.0; // N — motor saturation
pub const MAX_ANGLE: f64 = PI / 2.2; // rad (~82 deg) — beyond this, crash
pub const MOTOR_TIME_CONSTANT: f64 = 0.04; // s — first-order actuator lag
pub const NOISE_MAGNITUDE: f64 = 0.05; // rad — sensor noise span scale
pub const TURBULENCE_MAGNITUDE: f64 = 25.0; // N — ambient force span scale
pub const INITIAL_TILT_SPREAD: f64 = 0.15; // rad — spread of the start tilt

pub const DEFAULT_MASS: f64 = 5.0; // kg
pub const MIN_MASS: f64 = 1.0; // kg
pub const MAX_MASS: f64 = 20.0; // kg

// ---------------------------------------------------------------------------
// Loop timing
// ---------------------------------------------------------------------------

pub const MAX_FRAME_DT: f64 = 0.05; // s — clamp after a stalled frame
pub const SUB_STEPS: u32 = 10; // integrator sub-steps per frame
pub const RECOVERY_DELAY: f64 = 2.0; // s of wall time before auto-reset

// ---------------------------------------------------------------------------
// Simulation state snapshot
// ---------------------------------------------------------------------------

/// Full ballbot state at a single point in time.
///
/// Published wholesale once per frame; a copy handed out to readers is
/// never mutated afterwards.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulationState {
    pub time: f64,             // s, simulated (frozen while crashed)
    pub angle: f64,            // rad, 0 = upright
    pub angular_velocity: f64, // rad/s
    pub ball_position: f64,    // m
    pub ball_velocity: f64,    // m/s
    pub integral_error: f64,   // rad·s, controller memory
    pub last_error: f64,       // rad, most recent control error
    pub control_output: f64,   // N, PID-requested force (pre-lag)
    pub effective_force: f64,  // N, force actually applied (post-lag)
    pub p_term: f64,           // N, last sub-step breakdown
    pub i_term: f64,           // N
    pub d_term: f64,           // N
    pub measured_angle: f64,   // rad, noisy angle the controller saw
    pub crashed: bool,         // latched until reset
}

// ---------------------------------------------------------------------------
// Runtime settings
// ---------------------------------------------------------------------------

/// Externally mutable simulation settings, read each sub-step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimSettings {
    pub sensor_noise: bool,
    pub turbulence: bool,
    pub robot_mass: f64, // kg, clamped to [MIN_MASS, MAX_MASS]
}

impl SimSettings {
    /// Clamp the mass into its configured range. A zero or negative mass
    /// never reaches the physics model.
    pub fn clamped(mut self) -> Self {
        self.robot_mass = self.robot_mass.clamp(MIN_MASS, MAX_MASS);
        self
    }
}

impl Default for SimSettings {
    fn default() -> Self {
        Self {
            sensor_noise: false,
            turbulence: false,
            robot_mass: DEFAULT_MASS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mass_clamped_to_range() {
        let low = SimSettings { robot_mass: 0.0, ..Default::default() }.clamped();
        assert_eq!(low.robot_mass, MIN_MASS, "Zero mass must clamp up");

        let high = SimSettings { robot_mass: 500.0, ..Default::default() }.clamped();
        assert_eq!(high.robot_mass, MAX_MASS, "Oversized mass must clamp down");

        let ok = SimSettings { robot_mass: 7.5, ..Default::default() }.clamped();
        assert_eq!(ok.robot_mass, 7.5, "In-range mass must pass through");
    }
}
