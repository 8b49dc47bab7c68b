use crate::state::{ANGULAR_DRAG, ARM_LENGTH, BALL_VELOCITY_DECAY, GRAVITY};

// ---------------------------------------------------------------------------
// Equations of motion (inverted pendulum on a ball, 1-DOF tilt + 1-DOF roll)
// ---------------------------------------------------------------------------

/// Mechanical state advanced by the integrator: tilt and ball travel.
#[derive(Debug, Clone, Copy, Default)]
pub struct Body {
    pub angle: f64,            // rad, 0 = upright
    pub angular_velocity: f64, // rad/s
    pub ball_position: f64,    // m
    pub ball_velocity: f64,    // m/s
}

/// Angular acceleration of the pendulum for a given tilt and drive.
///
/// Torque balance about the ball contact point:
///   1. Gravity tips the body over (g·sinθ)
///   2. Driving the ball under the body rights it (−u·cosθ)
///   3. External forces (turbulence, impulses) act at the body
///   4. Linear drag on the angular rate
fn angular_accel(body: &Body, u: f64, mass: f64, external_force: f64) -> f64 {
    (GRAVITY * body.angle.sin() - u * body.angle.cos()) / ARM_LENGTH
        + external_force / (mass * ARM_LENGTH)
        - ANGULAR_DRAG * body.angular_velocity
}

/// Advance the body one sub-step of duration `dt` under an applied motor
/// force and an external disturbance force (both in newtons).
///
/// Semi-implicit Euler: velocity first, then position from the *new*
/// velocity. First-order but symplectic, so it stays stable at the small
/// sub-step sizes the driver uses; no error conditions.
pub fn step(body: &mut Body, applied_force: f64, mass: f64, external_force: f64, dt: f64) {
    let u = applied_force / mass;

    let alpha = angular_accel(body, u, mass, external_force);
    body.angular_velocity += alpha * dt;
    body.angle += body.angular_velocity * dt;

    body.ball_velocity += u * dt;
    body.ball_velocity *= BALL_VELOCITY_DECAY;
    body.ball_position += body.ball_velocity * dt;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
