use crate::state::MAX_FORCE;

// ---------------------------------------------------------------------------
// PID balance controller (single axis, fixed setpoint of 0 rad)
// ---------------------------------------------------------------------------

/// Controller gains. Externally mutable and read each sub-step.
///
/// Gains are deliberately not validated: negative values are accepted and
/// will destabilize the loop, which is part of the experiment surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PidParams {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
}

impl Default for PidParams {
    fn default() -> Self {
        // Tuned against the 40 ms actuator lag: high Kp to overcome it,
        // heavy Kd to damp the oscillation the lag induces.
        Self { kp: 400.0, ki: 2.5, kd: 60.0 }
    }
}

/// One sub-step of controller output.
#[derive(Debug, Clone, Copy, Default)]
pub struct PidOutput {
    pub p: f64,     // N
    pub i: f64,     // N
    pub d: f64,     // N
    pub force: f64, // N, clamped to ±MAX_FORCE
    pub error: f64, // rad
}

/// PID controller with persistent integral memory.
#[derive(Debug, Clone)]
pub struct Pid {
    pub params: PidParams,
    integral: f64, // rad·s
}

impl Pid {
    pub fn new(params: PidParams) -> Self {
        Self { params, integral: 0.0 }
    }

    /// Compute the corrective force for one sub-step.
    ///
    /// The derivative term uses the (negated) angular rate instead of a
    /// finite difference of the error, so sensor noise is not amplified
    /// into derivative spikes.
    pub fn update(&mut self, measured_angle: f64, angular_velocity: f64, dt: f64) -> PidOutput {
        let PidParams { kp, ki, kd } = self.params;

        let error = 0.0 - measured_angle;
        self.integral += error * dt;

        // Anti-windup: bound the integral so ki * integral can never exceed
        // the motor's authority. A ki of exactly zero substitutes a
        // denominator of 1; this disables the magnitude scaling rather than
        // dividing by zero, and tuning behavior depends on it staying so.
        let windup_limit = MAX_FORCE / if ki == 0.0 { 1.0 } else { ki };
        self.integral = self.integral.min(windup_limit).max(-windup_limit);

        let derivative = -angular_velocity;

        let p = kp * error;
        let i = ki * self.integral;
        let d = kd * derivative;
        let force = (-(p + i + d)).clamp(-MAX_FORCE, MAX_FORCE);

        PidOutput { p, i, d, force, error }
    }

    pub fn integral(&self) -> f64 {
        self.integral
    }

    pub fn reset(&mut self) {
        self.integral = 0.0;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
