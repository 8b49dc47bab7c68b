use crate::state::MOTOR_TIME_CONSTANT;

// ---------------------------------------------------------------------------
// Actuator lag: first-order motor response model
// ---------------------------------------------------------------------------

/// First-order low-pass filter between the commanded and delivered force.
///
/// Models finite motor bandwidth (τ = 40 ms). Without the lag a pure-P
/// controller balances trivially; with it the loop oscillates or diverges
/// unless damped, which is the behavior the simulation exists to show.
#[derive(Debug, Clone, Copy, Default)]
pub struct Actuator {
    force: f64, // N, currently delivered
}

impl Actuator {
    /// Move the delivered force toward `desired` over one sub-step and
    /// return the new value. Monotone and non-overshooting for dt < τ.
    pub fn drive(&mut self, desired: f64, dt: f64) -> f64 {
        self.force += (desired - self.force) * (dt / MOTOR_TIME_CONSTANT);
        self.force
    }

    pub fn force(&self) -> f64 {
        self.force
    }

    pub fn reset(&mut self) {
        self.force = 0.0;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converges_monotonically_without_overshoot() {
        let mut motor = Actuator::default();
        let target = 200.0;
        let dt = 0.005; // dt/τ = 0.125

        let mut prev = motor.force();
        for _ in 0..500 {
            let f = motor.drive(target, dt);
            assert!(f >= prev, "Step response must be monotone, {} < {}", f, prev);
            assert!(f <= target, "First-order filter must never overshoot, got {}", f);
            prev = f;
        }
        assert!(
            (motor.force() - target).abs() < 1e-3,
            "Filter should have converged, got {}",
            motor.force()
        );
    }

    #[test]
    fn symmetric_for_negative_targets() {
        let mut motor = Actuator::default();
        let f = motor.drive(-100.0, 0.004);
        assert!((f - (-10.0)).abs() < 1e-12, "One step moves dt/τ of the gap");
    }

    #[test]
    fn reset_zeroes_delivered_force() {
        let mut motor = Actuator::default();
        motor.drive(50.0, 0.01);
        motor.reset();
        assert_eq!(motor.force(), 0.0);
    }
}
