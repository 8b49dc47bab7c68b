use super::pid::PidParams;

// ---------------------------------------------------------------------------
// Auto-tune heuristic: gains from robot mass
// ---------------------------------------------------------------------------

/// Suggest PID gains for a given robot mass using fixed linear ratios,
/// each rounded to one decimal.
///
/// This is a starting-point heuristic, not Ziegler-Nichols or any other
/// model-based rule: heavier robots need proportionally more authority
/// against the same 40 ms lag. Callers are expected to reset the loop
/// afterwards so the new gains are judged from a clean state.
pub fn gains_for_mass(mass: f64) -> PidParams {
    PidParams {
        kp: round1(mass * 80.0),
        ki: round1(mass * 2.5),
        kd: round1(mass * 15.0),
    }
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ten_kilogram_reference_gains() {
        let p = gains_for_mass(10.0);
        assert_eq!(p.kp, 800.0);
        assert_eq!(p.ki, 25.0);
        assert_eq!(p.kd, 150.0);
    }

    #[test]
    fn default_mass_reproduces_default_kp() {
        let p = gains_for_mass(5.0);
        assert_eq!(p.kp, 400.0, "5 kg robot should get the stock kp");
        assert_eq!(p.ki, 12.5);
        assert_eq!(p.kd, 75.0);
    }

    #[test]
    fn gains_round_to_one_decimal() {
        let p = gains_for_mass(3.33);
        assert_eq!(p.kp, 266.4);
        assert_eq!(p.ki, 8.3);
        assert_eq!(p.kd, 50.0);
    }
}
