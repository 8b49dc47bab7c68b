use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::state::{INITIAL_TILT_SPREAD, NOISE_MAGNITUDE, TURBULENCE_MAGNITUDE};

// ---------------------------------------------------------------------------
// Pluggable randomness
// ---------------------------------------------------------------------------

/// Source of uniform randomness for noise, turbulence, and start tilt.
///
/// `sample` returns a value in [-0.5, 0.5). Pluggable so tests can supply
/// deterministic sequences instead of the ambient RNG.
pub trait NoiseSource {
    fn sample(&mut self) -> f64;
}

/// Production source backed by a seedable PRNG.
pub struct RngNoise {
    rng: StdRng,
}

impl RngNoise {
    pub fn seeded(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }

    pub fn from_entropy() -> Self {
        Self { rng: StdRng::from_entropy() }
    }
}

impl NoiseSource for RngNoise {
    fn sample(&mut self) -> f64 {
        self.rng.gen_range(-0.5..0.5)
    }
}

/// Silent source: no noise, no turbulence, zero start tilt.
pub struct ZeroNoise;

impl NoiseSource for ZeroNoise {
    fn sample(&mut self) -> f64 {
        0.0
    }
}

/// Replays a fixed sequence, cycling. For tests.
pub struct ScriptedNoise {
    values: Vec<f64>,
    next: usize,
}

impl ScriptedNoise {
    pub fn new(values: Vec<f64>) -> Self {
        assert!(!values.is_empty(), "scripted sequence must not be empty");
        Self { values, next: 0 }
    }
}

impl NoiseSource for ScriptedNoise {
    fn sample(&mut self) -> f64 {
        let v = self.values[self.next];
        self.next = (self.next + 1) % self.values.len();
        v
    }
}

// ---------------------------------------------------------------------------
// Disturbance injector
// ---------------------------------------------------------------------------

/// Produces every non-deterministic input to the loop: sensor noise,
/// ambient turbulence, the randomized start tilt, and one-shot impulses.
pub struct Injector {
    source: Box<dyn NoiseSource + Send>,
    impulse: f64, // N, pending one-shot kick
}

impl Injector {
    pub fn new(source: Box<dyn NoiseSource + Send>) -> Self {
        Self { source, impulse: 0.0 }
    }

    /// Sensor noise in radians for one sub-step, fresh each call.
    pub fn sensor_noise(&mut self, enabled: bool) -> f64 {
        if enabled {
            self.source.sample() * NOISE_MAGNITUDE
        } else {
            0.0
        }
    }

    /// Ambient turbulence force in newtons for one sub-step.
    pub fn turbulence(&mut self, enabled: bool) -> f64 {
        if enabled {
            self.source.sample() * TURBULENCE_MAGNITUDE
        } else {
            0.0
        }
    }

    /// Randomized small tilt for a fresh run.
    pub fn initial_tilt(&mut self) -> f64 {
        self.source.sample() * INITIAL_TILT_SPREAD
    }

    /// Request a one-shot kick. Overwrites any not-yet-consumed request.
    pub fn request_impulse(&mut self, newtons: f64) {
        self.impulse = newtons;
    }

    /// Consume the pending impulse. Exactly one sub-step sees a non-zero
    /// value per request; every later call returns 0 until the next request.
    pub fn take_impulse(&mut self) -> f64 {
        std::mem::take(&mut self.impulse)
    }

    /// Drop any pending impulse (used on reset).
    pub fn clear_impulse(&mut self) {
        self.impulse = 0.0;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn impulse_is_one_shot() {
        let mut inj = Injector::new(Box::new(ZeroNoise));
        inj.request_impulse(300.0);
        assert_eq!(inj.take_impulse(), 300.0, "First take sees the kick");
        assert_eq!(inj.take_impulse(), 0.0, "Second take must see nothing");
        assert_eq!(inj.take_impulse(), 0.0);
    }

    #[test]
    fn disabled_channels_are_silent() {
        let mut inj = Injector::new(Box::new(ScriptedNoise::new(vec![0.5])));
        assert_eq!(inj.sensor_noise(false), 0.0);
        assert_eq!(inj.turbulence(false), 0.0);
    }

    #[test]
    fn enabled_channels_scale_the_source() {
        let mut inj = Injector::new(Box::new(ScriptedNoise::new(vec![0.4, -0.2])));
        assert!((inj.sensor_noise(true) - 0.4 * NOISE_MAGNITUDE).abs() < 1e-12);
        assert!((inj.turbulence(true) - (-0.2) * TURBULENCE_MAGNITUDE).abs() < 1e-12);
    }

    #[test]
    fn scripted_source_cycles() {
        let mut s = ScriptedNoise::new(vec![0.1, 0.2]);
        assert_eq!(s.sample(), 0.1);
        assert_eq!(s.sample(), 0.2);
        assert_eq!(s.sample(), 0.1, "Sequence wraps around");
    }

    #[test]
    fn seeded_rng_is_reproducible() {
        let mut a = RngNoise::seeded(42);
        let mut b = RngNoise::seeded(42);
        for _ in 0..32 {
            let (x, y) = (a.sample(), b.sample());
            assert_eq!(x, y, "Same seed must yield the same stream");
            assert!((-0.5..0.5).contains(&x), "Sample {} outside [-0.5, 0.5)", x);
        }
    }
}
