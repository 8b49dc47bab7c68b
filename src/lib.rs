pub mod control;
pub mod disturbance;
pub mod io;
pub mod physics;
pub mod sim;
pub mod state;

pub use control::{gains_for_mass, Pid, PidParams};
pub use disturbance::{NoiseSource, RngNoise, ScriptedNoise, ZeroNoise};
pub use sim::{Engine, TelemetryLog, TelemetrySample};
pub use state::{SimSettings, SimulationState};
