pub mod engine;
pub mod recovery;
pub mod telemetry;

pub use engine::Engine;
pub use recovery::RecoveryTimer;
pub use telemetry::{TelemetryLog, TelemetrySample, TELEMETRY_CAPACITY};
