use std::collections::VecDeque;

use crate::state::SimulationState;

/// How many samples the history retains before evicting the oldest.
pub const TELEMETRY_CAPACITY: usize = 150;

// ---------------------------------------------------------------------------
// Telemetry: decimated controller history for charting and export
// ---------------------------------------------------------------------------

/// One decimated projection of the simulation state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetrySample {
    pub time: f64,      // s
    pub angle_deg: f64, // deg (charts read degrees, physics radians)
    pub output: f64,    // N, commanded
    pub effective: f64, // N, delivered
    pub p: f64,         // N
    pub i: f64,         // N
    pub d: f64,         // N
}

impl TelemetrySample {
    pub fn of(state: &SimulationState) -> Self {
        Self {
            time: state.time,
            angle_deg: state.angle.to_degrees(),
            output: state.control_output,
            effective: state.effective_force,
            p: state.p_term,
            i: state.i_term,
            d: state.d_term,
        }
    }
}

/// Bounded, ordered sample history.
///
/// `total` counts every append ever made, so readers can poll
/// incrementally ("anything since n?") without the log pushing to them.
#[derive(Debug, Default)]
pub struct TelemetryLog {
    samples: VecDeque<TelemetrySample>,
    total: u64,
}

impl TelemetryLog {
    pub fn push(&mut self, sample: TelemetrySample) {
        if self.samples.len() == TELEMETRY_CAPACITY {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
        self.total += 1;
    }

    pub fn clear(&mut self) {
        self.samples.clear();
        self.total = 0;
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Appends made over the log's lifetime, including evicted ones.
    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn latest(&self) -> Option<&TelemetrySample> {
        self.samples.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TelemetrySample> {
        self.samples.iter()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
