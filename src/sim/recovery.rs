// ---------------------------------------------------------------------------
// Crash recovery timer: one-shot, cancellable, polled by the driver
// ---------------------------------------------------------------------------

/// Deadline on the wall-time axis after which a crashed run restarts.
///
/// Not a blocking sleep: the driver polls `due` once per frame while the
/// physics is held. Arming while armed replaces the deadline, so a crash
/// following an un-fired timer can never leave a stale reset behind.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecoveryTimer {
    deadline: Option<f64>, // s, wall time
}

impl RecoveryTimer {
    /// Schedule (or reschedule) the reset.
    pub fn arm(&mut self, at: f64) {
        self.deadline = Some(at);
    }

    /// Cancel any pending reset. Idempotent.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// True once `now` has passed the deadline. Does not disarm; the
    /// reset path cancels explicitly.
    pub fn due(&self, now: f64) -> bool {
        matches!(self.deadline, Some(at) if now >= at)
    }
}
