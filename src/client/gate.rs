use std::sync::atomic::{AtomicBool, Ordering};

/// Allows at most one outstanding submission.
///
/// A second caller is turned away rather than queued. The slot is freed
/// when the [`SubmissionPermit`] is dropped, whether the call succeeded,
/// failed or was abandoned.
#[derive(Debug, Default)]
pub struct SubmissionGate {
    in_flight: AtomicBool,
}

impl SubmissionGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the slot, or `None` if a submission is already running.
    pub fn try_begin(&self) -> Option<SubmissionPermit<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SubmissionPermit { gate: self })
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }
}

/// Proof that the holder owns the gate's single slot.
#[derive(Debug)]
pub struct SubmissionPermit<'a> {
    gate: &'a SubmissionGate,
}

impl Drop for SubmissionPermit<'_> {
    fn drop(&mut self) {
        self.gate.in_flight.store(false, Ordering::Release);
    }
}
