//! Frame pacing.
//!
//! Input handlers only mark the optics dirty. Each tick recomputes at most
//! once, however many inputs arrived since the previous tick, while the
//! scenery keeps animating every frame from the last computed result.

use std::time::Duration;

use crate::optics::{compute_dof, DofResult, LensState};

/// Display refresh period
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

#[derive(Debug, Default)]
pub struct FrameScheduler {
    pending: bool,
    last: Option<(LensState, DofResult)>,
    recomputations: u64,
}

impl FrameScheduler {
    /// Scheduler with a recomputation queued for the first frame
    pub fn new() -> Self {
        FrameScheduler {
            pending: true,
            last: None,
            recomputations: 0,
        }
    }

    /// Marks the optics as stale. Cheap enough to call on every input event.
    pub fn request_recompute(&mut self) {
        self.pending = true;
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Starts a frame, recomputing if anything changed since the last one.
    pub fn begin_frame(&mut self, lens: &LensState) -> DofResult {
        match self.last {
            Some((_, result)) if !self.pending => result,
            _ => {
                let result = compute_dof(lens);
                self.last = Some((*lens, result));
                self.pending = false;
                self.recomputations += 1;
                log::trace!("Recomputed depth of field: {:?}", result);
                result
            }
        }
    }

    /// Lens values and result from the most recent recomputation
    pub fn last(&self) -> Option<(LensState, DofResult)> {
        self.last
    }

    pub fn recomputations(&self) -> u64 {
        self.recomputations
    }
}
