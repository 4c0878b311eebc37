//! Frame-deferred resource reclamation
//!
//! A resource retired at frame N must outlive every GPU command submitted at
//! or before frame N. Retirement moves ownership into the queue; a later
//! sweep, driven by the host's safe-frame number, drops the resource and with
//! it the underlying handles. Retirement always happens-before the sweep that
//! observes the corresponding safe-frame value (same execution context), so
//! the safety property needs no locking.

use std::collections::BTreeMap;

/// Ordered retire/sweep queue keyed by frame counter.
///
/// Generic over the retired resource: dropping the value performs the actual
/// destruction, so anything with a destructor can be deferred.
pub struct ReclamationQueue<T> {
    retired: BTreeMap<u64, Vec<T>>,
}

impl<T> ReclamationQueue<T> {
    /// Empty queue.
    pub fn new() -> Self {
        Self {
            retired: BTreeMap::new(),
        }
    }

    /// Transfer ownership of `resource` to the queue, keyed by the frame
    /// whose commands may still reference it. Nothing is destroyed here.
    pub fn retire(&mut self, frame: u64, resource: T) {
        self.retired.entry(frame).or_default().push(resource);
    }

    /// Drop every resource retired at a frame ≤ `safe_frame`; later frames
    /// are untouched. Returns how many resources were reclaimed.
    pub fn sweep(&mut self, safe_frame: u64) -> usize {
        // BTreeMap is ordered, so only the prefix up to safe_frame is walked.
        let mut reclaimed = 0;
        while let Some((&frame, _)) = self.retired.iter().next() {
            if frame > safe_frame {
                break;
            }
            if let Some(resources) = self.retired.remove(&frame) {
                reclaimed += resources.len();
            }
        }
        if reclaimed > 0 {
            log::debug!("reclaimed {} resource(s) at safe frame {}", reclaimed, safe_frame);
        }
        reclaimed
    }

    /// Drop everything regardless of frame. Shutdown only, after the host
    /// has drained in-flight work.
    pub fn sweep_all(&mut self) -> usize {
        let reclaimed = self.retired.values().map(Vec::len).sum();
        self.retired.clear();
        reclaimed
    }

    /// Number of resources currently awaiting reclamation.
    pub fn pending(&self) -> usize {
        self.retired.values().map(Vec::len).sum()
    }
}

impl<T> Default for ReclamationQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
