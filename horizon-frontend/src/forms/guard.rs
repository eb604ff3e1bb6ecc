use dashmap::{DashMap, mapref::entry::Entry};
use std::sync::Arc;
use std::time::Instant;

/// Admission control for form submissions: at most one in flight per key.
#[derive(Clone, Default)]
pub struct SubmissionGuard {
    in_flight: Arc<DashMap<String, Instant>>,
}

impl SubmissionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the permit for `key`, or `None` while another submission holds it.
    pub fn try_acquire(&self, key: &str) -> Option<SubmissionPermit> {
        match self.in_flight.entry(key.to_string()) {
            Entry::Occupied(held) => {
                tracing::debug!(
                    form_key = key,
                    held_ms = held.get().elapsed().as_millis() as u64,
                    "Submission already in flight"
                );
                None
            }
            Entry::Vacant(slot) => {
                slot.insert(Instant::now());
                Some(SubmissionPermit {
                    key: key.to_string(),
                    in_flight: Arc::clone(&self.in_flight),
                })
            }
        }
    }

    pub fn is_held(&self, key: &str) -> bool {
        self.in_flight.contains_key(key)
    }
}

/// Released on drop.
#[must_use]
pub struct SubmissionPermit {
    key: String,
    in_flight: Arc<DashMap<String, Instant>>,
}

impl Drop for SubmissionPermit {
    fn drop(&mut self) {
        self.in_flight.remove(&self.key);
    }
}
