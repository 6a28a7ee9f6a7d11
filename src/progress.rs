//! Per-session byte counter that watchers can poll while a copy is running.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};


/// A point-in-time view of a [`ProgressCounter`].
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct TransferProgress {
    /// Current number of bytes copied to the destination.
    pub bytes_finished: u64,

    /// Total number of bytes that must be copied to the destination.
    pub bytes_total: u64,
}


#[derive(Debug, Default)]
struct ProgressState {
    bytes_finished: AtomicU64,
    bytes_total: AtomicU64,
}


/// Shared, monotonically increasing byte counter for one copy session.
///
/// Cloning a counter yields another handle to the *same* counter, so the
/// orchestration layer can keep one clone for a reporting thread and pass
/// another into [`FileCopier::copy`][crate::FileCopier::copy].
///
/// The counter is only ever advanced by the bytes that were actually transferred,
/// in increasing offset order, so any value a watcher observes was truly reached.
/// Use a fresh counter for every session.
#[derive(Clone, Debug, Default)]
pub struct ProgressCounter {
    state: Arc<ProgressState>,
}

impl ProgressCounter {
    /// Creates a counter starting at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of bytes transferred so far.
    pub fn bytes_finished(&self) -> u64 {
        self.state.bytes_finished.load(Ordering::Acquire)
    }

    /// Size of the file being copied, or zero before a copy has started.
    pub fn bytes_total(&self) -> u64 {
        self.state.bytes_total.load(Ordering::Acquire)
    }

    /// Reads both values at once.
    pub fn snapshot(&self) -> TransferProgress {
        TransferProgress {
            bytes_finished: self.bytes_finished(),
            bytes_total: self.bytes_total(),
        }
    }

    pub(crate) fn add(&self, bytes: u64) {
        self.state.bytes_finished.fetch_add(bytes, Ordering::AcqRel);
    }

    pub(crate) fn set_total(&self, bytes_total: u64) {
        self.state
            .bytes_total
            .store(bytes_total, Ordering::Release);
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_same_counter() {
        let counter = ProgressCounter::new();
        let watcher = counter.clone();

        counter.set_total(100);
        counter.add(40);
        counter.add(2);

        assert_eq!(
            watcher.snapshot(),
            TransferProgress {
                bytes_finished: 42,
                bytes_total: 100
            }
        );
    }

    #[test]
    fn counter_is_visible_from_another_thread() {
        let counter = ProgressCounter::new();
        let writer = counter.clone();

        std::thread::spawn(move || {
            for _ in 0..1000 {
                writer.add(8);
            }
        })
        .join()
        .unwrap();

        assert_eq!(counter.bytes_finished(), 8000);
    }
}
