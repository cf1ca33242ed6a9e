//! Sensor Stream Cells
//!
//! Single-value cells shared between one background listener task (the
//! writer) and the update loop (the reader). Reads are non-blocking
//! snapshots; a cell is absent until the first message arrives.

use std::sync::RwLock;
use std::time::SystemTime;

/// A value together with the instant it was last written.
#[derive(Debug, Clone, PartialEq)]
pub struct Stamped<T> {
    pub value: T,
    pub updated_at: SystemTime,
}

/// Thread-safe single-value cell for one sensor stream.
///
/// Single-writer / multi-reader: the owning listener calls [`set`],
/// consumers call [`get`] or [`take`]. Neither side ever waits for the
/// other beyond the lock itself.
///
/// [`set`]: SensorCell::set
/// [`get`]: SensorCell::get
/// [`take`]: SensorCell::take
#[derive(Debug)]
pub struct SensorCell<T> {
    inner: RwLock<Option<Stamped<T>>>,
}

impl<T: Clone> SensorCell<T> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(None),
        }
    }

    /// Replace the current value and its timestamp.
    pub fn set(&self, value: T) {
        let mut slot = self.inner.write().unwrap();
        *slot = Some(Stamped {
            value,
            updated_at: SystemTime::now(),
        });
    }

    /// Snapshot the current value, if any.
    pub fn get(&self) -> Option<T> {
        self.inner.read().unwrap().as_ref().map(|s| s.value.clone())
    }

    /// Snapshot the current value together with its write timestamp.
    pub fn snapshot(&self) -> Option<Stamped<T>> {
        self.inner.read().unwrap().clone()
    }

    /// Atomically read and clear the cell.
    ///
    /// Used for one-shot signals (lightning): once consumed, the event
    /// cannot be re-processed on a later cycle.
    pub fn take(&self) -> Option<T> {
        self.inner.write().unwrap().take().map(|s| s.value)
    }

    pub fn is_present(&self) -> bool {
        self.inner.read().unwrap().is_some()
    }
}

impl<T: Clone> Default for SensorCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn absent_until_first_write() {
        let cell: SensorCell<f64> = SensorCell::new();
        assert!(!cell.is_present());
        assert_eq!(cell.get(), None);

        cell.set(42.0);
        assert!(cell.is_present());
        assert_eq!(cell.get(), Some(42.0));
    }

    #[test]
    fn get_does_not_consume() {
        let cell = SensorCell::new();
        cell.set(7.5);
        assert_eq!(cell.get(), Some(7.5));
        assert_eq!(cell.get(), Some(7.5));
    }

    #[test]
    fn take_clears_the_cell() {
        let cell = SensorCell::new();
        cell.set(12.0);
        assert_eq!(cell.take(), Some(12.0));
        assert_eq!(cell.take(), None);
        assert!(!cell.is_present());
    }

    #[test]
    fn set_replaces_value_and_timestamp() {
        let cell = SensorCell::new();
        cell.set(1.0);
        let first = cell.snapshot().unwrap();
        cell.set(2.0);
        let second = cell.snapshot().unwrap();

        assert_eq!(second.value, 2.0);
        assert!(second.updated_at >= first.updated_at);
    }

    #[test]
    fn concurrent_writer_and_readers() {
        let cell = Arc::new(SensorCell::new());

        let writer = {
            let cell = cell.clone();
            std::thread::spawn(move || {
                for i in 0..1000 {
                    cell.set(i as f64);
                }
            })
        };

        let reader = {
            let cell = cell.clone();
            std::thread::spawn(move || {
                for _ in 0..1000 {
                    // Any snapshot is either absent or a value the writer produced.
                    if let Some(v) = cell.get() {
                        assert!((0.0..1000.0).contains(&v));
                    }
                }
            })
        };

        writer.join().unwrap();
        reader.join().unwrap();
    }
}
