//! Clipboard Store
//!
//! The single shared clipboard value and its lock.
//!
//! ## Concurrency Model
//! One mutex guards the value. The critical section is the clone or the
//! assignment only; no network I/O happens while the lock is held.
//! `Bytes` makes the clone a refcount bump, so readers never copy the text
//! under the lock.

use bytes::Bytes;
use parking_lot::Mutex;

/// Shared clipboard access used by connection handlers
pub trait Clipboard: Send + Sync {
    /// Current value, empty if nothing was ever pushed
    fn get(&self) -> Bytes;

    /// Replace the value wholesale
    fn set(&self, value: Bytes);
}

/// In-memory clipboard, lives for the server process
#[derive(Debug, Default)]
pub struct ClipboardStore {
    value: Mutex<Bytes>,
}

impl ClipboardStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Byte length of the current value
    pub fn len(&self) -> usize {
        self.value.lock().len()
    }

    /// Whether the store holds the empty value
    pub fn is_empty(&self) -> bool {
        self.value.lock().is_empty()
    }
}

impl Clipboard for ClipboardStore {
    fn get(&self) -> Bytes {
        self.value.lock().clone()
    }

    fn set(&self, value: Bytes) {
        *self.value.lock() = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        let store = ClipboardStore::new();
        assert!(store.is_empty());
        assert_eq!(store.get(), Bytes::new());
    }

    #[test]
    fn set_replaces_wholesale() {
        let store = ClipboardStore::new();
        store.set(Bytes::from_static(b"a longer first value"));
        store.set(Bytes::from_static(b"b"));
        assert_eq!(store.get(), Bytes::from_static(b"b"));
        assert_eq!(store.len(), 1);
    }
}
