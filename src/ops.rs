//! Single-operation mutual exclusion.
//!
//! The bookmark store is exclusively owned for the duration of one
//! high-level operation. Instead of a loose boolean flag, the gate is an
//! explicit state machine guarded by one compare-and-set: a second
//! request while any operation is active is rejected immediately and
//! never queued. Anything reacting to store-change events can consult
//! `current()` and stay quiet while the gate is not idle.

use std::sync::atomic::{AtomicU8, Ordering};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Operation {
    Idle = 0,
    Uploading = 1,
    Downloading = 2,
    Clearing = 3,
    Deduplicating = 4,
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Idle => "idle",
            Operation::Uploading => "uploading",
            Operation::Downloading => "downloading",
            Operation::Clearing => "clearing",
            Operation::Deduplicating => "deduplicating",
        }
    }

    fn from_u8(raw: u8) -> Operation {
        match raw {
            1 => Operation::Uploading,
            2 => Operation::Downloading,
            3 => Operation::Clearing,
            4 => Operation::Deduplicating,
            _ => Operation::Idle,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("another operation is already running: {0}")]
pub struct BusyError(pub &'static str);

/// 防止重复操作的锁
#[derive(Debug, Default)]
pub struct OperationGate {
    state: AtomicU8,
}

impl OperationGate {
    pub const fn new() -> Self {
        Self {
            state: AtomicU8::new(Operation::Idle as u8),
        }
    }

    /// Transition Idle → `op`, or fail fast naming the active operation.
    /// The returned guard resets the gate to Idle when dropped, on the
    /// error paths included.
    pub fn begin(&self, op: Operation) -> Result<OperationGuard<'_>, BusyError> {
        debug_assert!(op != Operation::Idle);
        match self.state.compare_exchange(
            Operation::Idle as u8,
            op as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            Ok(_) => Ok(OperationGuard { gate: self }),
            Err(active) => Err(BusyError(Operation::from_u8(active).name())),
        }
    }

    pub fn current(&self) -> Operation {
        Operation::from_u8(self.state.load(Ordering::Acquire))
    }
}

#[derive(Debug)]
pub struct OperationGuard<'a> {
    gate: &'a OperationGate,
}

impl Drop for OperationGuard<'_> {
    fn drop(&mut self) {
        self.gate
            .state
            .store(Operation::Idle as u8, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_operation_is_rejected_while_one_runs() {
        let gate = OperationGate::new();
        let guard = gate.begin(Operation::Uploading).unwrap();
        assert_eq!(gate.current(), Operation::Uploading);

        let err = gate.begin(Operation::Downloading).unwrap_err();
        assert_eq!(err, BusyError("uploading"));
        drop(guard);
    }

    #[test]
    fn dropping_the_guard_releases_the_gate() {
        let gate = OperationGate::new();
        {
            let _guard = gate.begin(Operation::Clearing).unwrap();
        }
        assert_eq!(gate.current(), Operation::Idle);
        assert!(gate.begin(Operation::Downloading).is_ok());
    }

    #[test]
    fn guard_releases_on_error_paths_too() {
        let gate = OperationGate::new();
        let result: Result<(), ()> = (|| {
            let _guard = gate.begin(Operation::Deduplicating).unwrap();
            Err(())
        })();
        assert!(result.is_err());
        assert_eq!(gate.current(), Operation::Idle);
    }
}
