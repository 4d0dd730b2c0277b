//! In-flight submission guards
//!
//! The generation and payment endpoints are not idempotent: submitting the
//! same request twice creates duplicate receipts or double-applied payments.
//! Each mutating operation on the adapter owns an `InFlightGuard`; a second
//! call while one is in flight gets `PortError::Conflict` instead of a
//! second request. The guard is advisory and strictly per-process.

use std::sync::atomic::{AtomicBool, Ordering};

use core_kernel::PortError;

/// Single-admission gate for one operation
#[derive(Debug, Default)]
pub struct InFlightGuard {
    busy: AtomicBool,
}

impl InFlightGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attempts to enter the guarded section. The returned permit releases
    /// the guard on drop, including on early `?` returns.
    pub fn try_begin(&self, operation: &str) -> Result<InFlightPermit<'_>, PortError> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            return Err(PortError::conflict(format!(
                "{operation} ya está en curso"
            )));
        }
        Ok(InFlightPermit { guard: self })
    }

    /// Whether an operation currently holds the guard
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// RAII permit for a guarded operation
#[derive(Debug)]
pub struct InFlightPermit<'a> {
    guard: &'a InFlightGuard,
}

impl Drop for InFlightPermit<'_> {
    fn drop(&mut self) {
        self.guard.busy.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_entry_conflicts() {
        let guard = InFlightGuard::new();
        let permit = guard.try_begin("generar recibos").unwrap();

        let second = guard.try_begin("generar recibos");
        assert!(matches!(second, Err(PortError::Conflict { .. })));

        drop(permit);
        assert!(guard.try_begin("generar recibos").is_ok());
    }

    #[test]
    fn test_permit_releases_on_drop() {
        let guard = InFlightGuard::new();
        {
            let _permit = guard.try_begin("registrar pago").unwrap();
            assert!(guard.is_busy());
        }
        assert!(!guard.is_busy());
    }
}
