#![cfg_attr(target_os = "none", no_std)]

//! Shared pieces every family HAL builds on: the status-code error
//! taxonomy, the bounded busy-wait, and the trait seams between drivers
//! and the components layered over them.

pub use critical_section;

/// Status codes shared by every driver.
///
/// Fallible operations return `Result<_, Status>`; the numeric values are
/// stable so callers that log or store a code get the same number on every
/// family.
#[derive(Debug, Copy, Clone, PartialEq, Eq, num_derive::FromPrimitive, num_derive::ToPrimitive)]
pub enum Status {
    Ok = 0,
    /// A busy-wait exhausted its iteration bound.
    Timeout = 1,
    /// The peripheral refused because an operation is in flight.
    Busy = 2,
    InvalidArg = 3,
    /// Addressed device did not acknowledge.
    Nack = 4,
    ArbitrationLost = 5,
    Overrun = 6,
    Unsupported = 7,
    /// The peripheral flagged an internal error condition.
    DeviceError = 8,
    /// Generic failure not covered by a more specific code.
    Error = 9,
}

/// Default iteration bound for status polls. Sized for the slowest wait in
/// the collection (a 32 kHz domain sync) at the fastest CPU clock.
pub const POLL_LIMIT: u32 = 10_000;

/// Spin until `done()` or `limit` iterations, whichever comes first.
///
/// This is the only wait primitive in the collection: no timer backing, a
/// fixed iteration bound, `Status::Timeout` on exhaustion. Keeps hosted
/// runs from hanging when a model is not wired up.
pub fn poll_timeout<F: FnMut() -> bool>(limit: u32, mut done: F) -> Result<(), Status> {
    for _ in 0..limit {
        if done() {
            return Ok(());
        }
        core::hint::spin_loop();
    }
    Err(Status::Timeout)
}

/// Single-pin operations, implemented by each family's GPIO driver.
pub trait PinOps {
    fn set_high(&mut self);
    fn set_low(&mut self);
    fn toggle(&mut self);
    fn read(&self) -> bool;

    fn set_level(&mut self, high: bool) {
        if high { self.set_high() } else { self.set_low() }
    }
}

/// One selected device on a SPI bus: the seam between component drivers
/// (serial flash) and a family SPI master or a test mock.
pub trait SpiDevice {
    fn select(&mut self);
    fn deselect(&mut self);
    /// Shift out `bytes`, discarding the read-back.
    fn write(&mut self, bytes: &[u8]) -> Result<(), Status>;
    /// Full duplex: shifts the buffer out while filling it with what the
    /// device returned.
    fn transfer(&mut self, buf: &mut [u8]) -> Result<(), Status>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::FromPrimitive;

    #[test]
    fn poll_counts_iterations() {
        let mut n = 0;
        assert_eq!(
            poll_timeout(5, || {
                n += 1;
                n == 3
            }),
            Ok(())
        );
        assert_eq!(n, 3);

        let mut m = 0;
        assert_eq!(
            poll_timeout(5, || {
                m += 1;
                false
            }),
            Err(Status::Timeout)
        );
        assert_eq!(m, 5);
    }

    #[test]
    fn status_codes_are_stable() {
        assert_eq!(Status::from_usize(1), Some(Status::Timeout));
        assert_eq!(Status::from_usize(4), Some(Status::Nack));
        assert_eq!(Status::from_usize(99), None);
    }
}
