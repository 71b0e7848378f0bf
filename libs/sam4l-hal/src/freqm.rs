//! Frequency meter driver.
//!
//! The block counts cycles of a selected clock over a programmed number of
//! reference-clock periods; the measured rate is then
//! `VALUE * ref_hz / duration`. The reference generator has its own
//! enable with a settling flag, polled before each measurement.

use hal_api::{poll_timeout, Status, POLL_LIMIT};
use hatra::sam4l::freqm;
use hatra::{periph_base, CSR};

/// Reference clock, MODE.REFSEL encoding.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RefClock {
    /// System RC oscillator, 115.2 kHz nominal.
    Rcsys = 0,
    /// 32.768 kHz oscillator.
    Osc32 = 1,
}

impl RefClock {
    pub fn hz(self) -> u32 {
        match self {
            RefClock::Rcsys => 115_200,
            RefClock::Osc32 => 32_768,
        }
    }
}

// CLKSEL selectors for the clocks the demos measure; the field takes the
// full datasheet table.
pub const CLK_CPU: u8 = 0;
pub const CLK_HSB: u8 = 1;
pub const CLK_PBA: u8 = 2;
pub const CLK_PBB: u8 = 3;
pub const CLK_OSC0: u8 = 6;

pub struct Freqm {
    csr: CSR<u32>,
}

impl Freqm {
    pub fn new() -> Freqm {
        Freqm { csr: CSR::new(periph_base::<u32>(freqm::HW_FREQM_BASE, freqm::FREQM_NUMREGS)) }
    }

    /// Measure `clk_sel` against `reference` over `duration` reference
    /// periods and return the rate in Hz.
    pub fn measure(&mut self, clk_sel: u8, reference: RefClock, duration: u8) -> Result<u32, Status> {
        if clk_sel > 0x1F || duration == 0 {
            return Err(Status::InvalidArg);
        }
        let mode = self.csr.ms(freqm::MODE_REFSEL, reference as u32)
            | self.csr.ms(freqm::MODE_CLKSEL, clk_sel as u32)
            | self.csr.ms(freqm::MODE_DURATION, duration as u32)
            | self.csr.ms(freqm::MODE_REFCEN, 1);
        self.csr.wo(freqm::MODE, mode);
        poll_timeout(POLL_LIMIT, || self.csr.rf(freqm::STATUS_RCLKBUSY) == 0)?;

        self.csr.wfo(freqm::CTRL_START, 1);
        poll_timeout(POLL_LIMIT, || self.csr.rf(freqm::STATUS_BUSY) == 0)?;

        let ticks = self.csr.r(freqm::VALUE) as u64;
        Ok((ticks * reference.hz() as u64 / duration as u64) as u32)
    }

    /// Shut the reference generator back down between measurements.
    pub fn disable_reference(&mut self) {
        self.csr.rmwf(freqm::MODE_REFCEN, 0);
    }
}

impl Default for Freqm {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hatra::hosted::{self, Access, HookAction};

    #[test]
    fn measurement_scales_value_by_the_reference() {
        let mut m = Freqm::new();
        // 46875 ticks in 32 periods of 32.768 kHz is a 48 MHz clock
        hosted::poke(freqm::HW_FREQM_BASE, freqm::VALUE.offset(), 46_875);
        assert_eq!(m.measure(CLK_CPU, RefClock::Osc32, 32), Ok(48_000_000));
        let mode = hosted::peek(freqm::HW_FREQM_BASE, freqm::MODE.offset());
        assert_eq!(mode, (32 << 16) | (1 << 7) | 1);
        assert_eq!(hosted::peek(freqm::HW_FREQM_BASE, freqm::CTRL.offset()), 1);
    }

    #[test]
    fn refuses_nonsense_arguments() {
        let mut m = Freqm::new();
        assert_eq!(m.measure(0x20, RefClock::Rcsys, 8), Err(Status::InvalidArg));
        assert_eq!(m.measure(CLK_CPU, RefClock::Rcsys, 0), Err(Status::InvalidArg));
    }

    #[test]
    fn stuck_reference_times_out() {
        let mut m = Freqm::new();
        hosted::install_hook(
            freqm::HW_FREQM_BASE,
            Box::new(|off, access| {
                if let Access::Read = access {
                    if off == freqm::STATUS.offset() {
                        // reference clock never settles
                        return HookAction::Replace(2);
                    }
                }
                HookAction::Pass
            }),
        );
        assert_eq!(m.measure(CLK_PBA, RefClock::Osc32, 16), Err(Status::Timeout));
        hosted::remove_hook(freqm::HW_FREQM_BASE);
    }
}
