//! System Control Interface: crystal oscillators and generic clocks.

use hal_api::{poll_timeout, Status, POLL_LIMIT};
use hatra::uc3::scif;
use hatra::{periph_base, Register, CSR};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum OscMode {
    /// External clock fed on XIN; the oscillator amplifier stays off.
    External = 0,
    Crystal = 1,
}

#[derive(Debug, Copy, Clone)]
pub struct OscConfig {
    pub frequency_hz: u32,
    pub mode: OscMode,
    /// Startup time selector, datasheet-encoded (0..=15).
    pub startup: u8,
}

/// Crystal amplifier gain band for a given frequency.
fn gain_for(frequency_hz: u32) -> u32 {
    if frequency_hz < 2_000_000 {
        0
    } else if frequency_hz < 4_000_000 {
        1
    } else if frequency_hz < 8_000_000 {
        2
    } else {
        3
    }
}

pub struct Scif {
    csr: CSR<u32>,
}

impl Scif {
    pub fn new() -> Scif {
        Scif { csr: CSR::new(periph_base::<u32>(scif::HW_SCIF_BASE, scif::SCIF_NUMREGS)) }
    }

    fn unlock(&mut self, target: Register) {
        let v = self.csr.ms(scif::UNLOCK_KEY, scif::UNLOCK_KEY_VALUE as u32)
            | self.csr.ms(scif::UNLOCK_ADDR, (target.offset() * 4) as u32);
        self.csr.wo(scif::UNLOCK, v);
    }

    /// Bring up OSC0 and, if asked, wait for the ready flag.
    pub fn start_osc0(&mut self, config: &OscConfig, wait_ready: bool) -> Result<(), Status> {
        if config.startup > 15 {
            return Err(Status::InvalidArg);
        }
        let v = self.csr.ms(scif::OSCCTRL0_MODE, config.mode as u32)
            | self.csr.ms(scif::OSCCTRL0_GAIN, gain_for(config.frequency_hz))
            | self.csr.ms(scif::OSCCTRL0_STARTUP, config.startup as u32)
            | self.csr.ms(scif::OSCCTRL0_OSCEN, 1);
        self.unlock(scif::OSCCTRL0);
        self.csr.wo(scif::OSCCTRL0, v);
        if wait_ready {
            poll_timeout(POLL_LIMIT, || self.osc0_ready())?;
        }
        Ok(())
    }

    pub fn osc0_ready(&self) -> bool {
        self.csr.rf(scif::PCLKSR_OSC0RDY) != 0
    }

    /// Bring up the 32 kHz oscillator with its 32K output enabled.
    pub fn start_osc32(&mut self, mode: OscMode, startup: u8) -> Result<(), Status> {
        if startup > 7 {
            return Err(Status::InvalidArg);
        }
        let v = self.csr.ms(scif::OSC32CTRL_MODE, mode as u32)
            | self.csr.ms(scif::OSC32CTRL_STARTUP, startup as u32)
            | self.csr.ms(scif::OSC32CTRL_EN32K, 1)
            | self.csr.ms(scif::OSC32CTRL_OSC32EN, 1);
        self.unlock(scif::OSC32CTRL);
        self.csr.wo(scif::OSC32CTRL, v);
        poll_timeout(POLL_LIMIT, || self.osc32_ready())
    }

    pub fn osc32_ready(&self) -> bool {
        self.csr.rf(scif::PCLKSR_OSC32RDY) != 0
    }

    /// Configure and enable a generic clock. `divider = None` passes the
    /// source through undivided; `Some(div)` emits `source / (2 * (div + 1))`.
    pub fn setup_gclk(&mut self, id: usize, source: u8, divider: Option<u16>) -> Result<(), Status> {
        if id >= scif::GCLKS {
            return Err(Status::InvalidArg);
        }
        let mut v = self.csr.ms(scif::GCCTRL0_OSCSEL, source as u32);
        if let Some(div) = divider {
            v |= self.csr.ms(scif::GCCTRL0_DIVEN, 1) | self.csr.ms(scif::GCCTRL0_DIV, div as u32);
        }
        self.csr.wo(scif::gcctrl(id), v);
        self.csr.wo(scif::gcctrl(id), v | self.csr.ms(scif::GCCTRL0_CEN, 1));
        Ok(())
    }

    pub fn disable_gclk(&mut self, id: usize) -> Result<(), Status> {
        if id >= scif::GCLKS {
            return Err(Status::InvalidArg);
        }
        let v = self.csr.r(scif::gcctrl(id));
        self.csr.wo(scif::gcctrl(id), self.csr.zf(scif::GCCTRL0_CEN, v));
        Ok(())
    }
}

impl Default for Scif {
    fn default() -> Self {
        Self::new()
    }
}
