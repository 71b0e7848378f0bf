//! GPIO controller driver.
//!
//! All pin mutations go through the hardware set/clear/toggle mirrors, so
//! two contexts can drive different pins of one port without a
//! read-modify-write race.

use bitflags::bitflags;
use hal_api::{PinOps, Status};
use hatra::uc3::gpio;
use hatra::{periph_base, CSR};

bitflags! {
    /// Pin configuration, ASF-style combinable flags.
    pub struct PinFlags: u32 {
        const DIR_OUTPUT    = 1 << 0;
        const INIT_HIGH     = 1 << 1;
        const INIT_LOW      = 1 << 2;
        const PULL_UP       = 1 << 3;
        const OPEN_DRAIN    = 1 << 4;
        const GLITCH_FILTER = 1 << 5;
    }
}

/// Peripheral function multiplexed onto a pin, PMR1:PMR0 encoding.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PeripheralFunction {
    A = 0,
    B = 1,
    C = 2,
    D = 3,
}

/// What makes a pin interrupt fire, IMR1:IMR0 encoding.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum InterruptMode {
    PinChange = 0,
    RisingEdge = 1,
    FallingEdge = 2,
}

pub struct GpioPort {
    csr: CSR<u32>,
    port: usize,
}

impl GpioPort {
    pub fn new(port: usize) -> Result<GpioPort, Status> {
        if port >= gpio::GPIO_PORTS {
            return Err(Status::InvalidArg);
        }
        let base = periph_base::<u32>(gpio::port_base(port), gpio::GPIO_PORT_NUMREGS);
        Ok(GpioPort { csr: CSR::new(base), port })
    }

    pub fn port(&self) -> usize {
        self.port
    }

    /// Put the pins in `mask` under GPIO control with the given drive,
    /// pull and filter options.
    pub fn configure(&mut self, mask: u32, flags: PinFlags) {
        self.csr.wo(gpio::GPERS, mask);
        if flags.contains(PinFlags::DIR_OUTPUT) {
            if flags.contains(PinFlags::INIT_HIGH) {
                self.csr.wo(gpio::OVRS, mask);
            } else if flags.contains(PinFlags::INIT_LOW) {
                self.csr.wo(gpio::OVRC, mask);
            }
            self.csr.wo(gpio::ODERS, mask);
        } else {
            self.csr.wo(gpio::ODERC, mask);
        }
        if flags.contains(PinFlags::PULL_UP) {
            self.csr.wo(gpio::PUERS, mask);
        } else {
            self.csr.wo(gpio::PUERC, mask);
        }
        if flags.contains(PinFlags::OPEN_DRAIN) {
            self.csr.wo(gpio::ODMERS, mask);
        } else {
            self.csr.wo(gpio::ODMERC, mask);
        }
        if flags.contains(PinFlags::GLITCH_FILTER) {
            self.csr.wo(gpio::GFERS, mask);
        } else {
            self.csr.wo(gpio::GFERC, mask);
        }
    }

    /// Hand the pins in `mask` to a peripheral function and take them out
    /// of GPIO control.
    pub fn select_function(&mut self, mask: u32, function: PeripheralFunction) {
        let f = function as u32;
        if f & 1 != 0 {
            self.csr.wo(gpio::PMR0S, mask);
        } else {
            self.csr.wo(gpio::PMR0C, mask);
        }
        if f & 2 != 0 {
            self.csr.wo(gpio::PMR1S, mask);
        } else {
            self.csr.wo(gpio::PMR1C, mask);
        }
        self.csr.wo(gpio::GPERC, mask);
    }

    pub fn set_high(&mut self, mask: u32) {
        self.csr.wo(gpio::OVRS, mask);
    }

    pub fn set_low(&mut self, mask: u32) {
        self.csr.wo(gpio::OVRC, mask);
    }

    pub fn toggle(&mut self, mask: u32) {
        self.csr.wo(gpio::OVRT, mask);
    }

    pub fn read(&self) -> u32 {
        self.csr.r(gpio::PVR)
    }

    pub fn enable_interrupt(&mut self, mask: u32, mode: InterruptMode) {
        let m = mode as u32;
        if m & 1 != 0 {
            self.csr.wo(gpio::IMR0S, mask);
        } else {
            self.csr.wo(gpio::IMR0C, mask);
        }
        if m & 2 != 0 {
            self.csr.wo(gpio::IMR1S, mask);
        } else {
            self.csr.wo(gpio::IMR1C, mask);
        }
        self.csr.wo(gpio::IERS, mask);
    }

    pub fn disable_interrupt(&mut self, mask: u32) {
        self.csr.wo(gpio::IERC, mask);
    }

    pub fn pending(&self) -> u32 {
        self.csr.r(gpio::IFR)
    }

    pub fn clear_pending(&mut self, mask: u32) {
        self.csr.wo(gpio::IFRC, mask);
    }
}

/// A single claimed pin, usable wherever [`PinOps`] is accepted.
pub struct Pin {
    csr: CSR<u32>,
    mask: u32,
    port: usize,
}

impl Pin {
    pub fn new(port: usize, pin: usize) -> Result<Pin, Status> {
        if port >= gpio::GPIO_PORTS || pin >= 32 {
            return Err(Status::InvalidArg);
        }
        let base = periph_base::<u32>(gpio::port_base(port), gpio::GPIO_PORT_NUMREGS);
        Ok(Pin { csr: CSR::new(base), mask: 1 << pin, port })
    }

    pub fn configure(&mut self, flags: PinFlags) {
        let mut port = GpioPort { csr: self.csr, port: self.port };
        port.configure(self.mask, flags);
    }
}

impl PinOps for Pin {
    fn set_high(&mut self) {
        self.csr.wo(gpio::OVRS, self.mask);
    }

    fn set_low(&mut self) {
        self.csr.wo(gpio::OVRC, self.mask);
    }

    fn toggle(&mut self) {
        self.csr.wo(gpio::OVRT, self.mask);
    }

    fn read(&self) -> bool {
        self.csr.r(gpio::PVR) & self.mask != 0
    }
}
