//! GPIO controller driver, three 32-pin ports.
//!
//! Every mutation lands in a set/clear/toggle mirror of the backing
//! register, so concurrent contexts can own different pins of one port
//! without read-modify-write races.

use bitflags::bitflags;
use hal_api::{PinOps, Status};
use hatra::sam4l::gpio;
use hatra::{periph_base, CSR};

bitflags! {
    /// Pin configuration, ASF-style combinable flags.
    pub struct PinFlags: u32 {
        const DIR_OUTPUT    = 1 << 0;
        const INIT_HIGH     = 1 << 1;
        const INIT_LOW      = 1 << 2;
        const PULL_UP       = 1 << 3;
        const GLITCH_FILTER = 1 << 4;
    }
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
        if flags.contains(PinFlags::GLITCH_FILTER) {
            self.csr.wo(gpio::GFERS, mask);
        } else {
            self.csr.wo(gpio::GFERC, mask);
        }
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

#[cfg(test)]
mod tests {
    use super::*;
    use hatra::hosted::{self, Access, HookAction};

    // Fold the set/clear/toggle mirrors into their backing registers so the
    // port behaves like silicon instead of plain memory.
    fn install_port_model(port: usize) {
        let base = gpio::port_base(port);
        hosted::install_hook(
            base,
            Box::new(move |off, access| {
                if let Access::Write(v) = access {
                    let fold = |reg: usize, set: bool, tgl: bool| {
                        let cur = hosted::peek(base, reg);
                        let new = if tgl {
                            cur ^ v
                        } else if set {
                            cur | v
                        } else {
                            cur & !v
                        };
                        hosted::poke(base, reg, new);
                    };
                    let sync_pvr =
                        || hosted::poke(base, gpio::PVR.offset(), hosted::peek(base, gpio::OVR.offset()));
                    let o = off;
                    let handled = match o {
                        _ if o == gpio::GPERS.offset() => { fold(gpio::GPER.offset(), true, false); true }
                        _ if o == gpio::GPERC.offset() => { fold(gpio::GPER.offset(), false, false); true }
                        _ if o == gpio::OVRS.offset() => { fold(gpio::OVR.offset(), true, false); sync_pvr(); true }
                        _ if o == gpio::OVRC.offset() => { fold(gpio::OVR.offset(), false, false); sync_pvr(); true }
                        _ if o == gpio::OVRT.offset() => { fold(gpio::OVR.offset(), false, true); sync_pvr(); true }
                        _ if o == gpio::ODERS.offset() => { fold(gpio::ODER.offset(), true, false); true }
                        _ if o == gpio::ODERC.offset() => { fold(gpio::ODER.offset(), false, false); true }
                        _ if o == gpio::PUERS.offset() => { fold(gpio::PUER.offset(), true, false); true }
                        _ if o == gpio::PUERC.offset() => { fold(gpio::PUER.offset(), false, false); true }
                        _ if o == gpio::GFERS.offset() => { fold(gpio::GFER.offset(), true, false); true }
                        _ if o == gpio::GFERC.offset() => { fold(gpio::GFER.offset(), false, false); true }
                        _ if o == gpio::IERS.offset() => { fold(gpio::IER.offset(), true, false); true }
                        _ if o == gpio::IERC.offset() => { fold(gpio::IER.offset(), false, false); true }
                        _ if o == gpio::IMR0S.offset() => { fold(gpio::IMR0.offset(), true, false); true }
                        _ if o == gpio::IMR0C.offset() => { fold(gpio::IMR0.offset(), false, false); true }
                        _ if o == gpio::IMR1S.offset() => { fold(gpio::IMR1.offset(), true, false); true }
                        _ if o == gpio::IMR1C.offset() => { fold(gpio::IMR1.offset(), false, false); true }
                        _ if o == gpio::IFRC.offset() => { fold(gpio::IFR.offset(), false, false); true }
                        _ => false,
                    };
                    if handled {
                        // mirror registers themselves read as zero
                        return HookAction::Replace(0);
                    }
                }
                HookAction::Pass
            }),
        );
    }

    #[test]
    fn configure_splits_drive_and_pull() {
        let mut port = GpioPort::new(0).unwrap();
        install_port_model(0);
        let base = gpio::port_base(0);
        port.configure(1 << 10, PinFlags::DIR_OUTPUT | PinFlags::INIT_HIGH);
        port.configure(1 << 3, PinFlags::PULL_UP | PinFlags::GLITCH_FILTER);
        assert_eq!(hosted::peek(base, gpio::GPER.offset()), (1 << 10) | (1 << 3));
        assert_eq!(hosted::peek(base, gpio::ODER.offset()), 1 << 10);
        assert_eq!(hosted::peek(base, gpio::OVR.offset()), 1 << 10);
        assert_eq!(hosted::peek(base, gpio::PUER.offset()), 1 << 3);
        assert_eq!(hosted::peek(base, gpio::GFER.offset()), 1 << 3);
        // reconfiguring as a plain input releases drive and pull
        port.configure(1 << 10, PinFlags::empty());
        assert_eq!(hosted::peek(base, gpio::ODER.offset()), 0);
        hosted::remove_hook(base);
    }

    #[test]
    fn output_writes_reach_the_pin_value() {
        let mut port = GpioPort::new(1).unwrap();
        install_port_model(1);
        port.configure(0xF0, PinFlags::DIR_OUTPUT | PinFlags::INIT_LOW);
        port.set_high(0x30);
        port.toggle(0x90);
        assert_eq!(port.read(), 0x30 ^ 0x90);
        hosted::remove_hook(gpio::port_base(1));
    }

    #[test]
    fn interrupt_mode_spans_both_mask_registers() {
        let mut port = GpioPort::new(2).unwrap();
        install_port_model(2);
        let base = gpio::port_base(2);
        port.enable_interrupt(1 << 3, InterruptMode::FallingEdge);
        assert_eq!(hosted::peek(base, gpio::IMR0.offset()) & (1 << 3), 0);
        assert_ne!(hosted::peek(base, gpio::IMR1.offset()) & (1 << 3), 0);
        assert_ne!(hosted::peek(base, gpio::IER.offset()) & (1 << 3), 0);
        // flag raise and W1C acknowledge
        hosted::poke_or(base, gpio::IFR.offset(), 1 << 3);
        assert_eq!(port.pending(), 1 << 3);
        port.clear_pending(1 << 3);
        assert_eq!(port.pending(), 0);
        port.disable_interrupt(1 << 3);
        assert_eq!(hosted::peek(base, gpio::IER.offset()), 0);
        hosted::remove_hook(base);
    }

    #[test]
    fn pin_trait_reads_back_through_pvr() {
        let mut pin = Pin::new(0, 27).unwrap();
        install_port_model(0);
        pin.configure(PinFlags::DIR_OUTPUT | PinFlags::INIT_LOW);
        assert!(!pin.read());
        pin.set_level(true);
        assert!(pin.read());
        pin.toggle();
        assert!(!pin.read());
        hosted::remove_hook(gpio::port_base(0));
        assert!(Pin::new(gpio::GPIO_PORTS, 0).is_err());
    }
}
