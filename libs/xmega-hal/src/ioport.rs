//! Port driver for the byte-wide XMEGA I/O ports.
//!
//! Direction and output changes go through the hardware SET/CLR/TGL
//! mirrors, so two contexts can drive different pins of one port without a
//! read-modify-write race. Per-pin drive and sense options live in the
//! `PINnCTRL` registers.

use bitflags::bitflags;
use hal_api::{PinOps, Status};
use hatra::xmega::{port, vector};
use hatra::{periph_base, CSR};

use crate::pmic::Level;

bitflags! {
    /// Pin configuration, ASF-style combinable flags. The pull and wired
    /// options are exclusive; the strongest one named wins.
    pub struct PinFlags: u32 {
        const DIR_OUTPUT = 1 << 0;
        const INIT_HIGH  = 1 << 1;
        const INIT_LOW   = 1 << 2;
        const PULL_UP    = 1 << 3;
        const PULL_DOWN  = 1 << 4;
        const BUS_KEEPER = 1 << 5;
        const WIRED_OR   = 1 << 6;
        const WIRED_AND  = 1 << 7;
        const INVERT     = 1 << 8;
    }
}

/// Input sense configuration, `ISC` encoding. `LowLevel` keeps the
/// interrupt asserted while the pin is low; `InputDisable` drops the
/// digital input buffer entirely for analog use.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SenseMode {
    BothEdges = 0,
    Rising = 1,
    Falling = 2,
    LowLevel = 3,
    InputDisable = 7,
}

/// Port indexes with silicon behind them on the E5/B1 class parts.
const PORTS: [usize; 4] = [0, 2, 3, 15];

pub const PORTA: usize = 0;
pub const PORTC: usize = 2;
pub const PORTD: usize = 3;
pub const PORTR: usize = 15;

fn opc_bits(flags: PinFlags) -> u8 {
    if flags.contains(PinFlags::PULL_UP) {
        3
    } else if flags.contains(PinFlags::PULL_DOWN) {
        2
    } else if flags.contains(PinFlags::BUS_KEEPER) {
        1
    } else if flags.contains(PinFlags::WIRED_AND) {
        5
    } else if flags.contains(PinFlags::WIRED_OR) {
        4
    } else {
        0
    }
}

pub struct IoPort {
    csr: CSR<u8>,
    index: usize,
}

impl IoPort {
    pub fn new(index: usize) -> Result<IoPort, Status> {
        if !PORTS.contains(&index) {
            return Err(Status::InvalidArg);
        }
        let base = periph_base::<u8>(port::base(index), port::PORT_NUMREGS);
        Ok(IoPort { csr: CSR::new(base), index })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Configure every pin in `mask`. Rewrites the pin control registers,
    /// which resets the sense mode to both edges; follow with
    /// [`set_sense`](IoPort::set_sense) when the pin feeds an interrupt.
    pub fn configure(&mut self, mask: u8, flags: PinFlags) {
        let ctrl = (opc_bits(flags) << port::PIN0CTRL_OPC.offset() as u8)
            | ((flags.contains(PinFlags::INVERT) as u8) << port::PIN0CTRL_INVEN.offset() as u8);
        for pin in 0..8usize {
            if mask & (1 << pin) != 0 {
                self.csr.wo(port::pinctrl(pin), ctrl);
            }
        }
        if flags.contains(PinFlags::INIT_HIGH) {
            self.csr.wo(port::OUTSET, mask);
        } else if flags.contains(PinFlags::INIT_LOW) {
            self.csr.wo(port::OUTCLR, mask);
        }
        if flags.contains(PinFlags::DIR_OUTPUT) {
            self.csr.wo(port::DIRSET, mask);
        } else {
            self.csr.wo(port::DIRCLR, mask);
        }
    }

    /// Set the input sense of every pin in `mask`, leaving drive options
    /// alone.
    pub fn set_sense(&mut self, mask: u8, mode: SenseMode) {
        let isc_mask = port::PIN0CTRL_ISC.mask() as u8;
        for pin in 0..8usize {
            if mask & (1 << pin) != 0 {
                let reg = port::pinctrl(pin);
                let v = (self.csr.r(reg) & !isc_mask) | mode as u8;
                self.csr.wo(reg, v);
            }
        }
    }

    pub fn set_high(&mut self, mask: u8) {
        self.csr.wo(port::OUTSET, mask);
    }

    pub fn set_low(&mut self, mask: u8) {
        self.csr.wo(port::OUTCLR, mask);
    }

    pub fn toggle(&mut self, mask: u8) {
        self.csr.wo(port::OUTTGL, mask);
    }

    pub fn read(&self) -> u8 {
        self.csr.r(port::IN)
    }

    /// Route the pins in `mask` to the port's INT0 line at the given
    /// priority.
    pub fn enable_int0(&mut self, mask: u8, level: Level) {
        self.csr.wo(port::INT0MASK, mask);
        self.csr.rmwf(port::INTCTRL_INT0LVL, level as u8);
    }

    pub fn disable_int0(&mut self) {
        self.csr.wo(port::INT0MASK, 0);
        self.csr.rmwf(port::INTCTRL_INT0LVL, Level::Off as u8);
    }

    /// Pending INT0/INT1 flags, write-one-to-clear through
    /// [`clear_pending`](IoPort::clear_pending).
    pub fn pending(&self) -> u8 {
        self.csr.r(port::INTFLAGS)
    }

    pub fn clear_pending(&mut self, mask: u8) {
        self.csr.wo(port::INTFLAGS, mask);
    }

    /// Interrupt vector of this port's INT0 line, for ports the vector
    /// table carries.
    pub fn int0_vector(&self) -> Option<usize> {
        match self.index {
            0 => Some(vector::PORTA_INT0),
            2 => Some(vector::PORTC_INT0),
            _ => None,
        }
    }
}

/// A single claimed pin, usable wherever [`PinOps`] is accepted.
pub struct Pin {
    csr: CSR<u8>,
    mask: u8,
    index: usize,
}

impl Pin {
    pub fn new(index: usize, pin: usize) -> Result<Pin, Status> {
        if !PORTS.contains(&index) || pin >= 8 {
            return Err(Status::InvalidArg);
        }
        let base = periph_base::<u8>(port::base(index), port::PORT_NUMREGS);
        Ok(Pin { csr: CSR::new(base), mask: 1 << pin, index })
    }

    pub fn configure(&mut self, flags: PinFlags) {
        let mut p = IoPort { csr: self.csr, index: self.index };
        p.configure(self.mask, flags);
    }
}

impl PinOps for Pin {
    fn set_high(&mut self) {
        self.csr.wo(port::OUTSET, self.mask);
    }

    fn set_low(&mut self) {
        self.csr.wo(port::OUTCLR, self.mask);
    }

    fn toggle(&mut self) {
        self.csr.wo(port::OUTTGL, self.mask);
    }

    fn read(&self) -> bool {
        self.csr.r(port::IN) & self.mask != 0
    }
}
