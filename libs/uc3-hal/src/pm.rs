//! Power Manager: main clock selection, synchronous dividers and per-module
//! clock gating.
//!
//! Configuration registers sit behind a write-lock; every protected write is
//! preceded by an UNLOCK cycle carrying the 0xAA key and the byte address of
//! the target register. The lock only covers the very next write, so the
//! pairs here stay back to back.

use hal_api::{poll_timeout, Status, POLL_LIMIT};
use hatra::uc3::pm;
use hatra::{periph_base, Register, CSR};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Bus {
    Cpu,
    Hsb,
    Pba,
    Pbb,
}

/// Main clock sources, in MCCTRL.MCSEL encoding.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MainClock {
    /// System RC oscillator, the reset default.
    Slow = 0,
    Osc0 = 1,
    Dfll = 2,
    Rc120m = 3,
}

pub struct Pm {
    csr: CSR<u32>,
}

impl Pm {
    pub fn new() -> Pm {
        Pm { csr: CSR::new(periph_base::<u32>(pm::HW_PM_BASE, pm::PM_NUMREGS)) }
    }

    fn unlock(&mut self, target: Register) {
        let v = self.csr.ms(pm::UNLOCK_KEY, pm::UNLOCK_KEY_VALUE as u32)
            | self.csr.ms(pm::UNLOCK_ADDR, (target.offset() * 4) as u32);
        self.csr.wo(pm::UNLOCK, v);
    }

    pub fn select_main_clock(&mut self, source: MainClock) {
        self.unlock(pm::MCCTRL);
        self.csr.wfo(pm::MCCTRL_MCSEL, source as u32);
    }

    pub fn main_clock(&self) -> u32 {
        self.csr.rf(pm::MCCTRL_MCSEL)
    }

    /// Divide the CPU clock by `2^(sel + 1)`, or run undivided.
    pub fn set_cpu_divider(&mut self, divider: Option<u8>) -> Result<(), Status> {
        self.set_divider(pm::CPUSEL, divider)
    }

    pub fn set_pba_divider(&mut self, divider: Option<u8>) -> Result<(), Status> {
        self.set_divider(pm::PBASEL, divider)
    }

    pub fn set_pbb_divider(&mut self, divider: Option<u8>) -> Result<(), Status> {
        self.set_divider(pm::PBBSEL, divider)
    }

    fn set_divider(&mut self, reg: Register, divider: Option<u8>) -> Result<(), Status> {
        let value = match divider {
            None => 0,
            Some(sel) if sel <= 7 => (1 << 7) | sel as u32,
            Some(_) => return Err(Status::InvalidArg),
        };
        self.unlock(reg);
        self.csr.wo(reg, value);
        // CKRDY drops while the prescalers resynchronize
        poll_timeout(POLL_LIMIT, || self.csr.rf(pm::SR_CKRDY) != 0)
    }

    pub fn enable_module(&mut self, bus: Bus, bit: u32) {
        let reg = Self::mask_reg(bus);
        let mask = self.csr.r(reg) | (1 << bit);
        self.unlock(reg);
        self.csr.wo(reg, mask);
    }

    pub fn disable_module(&mut self, bus: Bus, bit: u32) {
        let reg = Self::mask_reg(bus);
        let mask = self.csr.r(reg) & !(1 << bit);
        self.unlock(reg);
        self.csr.wo(reg, mask);
    }

    pub fn is_module_enabled(&self, bus: Bus, bit: u32) -> bool {
        (self.csr.r(Self::mask_reg(bus)) >> bit) & 1 != 0
    }

    fn mask_reg(bus: Bus) -> Register {
        match bus {
            Bus::Cpu => pm::CPUMASK,
            Bus::Hsb => pm::HSBMASK,
            Bus::Pba => pm::PBAMASK,
            Bus::Pbb => pm::PBBMASK,
        }
    }
}

impl Default for Pm {
    fn default() -> Self {
        Self::new()
    }
}
