//! Power Manager: main clock selection and per-module clock gating.
//!
//! Like its UC3 ancestor the PM write-protects its configuration space;
//! every protected write is preceded by an UNLOCK cycle carrying the 0xAA
//! key and the byte address of the target register, and the lock only
//! covers the very next write. Unlike the UC3 block there are six bus
//! masks, one per clock domain.

use hatra::sam4l::pm;
use hatra::{periph_base, Register, CSR};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Bus {
    Cpu,
    Hsb,
    Pba,
    Pbb,
    Pbc,
    Pbd,
}

/// Main clock sources, in MCCTRL.MCSEL encoding.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MainClock {
    /// System RC oscillator, the reset default.
    Rcsys = 0,
    Osc0 = 1,
    Pll = 2,
    Dfll = 3,
    Rc80m = 4,
    Rcfast = 5,
    Rc1m = 6,
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
            Bus::Pbc => pm::PBCMASK,
            Bus::Pbd => pm::PBDMASK,
        }
    }
}

impl Default for Pm {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hatra::hosted;

    #[test]
    fn module_gating_is_per_bit_and_per_bus() {
        let mut pm = Pm::new();
        pm.enable_module(Bus::Pba, pm::PBA_TRNG_BIT);
        pm.enable_module(Bus::Pbc, pm::PBC_GPIO_BIT);
        assert!(pm.is_module_enabled(Bus::Pba, pm::PBA_TRNG_BIT));
        assert!(pm.is_module_enabled(Bus::Pbc, pm::PBC_GPIO_BIT));
        assert!(!pm.is_module_enabled(Bus::Pbb, pm::PBC_GPIO_BIT));
        pm.disable_module(Bus::Pba, pm::PBA_TRNG_BIT);
        assert!(!pm.is_module_enabled(Bus::Pba, pm::PBA_TRNG_BIT));
        assert!(pm.is_module_enabled(Bus::Pbc, pm::PBC_GPIO_BIT));
    }

    #[test]
    fn masked_writes_send_the_key_first() {
        let mut pm = Pm::new();
        pm.enable_module(Bus::Pbd, 7);
        // the unlock register keeps the last key cycle; the mask took the write
        let unlock = hosted::peek(pm::HW_PM_BASE, pm::UNLOCK.offset());
        assert_eq!(unlock >> 24, pm::UNLOCK_KEY_VALUE);
        assert_eq!(unlock & 0x3FF, pm::PBDMASK.offset() * 4);
        assert_eq!(hosted::peek(pm::HW_PM_BASE, pm::PBDMASK.offset()), 1 << 7);
    }

    #[test]
    fn main_clock_select_is_protected_too() {
        let mut pm = Pm::new();
        pm.select_main_clock(MainClock::Dfll);
        assert_eq!(pm.main_clock(), MainClock::Dfll as u32);
        let unlock = hosted::peek(pm::HW_PM_BASE, pm::UNLOCK.offset());
        assert_eq!(unlock & 0x3FF, pm::MCCTRL.offset() * 4);
    }
}
