//! 32-bit RTC in the battery-backed VBAT domain.
//!
//! The counter lives behind two hurdles: the VBAT domain needs its access
//! bit and a running 32 kHz crystal before anything works, and every
//! CNT/PER/COMP access must wait out the cross-domain synchronizer. The
//! compare interrupt at level Low is what drives the timeout service tick.

use hal_api::{poll_timeout, Status, POLL_LIMIT};
use hatra::xmega::{pr, rtc32, vbat, vector};
use hatra::{periph_base, Register, CSR};

use crate::pmic::Level;
use crate::sysclk::{self, Port};

/// Backup domain condition after reset.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum VbatStatus {
    /// Domain held state through the reset.
    Ok,
    /// No backup power was present.
    NoPower,
    /// Backup domain power-on reset, all state lost.
    BackupPor,
    /// Backup domain brown-out, state suspect.
    BackupBod,
    /// The 32 kHz crystal stopped.
    XoscFail,
}

fn vbat_csr() -> CSR<u8> {
    CSR::new(periph_base::<u8>(vbat::HW_VBAT_BASE, vbat::VBAT_NUMREGS))
}

/// Classify the backup domain state, worst condition first.
pub fn vbat_status() -> VbatStatus {
    let mut v = vbat_csr();
    v.rmwf(vbat::CTRL_ACCEN, 1);
    if v.rf(vbat::STATUS_BBPWR) != 0 {
        VbatStatus::NoPower
    } else if v.rf(vbat::STATUS_BBPORF) != 0 {
        VbatStatus::BackupPor
    } else if v.rf(vbat::STATUS_BBBORF) != 0 {
        VbatStatus::BackupBod
    } else if v.rf(vbat::STATUS_XOSCFAIL) != 0 {
        VbatStatus::XoscFail
    } else {
        VbatStatus::Ok
    }
}

/// Reset the backup domain and bring up the 32 kHz crystal on its 1.024 kHz
/// tap, with the failure monitor armed.
pub fn vbat_init() -> Result<(), Status> {
    let mut v = vbat_csr();
    v.rmwf(vbat::CTRL_ACCEN, 1);
    v.rmwf(vbat::CTRL_RESET, 1);
    let ctrl = v.ms(vbat::CTRL_ACCEN, 1)
        | v.ms(vbat::CTRL_XOSCFDEN, 1)
        | v.ms(vbat::CTRL_XOSCEN, 1);
    v.wo(vbat::CTRL, ctrl);
    poll_timeout(POLL_LIMIT, || v.rf(vbat::STATUS_XOSCRDY) != 0)
}

pub struct Rtc32 {
    csr: CSR<u8>,
}

/// Alarms closer than this can fire before the synchronizer settles.
const MIN_ALARM_DISTANCE: u32 = 2;

fn write32(csr: &mut CSR<u8>, first: Register, value: u32) {
    for i in 0..4 {
        csr.wo(Register::new(first.offset() + i, 0xFF), (value >> (8 * i)) as u8);
    }
}

fn read32(csr: &CSR<u8>, first: Register) -> u32 {
    let mut value = 0u32;
    for i in 0..4 {
        value |= (csr.r(Register::new(first.offset() + i, 0xFF)) as u32) << (8 * i);
    }
    value
}

impl Rtc32 {
    pub fn new() -> Rtc32 {
        let base = periph_base::<u8>(rtc32::HW_RTC32_BASE, rtc32::RTC32_NUMREGS);
        Rtc32 { csr: CSR::new(base) }
    }

    fn wait_sync(&self) -> Result<(), Status> {
        poll_timeout(POLL_LIMIT, || self.csr.rf(rtc32::SYNCCTRL_SYNCBUSY) == 0)
    }

    /// Ungate the counter, program the wrap period, zero the count and arm
    /// the first alarm with a Low level compare interrupt.
    pub fn init(&mut self, period: u32, alarm: u32) -> Result<(), Status> {
        sysclk::enable_module(Port::Gen, pr::PR_GEN_RTC);
        self.csr.wo(rtc32::CTRL, 0);
        self.wait_sync()?;
        write32(&mut self.csr, rtc32::PER0, period);
        write32(&mut self.csr, rtc32::CNT0, 0);
        self.csr.wfo(rtc32::CTRL_ENABLE, 1);
        self.wait_sync()?;
        self.set_alarm(alarm)
    }

    pub fn is_enabled(&self) -> bool {
        self.csr.rf(rtc32::CTRL_ENABLE) != 0
    }

    /// Load a new count. The counter stops for the write and restarts after.
    pub fn set_time(&mut self, time: u32) -> Result<(), Status> {
        self.csr.wo(rtc32::CTRL, 0);
        self.wait_sync()?;
        write32(&mut self.csr, rtc32::CNT0, time);
        self.csr.wfo(rtc32::CTRL_ENABLE, 1);
        self.wait_sync()
    }

    /// Latch the live count into the readable registers and fetch it.
    pub fn get_time(&mut self) -> Result<u32, Status> {
        self.csr.wfo(rtc32::SYNCCTRL_SYNCCNT, 1);
        poll_timeout(POLL_LIMIT, || self.csr.rf(rtc32::SYNCCTRL_SYNCCNT) == 0)?;
        Ok(read32(&self.csr, rtc32::CNT0))
    }

    /// Arm the compare unit at an absolute count.
    pub fn set_alarm(&mut self, alarm: u32) -> Result<(), Status> {
        self.wait_sync()?;
        write32(&mut self.csr, rtc32::COMP0, alarm);
        self.clear_alarm();
        self.csr.rmwf(rtc32::INTCTRL_COMPINTLVL, Level::Low as u8);
        Ok(())
    }

    /// Arm the compare unit `offset` ticks from now.
    pub fn set_alarm_relative(&mut self, offset: u32) -> Result<(), Status> {
        if offset < MIN_ALARM_DISTANCE {
            return Err(Status::InvalidArg);
        }
        let now = self.get_time()?;
        self.set_alarm(now.wrapping_add(offset))
    }

    pub fn alarm_pending(&self) -> bool {
        self.csr.rf(rtc32::INTFLAGS_COMPIF) != 0
    }

    /// Acknowledge the compare flag, write one to clear.
    pub fn clear_alarm(&mut self) {
        self.csr.wo(rtc32::INTFLAGS, 1 << rtc32::INTFLAGS_COMPIF.offset());
    }

    pub fn overflow_pending(&self) -> bool {
        self.csr.rf(rtc32::INTFLAGS_OVFIF) != 0
    }

    pub fn clear_overflow(&mut self) {
        self.csr.wo(rtc32::INTFLAGS, 1 << rtc32::INTFLAGS_OVFIF.offset());
    }

    pub fn compare_vector(&self) -> usize {
        vector::RTC32_COMP
    }

    pub fn overflow_vector(&self) -> usize {
        vector::RTC32_OVF
    }
}

impl Default for Rtc32 {
    fn default() -> Self {
        Rtc32::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hatra::hosted::{self, Access, HookAction};
    use std::cell::Cell;
    use std::rc::Rc;

    // Synchronizer strobes complete immediately and the interrupt flags
    // behave write-one-to-clear against a shadow the test can raise.
    fn install_rtc_model() -> Rc<Cell<usize>> {
        let flags = Rc::new(Cell::new(0usize));
        let shadow = flags.clone();
        hosted::install_hook(
            rtc32::HW_RTC32_BASE,
            Box::new(move |off, access| {
                if off == rtc32::SYNCCTRL.offset() {
                    if let Access::Write(v) = access {
                        return HookAction::Replace(v & !(1 << rtc32::SYNCCTRL_SYNCCNT.offset()));
                    }
                }
                if off == rtc32::INTFLAGS.offset() {
                    match access {
                        Access::Read => return HookAction::Replace(shadow.get()),
                        Access::Write(v) => {
                            shadow.set(shadow.get() & !v);
                            return HookAction::Replace(shadow.get());
                        }
                    }
                }
                HookAction::Pass
            }),
        );
        flags
    }

    #[test]
    fn vbat_init_brings_up_the_oscillator() {
        hosted::install_hook(
            vbat::HW_VBAT_BASE,
            Box::new(|off, access| {
                if off == vbat::CTRL.offset() {
                    if let Access::Write(v) = access {
                        if v & (1 << vbat::CTRL_XOSCEN.offset()) != 0 {
                            hosted::poke_or(
                                vbat::HW_VBAT_BASE,
                                vbat::STATUS.offset(),
                                1 << vbat::STATUS_XOSCRDY.offset(),
                            );
                        }
                    }
                }
                HookAction::Pass
            }),
        );
        assert_eq!(vbat_init(), Ok(()));
        // access, failure monitor and oscillator enables all set
        assert_eq!(hosted::peek(vbat::HW_VBAT_BASE, vbat::CTRL.offset()), 0x15);
        hosted::remove_hook(vbat::HW_VBAT_BASE);
    }

    #[test]
    fn vbat_init_times_out_without_a_crystal() {
        assert_eq!(vbat_init(), Err(Status::Timeout));
    }

    #[test]
    fn vbat_status_ranks_conditions() {
        let base = vbat::HW_VBAT_BASE;
        hosted::poke(base, vbat::STATUS.offset(), 0x82);
        assert_eq!(vbat_status(), VbatStatus::NoPower);
        hosted::poke(base, vbat::STATUS.offset(), 0x02);
        assert_eq!(vbat_status(), VbatStatus::BackupPor);
        hosted::poke(base, vbat::STATUS.offset(), 0x04);
        assert_eq!(vbat_status(), VbatStatus::BackupBod);
        hosted::poke(base, vbat::STATUS.offset(), 0x08);
        assert_eq!(vbat_status(), VbatStatus::XoscFail);
        hosted::poke(base, vbat::STATUS.offset(), 0x10);
        assert_eq!(vbat_status(), VbatStatus::Ok);
    }

    #[test]
    fn init_programs_period_count_and_alarm() {
        let _flags = install_rtc_model();
        let mut rtc = Rtc32::new();
        rtc.init(0xFFFF_FFFF, 1000).unwrap();
        let base = rtc32::HW_RTC32_BASE;
        for i in 0..4 {
            assert_eq!(hosted::peek(base, rtc32::PER0.offset() + i), 0xFF);
            assert_eq!(hosted::peek(base, rtc32::CNT0.offset() + i), 0);
        }
        assert_eq!(hosted::peek(base, rtc32::COMP0.offset()), 0xE8);
        assert_eq!(hosted::peek(base, rtc32::COMP0.offset() + 1), 0x03);
        assert!(rtc.is_enabled());
        assert_eq!(hosted::peek(base, rtc32::INTCTRL.offset()), 1);
        assert!(sysclk::module_enabled(Port::Gen, pr::PR_GEN_RTC));
        hosted::remove_hook(base);
    }

    #[test]
    fn time_round_trips_through_the_synchronizer() {
        let _flags = install_rtc_model();
        let mut rtc = Rtc32::new();
        rtc.set_time(0x0102_0304).unwrap();
        assert_eq!(rtc.get_time(), Ok(0x0102_0304));
        assert!(rtc.is_enabled());
        hosted::remove_hook(rtc32::HW_RTC32_BASE);
    }

    #[test]
    fn relative_alarm_enforces_minimum_distance() {
        let _flags = install_rtc_model();
        let mut rtc = Rtc32::new();
        rtc.set_time(100).unwrap();
        assert_eq!(rtc.set_alarm_relative(1), Err(Status::InvalidArg));
        rtc.set_alarm_relative(5).unwrap();
        assert_eq!(hosted::peek(rtc32::HW_RTC32_BASE, rtc32::COMP0.offset()), 105);
        hosted::remove_hook(rtc32::HW_RTC32_BASE);
    }

    #[test]
    fn alarm_flag_is_write_one_to_clear() {
        let flags = install_rtc_model();
        let mut rtc = Rtc32::new();
        flags.set(0x03); // OVFIF and COMPIF raised
        assert!(rtc.alarm_pending());
        rtc.clear_alarm();
        assert!(!rtc.alarm_pending());
        assert!(rtc.overflow_pending());
        rtc.clear_overflow();
        assert!(!rtc.overflow_pending());
        hosted::remove_hook(rtc32::HW_RTC32_BASE);
    }

    #[test]
    fn stuck_synchronizer_times_out() {
        hosted::poke(rtc32::HW_RTC32_BASE, rtc32::SYNCCTRL.offset(), 1);
        let mut rtc = Rtc32::new();
        assert_eq!(rtc.set_time(42), Err(Status::Timeout));
    }
}
