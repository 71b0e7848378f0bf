//! Timer/Counter 0 driver for the C and D port instances.
//!
//! The bring-up order is fixed: critical section around the clock gate,
//! then the Idle sleep lock. Waveform generation drives the CC channels
//! once they are enabled in CTRLB, and all 16-bit registers are accessed
//! low byte first so the hardware TEMP latch pairs the halves.

use core::cell::RefCell;

use critical_section::Mutex;
use hal_api::Status;
use hatra::xmega::{pr, tc0, vector};
use hatra::{periph_base, CSR};

use crate::pmic::Level;
use crate::sysclk::{self, Port};

/// Counter clock, `CLKSEL` encoding. Values 8 and up tick from an event
/// channel instead of the prescaled peripheral clock.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ClockSelect {
    Off = 0,
    Div1 = 1,
    Div2 = 2,
    Div4 = 3,
    Div8 = 4,
    Div64 = 5,
    Div256 = 6,
    Div1024 = 7,
    EvCh0 = 8,
    EvCh1 = 9,
    EvCh2 = 10,
    EvCh3 = 11,
    EvCh4 = 12,
    EvCh5 = 13,
    EvCh6 = 14,
    EvCh7 = 15,
}

/// Waveform generation mode, `WGMODE` encoding.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum WaveformMode {
    Normal = 0,
    Frequency = 1,
    SingleSlope = 3,
    DualSlopeTop = 5,
    DualSlopeBoth = 6,
    DualSlopeBottom = 7,
}

/// Command strobe, `CMD` encoding in CTRLFSET.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Command {
    None = 0,
    Update = 1,
    Restart = 2,
    Reset = 3,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Channel {
    A = 0,
    B = 1,
    C = 2,
    D = 3,
}

bitflags::bitflags! {
    /// Compare/capture enables, the CTRLB high nibble.
    pub struct CcChannels: u8 {
        const A = 1 << 4;
        const B = 1 << 5;
        const C = 1 << 6;
        const D = 1 << 7;
    }
}

pub type Callback = fn();

const EV_OVF: usize = 0;
const EV_ERR: usize = 1;
const EV_CC: usize = 2; // CCA..CCD occupy 2..=5

static CALLBACKS: Mutex<RefCell<[[Option<Callback>; 6]; 2]>> =
    Mutex::new(RefCell::new([[None; 6]; 2]));

fn run_callback(instance: usize, event: usize) {
    let cb = critical_section::with(|cs| CALLBACKS.borrow(cs).borrow()[instance][event]);
    if let Some(cb) = cb {
        cb();
    }
}

// ISR entries in pmic handler shape, one per TCC0 vector.
pub fn tcc0_ovf_isr(_vector: usize, _arg: *mut usize) {
    run_callback(0, EV_OVF);
}
pub fn tcc0_err_isr(_vector: usize, _arg: *mut usize) {
    run_callback(0, EV_ERR);
}
pub fn tcc0_cca_isr(_vector: usize, _arg: *mut usize) {
    run_callback(0, EV_CC);
}
pub fn tcc0_ccb_isr(_vector: usize, _arg: *mut usize) {
    run_callback(0, EV_CC + 1);
}
pub fn tcc0_ccc_isr(_vector: usize, _arg: *mut usize) {
    run_callback(0, EV_CC + 2);
}
pub fn tcc0_ccd_isr(_vector: usize, _arg: *mut usize) {
    run_callback(0, EV_CC + 3);
}

pub struct Tc {
    csr: CSR<u8>,
    instance: usize,
}

const BASES: [usize; 2] = [tc0::HW_TCC0_BASE, tc0::HW_TCD0_BASE];
const GATES: [Port; 2] = [Port::C, Port::D];

impl Tc {
    pub fn new(instance: usize) -> Result<Tc, Status> {
        if instance >= BASES.len() {
            return Err(Status::InvalidArg);
        }
        let base = periph_base::<u8>(BASES[instance], tc0::TC0_NUMREGS);
        Ok(Tc { csr: CSR::new(base), instance })
    }

    /// Ungate the module clock inside a critical section, then pin the
    /// sleep depth at Idle.
    pub fn enable(&mut self) {
        critical_section::with(|_| {
            sysclk::enable_module(GATES[self.instance], pr::PR_TC0);
        });
        sleepmgr::xmega::lock(sleepmgr::xmega::SleepMode::Idle);
    }

    pub fn disable(&mut self) {
        critical_section::with(|_| {
            self.csr.rmwf(tc0::CTRLA_CLKSEL, ClockSelect::Off as u8);
            sysclk::disable_module(GATES[self.instance], pr::PR_TC0);
        });
        sleepmgr::xmega::unlock(sleepmgr::xmega::SleepMode::Idle);
    }

    /// Select the counter clock. Anything but `Off` starts the counter.
    pub fn set_clock_source(&mut self, clk: ClockSelect) {
        self.csr.rmwf(tc0::CTRLA_CLKSEL, clk as u8);
    }

    pub fn set_wgm(&mut self, mode: WaveformMode) {
        self.csr.rmwf(tc0::CTRLB_WGMODE, mode as u8);
    }

    /// Connect CC channels to the waveform generator. WGMODE is preserved.
    pub fn enable_cc_channels(&mut self, channels: CcChannels) {
        let v = self.csr.r(tc0::CTRLB) | channels.bits();
        self.csr.wo(tc0::CTRLB, v);
    }

    pub fn disable_cc_channels(&mut self, channels: CcChannels) {
        let v = self.csr.r(tc0::CTRLB) & !channels.bits();
        self.csr.wo(tc0::CTRLB, v);
    }

    pub fn write_period(&mut self, period: u16) {
        self.csr.wo(tc0::PERL, (period & 0xFF) as u8);
        self.csr.wo(tc0::PERH, (period >> 8) as u8);
    }

    pub fn write_count(&mut self, count: u16) {
        self.csr.wo(tc0::CNTL, (count & 0xFF) as u8);
        self.csr.wo(tc0::CNTH, (count >> 8) as u8);
    }

    pub fn read_count(&self) -> u16 {
        let low = self.csr.r(tc0::CNTL) as u16;
        let high = self.csr.r(tc0::CNTH) as u16;
        (high << 8) | low
    }

    pub fn write_cc(&mut self, channel: Channel, value: u16) {
        let (lo, hi) = match channel {
            Channel::A => (tc0::CCAL, tc0::CCAH),
            Channel::B => (tc0::CCBL, tc0::CCBH),
            Channel::C => (tc0::CCCL, tc0::CCCH),
            Channel::D => (tc0::CCDL, tc0::CCDH),
        };
        self.csr.wo(lo, (value & 0xFF) as u8);
        self.csr.wo(hi, (value >> 8) as u8);
    }

    pub fn issue_command(&mut self, command: Command) {
        let v = self.csr.ms(tc0::CTRLFSET_CMD, command as u8);
        self.csr.wo(tc0::CTRLFSET, v);
    }

    pub fn restart(&mut self) {
        self.issue_command(Command::Restart);
    }

    pub fn set_overflow_interrupt_level(&mut self, level: Level) {
        self.csr.rmwf(tc0::INTCTRLA_OVFINTLVL, level as u8);
    }

    pub fn set_error_interrupt_level(&mut self, level: Level) {
        self.csr.rmwf(tc0::INTCTRLA_ERRINTLVL, level as u8);
    }

    pub fn set_cc_interrupt_level(&mut self, channel: Channel, level: Level) {
        let field = match channel {
            Channel::A => tc0::INTCTRLB_CCAINTLVL,
            Channel::B => tc0::INTCTRLB_CCBINTLVL,
            Channel::C => tc0::INTCTRLB_CCCINTLVL,
            Channel::D => tc0::INTCTRLB_CCDINTLVL,
        };
        self.csr.rmwf(field, level as u8);
    }

    pub fn overflow_pending(&self) -> bool {
        self.csr.rf(tc0::INTFLAGS_OVFIF) != 0
    }

    /// Acknowledge the overflow flag, write one to clear.
    pub fn clear_overflow(&mut self) {
        self.csr.wo(tc0::INTFLAGS, 1 << tc0::INTFLAGS_OVFIF.offset());
    }

    pub fn error_pending(&self) -> bool {
        self.csr.rf(tc0::INTFLAGS_ERRIF) != 0
    }

    pub fn clear_error(&mut self) {
        self.csr.wo(tc0::INTFLAGS, 1 << tc0::INTFLAGS_ERRIF.offset());
    }

    pub fn cc_pending(&self, channel: Channel) -> bool {
        let field = match channel {
            Channel::A => tc0::INTFLAGS_CCAIF,
            Channel::B => tc0::INTFLAGS_CCBIF,
            Channel::C => tc0::INTFLAGS_CCCIF,
            Channel::D => tc0::INTFLAGS_CCDIF,
        };
        self.csr.rf(field) != 0
    }

    pub fn clear_cc(&mut self, channel: Channel) {
        self.csr.wo(tc0::INTFLAGS, 1 << (4 + channel as usize));
    }

    pub fn set_overflow_callback(&self, callback: Callback) {
        critical_section::with(|cs| {
            CALLBACKS.borrow(cs).borrow_mut()[self.instance][EV_OVF] = Some(callback);
        });
    }

    pub fn set_error_callback(&self, callback: Callback) {
        critical_section::with(|cs| {
            CALLBACKS.borrow(cs).borrow_mut()[self.instance][EV_ERR] = Some(callback);
        });
    }

    pub fn set_cc_callback(&self, channel: Channel, callback: Callback) {
        critical_section::with(|cs| {
            CALLBACKS.borrow(cs).borrow_mut()[self.instance][EV_CC + channel as usize] =
                Some(callback);
        });
    }

    /// Interrupt vector numbers, known for the port C instance.
    pub fn overflow_vector(&self) -> Option<usize> {
        match self.instance {
            0 => Some(vector::TCC0_OVF),
            _ => None,
        }
    }

    pub fn error_vector(&self) -> Option<usize> {
        match self.instance {
            0 => Some(vector::TCC0_ERR),
            _ => None,
        }
    }

    pub fn cc_vector(&self, channel: Channel) -> Option<usize> {
        match self.instance {
            0 => Some(vector::TCC0_CCA + channel as usize),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::sync::atomic::{AtomicUsize, Ordering};
    use hatra::hosted::{self, Access, HookAction};
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn enable_takes_clock_gate_and_sleep_lock() {
        let mut tc = Tc::new(0).unwrap();
        tc.enable();
        assert!(sysclk::module_enabled(Port::C, pr::PR_TC0));
        assert_eq!(sleepmgr::xmega::deepest_allowed(), sleepmgr::xmega::SleepMode::Idle);
        tc.disable();
        assert!(!sysclk::module_enabled(Port::C, pr::PR_TC0));
        assert_eq!(hosted::peek(tc0::HW_TCC0_BASE, tc0::CTRLA.offset()), 0);
    }

    #[test]
    fn single_slope_pwm_setup() {
        let mut tc = Tc::new(0).unwrap();
        tc.set_wgm(WaveformMode::SingleSlope);
        tc.enable_cc_channels(CcChannels::A);
        tc.write_period(999);
        tc.write_cc(Channel::A, 250);
        tc.set_clock_source(ClockSelect::Div1);

        let base = tc0::HW_TCC0_BASE;
        assert_eq!(hosted::peek(base, tc0::CTRLB.offset()), 0x10 | 3);
        assert_eq!(hosted::peek(base, tc0::PERL.offset()), 0xE7);
        assert_eq!(hosted::peek(base, tc0::PERH.offset()), 0x03);
        assert_eq!(hosted::peek(base, tc0::CCAL.offset()), 250);
        assert_eq!(hosted::peek(base, tc0::CCAH.offset()), 0);
        assert_eq!(hosted::peek(base, tc0::CTRLA.offset()), 1);

        tc.disable_cc_channels(CcChannels::A);
        assert_eq!(hosted::peek(base, tc0::CTRLB.offset()), 3);
    }

    #[test]
    fn count_round_trips_low_byte_first() {
        let mut tc = Tc::new(1).unwrap();
        tc.write_count(0x1234);
        assert_eq!(hosted::peek(tc0::HW_TCD0_BASE, tc0::CNTL.offset()), 0x34);
        assert_eq!(hosted::peek(tc0::HW_TCD0_BASE, tc0::CNTH.offset()), 0x12);
        assert_eq!(tc.read_count(), 0x1234);
    }

    #[test]
    fn interrupt_flags_are_write_one_to_clear() {
        let base = tc0::HW_TCC0_BASE;
        let flags = Rc::new(Cell::new(0usize));
        let shadow = flags.clone();
        hosted::install_hook(
            base,
            Box::new(move |off, access| {
                if off != tc0::INTFLAGS.offset() {
                    return HookAction::Pass;
                }
                match access {
                    Access::Read => HookAction::Replace(shadow.get()),
                    Access::Write(v) => {
                        shadow.set(shadow.get() & !v);
                        HookAction::Replace(shadow.get())
                    }
                }
            }),
        );

        let mut tc = Tc::new(0).unwrap();
        flags.set(0x11); // OVFIF and CCAIF
        assert!(tc.overflow_pending());
        assert!(tc.cc_pending(Channel::A));
        tc.clear_overflow();
        assert!(!tc.overflow_pending());
        assert!(tc.cc_pending(Channel::A));
        tc.clear_cc(Channel::A);
        assert!(!tc.cc_pending(Channel::A));
        hosted::remove_hook(base);
    }

    #[test]
    fn restart_strobes_the_command_field() {
        let mut tc = Tc::new(0).unwrap();
        tc.restart();
        assert_eq!(hosted::peek(tc0::HW_TCC0_BASE, tc0::CTRLFSET.offset()), 2 << 2);
    }

    #[test]
    fn interrupt_levels_land_in_both_registers() {
        let mut tc = Tc::new(0).unwrap();
        tc.set_overflow_interrupt_level(Level::Low);
        tc.set_error_interrupt_level(Level::Medium);
        tc.set_cc_interrupt_level(Channel::B, Level::High);
        let base = tc0::HW_TCC0_BASE;
        assert_eq!(hosted::peek(base, tc0::INTCTRLA.offset()), 1 | (2 << 2));
        assert_eq!(hosted::peek(base, tc0::INTCTRLB.offset()), 3 << 2);
    }

    static OVF_HITS: AtomicUsize = AtomicUsize::new(0);
    fn count_ovf() {
        OVF_HITS.fetch_add(1, Ordering::SeqCst);
    }

    #[test]
    fn overflow_callback_fires_through_the_controller() {
        let tc = Tc::new(0).unwrap();
        tc.set_overflow_callback(count_ovf);
        let vec = tc.overflow_vector().unwrap();
        crate::pmic::register_handler(vec, tcc0_ovf_isr, core::ptr::null_mut()).unwrap();
        crate::pmic::trigger(vec);
        crate::pmic::trigger(vec);
        assert_eq!(OVF_HITS.load(Ordering::SeqCst), 2);
        crate::pmic::unregister_handler(vec);
    }

    #[test]
    fn second_instance_has_no_vectors() {
        let tc = Tc::new(1).unwrap();
        assert!(tc.overflow_vector().is_none());
        assert!(tc.cc_vector(Channel::D).is_none());
        assert!(Tc::new(2).is_err());
    }
}
