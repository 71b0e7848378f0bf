//! Asynchronous Timer: battery-backed counter/calendar with alarms,
//! periodic events and a digital frequency tuner.
//!
//! The block lives in its own clock domain; every write to a counter-side
//! register synchronizes across it, signalled by SR.BUSY, and clock source
//! changes by SR.CLKBUSY. All waits here are bounded, a stuck crystal
//! surfaces as `Status::Timeout` instead of a hang.

use bitflags::bitflags;
use hal_api::{poll_timeout, Status, POLL_LIMIT};
use hatra::uc3::{ast, irq};
use hatra::{periph_base, CSR};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ClockSource {
    /// System RC oscillator.
    Rcsys = 0,
    Osc32 = 1,
    /// Peripheral bus clock.
    Pb = 2,
    Gclk = 3,
    /// 1 kHz tap of the 32 kHz oscillator.
    Osc1k = 4,
}

bitflags! {
    /// Event bits shared by SR/SCR/IER/IDR/IMR/WER.
    pub struct AstFlags: u32 {
        const OVERFLOW = 1 << 0;
        const ALARM0   = 1 << 8;
        const ALARM1   = 1 << 9;
        const PER0     = 1 << 16;
        const PER1     = 1 << 17;
    }
}

/// Broken-down calendar time, CALV packing. Year counts from 2000.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Calendar {
    pub year: u8,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl Calendar {
    fn valid(&self) -> bool {
        self.year < 64
            && (1..=12).contains(&self.month)
            && (1..=31).contains(&self.day)
            && self.hour < 24
            && self.minute < 60
            && self.second < 60
    }
}

pub struct Ast {
    csr: CSR<u32>,
}

impl Ast {
    pub fn new() -> Ast {
        Ast { csr: CSR::new(periph_base::<u32>(ast::HW_AST_BASE, ast::AST_NUMREGS)) }
    }

    pub fn alarm_irq(&self) -> usize {
        irq::AST_ALARM
    }

    pub fn periodic_irq(&self) -> usize {
        irq::AST_PER
    }

    fn wait_busy(&self) -> Result<(), Status> {
        poll_timeout(POLL_LIMIT, || self.csr.rf(ast::SR_BUSY) == 0)
    }

    fn wait_clkbusy(&self) -> Result<(), Status> {
        poll_timeout(POLL_LIMIT, || self.csr.rf(ast::SR_CLKBUSY) == 0)
    }

    /// Switch the prescaler input. The source must be changed with the
    /// clock disabled, so this runs select-then-enable with a
    /// synchronization wait around each step.
    pub fn select_clock(&mut self, source: ClockSource) -> Result<(), Status> {
        self.wait_clkbusy()?;
        self.csr.wfo(ast::CLOCK_CSSEL, source as u32);
        self.wait_clkbusy()?;
        let v = self.csr.r(ast::CLOCK);
        self.csr.wo(ast::CLOCK, v | self.csr.ms(ast::CLOCK_CEN, 1));
        self.wait_clkbusy()
    }

    /// Bring the block up in binary counter mode.
    pub fn init_counter(&mut self, source: ClockSource, psel: u8, initial: u32) -> Result<(), Status> {
        if psel > 31 {
            return Err(Status::InvalidArg);
        }
        self.select_clock(source)?;
        self.wait_busy()?;
        self.csr.wfo(ast::CR_PSEL, psel as u32);
        self.set_counter(initial)
    }

    /// Bring the block up in calendar mode.
    pub fn init_calendar(
        &mut self,
        source: ClockSource,
        psel: u8,
        datetime: &Calendar,
    ) -> Result<(), Status> {
        if psel > 31 {
            return Err(Status::InvalidArg);
        }
        self.select_clock(source)?;
        self.wait_busy()?;
        let v = self.csr.ms(ast::CR_CAL, 1) | self.csr.ms(ast::CR_PSEL, psel as u32);
        self.csr.wo(ast::CR, v);
        self.set_calendar(datetime)
    }

    pub fn enable(&mut self) -> Result<(), Status> {
        self.wait_busy()?;
        let v = self.csr.r(ast::CR);
        self.csr.wo(ast::CR, v | self.csr.ms(ast::CR_EN, 1));
        self.wait_busy()
    }

    pub fn disable(&mut self) -> Result<(), Status> {
        self.wait_busy()?;
        let v = self.csr.r(ast::CR);
        self.csr.wo(ast::CR, self.csr.zf(ast::CR_EN, v));
        self.wait_busy()
    }

    pub fn is_enabled(&self) -> bool {
        self.csr.rf(ast::CR_EN) != 0
    }

    pub fn counter(&self) -> u32 {
        self.csr.r(ast::CV)
    }

    pub fn set_counter(&mut self, value: u32) -> Result<(), Status> {
        self.wait_busy()?;
        self.csr.wo(ast::CV, value);
        self.wait_busy()
    }

    pub fn calendar(&self) -> Calendar {
        let v = self.csr.r(ast::CALV) as usize;
        let field = |f: hatra::Field| ((v >> f.offset()) & f.mask()) as u8;
        Calendar {
            year: field(ast::CALV_YEAR),
            month: field(ast::CALV_MONTH),
            day: field(ast::CALV_DAY),
            hour: field(ast::CALV_HOUR),
            minute: field(ast::CALV_MIN),
            second: field(ast::CALV_SEC),
        }
    }

    pub fn set_calendar(&mut self, datetime: &Calendar) -> Result<(), Status> {
        if !datetime.valid() {
            return Err(Status::InvalidArg);
        }
        self.wait_busy()?;
        let v = self.csr.ms(ast::CALV_SEC, datetime.second as u32)
            | self.csr.ms(ast::CALV_MIN, datetime.minute as u32)
            | self.csr.ms(ast::CALV_HOUR, datetime.hour as u32)
            | self.csr.ms(ast::CALV_DAY, datetime.day as u32)
            | self.csr.ms(ast::CALV_MONTH, datetime.month as u32)
            | self.csr.ms(ast::CALV_YEAR, datetime.year as u32);
        self.csr.wo(ast::CALV, v);
        self.wait_busy()
    }

    /// Arm alarm 0. In counter mode the value is a counter match; in
    /// calendar mode it is a packed calendar value.
    pub fn set_alarm0(&mut self, value: u32) -> Result<(), Status> {
        self.wait_busy()?;
        self.csr.wo(ast::AR0, value);
        self.wait_busy()?;
        let v = self.csr.r(ast::CR);
        self.csr.wo(ast::CR, v | self.csr.ms(ast::CR_CA0, 1));
        self.wait_busy()
    }

    /// Arm periodic event 0 on prescaler tap `insel`: fires every
    /// `2^(insel + 1)` source ticks.
    pub fn set_periodic0(&mut self, insel: u8) -> Result<(), Status> {
        if insel > 31 {
            return Err(Status::InvalidArg);
        }
        self.wait_busy()?;
        self.csr.wfo(ast::PIR0_INSEL, insel as u32);
        self.wait_busy()
    }

    pub fn enable_interrupt(&mut self, flags: AstFlags) {
        self.csr.wo(ast::IER, flags.bits());
    }

    pub fn disable_interrupt(&mut self, flags: AstFlags) {
        self.csr.wo(ast::IDR, flags.bits());
    }

    pub fn status(&self) -> AstFlags {
        AstFlags::from_bits_truncate(self.csr.r(ast::SR))
    }

    pub fn clear(&mut self, flags: AstFlags) -> Result<(), Status> {
        self.wait_busy()?;
        self.csr.wo(ast::SCR, flags.bits());
        self.wait_busy()
    }

    /// Let the events in `flags` wake the core from sleep.
    pub fn enable_wake(&mut self, flags: AstFlags) {
        let v = self.csr.r(ast::WER);
        self.csr.wo(ast::WER, v | flags.bits());
    }

    pub fn disable_wake(&mut self, flags: AstFlags) {
        let v = self.csr.r(ast::WER);
        self.csr.wo(ast::WER, v & !flags.bits());
    }

    /// Trim the effective counter rate from `input_hz` towards `tuned_hz`
    /// by periodically adding or dropping prescaler ticks.
    ///
    /// The tuner reaches at most a fifth below and a third above the input
    /// frequency; targets beyond that are refused.
    pub fn configure_digital_tuner(&mut self, input_hz: u32, tuned_hz: u32) -> Result<(), Status> {
        if input_hz == 0 {
            return Err(Status::InvalidArg);
        }
        let (add, diff) = if tuned_hz < input_hz {
            if (tuned_hz as u64) < 4 * input_hz as u64 / 5 {
                return Err(Status::InvalidArg);
            }
            (false, input_hz - tuned_hz)
        } else if tuned_hz > input_hz {
            if (tuned_hz as u64) > 4 * input_hz as u64 / 3 {
                return Err(Status::InvalidArg);
            }
            (true, tuned_hz - input_hz)
        } else {
            // already on target
            return Ok(());
        };

        let mut z = tuned_hz / diff;
        if tuned_hz % diff > diff / 2 {
            z += 1;
        }
        // grow the (value, exp) pair until 2^exp * y covers z
        let mut x = 2u32;
        let mut y = 2u32;
        let mut exp = 1u32;
        loop {
            if y < 255 {
                y += 1;
            } else {
                x <<= 1;
                y = 2;
                exp += 1;
            }
            if z <= x * y {
                break;
            }
        }
        y -= 1;
        let value = (256 + y - 1) / y;

        self.wait_busy()?;
        let dtr = self.csr.ms(ast::DTR_ADD, add as u32)
            | self.csr.ms(ast::DTR_VALUE, value)
            | self.csr.ms(ast::DTR_EXP, exp);
        self.csr.wo(ast::DTR, dtr);
        self.wait_busy()
    }

    pub fn disable_digital_tuner(&mut self) -> Result<(), Status> {
        self.wait_busy()?;
        self.csr.wo(ast::DTR, 0);
        self.wait_busy()
    }
}

impl Default for Ast {
    fn default() -> Self {
        Self::new()
    }
}
