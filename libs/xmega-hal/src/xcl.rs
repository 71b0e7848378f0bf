//! XMEGA Custom Logic driver: two programmable LUTs with optional
//! delay elements, plus a pair of 8-bit timer/counters that cascade to
//! 16 bits or serve as peripheral counters.
//!
//! `enable` takes the clock domain the module will run from. The pure
//! LUT paths work from the asynchronous domain down to power-down,
//! while timers and delay elements need the peripheral clock and pin
//! the sleep depth at Idle instead.

use core::cell::RefCell;

use critical_section::Mutex;
use hal_api::Status;
use hatra::xmega::{pr, vector, xcl};
use hatra::{periph_base, Register, CSR};

use crate::pmic::Level;
use crate::sysclk::{self, Port};

/// Clock domain the enabled sub-modules run from.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ClockSource {
    Synchronous,
    Asynchronous,
}

/// Port the XCL pins map to, `PORTSEL` encoding.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PortSel {
    C = 0,
    D = 1,
}

/// LUT composition, `LUTCONF` encoding.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LutConfig {
    TwoLut2In = 0,
    TwoLut1In = 1,
    TwoLut0In = 2,
    OneLut3In = 3,
    Mux = 4,
    DLatch = 5,
    RsLatch = 6,
    Dff = 7,
}

/// LUT input mux, one `INnSEL` field per input. The pin choices pick
/// the low or high nibble of the selected port.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LutInput {
    EventSystem = 0,
    Internal = 1,
    PinLow = 2,
    PinHigh = 3,
}

/// LUT0 output routing, `LUT0OUTEN` encoding.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LutOutput {
    Disabled = 0,
    Pin0 = 1,
    Pin4 = 2,
}

/// Delay lengths for the two delay elements, `DLYSEL` encoding.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DelayCycles {
    OneOne = 0,
    OneTwo = 1,
    TwoOne = 2,
    TwoTwo = 3,
}

/// Delay element placement for one LUT.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DelayConfig {
    Disabled = 0,
    OnInput = 1,
    OnOutput = 2,
}

/// Truth table nibble for a two-input LUT, indexed by IN1:IN0.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Truth {
    Nor = 0x1,
    Not1 = 0x3,
    Not0 = 0x5,
    Xor = 0x6,
    Nand = 0x7,
    And = 0x8,
    Xnor = 0x9,
    In0 = 0xA,
    In1 = 0xC,
    Or = 0xE,
}

/// Timer composition, `TCSEL` encoding. BTC are the 8-bit halves, PEC
/// the peripheral counters that extend USART or SPI frames.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TcType {
    Tc16 = 0,
    Btc0 = 1,
    Btc01 = 2,
    Btc0Pec1 = 3,
    Pec0Btc1 = 4,
    Pec01 = 5,
    Btc0Pec2 = 6,
}

/// Timer clock, `CLKSEL` encoding. Values 8 and up tick from an event
/// channel instead of the prescaled peripheral clock.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TcClockSource {
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

/// Timer mode, `MODE` encoding.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TcMode {
    Normal = 0,
    Capture = 1,
    Pwm = 2,
}

/// Restart command routing, `CMDEN` encoding.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CommandTarget {
    None = 0,
    Timer0 = 1,
    Timer1 = 2,
    Both = 3,
}

/// The two 8-bit timer halves.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TimerUnit {
    T0 = 0,
    T1 = 1,
}

pub type Callback = fn();

const EV_UNF: usize = 0;
const EV_CC: usize = 1;

static CALLBACKS: Mutex<RefCell<[Option<Callback>; 2]>> = Mutex::new(RefCell::new([None; 2]));

fn run_callback(event: usize) {
    let cb = critical_section::with(|cs| CALLBACKS.borrow(cs).borrow()[event]);
    if let Some(cb) = cb {
        cb();
    }
}

// ISR entries in pmic handler shape. Both timer halves share each vector.
pub fn xcl_unf_isr(_vector: usize, _arg: *mut usize) {
    run_callback(EV_UNF);
}
pub fn xcl_cc_isr(_vector: usize, _arg: *mut usize) {
    run_callback(EV_CC);
}

// Prescaler ladder for tc_set_resolution, coarsest first. The XCL
// prescaler skips 16 and 32.
const DIVIDERS: [(u32, TcClockSource); 6] = [
    (1024, TcClockSource::Div1024),
    (256, TcClockSource::Div256),
    (64, TcClockSource::Div64),
    (8, TcClockSource::Div8),
    (4, TcClockSource::Div4),
    (2, TcClockSource::Div2),
];

fn sleep_depth(clock: ClockSource) -> sleepmgr::xmega::SleepMode {
    match clock {
        ClockSource::Synchronous => sleepmgr::xmega::SleepMode::Idle,
        ClockSource::Asynchronous => sleepmgr::xmega::SleepMode::PowerDown,
    }
}

pub struct Xcl {
    csr: CSR<u8>,
    clock: Option<ClockSource>,
}

impl Xcl {
    pub fn new() -> Xcl {
        let base = periph_base::<u8>(xcl::HW_XCL_BASE, xcl::XCL_NUMREGS);
        Xcl { csr: CSR::new(base), clock: None }
    }

    /// Ungate the module clock and pin the sleep depth the selected
    /// domain needs. The asynchronous LUT paths still run in
    /// power-down, synchronous use holds the system at Idle.
    pub fn enable(&mut self, clock: ClockSource) -> Result<(), Status> {
        if self.clock.is_some() {
            return Err(Status::Busy);
        }
        critical_section::with(|_| {
            sysclk::enable_module(Port::Gen, pr::PR_GEN_XCL);
        });
        sleepmgr::xmega::lock(sleep_depth(clock));
        self.clock = Some(clock);
        Ok(())
    }

    /// Gate the clock and release whichever sleep depth `enable` took.
    pub fn disable(&mut self) {
        if let Some(clock) = self.clock.take() {
            critical_section::with(|_| {
                sysclk::disable_module(Port::Gen, pr::PR_GEN_XCL);
            });
            sleepmgr::xmega::unlock(sleep_depth(clock));
        }
    }

    pub fn select_port(&mut self, port: PortSel) {
        self.csr.rmwf(xcl::CTRLA_PORTSEL, port as u8);
    }

    pub fn lut_type(&mut self, config: LutConfig) {
        self.csr.rmwf(xcl::CTRLA_LUTCONF, config as u8);
    }

    pub fn lut_in0(&mut self, sel: LutInput) {
        self.csr.rmwf(xcl::CTRLB_IN0SEL, sel as u8);
    }

    pub fn lut_in1(&mut self, sel: LutInput) {
        self.csr.rmwf(xcl::CTRLB_IN1SEL, sel as u8);
    }

    pub fn lut_in2(&mut self, sel: LutInput) {
        self.csr.rmwf(xcl::CTRLB_IN2SEL, sel as u8);
    }

    pub fn lut_in3(&mut self, sel: LutInput) {
        self.csr.rmwf(xcl::CTRLB_IN3SEL, sel as u8);
    }

    pub fn lut0_output(&mut self, out: LutOutput) {
        self.csr.rmwf(xcl::CTRLA_LUT0OUTEN, out as u8);
    }

    pub fn lut0_truth(&mut self, truth: Truth) {
        self.csr.rmwf(xcl::CTRLD_TRUTH0, truth as u8);
    }

    pub fn lut1_truth(&mut self, truth: Truth) {
        self.csr.rmwf(xcl::CTRLD_TRUTH1, truth as u8);
    }

    /// One write configures both delay elements and their length pair.
    pub fn configure_delay(&mut self, cycles: DelayCycles, dly0: DelayConfig, dly1: DelayConfig) {
        let v = self.csr.ms(xcl::CTRLC_DLYSEL, cycles as u8)
            | self.csr.ms(xcl::CTRLC_DLY0CONF, dly0 as u8)
            | self.csr.ms(xcl::CTRLC_DLY1CONF, dly1 as u8);
        self.csr.wo(xcl::CTRLC, v);
    }

    pub fn tc_type(&mut self, sel: TcType) {
        self.csr.rmwf(xcl::CTRLE_TCSEL, sel as u8);
    }

    /// Select the timer clock. Anything but `Off` starts the counters.
    pub fn tc_clock_source(&mut self, src: TcClockSource) {
        self.csr.rmwf(xcl::CTRLE_CLKSEL, src as u8);
    }

    pub fn tc_mode(&mut self, mode: TcMode) {
        self.csr.rmwf(xcl::CTRLF_MODE, mode as u8);
    }

    /// Pick the coarsest prescaler that still ticks at `resolution` or
    /// better and start the timer from it. Returns the real tick rate.
    pub fn tc_set_resolution(&mut self, per_hz: u32, resolution: u32) -> u32 {
        for &(div, src) in DIVIDERS.iter() {
            if resolution <= per_hz / div {
                self.tc_clock_source(src);
                return per_hz / div;
            }
        }
        self.tc_clock_source(TcClockSource::Div1);
        per_hz
    }

    /// Restart the selected halves. The hardware expects the command
    /// enable first, then the command select strobe.
    pub fn tc_restart(&mut self, target: CommandTarget) {
        self.csr.rmwf(xcl::CTRLF_CMDEN, target as u8);
        self.csr.rmwf(xcl::CTRLE_CMDSEL, 1);
    }

    pub fn tc16_write_count(&mut self, count: u16) {
        self.csr.wo(xcl::CNTL0, (count & 0xFF) as u8);
        self.csr.wo(xcl::CNTL1, (count >> 8) as u8);
    }

    pub fn tc16_write_period(&mut self, period: u16) {
        self.csr.wo(xcl::PERCAPTL0, (period & 0xFF) as u8);
        self.csr.wo(xcl::PERCAPTL1, (period >> 8) as u8);
    }

    pub fn tc16_write_compare(&mut self, compare: u16) {
        self.csr.wo(xcl::CMPL0, (compare & 0xFF) as u8);
        self.csr.wo(xcl::CMPL1, (compare >> 8) as u8);
    }

    /// Capture mode reuses the period registers for the captured value.
    pub fn tc16_read_capture(&self) -> u16 {
        let low = self.csr.r(xcl::PERCAPTL0) as u16;
        let high = self.csr.r(xcl::PERCAPTL1) as u16;
        (high << 8) | low
    }

    fn unit_reg(unit: TimerUnit, t0: Register, t1: Register) -> Register {
        match unit {
            TimerUnit::T0 => t0,
            TimerUnit::T1 => t1,
        }
    }

    pub fn btc_write_count(&mut self, unit: TimerUnit, count: u8) {
        self.csr.wo(Self::unit_reg(unit, xcl::CNTL0, xcl::CNTL1), count);
    }

    pub fn btc_write_period(&mut self, unit: TimerUnit, period: u8) {
        self.csr.wo(Self::unit_reg(unit, xcl::PERCAPTL0, xcl::PERCAPTL1), period);
    }

    pub fn btc_write_compare(&mut self, unit: TimerUnit, compare: u8) {
        self.csr.wo(Self::unit_reg(unit, xcl::CMPL0, xcl::CMPL1), compare);
    }

    pub fn btc_read_capture(&self, unit: TimerUnit) -> u8 {
        self.csr.r(Self::unit_reg(unit, xcl::PERCAPTL0, xcl::PERCAPTL1))
    }

    /// Frame length in bits when a peripheral counter stretches USART
    /// or SPI frames.
    pub fn pec_set_length(&mut self, length: u8) {
        self.csr.wo(xcl::PLC, length);
    }

    /// Drive the CC pin of one timer half from its compare unit.
    pub fn enable_compare_output(&mut self, unit: TimerUnit) {
        match unit {
            TimerUnit::T0 => self.csr.rmwf(xcl::CTRLF_CCEN0, 1),
            TimerUnit::T1 => self.csr.rmwf(xcl::CTRLF_CCEN1, 1),
        }
    }

    pub fn disable_compare_output(&mut self, unit: TimerUnit) {
        match unit {
            TimerUnit::T0 => self.csr.rmwf(xcl::CTRLF_CCEN0, 0),
            TimerUnit::T1 => self.csr.rmwf(xcl::CTRLF_CCEN1, 0),
        }
    }

    /// Force a level onto a compare pin. Only honored while the timer
    /// clock is off.
    pub fn force_compare_output(&mut self, unit: TimerUnit, high: bool) {
        match unit {
            TimerUnit::T0 => self.csr.rmwf(xcl::CTRLF_CMP0, high as u8),
            TimerUnit::T1 => self.csr.rmwf(xcl::CTRLF_CMP1, high as u8),
        }
    }

    pub fn set_underflow_interrupt_level(&mut self, unit: TimerUnit, level: Level) {
        match unit {
            TimerUnit::T0 => self.csr.rmwf(xcl::INTCTRL_UNF0INTLVL, level as u8),
            TimerUnit::T1 => self.csr.rmwf(xcl::INTCTRL_UNF1INTLVL, level as u8),
        }
    }

    pub fn set_compare_interrupt_level(&mut self, unit: TimerUnit, level: Level) {
        match unit {
            TimerUnit::T0 => self.csr.rmwf(xcl::INTCTRL_CC0INTLVL, level as u8),
            TimerUnit::T1 => self.csr.rmwf(xcl::INTCTRL_CC1INTLVL, level as u8),
        }
    }

    pub fn underflow_pending(&self, unit: TimerUnit) -> bool {
        let field = match unit {
            TimerUnit::T0 => xcl::INTFLAGS_UNF0IF,
            TimerUnit::T1 => xcl::INTFLAGS_UNF1IF,
        };
        self.csr.rf(field) != 0
    }

    /// Acknowledge an underflow, write one to clear.
    pub fn clear_underflow(&mut self, unit: TimerUnit) {
        let field = match unit {
            TimerUnit::T0 => xcl::INTFLAGS_UNF0IF,
            TimerUnit::T1 => xcl::INTFLAGS_UNF1IF,
        };
        self.csr.wo(xcl::INTFLAGS, 1 << field.offset());
    }

    pub fn compare_pending(&self, unit: TimerUnit) -> bool {
        let field = match unit {
            TimerUnit::T0 => xcl::INTFLAGS_CC0IF,
            TimerUnit::T1 => xcl::INTFLAGS_CC1IF,
        };
        self.csr.rf(field) != 0
    }

    pub fn clear_compare(&mut self, unit: TimerUnit) {
        let field = match unit {
            TimerUnit::T0 => xcl::INTFLAGS_CC0IF,
            TimerUnit::T1 => xcl::INTFLAGS_CC1IF,
        };
        self.csr.wo(xcl::INTFLAGS, 1 << field.offset());
    }

    pub fn set_underflow_callback(&self, callback: Callback) {
        critical_section::with(|cs| {
            CALLBACKS.borrow(cs).borrow_mut()[EV_UNF] = Some(callback);
        });
    }

    pub fn set_compare_callback(&self, callback: Callback) {
        critical_section::with(|cs| {
            CALLBACKS.borrow(cs).borrow_mut()[EV_CC] = Some(callback);
        });
    }

    pub fn underflow_vector(&self) -> usize {
        vector::XCL_UNF
    }

    pub fn compare_vector(&self) -> usize {
        vector::XCL_CC
    }
}

impl Default for Xcl {
    fn default() -> Self {
        Self::new()
    }
}
