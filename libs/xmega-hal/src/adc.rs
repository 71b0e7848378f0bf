//! ADC driver, single instance with channel 0 modeled.
//!
//! Configuration follows the write-back scheme the rest of the family
//! uses: build an [`AdcConfig`] / [`AdcChannelConfig`] offline, then commit
//! it with one call. The module clock and the Idle sleep lock are taken on
//! [`Adc::enable`] and dropped on [`Adc::disable`].

use hal_api::{poll_timeout, Status, POLL_LIMIT};
use hatra::xmega::{adc, pr, vector};
use hatra::{periph_base, CSR};

use crate::pmic::Level;
use crate::sysclk::{self, Port};

/// Conversion resolution and result alignment, `RESOLUTION` encoding.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Resolution {
    Bit12 = 0,
    Bit8 = 2,
    Bit12Left = 3,
}

/// Conversion reference, `REFSEL` encoding.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Reference {
    Int1V = 0,
    IntVccDiv1p6 = 1,
    ArefA = 2,
    ArefD = 3,
    IntVccDiv2 = 4,
}

/// Positive input when the channel is in internal mode, `MUXPOS` encoding.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum InternalInput {
    Temperature = 0,
    Bandgap = 1,
    ScaledVcc = 2,
    Dac = 3,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Gain {
    X1 = 0,
    X2 = 1,
    X4 = 2,
    X8 = 3,
    X16 = 4,
    X32 = 5,
    X64 = 6,
    Div2 = 7,
}

const PRESCALER_DIVS: [u32; 8] = [4, 8, 16, 32, 64, 128, 256, 512];

/// Module-level configuration, staged in register image form.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct AdcConfig {
    ctrlb: u8,
    refctrl: u8,
    evctrl: u8,
    prescaler: u8,
}

impl AdcConfig {
    pub fn set_conversion_parameters(
        &mut self,
        signed_mode: bool,
        resolution: Resolution,
        reference: Reference,
    ) {
        let res_mask = (adc::CTRLB_RESOLUTION.mask() as u8) << adc::CTRLB_RESOLUTION.offset();
        let con_mask = 1u8 << adc::CTRLB_CONMODE.offset();
        self.ctrlb = (self.ctrlb & !(res_mask | con_mask))
            | ((resolution as u8) << adc::CTRLB_RESOLUTION.offset())
            | ((signed_mode as u8) << adc::CTRLB_CONMODE.offset());
        let ref_mask = (adc::REFCTRL_REFSEL.mask() as u8) << adc::REFCTRL_REFSEL.offset();
        self.refctrl =
            (self.refctrl & !ref_mask) | ((reference as u8) << adc::REFCTRL_REFSEL.offset());
    }

    /// Pick the smallest prescaler that keeps the ADC clock at or below
    /// `adc_hz`.
    pub fn set_clock_rate(&mut self, per_hz: u32, adc_hz: u32) {
        let mut sel = PRESCALER_DIVS.len() - 1;
        for (i, div) in PRESCALER_DIVS.iter().enumerate() {
            if per_hz / div <= adc_hz {
                sel = i;
                break;
            }
        }
        self.prescaler = sel as u8;
    }

    /// Power the on-die temperature sensor so internal mode can read it.
    pub fn enable_temperature_sensor(&mut self) {
        self.refctrl |= 1 << adc::REFCTRL_TEMPREF.offset();
    }

    pub fn enable_bandgap(&mut self) {
        self.refctrl |= 1 << adc::REFCTRL_BANDGAP.offset();
    }
}

/// Channel 0 configuration, staged in register image form.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct AdcChannelConfig {
    ctrl: u8,
    muxctrl: u8,
    intctrl: u8,
}

impl AdcChannelConfig {
    /// Single-ended conversion of one pin.
    pub fn set_single_ended(&mut self, pin: u8) {
        self.ctrl = (self.ctrl & !(adc::CH0_CTRL_INPUTMODE.mask() as u8)) | 1;
        self.muxctrl = (pin & adc::CH0_MUXCTRL_MUXPOS.mask() as u8)
            << adc::CH0_MUXCTRL_MUXPOS.offset();
    }

    /// Conversion of one of the internal sources.
    pub fn set_internal(&mut self, source: InternalInput) {
        self.ctrl &= !(adc::CH0_CTRL_INPUTMODE.mask() as u8);
        self.muxctrl = (source as u8) << adc::CH0_MUXCTRL_MUXPOS.offset();
    }

    pub fn set_gain(&mut self, gain: Gain) {
        let mask = (adc::CH0_CTRL_GAIN.mask() as u8) << adc::CH0_CTRL_GAIN.offset();
        self.ctrl = (self.ctrl & !mask) | ((gain as u8) << adc::CH0_CTRL_GAIN.offset());
    }

    pub fn set_interrupt_level(&mut self, level: Level) {
        let mask = adc::CH0_INTCTRL_INTLVL.mask() as u8;
        self.intctrl = (self.intctrl & !mask) | level as u8;
    }
}

pub struct Adc {
    csr: CSR<u8>,
}

impl Adc {
    pub fn new() -> Adc {
        let base = periph_base::<u8>(adc::HW_ADCA_BASE, adc::ADC_NUMREGS);
        Adc { csr: CSR::new(base) }
    }

    pub fn vector(&self) -> usize {
        vector::ADCA_CH0
    }

    pub fn write_configuration(&mut self, config: &AdcConfig) {
        self.csr.wo(adc::CTRLB, config.ctrlb);
        self.csr.wo(adc::REFCTRL, config.refctrl);
        self.csr.wo(adc::EVCTRL, config.evctrl);
        self.csr.wo(adc::PRESCALER, config.prescaler);
    }

    pub fn read_configuration(&self) -> AdcConfig {
        AdcConfig {
            ctrlb: self.csr.r(adc::CTRLB),
            refctrl: self.csr.r(adc::REFCTRL),
            evctrl: self.csr.r(adc::EVCTRL),
            prescaler: self.csr.r(adc::PRESCALER),
        }
    }

    pub fn write_channel_configuration(&mut self, config: &AdcChannelConfig) {
        self.csr.wo(adc::CH0_CTRL, config.ctrl);
        self.csr.wo(adc::CH0_MUXCTRL, config.muxctrl);
        self.csr.wo(adc::CH0_INTCTRL, config.intctrl);
    }

    pub fn read_channel_configuration(&self) -> AdcChannelConfig {
        AdcChannelConfig {
            ctrl: self.csr.r(adc::CH0_CTRL),
            muxctrl: self.csr.r(adc::CH0_MUXCTRL),
            intctrl: self.csr.r(adc::CH0_INTCTRL),
        }
    }

    /// Ungate the module clock, pin the sleep depth at Idle and switch the
    /// converter on.
    pub fn enable(&mut self) {
        critical_section::with(|_| {
            sysclk::enable_module(Port::A, pr::PR_ADC);
            self.csr.rmwf(adc::CTRLA_ENABLE, 1);
        });
        sleepmgr::xmega::lock(sleepmgr::xmega::SleepMode::Idle);
    }

    pub fn disable(&mut self) {
        critical_section::with(|_| {
            self.csr.rmwf(adc::CTRLA_ENABLE, 0);
            sysclk::disable_module(Port::A, pr::PR_ADC);
        });
        sleepmgr::xmega::unlock(sleepmgr::xmega::SleepMode::Idle);
    }

    pub fn is_enabled(&self) -> bool {
        self.csr.rf(adc::CTRLA_ENABLE) != 0
    }

    pub fn start_conversion(&mut self) {
        self.csr.rmwf(adc::CTRLA_CH0START, 1);
    }

    /// Drain the pipeline; the next start converts from a clean state.
    pub fn flush(&mut self) {
        self.csr.rmwf(adc::CTRLA_FLUSH, 1);
    }

    /// Block until channel 0 completes, then acknowledge the flag.
    pub fn wait_for_interrupt_flag(&mut self) -> Result<(), Status> {
        poll_timeout(POLL_LIMIT, || self.csr.rf(adc::CH0_INTFLAGS_IF) != 0)?;
        self.csr.wo(adc::CH0_INTFLAGS, 1);
        Ok(())
    }

    /// Channel 0 result. Reading the low byte latches the high byte, so the
    /// order here matters on silicon.
    pub fn get_result(&self) -> i16 {
        let low = self.csr.r(adc::CH0_RESL) as u16;
        let high = self.csr.r(adc::CH0_RESH) as u16;
        ((high << 8) | low) as i16
    }
}

impl Default for Adc {
    fn default() -> Self {
        Adc::new()
    }
}

/// NTC thermistor transfer, 10k bead against a 10k pullup on a 12-bit
/// unsigned conversion. Counts for -10..=85 degrees in 5 degree steps.
const NTC_COUNTS: [u16; 20] = [
    3495, 3337, 3156, 2955, 2738, 2510, 2278, 2048, 1825, 1614, 1419, 1241, 1081, 940, 816, 707,
    613, 532, 462, 401,
];
const NTC_FIRST_C: i16 = -10;
const NTC_STEP_C: i16 = 5;

/// Translate an NTC sample to whole degrees Celsius, interpolating between
/// table steps and clamping outside them.
pub fn ntc_to_celsius(sample: u16) -> i16 {
    if sample >= NTC_COUNTS[0] {
        return NTC_FIRST_C;
    }
    let last = NTC_COUNTS.len() - 1;
    if sample <= NTC_COUNTS[last] {
        return NTC_FIRST_C + NTC_STEP_C * last as i16;
    }
    let mut i = 0;
    while NTC_COUNTS[i + 1] > sample {
        i += 1;
    }
    let span = (NTC_COUNTS[i] - NTC_COUNTS[i + 1]) as i32;
    let above = (NTC_COUNTS[i] - sample) as i32;
    let base = (NTC_FIRST_C + NTC_STEP_C * i as i16) as i32;
    (base + (NTC_STEP_C as i32 * above + span / 2) / span) as i16
}
