//! Timer/Counter driver: waveform generation and capture on three 16-bit
//! channels.

use bitflags::bitflags;
use hal_api::Status;
use hatra::uc3::{irq, tc};
use hatra::{periph_base, CSR};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ClockSource {
    /// PBA clock / 2.
    Timer1 = 0,
    /// PBA clock / 8.
    Timer2 = 1,
    /// PBA clock / 32.
    Timer3 = 2,
    /// PBA clock / 128.
    Timer4 = 3,
    /// 32 kHz slow clock.
    Timer5 = 4,
    Xc0 = 5,
    Xc1 = 6,
    Xc2 = 7,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum WaveformSelect {
    Up = 0,
    UpDown = 1,
    UpRc = 2,
    UpDownRc = 3,
}

/// Effect of a compare match on a TIO output.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TioEffect {
    None = 0,
    Set = 1,
    Clear = 2,
    Toggle = 3,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CaptureTrigger {
    None = 0,
    Rising = 1,
    Falling = 2,
    Both = 3,
}

#[derive(Debug, Copy, Clone)]
pub struct WaveformConfig {
    pub source: ClockSource,
    pub clock_invert: bool,
    pub wavsel: WaveformSelect,
    /// RA compare effect on TIOA.
    pub acpa: TioEffect,
    /// RC compare effect on TIOA.
    pub acpc: TioEffect,
    /// RB compare effect on TIOB.
    pub bcpb: TioEffect,
    /// RC compare effect on TIOB.
    pub bcpc: TioEffect,
    pub stop_on_rc: bool,
    pub disable_on_rc: bool,
}

impl Default for WaveformConfig {
    fn default() -> Self {
        WaveformConfig {
            source: ClockSource::Timer1,
            clock_invert: false,
            wavsel: WaveformSelect::UpRc,
            acpa: TioEffect::None,
            acpc: TioEffect::None,
            bcpb: TioEffect::None,
            bcpc: TioEffect::None,
            stop_on_rc: false,
            disable_on_rc: false,
        }
    }
}

#[derive(Debug, Copy, Clone)]
pub struct CaptureConfig {
    pub source: ClockSource,
    pub clock_invert: bool,
    pub ldra: CaptureTrigger,
    pub ldrb: CaptureTrigger,
    /// External trigger on TIOA rather than TIOB.
    pub trigger_on_tioa: bool,
    pub external_trigger_edge: CaptureTrigger,
    /// RC compare retriggers the counter.
    pub rc_retrigger: bool,
    pub stop_on_rb_load: bool,
    pub disable_on_rb_load: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        CaptureConfig {
            source: ClockSource::Timer1,
            clock_invert: false,
            ldra: CaptureTrigger::None,
            ldrb: CaptureTrigger::None,
            trigger_on_tioa: true,
            external_trigger_edge: CaptureTrigger::None,
            rc_retrigger: false,
            stop_on_rb_load: false,
            disable_on_rb_load: false,
        }
    }
}

bitflags! {
    /// Channel status and interrupt bits, SR/IER/IDR/IMR layout.
    pub struct TcFlags: u32 {
        const COUNTER_OVERFLOW = 1 << 0;
        const LOAD_OVERRUN     = 1 << 1;
        const RA_COMPARE       = 1 << 2;
        const RB_COMPARE       = 1 << 3;
        const RC_COMPARE       = 1 << 4;
        const RA_LOAD          = 1 << 5;
        const RB_LOAD          = 1 << 6;
        const EXT_TRIGGER      = 1 << 7;
    }
}

pub struct TimerChannel {
    csr: CSR<u32>,
    ch: usize,
}

impl TimerChannel {
    pub fn new(ch: usize) -> Result<TimerChannel, Status> {
        if ch >= tc::CHANNELS {
            return Err(Status::InvalidArg);
        }
        let base = periph_base::<u32>(tc::HW_TC_BASE, tc::TC_NUMREGS);
        Ok(TimerChannel { csr: CSR::new(base), ch })
    }

    pub fn irq(&self) -> usize {
        irq::TC_CH0 + self.ch
    }

    pub fn init_waveform(&mut self, config: &WaveformConfig) {
        let v = self.csr.ms(tc::CMR0_TCCLKS, config.source as u32)
            | self.csr.ms(tc::CMR0_CLKI, config.clock_invert as u32)
            | self.csr.ms(tc::CMR0_CPCSTOP, config.stop_on_rc as u32)
            | self.csr.ms(tc::CMR0_CPCDIS, config.disable_on_rc as u32)
            | self.csr.ms(tc::CMR0_WAVSEL, config.wavsel as u32)
            | self.csr.ms(tc::CMR0_WAVE, 1)
            | self.csr.ms(tc::CMR0_ACPA, config.acpa as u32)
            | self.csr.ms(tc::CMR0_ACPC, config.acpc as u32)
            | self.csr.ms(tc::CMR0_BCPB, config.bcpb as u32)
            | self.csr.ms(tc::CMR0_BCPC, config.bcpc as u32);
        self.csr.wo(tc::cmr(self.ch), v);
    }

    pub fn init_capture(&mut self, config: &CaptureConfig) {
        let v = self.csr.ms(tc::CMR0_TCCLKS, config.source as u32)
            | self.csr.ms(tc::CMR0_CLKI, config.clock_invert as u32)
            | self.csr.ms(tc::CMR0_LDBSTOP, config.stop_on_rb_load as u32)
            | self.csr.ms(tc::CMR0_LDBDIS, config.disable_on_rb_load as u32)
            | self.csr.ms(tc::CMR0_ETRGEDG, config.external_trigger_edge as u32)
            | self.csr.ms(tc::CMR0_ABETRG, config.trigger_on_tioa as u32)
            | self.csr.ms(tc::CMR0_CPCTRG, config.rc_retrigger as u32)
            | self.csr.ms(tc::CMR0_LDRA, config.ldra as u32)
            | self.csr.ms(tc::CMR0_LDRB, config.ldrb as u32);
        self.csr.wo(tc::cmr(self.ch), v);
    }

    /// Enable the clock and software-trigger the channel.
    pub fn start(&mut self) {
        let v = self.csr.ms(tc::CCR0_CLKEN, 1) | self.csr.ms(tc::CCR0_SWTRG, 1);
        self.csr.wo(tc::ccr(self.ch), v);
    }

    pub fn stop(&mut self) {
        self.csr.wo(tc::ccr(self.ch), self.csr.ms(tc::CCR0_CLKDIS, 1));
    }

    pub fn counter(&self) -> u16 {
        self.csr.r(tc::cv(self.ch)) as u16
    }

    pub fn set_ra(&mut self, value: u16) {
        self.csr.wo(tc::ra(self.ch), value as u32);
    }

    pub fn set_rb(&mut self, value: u16) {
        self.csr.wo(tc::rb(self.ch), value as u32);
    }

    pub fn set_rc(&mut self, value: u16) {
        self.csr.wo(tc::rc(self.ch), value as u32);
    }

    pub fn ra(&self) -> u16 {
        self.csr.r(tc::ra(self.ch)) as u16
    }

    pub fn rb(&self) -> u16 {
        self.csr.r(tc::rb(self.ch)) as u16
    }

    /// Read and clear the channel status.
    pub fn status(&self) -> TcFlags {
        TcFlags::from_bits_truncate(self.csr.r(tc::sr(self.ch)))
    }

    pub fn running(&self) -> bool {
        (self.csr.r(tc::sr(self.ch)) >> 16) & 1 != 0
    }

    /// Enable exactly the interrupts in `flags`, disabling the rest.
    pub fn configure_interrupts(&mut self, flags: TcFlags) {
        self.csr.wo(tc::ier(self.ch), flags.bits());
        self.csr.wo(tc::idr(self.ch), !flags.bits() & TcFlags::all().bits());
    }
}

/// Software-trigger every channel in one bus write.
pub fn sync_start_all() {
    let mut csr: CSR<u32> = CSR::new(periph_base::<u32>(tc::HW_TC_BASE, tc::TC_NUMREGS));
    csr.wfo(tc::BCR_SYNC, 1);
}
