//! PWM controller driver.
//!
//! Configuration registers sit behind a write-protect unit; registers are
//! grouped and each group can be locked in software (until unlocked) or in
//! hardware (until the next reset). The driver checks the protection status
//! before touching a protected group so a silently dropped bus write
//! surfaces as an error instead.

use hal_api::{poll_timeout, Status, POLL_LIMIT};
use hatra::uc3::pwm;
use hatra::{periph_base, CSR};

/// Write-protect register groups.
pub const GROUP_CLOCK: u8 = 0;
pub const GROUP_CHANNEL: u8 = 1;
pub const GROUP_DEAD_TIME: u8 = 2;
const GROUPS: u8 = 6;

const WPCMD_SW_DISABLE: u32 = 0;
const WPCMD_SW_ENABLE: u32 = 1;
const WPCMD_HW_ENABLE: u32 = 2;

/// Channel clock prescaler, CMR.CPRE encoding.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Prescaler {
    MckDiv1 = 0,
    MckDiv2 = 1,
    MckDiv4 = 2,
    MckDiv8 = 3,
    MckDiv16 = 4,
    MckDiv32 = 5,
    MckDiv64 = 6,
    MckDiv128 = 7,
    MckDiv256 = 8,
    MckDiv512 = 9,
    MckDiv1024 = 10,
    ClkA = 11,
    ClkB = 12,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Alignment {
    Left = 0,
    Center = 1,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Polarity {
    Low = 0,
    High = 1,
}

/// Divider setup for the two shared channel clocks CLKA/CLKB.
/// A divider of zero turns the clock off.
#[derive(Debug, Copy, Clone, Default)]
pub struct ClockConfig {
    pub diva: u8,
    pub prea: u8,
    pub divb: u8,
    pub preb: u8,
}

#[derive(Debug, Copy, Clone)]
pub struct ChannelConfig {
    pub prescaler: Prescaler,
    pub alignment: Alignment,
    pub polarity: Polarity,
    pub dead_time: bool,
    pub duty: u32,
    pub period: u32,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        ChannelConfig {
            prescaler: Prescaler::MckDiv1,
            alignment: Alignment::Left,
            polarity: Polarity::Low,
            dead_time: false,
            duty: 0,
            period: 0,
        }
    }
}

pub struct Pwm {
    csr: CSR<u32>,
}

impl Pwm {
    pub fn new() -> Pwm {
        Pwm { csr: CSR::new(periph_base::<u32>(pwm::HW_PWM_BASE, pwm::PWM_NUMREGS)) }
    }

    fn check_unlocked(&self, group: u8) -> Result<(), Status> {
        if self.sw_locked(group) || self.hw_locked(group) {
            return Err(Status::DeviceError);
        }
        Ok(())
    }

    pub fn set_clocks(&mut self, config: &ClockConfig) -> Result<(), Status> {
        if config.prea > 10 || config.preb > 10 {
            return Err(Status::InvalidArg);
        }
        self.check_unlocked(GROUP_CLOCK)?;
        let v = self.csr.ms(pwm::CLK_DIVA, config.diva as u32)
            | self.csr.ms(pwm::CLK_PREA, config.prea as u32)
            | self.csr.ms(pwm::CLK_DIVB, config.divb as u32)
            | self.csr.ms(pwm::CLK_PREB, config.preb as u32);
        self.csr.wo(pwm::CLK, v);
        Ok(())
    }

    pub fn channel_init(&mut self, ch: usize, config: &ChannelConfig) -> Result<(), Status> {
        if ch >= pwm::CHANNELS {
            return Err(Status::InvalidArg);
        }
        if config.period != 0 && config.duty > config.period {
            return Err(Status::InvalidArg);
        }
        self.check_unlocked(GROUP_CHANNEL)?;
        let cmr = self.csr.ms(pwm::CMR0_CPRE, config.prescaler as u32)
            | self.csr.ms(pwm::CMR0_CALG, config.alignment as u32)
            | self.csr.ms(pwm::CMR0_CPOL, config.polarity as u32)
            | self.csr.ms(pwm::CMR0_DTE, config.dead_time as u32);
        self.csr.wo(pwm::cmr(ch), cmr);
        self.csr.wo(pwm::cdty(ch), config.duty);
        self.csr.wo(pwm::cprd(ch), config.period);
        Ok(())
    }

    pub fn start(&mut self, channel_mask: u32) {
        self.csr.wo(pwm::ENA, channel_mask);
    }

    pub fn stop(&mut self, channel_mask: u32) {
        self.csr.wo(pwm::DIS, channel_mask);
    }

    pub fn running(&self) -> u32 {
        self.csr.r(pwm::SR)
    }

    /// Stage a new duty cycle; hardware latches it at the next period
    /// boundary so the output never glitches. On a running channel the
    /// write is placed right after a period event so the staged value
    /// cannot be overwritten mid-latch.
    pub fn update_duty(&mut self, ch: usize, duty: u32) -> Result<(), Status> {
        if ch >= pwm::CHANNELS {
            return Err(Status::InvalidArg);
        }
        let period = self.csr.r(pwm::cprd(ch));
        if period != 0 && duty > period {
            return Err(Status::InvalidArg);
        }
        self.check_unlocked(GROUP_CHANNEL)?;
        if self.running() & (1 << ch) != 0 {
            // flush stale flags, then wait out the current period
            let _ = self.csr.r(pwm::ISR1);
            poll_timeout(POLL_LIMIT, || self.csr.r(pwm::ISR1) & (1 << ch) != 0)?;
        }
        self.csr.wo(pwm::cdtyupd(ch), duty);
        Ok(())
    }

    pub fn update_period(&mut self, ch: usize, period: u32) -> Result<(), Status> {
        if ch >= pwm::CHANNELS {
            return Err(Status::InvalidArg);
        }
        self.check_unlocked(GROUP_CHANNEL)?;
        self.csr.wo(pwm::cprdupd(ch), period);
        Ok(())
    }

    pub fn set_dead_time(&mut self, ch: usize, high: u16, low: u16) -> Result<(), Status> {
        if ch >= pwm::CHANNELS {
            return Err(Status::InvalidArg);
        }
        self.check_unlocked(GROUP_DEAD_TIME)?;
        self.csr.wo(pwm::dt(ch), ((low as u32) << 16) | high as u32);
        Ok(())
    }

    pub fn counter(&self, ch: usize) -> u32 {
        if ch >= pwm::CHANNELS {
            return 0;
        }
        self.csr.r(pwm::ccnt(ch))
    }

    /// Unmask end-of-period events for the channels in `mask`.
    pub fn enable_interrupts(&mut self, channel_mask: u32) {
        self.csr.wo(pwm::IER1, channel_mask);
    }

    pub fn disable_interrupts(&mut self, channel_mask: u32) {
        self.csr.wo(pwm::IDR1, channel_mask);
    }

    /// Read and clear the per-channel event flags.
    pub fn pending(&self) -> u32 {
        self.csr.r(pwm::ISR1)
    }

    fn write_protect(&mut self, cmd: u32, group: u8) {
        let v = self.csr.ms(pwm::WPCR_WPCMD, cmd)
            | self.csr.ms(pwm::WPCR_WPRG, 1 << group)
            | self.csr.ms(pwm::WPCR_WPKEY, pwm::WPCR_KEY_VALUE as u32);
        self.csr.wo(pwm::WPCR, v);
    }

    pub fn lock_group(&mut self, group: u8, hardware: bool) -> Result<(), Status> {
        if group >= GROUPS {
            return Err(Status::InvalidArg);
        }
        self.write_protect(if hardware { WPCMD_HW_ENABLE } else { WPCMD_SW_ENABLE }, group);
        Ok(())
    }

    /// Release a software lock. Hardware locks hold until reset.
    pub fn unlock_group(&mut self, group: u8) -> Result<(), Status> {
        if group >= GROUPS {
            return Err(Status::InvalidArg);
        }
        if self.hw_locked(group) {
            return Err(Status::DeviceError);
        }
        self.write_protect(WPCMD_SW_DISABLE, group);
        Ok(())
    }

    pub fn sw_locked(&self, group: u8) -> bool {
        (self.csr.rf(pwm::WPSR_WPSWS) >> group) & 1 != 0
    }

    pub fn hw_locked(&self, group: u8) -> bool {
        (self.csr.rf(pwm::WPSR_WPHWS) >> group) & 1 != 0
    }
}

impl Default for Pwm {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hatra::hosted::{self, Access, HookAction};

    // WPCR commands land in WPSR, the way the protect unit behaves.
    fn install_protect_model() {
        let base = pwm::HW_PWM_BASE;
        hosted::install_hook(
            base,
            Box::new(move |off, access| {
                if off == pwm::WPCR.offset() {
                    if let Access::Write(v) = access {
                        if (v >> 8) & 0xFF_FFFF != pwm::WPCR_KEY_VALUE {
                            // wrong key, command ignored
                            return HookAction::Replace(0);
                        }
                        let groups = (v >> 2) & 0x3F;
                        let mut wpsr = hosted::peek(base, pwm::WPSR.offset());
                        match v & 3 {
                            0 => wpsr &= !groups,
                            1 => wpsr |= groups,
                            2 => wpsr |= groups << 8,
                            _ => {}
                        }
                        hosted::poke(base, pwm::WPSR.offset(), wpsr);
                        return HookAction::Replace(0);
                    }
                }
                HookAction::Pass
            }),
        );
    }

    #[test]
    fn channel_setup_lands_in_channel_registers() {
        let mut pwm_blk = Pwm::new();
        let cfg = ChannelConfig {
            prescaler: Prescaler::ClkA,
            alignment: Alignment::Center,
            polarity: Polarity::High,
            duty: 250,
            period: 1000,
            ..Default::default()
        };
        pwm_blk.channel_init(2, &cfg).unwrap();
        let base = pwm::HW_PWM_BASE;
        let cmr = hosted::peek(base, pwm::cmr(2).offset());
        assert_eq!(cmr & 0xF, 11);
        assert_ne!(cmr & (1 << 8), 0);
        assert_ne!(cmr & (1 << 9), 0);
        assert_eq!(hosted::peek(base, pwm::cdty(2).offset()), 250);
        assert_eq!(hosted::peek(base, pwm::cprd(2).offset()), 1000);
    }

    #[test]
    fn duty_beyond_period_is_refused() {
        let mut pwm_blk = Pwm::new();
        let cfg = ChannelConfig { duty: 1001, period: 1000, ..Default::default() };
        assert_eq!(pwm_blk.channel_init(0, &cfg), Err(Status::InvalidArg));
        let ok = ChannelConfig { duty: 100, period: 1000, ..Default::default() };
        pwm_blk.channel_init(0, &ok).unwrap();
        assert_eq!(pwm_blk.update_duty(0, 2000), Err(Status::InvalidArg));
        assert!(pwm_blk.update_duty(0, 500).is_ok());
        assert_eq!(hosted::peek(pwm::HW_PWM_BASE, pwm::cdtyupd(0).offset()), 500);
    }

    #[test]
    fn software_lock_blocks_channel_writes() {
        let mut pwm_blk = Pwm::new();
        install_protect_model();
        pwm_blk.lock_group(GROUP_CHANNEL, false).unwrap();
        let cfg = ChannelConfig { period: 100, ..Default::default() };
        assert_eq!(pwm_blk.channel_init(1, &cfg), Err(Status::DeviceError));
        // clock group is a different lock
        assert!(pwm_blk.set_clocks(&ClockConfig { diva: 1, prea: 2, ..Default::default() }).is_ok());
        pwm_blk.unlock_group(GROUP_CHANNEL).unwrap();
        assert!(pwm_blk.channel_init(1, &cfg).is_ok());
        hosted::remove_hook(pwm::HW_PWM_BASE);
    }

    #[test]
    fn hardware_lock_cannot_be_released() {
        let mut pwm_blk = Pwm::new();
        install_protect_model();
        pwm_blk.lock_group(GROUP_DEAD_TIME, true).unwrap();
        assert_eq!(pwm_blk.unlock_group(GROUP_DEAD_TIME), Err(Status::DeviceError));
        assert_eq!(pwm_blk.set_dead_time(0, 10, 20), Err(Status::DeviceError));
        hosted::remove_hook(pwm::HW_PWM_BASE);
    }

    #[test]
    fn live_channel_update_waits_for_the_period_edge() {
        let mut pwm_blk = Pwm::new();
        let base = pwm::HW_PWM_BASE;
        let cfg = ChannelConfig { duty: 10, period: 100, ..Default::default() };
        pwm_blk.channel_init(3, &cfg).unwrap();
        hosted::poke(base, pwm::SR.offset(), 1 << 3);
        let reads = core::cell::Cell::new(0usize);
        hosted::install_hook(
            base,
            Box::new(move |off, access| {
                if off == pwm::ISR1.offset() && matches!(access, Access::Read) {
                    let n = reads.get() + 1;
                    reads.set(n);
                    // the period event shows up on the third poll
                    return HookAction::Replace(if n >= 3 { 1 << 3 } else { 0 });
                }
                HookAction::Pass
            }),
        );
        pwm_blk.update_duty(3, 55).unwrap();
        assert_eq!(hosted::peek(base, pwm::cdtyupd(3).offset()), 55);
        hosted::remove_hook(base);
    }

    #[test]
    fn start_stop_track_the_status_register() {
        let mut pwm_blk = Pwm::new();
        let base = pwm::HW_PWM_BASE;
        hosted::install_hook(
            base,
            Box::new(move |off, access| {
                if let Access::Write(v) = access {
                    let sr = hosted::peek(base, pwm::SR.offset());
                    if off == pwm::ENA.offset() {
                        hosted::poke(base, pwm::SR.offset(), sr | v);
                        return HookAction::Replace(0);
                    }
                    if off == pwm::DIS.offset() {
                        hosted::poke(base, pwm::SR.offset(), sr & !v);
                        return HookAction::Replace(0);
                    }
                }
                HookAction::Pass
            }),
        );
        pwm_blk.start(0b0101);
        assert_eq!(pwm_blk.running(), 0b0101);
        pwm_blk.stop(0b0001);
        assert_eq!(pwm_blk.running(), 0b0100);
        hosted::remove_hook(base);
    }
}
