//! Peripheral Event Controller: routes generator events to peripheral
//! trigger inputs without core involvement.

use hal_api::Status;
use hatra::uc3::{irq, pevc};
use hatra::{periph_base, CSR};

/// How a generator's event is shaped before it reaches the channel.
#[derive(Debug, Copy, Clone)]
pub struct EventShaper {
    /// Input glitch filter length selector, when filtering is wanted.
    pub filter: Option<u8>,
    pub on_rising: bool,
    pub on_falling: bool,
}

impl Default for EventShaper {
    fn default() -> Self {
        EventShaper { filter: None, on_rising: true, on_falling: false }
    }
}

pub struct Pevc {
    csr: CSR<u32>,
}

impl Pevc {
    pub fn new() -> Pevc {
        Pevc { csr: CSR::new(periph_base::<u32>(pevc::HW_PEVC_BASE, pevc::PEVC_NUMREGS)) }
    }

    pub fn trigger_irq(&self) -> usize {
        irq::PEVC_TR
    }

    pub fn overrun_irq(&self) -> usize {
        irq::PEVC_OV
    }

    /// Connect `generator` to `channel` and enable the generator's event
    /// shaper. The channel still has to be enabled afterwards.
    pub fn configure_channel(
        &mut self,
        channel: usize,
        generator: usize,
        shaper: &EventShaper,
    ) -> Result<(), Status> {
        if channel >= pevc::CHANNELS || generator >= pevc::GENERATORS {
            return Err(Status::InvalidArg);
        }
        if let Some(f) = shaper.filter {
            if f > 15 {
                return Err(Status::InvalidArg);
            }
        }
        // rerouting a live channel would glitch the consumer
        if self.channel_enabled(channel) {
            return Err(Status::Busy);
        }
        self.csr.wo(pevc::chmx(channel), self.csr.ms(pevc::CHMX0_EVMX, generator as u32));
        let mut evs = self.csr.ms(pevc::EVS0_EN, 1)
            | self.csr.ms(pevc::EVS0_EVR, shaper.on_rising as u32)
            | self.csr.ms(pevc::EVS0_EVF, shaper.on_falling as u32);
        if let Some(f) = shaper.filter {
            evs |= self.csr.ms(pevc::EVS0_IGF, f as u32);
        }
        self.csr.wo(pevc::evs(generator), evs);
        Ok(())
    }

    /// Let software raise this channel's event through [`software_event`].
    ///
    /// [`software_event`]: Self::software_event
    pub fn use_software_event(&mut self, channel: usize) -> Result<(), Status> {
        if channel >= pevc::CHANNELS {
            return Err(Status::InvalidArg);
        }
        let v = self.csr.r(pevc::chmx(channel));
        self.csr.wo(pevc::chmx(channel), v | self.csr.ms(pevc::CHMX0_SMX, 1));
        Ok(())
    }

    pub fn enable_channels(&mut self, mask: u32) {
        self.csr.wo(pevc::CHER0, mask);
    }

    pub fn disable_channels(&mut self, mask: u32) {
        self.csr.wo(pevc::CHDR0, mask);
    }

    pub fn channel_enabled(&self, channel: usize) -> bool {
        channel < pevc::CHANNELS && (self.csr.r(pevc::CHSR0) >> channel) & 1 != 0
    }

    /// Raise a software event on a channel configured for it.
    pub fn software_event(&mut self, channel: usize) -> Result<(), Status> {
        if channel >= pevc::CHANNELS {
            return Err(Status::InvalidArg);
        }
        let chmx = self.csr.r(pevc::chmx(channel));
        if (chmx >> pevc::CHMX0_SMX.offset()) & 1 == 0 {
            return Err(Status::InvalidArg);
        }
        self.csr.wo(pevc::SEV0, 1 << channel);
        Ok(())
    }

    pub fn channel_busy(&self, channel: usize) -> bool {
        channel < pevc::CHANNELS && (self.csr.r(pevc::BUSY0) >> channel) & 1 != 0
    }

    /// Divider for the input glitch filter clock.
    pub fn set_filter_divider(&mut self, divider: u8) -> Result<(), Status> {
        if divider > 15 {
            return Err(Status::InvalidArg);
        }
        self.csr.wfo(pevc::IGFDR_IGFDR, divider as u32);
        Ok(())
    }

    pub fn enable_trigger_interrupts(&mut self, mask: u32) {
        self.csr.wo(pevc::TRIER0, mask);
    }

    pub fn disable_trigger_interrupts(&mut self, mask: u32) {
        self.csr.wo(pevc::TRIDR0, mask);
    }

    pub fn trigger_interrupt_mask(&self) -> u32 {
        self.csr.r(pevc::TRIMR0)
    }

    /// Channels that have fired since last cleared.
    pub fn triggered(&self) -> u32 {
        self.csr.r(pevc::TRSR0)
    }

    pub fn clear_triggered(&mut self, mask: u32) {
        self.csr.wo(pevc::TRSCR0, mask);
    }

    pub fn enable_overrun_interrupts(&mut self, mask: u32) {
        self.csr.wo(pevc::OVIER0, mask);
    }

    pub fn disable_overrun_interrupts(&mut self, mask: u32) {
        self.csr.wo(pevc::OVIDR0, mask);
    }

    pub fn overrun_interrupt_mask(&self) -> u32 {
        self.csr.r(pevc::OVIMR0)
    }

    pub fn overrun(&self) -> u32 {
        self.csr.r(pevc::OVSR0)
    }

    pub fn clear_overrun(&mut self, mask: u32) {
        self.csr.wo(pevc::OVSCR0, mask);
    }
}

impl Default for Pevc {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hatra::hosted::{self, Access, HookAction};

    fn install_channel_model() {
        let base = pevc::HW_PEVC_BASE;
        hosted::install_hook(
            base,
            Box::new(move |off, access| {
                if let Access::Write(v) = access {
                    let fold = |reg: usize, set: bool| {
                        let cur = hosted::peek(base, reg);
                        hosted::poke(base, reg, if set { cur | v } else { cur & !v });
                    };
                    if off == pevc::CHER0.offset() {
                        fold(pevc::CHSR0.offset(), true);
                        return HookAction::Replace(0);
                    }
                    if off == pevc::CHDR0.offset() {
                        fold(pevc::CHSR0.offset(), false);
                        return HookAction::Replace(0);
                    }
                    if off == pevc::SEV0.offset() {
                        // a software event trips the trigger status
                        fold(pevc::TRSR0.offset(), true);
                        return HookAction::Replace(0);
                    }
                    if off == pevc::TRSCR0.offset() {
                        fold(pevc::TRSR0.offset(), false);
                        return HookAction::Replace(0);
                    }
                }
                HookAction::Pass
            }),
        );
    }

    #[test]
    fn channel_mux_and_shaper_land_in_their_registers() {
        let mut ev = Pevc::new();
        let shaper = EventShaper { filter: Some(3), on_rising: true, on_falling: true };
        ev.configure_channel(4, 17, &shaper).unwrap();
        let base = pevc::HW_PEVC_BASE;
        assert_eq!(hosted::peek(base, pevc::chmx(4).offset()), 17);
        let evs = hosted::peek(base, pevc::evs(17).offset());
        assert_ne!(evs & (1 << 31), 0);
        assert_ne!(evs & (1 << 16), 0); // falling
        assert_ne!(evs & (1 << 17), 0); // rising
        assert_eq!(evs & 0xF, 3);
    }

    #[test]
    fn out_of_range_mux_is_refused() {
        let mut ev = Pevc::new();
        assert_eq!(
            ev.configure_channel(pevc::CHANNELS, 0, &Default::default()),
            Err(Status::InvalidArg)
        );
        assert_eq!(
            ev.configure_channel(0, pevc::GENERATORS, &Default::default()),
            Err(Status::InvalidArg)
        );
        let bad = EventShaper { filter: Some(16), ..Default::default() };
        assert_eq!(ev.configure_channel(0, 0, &bad), Err(Status::InvalidArg));
    }

    #[test]
    fn software_event_needs_the_mux_bit() {
        let mut ev = Pevc::new();
        install_channel_model();
        ev.configure_channel(2, 5, &Default::default()).unwrap();
        ev.enable_channels(1 << 2);
        assert!(ev.channel_enabled(2));
        // not yet marked software-capable
        assert_eq!(ev.software_event(2), Err(Status::InvalidArg));
        ev.use_software_event(2).unwrap();
        ev.software_event(2).unwrap();
        assert_eq!(ev.triggered(), 1 << 2);
        ev.clear_triggered(1 << 2);
        assert_eq!(ev.triggered(), 0);
        hosted::remove_hook(pevc::HW_PEVC_BASE);
    }

    #[test]
    fn every_channel_is_addressable_through_bank0() {
        let mut ev = Pevc::new();
        install_channel_model();
        let top = pevc::CHANNELS - 1;
        ev.enable_channels(1 << top);
        assert!(ev.channel_enabled(top));
        assert_eq!(
            hosted::peek(pevc::HW_PEVC_BASE, pevc::CHSR0.offset()) >> top,
            1
        );
        ev.disable_channels(1 << top);
        assert!(!ev.channel_enabled(top));
        hosted::remove_hook(pevc::HW_PEVC_BASE);
    }

    #[test]
    fn disable_clears_only_named_channels() {
        let mut ev = Pevc::new();
        install_channel_model();
        ev.enable_channels(0b1011);
        ev.disable_channels(0b0010);
        assert!(ev.channel_enabled(0));
        assert!(!ev.channel_enabled(1));
        assert!(ev.channel_enabled(3));
        hosted::remove_hook(pevc::HW_PEVC_BASE);
    }

    #[test]
    fn live_channel_refuses_rerouting() {
        let mut ev = Pevc::new();
        install_channel_model();
        ev.configure_channel(6, 10, &Default::default()).unwrap();
        ev.enable_channels(1 << 6);
        assert_eq!(
            ev.configure_channel(6, 11, &Default::default()),
            Err(Status::Busy)
        );
        ev.disable_channels(1 << 6);
        ev.configure_channel(6, 11, &Default::default()).unwrap();
        hosted::remove_hook(pevc::HW_PEVC_BASE);
    }
}
