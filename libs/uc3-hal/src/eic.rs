//! External Interrupt Controller.
//!
//! Line 0 is the NMI; lines 1..=8 are the maskable external interrupts
//! routed through the interrupt controller.

use hal_api::Status;
use hatra::uc3::{eic, irq};
use hatra::{periph_base, CSR};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Trigger {
    RisingEdge,
    FallingEdge,
    HighLevel,
    LowLevel,
}

#[derive(Debug, Copy, Clone)]
pub struct LineConfig {
    pub trigger: Trigger,
    pub filter: bool,
    /// Keep the line armed in sleep modes where the EIC clock stops.
    pub asynchronous: bool,
}

impl Default for LineConfig {
    fn default() -> Self {
        LineConfig { trigger: Trigger::FallingEdge, filter: false, asynchronous: false }
    }
}

pub struct Eic {
    csr: CSR<u32>,
}

impl Eic {
    pub fn new() -> Eic {
        Eic { csr: CSR::new(periph_base::<u32>(eic::HW_EIC_BASE, eic::EIC_NUMREGS)) }
    }

    /// Configure a batch of lines in one go, the usual board-init shape.
    pub fn init(&mut self, lines: &[(usize, LineConfig)]) -> Result<(), Status> {
        for (line, config) in lines {
            self.configure_line(*line, config)?;
        }
        Ok(())
    }

    pub fn configure_line(&mut self, line: usize, config: &LineConfig) -> Result<(), Status> {
        if line >= eic::EIC_LINES {
            return Err(Status::InvalidArg);
        }
        let bit = 1u32 << line;
        let set = |reg, on: bool| {
            let mut csr = self.csr;
            let v = csr.r(reg);
            csr.wo(reg, if on { v | bit } else { v & !bit });
        };
        let (level, rising_or_high) = match config.trigger {
            Trigger::RisingEdge => (false, true),
            Trigger::FallingEdge => (false, false),
            Trigger::HighLevel => (true, true),
            Trigger::LowLevel => (true, false),
        };
        set(eic::MODE, level);
        if level {
            set(eic::LEVEL, rising_or_high);
        } else {
            set(eic::EDGE, rising_or_high);
        }
        set(eic::FILTER, config.filter);
        set(eic::ASYNC, config.asynchronous);
        Ok(())
    }

    pub fn enable_lines(&mut self, mask: u32) {
        self.csr.wo(eic::EN, mask);
        self.csr.wo(eic::IER, mask);
    }

    /// Disable under a critical section: a line firing between the DIS
    /// write and the flag clear would leave a stale pending bit behind.
    pub fn disable_lines(&mut self, mask: u32) {
        critical_section::with(|_| {
            self.csr.wo(eic::DIS, mask);
            self.csr.wo(eic::IDR, mask);
            self.csr.wo(eic::ICR, mask);
        });
    }

    pub fn clear_lines(&mut self, mask: u32) {
        critical_section::with(|_| {
            self.csr.wo(eic::ICR, mask);
        });
    }

    pub fn pending(&self, line: usize) -> bool {
        line < eic::EIC_LINES && (self.csr.r(eic::ISR) >> line) & 1 != 0
    }

    pub fn pending_mask(&self) -> u32 {
        self.csr.r(eic::ISR)
    }

    pub fn enabled_mask(&self) -> u32 {
        self.csr.r(eic::CTRL)
    }

    /// Start keypad scan with the given clock prescaler.
    pub fn enable_scan(&mut self, prescaler: u8) -> Result<(), Status> {
        if prescaler > 31 {
            return Err(Status::InvalidArg);
        }
        let v = self.csr.ms(eic::SCAN_EN, 1) | self.csr.ms(eic::SCAN_PRESC, prescaler as u32);
        self.csr.wo(eic::SCAN, v);
        Ok(())
    }

    pub fn disable_scan(&mut self) {
        let v = self.csr.r(eic::SCAN);
        self.csr.wo(eic::SCAN, self.csr.zf(eic::SCAN_EN, v));
    }

    /// Scan column active when the last interrupt fired.
    pub fn scan_pin(&self) -> u8 {
        self.csr.rf(eic::SCAN_PIN) as u8
    }

    /// Interrupt controller line for an EIC line, if it has one.
    pub fn irq(line: usize) -> Option<usize> {
        if (1..eic::EIC_LINES).contains(&line) {
            Some(irq::EIC_1 + line - 1)
        } else {
            None
        }
    }
}

impl Default for Eic {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hatra::hosted::{self, Access, HookAction};

    fn peek(reg: hatra::Register) -> usize {
        hosted::peek(eic::HW_EIC_BASE, reg.offset())
    }

    #[test]
    fn edge_and_level_triggers_hit_distinct_registers() {
        let mut eic_blk = Eic::new();
        eic_blk
            .configure_line(2, &LineConfig { trigger: Trigger::RisingEdge, ..Default::default() })
            .unwrap();
        assert_eq!(peek(eic::MODE) & (1 << 2), 0);
        assert_ne!(peek(eic::EDGE) & (1 << 2), 0);

        eic_blk
            .configure_line(
                5,
                &LineConfig { trigger: Trigger::LowLevel, filter: true, asynchronous: true },
            )
            .unwrap();
        assert_ne!(peek(eic::MODE) & (1 << 5), 0);
        assert_eq!(peek(eic::LEVEL) & (1 << 5), 0);
        assert_ne!(peek(eic::FILTER) & (1 << 5), 0);
        assert_ne!(peek(eic::ASYNC) & (1 << 5), 0);
        // line 2 config untouched
        assert_ne!(peek(eic::EDGE) & (1 << 2), 0);

        assert_eq!(
            eic_blk.configure_line(eic::EIC_LINES, &Default::default()),
            Err(Status::InvalidArg)
        );
    }

    #[test]
    fn batch_init_applies_every_line() {
        let mut eic_blk = Eic::new();
        eic_blk
            .init(&[
                (1, LineConfig { trigger: Trigger::RisingEdge, ..Default::default() }),
                (4, LineConfig { trigger: Trigger::HighLevel, ..Default::default() }),
            ])
            .unwrap();
        assert_ne!(peek(eic::EDGE) & (1 << 1), 0);
        assert_ne!(peek(eic::MODE) & (1 << 4), 0);
        assert_ne!(peek(eic::LEVEL) & (1 << 4), 0);
        assert_eq!(
            eic_blk.init(&[(eic::EIC_LINES, Default::default())]),
            Err(Status::InvalidArg)
        );
    }

    #[test]
    fn pending_lines_clear_on_acknowledge() {
        let mut eic_blk = Eic::new();
        let base = eic::HW_EIC_BASE;
        // ICR is write-one-to-clear against ISR
        hosted::install_hook(
            base,
            Box::new(move |off, access| {
                if off == eic::ICR.offset() {
                    if let Access::Write(v) = access {
                        let isr = hosted::peek(base, eic::ISR.offset());
                        hosted::poke(base, eic::ISR.offset(), isr & !v);
                        return HookAction::Replace(0);
                    }
                }
                HookAction::Pass
            }),
        );
        hosted::poke_or(base, eic::ISR.offset(), (1 << 3) | (1 << 7));
        assert!(eic_blk.pending(3));
        assert!(eic_blk.pending(7));
        eic_blk.clear_lines(1 << 3);
        assert!(!eic_blk.pending(3));
        assert!(eic_blk.pending(7));
        hosted::remove_hook(base);
    }

    #[test]
    fn scan_reports_active_column() {
        let mut eic_blk = Eic::new();
        eic_blk.enable_scan(4).unwrap();
        let scan = peek(eic::SCAN);
        assert_eq!(scan & 1, 1);
        assert_eq!((scan >> 8) & 0x1F, 4);
        hosted::poke(eic::HW_EIC_BASE, eic::SCAN.offset(), scan | (5 << 24));
        assert_eq!(eic_blk.scan_pin(), 5);
        assert_eq!(eic_blk.enable_scan(32), Err(Status::InvalidArg));
    }

    #[test]
    fn irq_lines_skip_the_nmi() {
        assert_eq!(Eic::irq(0), None);
        assert_eq!(Eic::irq(1), Some(irq::EIC_1));
        assert_eq!(Eic::irq(8), Some(irq::EIC_1 + 7));
        assert_eq!(Eic::irq(9), None);
    }
}
