//! Shared hosted-model plumbing for the demo binaries.
//!
//! Each demo runs the same driver code a kit would run, against the
//! emulated register bank. The helpers here stand in for the parts a
//! workstation does not have: oscillators that come ready when enabled,
//! and a console whose transmit side lands on stdout.

use std::collections::VecDeque;
use std::io::{self, Write};

use hatra::hosted::{self, Access, HookAction};

/// Make the UC3 oscillators report ready as soon as they are enabled and
/// the clock tree report stable, so the board clock bring-up completes.
pub fn uc3_clock_model() {
    use hatra::uc3::{pm, scif};
    hosted::install_hook(
        scif::HW_SCIF_BASE,
        Box::new(|off, access| {
            if let Access::Write(v) = access {
                if off == scif::OSCCTRL0.offset() && v & (1 << 16) != 0 {
                    hosted::poke_or(scif::HW_SCIF_BASE, scif::PCLKSR.offset(), 1);
                }
                if off == scif::OSC32CTRL.offset() && v & 1 != 0 {
                    hosted::poke_or(scif::HW_SCIF_BASE, scif::PCLKSR.offset(), 2);
                }
            }
            HookAction::Pass
        }),
    );
    hosted::poke_or(pm::HW_PM_BASE, pm::SR.offset(), 1 << 5);
}

/// Make the XMEGA 32 MHz RC report ready so the board clock bring-up
/// completes.
pub fn xmega_clock_model() {
    use hatra::xmega::osc;
    hosted::install_hook(
        osc::HW_OSC_BASE,
        Box::new(|off, access| {
            if let Access::Write(v) = access {
                if off == osc::CTRL.offset() && v & (1 << osc::CTRL_RC32MEN.offset()) != 0 {
                    hosted::poke_or(
                        osc::HW_OSC_BASE,
                        osc::STATUS.offset(),
                        1 << osc::STATUS_RC32MRDY.offset(),
                    );
                }
            }
            HookAction::Pass
        }),
    );
}

/// Console model for a UC3 USART at `base`: transmit is always ready and
/// lands on stdout, receive pops from `feed` until it runs dry, after
/// which `read_char` times out and an echo loop winds down on its own.
pub fn uc3_console_model(base: usize, feed: &[u8]) {
    use hatra::uc3::usart;
    let mut pending: VecDeque<u8> = feed.iter().copied().collect();
    hosted::poke_or(base, usart::CSR.offset(), 1 << usart::CSR_TXRDY.offset());
    if !pending.is_empty() {
        hosted::poke_or(base, usart::CSR.offset(), 1 << usart::CSR_RXRDY.offset());
    }
    hosted::install_hook(
        base,
        Box::new(move |off, access| {
            match access {
                Access::Write(v) if off == usart::THR.offset() => {
                    let _ = io::stdout().write_all(&[v as u8]);
                }
                Access::Read if off == usart::RHR.offset() => {
                    if let Some(b) = pending.pop_front() {
                        if pending.is_empty() {
                            let csr = hosted::peek(base, usart::CSR.offset());
                            hosted::poke(base, usart::CSR.offset(), csr & !1);
                        }
                        return HookAction::Replace(b as usize);
                    }
                }
                _ => {}
            }
            HookAction::Pass
        }),
    );
}

/// Console model for an XMEGA USART at `base`: the data register reports
/// empty and transmitted bytes land on stdout.
pub fn xmega_console_model(base: usize) {
    use hatra::xmega::usart;
    hosted::poke_or(base, usart::STATUS.offset(), 1 << usart::STATUS_DREIF.offset());
    hosted::install_hook(
        base,
        Box::new(move |off, access| {
            if let Access::Write(v) = access {
                if off == usart::DATA.offset() {
                    let _ = io::stdout().write_all(&[v as u8]);
                }
            }
            HookAction::Pass
        }),
    );
}
