//! Event system routing. Eight channels, each with a source mux and an
//! input filter, plus software-generated events through the strobe and
//! data registers.
//!
//! This covers the routing the other drivers consume: pin and timer
//! events into the XCL, and conversion triggers into the ADC.

use hal_api::Status;
use hatra::xmega::{evsys, pr};
use hatra::{periph_base, CSR};

use crate::sysclk::{self, Port};
use crate::tc::Channel;

/// Event sources, `CHnMUX` encoding. Pin and prescaler sources carry
/// their selector and encode to base plus offset.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EventSource {
    Off,
    RtcOverflow,
    RtcCompare,
    AdcaCh0,
    /// Pin change on a numbered port pin. Only ports A through F decode.
    PortPin(usize, usize),
    /// Peripheral clock divided by 2^n, n up to 15.
    Prescaler(u8),
    Tcc0Overflow,
    Tcc0Error,
    Tcc0Compare(Channel),
}

impl EventSource {
    fn encode(self) -> Result<u8, Status> {
        match self {
            EventSource::Off => Ok(0x00),
            EventSource::RtcOverflow => Ok(0x08),
            EventSource::RtcCompare => Ok(0x09),
            EventSource::AdcaCh0 => Ok(0x20),
            EventSource::PortPin(port, pin) => {
                if port > 5 || pin >= 8 {
                    return Err(Status::InvalidArg);
                }
                Ok(0x50 + (port * 8 + pin) as u8)
            }
            EventSource::Prescaler(log2) => {
                if log2 > 15 {
                    return Err(Status::InvalidArg);
                }
                Ok(0x80 + log2)
            }
            EventSource::Tcc0Overflow => Ok(0xC0),
            EventSource::Tcc0Error => Ok(0xC1),
            EventSource::Tcc0Compare(channel) => Ok(0xC4 + channel as u8),
        }
    }
}

fn evsys_csr() -> CSR<u8> {
    CSR::new(periph_base::<u8>(evsys::HW_EVSYS_BASE, evsys::EVSYS_NUMREGS))
}

/// Ungate the event system clock. Routing works in every sleep mode the
/// source itself survives, so there is no sleep lock to take.
pub fn enable() {
    critical_section::with(|_| {
        sysclk::enable_module(Port::Gen, pr::PR_GEN_EVSYS);
    });
}

pub fn disable() {
    critical_section::with(|_| {
        sysclk::disable_module(Port::Gen, pr::PR_GEN_EVSYS);
    });
}

/// Route `source` onto event channel `ch`.
pub fn channel_mux(ch: usize, source: EventSource) -> Result<(), Status> {
    if ch >= evsys::CHANNELS {
        return Err(Status::InvalidArg);
    }
    let v = source.encode()?;
    evsys_csr().wo(evsys::chmux(ch), v);
    Ok(())
}

/// Require the event to stay stable for `samples` peripheral clock
/// cycles, 1 through 8, before it propagates down the channel.
pub fn channel_filter(ch: usize, samples: u8) -> Result<(), Status> {
    if ch >= evsys::CHANNELS || !(1..=8).contains(&samples) {
        return Err(Status::InvalidArg);
    }
    evsys_csr().wo(evsys::chctrl(ch), samples - 1);
    Ok(())
}

/// Fire a software event on one channel.
pub fn software_event(ch: usize) -> Result<(), Status> {
    if ch >= evsys::CHANNELS {
        return Err(Status::InvalidArg);
    }
    evsys_csr().wo(evsys::STROBE, 1 << ch);
    Ok(())
}

/// Raw strobe write, one bit per channel.
pub fn strobe_write(mask: u8) {
    evsys_csr().wo(evsys::STROBE, mask);
}

/// Data byte for channels that carry data events. Write it before the
/// strobe so the strobe latches it.
pub fn data_write(mask: u8) {
    evsys_csr().wo(evsys::DATA, mask);
}
