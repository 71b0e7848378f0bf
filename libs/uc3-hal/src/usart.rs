//! USART driver, asynchronous RS-232 service.

use core::fmt;

use hal_api::{poll_timeout, Status, POLL_LIMIT};
use hatra::uc3::{irq, usart};
use hatra::{periph_base, CSR};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Parity {
    Even = 0,
    Odd = 1,
    Space = 2,
    Mark = 3,
    None = 4,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StopBits {
    One = 0,
    OnePointFive = 1,
    Two = 2,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ChannelMode {
    Normal = 0,
    AutoEcho = 1,
    LocalLoopback = 2,
    RemoteLoopback = 3,
}

#[derive(Debug, Copy, Clone)]
pub struct UsartOptions {
    pub baudrate: u32,
    /// Character length in bits, 5..=8.
    pub char_length: u8,
    pub parity: Parity,
    pub stop_bits: StopBits,
    pub channel_mode: ChannelMode,
}

impl Default for UsartOptions {
    fn default() -> Self {
        UsartOptions {
            baudrate: 115_200,
            char_length: 8,
            parity: Parity::None,
            stop_bits: StopBits::One,
            channel_mode: ChannelMode::Normal,
        }
    }
}

/// Clock divider for the baud rate generator: oversampling choice plus
/// integer and 1/8th-fractional divider parts.
fn async_divider(pba_hz: u32, baudrate: u32) -> Result<(bool, u32, u32), Status> {
    if baudrate == 0 {
        return Err(Status::InvalidArg);
    }
    // drop to 8x oversampling when the clock is too slow for 16x
    let over8 = pba_hz < 16 * baudrate;
    let over: u64 = if over8 { 8 } else { 16 };
    let cd_fp = ((pba_hz as u64) << 3) / (over * baudrate as u64);
    let cd = cd_fp >> 3;
    let fp = cd_fp & 7;
    if cd == 0 || cd > 65_535 {
        return Err(Status::InvalidArg);
    }
    Ok((over8, cd as u32, fp as u32))
}

pub struct Usart {
    csr: CSR<u32>,
    index: usize,
}

const BASES: [usize; 3] = [usart::HW_USART0_BASE, usart::HW_USART1_BASE, usart::HW_USART2_BASE];

impl Usart {
    pub fn new(index: usize) -> Result<Usart, Status> {
        if index >= BASES.len() {
            return Err(Status::InvalidArg);
        }
        let base = periph_base::<u32>(BASES[index], usart::USART_NUMREGS);
        Ok(Usart { csr: CSR::new(base), index })
    }

    pub fn irq(&self) -> usize {
        irq::USART0 + self.index
    }

    /// Reset the channel and bring it up in asynchronous RS-232 mode.
    pub fn init_rs232(&mut self, options: &UsartOptions, pba_hz: u32) -> Result<(), Status> {
        if !(5..=8).contains(&options.char_length) {
            return Err(Status::InvalidArg);
        }
        let (over8, cd, fp) = async_divider(pba_hz, options.baudrate)?;

        let reset = self.csr.ms(usart::CR_RSTRX, 1)
            | self.csr.ms(usart::CR_RSTTX, 1)
            | self.csr.ms(usart::CR_RXDIS, 1)
            | self.csr.ms(usart::CR_TXDIS, 1)
            | self.csr.ms(usart::CR_RSTSTA, 1);
        self.csr.wo(usart::CR, reset);

        self.csr
            .wo(usart::BRGR, self.csr.ms(usart::BRGR_CD, cd) | self.csr.ms(usart::BRGR_FP, fp));

        let mr = self.csr.ms(usart::MR_CHRL, (options.char_length - 5) as u32)
            | self.csr.ms(usart::MR_PAR, options.parity as u32)
            | self.csr.ms(usart::MR_NBSTOP, options.stop_bits as u32)
            | self.csr.ms(usart::MR_CHMODE, options.channel_mode as u32)
            | self.csr.ms(usart::MR_OVER, over8 as u32);
        self.csr.wo(usart::MR, mr);

        self.csr
            .wo(usart::CR, self.csr.ms(usart::CR_RXEN, 1) | self.csr.ms(usart::CR_TXEN, 1));
        Ok(())
    }

    pub fn tx_ready(&self) -> bool {
        self.csr.rf(usart::CSR_TXRDY) != 0
    }

    pub fn rx_ready(&self) -> bool {
        self.csr.rf(usart::CSR_RXRDY) != 0
    }

    pub fn tx_empty(&self) -> bool {
        self.csr.rf(usart::CSR_TXEMPTY) != 0
    }

    pub fn write_char(&mut self, c: u8) -> Result<(), Status> {
        poll_timeout(POLL_LIMIT, || self.tx_ready())?;
        self.csr.wfo(usart::THR_TXCHR, c as u32);
        Ok(())
    }

    pub fn read_char(&mut self) -> Result<u8, Status> {
        poll_timeout(POLL_LIMIT, || self.rx_ready())?;
        Ok(self.csr.rf(usart::RHR_RXCHR) as u8)
    }

    pub fn read_char_nonblocking(&mut self) -> Option<u8> {
        if self.rx_ready() {
            Some(self.csr.rf(usart::RHR_RXCHR) as u8)
        } else {
            None
        }
    }

    /// Send a line, expanding `\n` to `\r\n` on the wire.
    pub fn write_line(&mut self, s: &str) -> Result<(), Status> {
        for b in s.bytes() {
            if b == b'\n' {
                self.write_char(b'\r')?;
            }
            self.write_char(b)?;
        }
        if !s.ends_with('\n') {
            self.write_char(b'\r')?;
            self.write_char(b'\n')?;
        }
        Ok(())
    }

    pub fn enable_rx_interrupt(&mut self) {
        self.csr.wfo(usart::IER_RXRDY, 1);
    }

    pub fn disable_rx_interrupt(&mut self) {
        self.csr.wfo(usart::IDR_RXRDY, 1);
    }

    pub fn rx_interrupt_enabled(&self) -> bool {
        self.csr.rf(usart::IMR_RXRDY) != 0
    }
}

impl fmt::Write for Usart {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for b in s.bytes() {
            if b == b'\n' {
                self.write_char(b'\r').map_err(|_| fmt::Error)?;
            }
            self.write_char(b).map_err(|_| fmt::Error)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hatra::hosted::{self, Access, HookAction};

    #[test]
    fn divider_picks_oversampling() {
        // fast clock keeps 16x
        assert_eq!(async_divider(48_000_000, 115_200), Ok((false, 26, 0)));
        // slow clock falls back to 8x
        assert_eq!(async_divider(1_000_000, 115_200), Ok((true, 1, 0)));
        // fractional part carries the remainder
        let (_, cd, fp) = async_divider(12_000_000, 115_200).unwrap();
        assert_eq!((cd, fp), (6, 4));
    }

    #[test]
    fn divider_range_is_enforced() {
        assert_eq!(async_divider(48_000_000, 1), Err(Status::InvalidArg));
        assert_eq!(async_divider(100_000, 115_200), Err(Status::InvalidArg));
        assert_eq!(async_divider(48_000_000, 0), Err(Status::InvalidArg));
    }

    fn echo_model(base: usize) -> hosted::Hook {
        Box::new(move |off, access| {
            match access {
                Access::Write(v) if off == usart::THR.offset() => {
                    // transmit loops straight back into the receiver
                    hosted::poke(base, usart::RHR.offset(), v & 0x1FF);
                    hosted::poke_or(base, usart::CSR.offset(), 1);
                }
                Access::Read if off == usart::RHR.offset() => {
                    let sr = hosted::peek(base, usart::CSR.offset());
                    hosted::poke(base, usart::CSR.offset(), sr & !1);
                }
                _ => {}
            }
            HookAction::Pass
        })
    }

    #[test]
    fn init_programs_mode_and_divider() {
        let mut uart = Usart::new(0).unwrap();
        let opts = UsartOptions { parity: Parity::Even, ..Default::default() };
        uart.init_rs232(&opts, 48_000_000).unwrap();
        let base = usart::HW_USART0_BASE;
        assert_eq!(hosted::peek(base, usart::BRGR.offset()), 26);
        let mr = hosted::peek(base, usart::MR.offset());
        assert_eq!((mr >> 6) & 3, 3); // 8 data bits
        assert_eq!((mr >> 9) & 7, 0); // even parity
        assert_eq!((mr >> 19) & 1, 0); // 16x oversampling
        // last CR write enabled both directions
        assert_eq!(hosted::peek(base, usart::CR.offset()), (1 << 4) | (1 << 6));
    }

    #[test]
    fn chars_round_trip_through_loopback_model() {
        let mut uart = Usart::new(1).unwrap();
        let base = usart::HW_USART1_BASE;
        // transmitter always ready
        hosted::poke_or(base, usart::CSR.offset(), 1 << 1);
        hosted::install_hook(base, echo_model(base));
        uart.write_char(b'Z').unwrap();
        assert_eq!(uart.read_char(), Ok(b'Z'));
        assert_eq!(uart.read_char_nonblocking(), None);
    }

    #[test]
    fn bad_char_length_is_refused() {
        let mut uart = Usart::new(2).unwrap();
        let opts = UsartOptions { char_length: 9, ..Default::default() };
        assert_eq!(uart.init_rs232(&opts, 48_000_000), Err(Status::InvalidArg));
        assert!(Usart::new(3).is_err());
    }
}
