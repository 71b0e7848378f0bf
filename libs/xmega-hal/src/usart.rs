//! USART driver, asynchronous RS-232 service.

use core::fmt;

use hal_api::{poll_timeout, Status, POLL_LIMIT};
use hatra::xmega::{pr, usart, vector};
use hatra::{periph_base, CSR};

use crate::pmic::Level;
use crate::sysclk::{self, Port};

/// Parity selection, `PMODE` encoding.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Parity {
    None = 0,
    Even = 2,
    Odd = 3,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StopBits {
    One = 0,
    Two = 1,
}

#[derive(Debug, Copy, Clone)]
pub struct UsartOptions {
    pub baudrate: u32,
    /// Character length in bits, 5..=8.
    pub char_length: u8,
    pub parity: Parity,
    pub stop_bits: StopBits,
}

impl Default for UsartOptions {
    fn default() -> Self {
        UsartOptions {
            baudrate: 115_200,
            char_length: 8,
            parity: Parity::None,
            stop_bits: StopBits::One,
        }
    }
}

/// Baud rate generator values: `(BAUDCTRLA, BAUDCTRLB)`.
///
/// The generator divides by `8 * (2^BSCALE * BSEL + 1)` (times two more
/// when `CLK2X` is off), with BSCALE in -7..=7 stretching the 12-bit BSEL
/// both ways. The search walks BSCALE up from -7 and keeps the smallest
/// exponent whose BSEL still fits, which is the most precise encoding; the
/// fractional cases scale whichever side keeps the intermediate in 32 bits.
fn baud_regs(baud: u32, per_hz: u32, clk2x: bool) -> Result<(u8, u8), Status> {
    if baud == 0 {
        return Err(Status::InvalidArg);
    }
    let mut max_rate = per_hz / 8;
    let mut min_rate = per_hz / 4_194_304;
    if !clk2x {
        max_rate /= 2;
        min_rate /= 2;
    }
    if baud > max_rate || baud < min_rate {
        return Err(Status::InvalidArg);
    }

    // search with the doubled target when CLK2X is off, so rounding happens
    // against the actual generator rate
    let mut baud = baud;
    if !clk2x {
        baud *= 2;
    }

    let mut limit: u32 = 0xFFF >> 4;
    let ratio = per_hz / baud;
    let mut exp: i8 = -7;
    while exp < 7 {
        if ratio < limit {
            break;
        }
        limit <<= 1;
        if exp < -3 {
            limit |= 1;
        }
        exp += 1;
    }

    // the divide-by-8 is folded into the shift counts
    let div = if exp < 0 {
        let per = per_hz - 8 * baud;
        if exp <= -3 {
            ((per << (-exp - 3) as u32) + baud / 2) / baud
        } else {
            let baud = baud << (exp + 3) as u32;
            (per + baud / 2) / baud
        }
    } else {
        let baud = baud << (exp + 3) as u32;
        (per_hz + baud / 2) / baud - 1
    };

    Ok((div as u8, (((div >> 8) & 0x0F) as u8) | ((exp as u8) << 4)))
}

pub struct Usart {
    csr: CSR<u8>,
    instance: usize,
}

const BASES: [usize; 2] = [usart::HW_USARTC0_BASE, usart::HW_USARTD0_BASE];
const GATES: [(Port, usize); 2] = [(Port::C, pr::PR_USART0), (Port::D, pr::PR_USART0)];

impl Usart {
    pub fn new(instance: usize) -> Result<Usart, Status> {
        if instance >= BASES.len() {
            return Err(Status::InvalidArg);
        }
        let base = periph_base::<u8>(BASES[instance], usart::USART_NUMREGS);
        Ok(Usart { csr: CSR::new(base), instance })
    }

    /// Receive-complete vector, for instances the vector table carries.
    pub fn rx_vector(&self) -> Option<usize> {
        match self.instance {
            0 => Some(vector::USARTC0_RXC),
            _ => None,
        }
    }

    /// Ungate the module clock and bring the channel up in asynchronous
    /// RS-232 mode.
    pub fn init_rs232(&mut self, options: &UsartOptions, per_hz: u32) -> Result<(), Status> {
        if !(5..=8).contains(&options.char_length) {
            return Err(Status::InvalidArg);
        }
        let (p, bit) = GATES[self.instance];
        sysclk::enable_module(p, bit);

        let ctrlc = self.csr.ms(usart::CTRLC_CHSIZE, options.char_length - 5)
            | self.csr.ms(usart::CTRLC_PMODE, options.parity as u8)
            | self.csr.ms(usart::CTRLC_SBMODE, options.stop_bits as u8);
        self.csr.wo(usart::CTRLC, ctrlc);

        self.set_baudrate(options.baudrate, per_hz)?;

        let en = self.csr.ms(usart::CTRLB_TXEN, 1) | self.csr.ms(usart::CTRLB_RXEN, 1);
        self.csr.wo(usart::CTRLB, en);
        Ok(())
    }

    /// Program the baud rate generator for the requested rate, honoring the
    /// channel's current `CLK2X` setting.
    pub fn set_baudrate(&mut self, baud: u32, per_hz: u32) -> Result<(), Status> {
        let clk2x = self.csr.rf(usart::CTRLB_CLK2X) != 0;
        let (ctrla, ctrlb) = baud_regs(baud, per_hz, clk2x)?;
        self.csr.wo(usart::BAUDCTRLA, ctrla);
        self.csr.wo(usart::BAUDCTRLB, ctrlb);
        Ok(())
    }

    pub fn tx_ready(&self) -> bool {
        self.csr.rf(usart::STATUS_DREIF) != 0
    }

    pub fn rx_ready(&self) -> bool {
        self.csr.rf(usart::STATUS_RXCIF) != 0
    }

    pub fn write_char(&mut self, c: u8) -> Result<(), Status> {
        poll_timeout(POLL_LIMIT, || self.tx_ready())?;
        self.csr.wo(usart::DATA, c);
        Ok(())
    }

    pub fn read_char(&mut self) -> Result<u8, Status> {
        poll_timeout(POLL_LIMIT, || self.rx_ready())?;
        Ok(self.csr.r(usart::DATA))
    }

    pub fn read_char_nonblocking(&mut self) -> Option<u8> {
        if self.rx_ready() {
            Some(self.csr.r(usart::DATA))
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

    pub fn set_rx_interrupt_level(&mut self, level: Level) {
        self.csr.rmwf(usart::CTRLA_RXCINTLVL, level as u8);
    }

    // fmt::Error carries no detail, so note the real status before flattening
    fn emit(&mut self, b: u8) -> fmt::Result {
        self.write_char(b).map_err(|e| {
            log::warn!("usart{}: dropped fmt output: {:?}", self.instance, e);
            fmt::Error
        })
    }
}

impl fmt::Write for Usart {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for b in s.bytes() {
            if b == b'\n' {
                self.emit(b'\r')?;
            }
            self.emit(b)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hatra::hosted::{self, Access, HookAction};

    #[test]
    fn generator_hits_9600_exactly_from_1m8432() {
        // 1.8432 MHz is a baud crystal: BSEL 1408 at BSCALE -7 divides to
        // 9600 with zero error
        assert_eq!(baud_regs(9_600, 1_843_200, false), Ok((0x80, 0x95)));
    }

    #[test]
    fn generator_scales_the_fast_clock() {
        // 115200 from 32 MHz lands on BSEL 2094, BSCALE -7 (0.01% off)
        assert_eq!(baud_regs(115_200, 32_000_000, false), Ok((0x2E, 0x98)));
    }

    #[test]
    fn unreachable_rates_are_refused() {
        // above per_hz / 16
        assert_eq!(baud_regs(200_000, 2_000_000, false), Err(Status::InvalidArg));
        // below the deepest divider
        assert_eq!(baud_regs(1, 32_000_000, false), Err(Status::InvalidArg));
        assert_eq!(baud_regs(0, 32_000_000, false), Err(Status::InvalidArg));
        // CLK2X doubles the ceiling and the same rate fits, exactly
        assert_eq!(baud_regs(200_000, 2_000_000, true), Ok((32, 0x90)));
    }

    #[test]
    fn init_programs_format_and_gate() {
        let mut uart = Usart::new(0).unwrap();
        let opts = UsartOptions {
            baudrate: 9_600,
            char_length: 7,
            parity: Parity::Odd,
            stop_bits: StopBits::Two,
        };
        uart.init_rs232(&opts, 1_843_200).unwrap();
        let base = usart::HW_USARTC0_BASE;
        assert_eq!(hosted::peek(base, usart::CTRLC.offset()), (3 << 4) | (1 << 3) | 2);
        assert_eq!(hosted::peek(base, usart::BAUDCTRLA.offset()), 0x80);
        assert_eq!(hosted::peek(base, usart::BAUDCTRLB.offset()), 0x95);
        // both directions on
        assert_eq!(hosted::peek(base, usart::CTRLB.offset()), (1 << 3) | (1 << 4));
        // module clock ungated
        assert!(sysclk::module_enabled(Port::C, pr::PR_USART0));
        assert_eq!(uart.rx_vector(), Some(vector::USARTC0_RXC));
    }

    fn echo_model(base: usize) -> hosted::Hook {
        Box::new(move |off, access| {
            match access {
                Access::Write(_) if off == usart::DATA.offset() => {
                    // transmit loops straight back into the receiver
                    hosted::poke_or(base, usart::STATUS.offset(), 1 << 7);
                }
                Access::Read if off == usart::DATA.offset() => {
                    let sr = hosted::peek(base, usart::STATUS.offset());
                    hosted::poke(base, usart::STATUS.offset(), sr & !(1 << 7));
                }
                _ => {}
            }
            HookAction::Pass
        })
    }

    #[test]
    fn chars_round_trip_through_loopback_model() {
        let mut uart = Usart::new(1).unwrap();
        let base = usart::HW_USARTD0_BASE;
        // transmitter always ready
        hosted::poke_or(base, usart::STATUS.offset(), 1 << 5);
        hosted::install_hook(base, echo_model(base));
        uart.write_char(b'Z').unwrap();
        assert_eq!(uart.read_char(), Ok(b'Z'));
        assert_eq!(uart.read_char_nonblocking(), None);
        hosted::remove_hook(base);
    }

    #[test]
    fn bad_arguments_are_refused() {
        let mut uart = Usart::new(1).unwrap();
        let opts = UsartOptions { char_length: 9, ..Default::default() };
        assert_eq!(uart.init_rs232(&opts, 32_000_000), Err(Status::InvalidArg));
        assert!(Usart::new(2).is_err());
        assert_eq!(uart.rx_vector(), None);
    }

    #[test]
    fn rx_interrupt_level_is_a_field_update() {
        let mut uart = Usart::new(0).unwrap();
        uart.set_rx_interrupt_level(Level::Low);
        assert_eq!(
            hosted::peek(usart::HW_USARTC0_BASE, usart::CTRLA.offset()),
            (Level::Low as usize) << 4
        );
    }
}
