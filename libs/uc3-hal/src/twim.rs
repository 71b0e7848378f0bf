//! Two-wire (I2C) master driver.
//!
//! Transfers are command-oriented: CMDR describes the whole packet (address,
//! direction, byte count, start/stop) and the data stage is fed byte by byte
//! through THR/RHR. A second command staged in NCMDR runs back to back with
//! a repeated start, which is how write-then-read reaches a device register
//! without releasing the bus.

use hal_api::{poll_timeout, Status, POLL_LIMIT};
use hatra::uc3::{irq, twim};
use hatra::{periph_base, CSR};

// ANAK | DNAK | ARBLST
const ERR_MASK: u32 = (1 << 8) | (1 << 9) | (1 << 10);
const TXRDY: u32 = 1 << 1;
const RXRDY: u32 = 1 << 0;
const CCOMP: u32 = 1 << 3;

const MAX_PACKET: usize = 255;
const TEN_BIT_MIN: u16 = 0x80;

pub struct Twim {
    csr: CSR<u32>,
}

impl Twim {
    pub fn new() -> Twim {
        Twim { csr: CSR::new(periph_base::<u32>(twim::HW_TWIM0_BASE, twim::TWIM_NUMREGS)) }
    }

    pub fn irq(&self) -> usize {
        irq::TWIM0
    }

    /// Program the clock waveform generator for the requested SCL rate.
    ///
    /// The prescaler exponent grows until the cycle count fits the 8-bit
    /// waveform fields; a rate that still does not fit is refused.
    pub fn set_speed(&mut self, pba_hz: u32, speed_hz: u32) -> Result<(), Status> {
        if speed_hz == 0 {
            return Err(Status::InvalidArg);
        }
        let mut exp = 0u32;
        let mut f_prescaled = pba_hz / speed_hz / 2;
        while f_prescaled > 0xFF && exp <= 7 {
            exp += 1;
            f_prescaled /= 2;
        }
        if exp > 7 || f_prescaled == 0 {
            return Err(Status::InvalidArg);
        }
        let low = f_prescaled / 2;
        let high = f_prescaled - low;
        let v = self.csr.ms(twim::CWGR_LOW, low)
            | self.csr.ms(twim::CWGR_HIGH, high)
            | self.csr.ms(twim::CWGR_STASTO, f_prescaled)
            | self.csr.ms(twim::CWGR_DATA, 0)
            | self.csr.ms(twim::CWGR_EXP, exp);
        self.csr.wo(twim::CWGR, v);
        Ok(())
    }

    /// Address a device with a zero-length write; NACK means nobody home.
    pub fn probe(&mut self, chip: u16) -> Result<(), Status> {
        self.write_packet(chip, &[])
    }

    pub fn write_packet(&mut self, chip: u16, data: &[u8]) -> Result<(), Status> {
        if data.len() > MAX_PACKET || chip > 0x3FF {
            return Err(Status::InvalidArg);
        }
        self.arm();
        self.csr.wo(twim::CMDR, self.command(chip, data.len(), false, true, true));
        self.csr.wo(twim::NCMDR, 0);
        self.csr.wo(twim::IER, ERR_MASK | TXRDY);
        self.csr.wfo(twim::CR_MEN, 1);
        self.pump(data, &mut [])
    }

    pub fn read_packet(&mut self, chip: u16, data: &mut [u8]) -> Result<(), Status> {
        if data.len() > MAX_PACKET || data.is_empty() || chip > 0x3FF {
            return Err(Status::InvalidArg);
        }
        self.arm();
        if chip >= TEN_BIT_MIN {
            // ten-bit read: address phase as a write, then repeated start
            // with the same address in read mode
            self.csr.wo(twim::CMDR, self.command(chip, 0, false, true, false));
            self.csr.wo(
                twim::NCMDR,
                self.command(chip, data.len(), true, true, true)
                    | self.csr.ms(twim::CMDR_REPSAME, 1),
            );
        } else {
            self.csr.wo(twim::CMDR, self.command(chip, data.len(), true, true, true));
            self.csr.wo(twim::NCMDR, 0);
        }
        self.csr.wo(twim::IER, ERR_MASK | RXRDY);
        self.csr.wfo(twim::CR_MEN, 1);
        self.pump(&[], data)
    }

    /// Write `wdata` then read `rdata` under one bus claim, with a repeated
    /// start between the halves.
    pub fn write_then_read(
        &mut self,
        chip: u16,
        wdata: &[u8],
        rdata: &mut [u8],
    ) -> Result<(), Status> {
        if wdata.len() > MAX_PACKET || rdata.len() > MAX_PACKET || rdata.is_empty() || chip > 0x3FF
        {
            return Err(Status::InvalidArg);
        }
        self.arm();
        self.csr.wo(twim::CMDR, self.command(chip, wdata.len(), false, true, false));
        self.csr.wo(twim::NCMDR, self.command(chip, rdata.len(), true, true, true));
        self.csr.wo(twim::IER, ERR_MASK | TXRDY | RXRDY);
        self.csr.wfo(twim::CR_MEN, 1);
        self.pump(wdata, rdata)
    }

    /// Enable, soft-reset, disable: leaves the command pipeline empty with
    /// all status cleared, whatever a previous transfer left behind.
    fn arm(&mut self) {
        self.csr.wfo(twim::CR_MEN, 1);
        self.csr.wfo(twim::CR_SWRST, 1);
        self.csr.wfo(twim::CR_MDIS, 1);
        self.csr.wo(twim::SCR, !0u32);
        self.csr.wo(twim::IDR, !0u32);
    }

    fn command(&self, chip: u16, nbytes: usize, read: bool, start: bool, stop: bool) -> u32 {
        let mut v = self.csr.ms(twim::CMDR_SADR, chip as u32)
            | self.csr.ms(twim::CMDR_NBYTES, nbytes as u32)
            | self.csr.ms(twim::CMDR_VALID, 1);
        if read {
            v |= self.csr.ms(twim::CMDR_READ, 1);
        }
        if start {
            v |= self.csr.ms(twim::CMDR_START, 1);
        }
        if stop {
            v |= self.csr.ms(twim::CMDR_STOP, 1);
        }
        if chip >= TEN_BIT_MIN {
            v |= self.csr.ms(twim::CMDR_TENBIT, 1);
        }
        v
    }

    /// Drive the transfer state machine until completion or error. Branch
    /// order matters: errors pre-empt data, data pre-empts completion.
    fn pump(&mut self, tx: &[u8], rx: &mut [u8]) -> Result<(), Status> {
        let mut txi = 0usize;
        let mut rxi = 0usize;
        let mut outcome: Option<Result<(), Status>> = None;
        poll_timeout(POLL_LIMIT, || {
            let status = self.csr.r(twim::SR) & self.csr.r(twim::IMR);
            if status & ERR_MASK != 0 {
                let err = if status & (1 << 10) != 0 {
                    Status::ArbitrationLost
                } else {
                    Status::Nack
                };
                // drop whatever the pipeline still holds
                let cmdr = self.csr.r(twim::CMDR);
                self.csr.wo(twim::CMDR, self.csr.zf(twim::CMDR_VALID, cmdr));
                let ncmdr = self.csr.r(twim::NCMDR);
                self.csr.wo(twim::NCMDR, self.csr.zf(twim::NCMDR_VALID, ncmdr));
                self.csr.wo(twim::SCR, !0u32);
                self.csr.wo(twim::IDR, !0u32);
                outcome = Some(Err(err));
                return true;
            }
            if status & RXRDY != 0 && rxi < rx.len() {
                rx[rxi] = self.csr.rf(twim::RHR_RXDATA) as u8;
                rxi += 1;
                if rxi == rx.len() {
                    self.csr.wo(twim::IDR, RXRDY);
                    self.csr.wo(twim::IER, CCOMP);
                }
            }
            if status & TXRDY != 0 {
                if txi < tx.len() {
                    self.csr.wfo(twim::THR_TXDATA, tx[txi] as u32);
                    txi += 1;
                } else {
                    self.csr.wo(twim::IDR, TXRDY);
                    self.csr.wo(twim::IER, CCOMP);
                }
            }
            if status & CCOMP != 0 {
                self.csr.wo(twim::SCR, CCOMP);
                self.csr.wo(twim::IDR, !0u32);
                outcome = Some(Ok(()));
                return true;
            }
            false
        })?;
        outcome.unwrap_or(Err(Status::Timeout))
    }
}

impl Default for Twim {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hatra::hosted::{self, Access, HookAction};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct SlaveState {
        active: u32,
        next: u32,
        sent: Vec<u8>,
        supply: Vec<u8>,
        supply_at: usize,
        count: usize,
    }

    struct Slave {
        chip: u16,
        state: Rc<RefCell<SlaveState>>,
    }

    // Bus model for one seven-bit device. Folds IER/IDR into IMR and SCR
    // into SR the way the silicon does, NAKs any other address, sources
    // read data from `supply` and collects written bytes into `sent`.
    fn install_slave(chip: u16, supply: &[u8]) -> Rc<RefCell<SlaveState>> {
        let base = twim::HW_TWIM0_BASE;
        let state = Rc::new(RefCell::new(SlaveState {
            supply: supply.to_vec(),
            ..Default::default()
        }));
        let model = Slave { chip, state: state.clone() };
        hosted::install_hook(
            base,
            Box::new(move |off, access| model.access(base, off, access)),
        );
        state
    }

    impl Slave {
        fn begin_command(&self, base: usize, v: u32, s: &mut SlaveState) {
            s.active = v;
            s.count = 0;
            let sadr = ((v >> 1) & 0x3FF) as u16;
            if sadr != self.chip {
                hosted::poke_or(base, twim::SR.offset(), 1 << 8); // ANAK
                return;
            }
            if v & 1 != 0 {
                // read command: present the first byte
                let b = s.supply.get(s.supply_at).copied().unwrap_or(0xFF);
                hosted::poke(base, twim::RHR.offset(), b as usize);
                let nbytes = (v >> 16) & 0xFF;
                if nbytes == 0 {
                    hosted::poke_or(base, twim::SR.offset(), CCOMP as usize);
                } else {
                    hosted::poke_or(base, twim::SR.offset(), RXRDY as usize);
                }
            } else {
                // write command: transmitter holding register is free.
                // TXRDY stays up as long as THR is empty, completion or not.
                hosted::poke_or(base, twim::SR.offset(), TXRDY as usize);
                let nbytes = (v >> 16) & 0xFF;
                if nbytes == 0 {
                    self.finish_command(base, s);
                }
            }
        }

        fn finish_command(&self, base: usize, s: &mut SlaveState) {
            let sr = hosted::peek(base, twim::SR.offset());
            hosted::poke(base, twim::SR.offset(), sr & !(RXRDY as usize));
            if s.next != 0 {
                let v = s.next;
                s.next = 0;
                self.begin_command(base, v, s);
            } else {
                hosted::poke_or(base, twim::SR.offset(), CCOMP as usize);
            }
        }

        fn access(&self, base: usize, off: usize, access: Access) -> HookAction {
            let mut s = self.state.borrow_mut();
            match access {
                Access::Write(v) if off == twim::IER.offset() => {
                    hosted::poke_or(base, twim::IMR.offset(), v);
                    HookAction::Replace(0)
                }
                Access::Write(v) if off == twim::IDR.offset() => {
                    let imr = hosted::peek(base, twim::IMR.offset());
                    hosted::poke(base, twim::IMR.offset(), imr & !v);
                    HookAction::Replace(0)
                }
                Access::Write(v) if off == twim::SCR.offset() => {
                    let sr = hosted::peek(base, twim::SR.offset());
                    hosted::poke(base, twim::SR.offset(), sr & !v);
                    HookAction::Replace(0)
                }
                Access::Write(v) if off == twim::CMDR.offset() => {
                    if v & (1 << 15) != 0 {
                        self.begin_command(base, v as u32, &mut s);
                    }
                    HookAction::Pass
                }
                Access::Write(v) if off == twim::NCMDR.offset() => {
                    if v & (1 << 15) != 0 {
                        s.next = v as u32;
                    }
                    HookAction::Pass
                }
                Access::Write(v) if off == twim::THR.offset() => {
                    s.sent.push(v as u8);
                    s.count += 1;
                    let nbytes = ((s.active >> 16) & 0xFF) as usize;
                    if s.count >= nbytes {
                        self.finish_command(base, &mut s);
                    }
                    HookAction::Pass
                }
                Access::Read if off == twim::RHR.offset() => {
                    let b = s.supply.get(s.supply_at).copied().unwrap_or(0xFF);
                    s.supply_at += 1;
                    s.count += 1;
                    let nbytes = ((s.active >> 16) & 0xFF) as usize;
                    if s.count >= nbytes {
                        self.finish_command(base, &mut s);
                    } else {
                        let nb = s.supply.get(s.supply_at).copied().unwrap_or(0xFF);
                        hosted::poke(base, twim::RHR.offset(), nb as usize);
                    }
                    HookAction::Replace(b as usize)
                }
                _ => HookAction::Pass,
            }
        }
    }

    #[test]
    fn clock_waveform_splits_the_period() {
        let mut twi = Twim::new();
        twi.set_speed(48_000_000, 400_000).unwrap();
        let cwgr = hosted::peek(twim::HW_TWIM0_BASE, twim::CWGR.offset());
        assert_eq!(cwgr & 0xFF, 30); // low
        assert_eq!((cwgr >> 8) & 0xFF, 30); // high
        assert_eq!((cwgr >> 16) & 0xFF, 60); // start/stop
        assert_eq!((cwgr >> 28) & 7, 0); // exponent

        twi.set_speed(48_000_000, 7_000).unwrap();
        let cwgr = hosted::peek(twim::HW_TWIM0_BASE, twim::CWGR.offset());
        assert_eq!((cwgr >> 28) & 7, 4);
        assert_eq!((cwgr >> 16) & 0xFF, 214);
        assert_eq!(cwgr & 0xFF, 107);
        assert_eq!((cwgr >> 8) & 0xFF, 107);
    }

    #[test]
    fn impossible_rates_are_refused() {
        let mut twi = Twim::new();
        assert_eq!(twi.set_speed(48_000_000, 1), Err(Status::InvalidArg));
        assert_eq!(twi.set_speed(48_000_000, 0), Err(Status::InvalidArg));
    }

    #[test]
    fn write_packet_feeds_every_byte() {
        let mut twi = Twim::new();
        let state = install_slave(0x50, &[]);
        twi.write_packet(0x50, &[0x10, 0x20, 0x30]).unwrap();
        assert_eq!(state.borrow().sent, vec![0x10, 0x20, 0x30]);
        hosted::remove_hook(twim::HW_TWIM0_BASE);
    }

    #[test]
    fn read_packet_collects_supplied_bytes() {
        let mut twi = Twim::new();
        install_slave(0x29, &[0xDE, 0xAD, 0xBE]);
        let mut buf = [0u8; 3];
        twi.read_packet(0x29, &mut buf).unwrap();
        assert_eq!(buf, [0xDE, 0xAD, 0xBE]);
        hosted::remove_hook(twim::HW_TWIM0_BASE);
    }

    #[test]
    fn missing_device_reports_nack() {
        let mut twi = Twim::new();
        install_slave(0x50, &[]);
        assert_eq!(twi.write_packet(0x51, &[1]), Err(Status::Nack));
        // pipeline was cancelled
        let cmdr = hosted::peek(twim::HW_TWIM0_BASE, twim::CMDR.offset());
        assert_eq!(cmdr & (1 << 15), 0);
        assert_eq!(twi.probe(0x50), Ok(()));
        hosted::remove_hook(twim::HW_TWIM0_BASE);
    }

    #[test]
    fn write_then_read_chains_with_repeated_start() {
        let mut twi = Twim::new();
        let state = install_slave(0x68, &[0x42, 0x43]);
        let mut buf = [0u8; 2];
        twi.write_then_read(0x68, &[0x0E], &mut buf).unwrap();
        assert_eq!(state.borrow().sent, vec![0x0E]);
        assert_eq!(buf, [0x42, 0x43]);
        hosted::remove_hook(twim::HW_TWIM0_BASE);
    }
}
