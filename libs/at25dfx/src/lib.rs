#![cfg_attr(target_os = "none", no_std)]

//! AT25DFx SerialFlash driver.
//!
//! Talks to the chip through any [`SpiDevice`], so the same code runs over
//! a family SPI master or over a scripted mock. Every erase and program
//! waits for the status register to report ready and checks the
//! erase/program-error flag before returning.

use hal_api::{poll_timeout, SpiDevice, Status, POLL_LIMIT};

const OP_READ_STATUS: u8 = 0x05;
const OP_READ_ID: u8 = 0x9F;
const OP_READ_ARRAY: u8 = 0x0B;
const OP_WRITE_ENABLE: u8 = 0x06;
const OP_PROGRAM_PAGE: u8 = 0x02;
const OP_ERASE_4K: u8 = 0x20;
const OP_ERASE_CHIP: u8 = 0xC7;
const OP_WRITE_STATUS: u8 = 0x01;
const OP_PROTECT_SECTOR: u8 = 0x36;
const OP_UNPROTECT_SECTOR: u8 = 0x39;

/// Status register bits.
const STATUS_BUSY: u8 = 1 << 0;
const STATUS_EPE: u8 = 1 << 5;

/// Written whole to the status register for global (un)protect.
const GLOBAL_PROTECT: u8 = 0x7F;
const GLOBAL_UNPROTECT: u8 = 0x00;

const PAGE_SIZE: usize = 256;

/// Supported chips, with their JEDEC identifiers and capacities.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DeviceType {
    /// AT25DF081A, 8 Mbit.
    Df081a,
    /// AT25DF161, 16 Mbit.
    Df161,
    /// AT25DF321A, 32 Mbit.
    Df321a,
    /// AT25DF641, 64 Mbit.
    Df641,
}

impl DeviceType {
    fn jedec(self) -> [u8; 3] {
        match self {
            DeviceType::Df081a => [0x1F, 0x45, 0x01],
            DeviceType::Df161 => [0x1F, 0x46, 0x02],
            DeviceType::Df321a => [0x1F, 0x47, 0x01],
            DeviceType::Df641 => [0x1F, 0x48, 0x00],
        }
    }

    pub fn capacity(self) -> u32 {
        match self {
            DeviceType::Df081a => 1 << 20,
            DeviceType::Df161 => 2 << 20,
            DeviceType::Df321a => 4 << 20,
            DeviceType::Df641 => 8 << 20,
        }
    }
}

fn cmd_addr(op: u8, addr: u32) -> [u8; 4] {
    [op, (addr >> 16) as u8, (addr >> 8) as u8, addr as u8]
}

pub struct At25dfx<S: SpiDevice> {
    spi: S,
    device: DeviceType,
}

impl<S: SpiDevice> At25dfx<S> {
    pub fn new(spi: S, device: DeviceType) -> At25dfx<S> {
        At25dfx { spi, device }
    }

    /// Hand the bus back.
    pub fn release(self) -> S {
        self.spi
    }

    pub fn capacity(&self) -> u32 {
        self.device.capacity()
    }

    fn with_selected<T>(&mut self, f: impl FnOnce(&mut S) -> Result<T, Status>) -> Result<T, Status> {
        self.spi.select();
        let result = f(&mut self.spi);
        self.spi.deselect();
        result
    }

    /// Read the JEDEC identifier and match it against the configured
    /// device type.
    pub fn check_presence(&mut self) -> Result<(), Status> {
        let id = self.with_selected(|spi| {
            spi.write(&[OP_READ_ID])?;
            let mut id = [0u8; 3];
            spi.transfer(&mut id)?;
            Ok(id)
        })?;
        if id != self.device.jedec() {
            log::warn!(
                "at25dfx: id {:02x} {:02x} {:02x}, wanted {:?}",
                id[0], id[1], id[2], self.device
            );
            return Err(Status::DeviceError);
        }
        Ok(())
    }

    pub fn status(&mut self) -> Result<u8, Status> {
        self.with_selected(|spi| {
            spi.write(&[OP_READ_STATUS])?;
            let mut byte = [0u8];
            spi.transfer(&mut byte)?;
            Ok(byte[0])
        })
    }

    /// Poll until the chip reports ready, then check the erase/program
    /// error flag.
    pub fn wait_ready(&mut self) -> Result<(), Status> {
        let mut last: Result<u8, Status> = Ok(0);
        poll_timeout(POLL_LIMIT, || {
            last = self.status();
            match last {
                Ok(s) => s & STATUS_BUSY == 0,
                // a broken bus is not going to recover inside this poll
                Err(_) => true,
            }
        })?;
        if last? & STATUS_EPE != 0 {
            return Err(Status::DeviceError);
        }
        Ok(())
    }

    fn write_enable(&mut self) -> Result<(), Status> {
        self.with_selected(|spi| spi.write(&[OP_WRITE_ENABLE]))
    }

    fn check_range(&self, addr: u32, len: usize) -> Result<(), Status> {
        if addr as u64 + len as u64 > self.device.capacity() as u64 {
            return Err(Status::InvalidArg);
        }
        Ok(())
    }

    /// Fast-read `buf.len()` bytes starting at `addr`.
    pub fn read(&mut self, addr: u32, buf: &mut [u8]) -> Result<(), Status> {
        self.check_range(addr, buf.len())?;
        self.with_selected(|spi| {
            // 0x0B wants one dummy byte after the address
            spi.write(&cmd_addr(OP_READ_ARRAY, addr))?;
            spi.write(&[0])?;
            spi.transfer(buf)
        })
    }

    /// Program `data` starting at `addr`, split at 256-byte page
    /// boundaries; each page gets its own WRITE ENABLE and ready wait.
    pub fn write(&mut self, addr: u32, data: &[u8]) -> Result<(), Status> {
        self.check_range(addr, data.len())?;
        let mut addr = addr;
        let mut data = data;
        while !data.is_empty() {
            let room = PAGE_SIZE - (addr as usize % PAGE_SIZE);
            let n = data.len().min(room);
            self.write_enable()?;
            let chunk = &data[..n];
            self.with_selected(|spi| {
                spi.write(&cmd_addr(OP_PROGRAM_PAGE, addr))?;
                spi.write(chunk)
            })?;
            self.wait_ready()?;
            addr += n as u32;
            data = &data[n..];
        }
        Ok(())
    }

    /// Erase the 4 kB block containing `addr`.
    pub fn erase_block_4k(&mut self, addr: u32) -> Result<(), Status> {
        self.check_range(addr, 0)?;
        self.write_enable()?;
        self.with_selected(|spi| spi.write(&cmd_addr(OP_ERASE_4K, addr)))?;
        self.wait_ready()
    }

    pub fn erase_chip(&mut self) -> Result<(), Status> {
        self.write_enable()?;
        self.with_selected(|spi| spi.write(&[OP_ERASE_CHIP]))?;
        self.wait_ready()
    }

    /// Set or clear protection for the sector containing `addr`. The
    /// protection registers update as soon as chip select rises.
    pub fn protect_sector(&mut self, addr: u32, protect: bool) -> Result<(), Status> {
        self.check_range(addr, 0)?;
        let op = if protect { OP_PROTECT_SECTOR } else { OP_UNPROTECT_SECTOR };
        self.write_enable()?;
        self.with_selected(|spi| spi.write(&cmd_addr(op, addr)))
    }

    /// Protect or release every sector through the status register.
    pub fn set_global_protect(&mut self, protect: bool) -> Result<(), Status> {
        let value = if protect { GLOBAL_PROTECT } else { GLOBAL_UNPROTECT };
        self.write_enable()?;
        self.with_selected(|spi| spi.write(&[OP_WRITE_STATUS, value]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// Transcript mock: every select opens a frame, writes append to it,
    /// transfers consume a queued reply (default all-ready zeros).
    #[derive(Default)]
    struct MockSpi {
        frames: Vec<Vec<u8>>,
        open: bool,
        replies: VecDeque<Vec<u8>>,
        always_busy: bool,
    }

    impl MockSpi {
        fn reply(&mut self, bytes: &[u8]) {
            self.replies.push_back(bytes.to_vec());
        }
    }

    impl SpiDevice for MockSpi {
        fn select(&mut self) {
            assert!(!self.open, "select while selected");
            self.open = true;
            self.frames.push(Vec::new());
        }

        fn deselect(&mut self) {
            assert!(self.open, "deselect while idle");
            self.open = false;
        }

        fn write(&mut self, bytes: &[u8]) -> Result<(), Status> {
            assert!(self.open);
            self.frames.last_mut().unwrap().extend_from_slice(bytes);
            Ok(())
        }

        fn transfer(&mut self, buf: &mut [u8]) -> Result<(), Status> {
            assert!(self.open);
            if self.always_busy {
                buf.fill(STATUS_BUSY);
                return Ok(());
            }
            match self.replies.pop_front() {
                Some(r) => {
                    assert_eq!(r.len(), buf.len(), "reply sized for a different request");
                    buf.copy_from_slice(&r);
                }
                None => buf.fill(0),
            }
            Ok(())
        }
    }

    fn chip(device: DeviceType) -> At25dfx<MockSpi> {
        At25dfx::new(MockSpi::default(), device)
    }

    #[test]
    fn presence_check_matches_the_id_table() {
        let mut flash = chip(DeviceType::Df161);
        flash.spi.reply(&[0x1F, 0x46, 0x02]);
        flash.check_presence().unwrap();
        assert_eq!(flash.spi.frames, vec![vec![OP_READ_ID]]);

        let mut wrong = chip(DeviceType::Df641);
        wrong.spi.reply(&[0x1F, 0x46, 0x02]);
        assert_eq!(wrong.check_presence(), Err(Status::DeviceError));
    }

    #[test]
    fn read_issues_fast_read_with_dummy() {
        let mut flash = chip(DeviceType::Df081a);
        flash.spi.reply(&[0xCA, 0xFE, 0xD0, 0x0D]);
        let mut buf = [0u8; 4];
        flash.read(0x01_2345, &mut buf).unwrap();
        assert_eq!(buf, [0xCA, 0xFE, 0xD0, 0x0D]);
        assert_eq!(flash.spi.frames, vec![vec![OP_READ_ARRAY, 0x01, 0x23, 0x45, 0x00]]);

        // past the end of an 8 Mbit part
        assert_eq!(flash.read(0x10_0000, &mut buf), Err(Status::InvalidArg));
    }

    #[test]
    fn write_chunks_at_page_boundaries() {
        let mut flash = chip(DeviceType::Df321a);
        let data: Vec<u8> = (0..32).collect();
        flash.write(0x01F0, &data).unwrap();
        let frames = &flash.spi.frames;
        // two pages: enable, program, status poll, then again
        assert_eq!(frames.len(), 6);
        assert_eq!(frames[0], vec![OP_WRITE_ENABLE]);
        assert_eq!(frames[1][..4], [OP_PROGRAM_PAGE, 0x00, 0x01, 0xF0]);
        assert_eq!(frames[1][4..], data[..16]);
        assert_eq!(frames[2], vec![OP_READ_STATUS]);
        assert_eq!(frames[3], vec![OP_WRITE_ENABLE]);
        assert_eq!(frames[4][..4], [OP_PROGRAM_PAGE, 0x00, 0x02, 0x00]);
        assert_eq!(frames[4][4..], data[16..]);
        assert_eq!(frames[5], vec![OP_READ_STATUS]);
    }

    #[test]
    fn program_error_flag_fails_the_write() {
        let mut flash = chip(DeviceType::Df161);
        flash.spi.reply(&[STATUS_EPE]);
        let r = flash.write(0, &[0xAA]);
        assert_eq!(r, Err(Status::DeviceError));
    }

    #[test]
    fn busy_chip_times_out() {
        let mut flash = chip(DeviceType::Df161);
        flash.spi.always_busy = true;
        assert_eq!(flash.erase_block_4k(0x3000), Err(Status::Timeout));
    }

    #[test]
    fn erase_commands_carry_the_block_address() {
        let mut flash = chip(DeviceType::Df641);
        flash.erase_block_4k(0x3000).unwrap();
        flash.erase_chip().unwrap();
        let frames = &flash.spi.frames;
        assert_eq!(frames[0], vec![OP_WRITE_ENABLE]);
        assert_eq!(frames[1], vec![OP_ERASE_4K, 0x00, 0x30, 0x00]);
        assert_eq!(frames[2], vec![OP_READ_STATUS]);
        assert_eq!(frames[3], vec![OP_WRITE_ENABLE]);
        assert_eq!(frames[4], vec![OP_ERASE_CHIP]);
        assert_eq!(frames[5], vec![OP_READ_STATUS]);
    }

    #[test]
    fn protection_ops_take_both_shapes() {
        let mut flash = chip(DeviceType::Df081a);
        flash.protect_sector(0x7000, true).unwrap();
        flash.protect_sector(0x7000, false).unwrap();
        flash.set_global_protect(true).unwrap();
        flash.set_global_protect(false).unwrap();
        let frames = &flash.spi.frames;
        assert_eq!(frames[1], vec![OP_PROTECT_SECTOR, 0x00, 0x70, 0x00]);
        assert_eq!(frames[3], vec![OP_UNPROTECT_SECTOR, 0x00, 0x70, 0x00]);
        assert_eq!(frames[5], vec![OP_WRITE_STATUS, GLOBAL_PROTECT]);
        assert_eq!(frames[7], vec![OP_WRITE_STATUS, GLOBAL_UNPROTECT]);
    }

    #[test]
    fn release_returns_the_bus() {
        let mut flash = chip(DeviceType::Df161);
        flash.status().unwrap();
        let spi = flash.release();
        assert_eq!(spi.frames.len(), 1);
        assert!(!spi.open);
    }
}
