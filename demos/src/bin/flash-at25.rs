//! SerialFlash on the UC3L evaluation kit SPI bus: probe the JEDEC id,
//! erase, program across page boundaries, read back and verify, then
//! show sector protection holding an erase off.

use std::collections::HashSet;
use std::process;

use at25dfx::{At25dfx, DeviceType};
use hal_api::Status;
use hatra::hosted::{self, Access, HookAction};
use hatra::uc3::{pm as pm_map, spi as spi_map, usart as usart_map};
use uc3_hal::board::uc3l_ek as board;
use uc3_hal::pm::{Bus, Pm};
use uc3_hal::spi::{ChipConfig, Spi, SpiChip};

const FLASH_CS: usize = 1;
const DATA_ADDR: u32 = 0x0001_2FC8;
const DATA_LEN: usize = 600;
const PROT_ADDR: u32 = 0x0002_0000;

const STATUS_WEL: u8 = 1 << 1;
const STATUS_EPE: u8 = 1 << 5;

/// AT25DF081A model behind the SPI shifter: one frame per chip select,
/// opcode dispatch per fed byte. Powers up with everything protected,
/// the way the part ships.
struct FlashModel {
    mem: Vec<u8>,
    frame: Vec<u8>,
    reply_addr: u32,
    write_addr: u32,
    status: u8,
    global_protect: bool,
    protected: HashSet<u32>,
}

impl FlashModel {
    fn new() -> FlashModel {
        FlashModel {
            mem: vec![0xFF; DeviceType::Df081a.capacity() as usize],
            frame: Vec::new(),
            reply_addr: 0,
            write_addr: 0,
            status: 0,
            global_protect: true,
            protected: HashSet::new(),
        }
    }

    fn addr(&self) -> u32 {
        ((self.frame[1] as u32) << 16) | ((self.frame[2] as u32) << 8) | self.frame[3] as u32
    }

    fn writable(&self, addr: u32) -> bool {
        !self.global_protect && !self.protected.contains(&(addr >> 16))
    }

    /// Shift one byte in, producing the byte that goes back out.
    fn feed(&mut self, b: u8) -> u8 {
        self.frame.push(b);
        let n = self.frame.len();
        match self.frame[0] {
            0x9F => [0, 0x1F, 0x45, 0x01].get(n - 1).copied().unwrap_or(0),
            0x05 => {
                if n >= 2 {
                    self.status
                } else {
                    0
                }
            }
            0x06 => {
                // a fresh write enable also clears the last error
                self.status = (self.status | STATUS_WEL) & !STATUS_EPE;
                0
            }
            0x0B => {
                if n == 4 {
                    self.reply_addr = self.addr();
                    0
                } else if n >= 6 {
                    let v = self.mem[self.reply_addr as usize % self.mem.len()];
                    self.reply_addr = self.reply_addr.wrapping_add(1);
                    v
                } else {
                    0
                }
            }
            0x02 => {
                if n == 4 {
                    self.write_addr = self.addr();
                }
                if n > 4 && self.status & STATUS_WEL != 0 {
                    if self.writable(self.write_addr) {
                        let a = self.write_addr as usize % self.mem.len();
                        self.mem[a] &= b;
                        // address wraps inside the 256-byte page
                        self.write_addr =
                            (self.write_addr & !0xFF) | (self.write_addr.wrapping_add(1) & 0xFF);
                    } else {
                        self.status |= STATUS_EPE;
                    }
                }
                0
            }
            0x20 => {
                if n == 4 && self.status & STATUS_WEL != 0 {
                    let a = self.addr();
                    if self.writable(a) {
                        let start = (a as usize & !0xFFF) % self.mem.len();
                        for v in &mut self.mem[start..start + 0x1000] {
                            *v = 0xFF;
                        }
                    } else {
                        self.status |= STATUS_EPE;
                    }
                }
                0
            }
            0xC7 => {
                if self.status & STATUS_WEL != 0 {
                    if self.global_protect || !self.protected.is_empty() {
                        self.status |= STATUS_EPE;
                    } else {
                        self.mem.fill(0xFF);
                    }
                }
                0
            }
            0x01 => {
                if n == 2 && self.status & STATUS_WEL != 0 {
                    self.global_protect = b & 0x7F != 0;
                    if !self.global_protect {
                        self.protected.clear();
                    }
                }
                0
            }
            0x36 => {
                if n == 4 && self.status & STATUS_WEL != 0 {
                    self.protected.insert(self.addr() >> 16);
                }
                0
            }
            0x39 => {
                if n == 4 && self.status & STATUS_WEL != 0 {
                    self.protected.remove(&(self.addr() >> 16));
                }
                0
            }
            _ => 0,
        }
    }

    /// Chip select rises: the write enable latch drops after any frame
    /// that consumed it.
    fn end_frame(&mut self) {
        if matches!(self.frame.first(), Some(0x02 | 0x20 | 0xC7 | 0x01 | 0x36 | 0x39)) {
            self.status &= !STATUS_WEL;
        }
        self.frame.clear();
    }
}

fn install_flash_model() {
    let base = spi_map::HW_SPI_BASE;
    let mut m = FlashModel::new();
    // shifter always ready to take and drain a word
    hosted::poke_or(base, spi_map::SR.offset(), (1 << 1) | (1 << 9));
    hosted::install_hook(
        base,
        Box::new(move |off, access| {
            match access {
                Access::Write(v) if off == spi_map::TDR.offset() => {
                    let out = m.feed(v as u8);
                    hosted::poke(base, spi_map::RDR.offset(), out as usize);
                    hosted::poke_or(base, spi_map::SR.offset(), 1);
                }
                Access::Write(v) if off == spi_map::MR.offset() => {
                    if (v >> 16) & 0xF == 0xF {
                        m.end_frame();
                    }
                }
                Access::Read if off == spi_map::RDR.offset() => {
                    let sr = hosted::peek(base, spi_map::SR.offset());
                    hosted::poke(base, spi_map::SR.offset(), sr & !1);
                }
                _ => {}
            }
            HookAction::Pass
        }),
    );
}

fn run() -> Result<(), Status> {
    demos::uc3_clock_model();
    demos::uc3_console_model(usart_map::HW_USART1_BASE, &[]);
    install_flash_model();

    board::init_clocks()?;
    let mut console = board::init_console()?;
    console.write_line("-- AT25DFx SerialFlash --")?;

    let mut pm = Pm::new();
    pm.enable_module(Bus::Pba, pm_map::PBA_SPI_BIT);

    let mut bus = Spi::new();
    bus.init_master(0);
    bus.setup_chip(FLASH_CS, &ChipConfig { baudrate: 1_000_000, ..Default::default() }, board::PBA_HZ)?;
    bus.enable();

    let chip = SpiChip::new(FLASH_CS)?;
    let mut flash = At25dfx::new(chip, DeviceType::Df081a);
    flash.check_presence()?;
    console.write_line(&format!("found AT25DF081A, {} KiB", flash.capacity() / 1024))?;

    flash.set_global_protect(false)?;
    flash.erase_block_4k(DATA_ADDR)?;
    flash.erase_block_4k(DATA_ADDR + DATA_LEN as u32)?;

    let mut check = [0u8; 32];
    flash.read(DATA_ADDR, &mut check)?;
    if check.iter().any(|&b| b != 0xFF) {
        log::error!("erase left data behind");
        return Err(Status::DeviceError);
    }

    let data: Vec<u8> = (0..DATA_LEN).map(|i| (i % 251) as u8).collect();
    flash.write(DATA_ADDR, &data)?;
    let mut readback = vec![0u8; DATA_LEN];
    flash.read(DATA_ADDR, &mut readback)?;
    if readback != data {
        log::error!("readback mismatch");
        return Err(Status::DeviceError);
    }
    console.write_line(&format!(
        "programmed and verified {} bytes across page boundaries",
        DATA_LEN
    ))?;

    flash.protect_sector(PROT_ADDR, true)?;
    match flash.erase_block_4k(PROT_ADDR) {
        Err(Status::DeviceError) => console.write_line("protected sector refused the erase")?,
        other => {
            log::error!("protection did not hold: {:?}", other);
            return Err(Status::DeviceError);
        }
    }
    flash.protect_sector(PROT_ADDR, false)?;
    flash.set_global_protect(true)?;
    console.write_line("flash parked protected")?;
    Ok(())
}

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        eprintln!("flash-at25: {:?}", e);
        process::exit(1);
    }
}
