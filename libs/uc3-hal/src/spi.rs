//! SPI master driver with fixed peripheral selects.

use hal_api::{poll_timeout, SpiDevice, Status, POLL_LIMIT};
use hatra::uc3::spi;
use hatra::{periph_base, CSR};

/// Clock polarity/phase pairs. The CSR register stores NCPHA, the inverse
/// of the usual CPHA convention.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SpiMode {
    Mode0,
    Mode1,
    Mode2,
    Mode3,
}

impl SpiMode {
    fn cpol(self) -> u32 {
        matches!(self, SpiMode::Mode2 | SpiMode::Mode3) as u32
    }

    fn ncpha(self) -> u32 {
        matches!(self, SpiMode::Mode0 | SpiMode::Mode2) as u32
    }
}

#[derive(Debug, Copy, Clone)]
pub struct ChipConfig {
    pub baudrate: u32,
    pub mode: SpiMode,
    /// Bits per transfer, 8..=16.
    pub bits: u8,
    /// Delay before SPCK, in peripheral clocks.
    pub delay_bs: u8,
    /// Delay between consecutive transfers.
    pub delay_bct: u8,
}

impl Default for ChipConfig {
    fn default() -> Self {
        ChipConfig { baudrate: 1_000_000, mode: SpiMode::Mode0, bits: 8, delay_bs: 0, delay_bct: 0 }
    }
}

pub const CHIP_SELECTS: usize = 4;

pub struct Spi {
    csr: CSR<u32>,
}

impl Spi {
    pub fn new() -> Spi {
        Spi { csr: CSR::new(periph_base::<u32>(spi::HW_SPI_BASE, spi::SPI_NUMREGS)) }
    }

    /// Software-reset the block and set it up as bus master, fixed selects,
    /// mode fault detection off.
    pub fn init_master(&mut self, delay_bcs: u8) {
        self.csr.wfo(spi::CR_SWRST, 1);
        let mr = self.csr.ms(spi::MR_MSTR, 1)
            | self.csr.ms(spi::MR_MODFDIS, 1)
            | self.csr.ms(spi::MR_PCS, 0xF)
            | self.csr.ms(spi::MR_DLYBCS, delay_bcs as u32);
        self.csr.wo(spi::MR, mr);
    }

    pub fn enable(&mut self) {
        self.csr.wfo(spi::CR_SPIEN, 1);
    }

    pub fn disable(&mut self) {
        self.csr.wfo(spi::CR_SPIDIS, 1);
    }

    pub fn is_enabled(&self) -> bool {
        self.csr.rf(spi::SR_SPIENS) != 0
    }

    pub fn setup_chip(&mut self, chip: usize, config: &ChipConfig, pba_hz: u32) -> Result<(), Status> {
        if chip >= CHIP_SELECTS || !(8..=16).contains(&config.bits) || config.baudrate == 0 {
            return Err(Status::InvalidArg);
        }
        let scbr = (pba_hz + config.baudrate / 2) / config.baudrate;
        if scbr == 0 || scbr > 255 {
            return Err(Status::InvalidArg);
        }
        let v = self.csr.ms(spi::CSR0_CPOL, config.mode.cpol())
            | self.csr.ms(spi::CSR0_NCPHA, config.mode.ncpha())
            | self.csr.ms(spi::CSR0_BITS, (config.bits - 8) as u32)
            | self.csr.ms(spi::CSR0_SCBR, scbr)
            | self.csr.ms(spi::CSR0_DLYBS, config.delay_bs as u32)
            | self.csr.ms(spi::CSR0_DLYBCT, config.delay_bct as u32);
        self.csr.wo(spi::csrn(chip), v);
        Ok(())
    }

    /// Drive the chip select for `chip`; fixed mode uses a one-cold encoding.
    pub fn select_chip(&mut self, chip: usize) -> Result<(), Status> {
        if chip >= CHIP_SELECTS {
            return Err(Status::InvalidArg);
        }
        self.csr.rmwf(spi::MR_PCS, !(1 << chip) & 0xF);
        Ok(())
    }

    /// Release all chip selects once the shifter has drained.
    pub fn deselect_chip(&mut self) -> Result<(), Status> {
        poll_timeout(POLL_LIMIT, || self.csr.rf(spi::SR_TXEMPTY) != 0)?;
        self.csr.rmwf(spi::MR_PCS, 0xF);
        Ok(())
    }

    pub fn write(&mut self, data: u16) -> Result<(), Status> {
        poll_timeout(POLL_LIMIT, || self.csr.rf(spi::SR_TDRE) != 0)?;
        self.csr.wfo(spi::TDR_TD, data as u32);
        Ok(())
    }

    pub fn read(&mut self) -> Result<u16, Status> {
        poll_timeout(POLL_LIMIT, || self.csr.rf(spi::SR_RDRF) != 0)?;
        Ok(self.csr.rf(spi::RDR_RD) as u16)
    }

    pub fn transfer_word(&mut self, data: u16) -> Result<u16, Status> {
        self.write(data)?;
        self.read()
    }
}

impl Default for Spi {
    fn default() -> Self {
        Self::new()
    }
}

/// One chip select on the shared bus, packaged as a [`SpiDevice`].
pub struct SpiChip {
    spi: Spi,
    chip: usize,
}

impl SpiChip {
    pub fn new(chip: usize) -> Result<SpiChip, Status> {
        if chip >= CHIP_SELECTS {
            return Err(Status::InvalidArg);
        }
        Ok(SpiChip { spi: Spi::new(), chip })
    }
}

impl SpiDevice for SpiChip {
    fn select(&mut self) {
        // chip index was validated at construction
        if let Err(e) = self.spi.select_chip(self.chip) {
            log::warn!("spi cs{} select failed: {:?}", self.chip, e);
        }
    }

    fn deselect(&mut self) {
        if let Err(e) = self.spi.deselect_chip() {
            log::warn!("spi cs{} deselect failed: {:?}", self.chip, e);
        }
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), Status> {
        for &b in bytes {
            self.spi.transfer_word(b as u16)?;
        }
        Ok(())
    }

    fn transfer(&mut self, buf: &mut [u8]) -> Result<(), Status> {
        for b in buf {
            *b = self.spi.transfer_word(*b as u16)? as u8;
        }
        Ok(())
    }
}
