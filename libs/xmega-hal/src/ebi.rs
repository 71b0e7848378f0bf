//! External Bus Interface driver for SRAM and SDRAM chip selects.
//!
//! Configuration is staged in plain structs and committed per chip select.
//! The commit order matters: CTRLB and the base address go in first and
//! CTRLA lands last, because its mode field is what arms the chip select.
//! SDRAM lives behind chip select 3 and reports controller init completion
//! in that chip select's CTRLB.

use hal_api::{poll_timeout, Status, POLL_LIMIT};
use hatra::xmega::{ebi, pr};
use hatra::{periph_base, CSR};

use crate::sysclk::{self, Port};

/// The SDRAM controller is hardwired to this chip select.
pub const SDRAM_CS: usize = 3;

/// Chip select mode, `MODE` encoding in CTRLA.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CsMode {
    Disabled = 0,
    Sram = 1,
    Lpc = 2,
    Sdram = 3,
}

/// Decoded address window, `ASPACE` encoding.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AddressSpace {
    B256 = 0,
    B512 = 1,
    K1 = 2,
    K2 = 3,
    K4 = 4,
    K8 = 5,
    K16 = 6,
    K32 = 7,
    K64 = 8,
    K128 = 9,
    K256 = 10,
    K512 = 11,
    M1 = 12,
    M2 = 13,
    M4 = 14,
    M8 = 15,
    M16 = 16,
}

/// Pad interface arrangement, `IFMODE` encoding.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum IfMode {
    Disabled = 0,
    ThreePort = 1,
    FourPort = 2,
    TwoPort = 3,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SdramDataWidth {
    FourBit = 0,
    EightBit = 1,
}

/// Per chip select configuration, staged in register image form. The base
/// address is stored pre-shifted the way the BASEADDR registers take it.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct EbiCsConfig {
    ctrla: u8,
    ctrlb: u8,
    base_address: u16,
}

impl EbiCsConfig {
    pub fn set_mode(&mut self, mode: CsMode) {
        let mask = ebi::CS0_CTRLA_MODE.mask() as u8;
        self.ctrla = (self.ctrla & !mask) | mode as u8;
    }

    pub fn set_address_size(&mut self, aspace: AddressSpace) {
        let mask = (ebi::CS0_CTRLA_ASPACE.mask() as u8) << ebi::CS0_CTRLA_ASPACE.offset();
        self.ctrla = (self.ctrla & !mask) | ((aspace as u8) << ebi::CS0_CTRLA_ASPACE.offset());
    }

    /// Window start in CPU address space; only bits 23..12 are decoded.
    pub fn set_base_address(&mut self, address: u32) {
        self.base_address = ((address >> 8) & 0xFFF0) as u16;
    }

    /// SRAM wait states, 0..=7 peripheral clock cycles.
    pub fn set_sram_wait_states(&mut self, cycles: u8) {
        let mask = ebi::CS0_CTRLB_SRWS.mask() as u8;
        self.ctrlb = (self.ctrlb & !mask) | (cycles & mask);
    }
}

/// SDRAM timing configuration, staged in register image form.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct EbiSdramConfig {
    sdramctrla: u8,
    sdramctrlb: u8,
    sdramctrlc: u8,
    refresh_period: u16,
    init_delay: u16,
}

impl EbiSdramConfig {
    /// CAS latency in clocks, the part supports 2 or 3.
    pub fn set_cas_latency(&mut self, cas: u8) {
        let bit = 1u8 << ebi::SDRAMCTRLA_SDCAS.offset();
        self.sdramctrla = if cas == 3 { self.sdramctrla | bit } else { self.sdramctrla & !bit };
    }

    /// Row address width, 11 or 12 bits.
    pub fn set_row_bits(&mut self, bits: u8) {
        let bit = 1u8 << ebi::SDRAMCTRLA_SDROW.offset();
        self.sdramctrla = if bits == 12 { self.sdramctrla | bit } else { self.sdramctrla & !bit };
    }

    /// Column address width, 8..=11 bits.
    pub fn set_col_bits(&mut self, bits: u8) {
        let mask = ebi::SDRAMCTRLA_SDCOL.mask() as u8;
        self.sdramctrla = (self.sdramctrla & !mask) | (bits.saturating_sub(8) & mask);
    }

    /// Auto refresh interval in peripheral clock cycles, 10 bits.
    pub fn set_refresh_period(&mut self, cycles: u16) {
        self.refresh_period = cycles & 0x03FF;
    }

    /// Power-up to first command delay in clock cycles, 14 bits.
    pub fn set_initialization_delay(&mut self, cycles: u16) {
        self.init_delay = cycles & 0x3FFF;
    }

    pub fn set_mode_register_delay(&mut self, cycles: u8) {
        let f = ebi::SDRAMCTRLB_MRDLY;
        self.sdramctrlb = (self.sdramctrlb & !((f.mask() as u8) << f.offset()))
            | ((cycles & f.mask() as u8) << f.offset());
    }

    pub fn set_row_cycle_delay(&mut self, cycles: u8) {
        let f = ebi::SDRAMCTRLB_ROWCYCDLY;
        self.sdramctrlb = (self.sdramctrlb & !((f.mask() as u8) << f.offset()))
            | ((cycles & f.mask() as u8) << f.offset());
    }

    pub fn set_row_precharge_delay(&mut self, cycles: u8) {
        let f = ebi::SDRAMCTRLB_RPDLY;
        self.sdramctrlb = (self.sdramctrlb & !((f.mask() as u8) << f.offset()))
            | ((cycles & f.mask() as u8) << f.offset());
    }

    pub fn set_write_recovery_delay(&mut self, cycles: u8) {
        let f = ebi::SDRAMCTRLC_WRDLY;
        self.sdramctrlc = (self.sdramctrlc & !((f.mask() as u8) << f.offset()))
            | ((cycles & f.mask() as u8) << f.offset());
    }

    pub fn set_exit_self_refresh_delay(&mut self, cycles: u8) {
        let f = ebi::SDRAMCTRLC_ESRDLY;
        self.sdramctrlc = (self.sdramctrlc & !((f.mask() as u8) << f.offset()))
            | ((cycles & f.mask() as u8) << f.offset());
    }

    pub fn set_row_col_delay(&mut self, cycles: u8) {
        let f = ebi::SDRAMCTRLC_ROWCOLDLY;
        self.sdramctrlc = (self.sdramctrlc & !((f.mask() as u8) << f.offset()))
            | ((cycles & f.mask() as u8) << f.offset());
    }
}

pub struct Ebi {
    csr: CSR<u8>,
}

impl Ebi {
    pub fn new() -> Ebi {
        let base = periph_base::<u8>(ebi::HW_EBI_BASE, ebi::EBI_NUMREGS);
        Ebi { csr: CSR::new(base) }
    }

    /// Select the pad arrangement and the SDRAM data width.
    pub fn configure_interface(&mut self, mode: IfMode, width: SdramDataWidth) {
        let v = self.csr.ms(ebi::CTRL_IFMODE, mode as u8)
            | self.csr.ms(ebi::CTRL_SDDATAW, width as u8);
        self.csr.wo(ebi::CTRL, v);
    }

    /// Commit a chip select configuration. CTRLA goes last so the window
    /// only arms once the rest is in place.
    pub fn write_cs_config(&mut self, cs: usize, config: &EbiCsConfig) -> Result<(), Status> {
        if cs >= ebi::CS_COUNT {
            return Err(Status::InvalidArg);
        }
        self.csr.wo(ebi::cs_ctrlb(cs), config.ctrlb);
        self.csr.wo(ebi::cs_baseaddrl(cs), (config.base_address & 0xFF) as u8);
        self.csr.wo(ebi::cs_baseaddrh(cs), (config.base_address >> 8) as u8);
        self.csr.wo(ebi::cs_ctrla(cs), config.ctrla);
        Ok(())
    }

    pub fn read_cs_config(&self, cs: usize) -> Result<EbiCsConfig, Status> {
        if cs >= ebi::CS_COUNT {
            return Err(Status::InvalidArg);
        }
        let low = self.csr.r(ebi::cs_baseaddrl(cs)) as u16;
        let high = self.csr.r(ebi::cs_baseaddrh(cs)) as u16;
        Ok(EbiCsConfig {
            ctrla: self.csr.r(ebi::cs_ctrla(cs)),
            ctrlb: self.csr.r(ebi::cs_ctrlb(cs)),
            base_address: (high << 8) | low,
        })
    }

    pub fn write_sdram_config(&mut self, config: &EbiSdramConfig) {
        self.csr.wo(ebi::SDRAMCTRLA, config.sdramctrla);
        self.csr.wo(ebi::REFRESHL, (config.refresh_period & 0xFF) as u8);
        self.csr.wo(ebi::REFRESHH, (config.refresh_period >> 8) as u8);
        self.csr.wo(ebi::INITDLYL, (config.init_delay & 0xFF) as u8);
        self.csr.wo(ebi::INITDLYH, (config.init_delay >> 8) as u8);
        self.csr.wo(ebi::SDRAMCTRLB, config.sdramctrlb);
        self.csr.wo(ebi::SDRAMCTRLC, config.sdramctrlc);
    }

    pub fn read_sdram_config(&self) -> EbiSdramConfig {
        EbiSdramConfig {
            sdramctrla: self.csr.r(ebi::SDRAMCTRLA),
            sdramctrlb: self.csr.r(ebi::SDRAMCTRLB),
            sdramctrlc: self.csr.r(ebi::SDRAMCTRLC),
            refresh_period: (self.csr.r(ebi::REFRESHH) as u16) << 8
                | self.csr.r(ebi::REFRESHL) as u16,
            init_delay: (self.csr.r(ebi::INITDLYH) as u16) << 8
                | self.csr.r(ebi::INITDLYL) as u16,
        }
    }

    /// Ungate the bus clock, commit the chip select and pin the sleep
    /// depth at Idle while it stays armed.
    pub fn enable_cs(&mut self, cs: usize, config: &EbiCsConfig) -> Result<(), Status> {
        sysclk::enable_module(Port::Gen, pr::PR_GEN_EBI);
        self.write_cs_config(cs, config)?;
        sleepmgr::xmega::lock(sleepmgr::xmega::SleepMode::Idle);
        Ok(())
    }

    /// Disarm the chip select, keeping the rest of its configuration.
    pub fn disable_cs(&mut self, cs: usize) -> Result<(), Status> {
        let mut config = self.read_cs_config(cs)?;
        config.set_mode(CsMode::Disabled);
        self.write_cs_config(cs, &config)?;
        sleepmgr::xmega::unlock(sleepmgr::xmega::SleepMode::Idle);
        Ok(())
    }

    pub fn sdram_is_ready(&self) -> bool {
        let reg = ebi::cs_ctrlb(SDRAM_CS);
        self.csr.r(reg) & (1 << ebi::CS0_CTRLB_SDINITDONE.offset()) != 0
    }

    /// Block until the SDRAM controller finishes its init sequence.
    pub fn wait_sdram_ready(&self) -> Result<(), Status> {
        poll_timeout(POLL_LIMIT, || self.sdram_is_ready())
    }
}

impl Default for Ebi {
    fn default() -> Self {
        Ebi::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hatra::hosted;

    #[test]
    fn cs_config_round_trips_in_commit_order() {
        let mut e = Ebi::new();
        let mut cfg = EbiCsConfig::default();
        cfg.set_mode(CsMode::Sram);
        cfg.set_address_size(AddressSpace::K64);
        cfg.set_base_address(0x0034_5600);
        cfg.set_sram_wait_states(2);
        e.write_cs_config(1, &cfg).unwrap();

        let base = ebi::HW_EBI_BASE;
        assert_eq!(hosted::peek(base, ebi::cs_ctrla(1).offset()), (8 << 2) | 1);
        assert_eq!(hosted::peek(base, ebi::cs_ctrlb(1).offset()), 2);
        assert_eq!(hosted::peek(base, ebi::cs_baseaddrl(1).offset()), 0x50);
        assert_eq!(hosted::peek(base, ebi::cs_baseaddrh(1).offset()), 0x34);
        assert_eq!(e.read_cs_config(1), Ok(cfg));

        assert_eq!(e.write_cs_config(4, &cfg), Err(Status::InvalidArg));
    }

    #[test]
    fn sdram_timing_fields_pack() {
        let mut e = Ebi::new();
        let mut cfg = EbiSdramConfig::default();
        cfg.set_cas_latency(3);
        cfg.set_row_bits(12);
        cfg.set_col_bits(10);
        cfg.set_refresh_period(0x02FF);
        cfg.set_initialization_delay(0x1234);
        cfg.set_mode_register_delay(2);
        cfg.set_row_cycle_delay(7);
        cfg.set_row_precharge_delay(7);
        e.write_sdram_config(&cfg);

        let base = ebi::HW_EBI_BASE;
        assert_eq!(hosted::peek(base, ebi::SDRAMCTRLA.offset()), 0x0E);
        assert_eq!(hosted::peek(base, ebi::REFRESHL.offset()), 0xFF);
        assert_eq!(hosted::peek(base, ebi::REFRESHH.offset()), 0x02);
        assert_eq!(hosted::peek(base, ebi::INITDLYL.offset()), 0x34);
        assert_eq!(hosted::peek(base, ebi::INITDLYH.offset()), 0x12);
        assert_eq!(hosted::peek(base, ebi::SDRAMCTRLB.offset()), (2 << 6) | (7 << 3) | 7);
        assert_eq!(e.read_sdram_config(), cfg);
    }

    #[test]
    fn enable_arms_and_disable_keeps_the_rest() {
        let mut e = Ebi::new();
        let mut cfg = EbiCsConfig::default();
        cfg.set_mode(CsMode::Sdram);
        cfg.set_address_size(AddressSpace::M8);
        e.enable_cs(SDRAM_CS, &cfg).unwrap();
        assert!(sysclk::module_enabled(Port::Gen, pr::PR_GEN_EBI));
        assert_eq!(sleepmgr::xmega::deepest_allowed(), sleepmgr::xmega::SleepMode::Idle);
        let base = ebi::HW_EBI_BASE;
        assert_eq!(hosted::peek(base, ebi::cs_ctrla(SDRAM_CS).offset()), (15 << 2) | 3);

        e.disable_cs(SDRAM_CS).unwrap();
        // mode cleared, address size preserved
        assert_eq!(hosted::peek(base, ebi::cs_ctrla(SDRAM_CS).offset()), 15 << 2);
    }

    #[test]
    fn sdram_ready_is_a_bounded_poll() {
        let e = Ebi::new();
        assert!(!e.sdram_is_ready());
        assert_eq!(e.wait_sdram_ready(), Err(Status::Timeout));
        hosted::poke_or(
            ebi::HW_EBI_BASE,
            ebi::cs_ctrlb(SDRAM_CS).offset(),
            1 << ebi::CS0_CTRLB_SDINITDONE.offset(),
        );
        assert!(e.sdram_is_ready());
        assert_eq!(e.wait_sdram_ready(), Ok(()));
    }

    #[test]
    fn interface_mode_packs_ctrl() {
        let mut e = Ebi::new();
        e.configure_interface(IfMode::ThreePort, SdramDataWidth::FourBit);
        assert_eq!(hosted::peek(ebi::HW_EBI_BASE, ebi::CTRL.offset()), 1);
        e.configure_interface(IfMode::FourPort, SdramDataWidth::EightBit);
        assert_eq!(hosted::peek(ebi::HW_EBI_BASE, ebi::CTRL.offset()), 2 | (1 << 6));
    }
}
