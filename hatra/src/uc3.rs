//! AVR32 UC3 register maps.
//!
//! Transcribed from the UC3 series datasheet register summaries. Only the
//! registers and fields the drivers touch are defined; offsets are 32-bit
//! word offsets from the block base.

/// Power Manager.
pub mod pm {
    use crate::{Field, Register};

    pub const MCCTRL: Register = Register::new(0, 0x0000_0007);
    pub const MCCTRL_MCSEL: Field = Field::new(3, 0, MCCTRL);

    pub const CPUSEL: Register = Register::new(1, 0x0000_0087);
    pub const CPUSEL_CPUSEL: Field = Field::new(3, 0, CPUSEL);
    pub const CPUSEL_CPUDIV: Field = Field::new(1, 7, CPUSEL);

    pub const PBASEL: Register = Register::new(3, 0x0000_0087);
    pub const PBASEL_PBSEL: Field = Field::new(3, 0, PBASEL);
    pub const PBASEL_PBDIV: Field = Field::new(1, 7, PBASEL);

    pub const PBBSEL: Register = Register::new(4, 0x0000_0087);
    pub const PBBSEL_PBSEL: Field = Field::new(3, 0, PBBSEL);
    pub const PBBSEL_PBDIV: Field = Field::new(1, 7, PBBSEL);

    pub const CPUMASK: Register = Register::new(8, 0xFFFF_FFFF);
    pub const HSBMASK: Register = Register::new(9, 0xFFFF_FFFF);
    pub const PBAMASK: Register = Register::new(10, 0xFFFF_FFFF);
    pub const PBBMASK: Register = Register::new(11, 0xFFFF_FFFF);

    // PBAMASK bit assignments for the blocks the drivers touch.
    pub const PBA_AST_BIT: u32 = 3;
    pub const PBA_EIC_BIT: u32 = 5;
    pub const PBA_GPIO_BIT: u32 = 7;
    pub const PBA_USART0_BIT: u32 = 8;
    pub const PBA_USART1_BIT: u32 = 9;
    pub const PBA_USART2_BIT: u32 = 10;
    pub const PBA_SPI_BIT: u32 = 12;
    pub const PBA_TWIM0_BIT: u32 = 13;
    pub const PBA_PWM_BIT: u32 = 17;
    pub const PBA_TC_BIT: u32 = 18;
    pub const PBA_PEVC_BIT: u32 = 25;

    pub const SR: Register = Register::new(26, 0x0000_00FF);
    pub const SR_CFD: Field = Field::new(1, 0, SR);
    pub const SR_CKRDY: Field = Field::new(1, 5, SR);

    /// Writes to protected registers must be preceded by a key write here.
    pub const UNLOCK: Register = Register::new(128, 0xFF00_03FF);
    pub const UNLOCK_ADDR: Field = Field::new(10, 0, UNLOCK);
    pub const UNLOCK_KEY: Field = Field::new(8, 24, UNLOCK);
    pub const UNLOCK_KEY_VALUE: usize = 0xAA;

    pub const HW_PM_BASE: usize = 0xFFFF_1400;
    pub const PM_NUMREGS: usize = 129;
}

/// System Control Interface: oscillators, generic clocks.
pub mod scif {
    use crate::{Field, Register};

    pub const IER: Register = Register::new(0, 0xFFFF_FFFF);
    pub const IDR: Register = Register::new(1, 0xFFFF_FFFF);
    pub const IMR: Register = Register::new(2, 0xFFFF_FFFF);
    pub const ISR: Register = Register::new(3, 0xFFFF_FFFF);
    pub const ICR: Register = Register::new(4, 0xFFFF_FFFF);

    pub const PCLKSR: Register = Register::new(5, 0x0000_00FF);
    pub const PCLKSR_OSC0RDY: Field = Field::new(1, 0, PCLKSR);
    pub const PCLKSR_OSC32RDY: Field = Field::new(1, 1, PCLKSR);
    pub const PCLKSR_DFLL0RDY: Field = Field::new(1, 2, PCLKSR);

    pub const UNLOCK: Register = Register::new(6, 0xFF00_03FF);
    pub const UNLOCK_ADDR: Field = Field::new(10, 0, UNLOCK);
    pub const UNLOCK_KEY: Field = Field::new(8, 24, UNLOCK);
    pub const UNLOCK_KEY_VALUE: usize = 0xAA;

    pub const OSCCTRL0: Register = Register::new(8, 0x0001_0F07);
    pub const OSCCTRL0_MODE: Field = Field::new(1, 0, OSCCTRL0);
    pub const OSCCTRL0_GAIN: Field = Field::new(2, 1, OSCCTRL0);
    pub const OSCCTRL0_STARTUP: Field = Field::new(4, 8, OSCCTRL0);
    pub const OSCCTRL0_OSCEN: Field = Field::new(1, 16, OSCCTRL0);

    pub const OSC32CTRL: Register = Register::new(9, 0x0107_070D);
    pub const OSC32CTRL_OSC32EN: Field = Field::new(1, 0, OSC32CTRL);
    pub const OSC32CTRL_EN32K: Field = Field::new(1, 2, OSC32CTRL);
    pub const OSC32CTRL_EN1K: Field = Field::new(1, 3, OSC32CTRL);
    pub const OSC32CTRL_MODE: Field = Field::new(3, 8, OSC32CTRL);
    pub const OSC32CTRL_STARTUP: Field = Field::new(3, 16, OSC32CTRL);
    pub const OSC32CTRL_PINSEL: Field = Field::new(1, 24, OSC32CTRL);

    pub const GCLKS: usize = 5;
    pub const fn gcctrl(id: usize) -> Register { Register::new(24 + id, 0xFFFF_0F1F) }
    pub const GCCTRL0: Register = gcctrl(0);
    pub const GCCTRL0_CEN: Field = Field::new(1, 0, GCCTRL0);
    pub const GCCTRL0_DIVEN: Field = Field::new(1, 4, GCCTRL0);
    pub const GCCTRL0_OSCSEL: Field = Field::new(4, 8, GCCTRL0);
    pub const GCCTRL0_DIV: Field = Field::new(16, 16, GCCTRL0);

    pub const HW_SCIF_BASE: usize = 0xFFFF_1800;
    pub const SCIF_NUMREGS: usize = 32;
}

/// GPIO controller, one block per 32-pin port.
///
/// Most registers come in set/clear/toggle triples behind the base
/// register; the driver uses those to avoid read-modify-write on shared
/// ports.
pub mod gpio {
    use crate::{Field, Register};

    pub const GPER: Register = Register::new(0, 0xFFFF_FFFF);
    pub const GPERS: Register = Register::new(1, 0xFFFF_FFFF);
    pub const GPERC: Register = Register::new(2, 0xFFFF_FFFF);
    pub const GPERT: Register = Register::new(3, 0xFFFF_FFFF);

    pub const PMR0: Register = Register::new(4, 0xFFFF_FFFF);
    pub const PMR0S: Register = Register::new(5, 0xFFFF_FFFF);
    pub const PMR0C: Register = Register::new(6, 0xFFFF_FFFF);
    pub const PMR1: Register = Register::new(8, 0xFFFF_FFFF);
    pub const PMR1S: Register = Register::new(9, 0xFFFF_FFFF);
    pub const PMR1C: Register = Register::new(10, 0xFFFF_FFFF);

    pub const ODER: Register = Register::new(16, 0xFFFF_FFFF);
    pub const ODERS: Register = Register::new(17, 0xFFFF_FFFF);
    pub const ODERC: Register = Register::new(18, 0xFFFF_FFFF);

    pub const OVR: Register = Register::new(20, 0xFFFF_FFFF);
    pub const OVRS: Register = Register::new(21, 0xFFFF_FFFF);
    pub const OVRC: Register = Register::new(22, 0xFFFF_FFFF);
    pub const OVRT: Register = Register::new(23, 0xFFFF_FFFF);

    pub const PVR: Register = Register::new(24, 0xFFFF_FFFF);

    pub const PUER: Register = Register::new(28, 0xFFFF_FFFF);
    pub const PUERS: Register = Register::new(29, 0xFFFF_FFFF);
    pub const PUERC: Register = Register::new(30, 0xFFFF_FFFF);

    pub const ODMER: Register = Register::new(32, 0xFFFF_FFFF);
    pub const ODMERS: Register = Register::new(33, 0xFFFF_FFFF);
    pub const ODMERC: Register = Register::new(34, 0xFFFF_FFFF);

    pub const IER: Register = Register::new(36, 0xFFFF_FFFF);
    pub const IERS: Register = Register::new(37, 0xFFFF_FFFF);
    pub const IERC: Register = Register::new(38, 0xFFFF_FFFF);

    pub const IMR0: Register = Register::new(40, 0xFFFF_FFFF);
    pub const IMR0S: Register = Register::new(41, 0xFFFF_FFFF);
    pub const IMR0C: Register = Register::new(42, 0xFFFF_FFFF);
    pub const IMR1: Register = Register::new(44, 0xFFFF_FFFF);
    pub const IMR1S: Register = Register::new(45, 0xFFFF_FFFF);
    pub const IMR1C: Register = Register::new(46, 0xFFFF_FFFF);

    pub const GFER: Register = Register::new(48, 0xFFFF_FFFF);
    pub const GFERS: Register = Register::new(49, 0xFFFF_FFFF);
    pub const GFERC: Register = Register::new(50, 0xFFFF_FFFF);

    pub const IFR: Register = Register::new(52, 0xFFFF_FFFF);
    pub const IFRC: Register = Register::new(54, 0xFFFF_FFFF);

    // dummy field handles for whole-register mask building
    pub const OVR_ALL: Field = Field::new(32, 0, OVR);

    pub const HW_GPIO_BASE: usize = 0xFFFF_2C00;
    pub const GPIO_PORT_STRIDE: usize = 0x100;
    pub const GPIO_PORT_NUMREGS: usize = 64;
    pub const GPIO_PORTS: usize = 2;

    pub const fn port_base(port: usize) -> usize { HW_GPIO_BASE + port * GPIO_PORT_STRIDE }
}

/// Interrupt controller: one priority register per group.
pub mod intc {
    use crate::{Field, Register};

    pub const fn ipr(group: usize) -> Register { Register::new(group, 0xC000_3FFF) }
    pub const fn ipr_intlevel(group: usize) -> Field { Field::new(2, 30, ipr(group)) }
    pub const fn ipr_autovector(group: usize) -> Field { Field::new(14, 0, ipr(group)) }
    pub const fn irr(group: usize) -> Register { Register::new(64 + group, 0xFFFF_FFFF) }

    pub const IPR0: Register = ipr(0);
    pub const IPR0_INTLEVEL: Field = Field::new(2, 30, IPR0);
    pub const IPR0_AUTOVECTOR: Field = Field::new(14, 0, IPR0);

    pub const HW_INTC_BASE: usize = 0xFFFF_1000;
    pub const INTC_NUMREGS: usize = 128;
    pub const INTC_GROUPS: usize = 64;
}

/// USART in asynchronous RS-232 service.
pub mod usart {
    use crate::{Field, Register};

    pub const CR: Register = Register::new(0, 0x0001_FFFC);
    pub const CR_RSTRX: Field = Field::new(1, 2, CR);
    pub const CR_RSTTX: Field = Field::new(1, 3, CR);
    pub const CR_RXEN: Field = Field::new(1, 4, CR);
    pub const CR_RXDIS: Field = Field::new(1, 5, CR);
    pub const CR_TXEN: Field = Field::new(1, 6, CR);
    pub const CR_TXDIS: Field = Field::new(1, 7, CR);
    pub const CR_RSTSTA: Field = Field::new(1, 8, CR);

    pub const MR: Register = Register::new(1, 0x000F_FFFF);
    pub const MR_MODE: Field = Field::new(4, 0, MR);
    pub const MR_USCLKS: Field = Field::new(2, 4, MR);
    pub const MR_CHRL: Field = Field::new(2, 6, MR);
    pub const MR_SYNC: Field = Field::new(1, 8, MR);
    pub const MR_PAR: Field = Field::new(3, 9, MR);
    pub const MR_NBSTOP: Field = Field::new(2, 12, MR);
    pub const MR_CHMODE: Field = Field::new(2, 14, MR);
    pub const MR_OVER: Field = Field::new(1, 19, MR);

    // interrupt registers share the CSR bit layout
    pub const IER: Register = Register::new(2, 0xFFFF_FFFF);
    pub const IER_RXRDY: Field = Field::new(1, 0, IER);
    pub const IER_TXRDY: Field = Field::new(1, 1, IER);
    pub const IDR: Register = Register::new(3, 0xFFFF_FFFF);
    pub const IDR_RXRDY: Field = Field::new(1, 0, IDR);
    pub const IDR_TXRDY: Field = Field::new(1, 1, IDR);
    pub const IMR: Register = Register::new(4, 0xFFFF_FFFF);
    pub const IMR_RXRDY: Field = Field::new(1, 0, IMR);

    pub const CSR: Register = Register::new(5, 0xFFFF_FFFF);
    pub const CSR_RXRDY: Field = Field::new(1, 0, CSR);
    pub const CSR_TXRDY: Field = Field::new(1, 1, CSR);
    pub const CSR_RXBRK: Field = Field::new(1, 2, CSR);
    pub const CSR_OVRE: Field = Field::new(1, 5, CSR);
    pub const CSR_FRAME: Field = Field::new(1, 6, CSR);
    pub const CSR_PARE: Field = Field::new(1, 7, CSR);
    pub const CSR_TXEMPTY: Field = Field::new(1, 9, CSR);

    pub const RHR: Register = Register::new(6, 0x0000_01FF);
    pub const RHR_RXCHR: Field = Field::new(9, 0, RHR);

    pub const THR: Register = Register::new(7, 0x0000_01FF);
    pub const THR_TXCHR: Field = Field::new(9, 0, THR);

    pub const BRGR: Register = Register::new(8, 0x0007_FFFF);
    pub const BRGR_CD: Field = Field::new(16, 0, BRGR);
    pub const BRGR_FP: Field = Field::new(3, 16, BRGR);

    pub const HW_USART0_BASE: usize = 0xFFFF_3000;
    pub const HW_USART1_BASE: usize = 0xFFFF_3400;
    pub const HW_USART2_BASE: usize = 0xFFFF_3800;
    pub const USART_NUMREGS: usize = 16;
}

/// SPI master.
pub mod spi {
    use crate::{Field, Register};

    pub const CR: Register = Register::new(0, 0x0000_0083);
    pub const CR_SPIEN: Field = Field::new(1, 0, CR);
    pub const CR_SPIDIS: Field = Field::new(1, 1, CR);
    pub const CR_SWRST: Field = Field::new(1, 7, CR);

    pub const MR: Register = Register::new(1, 0xFFFF_00BF);
    pub const MR_MSTR: Field = Field::new(1, 0, MR);
    pub const MR_PS: Field = Field::new(1, 1, MR);
    pub const MR_PCSDEC: Field = Field::new(1, 2, MR);
    pub const MR_MODFDIS: Field = Field::new(1, 4, MR);
    pub const MR_LLB: Field = Field::new(1, 7, MR);
    pub const MR_PCS: Field = Field::new(4, 16, MR);
    pub const MR_DLYBCS: Field = Field::new(8, 24, MR);

    pub const RDR: Register = Register::new(2, 0x0000_FFFF);
    pub const RDR_RD: Field = Field::new(16, 0, RDR);

    pub const TDR: Register = Register::new(3, 0x01FF_FFFF);
    pub const TDR_TD: Field = Field::new(16, 0, TDR);
    pub const TDR_PCS: Field = Field::new(4, 16, TDR);
    pub const TDR_LASTXFER: Field = Field::new(1, 24, TDR);

    pub const SR: Register = Register::new(4, 0x0001_03FF);
    pub const SR_RDRF: Field = Field::new(1, 0, SR);
    pub const SR_TDRE: Field = Field::new(1, 1, SR);
    pub const SR_MODF: Field = Field::new(1, 2, SR);
    pub const SR_OVRES: Field = Field::new(1, 3, SR);
    pub const SR_TXEMPTY: Field = Field::new(1, 9, SR);
    pub const SR_SPIENS: Field = Field::new(1, 16, SR);

    pub const IER: Register = Register::new(5, 0xFFFF_FFFF);
    pub const IDR: Register = Register::new(6, 0xFFFF_FFFF);
    pub const IMR: Register = Register::new(7, 0xFFFF_FFFF);

    pub const fn csrn(n: usize) -> Register { Register::new(12 + n, 0xFFFF_FFFB) }
    pub const CSR0: Register = csrn(0);
    pub const CSR0_CPOL: Field = Field::new(1, 0, CSR0);
    pub const CSR0_NCPHA: Field = Field::new(1, 1, CSR0);
    pub const CSR0_CSAAT: Field = Field::new(1, 3, CSR0);
    pub const CSR0_BITS: Field = Field::new(4, 4, CSR0);
    pub const CSR0_SCBR: Field = Field::new(8, 8, CSR0);
    pub const CSR0_DLYBS: Field = Field::new(8, 16, CSR0);
    pub const CSR0_DLYBCT: Field = Field::new(8, 24, CSR0);

    pub const HW_SPI_BASE: usize = 0xFFFF_4000;
    pub const SPI_NUMREGS: usize = 16;
}

/// External Interrupt Controller.
pub mod eic {
    use crate::{Field, Register};

    pub const IER: Register = Register::new(0, 0xFFFF_FFFF);
    pub const IDR: Register = Register::new(1, 0xFFFF_FFFF);
    pub const IMR: Register = Register::new(2, 0xFFFF_FFFF);
    pub const ISR: Register = Register::new(3, 0xFFFF_FFFF);
    pub const ICR: Register = Register::new(4, 0xFFFF_FFFF);
    pub const MODE: Register = Register::new(5, 0xFFFF_FFFF);
    pub const EDGE: Register = Register::new(6, 0xFFFF_FFFF);
    pub const LEVEL: Register = Register::new(7, 0xFFFF_FFFF);
    pub const FILTER: Register = Register::new(8, 0xFFFF_FFFF);
    pub const TEST: Register = Register::new(9, 0xFFFF_FFFF);
    pub const ASYNC: Register = Register::new(10, 0xFFFF_FFFF);

    pub const SCAN: Register = Register::new(11, 0x0700_1F01);
    pub const SCAN_EN: Field = Field::new(1, 0, SCAN);
    pub const SCAN_PRESC: Field = Field::new(5, 8, SCAN);
    pub const SCAN_PIN: Field = Field::new(3, 24, SCAN);

    pub const EN: Register = Register::new(12, 0xFFFF_FFFF);
    pub const DIS: Register = Register::new(13, 0xFFFF_FFFF);
    pub const CTRL: Register = Register::new(14, 0xFFFF_FFFF);

    pub const EIC_LINES: usize = 9;
    pub const HW_EIC_BASE: usize = 0xFFFF_2400;
    pub const EIC_NUMREGS: usize = 16;
}

/// Timer/Counter: three 16-bit channels plus common block.
pub mod tc {
    use crate::{Field, Register};

    pub const CHANNEL_STRIDE: usize = 16;
    pub const CHANNELS: usize = 3;

    pub const fn ccr(ch: usize) -> Register { Register::new(ch * CHANNEL_STRIDE, 0x7) }
    pub const fn cmr(ch: usize) -> Register { Register::new(ch * CHANNEL_STRIDE + 1, 0xFFFF_FFFF) }
    pub const fn cv(ch: usize) -> Register { Register::new(ch * CHANNEL_STRIDE + 4, 0xFFFF) }
    pub const fn ra(ch: usize) -> Register { Register::new(ch * CHANNEL_STRIDE + 5, 0xFFFF) }
    pub const fn rb(ch: usize) -> Register { Register::new(ch * CHANNEL_STRIDE + 6, 0xFFFF) }
    pub const fn rc(ch: usize) -> Register { Register::new(ch * CHANNEL_STRIDE + 7, 0xFFFF) }
    pub const fn sr(ch: usize) -> Register { Register::new(ch * CHANNEL_STRIDE + 8, 0x0001_00FF) }
    pub const fn ier(ch: usize) -> Register { Register::new(ch * CHANNEL_STRIDE + 9, 0xFF) }
    pub const fn idr(ch: usize) -> Register { Register::new(ch * CHANNEL_STRIDE + 10, 0xFF) }
    pub const fn imr(ch: usize) -> Register { Register::new(ch * CHANNEL_STRIDE + 11, 0xFF) }

    pub const CCR0: Register = ccr(0);
    pub const CCR0_CLKEN: Field = Field::new(1, 0, CCR0);
    pub const CCR0_CLKDIS: Field = Field::new(1, 1, CCR0);
    pub const CCR0_SWTRG: Field = Field::new(1, 2, CCR0);

    pub const CMR0: Register = cmr(0);
    pub const CMR0_TCCLKS: Field = Field::new(3, 0, CMR0);
    pub const CMR0_CLKI: Field = Field::new(1, 3, CMR0);
    pub const CMR0_BURST: Field = Field::new(2, 4, CMR0);
    // waveform mode layout
    pub const CMR0_CPCSTOP: Field = Field::new(1, 6, CMR0);
    pub const CMR0_CPCDIS: Field = Field::new(1, 7, CMR0);
    pub const CMR0_EEVTEDG: Field = Field::new(2, 8, CMR0);
    pub const CMR0_EEVT: Field = Field::new(2, 10, CMR0);
    pub const CMR0_ENETRG: Field = Field::new(1, 12, CMR0);
    pub const CMR0_WAVSEL: Field = Field::new(2, 13, CMR0);
    pub const CMR0_WAVE: Field = Field::new(1, 15, CMR0);
    pub const CMR0_ACPA: Field = Field::new(2, 16, CMR0);
    pub const CMR0_ACPC: Field = Field::new(2, 18, CMR0);
    pub const CMR0_BCPB: Field = Field::new(2, 24, CMR0);
    pub const CMR0_BCPC: Field = Field::new(2, 26, CMR0);
    // capture mode layout
    pub const CMR0_LDBSTOP: Field = Field::new(1, 6, CMR0);
    pub const CMR0_LDBDIS: Field = Field::new(1, 7, CMR0);
    pub const CMR0_ETRGEDG: Field = Field::new(2, 8, CMR0);
    pub const CMR0_ABETRG: Field = Field::new(1, 10, CMR0);
    pub const CMR0_CPCTRG: Field = Field::new(1, 14, CMR0);
    pub const CMR0_LDRA: Field = Field::new(2, 16, CMR0);
    pub const CMR0_LDRB: Field = Field::new(2, 18, CMR0);

    pub const SR0: Register = sr(0);
    pub const SR0_COVFS: Field = Field::new(1, 0, SR0);
    pub const SR0_LOVRS: Field = Field::new(1, 1, SR0);
    pub const SR0_CPAS: Field = Field::new(1, 2, SR0);
    pub const SR0_CPBS: Field = Field::new(1, 3, SR0);
    pub const SR0_CPCS: Field = Field::new(1, 4, SR0);
    pub const SR0_LDRAS: Field = Field::new(1, 5, SR0);
    pub const SR0_LDRBS: Field = Field::new(1, 6, SR0);
    pub const SR0_ETRGS: Field = Field::new(1, 7, SR0);
    pub const SR0_CLKSTA: Field = Field::new(1, 16, SR0);

    pub const BCR: Register = Register::new(48, 0x1);
    pub const BCR_SYNC: Field = Field::new(1, 0, BCR);
    pub const BMR: Register = Register::new(49, 0x3F);

    pub const HW_TC_BASE: usize = 0xFFFF_6400;
    pub const TC_NUMREGS: usize = 64;
}

/// PWM controller with register write protection.
pub mod pwm {
    use crate::{Field, Register};

    pub const CLK: Register = Register::new(0, 0x0FFF_0FFF);
    pub const CLK_DIVA: Field = Field::new(8, 0, CLK);
    pub const CLK_PREA: Field = Field::new(4, 8, CLK);
    pub const CLK_DIVB: Field = Field::new(8, 16, CLK);
    pub const CLK_PREB: Field = Field::new(4, 24, CLK);

    pub const ENA: Register = Register::new(1, 0xF);
    pub const DIS: Register = Register::new(2, 0xF);
    pub const SR: Register = Register::new(3, 0xF);

    pub const IER1: Register = Register::new(4, 0xF);
    pub const IDR1: Register = Register::new(5, 0xF);
    pub const IMR1: Register = Register::new(6, 0xF);
    pub const ISR1: Register = Register::new(7, 0xF);

    pub const WPCR: Register = Register::new(57, 0xFFFF_FFFF);
    pub const WPCR_WPCMD: Field = Field::new(2, 0, WPCR);
    pub const WPCR_WPRG: Field = Field::new(6, 2, WPCR);
    pub const WPCR_WPKEY: Field = Field::new(24, 8, WPCR);
    /// ASCII "PWM", required in WPCR_WPKEY for the command to take.
    pub const WPCR_KEY_VALUE: usize = 0x50574D;

    pub const WPSR: Register = Register::new(58, 0xFFFF_FFFF);
    pub const WPSR_WPSWS: Field = Field::new(6, 0, WPSR);
    pub const WPSR_WPHWS: Field = Field::new(6, 8, WPSR);
    pub const WPSR_WPVS: Field = Field::new(1, 15, WPSR);
    pub const WPSR_WPVSRC: Field = Field::new(16, 16, WPSR);

    pub const CHANNELS: usize = 4;
    pub const CHANNEL_BASE: usize = 128; // 0x200 bytes in
    pub const CHANNEL_STRIDE: usize = 8;

    pub const fn cmr(ch: usize) -> Register {
        Register::new(CHANNEL_BASE + ch * CHANNEL_STRIDE, 0x003F_0FFF)
    }
    pub const fn cdty(ch: usize) -> Register {
        Register::new(CHANNEL_BASE + ch * CHANNEL_STRIDE + 1, 0x00FF_FFFF)
    }
    pub const fn cdtyupd(ch: usize) -> Register {
        Register::new(CHANNEL_BASE + ch * CHANNEL_STRIDE + 2, 0x00FF_FFFF)
    }
    pub const fn cprd(ch: usize) -> Register {
        Register::new(CHANNEL_BASE + ch * CHANNEL_STRIDE + 3, 0x00FF_FFFF)
    }
    pub const fn cprdupd(ch: usize) -> Register {
        Register::new(CHANNEL_BASE + ch * CHANNEL_STRIDE + 4, 0x00FF_FFFF)
    }
    pub const fn ccnt(ch: usize) -> Register {
        Register::new(CHANNEL_BASE + ch * CHANNEL_STRIDE + 5, 0x00FF_FFFF)
    }
    pub const fn dt(ch: usize) -> Register {
        Register::new(CHANNEL_BASE + ch * CHANNEL_STRIDE + 6, 0xFFFF_FFFF)
    }
    pub const fn dtupd(ch: usize) -> Register {
        Register::new(CHANNEL_BASE + ch * CHANNEL_STRIDE + 7, 0xFFFF_FFFF)
    }

    pub const CMR0: Register = cmr(0);
    pub const CMR0_CPRE: Field = Field::new(4, 0, CMR0);
    pub const CMR0_CALG: Field = Field::new(1, 8, CMR0);
    pub const CMR0_CPOL: Field = Field::new(1, 9, CMR0);
    pub const CMR0_CES: Field = Field::new(1, 10, CMR0);
    pub const CMR0_DTE: Field = Field::new(1, 16, CMR0);
    pub const CMR0_DTHI: Field = Field::new(1, 17, CMR0);
    pub const CMR0_DTLI: Field = Field::new(1, 18, CMR0);

    pub const HW_PWM_BASE: usize = 0xFFFF_6000;
    pub const PWM_NUMREGS: usize = 160;
}

/// Two-wire master.
pub mod twim {
    use crate::{Field, Register};

    pub const CR: Register = Register::new(0, 0x0000_01B3);
    pub const CR_MEN: Field = Field::new(1, 0, CR);
    pub const CR_MDIS: Field = Field::new(1, 1, CR);
    pub const CR_SMEN: Field = Field::new(1, 4, CR);
    pub const CR_SMDIS: Field = Field::new(1, 5, CR);
    pub const CR_SWRST: Field = Field::new(1, 7, CR);
    pub const CR_STOP: Field = Field::new(1, 8, CR);

    pub const CWGR: Register = Register::new(1, 0x7FFF_FFFF);
    pub const CWGR_LOW: Field = Field::new(8, 0, CWGR);
    pub const CWGR_HIGH: Field = Field::new(8, 8, CWGR);
    pub const CWGR_STASTO: Field = Field::new(8, 16, CWGR);
    pub const CWGR_DATA: Field = Field::new(4, 24, CWGR);
    pub const CWGR_EXP: Field = Field::new(3, 28, CWGR);

    pub const SMBTR: Register = Register::new(2, 0xFFFF_FFFF);

    pub const CMDR: Register = Register::new(3, 0x01FF_FFFF);
    pub const CMDR_READ: Field = Field::new(1, 0, CMDR);
    pub const CMDR_SADR: Field = Field::new(10, 1, CMDR);
    pub const CMDR_TENBIT: Field = Field::new(1, 11, CMDR);
    pub const CMDR_REPSAME: Field = Field::new(1, 12, CMDR);
    pub const CMDR_START: Field = Field::new(1, 13, CMDR);
    pub const CMDR_STOP: Field = Field::new(1, 14, CMDR);
    pub const CMDR_VALID: Field = Field::new(1, 15, CMDR);
    pub const CMDR_NBYTES: Field = Field::new(8, 16, CMDR);
    pub const CMDR_ACKLAST: Field = Field::new(1, 24, CMDR);

    pub const NCMDR: Register = Register::new(4, 0x01FF_FFFF);
    pub const NCMDR_VALID: Field = Field::new(1, 15, NCMDR);

    pub const RHR: Register = Register::new(5, 0xFF);
    pub const RHR_RXDATA: Field = Field::new(8, 0, RHR);

    pub const THR: Register = Register::new(6, 0xFF);
    pub const THR_TXDATA: Field = Field::new(8, 0, THR);

    pub const SR: Register = Register::new(7, 0x0000_3F3F);
    pub const SR_RXRDY: Field = Field::new(1, 0, SR);
    pub const SR_TXRDY: Field = Field::new(1, 1, SR);
    pub const SR_CRDY: Field = Field::new(1, 2, SR);
    pub const SR_CCOMP: Field = Field::new(1, 3, SR);
    pub const SR_IDLE: Field = Field::new(1, 4, SR);
    pub const SR_BUSFREE: Field = Field::new(1, 5, SR);
    pub const SR_ANAK: Field = Field::new(1, 8, SR);
    pub const SR_DNAK: Field = Field::new(1, 9, SR);
    pub const SR_ARBLST: Field = Field::new(1, 10, SR);

    pub const IER: Register = Register::new(8, 0xFFFF_FFFF);
    pub const IDR: Register = Register::new(9, 0xFFFF_FFFF);
    pub const IMR: Register = Register::new(10, 0xFFFF_FFFF);
    pub const SCR: Register = Register::new(11, 0xFFFF_FFFF);

    pub const HW_TWIM0_BASE: usize = 0xFFFF_4400;
    pub const TWIM_NUMREGS: usize = 16;
}

/// Peripheral Event Controller.
pub mod pevc {
    use crate::{Field, Register};

    // The channel registers come in pairs at even/odd offsets; the odd
    // bank-1 half only exists on parts with more than 32 channels, and
    // this part has 19.
    pub const CHSR0: Register = Register::new(0, 0xFFFF_FFFF);
    pub const CHER0: Register = Register::new(2, 0xFFFF_FFFF);
    pub const CHDR0: Register = Register::new(4, 0xFFFF_FFFF);
    pub const SEV0: Register = Register::new(6, 0xFFFF_FFFF);
    pub const BUSY0: Register = Register::new(8, 0xFFFF_FFFF);

    pub const TRIER0: Register = Register::new(10, 0xFFFF_FFFF);
    pub const TRIDR0: Register = Register::new(11, 0xFFFF_FFFF);
    pub const TRIMR0: Register = Register::new(12, 0xFFFF_FFFF);
    pub const TRSR0: Register = Register::new(13, 0xFFFF_FFFF);
    pub const TRSCR0: Register = Register::new(14, 0xFFFF_FFFF);

    pub const OVIER0: Register = Register::new(15, 0xFFFF_FFFF);
    pub const OVIDR0: Register = Register::new(16, 0xFFFF_FFFF);
    pub const OVIMR0: Register = Register::new(17, 0xFFFF_FFFF);
    pub const OVSR0: Register = Register::new(18, 0xFFFF_FFFF);
    pub const OVSCR0: Register = Register::new(19, 0xFFFF_FFFF);

    pub const IGFDR: Register = Register::new(20, 0xF);
    pub const IGFDR_IGFDR: Field = Field::new(4, 0, IGFDR);

    pub const CHMX_BASE: usize = 64; // 0x100 bytes in
    pub const fn chmx(ch: usize) -> Register { Register::new(CHMX_BASE + ch, 0x0000_013F) }
    pub const CHMX0: Register = chmx(0);
    pub const CHMX0_EVMX: Field = Field::new(6, 0, CHMX0);
    pub const CHMX0_SMX: Field = Field::new(1, 8, CHMX0);

    pub const EVS_BASE: usize = 128; // 0x200 bytes in
    pub const fn evs(gen: usize) -> Register { Register::new(EVS_BASE + gen, 0x8003_000F) }
    pub const EVS0: Register = evs(0);
    pub const EVS0_IGF: Field = Field::new(4, 0, EVS0);
    pub const EVS0_EVF: Field = Field::new(1, 16, EVS0);
    pub const EVS0_EVR: Field = Field::new(1, 17, EVS0);
    pub const EVS0_EN: Field = Field::new(1, 31, EVS0);

    pub const CHANNELS: usize = 19;
    pub const GENERATORS: usize = 31;

    pub const HW_PEVC_BASE: usize = 0xFFFF_5800;
    pub const PEVC_NUMREGS: usize = 192;
}

/// Asynchronous Timer: battery-backed counter/calendar.
pub mod ast {
    use crate::{Field, Register};

    pub const CR: Register = Register::new(0, 0x001F_0307);
    pub const CR_EN: Field = Field::new(1, 0, CR);
    pub const CR_PCLR: Field = Field::new(1, 1, CR);
    pub const CR_CAL: Field = Field::new(1, 2, CR);
    pub const CR_CA0: Field = Field::new(1, 8, CR);
    pub const CR_CA1: Field = Field::new(1, 9, CR);
    pub const CR_PSEL: Field = Field::new(5, 16, CR);

    pub const CV: Register = Register::new(1, 0xFFFF_FFFF);

    pub const SR: Register = Register::new(2, 0x3303_0301);
    pub const SR_OVF: Field = Field::new(1, 0, SR);
    pub const SR_ALARM0: Field = Field::new(1, 8, SR);
    pub const SR_ALARM1: Field = Field::new(1, 9, SR);
    pub const SR_PER0: Field = Field::new(1, 16, SR);
    pub const SR_PER1: Field = Field::new(1, 17, SR);
    pub const SR_BUSY: Field = Field::new(1, 24, SR);
    pub const SR_READY: Field = Field::new(1, 25, SR);
    pub const SR_CLKBUSY: Field = Field::new(1, 28, SR);
    pub const SR_CLKRDY: Field = Field::new(1, 29, SR);

    pub const SCR: Register = Register::new(3, 0x0303_0301);
    pub const IER: Register = Register::new(4, 0x0303_0301);
    pub const IDR: Register = Register::new(5, 0x0303_0301);
    pub const IMR: Register = Register::new(6, 0x0303_0301);
    pub const WER: Register = Register::new(7, 0x0003_0301);

    pub const AR0: Register = Register::new(8, 0xFFFF_FFFF);
    pub const AR1: Register = Register::new(9, 0xFFFF_FFFF);

    pub const PIR0: Register = Register::new(10, 0x1F);
    pub const PIR0_INSEL: Field = Field::new(5, 0, PIR0);
    pub const PIR1: Register = Register::new(11, 0x1F);

    pub const CLOCK: Register = Register::new(12, 0x0000_0701);
    pub const CLOCK_CEN: Field = Field::new(1, 0, CLOCK);
    pub const CLOCK_CSSEL: Field = Field::new(3, 8, CLOCK);

    pub const DTR: Register = Register::new(13, 0x001F_FF01);
    pub const DTR_ADD: Field = Field::new(1, 0, DTR);
    pub const DTR_VALUE: Field = Field::new(8, 8, DTR);
    pub const DTR_EXP: Field = Field::new(5, 16, DTR);

    pub const CALV: Register = Register::new(15, 0xFFFF_FFFF);
    pub const CALV_SEC: Field = Field::new(6, 0, CALV);
    pub const CALV_MIN: Field = Field::new(6, 6, CALV);
    pub const CALV_HOUR: Field = Field::new(5, 12, CALV);
    pub const CALV_DAY: Field = Field::new(5, 17, CALV);
    pub const CALV_MONTH: Field = Field::new(4, 22, CALV);
    pub const CALV_YEAR: Field = Field::new(6, 26, CALV);

    pub const HW_AST_BASE: usize = 0xFFFF_1C00;
    pub const AST_NUMREGS: usize = 16;
}

/// Logical interrupt lines, one flat space for the dispatcher.
pub mod irq {
    pub const AST_ALARM: usize = 1;
    pub const AST_PER: usize = 2;
    pub const AST_OVF: usize = 3;
    pub const EIC_1: usize = 4; // EIC lines occupy 4..=12
    pub const GPIO_0: usize = 16; // one line per port, 16..=17
    pub const USART0: usize = 20;
    pub const USART1: usize = 21;
    pub const USART2: usize = 22;
    pub const SPI: usize = 24;
    pub const TWIM0: usize = 25;
    pub const TC_CH0: usize = 28; // TC channels occupy 28..=30
    pub const PWM: usize = 32;
    pub const PEVC_TR: usize = 33;
    pub const PEVC_OV: usize = 34;

    pub const LINES: usize = 64;
}
