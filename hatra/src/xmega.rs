//! XMEGA register maps.
//!
//! The XMEGA I/O space is byte-wide; offsets here are byte offsets from
//! the block base and accessors use `CSR<u8>`. Multi-byte values (RTC32
//! counter, TC period) are split across consecutive byte registers,
//! low byte first.

/// CPU block, modeled only for the configuration change protection port.
pub mod cpu {
    use crate::Register;

    /// Writing a signature here opens a four-cycle window for protected I/O.
    pub const CCP: Register = Register::new(4, 0xFF);

    pub const CCP_SPM: usize = 0x9D;
    pub const CCP_IOREG: usize = 0xD8;

    pub const HW_CPU_BASE: usize = 0x0030;
    pub const CPU_NUMREGS: usize = 16;
}

/// System clock selection and prescalers.
pub mod clk {
    use crate::{Field, Register};

    pub const CTRL: Register = Register::new(0, 0x07);
    pub const CTRL_SCLKSEL: Field = Field::new(3, 0, CTRL);

    pub const PSCTRL: Register = Register::new(1, 0x7F);
    pub const PSCTRL_PSBCDIV: Field = Field::new(2, 0, PSCTRL);
    pub const PSCTRL_PSADIV: Field = Field::new(5, 2, PSCTRL);

    pub const LOCK: Register = Register::new(4, 0x01);
    pub const LOCK_LOCK: Field = Field::new(1, 0, LOCK);

    pub const RTCCTRL: Register = Register::new(5, 0x0F);
    pub const RTCCTRL_RTCEN: Field = Field::new(1, 0, RTCCTRL);
    pub const RTCCTRL_RTCSRC: Field = Field::new(3, 1, RTCCTRL);

    pub const HW_CLK_BASE: usize = 0x0040;
    pub const CLK_NUMREGS: usize = 8;
}

/// Sleep controller.
pub mod sleep {
    use crate::{Field, Register};

    pub const CTRL: Register = Register::new(0, 0x0F);
    pub const CTRL_SEN: Field = Field::new(1, 0, CTRL);
    pub const CTRL_SMODE: Field = Field::new(3, 1, CTRL);

    pub const HW_SLEEP_BASE: usize = 0x0048;
    pub const SLEEP_NUMREGS: usize = 1;
}

/// Oscillator control.
pub mod osc {
    use crate::{Field, Register};

    pub const CTRL: Register = Register::new(0, 0x1F);
    pub const CTRL_RC2MEN: Field = Field::new(1, 0, CTRL);
    pub const CTRL_RC32MEN: Field = Field::new(1, 1, CTRL);
    pub const CTRL_RC32KEN: Field = Field::new(1, 2, CTRL);
    pub const CTRL_XOSCEN: Field = Field::new(1, 3, CTRL);
    pub const CTRL_PLLEN: Field = Field::new(1, 4, CTRL);

    pub const STATUS: Register = Register::new(1, 0x1F);
    pub const STATUS_RC2MRDY: Field = Field::new(1, 0, STATUS);
    pub const STATUS_RC32MRDY: Field = Field::new(1, 1, STATUS);
    pub const STATUS_RC32KRDY: Field = Field::new(1, 2, STATUS);
    pub const STATUS_XOSCRDY: Field = Field::new(1, 3, STATUS);
    pub const STATUS_PLLRDY: Field = Field::new(1, 4, STATUS);

    pub const XOSCCTRL: Register = Register::new(2, 0xEF);
    pub const XOSCCTRL_XOSCSEL: Field = Field::new(4, 0, XOSCCTRL);
    pub const XOSCCTRL_X32KLPM: Field = Field::new(1, 5, XOSCCTRL);
    pub const XOSCCTRL_FRQRANGE: Field = Field::new(2, 6, XOSCCTRL);

    pub const HW_OSC_BASE: usize = 0x0050;
    pub const OSC_NUMREGS: usize = 7;
}

/// Power reduction: gates the peripheral clocks per port.
pub mod pr {
    use crate::{Field, Register};

    pub const PRGEN: Register = Register::new(0, 0x5F);
    pub const PRGEN_DMA: Field = Field::new(1, 0, PRGEN);
    pub const PRGEN_EVSYS: Field = Field::new(1, 1, PRGEN);
    pub const PRGEN_RTC: Field = Field::new(1, 2, PRGEN);
    pub const PRGEN_EBI: Field = Field::new(1, 3, PRGEN);
    pub const PRGEN_AES: Field = Field::new(1, 4, PRGEN);

    pub const PRPA: Register = Register::new(1, 0x07);
    pub const PRPB: Register = Register::new(2, 0x07);
    pub const PRPC: Register = Register::new(3, 0x7F);
    pub const PRPD: Register = Register::new(4, 0x7F);
    pub const PRPE: Register = Register::new(5, 0x7F);
    pub const PRPF: Register = Register::new(6, 0x7F);

    // bit positions within PRGEN
    pub const PR_GEN_DMA: usize = 0;
    pub const PR_GEN_EVSYS: usize = 1;
    pub const PR_GEN_RTC: usize = 2;
    pub const PR_GEN_EBI: usize = 3;
    pub const PR_GEN_AES: usize = 4;
    pub const PR_GEN_XCL: usize = 6;

    // bit positions within the per-port registers
    pub const PR_AC: usize = 0;
    pub const PR_ADC: usize = 1;
    pub const PR_DAC: usize = 2;
    pub const PR_TC0: usize = 0;
    pub const PR_TC1: usize = 1;
    pub const PR_HIRES: usize = 2;
    pub const PR_SPI: usize = 3;
    pub const PR_USART0: usize = 4;
    pub const PR_USART1: usize = 5;
    pub const PR_TWI: usize = 6;

    pub const HW_PR_BASE: usize = 0x0070;
    pub const PR_NUMREGS: usize = 7;
}

/// Programmable multilevel interrupt controller.
pub mod pmic {
    use crate::{Field, Register};

    pub const STATUS: Register = Register::new(0, 0x8F);
    pub const STATUS_LOLVLEX: Field = Field::new(1, 0, STATUS);
    pub const STATUS_MEDLVLEX: Field = Field::new(1, 1, STATUS);
    pub const STATUS_HILVLEX: Field = Field::new(1, 2, STATUS);
    pub const STATUS_NMIEX: Field = Field::new(1, 7, STATUS);

    pub const INTPRI: Register = Register::new(1, 0xFF);

    pub const CTRL: Register = Register::new(2, 0xC7);
    pub const CTRL_LOLVLEN: Field = Field::new(1, 0, CTRL);
    pub const CTRL_MEDLVLEN: Field = Field::new(1, 1, CTRL);
    pub const CTRL_HILVLEN: Field = Field::new(1, 2, CTRL);
    pub const CTRL_IVSEL: Field = Field::new(1, 6, CTRL);
    pub const CTRL_RREN: Field = Field::new(1, 7, CTRL);

    pub const HW_PMIC_BASE: usize = 0x00A0;
    pub const PMIC_NUMREGS: usize = 3;
}

/// Battery backup system (hosts the RTC32 domain).
pub mod vbat {
    use crate::{Field, Register};

    pub const CTRL: Register = Register::new(0, 0x77);
    pub const CTRL_ACCEN: Field = Field::new(1, 0, CTRL);
    pub const CTRL_RESET: Field = Field::new(1, 1, CTRL);
    pub const CTRL_XOSCFDEN: Field = Field::new(1, 2, CTRL);
    pub const CTRL_XOSCEN: Field = Field::new(1, 4, CTRL);
    pub const CTRL_XOSCSEL: Field = Field::new(1, 5, CTRL);
    pub const CTRL_HIGHESR: Field = Field::new(1, 6, CTRL);

    pub const STATUS: Register = Register::new(1, 0x9F);
    pub const STATUS_PORF: Field = Field::new(1, 0, STATUS);
    pub const STATUS_BBPORF: Field = Field::new(1, 1, STATUS);
    pub const STATUS_BBBORF: Field = Field::new(1, 2, STATUS);
    pub const STATUS_XOSCFAIL: Field = Field::new(1, 3, STATUS);
    pub const STATUS_XOSCRDY: Field = Field::new(1, 4, STATUS);
    pub const STATUS_BBPWR: Field = Field::new(1, 7, STATUS);

    pub const HW_VBAT_BASE: usize = 0x00F0;
    pub const VBAT_NUMREGS: usize = 2;
}

/// AES-128 crypto module.
pub mod aes {
    use crate::{Field, Register};

    pub const CTRL: Register = Register::new(0, 0xF4);
    pub const CTRL_XOR: Field = Field::new(1, 2, CTRL);
    pub const CTRL_DECRYPT: Field = Field::new(1, 4, CTRL);
    pub const CTRL_RESET: Field = Field::new(1, 5, CTRL);
    pub const CTRL_AUTO: Field = Field::new(1, 6, CTRL);
    pub const CTRL_START: Field = Field::new(1, 7, CTRL);

    pub const STATUS: Register = Register::new(1, 0x81);
    pub const STATUS_SRIF: Field = Field::new(1, 0, STATUS);
    pub const STATUS_ERROR: Field = Field::new(1, 7, STATUS);

    /// Byte window over the 16-byte state; 16 sequential accesses.
    pub const STATE: Register = Register::new(2, 0xFF);
    /// Byte window over the 16-byte key; 16 sequential accesses.
    pub const KEY: Register = Register::new(3, 0xFF);

    pub const INTCTRL: Register = Register::new(4, 0x03);
    pub const INTCTRL_INTLVL: Field = Field::new(2, 0, INTCTRL);

    pub const BLOCK_LEN: usize = 16;

    pub const HW_AES_BASE: usize = 0x00C0;
    pub const AES_NUMREGS: usize = 5;
}

/// Event system routing network.
pub mod evsys {
    use crate::Register;

    pub const fn chmux(ch: usize) -> Register { Register::new(ch, 0xFF) }
    pub const fn chctrl(ch: usize) -> Register { Register::new(8 + ch, 0xFF) }

    pub const STROBE: Register = Register::new(16, 0xFF);
    pub const DATA: Register = Register::new(17, 0xFF);

    pub const CHANNELS: usize = 8;

    pub const HW_EVSYS_BASE: usize = 0x0180;
    pub const EVSYS_NUMREGS: usize = 18;
}

/// ADC, one instance with channel 0 modeled.
pub mod adc {
    use crate::{Field, Register};

    pub const CTRLA: Register = Register::new(0, 0x07);
    pub const CTRLA_ENABLE: Field = Field::new(1, 0, CTRLA);
    pub const CTRLA_FLUSH: Field = Field::new(1, 1, CTRLA);
    pub const CTRLA_CH0START: Field = Field::new(1, 2, CTRLA);

    pub const CTRLB: Register = Register::new(1, 0x9E);
    pub const CTRLB_RESOLUTION: Field = Field::new(2, 1, CTRLB);
    pub const CTRLB_FREERUN: Field = Field::new(1, 3, CTRLB);
    pub const CTRLB_CONMODE: Field = Field::new(1, 4, CTRLB);
    pub const CTRLB_IMPMODE: Field = Field::new(1, 7, CTRLB);

    pub const REFCTRL: Register = Register::new(2, 0x73);
    pub const REFCTRL_TEMPREF: Field = Field::new(1, 0, REFCTRL);
    pub const REFCTRL_BANDGAP: Field = Field::new(1, 1, REFCTRL);
    pub const REFCTRL_REFSEL: Field = Field::new(3, 4, REFCTRL);

    pub const EVCTRL: Register = Register::new(3, 0xFF);

    pub const PRESCALER: Register = Register::new(4, 0x07);
    pub const PRESCALER_PRESCALER: Field = Field::new(3, 0, PRESCALER);

    pub const INTFLAGS: Register = Register::new(6, 0x0F);
    pub const INTFLAGS_CH0IF: Field = Field::new(1, 0, INTFLAGS);

    pub const CH0_CTRL: Register = Register::new(0x20, 0x9F);
    pub const CH0_CTRL_INPUTMODE: Field = Field::new(2, 0, CH0_CTRL);
    pub const CH0_CTRL_GAIN: Field = Field::new(3, 2, CH0_CTRL);
    pub const CH0_CTRL_START: Field = Field::new(1, 7, CH0_CTRL);

    pub const CH0_MUXCTRL: Register = Register::new(0x21, 0x7F);
    pub const CH0_MUXCTRL_MUXNEG: Field = Field::new(3, 0, CH0_MUXCTRL);
    pub const CH0_MUXCTRL_MUXPOS: Field = Field::new(4, 3, CH0_MUXCTRL);

    pub const CH0_INTCTRL: Register = Register::new(0x22, 0x0F);
    pub const CH0_INTCTRL_INTLVL: Field = Field::new(2, 0, CH0_INTCTRL);
    pub const CH0_INTCTRL_INTMODE: Field = Field::new(2, 2, CH0_INTCTRL);

    pub const CH0_INTFLAGS: Register = Register::new(0x23, 0x01);
    pub const CH0_INTFLAGS_IF: Field = Field::new(1, 0, CH0_INTFLAGS);

    pub const CH0_RESL: Register = Register::new(0x24, 0xFF);
    pub const CH0_RESH: Register = Register::new(0x25, 0xFF);

    pub const HW_ADCA_BASE: usize = 0x0200;
    pub const ADC_NUMREGS: usize = 0x30;
}

/// 32-bit battery-backed real-time counter.
pub mod rtc32 {
    use crate::{Field, Register};

    pub const CTRL: Register = Register::new(0, 0x01);
    pub const CTRL_ENABLE: Field = Field::new(1, 0, CTRL);

    pub const SYNCCTRL: Register = Register::new(1, 0x11);
    pub const SYNCCTRL_SYNCBUSY: Field = Field::new(1, 0, SYNCCTRL);
    pub const SYNCCTRL_SYNCCNT: Field = Field::new(1, 4, SYNCCTRL);

    pub const INTCTRL: Register = Register::new(2, 0x0F);
    pub const INTCTRL_OVFINTLVL: Field = Field::new(2, 2, INTCTRL);
    pub const INTCTRL_COMPINTLVL: Field = Field::new(2, 0, INTCTRL);

    pub const INTFLAGS: Register = Register::new(3, 0x03);
    pub const INTFLAGS_OVFIF: Field = Field::new(1, 0, INTFLAGS);
    pub const INTFLAGS_COMPIF: Field = Field::new(1, 1, INTFLAGS);

    // 32-bit values as four byte registers, low byte first
    pub const CNT0: Register = Register::new(4, 0xFF);
    pub const PER0: Register = Register::new(8, 0xFF);
    pub const COMP0: Register = Register::new(12, 0xFF);

    pub const HW_RTC32_BASE: usize = 0x0420;
    pub const RTC32_NUMREGS: usize = 16;
}

/// External bus interface with four chip selects.
pub mod ebi {
    use crate::{Field, Register};

    pub const CTRL: Register = Register::new(0, 0xFF);
    pub const CTRL_IFMODE: Field = Field::new(2, 0, CTRL);
    pub const CTRL_SRMODE: Field = Field::new(2, 2, CTRL);
    pub const CTRL_LPCMODE: Field = Field::new(2, 4, CTRL);
    pub const CTRL_SDDATAW: Field = Field::new(2, 6, CTRL);

    pub const SDRAMCTRLA: Register = Register::new(1, 0x0F);
    pub const SDRAMCTRLA_SDCOL: Field = Field::new(2, 0, SDRAMCTRLA);
    pub const SDRAMCTRLA_SDROW: Field = Field::new(1, 2, SDRAMCTRLA);
    pub const SDRAMCTRLA_SDCAS: Field = Field::new(1, 3, SDRAMCTRLA);

    pub const REFRESHL: Register = Register::new(4, 0xFF);
    pub const REFRESHH: Register = Register::new(5, 0x03);
    pub const INITDLYL: Register = Register::new(6, 0xFF);
    pub const INITDLYH: Register = Register::new(7, 0x3F);

    pub const SDRAMCTRLB: Register = Register::new(8, 0xFF);
    pub const SDRAMCTRLB_MRDLY: Field = Field::new(2, 6, SDRAMCTRLB);
    pub const SDRAMCTRLB_ROWCYCDLY: Field = Field::new(3, 3, SDRAMCTRLB);
    pub const SDRAMCTRLB_RPDLY: Field = Field::new(3, 0, SDRAMCTRLB);

    pub const SDRAMCTRLC: Register = Register::new(9, 0xFF);
    pub const SDRAMCTRLC_WRDLY: Field = Field::new(2, 6, SDRAMCTRLC);
    pub const SDRAMCTRLC_ESRDLY: Field = Field::new(3, 3, SDRAMCTRLC);
    pub const SDRAMCTRLC_ROWCOLDLY: Field = Field::new(3, 0, SDRAMCTRLC);

    pub const CS_BASE: usize = 0x10;
    pub const CS_STRIDE: usize = 4;
    pub const CS_COUNT: usize = 4;

    pub const fn cs_ctrla(cs: usize) -> Register {
        Register::new(CS_BASE + cs * CS_STRIDE, 0x7F)
    }
    pub const fn cs_ctrlb(cs: usize) -> Register {
        Register::new(CS_BASE + cs * CS_STRIDE + 1, 0xFF)
    }
    pub const fn cs_baseaddrl(cs: usize) -> Register {
        Register::new(CS_BASE + cs * CS_STRIDE + 2, 0xF0)
    }
    pub const fn cs_baseaddrh(cs: usize) -> Register {
        Register::new(CS_BASE + cs * CS_STRIDE + 3, 0xFF)
    }

    pub const CS0_CTRLA: Register = cs_ctrla(0);
    pub const CS0_CTRLA_MODE: Field = Field::new(2, 0, CS0_CTRLA);
    pub const CS0_CTRLA_ASPACE: Field = Field::new(5, 2, CS0_CTRLA);
    pub const CS0_CTRLB: Register = cs_ctrlb(0);
    pub const CS0_CTRLB_SRWS: Field = Field::new(3, 0, CS0_CTRLB);
    pub const CS0_CTRLB_SDINITDONE: Field = Field::new(1, 7, CS0_CTRLB);
    pub const CS0_CTRLB_SDSREN: Field = Field::new(1, 2, CS0_CTRLB);
    pub const CS0_CTRLB_SDMODE: Field = Field::new(2, 0, CS0_CTRLB);

    pub const HW_EBI_BASE: usize = 0x0440;
    pub const EBI_NUMREGS: usize = 0x20;
}

/// XMEGA custom logic: two LUTs plus a split timer.
pub mod xcl {
    use crate::{Field, Register};

    pub const CTRLA: Register = Register::new(0, 0xFF);
    pub const CTRLA_LUTCONF: Field = Field::new(3, 0, CTRLA);
    pub const CTRLA_PORTSEL: Field = Field::new(2, 4, CTRLA);
    pub const CTRLA_LUT0OUTEN: Field = Field::new(2, 6, CTRLA);

    pub const CTRLB: Register = Register::new(1, 0xFF);
    pub const CTRLB_IN0SEL: Field = Field::new(2, 0, CTRLB);
    pub const CTRLB_IN1SEL: Field = Field::new(2, 2, CTRLB);
    pub const CTRLB_IN2SEL: Field = Field::new(2, 4, CTRLB);
    pub const CTRLB_IN3SEL: Field = Field::new(2, 6, CTRLB);

    pub const CTRLC: Register = Register::new(2, 0xFF);
    pub const CTRLC_DLYSEL: Field = Field::new(2, 0, CTRLC);
    pub const CTRLC_DLY0CONF: Field = Field::new(2, 2, CTRLC);
    pub const CTRLC_DLY1CONF: Field = Field::new(2, 4, CTRLC);

    pub const CTRLD: Register = Register::new(3, 0xFF);
    pub const CTRLD_TRUTH0: Field = Field::new(4, 0, CTRLD);
    pub const CTRLD_TRUTH1: Field = Field::new(4, 4, CTRLD);

    pub const CTRLE: Register = Register::new(4, 0xFF);
    pub const CTRLE_CLKSEL: Field = Field::new(4, 0, CTRLE);
    pub const CTRLE_TCSEL: Field = Field::new(3, 4, CTRLE);
    pub const CTRLE_CMDSEL: Field = Field::new(1, 7, CTRLE);

    pub const CTRLF: Register = Register::new(5, 0xFF);
    pub const CTRLF_MODE: Field = Field::new(2, 0, CTRLF);
    pub const CTRLF_CCEN0: Field = Field::new(1, 2, CTRLF);
    pub const CTRLF_CCEN1: Field = Field::new(1, 3, CTRLF);
    pub const CTRLF_CMP0: Field = Field::new(1, 4, CTRLF);
    pub const CTRLF_CMP1: Field = Field::new(1, 5, CTRLF);
    pub const CTRLF_CMDEN: Field = Field::new(2, 6, CTRLF);

    pub const CTRLG: Register = Register::new(6, 0xFF);
    pub const CTRLG_EVACTEN: Field = Field::new(1, 6, CTRLG);
    pub const CTRLG_EVACT0: Field = Field::new(2, 1, CTRLG);
    pub const CTRLG_EVACT1: Field = Field::new(2, 3, CTRLG);
    pub const CTRLG_EVSRC: Field = Field::new(1, 0, CTRLG);

    pub const INTCTRL: Register = Register::new(7, 0xFF);
    pub const INTCTRL_UNF0INTLVL: Field = Field::new(2, 0, INTCTRL);
    pub const INTCTRL_UNF1INTLVL: Field = Field::new(2, 2, INTCTRL);
    pub const INTCTRL_CC0INTLVL: Field = Field::new(2, 4, INTCTRL);
    pub const INTCTRL_CC1INTLVL: Field = Field::new(2, 6, INTCTRL);

    pub const INTFLAGS: Register = Register::new(8, 0x33);
    pub const INTFLAGS_UNF0IF: Field = Field::new(1, 0, INTFLAGS);
    pub const INTFLAGS_UNF1IF: Field = Field::new(1, 1, INTFLAGS);
    pub const INTFLAGS_CC0IF: Field = Field::new(1, 4, INTFLAGS);
    pub const INTFLAGS_CC1IF: Field = Field::new(1, 5, INTFLAGS);

    pub const PLC: Register = Register::new(9, 0xFF);
    pub const CNTL0: Register = Register::new(10, 0xFF);
    pub const CNTL1: Register = Register::new(11, 0xFF);
    pub const CMPL0: Register = Register::new(12, 0xFF);
    pub const CMPL1: Register = Register::new(13, 0xFF);
    pub const PERCAPTL0: Register = Register::new(14, 0xFF);
    pub const PERCAPTL1: Register = Register::new(15, 0xFF);

    pub const HW_XCL_BASE: usize = 0x0460;
    pub const XCL_NUMREGS: usize = 16;
}

/// Port (one per letter, stride 0x20).
pub mod port {
    use crate::{Field, Register};

    pub const DIR: Register = Register::new(0, 0xFF);
    pub const DIRSET: Register = Register::new(1, 0xFF);
    pub const DIRCLR: Register = Register::new(2, 0xFF);
    pub const DIRTGL: Register = Register::new(3, 0xFF);
    pub const OUT: Register = Register::new(4, 0xFF);
    pub const OUTSET: Register = Register::new(5, 0xFF);
    pub const OUTCLR: Register = Register::new(6, 0xFF);
    pub const OUTTGL: Register = Register::new(7, 0xFF);
    pub const IN: Register = Register::new(8, 0xFF);

    pub const INTCTRL: Register = Register::new(9, 0x0F);
    pub const INTCTRL_INT0LVL: Field = Field::new(2, 0, INTCTRL);
    pub const INTCTRL_INT1LVL: Field = Field::new(2, 2, INTCTRL);

    pub const INT0MASK: Register = Register::new(10, 0xFF);
    pub const INT1MASK: Register = Register::new(11, 0xFF);

    pub const INTFLAGS: Register = Register::new(12, 0x03);
    pub const INTFLAGS_INT0IF: Field = Field::new(1, 0, INTFLAGS);
    pub const INTFLAGS_INT1IF: Field = Field::new(1, 1, INTFLAGS);

    pub const fn pinctrl(pin: usize) -> Register { Register::new(0x10 + pin, 0xFF) }
    pub const PIN0CTRL: Register = pinctrl(0);
    pub const PIN0CTRL_ISC: Field = Field::new(3, 0, PIN0CTRL);
    pub const PIN0CTRL_OPC: Field = Field::new(3, 3, PIN0CTRL);
    pub const PIN0CTRL_INVEN: Field = Field::new(1, 6, PIN0CTRL);

    pub const PORT_STRIDE: usize = 0x20;
    pub const PORT_NUMREGS: usize = 0x18;

    pub const HW_PORTA_BASE: usize = 0x0600;
    pub const HW_PORTC_BASE: usize = 0x0640;
    pub const HW_PORTD_BASE: usize = 0x0660;
    pub const HW_PORTR_BASE: usize = 0x07E0;

    pub const fn base(index: usize) -> usize { HW_PORTA_BASE + index * PORT_STRIDE }
}

/// 16-bit timer/counter 0 (type 0, four compare channels).
pub mod tc0 {
    use crate::{Field, Register};

    pub const CTRLA: Register = Register::new(0, 0x0F);
    pub const CTRLA_CLKSEL: Field = Field::new(4, 0, CTRLA);

    pub const CTRLB: Register = Register::new(1, 0xF7);
    pub const CTRLB_WGMODE: Field = Field::new(3, 0, CTRLB);
    pub const CTRLB_CCAEN: Field = Field::new(1, 4, CTRLB);
    pub const CTRLB_CCBEN: Field = Field::new(1, 5, CTRLB);
    pub const CTRLB_CCCEN: Field = Field::new(1, 6, CTRLB);
    pub const CTRLB_CCDEN: Field = Field::new(1, 7, CTRLB);

    pub const CTRLC: Register = Register::new(2, 0x0F);

    pub const CTRLD: Register = Register::new(3, 0xFF);
    pub const CTRLD_EVSEL: Field = Field::new(4, 0, CTRLD);
    pub const CTRLD_EVDLY: Field = Field::new(1, 4, CTRLD);
    pub const CTRLD_EVACT: Field = Field::new(3, 5, CTRLD);

    pub const CTRLE: Register = Register::new(4, 0x03);
    pub const CTRLE_BYTEM: Field = Field::new(2, 0, CTRLE);

    pub const INTCTRLA: Register = Register::new(6, 0x0F);
    pub const INTCTRLA_OVFINTLVL: Field = Field::new(2, 0, INTCTRLA);
    pub const INTCTRLA_ERRINTLVL: Field = Field::new(2, 2, INTCTRLA);

    pub const INTCTRLB: Register = Register::new(7, 0xFF);
    pub const INTCTRLB_CCAINTLVL: Field = Field::new(2, 0, INTCTRLB);
    pub const INTCTRLB_CCBINTLVL: Field = Field::new(2, 2, INTCTRLB);
    pub const INTCTRLB_CCCINTLVL: Field = Field::new(2, 4, INTCTRLB);
    pub const INTCTRLB_CCDINTLVL: Field = Field::new(2, 6, INTCTRLB);

    pub const CTRLFCLR: Register = Register::new(8, 0x0F);
    pub const CTRLFSET: Register = Register::new(9, 0x0F);
    pub const CTRLFSET_CMD: Field = Field::new(2, 2, CTRLFSET);
    pub const CTRLFSET_LUPD: Field = Field::new(1, 1, CTRLFSET);
    pub const CTRLFSET_DIR: Field = Field::new(1, 0, CTRLFSET);

    pub const INTFLAGS: Register = Register::new(12, 0xF3);
    pub const INTFLAGS_OVFIF: Field = Field::new(1, 0, INTFLAGS);
    pub const INTFLAGS_ERRIF: Field = Field::new(1, 1, INTFLAGS);
    pub const INTFLAGS_CCAIF: Field = Field::new(1, 4, INTFLAGS);
    pub const INTFLAGS_CCBIF: Field = Field::new(1, 5, INTFLAGS);
    pub const INTFLAGS_CCCIF: Field = Field::new(1, 6, INTFLAGS);
    pub const INTFLAGS_CCDIF: Field = Field::new(1, 7, INTFLAGS);

    pub const CNTL: Register = Register::new(0x20, 0xFF);
    pub const CNTH: Register = Register::new(0x21, 0xFF);
    pub const PERL: Register = Register::new(0x26, 0xFF);
    pub const PERH: Register = Register::new(0x27, 0xFF);
    pub const CCAL: Register = Register::new(0x28, 0xFF);
    pub const CCAH: Register = Register::new(0x29, 0xFF);
    pub const CCBL: Register = Register::new(0x2A, 0xFF);
    pub const CCBH: Register = Register::new(0x2B, 0xFF);
    pub const CCCL: Register = Register::new(0x2C, 0xFF);
    pub const CCCH: Register = Register::new(0x2D, 0xFF);
    pub const CCDL: Register = Register::new(0x2E, 0xFF);
    pub const CCDH: Register = Register::new(0x2F, 0xFF);

    pub const HW_TCC0_BASE: usize = 0x0800;
    pub const HW_TCD0_BASE: usize = 0x0900;
    pub const TC0_NUMREGS: usize = 0x30;
}

/// USART (USARTC0 instance by default).
pub mod usart {
    use crate::{Field, Register};

    pub const DATA: Register = Register::new(0, 0xFF);

    pub const STATUS: Register = Register::new(1, 0xFD);
    pub const STATUS_RXB8: Field = Field::new(1, 0, STATUS);
    pub const STATUS_PERR: Field = Field::new(1, 2, STATUS);
    pub const STATUS_BUFOVF: Field = Field::new(1, 3, STATUS);
    pub const STATUS_FERR: Field = Field::new(1, 4, STATUS);
    pub const STATUS_DREIF: Field = Field::new(1, 5, STATUS);
    pub const STATUS_TXCIF: Field = Field::new(1, 6, STATUS);
    pub const STATUS_RXCIF: Field = Field::new(1, 7, STATUS);

    pub const CTRLA: Register = Register::new(3, 0x3F);
    pub const CTRLA_DREINTLVL: Field = Field::new(2, 0, CTRLA);
    pub const CTRLA_TXCINTLVL: Field = Field::new(2, 2, CTRLA);
    pub const CTRLA_RXCINTLVL: Field = Field::new(2, 4, CTRLA);

    pub const CTRLB: Register = Register::new(4, 0x1F);
    pub const CTRLB_TXB8: Field = Field::new(1, 0, CTRLB);
    pub const CTRLB_MPCM: Field = Field::new(1, 1, CTRLB);
    pub const CTRLB_CLK2X: Field = Field::new(1, 2, CTRLB);
    pub const CTRLB_TXEN: Field = Field::new(1, 3, CTRLB);
    pub const CTRLB_RXEN: Field = Field::new(1, 4, CTRLB);

    pub const CTRLC: Register = Register::new(5, 0xFF);
    pub const CTRLC_CHSIZE: Field = Field::new(3, 0, CTRLC);
    pub const CTRLC_SBMODE: Field = Field::new(1, 3, CTRLC);
    pub const CTRLC_PMODE: Field = Field::new(2, 4, CTRLC);
    pub const CTRLC_CMODE: Field = Field::new(2, 6, CTRLC);

    pub const BAUDCTRLA: Register = Register::new(6, 0xFF);
    pub const BAUDCTRLA_BSEL: Field = Field::new(8, 0, BAUDCTRLA);

    pub const BAUDCTRLB: Register = Register::new(7, 0xFF);
    pub const BAUDCTRLB_BSEL: Field = Field::new(4, 0, BAUDCTRLB);
    pub const BAUDCTRLB_BSCALE: Field = Field::new(4, 4, BAUDCTRLB);

    pub const HW_USARTC0_BASE: usize = 0x08A0;
    pub const HW_USARTD0_BASE: usize = 0x09A0;
    pub const USART_NUMREGS: usize = 8;
}

/// Interrupt vector identifiers for the hosted dispatcher.
pub mod vector {
    pub const RTC32_COMP: usize = 1;
    pub const RTC32_OVF: usize = 2;
    pub const PORTA_INT0: usize = 4;
    pub const PORTC_INT0: usize = 5;
    pub const TCC0_OVF: usize = 8;
    pub const TCC0_ERR: usize = 9;
    pub const TCC0_CCA: usize = 10;
    pub const TCC0_CCB: usize = 11;
    pub const TCC0_CCC: usize = 12;
    pub const TCC0_CCD: usize = 13;
    pub const USARTC0_RXC: usize = 16;
    pub const USARTC0_DRE: usize = 17;
    pub const ADCA_CH0: usize = 20;
    pub const AES_READY: usize = 22;
    pub const XCL_UNF: usize = 24;
    pub const XCL_CC: usize = 25;

    pub const VECTORS: usize = 32;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_registers_fit_block() {
        assert!(tc0::CCDH.offset() < tc0::TC0_NUMREGS);
        assert!(xcl::PERCAPTL1.offset() < xcl::XCL_NUMREGS);
        assert!(adc::CH0_RESH.offset() < adc::ADC_NUMREGS);
        assert!(ebi::cs_baseaddrh(3).offset() < ebi::EBI_NUMREGS);
    }

    #[test]
    fn rtc32_value_registers_are_word_spaced() {
        assert_eq!(rtc32::PER0.offset() - rtc32::CNT0.offset(), 4);
        assert_eq!(rtc32::COMP0.offset() - rtc32::PER0.offset(), 4);
    }

    #[test]
    fn port_strides() {
        assert_eq!(port::base(0), port::HW_PORTA_BASE);
        assert_eq!(port::base(2), port::HW_PORTC_BASE);
        assert_eq!(port::pinctrl(7).offset(), 0x17);
    }
}
