//! SAM4L register maps: power manager, GPIO, TRNG, frequency meter.

/// Power Manager.
pub mod pm {
    use crate::{Field, Register};

    pub const MCCTRL: Register = Register::new(0, 0x7);
    pub const MCCTRL_MCSEL: Field = Field::new(3, 0, MCCTRL);

    pub const CPUSEL: Register = Register::new(1, 0x87);
    pub const CPUSEL_CPUSEL: Field = Field::new(3, 0, CPUSEL);
    pub const CPUSEL_CPUDIV: Field = Field::new(1, 7, CPUSEL);

    pub const CPUMASK: Register = Register::new(8, 0xFFFF_FFFF);
    pub const HSBMASK: Register = Register::new(9, 0xFFFF_FFFF);
    pub const PBAMASK: Register = Register::new(10, 0xFFFF_FFFF);
    pub const PBBMASK: Register = Register::new(11, 0xFFFF_FFFF);
    pub const PBCMASK: Register = Register::new(12, 0xFFFF_FFFF);
    pub const PBDMASK: Register = Register::new(13, 0xFFFF_FFFF);

    pub const UNLOCK: Register = Register::new(22, 0xFF00_03FF);
    pub const UNLOCK_ADDR: Field = Field::new(10, 0, UNLOCK);
    pub const UNLOCK_KEY: Field = Field::new(8, 24, UNLOCK);
    pub const UNLOCK_KEY_VALUE: usize = 0xAA;

    pub const HW_PM_BASE: usize = 0x400E_0000;
    pub const PM_NUMREGS: usize = 32;

    // mask register bit positions used by the drivers
    pub const PBA_TRNG_BIT: u32 = 10;
    pub const PBA_FREQM_BIT: u32 = 11;
    pub const PBC_GPIO_BIT: u32 = 3;
}

/// GPIO, sibling of the UC3 controller with set/clear/toggle triples.
pub mod gpio {
    use crate::Register;

    pub const GPER: Register = Register::new(0, 0xFFFF_FFFF);
    pub const GPERS: Register = Register::new(1, 0xFFFF_FFFF);
    pub const GPERC: Register = Register::new(2, 0xFFFF_FFFF);
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

    pub const HW_GPIO_BASE: usize = 0x400E_1000;
    pub const GPIO_PORT_STRIDE: usize = 0x200;
    pub const GPIO_PORT_NUMREGS: usize = 128;
    pub const GPIO_PORTS: usize = 3;

    pub const fn port_base(port: usize) -> usize { HW_GPIO_BASE + port * GPIO_PORT_STRIDE }
}

/// True random number generator.
pub mod trng {
    use crate::{Field, Register};

    pub const CR: Register = Register::new(0, 0xFFFF_FF01);
    pub const CR_ENABLE: Field = Field::new(1, 0, CR);
    pub const CR_KEY: Field = Field::new(24, 8, CR);
    /// ASCII "RNG", required in CR_KEY for enable/disable to take.
    pub const CR_KEY_VALUE: usize = 0x524E47;

    pub const IER: Register = Register::new(4, 0x1);
    pub const IDR: Register = Register::new(5, 0x1);
    pub const IMR: Register = Register::new(6, 0x1);

    pub const ISR: Register = Register::new(7, 0x1);
    pub const ISR_DATRDY: Field = Field::new(1, 0, ISR);

    pub const ODATA: Register = Register::new(20, 0xFFFF_FFFF);

    pub const HW_TRNG_BASE: usize = 0x4006_8000;
    pub const TRNG_NUMREGS: usize = 21;
    pub const TRNG_IRQ: usize = 1;
}

/// Frequency meter.
pub mod freqm {
    use crate::{Field, Register};

    pub const CTRL: Register = Register::new(0, 0x1);
    pub const CTRL_START: Field = Field::new(1, 0, CTRL);

    pub const MODE: Register = Register::new(1, 0x80FF_1FBF);
    pub const MODE_REFSEL: Field = Field::new(2, 0, MODE);
    pub const MODE_REFCEN: Field = Field::new(1, 7, MODE);
    pub const MODE_CLKSEL: Field = Field::new(5, 8, MODE);
    pub const MODE_DURATION: Field = Field::new(8, 16, MODE);

    pub const STATUS: Register = Register::new(2, 0x3);
    pub const STATUS_BUSY: Field = Field::new(1, 0, STATUS);
    pub const STATUS_RCLKBUSY: Field = Field::new(1, 1, STATUS);

    pub const VALUE: Register = Register::new(3, 0x00FF_FFFF);

    pub const HW_FREQM_BASE: usize = 0x400E_0C00;
    pub const FREQM_NUMREGS: usize = 8;
}
