//! XMEGA E5 Xplained kit: 32 MHz internal RC for the core, 32 kHz
//! crystal for the battery-backed RTC, console on USARTC0, one user
//! LED and one push button.

use hal_api::Status;

use crate::ioport::{self, IoPort, Pin, PinFlags};
use crate::pmic;
use crate::sysclk::{self, ClockSource, PrescalerA, PrescalerBc};
use crate::usart::{Usart, UsartOptions};

pub const TOSC_HZ: u32 = 32_768;
/// Clock tree after [`init_clocks`]: CPU and peripherals straight off
/// the 32 MHz RC, nothing divided.
pub const CPU_HZ: u32 = 32_000_000;
pub const PER_HZ: u32 = CPU_HZ;

/// (port, pin) pairs for the user I/O.
pub const LED0: (usize, usize) = (ioport::PORTD, 4);
pub const BUTTON0: (usize, usize) = (ioport::PORTD, 0);

pub const CONSOLE_USART: usize = 0;
pub const CONSOLE_BAUD: u32 = 57_600;
const CONSOLE_PORT: usize = ioport::PORTC;
// the usual PC2/PC3 pair of USARTC0
const CONSOLE_RXD: u8 = 1 << 2;
const CONSOLE_TXD: u8 = 1 << 3;

/// Internal 32 MHz RC up and selected, prescalers off.
///
/// The prescalers land before the source switch so nothing downstream
/// ever sees a half-configured clock tree.
pub fn init_clocks() -> Result<(), Status> {
    sysclk::enable_osc(ClockSource::Rc32M);
    sysclk::wait_osc_ready(ClockSource::Rc32M)?;
    sysclk::set_prescalers(PrescalerA::Div1, PrescalerBc::Div1_1);
    sysclk::set_source(ClockSource::Rc32M)
}

/// Kit bringup: clocks, interrupt controller, user I/O parked idle.
pub fn init() -> Result<(), Status> {
    init_clocks()?;
    pmic::init();
    led0()?;
    button0()?;
    Ok(())
}

/// Bring the console USART up 8N1 with its pins claimed.
pub fn init_console() -> Result<Usart, Status> {
    let mut port = IoPort::new(CONSOLE_PORT)?;
    port.configure(CONSOLE_TXD, PinFlags::DIR_OUTPUT | PinFlags::INIT_HIGH);
    port.configure(CONSOLE_RXD, PinFlags::empty());
    let mut console = Usart::new(CONSOLE_USART)?;
    let opts = UsartOptions { baudrate: CONSOLE_BAUD, ..Default::default() };
    console.init_rs232(&opts, PER_HZ)?;
    Ok(console)
}

/// The user LED as a driven output, initially off. The kit LED sinks
/// current, so off is high.
pub fn led0() -> Result<Pin, Status> {
    let mut led = Pin::new(LED0.0, LED0.1)?;
    led.configure(PinFlags::DIR_OUTPUT | PinFlags::INIT_HIGH);
    Ok(led)
}

/// The user button, pulled up, reads low while pressed.
pub fn button0() -> Result<Pin, Status> {
    let mut button = Pin::new(BUTTON0.0, BUTTON0.1)?;
    button.configure(PinFlags::PULL_UP);
    Ok(button)
}
