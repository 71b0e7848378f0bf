//! UC3L evaluation kit: 12 MHz crystal on OSC0, 32 kHz crystal on OSC32,
//! console on USART1, one user LED and one push button.

use hal_api::Status;
use hatra::uc3::pm as pm_map;

use crate::gpio::{GpioPort, PeripheralFunction, Pin, PinFlags};
use crate::pm::{Bus, MainClock, Pm};
use crate::scif::{OscConfig, OscMode, Scif};
use crate::usart::{Usart, UsartOptions};

pub const OSC0_HZ: u32 = 12_000_000;
pub const OSC32_HZ: u32 = 32_768;
/// Clock tree after [`init_clocks`]: CPU straight off OSC0, PBA halved.
pub const CPU_HZ: u32 = OSC0_HZ;
pub const PBA_HZ: u32 = OSC0_HZ / 2;

/// (port, pin) pairs for the user I/O.
pub const LED0: (usize, usize) = (0, 21);
pub const BUTTON0: (usize, usize) = (0, 11);

pub const CONSOLE_USART: usize = 1;
pub const CONSOLE_BAUD: u32 = 115_200;
const CONSOLE_PORT: usize = 0;
// RXD/TXD sit on function A of these port-A pins
const CONSOLE_PINS: u32 = (1 << 5) | (1 << 6);

/// Crystals up, bus dividers set, CPU switched onto OSC0.
///
/// The PBA divider lands before the main-clock switch so the bus never
/// sees the crystal undivided.
pub fn init_clocks() -> Result<(), Status> {
    let mut scif = Scif::new();
    let osc0 = OscConfig { frequency_hz: OSC0_HZ, mode: OscMode::Crystal, startup: 3 };
    scif.start_osc0(&osc0, true)?;
    scif.start_osc32(OscMode::Crystal, 2)?;
    let mut pm = Pm::new();
    pm.set_pba_divider(Some(0))?;
    pm.select_main_clock(MainClock::Osc0);
    Ok(())
}

/// Route the console pins to their USART and bring it up 8N1.
pub fn init_console() -> Result<Usart, Status> {
    let mut pm = Pm::new();
    pm.enable_module(Bus::Pba, pm_map::PBA_GPIO_BIT);
    pm.enable_module(Bus::Pba, pm_map::PBA_USART1_BIT);
    let mut port = GpioPort::new(CONSOLE_PORT)?;
    port.select_function(CONSOLE_PINS, PeripheralFunction::A);
    let mut console = Usart::new(CONSOLE_USART)?;
    let opts = UsartOptions { baudrate: CONSOLE_BAUD, ..Default::default() };
    console.init_rs232(&opts, PBA_HZ)?;
    Ok(console)
}

/// The user LED as a driven output, initially off.
pub fn led0() -> Result<Pin, Status> {
    let mut led = Pin::new(LED0.0, LED0.1)?;
    led.configure(PinFlags::DIR_OUTPUT | PinFlags::INIT_LOW);
    Ok(led)
}

/// The user button, pulled up and glitch-filtered.
pub fn button0() -> Result<Pin, Status> {
    let mut button = Pin::new(BUTTON0.0, BUTTON0.1)?;
    button.configure(PinFlags::PULL_UP | PinFlags::GLITCH_FILTER);
    Ok(button)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hatra::hosted::{self, Access, HookAction};
    use hatra::uc3::{gpio as gpio_map, pm, scif, usart};

    #[test]
    fn clock_bringup_lands_on_osc0() {
        // oscillators come ready as soon as they are enabled
        hosted::install_hook(
            scif::HW_SCIF_BASE,
            Box::new(|off, access| {
                if let Access::Write(v) = access {
                    if off == scif::OSCCTRL0.offset() && v & (1 << 16) != 0 {
                        hosted::poke_or(scif::HW_SCIF_BASE, scif::PCLKSR.offset(), 1);
                    }
                    if off == scif::OSC32CTRL.offset() && v & 1 != 0 {
                        hosted::poke_or(scif::HW_SCIF_BASE, scif::PCLKSR.offset(), 2);
                    }
                }
                HookAction::Pass
            }),
        );
        let pm_blk = Pm::new();
        hosted::poke_or(pm::HW_PM_BASE, pm::SR.offset(), 1 << 5);
        init_clocks().unwrap();
        assert_eq!(pm_blk.main_clock(), MainClock::Osc0 as u32);
        assert_eq!(hosted::peek(pm::HW_PM_BASE, pm::PBASEL.offset()), 0x80);
        hosted::remove_hook(scif::HW_SCIF_BASE);
    }

    #[test]
    fn console_claims_pins_and_programs_the_divider() {
        let console = init_console().unwrap();
        assert_eq!(console.irq(), hatra::uc3::irq::USART1);
        // pins handed to the peripheral mux
        let port_base = gpio_map::HW_GPIO_BASE;
        assert_eq!(
            hosted::peek(port_base, gpio_map::GPERC.offset()),
            CONSOLE_PINS as usize
        );
        // 6 MHz PBA at 115200: cd 3, fractional 2, 16x oversampling
        let usart_base = usart::HW_USART1_BASE;
        assert_eq!(hosted::peek(usart_base, usart::BRGR.offset()), (2 << 16) | 3);
        let pm_blk = Pm::new();
        assert!(pm_blk.is_module_enabled(Bus::Pba, pm::PBA_USART1_BIT));
    }

    #[test]
    fn led_is_an_output_button_is_not() {
        let _ = led0().unwrap();
        let _ = button0().unwrap();
        let base = gpio_map::HW_GPIO_BASE;
        assert_eq!(
            hosted::peek(base, gpio_map::ODERS.offset()),
            1 << LED0.1
        );
        assert_eq!(
            hosted::peek(base, gpio_map::PUERS.offset()),
            1 << BUTTON0.1
        );
    }
}
