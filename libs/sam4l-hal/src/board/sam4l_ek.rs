//! SAM4L evaluation kit: 12 MHz crystal on OSC0, 32 kHz crystal on OSC32,
//! one user LED and one push button.

use hal_api::Status;
use hatra::sam4l::pm as pm_map;

use crate::gpio::{Pin, PinFlags};
use crate::pm::{Bus, Pm};

pub const OSC0_HZ: u32 = 12_000_000;
pub const OSC32_HZ: u32 = 32_768;
/// Clock tree after reset: everything runs from the system RC until a
/// clock service switches it.
pub const RCSYS_HZ: u32 = 115_200;
pub const CPU_HZ: u32 = RCSYS_HZ;

/// (port, pin) pairs for the user I/O. PC10 drives the LED, PC03 reads
/// the PB0 button.
pub const LED0: (usize, usize) = (2, 10);
pub const BUTTON0: (usize, usize) = (2, 3);

/// Kit bringup: GPIO clock ungated, user I/O parked idle.
pub fn init() -> Result<(), Status> {
    let mut pm = Pm::new();
    pm.enable_module(Bus::Pbc, pm_map::PBC_GPIO_BIT);
    led0()?;
    button0()?;
    Ok(())
}

/// The user LED as a driven output, initially off. The kit LED sinks
/// current, so off is high.
pub fn led0() -> Result<Pin, Status> {
    let mut led = Pin::new(LED0.0, LED0.1)?;
    led.configure(PinFlags::DIR_OUTPUT | PinFlags::INIT_HIGH);
    Ok(led)
}

/// The user button, filtered; the kit provides the pull-up externally.
pub fn button0() -> Result<Pin, Status> {
    let mut button = Pin::new(BUTTON0.0, BUTTON0.1)?;
    button.configure(PinFlags::GLITCH_FILTER);
    Ok(button)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hatra::hosted;
    use hatra::sam4l::gpio as gpio_map;

    #[test]
    fn init_gates_the_port_clock() {
        init().unwrap();
        let pm = Pm::new();
        assert!(pm.is_module_enabled(Bus::Pbc, pm_map::PBC_GPIO_BIT));
    }

    #[test]
    fn user_io_parks_safe() {
        let _ = led0().unwrap();
        let _ = button0().unwrap();
        let base = gpio_map::port_base(LED0.0);
        // without the port model the mirrors retain their masks directly
        assert_eq!(hosted::peek(base, gpio_map::ODERS.offset()), 1 << LED0.1);
        assert_eq!(hosted::peek(base, gpio_map::OVRS.offset()), 1 << LED0.1);
        assert_eq!(hosted::peek(base, gpio_map::GFERS.offset()), 1 << BUTTON0.1);
        // the button relies on the kit pull-up, none requested on-chip
        assert_eq!(hosted::peek(base, gpio_map::PUERS.offset()), 0);
    }
}
